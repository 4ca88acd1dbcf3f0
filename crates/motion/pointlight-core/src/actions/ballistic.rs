//! Airborne motion: a jump with crouch, flight and landing.

use nalgebra::Vector3;

use super::{ActionTiming, PoseGenerator, Symmetry};
use crate::easing::bump;
use crate::kinematics::{deg, solve_pose, Articulation, Bilateral, Ground, Pose};
use crate::skeleton::Skeleton;

/// Share of the cycle spent crouching on the ground.
const GROUND_SHARE: f64 = 0.4;
/// Peak flight height in meters at scale 1 and unit amplitude.
const FLIGHT_HEIGHT: f64 = 0.25;

/// Repeated vertical jump: crouch, then a parabolic flight with the arms
/// thrown up.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jump;

impl Jump {
    fn articulation(skeleton: &Skeleton, phase: f64) -> Articulation {
        let amp = skeleton.scale().amplitude;
        if phase < GROUND_SHARE {
            let crouch = bump(phase / GROUND_SHARE);
            let knee = deg(60.0) * amp.min(1.0) * crouch;
            Articulation {
                trunk_pitch: deg(20.0) * crouch,
                hip_flex: Bilateral::both(0.55 * knee),
                knee_flex: Bilateral::both(knee),
                shoulder_flex: Bilateral::both(deg(-45.0) * crouch),
                elbow_flex: Bilateral::both(deg(10.0) * crouch),
                ..Articulation::default()
            }
        } else {
            let flight = bump((phase - GROUND_SHARE) / (1.0 - GROUND_SHARE));
            Articulation {
                shoulder_flex: Bilateral::both(deg(150.0) * amp.min(1.0) * flight),
                elbow_flex: Bilateral::both(deg(15.0) * flight),
                knee_flex: Bilateral::both(deg(10.0) * flight),
                hip_flex: Bilateral::both(deg(5.0) * flight),
                root_offset: Vector3::new(0.0, FLIGHT_HEIGHT * amp * flight, 0.0),
                ..Articulation::default()
            }
        }
    }
}

impl PoseGenerator for Jump {
    fn name(&self) -> &str {
        "jump"
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::Looping { period: 0.9 }
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::Bilateral
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        solve_pose(skeleton, &Self::articulation(skeleton, phase), Ground::PlantFeet)
    }
}
