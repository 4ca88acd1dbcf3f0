//! In-place turn about the vertical axis.

use std::f64::consts::{PI, TAU};

use super::{ActionTiming, PoseGenerator};
use crate::easing::Easing;
use crate::kinematics::{deg, solve_pose, Articulation, Bilateral, Ground, Pose};
use crate::skeleton::Skeleton;

/// Steps taken per side during the turn.
const STEPS: f64 = 2.0;

/// Half turn on the spot: the root yaws from facing forward to facing back
/// while the feet step in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct TurnAround;

impl TurnAround {
    fn articulation(skeleton: &Skeleton, phase: f64) -> Articulation {
        let amp = skeleton.scale().amplitude;
        let phase = phase.clamp(0.0, 1.0);
        let w = TAU * STEPS * phase;
        // A foot lifts only during its own half of each step cycle.
        let lift = |a: f64| a.sin().max(0.0).powi(2);
        let (left, right) = (lift(w), lift(w + PI));
        Articulation {
            root_yaw: PI * Easing::EaseInOut.apply(phase),
            hip_flex: Bilateral::new(deg(20.0) * amp * left, deg(20.0) * amp * right),
            knee_flex: Bilateral::new(deg(40.0) * amp * left, deg(40.0) * amp * right),
            shoulder_flex: Bilateral::new(deg(6.0) * amp * right, deg(6.0) * amp * left),
            elbow_flex: Bilateral::both(deg(10.0)),
            ..Articulation::default()
        }
    }
}

impl PoseGenerator for TurnAround {
    fn name(&self) -> &str {
        "turn_around"
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::OneShot { duration: 2.0 }
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        solve_pose(skeleton, &Self::articulation(skeleton, phase), Ground::PlantFeet)
    }

    fn endpoints(&self, skeleton: &Skeleton) -> Option<(Pose, Pose)> {
        Some((self.pose(skeleton, 0.0), self.pose(skeleton, 1.0)))
    }
}
