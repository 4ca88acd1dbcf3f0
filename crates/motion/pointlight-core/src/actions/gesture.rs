//! Actions performed in place: quiet standing and waving.

use std::f64::consts::TAU;

use nalgebra::Vector3;

use super::{ActionTiming, PoseGenerator, Symmetry};
use crate::kinematics::{deg, solve_pose, Articulation, Bilateral, Ground, Pose};
use crate::marker::Marker;
use crate::skeleton::Skeleton;

/// Chest rise while breathing, meters at scale 1.
const BREATH_RISE: f64 = 0.008;

const UPPER_BODY: [Marker; 8] = [
    Marker::Head,
    Marker::Neck,
    Marker::LeftShoulder,
    Marker::RightShoulder,
    Marker::LeftElbow,
    Marker::RightElbow,
    Marker::LeftWrist,
    Marker::RightWrist,
];

/// Idle standing: breathing and a slow postural sway.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stand;

impl PoseGenerator for Stand {
    fn name(&self) -> &str {
        "stand"
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::Looping { period: 4.0 }
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::Bilateral
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        let scale = skeleton.scale();
        let w = TAU * phase;
        let art = Articulation {
            trunk_pitch: deg(1.5) * scale.amplitude * w.sin(),
            ..Articulation::default()
        };
        let mut pose = solve_pose(skeleton, &art, Ground::PlantFeet);
        let rise = BREATH_RISE * scale.amplitude * scale.height_scale * (2.0 * w).sin();
        for marker in UPPER_BODY {
            pose.add_offset(marker, Vector3::new(0.0, rise, 0.0));
        }
        pose
    }
}

/// Right arm raised overhead, forearm swinging side to side.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wave;

impl PoseGenerator for Wave {
    fn name(&self) -> &str {
        "wave"
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::Looping { period: 1.0 }
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        solve_pose(skeleton, &Self::articulation(skeleton, phase), Ground::PlantFeet)
    }
}

impl Wave {
    fn articulation(skeleton: &Skeleton, phase: f64) -> Articulation {
        let amp = skeleton.scale().amplitude;
        let w = TAU * phase;
        Articulation {
            shoulder_abduction: Bilateral::new(deg(5.0), deg(140.0)),
            shoulder_flex: Bilateral::new(deg(4.0) * w.sin(), deg(10.0)),
            elbow_flex: Bilateral::new(deg(10.0), 0.0),
            // upper arm plus roll points the forearm straight up at rest
            forearm_roll: Bilateral::new(0.0, deg(40.0) + deg(25.0) * amp * w.sin()),
            neck_pitch: deg(-5.0),
            ..Articulation::default()
        }
    }
}
