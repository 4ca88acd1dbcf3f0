//! Cyclic locomotion built from coupled sinusoids.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use super::{ActionTiming, PoseGenerator, Symmetry};
use crate::kinematics::{deg, solve_pose, Articulation, Bilateral, Ground, Pose};
use crate::skeleton::Skeleton;

/// Shape of one locomotion cycle. Angles in degrees, distances in meters at
/// scale 1 and unit amplitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaitParams {
    pub period: f64,
    pub hip_swing: f64,
    /// Knee flexion carried through the whole cycle.
    pub knee_base: f64,
    /// Extra knee flexion while the leg swings back under the body.
    pub knee_swing: f64,
    pub arm_swing: f64,
    pub elbow_base: f64,
    pub elbow_swing: f64,
    pub trunk_lean: f64,
    /// Vertical bob, twice per cycle.
    pub bob: f64,
    /// Lateral sway, once per cycle.
    pub sway: f64,
    /// Forward distance per cycle.
    pub stride: f64,
}

impl GaitParams {
    pub const WALK: GaitParams = GaitParams {
        period: 1.1,
        hip_swing: 25.0,
        knee_base: 5.0,
        knee_swing: 40.0,
        arm_swing: 20.0,
        elbow_base: 15.0,
        elbow_swing: 12.0,
        trunk_lean: 3.0,
        bob: 0.025,
        sway: 0.012,
        stride: 1.4,
    };

    pub const RUN: GaitParams = GaitParams {
        period: 0.72,
        hip_swing: 40.0,
        knee_base: 25.0,
        knee_swing: 70.0,
        arm_swing: 35.0,
        elbow_base: 85.0,
        elbow_swing: 15.0,
        trunk_lean: 10.0,
        bob: 0.06,
        sway: 0.01,
        stride: 2.4,
    };
}

/// Walk or run.
#[derive(Clone, Debug)]
pub struct Gait {
    name: &'static str,
    params: GaitParams,
}

impl Gait {
    pub fn new(name: &'static str, params: GaitParams) -> Self {
        Self { name, params }
    }

    pub fn walk() -> Self {
        Self::new("walk", GaitParams::WALK)
    }

    pub fn run() -> Self {
        Self::new("run", GaitParams::RUN)
    }

    pub fn params(&self) -> &GaitParams {
        &self.params
    }

    /// Forward distance covered per cycle; damped gaits take shorter steps.
    pub fn stride_length(&self, skeleton: &Skeleton) -> f64 {
        let scale = skeleton.scale();
        self.params.stride * (0.5 + 0.5 * scale.amplitude)
    }

    fn articulation(&self, skeleton: &Skeleton, phase: f64) -> Articulation {
        let p = &self.params;
        let amp = skeleton.scale().amplitude;
        let w = TAU * phase;
        // Right side runs half a cycle behind the left.
        let (left, right) = (w, w + PI);
        let knee = |a: f64| deg(p.knee_base) + amp * deg(p.knee_swing) * a.cos().max(0.0).powi(2);
        // Each arm swings with the opposite leg.
        let elbow = |a: f64| deg(p.elbow_base) + amp * deg(p.elbow_swing) * (0.5 + 0.5 * a.sin());

        Articulation {
            trunk_pitch: deg(p.trunk_lean),
            hip_flex: Bilateral::new(
                amp * deg(p.hip_swing) * left.sin(),
                amp * deg(p.hip_swing) * right.sin(),
            ),
            knee_flex: Bilateral::new(knee(left), knee(right)),
            shoulder_flex: Bilateral::new(
                amp * deg(p.arm_swing) * right.sin(),
                amp * deg(p.arm_swing) * left.sin(),
            ),
            elbow_flex: Bilateral::new(elbow(right), elbow(left)),
            root_offset: Vector3::new(
                amp * p.sway * w.sin(),
                amp * p.bob * (2.0 * w).cos(),
                self.stride_length(skeleton) * phase,
            ),
            ..Articulation::default()
        }
    }
}

impl PoseGenerator for Gait {
    fn name(&self) -> &str {
        self.name
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::Looping {
            period: self.params.period,
        }
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::HalfCycle
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        solve_pose(skeleton, &self.articulation(skeleton, phase), Ground::Free)
    }

    fn cycle_advance(&self, skeleton: &Skeleton) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.stride_length(skeleton) * skeleton.scale().height_scale)
    }
}
