//! One-shot transitions as keyframed articulations.
//!
//! The keyframe list is sampled the way animation tracks are: find the pair
//! bracketing the phase, ease the local progress, blend. The first and last
//! keyframes are the configured start and end poses and are reproduced
//! exactly at phase 0 and phase 1.

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::Vector3;

use super::{ActionTiming, PoseGenerator, Symmetry};
use crate::easing::{bump, Easing};
use crate::kinematics::{deg, solve_pose, Articulation, Bilateral, Ground, Pose};
use crate::marker::Marker;
use crate::skeleton::Skeleton;

/// Settle oscillation starts at this phase. It runs over the final approach
/// and fades out by phase 1, so the completed one-shot holds its exact end
/// pose rather than swaying after it.
const SETTLE_START: f64 = 0.75;

const SETTLE_MARKERS: [Marker; 4] = [
    Marker::Head,
    Marker::Neck,
    Marker::LeftShoulder,
    Marker::RightShoulder,
];

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Normalized phase of this key in `[0, 1]`.
    pub stamp: f64,
    pub articulation: Articulation,
    /// Curve used for the segment that arrives at this key.
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(stamp: f64, articulation: Articulation) -> Self {
        Self {
            stamp,
            articulation,
            easing: Easing::EaseInOut,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Clone, Debug)]
pub struct KeyframedAction {
    name: String,
    duration: f64,
    symmetry: Symmetry,
    ground: Ground,
    keys: Vec<Keyframe>,
    /// Peak vertical settle of the upper body, meters at scale 1.
    settle: f64,
}

impl KeyframedAction {
    /// Keys must start at 0, end at 1 and be strictly increasing.
    pub fn new(name: impl Into<String>, duration: f64, ground: Ground, keys: Vec<Keyframe>) -> Self {
        debug_assert!(keys.len() >= 2);
        debug_assert!(keys.windows(2).all(|w| w[0].stamp < w[1].stamp));
        Self {
            name: name.into(),
            duration,
            symmetry: Symmetry::None,
            ground,
            keys,
            settle: 0.004,
        }
    }

    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn with_settle(mut self, settle: f64) -> Self {
        self.settle = settle;
        self
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn articulation_at(&self, phase: f64) -> Articulation {
        let phase = phase.clamp(0.0, 1.0);
        let last = self.keys.len() - 1;
        let next = self.keys[1..]
            .iter()
            .position(|k| phase <= k.stamp)
            .map_or(last, |i| i + 1);
        let (from, to) = (&self.keys[next - 1], &self.keys[next]);
        let span = to.stamp - from.stamp;
        let progress = if span > 0.0 {
            (phase - from.stamp) / span
        } else {
            1.0
        };
        from.articulation
            .lerp(&to.articulation, to.easing.apply(progress))
    }

    /// Standing to seated on a chair-height support.
    pub fn sit_down() -> Self {
        let seated = Articulation {
            trunk_pitch: deg(12.0),
            hip_flex: Bilateral::both(deg(85.0)),
            knee_flex: Bilateral::both(deg(85.0)),
            shoulder_flex: Bilateral::both(deg(25.0)),
            elbow_flex: Bilateral::both(deg(55.0)),
            ..Articulation::default()
        };
        Self::new(
            "sit_down",
            2.0,
            Ground::PlantFeet,
            vec![
                Keyframe::new(0.0, Articulation::standing()),
                Keyframe::new(1.0, seated),
            ],
        )
        .with_symmetry(Symmetry::Bilateral)
    }

    pub fn bow() -> Self {
        let bowed = Articulation {
            trunk_pitch: deg(50.0),
            neck_pitch: deg(15.0),
            // keeps the arms hanging while the trunk leans
            shoulder_flex: Bilateral::both(deg(45.0)),
            hip_flex: Bilateral::both(deg(-8.0)),
            knee_flex: Bilateral::both(deg(6.0)),
            ..Articulation::default()
        };
        Self::new(
            "bow",
            2.0,
            Ground::PlantFeet,
            vec![
                Keyframe::new(0.0, Articulation::standing()),
                Keyframe::new(1.0, bowed),
            ],
        )
        .with_symmetry(Symmetry::Bilateral)
    }

    /// Standing, squat, seated on the floor, supine.
    pub fn lie_down() -> Self {
        let squat = Articulation {
            trunk_pitch: deg(35.0),
            hip_flex: Bilateral::both(deg(100.0)),
            knee_flex: Bilateral::both(deg(125.0)),
            shoulder_flex: Bilateral::both(deg(40.0)),
            elbow_flex: Bilateral::both(deg(20.0)),
            root_offset: Vector3::new(0.0, 0.0, -0.15),
            ..Articulation::default()
        };
        let floor_seated = Articulation {
            trunk_pitch: deg(5.0),
            hip_flex: Bilateral::both(deg(90.0)),
            knee_flex: Bilateral::both(deg(10.0)),
            shoulder_flex: Bilateral::both(deg(10.0)),
            elbow_flex: Bilateral::both(deg(10.0)),
            root_offset: Vector3::new(0.0, 0.0, -0.3),
            ..Articulation::default()
        };
        let supine = Articulation {
            root_pitch: FRAC_PI_2,
            root_offset: Vector3::new(0.0, 0.0, -0.35),
            ..Articulation::default()
        };
        Self::new(
            "lie_down",
            3.0,
            Ground::Support,
            vec![
                Keyframe::new(0.0, Articulation::standing()),
                Keyframe::new(0.35, squat),
                Keyframe::new(0.65, floor_seated),
                Keyframe::new(1.0, supine),
            ],
        )
        .with_symmetry(Symmetry::Bilateral)
    }

    /// Forward roll: tuck, tip over through a full turn, stand up further on.
    pub fn roll() -> Self {
        let tuck = |pitch: f64, forward: f64| Articulation {
            trunk_pitch: deg(50.0),
            neck_pitch: deg(30.0),
            hip_flex: Bilateral::both(deg(110.0)),
            knee_flex: Bilateral::both(deg(130.0)),
            shoulder_flex: Bilateral::both(deg(100.0)),
            elbow_flex: Bilateral::both(deg(30.0)),
            root_pitch: pitch,
            root_offset: Vector3::new(0.0, 0.0, forward),
            ..Articulation::default()
        };
        let upright = Articulation {
            root_pitch: -TAU,
            root_offset: Vector3::new(0.0, 0.0, 1.2),
            ..Articulation::default()
        };
        Self::new(
            "roll",
            2.5,
            Ground::Support,
            vec![
                Keyframe::new(0.0, Articulation::standing()),
                Keyframe::new(0.25, tuck(0.0, 0.2)),
                Keyframe::new(0.5, tuck(-TAU * 0.5, 0.6)).with_easing(Easing::Linear),
                Keyframe::new(0.75, tuck(-TAU * 0.92, 0.95)).with_easing(Easing::Linear),
                Keyframe::new(1.0, upright),
            ],
        )
        .with_symmetry(Symmetry::Bilateral)
    }

    fn settle_offset(&self, skeleton: &Skeleton, phase: f64) -> Option<f64> {
        if phase <= SETTLE_START || self.settle == 0.0 {
            return None;
        }
        let s = ((phase - SETTLE_START) / (1.0 - SETTLE_START)).min(1.0);
        let envelope = bump(s);
        if envelope == 0.0 {
            return None;
        }
        let scale = skeleton.scale();
        Some(self.settle * scale.amplitude * scale.height_scale * envelope * (TAU * 2.0 * s).sin())
    }
}

impl PoseGenerator for KeyframedAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn timing(&self) -> ActionTiming {
        ActionTiming::OneShot {
            duration: self.duration,
        }
    }

    fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        let art = self.articulation_at(phase);
        let mut pose = solve_pose(skeleton, &art, self.ground);
        if let Some(rise) = self.settle_offset(skeleton, phase) {
            // Offsets are applied before the root rotation, so "up" follows the trunk.
            for marker in SETTLE_MARKERS {
                pose.add_offset(marker, Vector3::new(0.0, rise, 0.0));
            }
        }
        pose
    }

    fn endpoints(&self, skeleton: &Skeleton) -> Option<(Pose, Pose)> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        Some((
            solve_pose(skeleton, &first.articulation, self.ground),
            solve_pose(skeleton, &last.articulation, self.ground),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Attributes;
    use crate::skeleton::build_skeleton;
    use approx::assert_relative_eq;

    fn skeleton() -> Skeleton {
        build_skeleton(&Attributes::default()).unwrap()
    }

    #[test]
    fn endpoints_are_exact() {
        let s = skeleton();
        for action in [
            KeyframedAction::sit_down(),
            KeyframedAction::bow(),
            KeyframedAction::lie_down(),
            KeyframedAction::roll(),
        ] {
            let (start, end) = action.endpoints(&s).unwrap();
            assert_eq!(action.pose(&s, 0.0), start, "{}", action.name());
            assert_eq!(action.pose(&s, 1.0), end, "{}", action.name());
        }
    }

    #[test]
    fn sampling_hits_interior_keys() {
        let lie = KeyframedAction::lie_down();
        let squat = &lie.keys()[1];
        assert_eq!(lie.articulation_at(squat.stamp), squat.articulation);
    }

    #[test]
    fn phase_is_clamped() {
        let sit = KeyframedAction::sit_down();
        assert_eq!(sit.articulation_at(-1.0), sit.articulation_at(0.0));
        assert_eq!(sit.articulation_at(4.0), sit.articulation_at(1.0));
    }

    #[test]
    fn sit_down_lowers_the_hips_monotonically() {
        let s = skeleton();
        let sit = KeyframedAction::sit_down();
        let mut prev = sit.pose(&s, 0.0).root.translation.y;
        for i in 1..=20 {
            let y = sit.pose(&s, i as f64 / 20.0).root.translation.y;
            assert!(y < prev, "step {i}");
            prev = y;
        }
    }

    #[test]
    fn settle_only_touches_the_last_quarter() {
        let s = skeleton();
        let sit = KeyframedAction::sit_down();
        assert_eq!(sit.settle_offset(&s, 0.5), None);
        assert_eq!(sit.settle_offset(&s, 1.0), None);
        assert!(sit.settle_offset(&s, 0.8).is_some());
    }

    #[test]
    fn lie_down_ends_supine_on_the_floor() {
        let s = skeleton();
        let (_, end) = KeyframedAction::lie_down().endpoints(&s).unwrap();
        let head = end.root.apply(&(s.rest_offset(Marker::Head) + end.offset(Marker::Head).unwrap()));
        let ankle = end
            .root
            .apply(&(s.rest_offset(Marker::LeftAnkle) + end.offset(Marker::LeftAnkle).unwrap()));
        assert_relative_eq!(head.y, ankle.y, epsilon = 1e-9);
        assert!(head.y < 0.2);
        assert!(ankle.z - head.z > 1.4);
    }

    #[test]
    fn roll_finishes_forward_and_upright() {
        let s = skeleton();
        let roll = KeyframedAction::roll();
        let start = roll.pose(&s, 0.0).root;
        let end = roll.pose(&s, 1.0).root;
        assert!(end.translation.z > start.translation.z + 1.0);
        assert_relative_eq!(end.translation.y, s.standing_root_height(), epsilon = 1e-9);
    }
}
