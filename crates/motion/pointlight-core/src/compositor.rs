//! Combines the skeleton, an action's pose and optional jitter into world
//! positions.

use nalgebra::Vector3;

use crate::actions::ActionSpec;
use crate::easing::bump;
use crate::error::MotionError;
use crate::jitter::Jitter;
use crate::kinematics::Pose;
use crate::marker::{Marker, MARKER_COUNT};
use crate::skeleton::Skeleton;

/// World positions for one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Composed {
    /// Root anchor position, including completed-cycle displacement.
    pub root: Vector3<f64>,
    pub markers: [Vector3<f64>; MARKER_COUNT],
}

/// Stateless apart from its fixed jitter field; safe to share across threads.
#[derive(Clone, Debug, Default)]
pub struct MotionCompositor {
    jitter: Option<Jitter>,
}

impl MotionCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jitter(jitter: Jitter) -> Self {
        Self {
            jitter: Some(jitter),
        }
    }

    pub fn jitter(&self) -> Option<&Jitter> {
        self.jitter.as_ref()
    }

    /// Position every marker of `action` at `phase`.
    pub fn compose(&self, skeleton: &Skeleton, action: &ActionSpec, phase: f64) -> Result<Composed, MotionError> {
        self.compose_cycle(skeleton, action, phase, 0)
    }

    /// As [`compose`](Self::compose), adding the displacement of `cycles`
    /// completed loops.
    pub fn compose_cycle(
        &self,
        skeleton: &Skeleton,
        action: &ActionSpec,
        phase: f64,
        cycles: u64,
    ) -> Result<Composed, MotionError> {
        let phase = normalize_phase(action, phase)?;
        let pose = action.pose(skeleton, phase);
        let advance = if cycles > 0 {
            action.cycle_advance(skeleton) * cycles as f64
        } else {
            Vector3::zeros()
        };
        let envelope = if action.is_looping() { 1.0 } else { bump(phase) };
        let jitter = self.jitter.as_ref().filter(|_| action.accepts_jitter());
        place(skeleton, action.name(), phase, &pose, advance, jitter.map(|j| (j, envelope)))
    }

    /// Position every marker of an explicit pose, without jitter.
    pub fn compose_pose(&self, skeleton: &Skeleton, action: &str, pose: &Pose) -> Result<Composed, MotionError> {
        place(skeleton, action, 0.0, pose, Vector3::zeros(), None)
    }
}

/// Compose without jitter.
pub fn compose(skeleton: &Skeleton, action: &ActionSpec, phase: f64) -> Result<[Vector3<f64>; MARKER_COUNT], MotionError> {
    MotionCompositor::new()
        .compose(skeleton, action, phase)
        .map(|c| c.markers)
}

/// Wrap looping phases into `[0, 1)` and clamp one-shot phases to `[0, 1]`.
pub fn normalize_phase(action: &ActionSpec, phase: f64) -> Result<f64, MotionError> {
    if !phase.is_finite() {
        return Err(MotionError::InvalidTime { time: phase });
    }
    if action.is_looping() {
        let wrapped = phase.rem_euclid(1.0);
        // rem_euclid rounds tiny negatives up to exactly 1.0
        Ok(if wrapped >= 1.0 { 0.0 } else { wrapped })
    } else {
        Ok(phase.clamp(0.0, 1.0))
    }
}

fn place(
    skeleton: &Skeleton,
    action: &str,
    phase: f64,
    pose: &Pose,
    advance: Vector3<f64>,
    jitter: Option<(&Jitter, f64)>,
) -> Result<Composed, MotionError> {
    let fail = |marker: &str| MotionError::MotionComputation {
        action: action.to_string(),
        phase,
        marker: marker.to_string(),
    };

    if !pose.root.is_finite() || !advance.iter().all(|v| v.is_finite()) {
        return Err(fail("root"));
    }

    let mut local = *skeleton.rest_offsets();
    for (marker, delta) in &pose.offsets {
        if !delta.iter().all(|v| v.is_finite()) {
            return Err(fail(marker.name()));
        }
        local[marker.index()] += delta;
    }

    if let Some((jitter, envelope)) = jitter {
        for marker in Marker::ALL {
            local[marker.index()] += jitter.offset(marker, phase, envelope);
        }
    }

    let root = pose.root.translation + advance;
    let mut markers = [Vector3::zeros(); MARKER_COUNT];
    for marker in Marker::ALL {
        let world = pose.root.rotate(&local[marker.index()]) + root;
        if !world.iter().all(|v| v.is_finite()) {
            return Err(fail(marker.name()));
        }
        markers[marker.index()] = world;
    }

    Ok(Composed { root, markers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{get_action, ActionTiming, PoseGenerator};
    use crate::config::Attributes;
    use crate::kinematics::RootTransform;
    use crate::skeleton::build_skeleton;

    #[derive(Debug)]
    struct Broken;

    impl PoseGenerator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn timing(&self) -> ActionTiming {
            ActionTiming::Looping { period: 1.0 }
        }

        fn pose(&self, _skeleton: &Skeleton, _phase: f64) -> Pose {
            let mut pose = Pose::new(RootTransform::default());
            pose.add_offset(Marker::LeftKnee, Vector3::new(f64::NAN, 0.0, 0.0));
            pose
        }
    }

    #[test]
    fn non_finite_offset_names_the_marker() {
        let s = build_skeleton(&Attributes::default()).unwrap();
        let err = compose(&s, &ActionSpec::new(Broken), 0.25).unwrap_err();
        assert_eq!(
            err,
            MotionError::MotionComputation {
                action: "broken".to_string(),
                phase: 0.25,
                marker: "left_knee".to_string(),
            }
        );
    }

    #[test]
    fn non_finite_phase_is_a_time_error() {
        let s = build_skeleton(&Attributes::default()).unwrap();
        let walk = get_action("walk").unwrap();
        assert!(matches!(
            compose(&s, &walk, f64::NAN),
            Err(MotionError::InvalidTime { .. })
        ));
    }

    #[test]
    fn phases_wrap_or_clamp_by_timing() {
        let walk = get_action("walk").unwrap();
        let sit = get_action("sit_down").unwrap();
        assert_eq!(normalize_phase(&walk, 1.25).unwrap(), 0.25);
        assert_eq!(normalize_phase(&walk, -1e-18).unwrap(), 0.0);
        assert_eq!(normalize_phase(&sit, 1.25).unwrap(), 1.0);
        assert_eq!(normalize_phase(&sit, -0.5).unwrap(), 0.0);
    }

    #[test]
    fn completed_cycles_advance_the_root() {
        let s = build_skeleton(&Attributes::default()).unwrap();
        let walk = get_action("walk").unwrap();
        let c = MotionCompositor::new();
        let first = c.compose_cycle(&s, &walk, 0.3, 0).unwrap();
        let third = c.compose_cycle(&s, &walk, 0.3, 2).unwrap();
        let step = walk.cycle_advance(&s).z;
        assert!((third.root.z - first.root.z - 2.0 * step).abs() < 1e-9);
        assert!((third.markers[0].y - first.markers[0].y).abs() < 1e-12);
    }

    #[test]
    fn jitter_vanishes_at_one_shot_endpoints() {
        let s = build_skeleton(&Attributes::default()).unwrap();
        let bow = get_action("bow").unwrap();
        let plain = MotionCompositor::new();
        let jittered = MotionCompositor::with_jitter(Jitter::from_seed(99, &s));
        for phase in [0.0, 1.0] {
            assert_eq!(
                plain.compose(&s, &bow, phase).unwrap(),
                jittered.compose(&s, &bow, phase).unwrap()
            );
        }
        assert_ne!(
            plain.compose(&s, &bow, 0.5).unwrap(),
            jittered.compose(&s, &bow, 0.5).unwrap()
        );
    }
}
