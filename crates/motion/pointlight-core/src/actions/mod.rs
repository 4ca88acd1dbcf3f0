//! Action library: named, pure pose generators.

mod ballistic;
mod gait;
mod gesture;
mod transition;
mod turn;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MotionError;
use crate::kinematics::Pose;
use crate::skeleton::Skeleton;

pub use ballistic::Jump;
pub use gait::{Gait, GaitParams};
pub use gesture::{Stand, Wave};
pub use transition::{Keyframe, KeyframedAction};
pub use turn::TurnAround;

/// How an action maps time to phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionTiming {
    /// Repeats with `period` seconds per cycle at tempo 1.
    Looping { period: f64 },
    /// Runs once for `duration` seconds unless the session overrides it.
    OneShot { duration: f64 },
}

impl ActionTiming {
    #[inline]
    pub fn is_looping(&self) -> bool {
        matches!(self, ActionTiming::Looping { .. })
    }

    /// Period or default duration in seconds.
    #[inline]
    pub fn base_span(&self) -> f64 {
        match *self {
            ActionTiming::Looping { period } => period,
            ActionTiming::OneShot { duration } => duration,
        }
    }
}

/// Mirror structure a generator promises.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symmetry {
    #[default]
    None,
    /// Mirrored at the same phase (both sides move together).
    Bilateral,
    /// Mirrored half a cycle later (sides alternate).
    HalfCycle,
}

impl Symmetry {
    /// Phase at which the left/right mirror image of `phase` appears.
    pub fn mirror_phase(&self, phase: f64) -> Option<f64> {
        match self {
            Symmetry::None => None,
            Symmetry::Bilateral => Some(phase),
            Symmetry::HalfCycle => Some((phase + 0.5).rem_euclid(1.0)),
        }
    }
}

/// A pure, deterministic pose function over a normalized phase.
///
/// `pose` must be total over `[0, 1)` for looping actions and `[0, 1]` for
/// one-shots; the compositor normalizes phases before calling it.
pub trait PoseGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn timing(&self) -> ActionTiming;

    fn symmetry(&self) -> Symmetry {
        Symmetry::None
    }

    fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose;

    /// Root displacement accumulated by each completed cycle.
    fn cycle_advance(&self, _skeleton: &Skeleton) -> Vector3<f64> {
        Vector3::zeros()
    }

    /// Whether seeded jitter may be layered on this action.
    fn accepts_jitter(&self) -> bool {
        true
    }

    /// Configured start and end poses of a one-shot.
    fn endpoints(&self, _skeleton: &Skeleton) -> Option<(Pose, Pose)> {
        None
    }
}

/// Cheaply clonable handle on a registered generator.
#[derive(Clone)]
pub struct ActionSpec {
    generator: Arc<dyn PoseGenerator>,
}

impl fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name())
            .field("timing", &self.timing())
            .field("symmetry", &self.symmetry())
            .finish()
    }
}

impl ActionSpec {
    pub fn new(generator: impl PoseGenerator + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    pub fn from_arc(generator: Arc<dyn PoseGenerator>) -> Self {
        Self { generator }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.generator.name()
    }

    #[inline]
    pub fn timing(&self) -> ActionTiming {
        self.generator.timing()
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.timing().is_looping()
    }

    #[inline]
    pub fn symmetry(&self) -> Symmetry {
        self.generator.symmetry()
    }

    #[inline]
    pub fn accepts_jitter(&self) -> bool {
        self.generator.accepts_jitter()
    }

    #[inline]
    pub fn pose(&self, skeleton: &Skeleton, phase: f64) -> Pose {
        self.generator.pose(skeleton, phase)
    }

    #[inline]
    pub fn cycle_advance(&self, skeleton: &Skeleton) -> Vector3<f64> {
        self.generator.cycle_advance(skeleton)
    }

    pub fn endpoints(&self, skeleton: &Skeleton) -> Option<(Pose, Pose)> {
        self.generator.endpoints(skeleton)
    }

    /// Seconds per phase unit: the period divided by the subject's tempo for
    /// looping actions, otherwise `duration` or the action default.
    pub fn span(&self, skeleton: &Skeleton, duration: Option<f64>) -> f64 {
        match self.timing() {
            ActionTiming::Looping { period } => period / skeleton.scale().tempo,
            ActionTiming::OneShot { duration: default } => duration.unwrap_or(default),
        }
    }
}

/// Registry of actions by name.
#[derive(Debug, Clone, Default)]
pub struct ActionLibrary {
    actions: HashMap<String, ActionSpec>,
}

impl ActionLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding every built-in action.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.register_builtin_actions();
        library
    }

    fn register_builtin_actions(&mut self) {
        self.register(ActionSpec::new(Stand));
        self.register(ActionSpec::new(Gait::walk()));
        self.register(ActionSpec::new(Gait::run()));
        self.register(ActionSpec::new(Jump));
        self.register(ActionSpec::new(Wave));
        self.register(ActionSpec::new(KeyframedAction::sit_down()));
        self.register(ActionSpec::new(KeyframedAction::bow()));
        self.register(ActionSpec::new(KeyframedAction::lie_down()));
        self.register(ActionSpec::new(KeyframedAction::roll()));
        self.register(ActionSpec::new(TurnAround));
    }

    /// Register an action, returning the one it replaced.
    pub fn register(&mut self, spec: ActionSpec) -> Option<ActionSpec> {
        debug!(action = spec.name(), timing = ?spec.timing(), "registering action");
        self.actions.insert(spec.name().to_string(), spec)
    }

    pub fn get_action(&self, name: &str) -> Result<ActionSpec, MotionError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| MotionError::UnknownAction {
                name: name.to_string(),
            })
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Look up a built-in action by name.
pub fn get_action(name: &str) -> Result<ActionSpec, MotionError> {
    ActionLibrary::builtin().get_action(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Attributes;
    use crate::kinematics::RootTransform;
    use crate::skeleton::build_skeleton;

    #[derive(Debug)]
    struct Still;

    impl PoseGenerator for Still {
        fn name(&self) -> &str {
            "still"
        }

        fn timing(&self) -> ActionTiming {
            ActionTiming::OneShot { duration: 1.0 }
        }

        fn pose(&self, _skeleton: &Skeleton, _phase: f64) -> Pose {
            Pose::new(RootTransform::default())
        }
    }

    #[test]
    fn builtin_library_has_every_action() {
        let library = ActionLibrary::builtin();
        assert_eq!(
            library.names(),
            vec![
                "bow",
                "jump",
                "lie_down",
                "roll",
                "run",
                "sit_down",
                "stand",
                "turn_around",
                "walk",
                "wave"
            ]
        );
    }

    #[test]
    fn unknown_action_is_reported_by_name() {
        let err = get_action("moonwalk").unwrap_err();
        assert_eq!(
            err,
            MotionError::UnknownAction {
                name: "moonwalk".to_string()
            }
        );
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let mut library = ActionLibrary::new();
        assert!(library.is_empty());
        assert!(library.register(ActionSpec::new(Still)).is_none());
        assert!(library.register(ActionSpec::new(Still)).is_some());
        assert_eq!(library.len(), 1);
        assert!(library.contains("still"));
    }

    #[test]
    fn span_uses_tempo_for_loops_and_override_for_one_shots() {
        let skeleton = build_skeleton(&Attributes::default()).unwrap();
        let walk = get_action("walk").unwrap();
        assert_eq!(walk.span(&skeleton, Some(9.0)), 1.1);
        let sit = get_action("sit_down").unwrap();
        assert_eq!(sit.span(&skeleton, None), 2.0);
        assert_eq!(sit.span(&skeleton, Some(3.5)), 3.5);
    }

    #[test]
    fn mirror_phase_per_symmetry() {
        assert_eq!(Symmetry::None.mirror_phase(0.2), None);
        assert_eq!(Symmetry::Bilateral.mirror_phase(0.2), Some(0.2));
        assert_eq!(Symmetry::HalfCycle.mirror_phase(0.75), Some(0.25));
    }
}
