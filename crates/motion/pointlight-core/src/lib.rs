//! Pointlight Core
//!
//! Parametric kinematic engine for point-light biological motion: a canonical
//! 15-marker body scaled by subject attributes, a library of pure pose
//! generators, a phase scheduler and a validating frame emitter that hands
//! projected 2D frames to a renderer.
//!
//! ```no_run
//! use pointlight_core::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::new("walk")).unwrap();
//! let frame = session.next_frame().unwrap();
//! assert_eq!(frame.points.len(), 15);
//! ```

pub mod actions;
pub mod baking;
pub mod compositor;
pub mod config;
pub mod easing;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod jitter;
pub mod kinematics;
pub mod marker;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod skeleton;

// Re-exports for consumers (renderers, experiment drivers)
pub use actions::{get_action, ActionLibrary, ActionSpec, ActionTiming, PoseGenerator, Symmetry};
pub use baking::{bake, export_json, BakedClip, BakingConfig};
pub use compositor::{compose, Composed, MotionCompositor};
pub use config::{Affect, Attributes, BoundsConfig, Build, SessionConfig, ValidationMode, ViewConfig};
pub use easing::Easing;
pub use emitter::{FrameEmitter, FrameStamp};
pub use error::MotionError;
pub use frame::{BoundingBox, Frame, FrameRecord, View};
pub use jitter::Jitter;
pub use kinematics::{Articulation, Bilateral, Ground, Pose, RootTransform};
pub use marker::{Marker, Side, MARKER_COUNT};
pub use render::{draw_frame, Anchor, AsciiCanvas, RecordingRenderer, Renderer, Viewport};
pub use scheduler::{MotionState, Scheduler, SchedulerEvent, SchedulerState};
pub use session::Session;
pub use skeleton::{build_skeleton, ScaleParams, Skeleton};

pub type Result<T> = std::result::Result<T, MotionError>;
