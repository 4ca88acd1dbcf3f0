//! Turns composed poses into validated, projected frames.

use tracing::warn;

use crate::actions::ActionSpec;
use crate::compositor::{normalize_phase, Composed, MotionCompositor};
use crate::config::{SessionConfig, ValidationMode};
use crate::error::MotionError;
use crate::frame::{BoundingBox, Frame, View};
use crate::jitter::Jitter;
use crate::kinematics::Pose;
use crate::marker::{Marker, MARKER_COUNT};
use crate::skeleton::Skeleton;

/// Where a frame sits in a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStamp {
    pub index: u64,
    pub time: f64,
    /// Completed loops before this frame.
    pub cycles: u64,
}

#[derive(Clone, Debug)]
pub struct FrameEmitter {
    compositor: MotionCompositor,
    view: View,
    bounds: BoundingBox,
    mode: ValidationMode,
}

impl FrameEmitter {
    pub fn new(view: View, bounds: BoundingBox, mode: ValidationMode) -> Self {
        Self {
            compositor: MotionCompositor::new(),
            view,
            bounds,
            mode,
        }
    }

    /// Emitter for a session: view, bounds, validation mode and seeded jitter.
    pub fn from_config(config: &SessionConfig, skeleton: &Skeleton) -> Self {
        let emitter = Self::new(View::from(&config.view), BoundingBox::from(&config.bounds), config.validation);
        match config.seed {
            Some(seed) => emitter.with_compositor(MotionCompositor::with_jitter(Jitter::from_seed(seed, skeleton))),
            None => emitter,
        }
    }

    pub fn with_compositor(mut self, compositor: MotionCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    #[inline]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    #[inline]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Frame for `action` at `phase`; time is the phase scaled by the action's
    /// default span.
    pub fn emit(&self, skeleton: &Skeleton, action: &ActionSpec, phase: f64) -> Result<Frame, MotionError> {
        let normalized = normalize_phase(action, phase)?;
        let stamp = FrameStamp {
            index: 0,
            time: normalized * action.span(skeleton, None),
            cycles: 0,
        };
        self.emit_stamped(skeleton, action, phase, stamp)
    }

    pub fn emit_stamped(
        &self,
        skeleton: &Skeleton,
        action: &ActionSpec,
        phase: f64,
        stamp: FrameStamp,
    ) -> Result<Frame, MotionError> {
        let phase = normalize_phase(action, phase)?;
        let composed = self.compositor.compose_cycle(skeleton, action, phase, stamp.cycles)?;
        self.finish(action.name(), phase, &composed, stamp)
    }

    /// Frame for an explicit pose, e.g. an action's configured endpoint.
    pub fn emit_pose(&self, skeleton: &Skeleton, action: &str, pose: &Pose) -> Result<Frame, MotionError> {
        let composed = self.compositor.compose_pose(skeleton, action, pose)?;
        self.finish(action, 0.0, &composed, FrameStamp::default())
    }

    fn finish(&self, action: &str, phase: f64, composed: &Composed, stamp: FrameStamp) -> Result<Frame, MotionError> {
        let root = self.view.project(&composed.root);
        let mut points = [[0.0; 2]; MARKER_COUNT];
        for marker in Marker::ALL {
            points[marker.index()] = self.view.project(&composed.markers[marker.index()]);
        }
        let frame = Frame {
            index: stamp.index,
            time: stamp.time,
            phase,
            root,
            points,
        };
        if !frame.is_finite() {
            let marker = Marker::ALL
                .iter()
                .find(|m| frame.point(**m).iter().any(|v| !v.is_finite()))
                .map_or("root", |m| m.name());
            return Err(MotionError::MotionComputation {
                action: action.to_string(),
                phase,
                marker: marker.to_string(),
            });
        }
        self.check_bounds(action, &frame)?;
        Ok(frame)
    }

    fn check_bounds(&self, action: &str, frame: &Frame) -> Result<(), MotionError> {
        let Some(marker) = Marker::ALL.iter().copied().find(|m| {
            let [x, y] = frame.relative(*m);
            !self.bounds.contains(x, y)
        }) else {
            return Ok(());
        };
        let [x, y] = frame.relative(marker);
        match self.mode {
            ValidationMode::Strict => Err(MotionError::OutOfBounds {
                action: action.to_string(),
                phase: frame.phase,
                marker: marker.name().to_string(),
                x,
                y,
            }),
            ValidationMode::Lenient => {
                warn!(
                    action,
                    phase = frame.phase,
                    marker = marker.name(),
                    x,
                    y,
                    "frame out of bounds"
                );
                Ok(())
            }
        }
    }
}
