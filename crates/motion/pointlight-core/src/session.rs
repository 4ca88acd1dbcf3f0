//! One configured stimulus: skeleton, action library, emitter and a running
//! scheduler built from a validated [`SessionConfig`].

use std::sync::Arc;

use tracing::debug;

use crate::actions::{ActionLibrary, ActionSpec};
use crate::config::SessionConfig;
use crate::emitter::FrameEmitter;
use crate::error::MotionError;
use crate::frame::Frame;
use crate::render::{draw_frame, Renderer, Viewport};
use crate::scheduler::Scheduler;
use crate::skeleton::{build_skeleton, Skeleton};

pub struct Session {
    config: SessionConfig,
    action: ActionSpec,
    scheduler: Scheduler,
}

impl Session {
    /// Session over the built-in actions.
    pub fn new(config: SessionConfig) -> Result<Self, MotionError> {
        Self::with_library(config, Arc::new(ActionLibrary::builtin()))
    }

    pub fn with_library(config: SessionConfig, library: Arc<ActionLibrary>) -> Result<Self, MotionError> {
        config.validate()?;
        let action = library.get_action(&config.action)?;
        if !action.is_looping() && config.duration_seconds.is_none() {
            return Err(MotionError::config(
                "duration_seconds",
                format!("required for one-shot action '{}'", config.action),
            ));
        }
        let skeleton = build_skeleton(&config.attributes)?;
        let emitter = FrameEmitter::from_config(&config, &skeleton);
        let mut scheduler = Scheduler::new(skeleton, library, emitter).with_duration(config.duration_seconds);
        scheduler.set_speed(config.speed)?;
        scheduler.start(&config.action, config.fps)?;
        debug!(
            action = %config.action,
            build = %config.attributes.build,
            affect = %config.attributes.affect,
            seed = ?config.seed,
            "session created"
        );
        Ok(Self {
            config,
            action,
            scheduler,
        })
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn action(&self) -> &ActionSpec {
        &self.action
    }

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        self.scheduler.skeleton()
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Advance one nominal frame interval.
    pub fn next_frame(&mut self) -> Result<Frame, MotionError> {
        self.scheduler.advance()
    }

    /// Advance one frame and draw it.
    pub fn render_next<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        viewport: &Viewport,
    ) -> Result<Frame, MotionError> {
        let frame = self.next_frame()?;
        draw_frame(renderer, viewport, &frame);
        Ok(frame)
    }

    /// Stop and start again with the same configuration.
    pub fn restart(&mut self) -> Result<(), MotionError> {
        self.scheduler.stop();
        self.scheduler.start(&self.config.action, self.config.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;

    #[test]
    fn one_shot_requires_a_duration() {
        let err = Session::new(SessionConfig::new("bow")).err().unwrap();
        match err {
            MotionError::Configuration { field, .. } => assert_eq!(field, "duration_seconds"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Session::new(SessionConfig::new("bow").with_duration(2.0)).is_ok());
    }

    #[test]
    fn unknown_action_fails_before_any_frame() {
        assert!(matches!(
            Session::new(SessionConfig::new("moonwalk")),
            Err(MotionError::UnknownAction { .. })
        ));
    }

    #[test]
    fn render_next_draws_fifteen_points() {
        let mut session = Session::new(SessionConfig::new("walk")).unwrap();
        let mut rec = RecordingRenderer::new();
        let frame = session
            .render_next(&mut rec, &Viewport::new(320, 240, 100.0))
            .unwrap();
        assert_eq!(frame.index, 1);
        assert_eq!(rec.presented()[0].len(), 15);
    }

    #[test]
    fn restart_replays_the_same_frames() {
        let config = SessionConfig::new("wave").with_seed(11);
        let mut session = Session::new(config).unwrap();
        let first: Vec<Frame> = (0..20).map(|_| session.next_frame().unwrap()).collect();
        session.restart().unwrap();
        let second: Vec<Frame> = (0..20).map(|_| session.next_frame().unwrap()).collect();
        assert_eq!(first, second);
    }
}
