//! Clock / phase scheduler: the only mutable state in a session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{ActionLibrary, ActionSpec};
use crate::emitter::{FrameEmitter, FrameStamp};
use crate::error::MotionError;
use crate::frame::Frame;
use crate::skeleton::Skeleton;

/// Accumulated ticks this close to the end of a one-shot complete it.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
    /// A looping action has wrapped at least once.
    Looping,
    /// A one-shot reached its duration.
    Completed,
}

impl SchedulerState {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerState::Stopped => "stopped",
            SchedulerState::Running => "running",
            SchedulerState::Looping => "looping",
            SchedulerState::Completed => "completed",
        }
    }
}

/// Playback notifications queued until [`Scheduler::drain_events`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Started { action: String },
    Wrapped { action: String, cycles: u64 },
    Completed { action: String, time: f64 },
    Stopped { action: String },
    Seeked { action: String, time: f64 },
}

/// Clock of the running action.
#[derive(Clone, Debug)]
pub struct MotionState {
    action: ActionSpec,
    fps: u32,
    /// Seconds per phase unit.
    span: f64,
    /// Seconds into the current cycle (or into the one-shot).
    time: f64,
    cycles: u64,
    frame_index: u64,
    last_frame: Option<Frame>,
}

impl MotionState {
    #[inline]
    pub fn action(&self) -> &ActionSpec {
        &self.action
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.span
    }

    #[inline]
    pub fn time_in_cycle(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.time / self.span
    }

    /// Seconds since start, counting completed cycles.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.cycles as f64 * self.span + self.time
    }
}

pub struct Scheduler {
    skeleton: Skeleton,
    library: Arc<ActionLibrary>,
    emitter: FrameEmitter,
    duration: Option<f64>,
    speed: f64,
    state: SchedulerState,
    motion: Option<MotionState>,
    events: Vec<SchedulerEvent>,
}

impl Scheduler {
    pub fn new(skeleton: Skeleton, library: Arc<ActionLibrary>, emitter: FrameEmitter) -> Self {
        Self {
            skeleton,
            library,
            emitter,
            duration: None,
            speed: 1.0,
            state: SchedulerState::Stopped,
            motion: None,
            events: Vec::new(),
        }
    }

    /// Duration for one-shot actions; `None` uses each action's default.
    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    pub fn motion(&self) -> Option<&MotionState> {
        self.motion.as_ref()
    }

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[inline]
    pub fn emitter(&self) -> &FrameEmitter {
        &self.emitter
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn misuse(&self, requested: &str) -> MotionError {
        MotionError::InvalidState {
            current: self.state.name().to_string(),
            requested: requested.to_string(),
        }
    }

    /// Resolve `action_name` and reset the clock. Only allowed while stopped.
    pub fn start(&mut self, action_name: &str, fps: u32) -> Result<(), MotionError> {
        if self.state != SchedulerState::Stopped {
            return Err(self.misuse("start"));
        }
        if fps == 0 {
            return Err(MotionError::config("fps", "must be a positive integer"));
        }
        let action = self.library.get_action(action_name)?;
        let span = action.span(&self.skeleton, self.duration);
        if !span.is_finite() || span <= 0.0 {
            return Err(MotionError::config(
                "duration_seconds",
                format!("action '{action_name}' needs a finite span > 0, got {span}"),
            ));
        }

        debug!(action = action_name, fps, span, "scheduler started");
        self.events.push(SchedulerEvent::Started {
            action: action_name.to_string(),
        });
        self.motion = Some(MotionState {
            action,
            fps,
            span,
            time: 0.0,
            cycles: 0,
            frame_index: 0,
            last_frame: None,
        });
        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Advance the clock by `dt * speed` seconds and emit the new frame.
    pub fn tick(&mut self, dt: f64) -> Result<Frame, MotionError> {
        if self.state == SchedulerState::Stopped {
            return Err(self.misuse("tick"));
        }
        if !dt.is_finite() || dt < 0.0 {
            return Err(MotionError::InvalidTime { time: dt });
        }
        let Some(motion) = self.motion.as_mut() else {
            return Err(self.misuse("tick"));
        };
        if self.state == SchedulerState::Completed {
            if let Some(frame) = &motion.last_frame {
                return Ok(frame.clone());
            }
            return self.current_frame();
        }

        let span = motion.span;
        let t = motion.time + dt * self.speed;
        if motion.action.is_looping() {
            let wrapped = fmod(t, span);
            let wraps = ((t - wrapped) / span).round() as u64;
            motion.time = if wrapped < span { wrapped } else { 0.0 };
            if wraps > 0 {
                motion.cycles = motion.cycles.saturating_add(wraps);
                self.state = SchedulerState::Looping;
                self.events.push(SchedulerEvent::Wrapped {
                    action: motion.action.name().to_string(),
                    cycles: motion.cycles,
                });
            }
        } else if t + TIME_EPSILON >= span {
            motion.time = span;
            self.state = SchedulerState::Completed;
            debug!(action = motion.action.name(), time = span, "one-shot completed");
            self.events.push(SchedulerEvent::Completed {
                action: motion.action.name().to_string(),
                time: span,
            });
        } else {
            motion.time = t;
        }
        motion.frame_index = motion.frame_index.saturating_add(1);

        self.current_frame()
    }

    /// One nominal frame interval at the configured rate.
    pub fn advance(&mut self) -> Result<Frame, MotionError> {
        let fps = match &self.motion {
            Some(motion) if self.state != SchedulerState::Stopped => motion.fps,
            _ => return Err(self.misuse("advance")),
        };
        self.tick(1.0 / f64::from(fps))
    }

    /// Return to `Stopped` from any state. Calling it again does nothing.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        if let Some(motion) = self.motion.take() {
            debug!(action = motion.action.name(), elapsed = motion.elapsed(), "scheduler stopped");
            self.events.push(SchedulerEvent::Stopped {
                action: motion.action.name().to_string(),
            });
        }
        self.state = SchedulerState::Stopped;
    }

    /// Jump to absolute session time `time` and emit the frame there.
    pub fn seek(&mut self, time: f64) -> Result<Frame, MotionError> {
        if self.state == SchedulerState::Stopped {
            return Err(self.misuse("seek"));
        }
        if !time.is_finite() || time < 0.0 {
            return Err(MotionError::InvalidTime { time });
        }
        let Some(motion) = self.motion.as_mut() else {
            return Err(self.misuse("seek"));
        };
        let span = motion.span;
        if motion.action.is_looping() {
            let mut cycles = (time / span).floor();
            let mut within = time - cycles * span;
            if within >= span {
                cycles += 1.0;
                within = 0.0;
            }
            motion.cycles = cycles as u64;
            motion.time = within.max(0.0);
            self.state = if motion.cycles > 0 {
                SchedulerState::Looping
            } else {
                SchedulerState::Running
            };
        } else {
            motion.cycles = 0;
            motion.time = time.min(span);
            self.state = if time >= span {
                SchedulerState::Completed
            } else {
                SchedulerState::Running
            };
        }
        motion.frame_index = (time * f64::from(motion.fps)).round() as u64;
        debug!(action = motion.action.name(), time, state = self.state.name(), "scheduler seeked");
        self.events.push(SchedulerEvent::Seeked {
            action: motion.action.name().to_string(),
            time,
        });
        self.current_frame()
    }

    /// Playback rate multiplier applied to every later tick.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), MotionError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(MotionError::config(
                "speed",
                format!("must be a finite value >= 0, got {speed}"),
            ));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Emit the frame for the current clock without advancing it.
    pub fn current_frame(&mut self) -> Result<Frame, MotionError> {
        let Some(motion) = self.motion.as_mut() else {
            return Err(self.misuse("frame"));
        };
        let stamp = FrameStamp {
            index: motion.frame_index,
            time: motion.elapsed(),
            cycles: motion.cycles,
        };
        let frame = self
            .emitter
            .emit_stamped(&self.skeleton, &motion.action, motion.phase(), stamp)?;
        motion.last_frame = Some(frame.clone());
        Ok(frame)
    }
}

/// Remainder with the sign of `b`.
fn fmod(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Attributes, SessionConfig, ValidationMode};
    use crate::skeleton::build_skeleton;
    use approx::assert_relative_eq;

    fn scheduler(duration: Option<f64>) -> Scheduler {
        let skeleton = build_skeleton(&Attributes::default()).unwrap();
        let emitter = FrameEmitter::from_config(&SessionConfig::new("walk"), &skeleton);
        Scheduler::new(skeleton, Arc::new(ActionLibrary::builtin()), emitter).with_duration(duration)
    }

    #[test]
    fn fmod_wraps_negatives() {
        assert_relative_eq!(fmod(-0.25, 1.0), 0.75);
        assert_relative_eq!(fmod(2.5, 1.0), 0.5);
        assert_eq!(fmod(1.0, 0.0), 0.0);
    }

    #[test]
    fn tick_requires_a_started_scheduler() {
        let mut s = scheduler(None);
        assert!(matches!(s.tick(0.1), Err(MotionError::InvalidState { .. })));
        assert!(matches!(s.advance(), Err(MotionError::InvalidState { .. })));
        assert!(matches!(s.seek(1.0), Err(MotionError::InvalidState { .. })));
    }

    #[test]
    fn start_is_only_allowed_while_stopped() {
        let mut s = scheduler(None);
        s.start("walk", 30).unwrap();
        let err = s.start("walk", 30).unwrap_err();
        assert_eq!(
            err,
            MotionError::InvalidState {
                current: "running".to_string(),
                requested: "start".to_string()
            }
        );
    }

    #[test]
    fn start_rejects_zero_fps_and_unknown_actions() {
        let mut s = scheduler(None);
        assert!(matches!(s.start("walk", 0), Err(MotionError::Configuration { .. })));
        assert!(matches!(s.start("moonwalk", 30), Err(MotionError::UnknownAction { .. })));
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[test]
    fn bad_time_deltas_are_rejected_without_changing_state() {
        let mut s = scheduler(None);
        s.start("walk", 30).unwrap();
        for dt in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(s.tick(dt), Err(MotionError::InvalidTime { .. })));
        }
        assert_eq!(s.state(), SchedulerState::Running);
        assert_eq!(s.motion().unwrap().frame_index(), 0);
    }

    #[test]
    fn looping_action_wraps_and_counts_cycles() {
        let mut s = scheduler(None);
        s.start("walk", 30).unwrap();
        s.tick(0.6).unwrap();
        assert_eq!(s.state(), SchedulerState::Running);
        s.tick(0.6).unwrap();
        assert_eq!(s.state(), SchedulerState::Looping);
        let motion = s.motion().unwrap();
        assert_eq!(motion.cycles(), 1);
        assert_relative_eq!(motion.time_in_cycle(), 0.1, epsilon = 1e-9);
        let events = s.drain_events();
        assert!(events.contains(&SchedulerEvent::Wrapped {
            action: "walk".to_string(),
            cycles: 1
        }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn one_shot_completes_and_holds_the_final_frame() {
        let mut s = scheduler(Some(1.0));
        s.start("bow", 10).unwrap();
        let mut last = None;
        for _ in 0..10 {
            last = Some(s.advance().unwrap());
        }
        assert_eq!(s.state(), SchedulerState::Completed);
        let final_frame = last.unwrap();
        assert_eq!(final_frame.phase, 1.0);
        let again = s.tick(0.5).unwrap();
        assert_eq!(again, final_frame);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut s = scheduler(None);
        s.stop();
        s.start("stand", 30).unwrap();
        s.stop();
        s.stop();
        assert_eq!(s.state(), SchedulerState::Stopped);
        let stops = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SchedulerEvent::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn seek_positions_loops_and_one_shots() {
        let mut s = scheduler(None);
        s.start("walk", 30).unwrap();
        let frame = s.seek(2.75).unwrap();
        assert_eq!(s.state(), SchedulerState::Looping);
        assert_eq!(s.motion().unwrap().cycles(), 2);
        assert_relative_eq!(frame.time, 2.75, epsilon = 1e-9);
        assert_relative_eq!(frame.phase, 0.55 / 1.1, epsilon = 1e-9);

        s.stop();
        s.start("sit_down", 30).unwrap();
        s.seek(5.0).unwrap();
        assert_eq!(s.state(), SchedulerState::Completed);
        s.seek(0.5).unwrap();
        assert_eq!(s.state(), SchedulerState::Running);
        assert!(matches!(s.seek(-1.0), Err(MotionError::InvalidTime { .. })));
    }

    #[test]
    fn counters_saturate_after_a_far_seek() {
        let skeleton = build_skeleton(&Attributes::default()).unwrap();
        // root advance swamps marker precision this far out
        let config = SessionConfig::new("walk").with_validation(ValidationMode::Lenient);
        let emitter = FrameEmitter::from_config(&config, &skeleton);
        let mut s = Scheduler::new(skeleton, Arc::new(ActionLibrary::builtin()), emitter);
        s.start("walk", 30).unwrap();
        s.seek(1e20).unwrap();
        assert_eq!(s.motion().unwrap().cycles(), u64::MAX);
        for _ in 0..40 {
            let frame = s.tick(1.0 / 30.0).unwrap();
            assert_eq!(frame.index, u64::MAX);
            assert!(frame.is_finite());
        }
        assert_eq!(s.motion().unwrap().cycles(), u64::MAX);
        assert_eq!(s.state(), SchedulerState::Looping);
    }

    #[test]
    fn speed_scales_time() {
        let mut s = scheduler(None);
        s.start("walk", 30).unwrap();
        s.set_speed(0.0).unwrap();
        s.tick(0.5).unwrap();
        assert_eq!(s.motion().unwrap().time_in_cycle(), 0.0);
        s.set_speed(2.0).unwrap();
        s.tick(0.25).unwrap();
        assert_relative_eq!(s.motion().unwrap().time_in_cycle(), 0.5);
        assert!(s.set_speed(f64::NAN).is_err());
    }
}
