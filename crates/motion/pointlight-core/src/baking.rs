//! Baking API: evaluate an action at fixed sample times, independent of any
//! live scheduler.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::actions::{ActionSpec, ActionTiming};
use crate::emitter::{FrameEmitter, FrameStamp};
use crate::error::MotionError;
use crate::frame::FrameRecord;
use crate::skeleton::Skeleton;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f64,
    /// Start time (seconds) in session time.
    pub start_time: f64,
    /// End time (seconds); if None, one period for loops or the duration for one-shots.
    pub end_time: Option<f64>,
    /// One-shot duration override; if None, the action default.
    pub duration_seconds: Option<f64>,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            start_time: 0.0,
            end_time: None,
            duration_seconds: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedClip {
    pub action: String,
    pub frame_rate: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub frames: Vec<FrameRecord>,
}

/// Bake `action` over the configured window. Sample `i` is taken at
/// `start + i / frame_rate`, clamped to the window end, and is computed from
/// that time alone.
pub fn bake(
    skeleton: &Skeleton,
    action: &ActionSpec,
    emitter: &FrameEmitter,
    cfg: &BakingConfig,
) -> Result<BakedClip, MotionError> {
    if !cfg.frame_rate.is_finite() || cfg.frame_rate <= 0.0 {
        return Err(MotionError::config("frame_rate", "must be a finite value > 0"));
    }
    if !cfg.start_time.is_finite() || cfg.start_time < 0.0 {
        return Err(MotionError::InvalidTime {
            time: cfg.start_time,
        });
    }
    let span = action.span(skeleton, cfg.duration_seconds);
    if !span.is_finite() || span <= 0.0 {
        return Err(MotionError::config(
            "duration_seconds",
            format!("must be a finite value > 0, got {span}"),
        ));
    }
    let start = cfg.start_time;
    let end = match cfg.end_time {
        Some(end) if end.is_finite() => end.max(start),
        Some(end) => return Err(MotionError::InvalidTime { time: end }),
        None => match action.timing() {
            ActionTiming::Looping { .. } => start + span,
            ActionTiming::OneShot { .. } => span.max(start),
        },
    };
    // The small slack keeps float noise from adding a sample past the end.
    let frame_count = ((end - start) * cfg.frame_rate - 1e-9).ceil().max(0.0) as usize + 1;

    let sample = |i: usize| -> Result<FrameRecord, MotionError> {
        let t = (start + i as f64 / cfg.frame_rate).min(end);
        let (phase, cycles) = if action.is_looping() {
            let cycles = (t / span).floor();
            (t / span - cycles, cycles as u64)
        } else {
            ((t / span).min(1.0), 0)
        };
        let stamp = FrameStamp {
            index: i as u64,
            time: t,
            cycles,
        };
        emitter
            .emit_stamped(skeleton, action, phase, stamp)
            .map(|frame| frame.to_record())
    };

    #[cfg(feature = "parallel")]
    let frames = (0..frame_count)
        .into_par_iter()
        .map(sample)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let frames = (0..frame_count)
        .map(sample)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(action = action.name(), frames = frames.len(), start, end, "baked clip");
    Ok(BakedClip {
        action: action.name().to_string(),
        frame_rate: cfg.frame_rate,
        start_time: start,
        end_time: end,
        frames,
    })
}

/// Export a baked clip as serde_json::Value (stable schema for interchange).
pub fn export_json(clip: &BakedClip) -> serde_json::Value {
    serde_json::to_value(clip).unwrap_or(serde_json::Value::Null)
}
