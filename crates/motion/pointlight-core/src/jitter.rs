//! Seeded per-marker jitter.
//!
//! Each marker gets a small sinusoidal wobble per axis whose amplitude, phase
//! and integer harmonic are drawn once from a seeded generator. Integer
//! harmonics keep looping actions periodic; one-shots scale the wobble by an
//! envelope that vanishes at both ends.

use std::f64::consts::TAU;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::marker::{Marker, MARKER_COUNT};
use crate::skeleton::Skeleton;

/// Largest per-axis wobble in meters at scale 1.
pub const MAX_JITTER: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Wobble {
    amplitude: Vector3<f64>,
    phase: Vector3<f64>,
    harmonic: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Jitter {
    seed: u64,
    wobble: [Wobble; MARKER_COUNT],
}

impl Jitter {
    pub fn from_seed(seed: u64, skeleton: &Skeleton) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let limit = MAX_JITTER * skeleton.scale().height_scale;
        // Marker order fixes the draw order, so the field is reproducible.
        let wobble = Marker::ALL.map(|_| Wobble {
            amplitude: Vector3::new(
                rng.gen_range(0.0..=limit),
                rng.gen_range(0.0..=limit),
                rng.gen_range(0.0..=limit),
            ),
            phase: Vector3::new(
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
            ),
            harmonic: rng.gen_range(1..=3),
        });
        Self { seed, wobble }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Offset of `marker` at `phase`, scaled by `envelope` in `[0, 1]`.
    pub fn offset(&self, marker: Marker, phase: f64, envelope: f64) -> Vector3<f64> {
        if envelope == 0.0 {
            return Vector3::zeros();
        }
        let w = &self.wobble[marker.index()];
        let angle = TAU * f64::from(w.harmonic) * phase;
        Vector3::new(
            w.amplitude.x * (angle + w.phase.x).sin(),
            w.amplitude.y * (angle + w.phase.y).sin(),
            w.amplitude.z * (angle + w.phase.z).sin(),
        ) * envelope
    }
}
