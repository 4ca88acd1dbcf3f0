//! Projected output frames and the camera that produces them.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::{BoundsConfig, ViewConfig};
use crate::marker::{Marker, MARKER_COUNT};

/// One projected instant: 15 `(x, y)` points in marker order plus the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Ticks since the scheduler started (or the sample index when baking).
    pub index: u64,
    /// Session time in seconds.
    pub time: f64,
    /// Normalized phase the frame was evaluated at.
    pub phase: f64,
    /// Projected root anchor.
    pub root: [f64; 2],
    pub points: [[f64; 2]; MARKER_COUNT],
}

impl Frame {
    #[inline]
    pub fn point(&self, marker: Marker) -> [f64; 2] {
        self.points[marker.index()]
    }

    /// Point relative to the projected root.
    #[inline]
    pub fn relative(&self, marker: Marker) -> [f64; 2] {
        let [x, y] = self.point(marker);
        [x - self.root[0], y - self.root[1]]
    }

    /// Interchange layout: `x0, y0, x1, y1, ...` in marker order.
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.iter().copied()).collect()
    }

    pub fn to_record(&self) -> FrameRecord {
        FrameRecord {
            index: self.index,
            time: self.time,
            coords: self.to_flat(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.root.iter().all(|v| v.is_finite())
            && self.points.iter().flatten().all(|v| v.is_finite())
    }
}

/// Flat export record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: u64,
    pub time: f64,
    pub coords: Vec<f64>,
}

/// Orthographic camera rotated about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    azimuth: f64,
}

impl Default for View {
    fn default() -> Self {
        Self::from_degrees(ViewConfig::default().azimuth_deg)
    }
}

impl View {
    /// 0 looks at the subject's front, 90 at its right side.
    pub fn from_degrees(azimuth_deg: f64) -> Self {
        Self {
            azimuth: azimuth_deg.to_radians(),
        }
    }

    pub fn frontal() -> Self {
        Self::from_degrees(0.0)
    }

    pub fn side() -> Self {
        Self::from_degrees(90.0)
    }

    #[inline]
    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth.to_degrees()
    }

    #[inline]
    pub fn project(&self, v: &Vector3<f64>) -> [f64; 2] {
        let (s, c) = self.azimuth.sin_cos();
        [v.x * c + v.z * s, v.y]
    }
}

impl From<&ViewConfig> for View {
    fn from(config: &ViewConfig) -> Self {
        Self::from_degrees(config.azimuth_deg)
    }
}

/// Sanity box for root-relative projected coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

impl From<&BoundsConfig> for BoundingBox {
    fn from(config: &BoundsConfig) -> Self {
        Self {
            min_x: config.min_x,
            max_x: config.max_x,
            min_y: config.min_y,
            max_y: config.max_y,
        }
    }
}
