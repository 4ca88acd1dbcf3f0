//! Skeleton model: the canonical rest pose scaled by subject attributes.

use nalgebra::Vector3;
use serde::Serialize;

use crate::config::{Affect, Attributes, Build};
use crate::error::MotionError;
use crate::marker::{Marker, MARKER_COUNT};

/// Height of the ankle markers above the ground plane, in meters at scale 1.
pub const ANKLE_CLEARANCE: f64 = 0.08;

/// Scale parameters derived from subject attributes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleParams {
    /// Overall size; equals `subject_scale`.
    pub height_scale: f64,
    /// Extra lateral spacing of shoulders and hips.
    pub width_scale: f64,
    /// Multiplier on swing and oscillation amplitudes.
    pub amplitude: f64,
    /// Multiplier on cycle rate (a looping action's period is divided by it).
    pub tempo: f64,
    /// Constant forward trunk lean, radians.
    pub stoop: f64,
    /// Constant forward neck pitch, radians.
    pub head_drop: f64,
}

impl ScaleParams {
    /// Documented attribute mapping; build and affect multiply together.
    pub fn from_attributes(attrs: &Attributes) -> Self {
        let (width_scale, build_amplitude, build_tempo) = match attrs.build {
            Build::Light => (1.0, 1.0, 1.0),
            Build::Heavy => (1.25, 0.75, 0.9),
        };
        let (affect_amplitude, affect_tempo, stoop_deg, head_drop_deg) = match attrs.affect {
            Affect::Neutral => (1.0, 1.0, 0.0, 0.0),
            Affect::Happy => (1.2, 1.15, 0.0, 0.0),
            Affect::Sad => (0.7, 0.8, 12.0, 10.0),
        };
        Self {
            height_scale: attrs.subject_scale,
            width_scale,
            amplitude: build_amplitude * affect_amplitude,
            tempo: build_tempo * affect_tempo,
            stoop: f64::to_radians(stoop_deg),
            head_drop: f64::to_radians(head_drop_deg),
        }
    }
}

/// Ordered markers plus scale parameters. Immutable once built.
#[derive(Clone, Debug)]
pub struct Skeleton {
    attributes: Attributes,
    scale: ScaleParams,
    rest: [Vector3<f64>; MARKER_COUNT],
}

/// Build the session skeleton from validated or unvalidated attributes.
pub fn build_skeleton(attributes: &Attributes) -> Result<Skeleton, MotionError> {
    attributes.validate()?;
    let scale = ScaleParams::from_attributes(attributes);
    let rest = Marker::ALL.map(|m| {
        let [x, y, z] = m.rest_offset();
        Vector3::new(
            x * scale.width_scale * scale.height_scale,
            y * scale.height_scale,
            z * scale.height_scale,
        )
    });
    Ok(Skeleton {
        attributes: *attributes,
        scale,
        rest,
    })
}

impl Skeleton {
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn scale(&self) -> &ScaleParams {
        &self.scale
    }

    /// Rest offset of a marker from the root anchor with scale applied.
    #[inline]
    pub fn rest_offset(&self, marker: Marker) -> Vector3<f64> {
        self.rest[marker.index()]
    }

    #[inline]
    pub fn rest_offsets(&self) -> &[Vector3<f64>; MARKER_COUNT] {
        &self.rest
    }

    /// Rest vector from a marker's parent to the marker.
    pub fn segment(&self, marker: Marker) -> Vector3<f64> {
        match marker.parent() {
            Some(p) => self.rest_offset(marker) - self.rest_offset(p),
            None => Vector3::zeros(),
        }
    }

    pub fn thigh_length(&self) -> f64 {
        self.segment(Marker::LeftKnee).norm()
    }

    pub fn shin_length(&self) -> f64 {
        self.segment(Marker::LeftAnkle).norm()
    }

    pub fn upper_arm_length(&self) -> f64 {
        self.segment(Marker::LeftElbow).norm()
    }

    pub fn forearm_length(&self) -> f64 {
        self.segment(Marker::LeftWrist).norm()
    }

    pub fn trunk_length(&self) -> f64 {
        self.rest_offset(Marker::Neck).norm()
    }

    /// Ground clearance of the ankle markers.
    #[inline]
    pub fn ground_clearance(&self) -> f64 {
        ANKLE_CLEARANCE * self.scale.height_scale
    }

    /// Height of the root anchor above the ground when standing upright.
    pub fn standing_root_height(&self) -> f64 {
        self.ground_clearance() - self.rest_offset(Marker::LeftAnkle).y
    }

    /// Distance between the two shoulder markers at rest.
    pub fn shoulder_width(&self) -> f64 {
        (self.rest_offset(Marker::RightShoulder) - self.rest_offset(Marker::LeftShoulder)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn skel(build: Build, affect: Affect, scale: f64) -> Skeleton {
        build_skeleton(&Attributes::new(build, affect, scale)).unwrap()
    }

    #[test]
    fn rejects_non_positive_scale() {
        let err = build_skeleton(&Attributes::new(Build::Light, Affect::Neutral, 0.0));
        assert!(matches!(err, Err(MotionError::Configuration { .. })));
    }

    #[test]
    fn neutral_light_is_canonical() {
        let s = skel(Build::Light, Affect::Neutral, 1.0);
        for m in Marker::ALL {
            let [x, y, z] = m.rest_offset();
            assert_eq!(s.rest_offset(m), Vector3::new(x, y, z));
        }
        assert_relative_eq!(s.standing_root_height(), 0.95, epsilon = 1e-12);
        assert_relative_eq!(s.shoulder_width(), 0.38, epsilon = 1e-12);
    }

    #[test]
    fn subject_scale_scales_everything() {
        let a = skel(Build::Light, Affect::Neutral, 1.0);
        let b = skel(Build::Light, Affect::Neutral, 2.0);
        assert_relative_eq!(b.thigh_length(), 2.0 * a.thigh_length(), epsilon = 1e-12);
        assert_relative_eq!(b.shoulder_width(), 2.0 * a.shoulder_width(), epsilon = 1e-12);
        assert_relative_eq!(
            b.standing_root_height(),
            2.0 * a.standing_root_height(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn heavy_build_is_wider_and_damped() {
        let light = skel(Build::Light, Affect::Neutral, 1.0);
        let heavy = skel(Build::Heavy, Affect::Neutral, 1.0);
        assert!(heavy.shoulder_width() > light.shoulder_width());
        assert!(heavy.scale().amplitude < light.scale().amplitude);
        // lateral spacing must not change limb lengths along the vertical
        assert_relative_eq!(heavy.rest_offset(Marker::Head).y, 0.70, epsilon = 1e-12);
    }

    #[test]
    fn affect_modulates_tempo_amplitude_and_posture() {
        let happy = ScaleParams::from_attributes(&Attributes::new(Build::Light, Affect::Happy, 1.0));
        let sad = ScaleParams::from_attributes(&Attributes::new(Build::Light, Affect::Sad, 1.0));
        assert!(happy.amplitude > 1.0 && happy.tempo > 1.0);
        assert!(sad.amplitude < 1.0 && sad.tempo < 1.0);
        assert_eq!(happy.stoop, 0.0);
        assert!(sad.stoop > 0.0 && sad.head_drop > 0.0);
    }
}
