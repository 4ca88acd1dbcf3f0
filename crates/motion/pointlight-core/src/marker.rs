//! The canonical 15-marker anatomical layout.
//!
//! Index order is part of the output contract: `Frame::points[i]` always
//! belongs to `Marker::ALL[i]`.

use serde::{Deserialize, Serialize};

/// Number of markers in every frame.
pub const MARKER_COUNT: usize = 15;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Head,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    Pelvis,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Center,
}

impl Side {
    /// Sign of the lateral axis on this side (left is negative x).
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
            Side::Center => 0.0,
        }
    }
}

impl Marker {
    pub const ALL: [Marker; MARKER_COUNT] = [
        Marker::Head,
        Marker::Neck,
        Marker::LeftShoulder,
        Marker::RightShoulder,
        Marker::LeftElbow,
        Marker::RightElbow,
        Marker::LeftWrist,
        Marker::RightWrist,
        Marker::Pelvis,
        Marker::LeftHip,
        Marker::RightHip,
        Marker::LeftKnee,
        Marker::RightKnee,
        Marker::LeftAnkle,
        Marker::RightAnkle,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Marker::Head => "head",
            Marker::Neck => "neck",
            Marker::LeftShoulder => "left_shoulder",
            Marker::RightShoulder => "right_shoulder",
            Marker::LeftElbow => "left_elbow",
            Marker::RightElbow => "right_elbow",
            Marker::LeftWrist => "left_wrist",
            Marker::RightWrist => "right_wrist",
            Marker::Pelvis => "pelvis",
            Marker::LeftHip => "left_hip",
            Marker::RightHip => "right_hip",
            Marker::LeftKnee => "left_knee",
            Marker::RightKnee => "right_knee",
            Marker::LeftAnkle => "left_ankle",
            Marker::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Marker> {
        Marker::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Parent in the limb chain; the pelvis is the root anchor.
    pub fn parent(self) -> Option<Marker> {
        match self {
            Marker::Pelvis => None,
            Marker::Neck | Marker::LeftHip | Marker::RightHip => Some(Marker::Pelvis),
            Marker::Head | Marker::LeftShoulder | Marker::RightShoulder => Some(Marker::Neck),
            Marker::LeftElbow => Some(Marker::LeftShoulder),
            Marker::RightElbow => Some(Marker::RightShoulder),
            Marker::LeftWrist => Some(Marker::LeftElbow),
            Marker::RightWrist => Some(Marker::RightElbow),
            Marker::LeftKnee => Some(Marker::LeftHip),
            Marker::RightKnee => Some(Marker::RightHip),
            Marker::LeftAnkle => Some(Marker::LeftKnee),
            Marker::RightAnkle => Some(Marker::RightKnee),
        }
    }

    pub fn side(self) -> Side {
        match self {
            Marker::LeftShoulder
            | Marker::LeftElbow
            | Marker::LeftWrist
            | Marker::LeftHip
            | Marker::LeftKnee
            | Marker::LeftAnkle => Side::Left,
            Marker::RightShoulder
            | Marker::RightElbow
            | Marker::RightWrist
            | Marker::RightHip
            | Marker::RightKnee
            | Marker::RightAnkle => Side::Right,
            Marker::Head | Marker::Neck | Marker::Pelvis => Side::Center,
        }
    }

    /// Left/right counterpart; midline markers mirror onto themselves.
    pub fn mirror(self) -> Marker {
        match self {
            Marker::LeftShoulder => Marker::RightShoulder,
            Marker::RightShoulder => Marker::LeftShoulder,
            Marker::LeftElbow => Marker::RightElbow,
            Marker::RightElbow => Marker::LeftElbow,
            Marker::LeftWrist => Marker::RightWrist,
            Marker::RightWrist => Marker::LeftWrist,
            Marker::LeftHip => Marker::RightHip,
            Marker::RightHip => Marker::LeftHip,
            Marker::LeftKnee => Marker::RightKnee,
            Marker::RightKnee => Marker::LeftKnee,
            Marker::LeftAnkle => Marker::RightAnkle,
            Marker::RightAnkle => Marker::LeftAnkle,
            other => other,
        }
    }

    /// Rest offset from the pelvis anchor in meters for a 1.75 m figure
    /// (x lateral with left negative, y up, z forward).
    pub(crate) fn rest_offset(self) -> [f64; 3] {
        match self {
            Marker::Head => [0.0, 0.70, 0.0],
            Marker::Neck => [0.0, 0.50, 0.0],
            Marker::LeftShoulder => [-0.19, 0.47, 0.0],
            Marker::RightShoulder => [0.19, 0.47, 0.0],
            Marker::LeftElbow => [-0.21, 0.17, 0.0],
            Marker::RightElbow => [0.21, 0.17, 0.0],
            Marker::LeftWrist => [-0.22, -0.08, 0.0],
            Marker::RightWrist => [0.22, -0.08, 0.0],
            Marker::Pelvis => [0.0, 0.0, 0.0],
            Marker::LeftHip => [-0.10, -0.03, 0.0],
            Marker::RightHip => [0.10, -0.03, 0.0],
            Marker::LeftKnee => [-0.10, -0.45, 0.0],
            Marker::RightKnee => [0.10, -0.45, 0.0],
            Marker::LeftAnkle => [-0.10, -0.87, 0.0],
            Marker::RightAnkle => [0.10, -0.87, 0.0],
        }
    }
}
