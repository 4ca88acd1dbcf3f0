//! Joint-angle articulation and forward kinematics over the scaled rest skeleton.
//!
//! Angles are radians. Sagittal rotations ("pitch") swing a hanging segment
//! forward for positive angles; abduction raises a limb away from the midline
//! on its own side. An all-zero [`Articulation`] reproduces the rest pose,
//! so pose deltas vanish at rest.

use nalgebra::Vector3;

use crate::easing::lerp;
use crate::marker::{Marker, Side, MARKER_COUNT};
use crate::skeleton::Skeleton;

/// Per-side joint value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bilateral {
    pub left: f64,
    pub right: f64,
}

impl Bilateral {
    #[inline]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    #[inline]
    pub const fn both(value: f64) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    #[inline]
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Center => 0.5 * (self.left + self.right),
        }
    }

    #[inline]
    pub fn lerp(&self, other: &Bilateral, t: f64) -> Bilateral {
        Bilateral {
            left: lerp(self.left, other.left, t),
            right: lerp(self.right, other.right, t),
        }
    }
}

/// Whole-body joint configuration for one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Articulation {
    /// Forward lean of the upper body about the pelvis.
    pub trunk_pitch: f64,
    /// Forward tilt of the head relative to the trunk.
    pub neck_pitch: f64,
    pub shoulder_flex: Bilateral,
    pub shoulder_abduction: Bilateral,
    pub elbow_flex: Bilateral,
    /// Extra abduction of the forearm relative to the upper arm.
    pub forearm_roll: Bilateral,
    pub hip_flex: Bilateral,
    pub knee_flex: Bilateral,
    /// Rotation of the whole body about the vertical axis.
    pub root_yaw: f64,
    /// Rotation of the whole body about the lateral axis; positive tips the
    /// head backward.
    pub root_pitch: f64,
    /// Root displacement in meters for a scale-1 subject.
    pub root_offset: Vector3<f64>,
}

impl Default for Articulation {
    fn default() -> Self {
        Self {
            trunk_pitch: 0.0,
            neck_pitch: 0.0,
            shoulder_flex: Bilateral::default(),
            shoulder_abduction: Bilateral::default(),
            elbow_flex: Bilateral::default(),
            forearm_roll: Bilateral::default(),
            hip_flex: Bilateral::default(),
            knee_flex: Bilateral::default(),
            root_yaw: 0.0,
            root_pitch: 0.0,
            root_offset: Vector3::zeros(),
        }
    }
}

impl Articulation {
    /// Upright rest posture.
    pub fn standing() -> Self {
        Self::default()
    }

    /// Component-wise blend, exact at `t = 0` and `t = 1`.
    pub fn lerp(&self, other: &Articulation, t: f64) -> Articulation {
        Articulation {
            trunk_pitch: lerp(self.trunk_pitch, other.trunk_pitch, t),
            neck_pitch: lerp(self.neck_pitch, other.neck_pitch, t),
            shoulder_flex: self.shoulder_flex.lerp(&other.shoulder_flex, t),
            shoulder_abduction: self.shoulder_abduction.lerp(&other.shoulder_abduction, t),
            elbow_flex: self.elbow_flex.lerp(&other.elbow_flex, t),
            forearm_roll: self.forearm_roll.lerp(&other.forearm_roll, t),
            hip_flex: self.hip_flex.lerp(&other.hip_flex, t),
            knee_flex: self.knee_flex.lerp(&other.knee_flex, t),
            root_yaw: lerp(self.root_yaw, other.root_yaw, t),
            root_pitch: lerp(self.root_pitch, other.root_pitch, t),
            root_offset: Vector3::new(
                lerp(self.root_offset.x, other.root_offset.x, t),
                lerp(self.root_offset.y, other.root_offset.y, t),
                lerp(self.root_offset.z, other.root_offset.z, t),
            ),
        }
    }
}

/// How the root height (and fore/aft position) is tied to the ground plane.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Ground {
    /// Root sits at standing height plus the articulation's offset.
    #[default]
    Free,
    /// Lowest ankle rests at ankle clearance and the ankles keep their rest
    /// fore/aft position, so the pelvis moves instead of the feet.
    PlantFeet,
    /// Lowest marker of the whole body rests at ankle clearance.
    Support,
}

/// Whole-body transform applied on top of per-marker articulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootTransform {
    pub translation: Vector3<f64>,
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl RootTransform {
    /// Rotation only (pitch first, then yaw).
    #[inline]
    pub fn rotate(&self, local: &Vector3<f64>) -> Vector3<f64> {
        yaw(&pitch(local, self.pitch), self.yaw)
    }

    #[inline]
    pub fn apply(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.translation + self.rotate(local)
    }

    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite())
            && self.yaw.is_finite()
            && self.pitch.is_finite()
    }
}

/// Output of a pose generator: a root transform plus sparse marker deltas
/// from the scaled rest offsets. Markers without a delta stay at rest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    pub root: RootTransform,
    pub offsets: Vec<(Marker, Vector3<f64>)>,
}

impl Pose {
    pub fn new(root: RootTransform) -> Self {
        Self {
            root,
            offsets: Vec::new(),
        }
    }

    /// Pose whose deltas move every marker to `local`.
    pub fn from_local(skeleton: &Skeleton, root: RootTransform, local: &[Vector3<f64>; MARKER_COUNT]) -> Self {
        let offsets = Marker::ALL
            .iter()
            .map(|&m| (m, local[m.index()] - skeleton.rest_offset(m)))
            .collect();
        Self { root, offsets }
    }

    /// Add `delta` to the marker's existing delta (or set it).
    pub fn add_offset(&mut self, marker: Marker, delta: Vector3<f64>) {
        match self.offsets.iter_mut().find(|(m, _)| *m == marker) {
            Some((_, d)) => *d += delta,
            None => self.offsets.push((marker, delta)),
        }
    }

    pub fn offset(&self, marker: Marker) -> Option<Vector3<f64>> {
        self.offsets
            .iter()
            .rev()
            .find(|(m, _)| *m == marker)
            .map(|(_, d)| *d)
    }
}

/// Sagittal rotation: positive swings a downward segment toward +z.
#[inline]
pub fn pitch(v: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    let (s, c) = angle.sin_cos();
    Vector3::new(v.x, v.y * c + v.z * s, -v.y * s + v.z * c)
}

/// Frontal rotation raising a downward segment outward on `side`.
#[inline]
pub fn abduct(v: &Vector3<f64>, angle: f64, side: Side) -> Vector3<f64> {
    let (s, c) = (angle * side.sign()).sin_cos();
    Vector3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Rotation about the vertical axis: positive turns +z toward +x.
#[inline]
pub fn yaw(v: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    let (s, c) = angle.sin_cos();
    Vector3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

/// Marker positions relative to the root anchor before the root transform.
pub fn forward_kinematics(skeleton: &Skeleton, art: &Articulation) -> [Vector3<f64>; MARKER_COUNT] {
    let posture = skeleton.scale();
    let trunk = art.trunk_pitch + posture.stoop;
    let neck_tilt = art.neck_pitch + posture.head_drop;

    let mut out = [Vector3::zeros(); MARKER_COUNT];
    let mut put = |m: Marker, v: Vector3<f64>| out[m.index()] = v;

    // The upper body leans as a rigid block: tipping its upward segments
    // forward is a negative sagittal rotation.
    let neck = pitch(&skeleton.rest_offset(Marker::Neck), -trunk);
    put(Marker::Neck, neck);
    put(Marker::Head, neck + pitch(&skeleton.segment(Marker::Head), -(trunk + neck_tilt)));
    put(Marker::Pelvis, skeleton.rest_offset(Marker::Pelvis));

    for (shoulder, elbow, wrist) in [
        (Marker::LeftShoulder, Marker::LeftElbow, Marker::LeftWrist),
        (Marker::RightShoulder, Marker::RightElbow, Marker::RightWrist),
    ] {
        let side = shoulder.side();
        let flex = art.shoulder_flex.get(side);
        let abd = art.shoulder_abduction.get(side);
        let s = pitch(&skeleton.rest_offset(shoulder), -trunk);
        let upper = abduct(&pitch(&skeleton.segment(elbow), flex), abd, side);
        let e = s + pitch(&upper, -trunk);
        let fore = abduct(
            &pitch(&skeleton.segment(wrist), flex + art.elbow_flex.get(side)),
            abd + art.forearm_roll.get(side),
            side,
        );
        put(shoulder, s);
        put(elbow, e);
        put(wrist, e + pitch(&fore, -trunk));
    }

    for (hip, knee, ankle) in [
        (Marker::LeftHip, Marker::LeftKnee, Marker::LeftAnkle),
        (Marker::RightHip, Marker::RightKnee, Marker::RightAnkle),
    ] {
        let side = hip.side();
        let thigh = art.hip_flex.get(side);
        let h = skeleton.rest_offset(hip);
        let k = h + pitch(&skeleton.segment(knee), thigh);
        put(hip, h);
        put(knee, k);
        put(ankle, k + pitch(&skeleton.segment(ankle), thigh - art.knee_flex.get(side)));
    }

    out
}

/// Solve an articulation into a full pose, placing the root per `ground`.
pub fn solve_pose(skeleton: &Skeleton, art: &Articulation, ground: Ground) -> Pose {
    let local = forward_kinematics(skeleton, art);
    let mut root = RootTransform {
        translation: Vector3::zeros(),
        yaw: art.root_yaw,
        pitch: art.root_pitch,
    };
    let offset = art.root_offset * skeleton.scale().height_scale;
    let clearance = skeleton.ground_clearance();

    root.translation = match ground {
        Ground::Free => Vector3::new(0.0, skeleton.standing_root_height(), 0.0) + offset,
        Ground::PlantFeet => {
            let la = root.rotate(&local[Marker::LeftAnkle.index()]);
            let ra = root.rotate(&local[Marker::RightAnkle.index()]);
            let rest_z = skeleton.rest_offset(Marker::LeftAnkle).z;
            Vector3::new(
                offset.x,
                clearance - la.y.min(ra.y) + offset.y,
                rest_z - 0.5 * (la.z + ra.z) + offset.z,
            )
        }
        Ground::Support => {
            let lowest = local
                .iter()
                .map(|p| root.rotate(p).y)
                .fold(f64::INFINITY, f64::min);
            Vector3::new(offset.x, clearance - lowest + offset.y, offset.z)
        }
    };

    Pose::from_local(skeleton, root, &local)
}

#[inline]
pub fn deg(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Affect, Attributes, Build};
    use crate::skeleton::build_skeleton;
    use approx::assert_relative_eq;

    fn skeleton() -> Skeleton {
        build_skeleton(&Attributes::default()).unwrap()
    }

    #[test]
    fn zero_articulation_reproduces_rest() {
        let s = skeleton();
        let local = forward_kinematics(&s, &Articulation::standing());
        for m in Marker::ALL {
            assert_relative_eq!(local[m.index()], s.rest_offset(m), epsilon = 1e-12);
        }
    }

    #[test]
    fn standing_pose_has_zero_deltas_and_standing_height() {
        let s = skeleton();
        let pose = solve_pose(&s, &Articulation::standing(), Ground::PlantFeet);
        for (_, d) in &pose.offsets {
            assert!(d.norm() < 1e-12);
        }
        assert_relative_eq!(pose.root.translation.y, s.standing_root_height(), epsilon = 1e-12);
    }

    #[test]
    fn hip_flex_swings_knee_forward() {
        let s = skeleton();
        let mut art = Articulation::standing();
        art.hip_flex = Bilateral::new(deg(30.0), 0.0);
        let local = forward_kinematics(&s, &art);
        assert!(local[Marker::LeftKnee.index()].z > 0.0);
        assert_eq!(local[Marker::RightKnee.index()].z, 0.0);
        // segment lengths are preserved
        let thigh = local[Marker::LeftKnee.index()] - local[Marker::LeftHip.index()];
        assert_relative_eq!(thigh.norm(), s.thigh_length(), epsilon = 1e-12);
    }

    #[test]
    fn abduction_raises_arms_outward_on_both_sides() {
        let s = skeleton();
        let mut art = Articulation::standing();
        art.shoulder_abduction = Bilateral::both(deg(90.0));
        let local = forward_kinematics(&s, &art);
        let le = local[Marker::LeftElbow.index()];
        let re = local[Marker::RightElbow.index()];
        assert!(le.x < s.rest_offset(Marker::LeftShoulder).x - 0.2);
        assert!(re.x > s.rest_offset(Marker::RightShoulder).x + 0.2);
        assert_relative_eq!(le.x, -re.x, epsilon = 1e-12);
    }

    #[test]
    fn planted_feet_keep_ankles_on_the_ground() {
        let s = skeleton();
        let mut art = Articulation::standing();
        art.hip_flex = Bilateral::both(deg(80.0));
        art.knee_flex = Bilateral::both(deg(80.0));
        let pose = solve_pose(&s, &art, Ground::PlantFeet);
        let local = forward_kinematics(&s, &art);
        let ankle = pose.root.apply(&local[Marker::LeftAnkle.index()]);
        assert_relative_eq!(ankle.y, s.ground_clearance(), epsilon = 1e-12);
        assert_relative_eq!(ankle.z, 0.0, epsilon = 1e-12);
        assert!(pose.root.translation.y < s.standing_root_height());
    }

    #[test]
    fn support_puts_lowest_marker_on_the_ground() {
        let s = skeleton();
        let mut art = Articulation::standing();
        art.root_pitch = deg(90.0);
        let pose = solve_pose(&s, &art, Ground::Support);
        let local = forward_kinematics(&s, &art);
        let lowest = local
            .iter()
            .map(|p| pose.root.apply(p).y)
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(lowest, s.ground_clearance(), epsilon = 1e-12);
    }

    #[test]
    fn stoop_leans_the_trunk_forward() {
        let sad = build_skeleton(&Attributes::new(Build::Light, Affect::Sad, 1.0)).unwrap();
        let local = forward_kinematics(&sad, &Articulation::standing());
        assert!(local[Marker::Head.index()].z > 0.05);
        assert!(local[Marker::Neck.index()].z > 0.0);
        assert_relative_eq!(
            local[Marker::LeftAnkle.index()],
            sad.rest_offset(Marker::LeftAnkle),
            epsilon = 1e-12
        );
    }

    #[test]
    fn articulation_lerp_is_exact_at_ends() {
        let a = Articulation::standing();
        let mut b = Articulation::standing();
        b.trunk_pitch = 0.3;
        b.knee_flex = Bilateral::new(0.1, 0.7);
        b.root_offset = Vector3::new(0.0, -0.2, 0.4);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn pose_offsets_accumulate() {
        let mut pose = Pose::default();
        pose.add_offset(Marker::Head, Vector3::new(0.0, 0.1, 0.0));
        pose.add_offset(Marker::Head, Vector3::new(0.0, 0.1, 0.0));
        assert_relative_eq!(pose.offset(Marker::Head).unwrap().y, 0.2, epsilon = 1e-12);
        assert_eq!(pose.offset(Marker::Neck), None);
    }
}
