//! Skeleton overlay geometry.
//!
//! Keypoints are recorded in the pixel space of the source video
//! ([`PoseSequence::size`](crate::pose::PoseSequence)). Before they are
//! drawn on a render surface of another size they are rescaled per axis,
//! so non-uniform scaling is expected when aspect ratios differ.

use crate::pose::{FrameSize, Keypoint};

/// Minimum confidence for a keypoint to be drawn as a joint marker.
pub const MIN_MARKER_CONFIDENCE: f64 = 0.4;

// ---------------------------------------------------------------------------
// Joints
// ---------------------------------------------------------------------------

/// Joints understood by the overlay skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Nose,
    Neck,
    Spine,
    Pelvis,
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    RightShoulder,
    RightElbow,
    RightWrist,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
}

/// Map a backend joint label to a [`Joint`].
///
/// The pose exporter labels joints in Chinese; snake_case English names
/// are accepted as well.
pub fn canonical_joint(name: &str) -> Option<Joint> {
    let joint = match name {
        "鼻尖" | "nose" => Joint::Nose,
        "颈部" | "neck" => Joint::Neck,
        "脊柱" | "spine" => Joint::Spine,
        "骨盆" | "pelvis" => Joint::Pelvis,
        "左肩" | "left_shoulder" => Joint::LeftShoulder,
        "左肘" | "left_elbow" => Joint::LeftElbow,
        "左腕" | "left_wrist" => Joint::LeftWrist,
        "左髋" | "left_hip" => Joint::LeftHip,
        "左膝" | "left_knee" => Joint::LeftKnee,
        "左踝" | "left_ankle" => Joint::LeftAnkle,
        "右肩" | "right_shoulder" => Joint::RightShoulder,
        "右肘" | "right_elbow" => Joint::RightElbow,
        "右腕" | "right_wrist" => Joint::RightWrist,
        "右髋" | "right_hip" => Joint::RightHip,
        "右膝" | "right_knee" => Joint::RightKnee,
        "右踝" | "right_ankle" => Joint::RightAnkle,
        "左眼" | "left_eye" => Joint::LeftEye,
        "右眼" | "right_eye" => Joint::RightEye,
        "左耳" | "left_ear" => Joint::LeftEar,
        "右耳" | "right_ear" => Joint::RightEar,
        _ => return None,
    };
    Some(joint)
}

/// Bones drawn between joints.
pub const SKELETON: [(Joint, Joint); 14] = [
    (Joint::Nose, Joint::Neck),
    (Joint::Neck, Joint::RightShoulder),
    (Joint::Neck, Joint::LeftShoulder),
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    (Joint::RightShoulder, Joint::RightHip),
    (Joint::LeftShoulder, Joint::LeftHip),
    (Joint::RightHip, Joint::RightKnee),
    (Joint::RightKnee, Joint::RightAnkle),
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::Spine, Joint::Pelvis),
];

// ---------------------------------------------------------------------------
// Rescaling
// ---------------------------------------------------------------------------

/// Per-axis scale factors from `source` to `target`.
///
/// Returns `None` if the source space has a zero or non-finite dimension.
pub fn scale_factors(source: FrameSize, target: FrameSize) -> Option<(f64, f64)> {
    if !source.is_drawable() {
        return None;
    }
    Some((target.width / source.width, target.height / source.height))
}

/// Rescale keypoints from `source` pixel space onto `target`.
///
/// Returns an empty list when the source space is degenerate.
pub fn scale_keypoints(keypoints: &[Keypoint], source: FrameSize, target: FrameSize) -> Vec<Keypoint> {
    let Some((sx, sy)) = scale_factors(source, target) else {
        return Vec::new();
    };
    keypoints
        .iter()
        .map(|kp| Keypoint {
            x: kp.x * sx,
            y: kp.y * sy,
            ..kp.clone()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Overlay geometry
// ---------------------------------------------------------------------------

/// A point on the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A bone between two joints, in render coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Joint,
    pub to: Joint,
    pub start: Point,
    pub end: Point,
}

/// Drawable skeleton for one frame on a given render surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayGeometry {
    pub segments: Vec<Segment>,
    /// Joint markers with confidence of at least [`MIN_MARKER_CONFIDENCE`].
    pub markers: Vec<Point>,
}

impl OverlayGeometry {
    /// Build the overlay for `keypoints` recorded in `source` and drawn on
    /// `target`.
    ///
    /// Bones are emitted only when both endpoints are present (the first
    /// keypoint wins if a joint appears twice). Unknown labels still get a
    /// marker but never a bone.
    pub fn build(keypoints: &[Keypoint], source: FrameSize, target: FrameSize) -> Self {
        let scaled = scale_keypoints(keypoints, source, target);
        if scaled.is_empty() {
            return Self::default();
        }

        let locate = |joint: Joint| {
            scaled
                .iter()
                .find(|kp| canonical_joint(&kp.name) == Some(joint))
                .map(|kp| Point { x: kp.x, y: kp.y })
        };

        let segments = SKELETON
            .iter()
            .filter_map(|&(from, to)| {
                Some(Segment {
                    from,
                    to,
                    start: locate(from)?,
                    end: locate(to)?,
                })
            })
            .collect();

        let markers = scaled
            .iter()
            .filter(|kp| kp.is_visible(MIN_MARKER_CONFIDENCE))
            .map(|kp| Point { x: kp.x, y: kp.y })
            .collect();

        Self { segments, markers }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
