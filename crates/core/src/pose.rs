//! Recorded pose sequences exported by the analysis backend.
//!
//! A [`PoseSequence`] is the offline skeleton track of one processed
//! video: per-frame 2D keypoints (in the pixel space described by
//! [`PoseSequence::size`]) plus the metrics computed for that frame.
//! Field names follow the backend's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::MetricMap;

// ---------------------------------------------------------------------------
// Keypoint
// ---------------------------------------------------------------------------

/// A named 2D body landmark with its detection confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Joint label as emitted by the backend (e.g. `"左肩"` or `"left_shoulder"`).
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

// ---------------------------------------------------------------------------
// FrameSize
// ---------------------------------------------------------------------------

/// Width and height of a coordinate space, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `true` when both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

// ---------------------------------------------------------------------------
// PoseFrame / PoseSequence
// ---------------------------------------------------------------------------

/// One sample of a recorded pose sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Seconds from the start of the sequence.
    pub time: f64,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub metrics: MetricMap,
}

/// A full recorded pose track for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseSequence {
    /// File name or path of the associated video asset.
    #[serde(default)]
    pub video_source: String,
    /// Nominal sampling rate. Informational only; lookup is time based.
    #[serde(default)]
    pub frame_rate: f64,
    /// Coordinate space the keypoints were extracted in.
    pub size: FrameSize,
    #[serde(default)]
    pub frames: Vec<PoseFrame>,
}

impl PoseSequence {
    /// Duration covered by the frames (time of the last frame), or `0.0`
    /// for an empty sequence.
    pub fn duration(&self) -> f64 {
        self.frames.last().map(|f| f.time).unwrap_or(0.0)
    }

    /// Keypoints of the first frame, or an empty slice.
    pub fn first_keypoints(&self) -> &[Keypoint] {
        self.frames
            .first()
            .map(|f| f.keypoints.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve the playable video URL under `video_base`.
    ///
    /// Returns `None` when the sequence names no video.
    pub fn video_url(&self, video_base: &str) -> Option<String> {
        if self.video_source.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            video_base.trim_end_matches('/'),
            self.video_source.trim_start_matches('/')
        ))
    }

    /// Check the structural invariants playback relies on.
    ///
    /// Checks:
    /// - `size` is finite and strictly positive
    /// - every frame time is finite
    /// - frame times never decrease (equal neighbours are allowed)
    /// - every keypoint confidence lies in `[0, 1]`
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.size.is_drawable() {
            return Err(CoreError::Validation(format!(
                "Sequence size must be positive, got {}x{}",
                self.size.width, self.size.height
            )));
        }

        let mut previous = f64::NEG_INFINITY;
        for (index, frame) in self.frames.iter().enumerate() {
            if !frame.time.is_finite() {
                return Err(CoreError::Validation(format!(
                    "Frame {index} has a non-finite time"
                )));
            }
            if frame.time < previous {
                return Err(CoreError::Validation(format!(
                    "Frame times decrease at index {index} ({} < {previous})",
                    frame.time
                )));
            }
            previous = frame.time;

            if let Some(kp) = frame
                .keypoints
                .iter()
                .find(|kp| !(0.0..=1.0).contains(&kp.confidence))
            {
                return Err(CoreError::Validation(format!(
                    "Keypoint '{}' in frame {index} has confidence {} outside [0, 1]",
                    kp.name, kp.confidence
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn frame(time: f64) -> PoseFrame {
        PoseFrame {
            time,
            keypoints: vec![Keypoint::new("颈部", 10.0, 20.0, 0.9)],
            metrics: MetricMap::new(),
        }
    }

    fn sequence(times: &[f64]) -> PoseSequence {
        PoseSequence {
            video_source: "task_output.mp4".to_string(),
            frame_rate: 30.0,
            size: FrameSize::new(1280.0, 720.0),
            frames: times.iter().copied().map(frame).collect(),
        }
    }

    #[test]
    fn parses_backend_json() {
        let json = serde_json::json!({
            "videoSource": "abc_output.mp4",
            "frameRate": 29.97,
            "size": {"width": 1920, "height": 1080},
            "frames": [
                {
                    "time": 0.0,
                    "keypoints": [{"name": "左肩", "x": 1.5, "y": 2.5, "confidence": 0.8}],
                    "metrics": {"left_knee_angle": 121.4}
                },
                {"time": 0.1, "keypoints": []}
            ]
        });
        let seq: PoseSequence = serde_json::from_value(json).expect("parse");
        assert_eq!(seq.video_source, "abc_output.mp4");
        assert_eq!(seq.size, FrameSize::new(1920.0, 1080.0));
        assert_eq!(seq.frames.len(), 2);
        assert_eq!(seq.frames[0].metrics["left_knee_angle"], 121.4);
        assert!(seq.frames[1].metrics.is_empty());
    }

    #[test]
    fn video_url_joins_base() {
        let seq = sequence(&[0.0]);
        assert_eq!(
            seq.video_url("/videos/").as_deref(),
            Some("/videos/task_output.mp4")
        );
    }

    #[test]
    fn video_url_absent_without_source() {
        let mut seq = sequence(&[0.0]);
        seq.video_source.clear();
        assert!(seq.video_url("/videos").is_none());
    }

    #[test]
    fn duration_and_first_keypoints() {
        let seq = sequence(&[0.0, 0.5, 1.25]);
        assert_eq!(seq.duration(), 1.25);
        assert_eq!(seq.first_keypoints().len(), 1);

        let empty = sequence(&[]);
        assert_eq!(empty.duration(), 0.0);
        assert!(empty.first_keypoints().is_empty());
    }

    #[test]
    fn validate_accepts_equal_neighbours() {
        assert!(sequence(&[0.0, 0.5, 0.5, 1.0]).validate().is_ok());
    }

    #[test]
    fn validate_accepts_empty_frames() {
        assert!(sequence(&[]).validate().is_ok());
    }

    #[test]
    fn validate_rejects_decreasing_times() {
        assert_matches!(
            sequence(&[0.0, 1.0, 0.5]).validate(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn validate_rejects_zero_size() {
        let mut seq = sequence(&[0.0]);
        seq.size = FrameSize::new(0.0, 720.0);
        assert!(seq.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_confidence() {
        let mut seq = sequence(&[0.0]);
        seq.frames[0].keypoints[0].confidence = 1.2;
        assert!(seq.validate().is_err());
    }

    #[test]
    fn keypoint_visibility_threshold() {
        let kp = Keypoint::new("鼻尖", 0.0, 0.0, 0.4);
        assert!(kp.is_visible(0.4));
        assert!(!kp.is_visible(0.5));
    }
}
