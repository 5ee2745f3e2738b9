//! Training types and their metric catalogues.
//!
//! Each coached skill category selects which backend metrics are shown and
//! the standard range each metric is judged against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// TrainingType
// ---------------------------------------------------------------------------

/// A coached basketball skill category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingType {
    Dribbling,
    Defense,
    Shooting,
}

impl TrainingType {
    pub const ALL: [TrainingType; 3] = [Self::Dribbling, Self::Defense, Self::Shooting];

    /// Wire name used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dribbling => "dribbling",
            Self::Defense => "defense",
            Self::Shooting => "shooting",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dribbling => "Dribbling",
            Self::Defense => "Defense",
            Self::Shooting => "Shooting",
        }
    }

    /// Metrics shown for this training type, in display order.
    pub fn metrics(&self) -> &'static [MetricSpec] {
        match self {
            Self::Dribbling => DRIBBLING_METRICS,
            Self::Defense => DEFENSE_METRICS,
            Self::Shooting => SHOOTING_METRICS,
        }
    }

    /// Look up the catalogue entry for `key`.
    pub fn metric(&self, key: &str) -> Option<&'static MetricSpec> {
        self.metrics().iter().find(|m| m.key == key)
    }

    /// `true` when `value` lies inside the standard range for `key`.
    ///
    /// Metrics without a catalogue entry are always standard.
    pub fn is_within_standard(&self, key: &str, value: f64) -> bool {
        self.metric(key)
            .map(|m| m.range.contains(value))
            .unwrap_or(true)
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dribbling" => Ok(Self::Dribbling),
            "defense" => Ok(Self::Defense),
            "shooting" => Ok(Self::Shooting),
            other => Err(CoreError::Validation(format!(
                "Unknown training type '{other}'. Expected dribbling, defense or shooting"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Metric catalogue
// ---------------------------------------------------------------------------

/// Inclusive standard range for a metric. Missing bounds are open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StandardRange {
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

/// One metric of a training type's catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    /// Backend metric key, e.g. `"dribble_frequency"`.
    pub key: &'static str,
    pub label: &'static str,
    pub range: StandardRange,
    /// Display unit (empty for ratios).
    pub unit: &'static str,
}

const fn metric(key: &'static str, label: &'static str, min: f64, max: f64, unit: &'static str) -> MetricSpec {
    MetricSpec {
        key,
        label,
        range: StandardRange::between(min, max),
        unit,
    }
}

const DRIBBLING_METRICS: &[MetricSpec] = &[
    metric("dribble_frequency", "Dribble frequency", 1.5, 3.5, "/s"),
    metric("center_of_mass", "Center of mass height", 85.0, 105.0, "cm"),
    metric("left_wrist_angle", "Left wrist angle", 70.0, 120.0, "°"),
    metric("right_wrist_angle", "Right wrist angle", 70.0, 120.0, "°"),
    metric("left_elbow_angle", "Left elbow angle", 80.0, 140.0, "°"),
    metric("right_elbow_angle", "Right elbow angle", 80.0, 140.0, "°"),
    metric("left_shoulder_angle", "Left shoulder angle", 30.0, 90.0, "°"),
    metric("right_shoulder_angle", "Right shoulder angle", 30.0, 90.0, "°"),
    metric("left_knee_angle", "Left knee angle", 100.0, 140.0, "°"),
    metric("right_knee_angle", "Right knee angle", 100.0, 140.0, "°"),
];

const DEFENSE_METRICS: &[MetricSpec] = &[
    metric("defense_center_fluctuation", "Center of mass fluctuation", 0.0, 15.0, "cm"),
    metric("arm_spread_ratio", "Arm spread ratio", 1.2, 2.5, ""),
    metric("arm_spread_distance", "Arm spread distance", 40.0, 80.0, "cm"),
    metric("leg_spread_ratio", "Leg spread ratio", 1.0, 2.0, ""),
    metric("leg_spread_distance", "Leg spread distance", 30.0, 60.0, "cm"),
    metric("defense_knee_angle", "Defensive knee angle", 90.0, 130.0, "°"),
    metric("body_balance", "Body balance", 0.7, 1.0, ""),
];

const SHOOTING_METRICS: &[MetricSpec] = &[
    metric("shooting_elbow_angle", "Shooting elbow angle", 85.0, 120.0, "°"),
    metric("shooting_support_elbow_angle", "Guide-hand elbow angle", 70.0, 110.0, "°"),
    metric("wrist_extension_angle", "Wrist extension angle", 120.0, 180.0, "°"),
    metric("upper_arm_body_angle", "Upper arm to body angle", 30.0, 80.0, "°"),
    metric("shooting_release_height", "Release height", 180.0, 240.0, "cm"),
    metric("shooting_body_alignment", "Body alignment", 85.0, 95.0, "°"),
    metric("hand_coordination", "Hand coordination", 0.6, 1.0, ""),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
