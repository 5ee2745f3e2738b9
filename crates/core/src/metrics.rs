//! Per-frame metric timelines, trend series and compliance tallies.

use std::collections::BTreeMap;

use crate::analysis::MetricsFrame;
use crate::training::TrainingType;
use crate::types::MetricMap;

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Angle at `b` formed by the points `a-b-c`, in degrees rounded to two
/// decimals.
pub fn joint_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let ab = (a.0 - b.0, a.1 - b.1);
    let cb = (c.0 - b.0, c.1 - b.1);
    let dot = ab.0 * cb.0 + ab.1 * cb.1;
    let magnitude = ab.0.hypot(ab.1) * cb.0.hypot(cb.1);
    let cos_theta = (dot / (magnitude + f64::EPSILON)).clamp(-1.0, 1.0);
    round2(cos_theta.acos().to_degrees())
}

/// Trailing moving average over `window` samples, rounded to two decimals.
///
/// Inputs no longer than the window are returned unchanged.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() <= window {
        return values.to_vec();
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            round2(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// MetricsTimeline
// ---------------------------------------------------------------------------

/// Aggregate statistics of one metric across a timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

/// Time-ordered metric records of one processed video.
#[derive(Debug, Clone, Default)]
pub struct MetricsTimeline {
    frames: Vec<MetricsFrame>,
}

impl MetricsTimeline {
    /// Build a timeline, sorting records by timestamp.
    pub fn new(mut frames: Vec<MetricsFrame>) -> Self {
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { frames }
    }

    pub fn frames(&self) -> &[MetricsFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The record whose timestamp is nearest to `time`; the earlier record
    /// wins a tie.
    pub fn closest(&self, time: f64) -> Option<&MetricsFrame> {
        if self.frames.is_empty() || time.is_nan() {
            return None;
        }
        let after = self.frames.partition_point(|f| f.timestamp < time);
        let candidates = [after.checked_sub(1), Some(after)];
        candidates
            .into_iter()
            .flatten()
            .filter_map(|i| self.frames.get(i))
            .min_by(|a, b| {
                (a.timestamp - time)
                    .abs()
                    .total_cmp(&(b.timestamp - time).abs())
            })
    }

    /// First-person metrics of the record nearest to `time`.
    pub fn metrics_at(&self, time: f64) -> Option<&MetricMap> {
        self.closest(time).and_then(MetricsFrame::first_person)
    }

    /// `(timestamp, value)` points of `key` for the first tracked person.
    pub fn series(&self, key: &str) -> Vec<(f64, f64)> {
        self.frames
            .iter()
            .filter_map(|f| {
                let value = f.first_person()?.get(key)?;
                Some((f.timestamp, *value))
            })
            .collect()
    }

    /// Mean, min and max of every first-person metric.
    pub fn summary(&self) -> BTreeMap<String, MetricSummary> {
        let mut acc: BTreeMap<String, (f64, f64, f64, usize)> = BTreeMap::new();
        for metrics in self.frames.iter().filter_map(MetricsFrame::first_person) {
            for (key, &value) in metrics {
                if !value.is_finite() {
                    continue;
                }
                let entry = acc
                    .entry(key.clone())
                    .or_insert((0.0, f64::INFINITY, f64::NEG_INFINITY, 0));
                entry.0 += value;
                entry.1 = entry.1.min(value);
                entry.2 = entry.2.max(value);
                entry.3 += 1;
            }
        }
        acc.into_iter()
            .map(|(key, (sum, min, max, samples))| {
                (
                    key,
                    MetricSummary {
                        mean: round2(sum / samples as f64),
                        min,
                        max,
                        samples,
                    },
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ComplianceTally
// ---------------------------------------------------------------------------

/// Running count of standard / non-standard observations per metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceTally {
    checks: BTreeMap<String, u32>,
    violations: BTreeMap<String, u32>,
}

impl ComplianceTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of every metric in `metrics` against the
    /// standard ranges of `training_type`.
    pub fn record(&mut self, training_type: TrainingType, metrics: &MetricMap) {
        for (key, &value) in metrics {
            *self.checks.entry(key.clone()).or_default() += 1;
            if !training_type.is_within_standard(key, value) {
                *self.violations.entry(key.clone()).or_default() += 1;
            }
        }
    }

    pub fn checks(&self, key: &str) -> u32 {
        self.checks.get(key).copied().unwrap_or(0)
    }

    pub fn violations(&self, key: &str) -> u32 {
        self.violations.get(key).copied().unwrap_or(0)
    }

    /// Percentage of observations of `key` inside the standard range, or
    /// `None` before the first observation.
    pub fn success_rate(&self, key: &str) -> Option<f64> {
        let total = self.checks(key);
        if total == 0 {
            return None;
        }
        let ok = total.saturating_sub(self.violations(key));
        Some(f64::from(ok) / f64::from(total) * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
