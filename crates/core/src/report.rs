//! Training reports and the student roster.

use serde::{Deserialize, Serialize};

use crate::analysis::{AiAnalysis, MetricsFrame};
use crate::error::CoreError;
use crate::training::TrainingType;

/// Request body of `POST /training-reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrainingReport {
    pub student_id: String,
    pub student_name: String,
    pub training_type: TrainingType,
    pub analysis_result: AiAnalysis,
    pub metrics: Vec<MetricsFrame>,
}

impl NewTrainingReport {
    /// Reject reports that cannot be attributed to a student.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.student_id.trim().is_empty() {
            return Err(CoreError::Validation("student_id must not be empty".into()));
        }
        if self.student_name.trim().is_empty() {
            return Err(CoreError::Validation("student_name must not be empty".into()));
        }
        Ok(())
    }
}

/// A stored training report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub training_type: TrainingType,
    pub analysis_result: AiAnalysis,
    #[serde(default)]
    pub metrics: Vec<MetricsFrame>,
    /// Creation time as reported by the backend (ISO 8601).
    pub timestamp: String,
    #[serde(default)]
    pub sent_to_parent: bool,
}

impl TrainingReport {
    /// Parsed creation time, if the backend sent a valid RFC 3339 value.
    pub fn created_at(&self) -> Option<crate::types::Timestamp> {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc))
    }
}

/// Request body of `POST /send-report-to-parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReportRequest {
    pub report_id: String,
    pub parent_id: String,
}

/// Response of `POST /send-report-to-parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReportResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// A roster entry from `GET /students`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub parent_id: String,
}
