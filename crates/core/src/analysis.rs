//! Video analysis task and AI analysis wire types.

use serde::{Deserialize, Serialize};

use crate::training::TrainingType;
use crate::types::{MetricMap, TaskId};

// ---------------------------------------------------------------------------
// Processing tasks
// ---------------------------------------------------------------------------

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: TaskId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Processing state of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl TaskState {
    /// `true` once the backend will no longer change the state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Response of `GET /status/{taskId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub status: TaskState,
    /// Completion percentage (0-100).
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-frame metrics
// ---------------------------------------------------------------------------

/// Metrics of one tracked person in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMetrics {
    pub person_id: i64,
    #[serde(default)]
    pub metrics: MetricMap,
}

/// Metrics computed for one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFrame {
    pub frame: i64,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    #[serde(default)]
    pub people: Vec<PersonMetrics>,
}

impl MetricsFrame {
    /// Metrics of the first tracked person, if any.
    pub fn first_person(&self) -> Option<&MetricMap> {
        self.people.first().map(|p| &p.metrics)
    }
}

/// Response of `GET /result/{taskId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub metrics: Vec<MetricsFrame>,
}

// ---------------------------------------------------------------------------
// AI analysis
// ---------------------------------------------------------------------------

/// Request body of `POST /ai-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisRequest {
    pub training_type: TrainingType,
    pub metrics: Vec<MetricsFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_summary: Option<String>,
}

/// Coaching feedback returned by the AI analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub summary: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Score out of 100.
    pub overall_score: f64,
}

impl AiAnalysis {
    /// Placeholder shown when the analysis service cannot be reached.
    pub fn unavailable() -> Self {
        Self {
            summary: "AI analysis is temporarily unavailable. Please retry later or contact support."
                .to_string(),
            suggestions: vec!["Check the network connection or contact an administrator".to_string()],
            improvement_areas: vec!["AI service temporarily unavailable".to_string()],
            strengths: vec!["Please retry later".to_string()],
            overall_score: 0.0,
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall_score)
    }
}

/// Coarse grading of an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 80 and above.
    Good,
    /// 60 to 79.
    Fair,
    /// Below 60.
    NeedsWork,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Fair
        } else {
            Self::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::NeedsWork => "needs work",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
