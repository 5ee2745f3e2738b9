//! REST API client for the video analysis backend.
//!
//! Wraps every backend endpoint (upload, task status, results, pose
//! sequences, AI analysis, training reports, student roster) using
//! [`reqwest`]. Each call is a single attempt; retries are left to the
//! caller.

use std::path::Path;

use futures::StreamExt;
use hoopform_core::analysis::{
    AiAnalysis, AiAnalysisRequest, AnalysisResult, MetricsFrame, TaskStatus, UploadResponse,
};
use hoopform_core::pose::PoseSequence;
use hoopform_core::report::{
    NewTrainingReport, SendReportRequest, SendReportResponse, Student, TrainingReport,
};
use hoopform_core::training::TrainingType;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::config::ClientConfig;
use crate::upload::validate_upload;

/// HTTP client for one analysis backend.
#[derive(Debug, Clone)]
pub struct AnalysisApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the analysis REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Analysis API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Reading the upload or writing a download failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was rejected before any request was made.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// `GET /result/{taskId}` has been seen both wrapped in an object and as
/// a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultPayload {
    Wrapped(AnalysisResult),
    Bare(Vec<MetricsFrame>),
}

impl AnalysisApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base REST URL, e.g. `http://localhost:5000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Build a client honouring the configured base URL and timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- processing tasks ----

    /// Upload a training video for processing.
    ///
    /// The file is checked with [`validate_upload`] before anything is
    /// sent. Sends a multipart `POST /upload` with a `video` file part and
    /// a `training_type` text part. The file is streamed from disk.
    pub async fn upload_video(
        &self,
        path: &Path,
        training_type: TrainingType,
    ) -> Result<UploadResponse, ApiError> {
        let size = tokio::fs::metadata(path).await?.len();
        let mime = validate_upload(path, size)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let file = tokio::fs::File::open(path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let part = reqwest::multipart::Part::stream_with_length(body, size)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new()
            .part("video", part)
            .text("training_type", training_type.as_str());

        tracing::debug!(path = %path.display(), size, %training_type, "Uploading video");

        let response = self
            .client
            .post(format!("{}/upload", self.api_url))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the processing status of a task (`GET /status/{taskId}`).
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let response = self
            .client
            .get(format!("{}/status/{}", self.api_url, task_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the per-frame metrics of a completed task
    /// (`GET /result/{taskId}`).
    pub async fn analysis_result(&self, task_id: &str) -> Result<AnalysisResult, ApiError> {
        let response = self
            .client
            .get(format!("{}/result/{}", self.api_url, task_id))
            .send()
            .await?;

        let payload: ResultPayload = Self::parse_response(response).await?;
        Ok(match payload {
            ResultPayload::Wrapped(result) => result,
            ResultPayload::Bare(metrics) => AnalysisResult {
                task_id: Some(task_id.to_string()),
                metrics,
            },
        })
    }

    /// URL of the processed video stream of a task.
    pub fn video_url(&self, task_id: &str) -> String {
        format!("{}/video/{}", self.api_url, task_id)
    }

    /// Stream the processed video of a task into `dest`, returning the
    /// number of bytes written.
    pub async fn download_video(&self, task_id: &str, dest: &Path) -> Result<u64, ApiError> {
        let response = self.client.get(self.video_url(task_id)).send().await?;
        let response = Self::ensure_success(response).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(task_id, bytes = written, dest = %dest.display(), "Video downloaded");
        Ok(written)
    }

    /// Fetch the recorded pose sequence of a task
    /// (`GET /pose-sequence/{taskId}`).
    pub async fn pose_sequence(&self, task_id: &str) -> Result<PoseSequence, ApiError> {
        self.pose_sequence_at(&format!("{}/pose-sequence/{}", self.api_url, task_id))
            .await
    }

    /// Fetch a pose sequence from an absolute URL.
    pub async fn pose_sequence_at(&self, url: &str) -> Result<PoseSequence, ApiError> {
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    // ---- AI analysis ----

    /// Request coaching feedback for a set of metrics
    /// (`POST /ai-analysis`).
    pub async fn analyze(&self, request: &AiAnalysisRequest) -> Result<AiAnalysis, ApiError> {
        let response = self
            .client
            .post(format!("{}/ai-analysis", self.api_url))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- reports and students ----

    /// Store a training report (`POST /training-reports`).
    pub async fn create_report(
        &self,
        report: &NewTrainingReport,
    ) -> Result<TrainingReport, ApiError> {
        let response = self
            .client
            .post(format!("{}/training-reports", self.api_url))
            .json(report)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Deliver a stored report to a parent
    /// (`POST /send-report-to-parent`).
    pub async fn send_report_to_parent(
        &self,
        report_id: &str,
        parent_id: &str,
    ) -> Result<SendReportResponse, ApiError> {
        let body = SendReportRequest {
            report_id: report_id.to_string(),
            parent_id: parent_id.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/send-report-to-parent", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List students (`GET /students`).
    pub async fn students(&self) -> Result<Vec<Student>, ApiError> {
        let response = self
            .client
            .get(format!("{}/students", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Report history of a student (`GET /students/{id}/reports`).
    ///
    /// A non-2xx response is treated as an empty history; only transport
    /// and decoding failures are errors.
    pub async fn student_reports(&self, student_id: &str) -> Result<Vec<TrainingReport>, ApiError> {
        let response = self
            .client
            .get(format!("{}/students/{}/reports", self.api_url, student_id))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(
                student_id,
                status = response.status().as_u16(),
                "No report history available",
            );
            return Ok(Vec::new());
        }
        Ok(response.json().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
