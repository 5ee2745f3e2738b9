//! Task status polling until the backend settles a processing task.
//!
//! [`poll_until_settled`] asks for the status of a task at a fixed
//! interval until it reaches a terminal state or the
//! [`CancellationToken`] is triggered. A failed status request is logged
//! and polling carries on.

use std::time::Duration;

use async_trait::async_trait;
use hoopform_core::analysis::{TaskState, TaskStatus};
use tokio_util::sync::CancellationToken;

use crate::api::{AnalysisApi, ApiError};

/// Message used when the backend reports a failure without detail.
const DEFAULT_FAILURE: &str = "Video processing failed";

/// Anything that can report the status of a processing task.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;
}

#[async_trait]
impl StatusProbe for AnalysisApi {
    async fn status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        self.task_status(task_id).await
    }
}

/// How polling ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Processing finished; carries the final status.
    Completed(TaskStatus),
    /// Processing failed with the backend's error message.
    Failed(String),
    /// The cancellation token fired first.
    Cancelled,
}

/// Poll `task_id` every `interval` until it completes, fails or `cancel`
/// fires. `on_progress` sees every status the backend returns.
pub async fn poll_until_settled<P, F>(
    probe: &P,
    task_id: &str,
    interval: Duration,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> PollOutcome
where
    P: StatusProbe + ?Sized,
    F: FnMut(&TaskStatus),
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(task_id, "Status polling cancelled");
                return PollOutcome::Cancelled;
            }
            result = probe.status(task_id) => {
                match result {
                    Ok(status) => {
                        on_progress(&status);
                        match status.status {
                            TaskState::Completed => {
                                tracing::info!(task_id, attempt, "Processing completed");
                                return PollOutcome::Completed(status);
                            }
                            TaskState::Failed => {
                                let error = status
                                    .error
                                    .clone()
                                    .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
                                tracing::warn!(task_id, error = %error, "Processing failed");
                                return PollOutcome::Failed(error);
                            }
                            TaskState::Uploaded | TaskState::Processing => {
                                tracing::debug!(task_id, progress = status.progress, "Processing");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            task_id,
                            error = %e,
                            "Status request {attempt} failed",
                        );
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(task_id, "Status polling cancelled");
                return PollOutcome::Cancelled;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
