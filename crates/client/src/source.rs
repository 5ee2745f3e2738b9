//! Where pose sequences come from.
//!
//! A [`SequenceLocator`] names a sequence by absolute URL, backend task id
//! or local JSON file. [`PoseSequenceSource`] is the seam the player
//! fetches through, so playback can be driven by the HTTP backend, by
//! bundled sample files, or by test doubles.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hoopform_core::error::CoreError;
use hoopform_core::pose::PoseSequence;
use hoopform_core::types::TaskId;

use crate::api::{AnalysisApi, ApiError};

/// Identifies one pose sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceLocator {
    /// Absolute `http(s)` URL returning a PoseSequence document.
    Url(String),
    /// Processed backend task (`GET /pose-sequence/{taskId}`).
    Task(TaskId),
    /// Local JSON file.
    File(PathBuf),
}

impl SequenceLocator {
    /// Interpret a user-supplied string.
    ///
    /// `http://` and `https://` prefixes select [`Url`](Self::Url),
    /// `task:<id>` selects [`Task`](Self::Task), anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else if let Some(id) = raw.strip_prefix("task:") {
            Self::Task(id.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for SequenceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Task(id) => write!(f, "task:{id}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors from fetching a pose sequence.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backend request failed.
    #[error("Failed to fetch pose sequence: {0}")]
    Api(#[from] ApiError),

    /// A local sequence file could not be read.
    #[error("Failed to read pose sequence {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid PoseSequence.
    #[error("Failed to parse pose sequence: {0}")]
    Parse(#[from] serde_json::Error),

    /// The sequence parsed but breaks a structural invariant.
    #[error("Invalid pose sequence: {0}")]
    Invalid(#[from] CoreError),

    /// This source cannot resolve the locator.
    #[error("Unsupported locator '{0}'")]
    Unsupported(String),
}

/// Fetches pose sequences by locator.
#[async_trait]
pub trait PoseSequenceSource: Send + Sync {
    async fn fetch(&self, locator: &SequenceLocator) -> Result<PoseSequence, SourceError>;
}

/// Read and validate a PoseSequence JSON file.
pub async fn read_sequence_file(path: &Path) -> Result<PoseSequence, SourceError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sequence: PoseSequence = serde_json::from_slice(&bytes)?;
    sequence.validate()?;
    Ok(sequence)
}

/// Resolves every locator kind: URLs and task ids via the backend, paths
/// from the local filesystem.
#[derive(Debug, Clone)]
pub struct DefaultPoseSource {
    api: Arc<AnalysisApi>,
}

impl DefaultPoseSource {
    pub fn new(api: Arc<AnalysisApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PoseSequenceSource for DefaultPoseSource {
    async fn fetch(&self, locator: &SequenceLocator) -> Result<PoseSequence, SourceError> {
        tracing::debug!(%locator, "Fetching pose sequence");
        let sequence = match locator {
            SequenceLocator::Url(url) => self.api.pose_sequence_at(url).await?,
            SequenceLocator::Task(id) => self.api.pose_sequence(id).await?,
            SequenceLocator::File(path) => return read_sequence_file(path).await,
        };
        sequence.validate()?;
        Ok(sequence)
    }
}

/// Local files only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePoseSource;

#[async_trait]
impl PoseSequenceSource for FilePoseSource {
    async fn fetch(&self, locator: &SequenceLocator) -> Result<PoseSequence, SourceError> {
        match locator {
            SequenceLocator::File(path) => read_sequence_file(path).await,
            other => Err(SourceError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_locators() {
        assert_eq!(
            SequenceLocator::parse("https://cdn.example/pose.json"),
            SequenceLocator::Url("https://cdn.example/pose.json".into())
        );
        assert_eq!(SequenceLocator::parse("task:abc"), SequenceLocator::Task("abc".into()));
        assert_eq!(
            SequenceLocator::parse(" data/pose.json "),
            SequenceLocator::File(PathBuf::from("data/pose.json"))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["http://h/p.json", "task:42", "a/b.json"] {
            assert_eq!(SequenceLocator::parse(raw).to_string(), raw);
        }
    }

    #[tokio::test]
    async fn reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"videoSource":"drill.mp4","frameRate":30,"size":{{"width":640,"height":480}},
               "frames":[{{"time":0,"keypoints":[{{"name":"nose","x":1,"y":2,"confidence":0.9}}]}}]}}"#
        )
        .unwrap();

        let locator = SequenceLocator::File(file.path().to_path_buf());
        let sequence = FilePoseSource.fetch(&locator).await.unwrap();
        assert_eq!(sequence.frames.len(), 1);
        assert_eq!(sequence.video_source, "drill.mp4");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let locator = SequenceLocator::File(PathBuf::from("/nonexistent/pose.json"));
        assert_matches!(FilePoseSource.fetch(&locator).await, Err(SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let locator = SequenceLocator::File(file.path().to_path_buf());
        assert_matches!(FilePoseSource.fetch(&locator).await, Err(SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn decreasing_times_are_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"videoSource":"v.mp4","frameRate":30,"size":{{"width":10,"height":10}},
               "frames":[{{"time":1}},{{"time":0.5}}]}}"#
        )
        .unwrap();
        let locator = SequenceLocator::File(file.path().to_path_buf());
        assert_matches!(FilePoseSource.fetch(&locator).await, Err(SourceError::Invalid(_)));
    }

    #[tokio::test]
    async fn file_source_rejects_urls() {
        let locator = SequenceLocator::Task("t1".into());
        assert_matches!(FilePoseSource.fetch(&locator).await, Err(SourceError::Unsupported(_)));
    }
}
