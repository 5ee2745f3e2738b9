use std::path::PathBuf;
use std::time::Duration;

/// Default REST base URL of the analysis backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend. Invalid numeric
/// values fall back to the default.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST base URL, without trailing slash.
    pub api_base_url: String,
    /// Base path that pose sequence `videoSource` names resolve under.
    pub video_base: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between task status polls.
    pub poll_interval: Duration,
    /// Where the signed-in user is persisted.
    pub session_file: PathBuf,
    /// Bundled sample pose sequence for demo playback.
    pub sample_sequence: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            video_base: "/videos".to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1000),
            session_file: PathBuf::from(".hoopform/session.json"),
            sample_sequence: PathBuf::from("assets/sample_pose_sequence.json"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                            |
    /// |---------------------------------|------------------------------------|
    /// | `HOOPFORM_API_BASE_URL`         | `http://localhost:5000/api`        |
    /// | `HOOPFORM_VIDEO_BASE`           | `/videos`                          |
    /// | `HOOPFORM_REQUEST_TIMEOUT_SECS` | `30`                               |
    /// | `HOOPFORM_POLL_INTERVAL_MS`     | `1000`                             |
    /// | `HOOPFORM_SESSION_FILE`         | `.hoopform/session.json`           |
    /// | `HOOPFORM_SAMPLE_SEQUENCE`      | `assets/sample_pose_sequence.json` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_base_url = lookup("HOOPFORM_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base_url);

        let video_base = lookup("HOOPFORM_VIDEO_BASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.video_base);

        let request_timeout = lookup("HOOPFORM_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let poll_interval = lookup("HOOPFORM_POLL_INTERVAL_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let session_file = lookup("HOOPFORM_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let sample_sequence = lookup("HOOPFORM_SAMPLE_SEQUENCE")
            .map(PathBuf::from)
            .unwrap_or(defaults.sample_sequence);

        Self {
            api_base_url,
            video_base,
            request_timeout,
            poll_interval,
            session_file,
            sample_sequence,
        }
    }
}
