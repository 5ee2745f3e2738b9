/// Backend-assigned identifier of a video processing task (a UUID string).
pub type TaskId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Metric name -> value map as produced by the analysis backend.
pub type MetricMap = std::collections::BTreeMap<String, f64>;
