//! HTTP client and client-side services for the hoopform analysis backend.
//!
//! - [`api`]: one method per REST endpoint
//! - [`poll`]: task status polling with cooperative cancellation
//! - [`source`]: pose-sequence sources used by the player
//! - [`feedback`], [`students`]: degraded-mode wrappers used by the UI
//! - [`session`]: local persistence of the signed-in user

pub mod api;
pub mod config;
pub mod feedback;
pub mod poll;
pub mod session;
pub mod source;
pub mod students;
pub mod upload;

pub use api::{AnalysisApi, ApiError};
pub use config::ClientConfig;
pub use source::{PoseSequenceSource, SequenceLocator, SourceError};
