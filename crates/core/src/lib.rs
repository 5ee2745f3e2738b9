//! Domain types and pure logic for the hoopform posture-training client.
//!
//! Nothing in this crate performs I/O: pose sequence and metric data
//! models, the playback frame cursor, overlay geometry, training metric
//! catalogues, report DTOs and the demo sign-in rules all live here so
//! they can be unit tested in isolation.

pub mod analysis;
pub mod auth;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod overlay;
pub mod pose;
pub mod report;
pub mod training;
pub mod types;
