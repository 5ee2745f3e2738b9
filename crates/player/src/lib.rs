//! Video-synchronized pose playback.
//!
//! [`PoseSynchronizer`] is the caller-driven state machine that owns one
//! loaded [`PoseSequence`](hoopform_core::pose::PoseSequence) and keeps
//! the active frame aligned with a media clock. [`PosePlayer`] wraps it
//! in a single-owner tokio task that performs fetches in the background
//! and publishes [`PlayerSnapshot`]s.

pub mod player;
pub mod synchronizer;

pub use player::{PlayerError, PlayerHandle, PosePlayer};
pub use synchronizer::{
    LoadTicket, MediaEvent, PlayerSnapshot, PlayerStatus, PoseSynchronizer, SyncState,
};
