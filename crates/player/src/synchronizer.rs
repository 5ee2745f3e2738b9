//! The pose sequence synchronizer state machine.
//!
//! A [`PoseSynchronizer`] moves through four states:
//!
//! ```text
//!   Empty --load(Some)--> Loading --ok--> Ready(sequence, cursor)
//!     ^                      |
//!     +---load(None)---------+----err---> Error(message)
//! ```
//!
//! Loading is split in two so the fetch itself can happen anywhere:
//! [`PoseSynchronizer::begin_load`] hands out a [`LoadTicket`] and
//! [`PoseSynchronizer::finish_load`] commits the result only while that
//! ticket is still the newest one and has not been committed yet.
//! Starting a new load cancels the token of the previous ticket.
//!
//! Asking for the locator that is already loading or loaded is a no-op,
//! so a sequence is fetched once per distinct locator. Entering `Loading`
//! drops the previous sequence's keypoints right away; nothing from the
//! old sequence is drawn while the new one is pending.

use std::sync::Arc;

use hoopform_client::source::SequenceLocator;
use hoopform_core::cursor::{CursorMove, FrameCursor};
use hoopform_core::overlay::OverlayGeometry;
use hoopform_core::pose::{FrameSize, Keypoint, PoseFrame, PoseSequence};
use hoopform_core::types::MetricMap;
use tokio_util::sync::CancellationToken;

/// Playback-relevant events emitted by a media element.
///
/// Times are the element's current position in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    TimeUpdate(f64),
    Seeked(f64),
    Play(f64),
    Pause,
    /// New media data is available; playback restarts from the first frame.
    LoadedData,
}

/// Internal state of a [`PoseSynchronizer`].
#[derive(Debug, Clone, Default)]
pub enum SyncState {
    #[default]
    Empty,
    Loading,
    Ready {
        sequence: Arc<PoseSequence>,
        cursor: FrameCursor,
    },
    Error(String),
}

/// Coarse status published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Claim on one in-flight load.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    locator: SequenceLocator,
    cancel: CancellationToken,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn locator(&self) -> &SequenceLocator {
        &self.locator
    }

    /// Cancelled as soon as a newer load starts.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Observable view of the synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub status: PlayerStatus,
    pub generation: u64,
    pub active_index: usize,
    pub frame_count: usize,
    /// Time of the last frame, `0.0` unless ready.
    pub duration: f64,
    pub keypoints: Vec<Keypoint>,
    pub metrics: MetricMap,
    pub video_url: Option<String>,
    pub source_size: Option<FrameSize>,
    pub error: Option<String>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            status: PlayerStatus::Empty,
            generation: 0,
            active_index: 0,
            frame_count: 0,
            duration: 0.0,
            keypoints: Vec::new(),
            metrics: MetricMap::new(),
            video_url: None,
            source_size: None,
            error: None,
        }
    }
}

/// Owns the active pose sequence and keeps its frame index in step with
/// the media clock.
#[derive(Debug)]
pub struct PoseSynchronizer {
    state: SyncState,
    generation: u64,
    in_flight: Option<CancellationToken>,
    /// Locator behind the current `Loading`, `Ready` or `Error` state.
    locator: Option<SequenceLocator>,
    video_base: String,
}

impl PoseSynchronizer {
    /// `video_base` is the path that sequence `videoSource` names resolve
    /// under.
    pub fn new(video_base: impl Into<String>) -> Self {
        Self {
            state: SyncState::Empty,
            generation: 0,
            in_flight: None,
            locator: None,
            video_base: video_base.into(),
        }
    }

    // ---- loading ----

    /// Start loading `locator`, superseding any load in flight.
    ///
    /// `None` clears the synchronizer back to `Empty` and returns no
    /// ticket. A locator that is already loading or ready returns no
    /// ticket and changes nothing. Otherwise the state becomes `Loading`
    /// and the caller must fetch the sequence and hand the outcome to
    /// [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self, locator: Option<SequenceLocator>) -> Option<LoadTicket> {
        let active = matches!(self.state, SyncState::Loading | SyncState::Ready { .. });
        if active && locator.is_some() && locator == self.locator {
            return None;
        }

        self.generation += 1;
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.locator = locator.clone();
        let Some(locator) = locator else {
            self.state = SyncState::Empty;
            return None;
        };

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.state = SyncState::Loading;

        tracing::debug!(generation = self.generation, %locator, "Loading pose sequence");
        Some(LoadTicket {
            generation: self.generation,
            locator,
            cancel,
        })
    }

    /// `true` while `ticket` belongs to the newest load and its outcome
    /// has not been committed.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.in_flight.is_some()
            && ticket.generation == self.generation
            && !ticket.cancel.is_cancelled()
    }

    /// Commit the outcome of the load identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when the ticket has
    /// been superseded or was already committed. A sequence that fails
    /// validation is committed as an error.
    pub fn finish_load<E: std::fmt::Display>(
        &mut self,
        ticket: &LoadTicket,
        result: Result<PoseSequence, E>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale pose sequence load",
            );
            return false;
        }
        self.in_flight = None;

        let result = result
            .map_err(|e| e.to_string())
            .and_then(|seq| seq.validate().map(|()| seq).map_err(|e| e.to_string()));

        self.state = match result {
            Ok(sequence) => {
                tracing::info!(
                    locator = %ticket.locator,
                    frames = sequence.frames.len(),
                    "Pose sequence ready",
                );
                SyncState::Ready {
                    sequence: Arc::new(sequence),
                    cursor: FrameCursor::new(),
                }
            }
            Err(message) => {
                tracing::warn!(locator = %ticket.locator, error = %message, "Pose sequence load failed");
                SyncState::Error(message)
            }
        };
        true
    }

    // ---- playback ----

    /// Align the active frame with `time`. No-op unless a sequence is
    /// ready.
    pub fn sync(&mut self, time: f64) -> CursorMove {
        match &mut self.state {
            SyncState::Ready { sequence, cursor } => cursor.seek(&sequence.frames, time),
            _ => CursorMove::Unchanged,
        }
    }

    /// Route a media element event.
    pub fn on_media_event(&mut self, event: MediaEvent) -> CursorMove {
        match event {
            MediaEvent::TimeUpdate(t) | MediaEvent::Seeked(t) | MediaEvent::Play(t) => self.sync(t),
            MediaEvent::LoadedData => match &mut self.state {
                SyncState::Ready { cursor, .. } => cursor.reset(),
                _ => CursorMove::Unchanged,
            },
            MediaEvent::Pause => CursorMove::Unchanged,
        }
    }

    // ---- accessors ----

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> PlayerStatus {
        match self.state {
            SyncState::Empty => PlayerStatus::Empty,
            SyncState::Loading => PlayerStatus::Loading,
            SyncState::Ready { .. } => PlayerStatus::Ready,
            SyncState::Error(_) => PlayerStatus::Error,
        }
    }

    pub fn sequence(&self) -> Option<&PoseSequence> {
        match &self.state {
            SyncState::Ready { sequence, .. } => Some(sequence),
            _ => None,
        }
    }

    pub fn active_index(&self) -> usize {
        match &self.state {
            SyncState::Ready { cursor, .. } => cursor.index(),
            _ => 0,
        }
    }

    pub fn active_frame(&self) -> Option<&PoseFrame> {
        match &self.state {
            SyncState::Ready { sequence, cursor } => sequence.frames.get(cursor.index()),
            _ => None,
        }
    }

    /// Keypoints of the active frame; empty unless ready.
    pub fn keypoints(&self) -> &[Keypoint] {
        self.active_frame()
            .map(|f| f.keypoints.as_slice())
            .unwrap_or(&[])
    }

    pub fn metrics(&self) -> Option<&MetricMap> {
        self.active_frame().map(|f| &f.metrics)
    }

    pub fn video_url(&self) -> Option<String> {
        self.sequence().and_then(|s| s.video_url(&self.video_base))
    }

    pub fn source_size(&self) -> Option<FrameSize> {
        self.sequence().map(|s| s.size)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SyncState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SyncState::Loading)
    }

    /// `true` once a sequence with at least one frame is ready.
    pub fn has_data(&self) -> bool {
        self.sequence().is_some_and(|s| !s.frames.is_empty())
    }

    /// Skeleton of the active frame scaled onto `target`.
    pub fn overlay(&self, target: FrameSize) -> OverlayGeometry {
        match self.source_size() {
            Some(source) => OverlayGeometry::build(self.keypoints(), source, target),
            None => OverlayGeometry::default(),
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status(),
            generation: self.generation,
            active_index: self.active_index(),
            frame_count: self.sequence().map(|s| s.frames.len()).unwrap_or(0),
            duration: self.sequence().map(PoseSequence::duration).unwrap_or(0.0),
            keypoints: self.keypoints().to_vec(),
            metrics: self.metrics().cloned().unwrap_or_default(),
            video_url: self.video_url(),
            source_size: self.source_size(),
            error: self.error().map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
