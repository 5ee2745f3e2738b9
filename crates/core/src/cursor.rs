//! Time-indexed frame cursor for pose playback.
//!
//! [`FrameCursor`] maps a playback clock onto the index of the frame that
//! is active at that time. The search is a two-sided linear scan anchored
//! at the last active index: forward playback costs amortized O(1) per
//! update, a seek across `k` frames costs O(k). Sequences are bounded
//! (tens of seconds at video frame rate), so the linear worst case on a
//! long seek is acceptable.
//!
//! The active frame is the last frame whose time is `<= t`. Times before
//! the first frame select frame 0 (never extrapolated); times past the
//! last frame clamp to the last frame. Among frames sharing a timestamp
//! the last one is selected, from either direction.

use crate::pose::PoseFrame;

/// Outcome of a [`FrameCursor::seek`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    /// The active index did not change.
    Unchanged,
    /// The active index moved from `from` to `to`.
    Moved { from: usize, to: usize },
}

impl CursorMove {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Index of the active frame within a time-ordered frame list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    index: usize,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active frame index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Force the cursor back to the first frame.
    pub fn reset(&mut self) -> CursorMove {
        let from = self.index;
        self.index = 0;
        if from == 0 {
            CursorMove::Unchanged
        } else {
            CursorMove::Moved { from, to: 0 }
        }
    }

    /// Move the cursor to the frame active at `time` (seconds).
    ///
    /// An empty frame list or a non-finite time leaves the cursor alone.
    pub fn seek(&mut self, frames: &[PoseFrame], time: f64) -> CursorMove {
        if frames.is_empty() || time.is_nan() {
            return CursorMove::Unchanged;
        }

        let last = frames.len() - 1;
        let from = self.index;
        let mut index = from.min(last);

        if time >= frames[index].time && index < last {
            while index < last && frames[index + 1].time <= time {
                index += 1;
            }
        } else if time < frames[index].time {
            while index > 0 && frames[index].time > time {
                index -= 1;
            }
        }

        self.index = index;
        if index == from {
            CursorMove::Unchanged
        } else {
            CursorMove::Moved { from, to: index }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
