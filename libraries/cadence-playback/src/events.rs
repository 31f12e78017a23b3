//! Playback Events
//!
//! Event-based notifications for UI synchronization. The queue state itself
//! is observed through the watch channel; these events mark the moments a UI
//! may want to react to (track switches, failures, status changes).

use crate::entry::EntryId;
use crate::types::PlaybackStatus;
use cadence_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport status changed
    StateChanged {
        state: PlaybackStatus,
    },

    /// A different queue entry became current and was loaded
    TrackChanged {
        entry_id: EntryId,
        track_id: TrackId,
        /// Entry that was loaded before, if any
        previous_entry_id: Option<EntryId>,
    },

    /// Current track played to its end
    TrackFinished {
        entry_id: EntryId,
    },

    /// Position update from the output, or after a seek (seconds)
    PositionUpdate {
        position: f64,
        duration: f64,
    },

    VolumeChanged {
        /// New level in [0, 1]
        level: f32,
        is_muted: bool,
    },

    /// Entries were added, removed or reordered
    QueueChanged {
        length: usize,
    },

    /// Non-fatal playback failure; the queue is left as it was
    Error {
        message: String,
    },
}
