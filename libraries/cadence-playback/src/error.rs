//! Error types for the play queue and playback engine

use crate::entry::EntryId;
use thiserror::Error;

/// Queue transition contract violations
///
/// These indicate a caller bug (an index or entry id that does not exist) and
/// are returned at the call boundary. A rejected transition never changes the
/// queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Index does not address an entry of the queue
    #[error("Index {index} out of range for queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// No entry with this id is queued
    #[error("Queue entry not found: {0}")]
    EntryNotFound(EntryId),
}

/// Failures reported by an audio output
///
/// These never fail a control call; the engine reports them as
/// [`crate::PlaybackEvent::Error`] and stops playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("Media error: {0}")]
    Media(String),

    #[error("Playback start rejected: {0}")]
    PlayRejected(String),

    #[error("No media loaded")]
    NotLoaded,
}

/// Control surface errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Invalid queue transition input
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The engine task has shut down
    #[error("Playback engine is not running")]
    EngineStopped,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
