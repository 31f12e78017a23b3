//! Audio output boundary
//!
//! The playback engine owns exactly one [`AudioOutput`]. Outputs report
//! progress asynchronously through [`OutputEvent`]s on an mpsc channel handed
//! to the engine at construction. Every event carries the [`LoadId`] of the
//! load that produced it, so the engine can drop callbacks from media that is
//! no longer current.

use crate::error::OutputError;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Pending start of playback
///
/// Resolves once the output is actually playing, or with the reason it could
/// not start. Must not borrow the output.
pub type PlayFuture = Pin<Box<dyn Future<Output = Result<(), OutputError>> + Send + 'static>>;

/// Sending half of the output event channel
pub type OutputEventSender = mpsc::UnboundedSender<OutputEvent>;

/// Receiving half of the output event channel, consumed by the engine
pub type OutputEvents = mpsc::UnboundedReceiver<OutputEvent>;

/// Generation counter for media loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadId(u64);

impl LoadId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous notification from an output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEvent {
    pub load_id: LoadId,
    pub kind: OutputEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEventKind {
    /// Enough media is buffered to start playing
    Ready,
    /// Media duration became known (seconds)
    DurationChanged(f64),
    /// Playback position advanced (seconds)
    TimeUpdate(f64),
    /// Media played to its natural end
    Ended,
    /// Media could not be loaded or decoded
    Error(String),
}

impl OutputEvent {
    pub fn new(load_id: LoadId, kind: OutputEventKind) -> Self {
        Self { load_id, kind }
    }
}

/// A single audio output handle
///
/// Implementations must never block; anything slow is reported later through
/// the event channel or the returned [`PlayFuture`].
pub trait AudioOutput: Send + 'static {
    /// Point the output at new media, abandoning whatever was loaded or
    /// loading before. Events for this media carry `load_id`.
    fn load(&mut self, locator: &str, load_id: LoadId);

    /// Start or resume playback of the loaded media
    fn play(&mut self) -> PlayFuture;

    fn pause(&mut self);

    /// Move the playhead (seconds)
    fn seek(&mut self, position: f64);

    /// Set output level in [0, 1]
    fn set_volume(&mut self, level: f32);

    /// Stop and release the loaded media
    fn unload(&mut self);
}
