//! Control surface
//!
//! [`Player`] is the handle UI code holds. Every operation is forwarded to the
//! engine task and resolves once the engine has committed it, so a caller can
//! `await` an operation and then read the resulting state.

use crate::engine::{Command, Request};
use crate::entry::{EntryFactory, EntryId};
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::store::QueueState;
use crate::types::RepeatMode;
use cadence_core::{Album, Playlist, Source, Track};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

/// Cloneable handle to a running playback engine
#[derive(Debug, Clone)]
pub struct Player {
    requests: mpsc::Sender<Request>,
    state: watch::Receiver<QueueState>,
    events: broadcast::Sender<PlaybackEvent>,
    entries: Arc<EntryFactory>,
}

impl Player {
    pub(crate) fn new(
        requests: mpsc::Sender<Request>,
        state: watch::Receiver<QueueState>,
        events: broadcast::Sender<PlaybackEvent>,
        entries: Arc<EntryFactory>,
    ) -> Self {
        Self {
            requests,
            state,
            events,
            entries,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        let (reply, response) = oneshot::channel();

        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| PlaybackError::EngineStopped)?;

        response.await.map_err(|_| PlaybackError::EngineStopped)?
    }

    // ===== State =====

    /// Latest committed queue state
    pub fn state(&self) -> QueueState {
        self.state.borrow().clone()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.borrow().current_track().cloned()
    }

    /// Watch the queue state; the receiver sees every committed change
    pub fn subscribe_state(&self) -> watch::Receiver<QueueState> {
        self.state.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    // ===== Playback Control =====

    /// Start playback of the current track (no-op without one)
    pub async fn play(&self) -> Result<()> {
        self.send(Command::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    pub async fn toggle_play(&self) -> Result<()> {
        self.send(Command::TogglePlay).await
    }

    /// Pause and rewind the current track
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Skip forward
    ///
    /// At the end of the queue with repeat off this does nothing: the index
    /// and `current_time` stay as they are.
    pub async fn next(&self) -> Result<()> {
        self.send(Command::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.send(Command::Previous).await
    }

    /// Seek within the current track (seconds, clamped to the track)
    pub async fn seek(&self, position: f64) -> Result<()> {
        self.send(Command::Seek(position)).await
    }

    /// Set volume, clamped to [0, 1]
    pub async fn set_volume(&self, level: f32) -> Result<()> {
        self.send(Command::SetVolume(level)).await
    }

    pub async fn toggle_mute(&self) -> Result<()> {
        self.send(Command::ToggleMute).await
    }

    // ===== Modes =====

    pub async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetShuffle(enabled)).await
    }

    pub async fn toggle_shuffle(&self) -> Result<()> {
        self.send(Command::ToggleShuffle).await
    }

    pub async fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.send(Command::SetRepeat(mode)).await
    }

    /// Cycle repeat mode none -> one -> all -> none
    pub async fn toggle_repeat(&self) -> Result<()> {
        self.send(Command::CycleRepeat).await
    }

    // ===== Queue Management =====

    /// Append one track
    ///
    /// Without an explicit source the entry is tagged as a single named after
    /// the track. Returns the id of the new entry.
    pub async fn add_track(&self, track: Track, source: Option<Source>) -> Result<EntryId> {
        let source = source.unwrap_or_else(|| Source::single(&track));
        let entry = self.entries.create(track, source);
        let id = entry.id.clone();

        self.send(Command::Append(entry)).await?;
        Ok(id)
    }

    /// Append every track of the album, in album order, as one batch
    pub async fn add_album(&self, album: &Album) -> Result<()> {
        debug!(album = %album.id, tracks = album.track_count(), "Enqueueing album");
        let entries = self.entries.create_batch(&album.tracks, &Source::album(album));
        self.send(Command::AppendMany(entries)).await
    }

    /// Append every track of the playlist, in playlist order, as one batch
    pub async fn add_playlist(&self, playlist: &Playlist) -> Result<()> {
        debug!(playlist = %playlist.id, tracks = playlist.track_count(), "Enqueueing playlist");
        let entries = self
            .entries
            .create_batch(&playlist.tracks, &Source::playlist(playlist));
        self.send(Command::AppendMany(entries)).await
    }

    /// Replace the whole queue; the first track becomes current
    pub async fn replace_queue(&self, tracks: &[Track], source: Source) -> Result<()> {
        let entries = self.entries.create_batch(tracks, &source);
        self.send(Command::Replace(entries)).await
    }

    /// Insert a track right after the current one
    ///
    /// The current entry and its playback position are kept. Returns the id
    /// of the new entry.
    pub async fn play_next(&self, track: Track, source: Option<Source>) -> Result<EntryId> {
        let source = source.unwrap_or_else(|| Source::single(&track));
        let entry = self.entries.create(track, source);
        let id = entry.id.clone();

        self.send(Command::InsertNext(entry)).await?;
        Ok(id)
    }

    pub async fn remove(&self, entry_id: EntryId) -> Result<()> {
        self.send(Command::Remove(entry_id)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.send(Command::Clear).await
    }

    /// Move the entry at `from` to `to`; the current entry stays current
    pub async fn move_entry(&self, from: usize, to: usize) -> Result<()> {
        self.send(Command::Move { from, to }).await
    }

    /// Jump to `index` and start playing it
    ///
    /// Resolves after the jump is committed and playback was requested; there
    /// is no settling delay to wait out.
    pub async fn play_from_index(&self, index: usize) -> Result<()> {
        self.send(Command::PlayFromIndex(index)).await
    }

    /// Stop the engine and release the output
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }
}
