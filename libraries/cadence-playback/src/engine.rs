//! Playback engine
//!
//! The engine is a single tokio task that owns the queue store and the one
//! audio output of the session. It is the only consumer of three inputs:
//!
//! - control requests from [`Player`] handles
//! - output events (ready, time, duration, ended, error)
//! - the settlement of an in-flight `play()` call
//!
//! Because everything funnels through one task, transitions apply in the
//! order they were dispatched and the output is never touched concurrently.
//!
//! # Track identity
//!
//! The loaded track is identified by its queue entry id, not its index, so
//! edits that only shift positions (removing an earlier entry, moving entries
//! around) never reload audio. Every load gets a fresh [`LoadId`]; output
//! events and play settlements carrying an older id are ignored.
//!
//! # Play/pause sequencing
//!
//! While a `play()` call is settling, further play, pause and stop requests
//! are not sent to the output. The last of them is remembered and applied
//! once the pending call resolves.

use crate::config::PlaybackConfig;
use crate::entry::{EntryFactory, EntryId, QueueEntry};
use crate::error::{OutputError, QueueError, Result};
use crate::events::PlaybackEvent;
use crate::output::{AudioOutput, LoadId, OutputEvent, OutputEventKind, OutputEvents, PlayFuture};
use crate::player::Player;
use crate::store::{QueueAction, QueueState, QueueStore};
use crate::types::{PlaybackStatus, RepeatMode};
use crate::volume::{self, Volume};
use cadence_core::TrackId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Control requests, one per Control Surface operation
#[derive(Debug)]
pub(crate) enum Command {
    Play,
    Pause,
    TogglePlay,
    Stop,
    Next,
    Previous,
    Seek(f64),
    SetVolume(f32),
    ToggleMute,
    SetShuffle(bool),
    ToggleShuffle,
    SetRepeat(RepeatMode),
    CycleRepeat,
    Append(QueueEntry),
    AppendMany(Vec<QueueEntry>),
    Replace(Vec<QueueEntry>),
    InsertNext(QueueEntry),
    Remove(EntryId),
    Clear,
    Move { from: usize, to: usize },
    PlayFromIndex(usize),
    Shutdown,
}

/// A command with its reply slot
#[derive(Debug)]
pub(crate) struct Request {
    pub(crate) command: Command,
    pub(crate) reply: oneshot::Sender<Result<()>>,
}

/// Transport intent held back while a play call settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Play,
    Pause,
    Stop,
}

/// The media currently pointed at by the output
#[derive(Debug)]
struct LoadedTrack {
    entry_id: EntryId,
    load_id: LoadId,
    /// Output reported it can start
    ready: bool,
    /// Start as soon as the output is ready
    autoplay: bool,
    /// Output confirmed playback of this load
    playing: bool,
    /// Output reported a media error for this load
    failed: bool,
    /// Played to its natural end
    ended: bool,
}

struct PendingPlay {
    load_id: LoadId,
    future: PlayFuture,
}

/// Single owner of the queue store and the audio output
pub struct PlaybackEngine<O: AudioOutput> {
    store: QueueStore,
    output: O,
    output_events: OutputEvents,
    requests: mpsc::Receiver<Request>,
    events: broadcast::Sender<PlaybackEvent>,
    volume: Volume,
    rng: StdRng,
    last_load: LoadId,
    loaded: Option<LoadedTrack>,
    pending_play: Option<PendingPlay>,
    deferred: Option<Intent>,
    status: PlaybackStatus,
}

impl<O: AudioOutput> PlaybackEngine<O> {
    /// Build an engine around `output` and the handle used to control it
    ///
    /// `output_events` must be the receiving end of the channel `output`
    /// reports to.
    pub fn new(config: PlaybackConfig, output: O, output_events: OutputEvents) -> (Self, Player) {
        let (request_tx, requests) = mpsc::channel(config.command_buffer.max(1));
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        let initial_volume = volume::clamp(config.initial_volume);
        let store = QueueStore::new(QueueState::new(initial_volume, config.repeat));
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let player = Player::new(
            request_tx,
            store.subscribe(),
            events.clone(),
            Arc::new(EntryFactory::new()),
        );

        let mut engine = Self {
            store,
            output,
            output_events,
            requests,
            events,
            volume: Volume::new(initial_volume),
            rng,
            last_load: LoadId::default(),
            loaded: None,
            pending_play: None,
            deferred: None,
            status: PlaybackStatus::Stopped,
        };
        engine.output.set_volume(initial_volume);

        (engine, player)
    }

    /// Run the engine on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process requests and output events until shutdown or until every
    /// [`Player`] handle is dropped
    pub async fn run(mut self) {
        info!("Playback engine started");

        loop {
            tokio::select! {
                // Settle in-flight work before taking new requests
                biased;

                (load_id, result) = settle(&mut self.pending_play), if self.pending_play.is_some() => {
                    self.on_play_settled(load_id, result);
                }
                Some(event) = self.output_events.recv() => {
                    self.on_output_event(event);
                }
                request = self.requests.recv() => {
                    let Some(Request { command, reply }) = request else {
                        debug!("All player handles dropped");
                        break;
                    };

                    if matches!(command, Command::Shutdown) {
                        let _ = reply.send(Ok(()));
                        break;
                    }

                    let result = self.handle(command);
                    if let Err(e) = &result {
                        debug!(error = %e, "Command rejected");
                    }
                    // Caller may have stopped waiting
                    let _ = reply.send(result);
                }
            }
        }

        self.output.unload();
        info!("Playback engine stopped");
    }

    // ===== Command Dispatch =====

    fn handle(&mut self, command: Command) -> Result<()> {
        trace!(?command, "Handling command");

        match command {
            Command::Play => self.request(Intent::Play),
            Command::Pause => self.request(Intent::Pause),
            Command::TogglePlay => {
                let intent = if self.wants_playback() {
                    Intent::Pause
                } else {
                    Intent::Play
                };
                self.request(intent);
            }
            Command::Stop => self.request(Intent::Stop),

            Command::Next => {
                let state = self.store.state();
                if !state.has_next() && state.repeat_mode() == RepeatMode::Off {
                    debug!("Next ignored: end of queue");
                    return Ok(());
                }
                self.commit([QueueAction::Advance])?;
                self.sync_current(true);
            }
            Command::Previous => {
                self.commit([QueueAction::Retreat])?;
                self.sync_current(true);
            }

            Command::Seek(position) => self.seek(position),
            Command::SetVolume(level) => {
                let level = self.volume.set_level(level);
                self.apply_volume(level);
            }
            Command::ToggleMute => {
                let level = self.volume.toggle_mute();
                self.apply_volume(level);
            }

            Command::SetShuffle(enabled) => self.set_shuffle(enabled)?,
            Command::ToggleShuffle => {
                let enabled = !self.store.state().is_shuffled();
                self.set_shuffle(enabled)?;
            }
            Command::SetRepeat(mode) => self.commit([QueueAction::SetRepeat(mode)])?,
            Command::CycleRepeat => self.commit([QueueAction::CycleRepeat])?,

            Command::Append(entry) => self.edit_queue([QueueAction::Append(entry)], false)?,
            Command::AppendMany(entries) => {
                self.edit_queue([QueueAction::AppendMany(entries)], false)?;
            }
            Command::Replace(entries) => self.edit_queue([QueueAction::Replace(entries)], true)?,
            Command::InsertNext(entry) => self.insert_next(entry)?,
            Command::Remove(id) => self.edit_queue([QueueAction::Remove(id)], false)?,
            Command::Clear => self.edit_queue([QueueAction::Clear], false)?,
            Command::Move { from, to } => {
                self.edit_queue([QueueAction::Move { from, to }], false)?;
            }

            Command::PlayFromIndex(index) => {
                self.commit([QueueAction::SetCurrentIndex(index)])?;
                self.sync_current(true);
                self.request(Intent::Play);
            }

            // Handled by the run loop
            Command::Shutdown => {}
        }

        Ok(())
    }

    /// Apply caller-supplied transitions, surfacing contract violations
    fn commit(
        &mut self,
        actions: impl IntoIterator<Item = QueueAction>,
    ) -> std::result::Result<(), QueueError> {
        self.store.dispatch_all(actions).map(|_| ())
    }

    /// Apply engine-originated transitions that cannot fail on valid state
    fn apply(&mut self, actions: impl IntoIterator<Item = QueueAction>) {
        if let Err(e) = self.store.dispatch_all(actions) {
            error!(error = %e, "Queue transition rejected");
        }
    }

    /// Commit a queue edit and follow the current entry
    ///
    /// `restart_same` is set for edits that rewind the store's clock even
    /// when the current entry survives, so the output is rewound with it.
    fn edit_queue(
        &mut self,
        actions: impl IntoIterator<Item = QueueAction>,
        restart_same: bool,
    ) -> std::result::Result<(), QueueError> {
        self.commit(actions)?;
        self.emit(PlaybackEvent::QueueChanged {
            length: self.store.state().len(),
        });
        self.sync_current(restart_same);
        Ok(())
    }

    /// Splice `entry` right after the current one, keeping the current entry
    /// and its position
    fn insert_next(&mut self, entry: QueueEntry) -> std::result::Result<(), QueueError> {
        let state = self.store.state();
        let current = state.current_index();
        let time = state.current_time();

        let mut entries = state.entries().to_vec();
        let at = current.map_or(entries.len(), |i| i + 1);
        entries.insert(at, entry);

        let mut actions = vec![QueueAction::Replace(entries)];
        if let Some(index) = current {
            actions.push(QueueAction::SetCurrentIndex(index));
            actions.push(QueueAction::SetCurrentTime(time));
        }

        // Index and time are restored in the same batch
        self.edit_queue(actions, false)
    }

    fn set_shuffle(&mut self, enabled: bool) -> std::result::Result<(), QueueError> {
        let seed = self.rng.gen();
        self.commit([QueueAction::SetShuffle { enabled, seed }])?;
        // Reordering never changes the current entry, but keep the invariant checked
        self.sync_current(false);
        Ok(())
    }

    // ===== Track Synchronization =====

    /// Bring the output in line with the store's current entry
    ///
    /// `restart_same` rewinds the loaded track when the current entry did not
    /// change (next/previous/jump landing on the same entry).
    fn sync_current(&mut self, restart_same: bool) {
        let current = self
            .store
            .state()
            .current_entry()
            .map(|e| (e.id.clone(), e.track.id.clone(), e.track.media_url.clone()));

        match current {
            None => {
                if self.loaded.is_some() {
                    self.unload();
                }
            }
            Some((entry_id, _, _))
                if self.loaded.as_ref().is_some_and(|l| l.entry_id == entry_id) =>
            {
                if restart_same {
                    self.restart();
                }
            }
            Some((entry_id, track_id, locator)) => {
                let autoplay = self.wants_playback();
                self.load(entry_id, track_id, &locator, autoplay);
            }
        }
    }

    fn load(&mut self, entry_id: EntryId, track_id: TrackId, locator: &str, autoplay: bool) {
        self.last_load = self.last_load.next();
        let load_id = self.last_load;

        debug!(entry = %entry_id, %load_id, locator, autoplay, "Loading track");
        self.output.load(locator, load_id);

        let previous = self.loaded.replace(LoadedTrack {
            entry_id: entry_id.clone(),
            load_id,
            ready: false,
            autoplay,
            playing: false,
            failed: false,
            ended: false,
        });

        self.apply([QueueAction::SetCurrentTime(0.0), QueueAction::SetDuration(0.0)]);
        self.emit(PlaybackEvent::TrackChanged {
            entry_id,
            track_id,
            previous_entry_id: previous.map(|p| p.entry_id),
        });
        self.set_status(if autoplay {
            PlaybackStatus::Loading
        } else {
            PlaybackStatus::Stopped
        });
    }

    /// Load the current entry again and play it once ready
    fn reload(&mut self) {
        let current = self
            .store
            .state()
            .current_entry()
            .map(|e| (e.id.clone(), e.track.id.clone(), e.track.media_url.clone()));

        if let Some((entry_id, track_id, locator)) = current {
            debug!(entry = %entry_id, "Retrying failed track");
            self.load(entry_id, track_id, &locator, true);
        }
    }

    fn unload(&mut self) {
        debug!("Queue empty, unloading output");
        self.output.unload();
        self.loaded = None;
        self.set_status(PlaybackStatus::Stopped);
    }

    fn restart(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.ended = false;
        }
        self.output.seek(0.0);
        self.apply([QueueAction::SetCurrentTime(0.0)]);
    }

    // ===== Transport =====

    /// Whether playback is on, or on its way once pending work settles
    fn wants_playback(&self) -> bool {
        match self.deferred {
            Some(Intent::Play) => true,
            Some(Intent::Pause | Intent::Stop) => false,
            None => {
                self.store.state().is_playing()
                    || self.pending_play.is_some()
                    || self.loaded.as_ref().is_some_and(|l| l.autoplay)
            }
        }
    }

    fn request(&mut self, intent: Intent) {
        if self.pending_play.is_some() {
            debug!(?intent, "Play still settling, deferring");
            self.deferred = Some(intent);
            return;
        }

        match intent {
            Intent::Play => self.start_playback(),
            Intent::Pause => self.pause_playback(),
            Intent::Stop => self.stop_playback(),
        }
    }

    fn start_playback(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            debug!("Play ignored: no current track");
            return;
        };

        if loaded.failed {
            // Retry the load; a broken track fails again and stays stopped
            self.reload();
        } else if !loaded.ready {
            // Output not ready yet; start on Ready
            loaded.autoplay = true;
            self.apply([QueueAction::SetPlaying(true)]);
            self.set_status(PlaybackStatus::Loading);
        } else if !loaded.playing {
            self.begin_play();
        }
    }

    /// Issue `play()` to the output for the loaded track
    fn begin_play(&mut self) {
        if self.pending_play.is_some() {
            self.deferred = Some(Intent::Play);
            return;
        }

        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.autoplay = false;
        let load_id = loaded.load_id;

        if std::mem::take(&mut loaded.ended) {
            self.output.seek(0.0);
            self.apply([QueueAction::SetCurrentTime(0.0)]);
        }

        trace!(%load_id, "Starting playback");
        let future = self.output.play();
        self.pending_play = Some(PendingPlay { load_id, future });
        self.set_status(PlaybackStatus::Loading);
    }

    fn pause_playback(&mut self) {
        let mut was_starting = false;
        if let Some(loaded) = self.loaded.as_mut() {
            was_starting = std::mem::take(&mut loaded.autoplay);
            loaded.playing = false;
        }

        if self.store.state().is_playing() || was_starting {
            self.output.pause();
            self.apply([QueueAction::SetPaused(true)]);
            self.set_status(PlaybackStatus::Paused);
        }
    }

    fn stop_playback(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.autoplay = false;
        loaded.playing = false;
        loaded.ended = false;

        self.output.pause();
        self.output.seek(0.0);
        self.apply([
            QueueAction::SetPlaying(false),
            QueueAction::SetCurrentTime(0.0),
        ]);
        self.set_status(PlaybackStatus::Stopped);
    }

    fn seek(&mut self, position: f64) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };

        let duration = self.store.state().duration();
        let mut target = if position.is_finite() {
            position.max(0.0)
        } else {
            0.0
        };
        if duration > 0.0 {
            target = target.min(duration);
            if target < duration {
                loaded.ended = false;
            }
        }

        self.output.seek(target);
        self.apply([QueueAction::SetCurrentTime(target)]);
        self.emit(PlaybackEvent::PositionUpdate {
            position: target,
            duration,
        });
    }

    fn apply_volume(&mut self, level: f32) {
        self.output.set_volume(level);
        self.apply([QueueAction::SetVolume(level)]);
        self.emit(PlaybackEvent::VolumeChanged {
            level,
            is_muted: self.volume.is_muted(),
        });
    }

    // ===== Asynchronous Completions =====

    fn on_play_settled(&mut self, load_id: LoadId, result: std::result::Result<(), OutputError>) {
        self.pending_play = None;

        let current = self.loaded.as_mut().filter(|l| l.load_id == load_id);
        if let Some(loaded) = current {
            if loaded.failed {
                debug!(%load_id, "Ignoring play result for failed track");
            } else {
                loaded.playing = result.is_ok();
                match result {
                    Ok(()) => {
                        self.apply([QueueAction::SetPlaying(true)]);
                        self.set_status(PlaybackStatus::Playing);
                    }
                    Err(e) => self.report_error(&e),
                }
            }
        } else {
            debug!(%load_id, "Ignoring play result for superseded track");
        }

        if let Some(intent) = self.deferred.take() {
            debug!(?intent, "Applying deferred request");
            self.request(intent);
        }
    }

    fn on_output_event(&mut self, event: OutputEvent) {
        let Some(loaded) = self.loaded.as_mut() else {
            trace!(load_id = %event.load_id, "Output event with nothing loaded");
            return;
        };
        if event.load_id != loaded.load_id {
            trace!(load_id = %event.load_id, "Dropping stale output event");
            return;
        }

        match event.kind {
            OutputEventKind::Ready => {
                loaded.ready = true;
                if loaded.autoplay {
                    self.begin_play();
                }
            }
            OutputEventKind::DurationChanged(duration) => {
                self.apply([QueueAction::SetDuration(duration)]);
            }
            OutputEventKind::TimeUpdate(position) => {
                self.apply([QueueAction::SetCurrentTime(position)]);
                self.emit(PlaybackEvent::PositionUpdate {
                    position: self.store.state().current_time(),
                    duration: self.store.state().duration(),
                });
            }
            OutputEventKind::Ended => self.on_ended(),
            OutputEventKind::Error(message) => {
                loaded.autoplay = false;
                loaded.playing = false;
                loaded.failed = true;
                self.report_error(&OutputError::Media(message));
            }
        }
    }

    fn on_ended(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.ended = true;
        loaded.playing = false;
        let finished = loaded.entry_id.clone();
        info!(entry = %finished, "Track finished");

        self.apply([QueueAction::SetPlaying(false)]);
        self.emit(PlaybackEvent::TrackFinished {
            entry_id: finished.clone(),
        });

        self.apply([QueueAction::Advance]);

        let state = self.store.state();
        let next = state
            .current_entry()
            .map(|e| (e.id.clone(), e.track.id.clone(), e.track.media_url.clone()));

        match next {
            Some((entry_id, _, _)) if entry_id == finished => {
                if state.repeat_mode() == RepeatMode::Off {
                    debug!("End of queue reached");
                    self.set_status(PlaybackStatus::Stopped);
                } else {
                    // Repeat one, or repeat all over a single entry
                    self.begin_play();
                }
            }
            Some((entry_id, track_id, locator)) => {
                self.load(entry_id, track_id, &locator, true);
            }
            None => self.unload(),
        }
    }

    fn report_error(&mut self, error: &OutputError) {
        let message = error.to_string();
        warn!(error = %message, "Playback error");
        self.apply([QueueAction::SetPlaying(false)]);
        self.emit(PlaybackEvent::Error { message });
        self.set_status(PlaybackStatus::Stopped);
    }

    // ===== Notifications =====

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.emit(PlaybackEvent::StateChanged { state: status });
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Wait for the pending play call, if any
async fn settle(
    pending: &mut Option<PendingPlay>,
) -> (LoadId, std::result::Result<(), OutputError>) {
    match pending {
        Some(play) => {
            let result = (&mut play.future).await;
            (play.load_id, result)
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Source, Track};
    use std::sync::Mutex;

    /// Output that only records seeks
    #[derive(Default)]
    struct SeekLog {
        seeks: Arc<Mutex<Vec<f64>>>,
    }

    impl AudioOutput for SeekLog {
        fn load(&mut self, _locator: &str, _load_id: LoadId) {}

        fn play(&mut self) -> PlayFuture {
            Box::pin(async { Ok::<(), OutputError>(()) })
        }

        fn pause(&mut self) {}

        fn seek(&mut self, position: f64) {
            self.seeks.lock().unwrap().push(position);
        }

        fn set_volume(&mut self, _level: f32) {}

        fn unload(&mut self) {}
    }

    fn entry(factory: &EntryFactory, id: &str) -> QueueEntry {
        let track = Track::new(id, id, "Artist", format!("/{id}.mp3")).with_duration(100.0);
        let source = Source::single(&track);
        factory.create(track, source)
    }

    #[test]
    fn replace_keeping_current_entry_rewinds_output() {
        let output = SeekLog::default();
        let seeks = Arc::clone(&output.seeks);
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (mut engine, _player) = PlaybackEngine::new(PlaybackConfig::default(), output, events_rx);

        let factory = EntryFactory::new();
        let current = entry(&factory, "a");
        engine.handle(Command::Append(current.clone())).unwrap();
        engine.handle(Command::Seek(30.0)).unwrap();
        assert_eq!(engine.store.state().current_time(), 30.0);

        engine
            .handle(Command::Replace(vec![current, entry(&factory, "b")]))
            .unwrap();

        assert_eq!(engine.store.state().current_time(), 0.0);
        assert_eq!(*seeks.lock().unwrap(), vec![30.0, 0.0]);
    }
}
