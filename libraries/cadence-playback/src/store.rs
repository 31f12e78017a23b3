//! Queue store
//!
//! `QueueState` is the single source of truth for the play queue: the ordered
//! entries, the current position and the transport flags. It only changes
//! through [`reduce`], a pure transition function over [`QueueAction`].
//!
//! [`QueueStore`] owns the live state and publishes every committed state on a
//! watch channel, which is the read-only surface UI code renders from.

use crate::entry::{EntryId, QueueEntry};
use crate::error::QueueError;
use crate::shuffle;
use crate::types::RepeatMode;
use crate::volume;
use cadence_core::Track;
use serde::Serialize;
use tokio::sync::watch;

/// Named queue transitions
#[derive(Debug, Clone, PartialEq)]
pub enum QueueAction {
    /// Replace the whole sequence; current becomes the first entry
    Replace(Vec<QueueEntry>),
    Append(QueueEntry),
    /// Batch append, with the empty-queue rule applied once
    AppendMany(Vec<QueueEntry>),
    Remove(EntryId),
    Clear,
    Move { from: usize, to: usize },
    /// Jump to an entry
    SetCurrentIndex(usize),
    SetPlaying(bool),
    SetPaused(bool),
    /// Toggle shuffle; `seed` drives the permutation when enabling
    SetShuffle { enabled: bool, seed: u64 },
    SetRepeat(RepeatMode),
    /// none -> one -> all -> none
    CycleRepeat,
    SetVolume(f32),
    SetCurrentTime(f64),
    SetDuration(f64),
    Advance,
    Retreat,
}

/// Snapshot of the play queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueState {
    entries: Vec<QueueEntry>,
    current_index: Option<usize>,
    is_playing: bool,
    is_paused: bool,
    is_shuffled: bool,
    repeat_mode: RepeatMode,
    volume: f32,
    current_time: f64,
    duration: f64,

    /// Entry order before shuffle was enabled
    #[serde(skip)]
    unshuffled: Vec<EntryId>,
}

impl Default for QueueState {
    fn default() -> Self {
        Self::new(1.0, RepeatMode::Off)
    }
}

/// Apply one transition, returning the new state
///
/// Pure: the input state is never modified, and the same state and action
/// always produce the same result.
pub fn reduce(state: &QueueState, action: QueueAction) -> Result<QueueState, QueueError> {
    let mut next = state.clone();
    next.apply(action)?;
    Ok(next)
}

impl QueueState {
    /// Empty queue with the given volume and repeat mode
    pub fn new(volume: f32, repeat_mode: RepeatMode) -> Self {
        Self {
            entries: Vec::new(),
            current_index: None,
            is_playing: false,
            is_paused: false,
            is_shuffled: false,
            repeat_mode,
            volume: volume::clamp(volume),
            current_time: 0.0,
            duration: 0.0,
            unshuffled: Vec::new(),
        }
    }

    // ===== Accessors =====

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// `None` when the queue is empty
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_entry(&self) -> Option<&QueueEntry> {
        self.current_index.and_then(|i| self.entries.get(i))
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_entry().map(|e| &e.track)
    }

    pub fn position_of(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Entries after the current one, in play order
    pub fn upcoming(&self) -> &[QueueEntry] {
        match self.current_index {
            Some(i) => &self.entries[i + 1..],
            None => &[],
        }
    }

    // ===== Display Helpers =====

    /// Sum of all queued track durations, in seconds
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(|e| e.track.duration).sum()
    }

    /// Whether "previous" has somewhere to go without wrapping
    pub fn has_previous(&self) -> bool {
        matches!(self.current_index, Some(i) if i > 0)
    }

    /// Whether "next" has somewhere to go without wrapping
    pub fn has_next(&self) -> bool {
        matches!(self.current_index, Some(i) if i + 1 < self.entries.len())
    }

    /// "3 / 10" style position, 1-based
    pub fn position_label(&self) -> String {
        match self.current_index {
            Some(i) => format!("{} / {}", i + 1, self.entries.len()),
            None => format!("0 / {}", self.entries.len()),
        }
    }

    /// Fraction of the current track played, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    // ===== Transitions =====

    fn apply(&mut self, action: QueueAction) -> Result<(), QueueError> {
        match action {
            QueueAction::Replace(entries) => {
                if self.is_shuffled {
                    self.unshuffled = shuffle::merge_order(&self.unshuffled, &entries);
                }
                self.entries = entries;
                if self.entries.is_empty() {
                    self.reset_transport();
                } else {
                    self.jump(0);
                }
            }

            QueueAction::Append(entry) => self.append(vec![entry]),

            QueueAction::AppendMany(entries) => self.append(entries),

            QueueAction::Remove(id) => {
                let removed = self
                    .position_of(&id)
                    .ok_or_else(|| QueueError::EntryNotFound(id.clone()))?;

                self.entries.remove(removed);
                self.unshuffled.retain(|known| known != &id);

                if self.entries.is_empty() {
                    self.reset_transport();
                } else if let Some(current) = self.current_index {
                    if removed < current {
                        self.current_index = Some(current - 1);
                    } else if removed == current {
                        self.jump(current.min(self.entries.len() - 1));
                    }
                }
            }

            QueueAction::Clear => {
                self.entries.clear();
                self.unshuffled.clear();
                self.reset_transport();
            }

            QueueAction::Move { from, to } => {
                let len = self.entries.len();
                for index in [from, to] {
                    if index >= len {
                        return Err(QueueError::IndexOutOfRange { index, len });
                    }
                }

                if from != to {
                    let entry = self.entries.remove(from);
                    self.entries.insert(to, entry);

                    if let Some(current) = self.current_index {
                        self.current_index = Some(if current == from {
                            to
                        } else if from < current && current <= to {
                            current - 1
                        } else if to <= current && current < from {
                            current + 1
                        } else {
                            current
                        });
                    }
                }
            }

            QueueAction::SetCurrentIndex(index) => {
                let len = self.entries.len();
                if index >= len {
                    return Err(QueueError::IndexOutOfRange { index, len });
                }
                self.jump(index);
            }

            QueueAction::SetPlaying(playing) => {
                self.is_playing = playing;
                self.is_paused = !playing;
            }

            QueueAction::SetPaused(paused) => {
                self.is_paused = paused;
                self.is_playing = !paused;
            }

            QueueAction::SetShuffle { enabled, seed } => self.set_shuffle(enabled, seed),

            QueueAction::SetRepeat(mode) => self.repeat_mode = mode,

            QueueAction::CycleRepeat => self.repeat_mode = self.repeat_mode.cycle(),

            QueueAction::SetVolume(level) => self.volume = volume::clamp(level),

            QueueAction::SetCurrentTime(time) => self.current_time = non_negative(time),

            QueueAction::SetDuration(duration) => self.duration = non_negative(duration),

            QueueAction::Advance => {
                let Some(current) = self.current_index else {
                    return Ok(());
                };
                let last = self.entries.len() - 1;

                let next = match self.repeat_mode {
                    RepeatMode::One => current,
                    _ if current < last => current + 1,
                    RepeatMode::All => 0,
                    RepeatMode::Off => last,
                };
                self.jump(next);
            }

            QueueAction::Retreat => {
                let Some(current) = self.current_index else {
                    return Ok(());
                };

                let previous = match current.checked_sub(1) {
                    Some(previous) => previous,
                    None if self.repeat_mode == RepeatMode::All => self.entries.len() - 1,
                    None => 0,
                };
                self.jump(previous);
            }
        }

        Ok(())
    }

    fn append(&mut self, entries: Vec<QueueEntry>) {
        if entries.is_empty() {
            return;
        }

        if self.is_shuffled {
            self.unshuffled.extend(entries.iter().map(|e| e.id.clone()));
        }
        self.entries.extend(entries);

        if self.current_index.is_none() {
            self.jump(0);
        }
    }

    fn set_shuffle(&mut self, enabled: bool, seed: u64) {
        if enabled == self.is_shuffled {
            return;
        }

        let current_id = self.current_entry().map(|e| e.id.clone());

        if enabled {
            self.unshuffled = self.entries.iter().map(|e| e.id.clone()).collect();
            let start = self.current_index.map_or(0, |i| i + 1);
            shuffle::shuffle_from(&mut self.entries, start, seed);
        } else {
            let order = std::mem::take(&mut self.unshuffled);
            shuffle::restore_order(&mut self.entries, &order);
            // Same logical entry, same playback position
            self.current_index = current_id.and_then(|id| self.position_of(&id));
        }

        self.is_shuffled = enabled;
    }

    /// Point at `index` and rewind the clock
    fn jump(&mut self, index: usize) {
        self.current_index = Some(index);
        self.current_time = 0.0;
    }

    fn reset_transport(&mut self) {
        self.current_index = None;
        self.is_playing = false;
        self.is_paused = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

/// Format seconds as `m:ss` for the progress bar
pub fn format_clock(seconds: f64) -> String {
    let total = non_negative(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Owner of the live queue state
///
/// Every committed state is published to subscribers. [`QueueStore::dispatch_all`]
/// applies a batch of transitions atomically and publishes once, so observers
/// never see intermediate states of a composite operation.
#[derive(Debug)]
pub struct QueueStore {
    state: QueueState,
    publisher: watch::Sender<QueueState>,
}

impl QueueStore {
    pub fn new(initial: QueueState) -> Self {
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            state: initial,
            publisher,
        }
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueState> {
        self.publisher.subscribe()
    }

    pub fn dispatch(&mut self, action: QueueAction) -> Result<&QueueState, QueueError> {
        self.dispatch_all([action])
    }

    /// Apply transitions in order; all of them commit or none do
    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = QueueAction>,
    ) -> Result<&QueueState, QueueError> {
        let mut next = self.state.clone();
        for action in actions {
            next.apply(action)?;
        }

        if next != self.state {
            self.state = next;
            self.publisher.send_replace(self.state.clone());
        }

        Ok(&self.state)
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new(QueueState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryFactory;
    use cadence_core::Source;

    // ===== Test Helpers =====

    fn entries(names: &[&str]) -> Vec<QueueEntry> {
        let factory = EntryFactory::new();
        names
            .iter()
            .map(|name| {
                let track = Track::new(*name, *name, "Artist", format!("/{name}.mp3"))
                    .with_duration(100.0);
                let source = Source::single(&track);
                factory.create(track, source)
            })
            .collect()
    }

    fn queue(names: &[&str], current: usize) -> QueueState {
        let mut state = reduce(&QueueState::default(), QueueAction::Replace(entries(names))).unwrap();
        state = reduce(&state, QueueAction::SetCurrentIndex(current)).unwrap();
        state
    }

    fn titles(state: &QueueState) -> Vec<&str> {
        state.entries().iter().map(|e| e.track.title.as_str()).collect()
    }

    fn current_title(state: &QueueState) -> Option<&str> {
        state.current_track().map(|t| t.title.as_str())
    }

    fn with_repeat(state: &QueueState, mode: RepeatMode) -> QueueState {
        reduce(state, QueueAction::SetRepeat(mode)).unwrap()
    }

    // ===== Replace / Append =====

    #[test]
    fn replace_points_at_first_entry() {
        let state = reduce(&QueueState::default(), QueueAction::Replace(entries(&["a", "b"]))).unwrap();
        assert_eq!(state.current_index(), Some(0));

        let state = reduce(&state, QueueAction::Replace(vec![])).unwrap();
        assert_eq!(state.current_index(), None);
    }

    #[test]
    fn append_to_empty_sets_current() {
        let mut e = entries(&["a", "b"]);
        let state = reduce(&QueueState::default(), QueueAction::Append(e.remove(0))).unwrap();
        assert_eq!(state.current_index(), Some(0));

        let state = reduce(&state, QueueAction::Append(e.remove(0))).unwrap();
        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn append_many_to_empty_sets_current_once() {
        let state = reduce(
            &QueueState::default(),
            QueueAction::AppendMany(entries(&["a", "b", "c"])),
        )
        .unwrap();

        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn append_keeps_existing_current() {
        let state = queue(&["a", "b"], 1);
        let state = reduce(&state, QueueAction::AppendMany(entries(&["c", "d"]))).unwrap();
        assert_eq!(current_title(&state), Some("b"));
    }

    // ===== Remove =====

    #[test]
    fn remove_before_current_shifts_left() {
        let state = queue(&["a", "b", "c", "d"], 2);
        let id = state.entries()[0].id.clone();

        let state = reduce(&state, QueueAction::Remove(id)).unwrap();

        assert_eq!(state.current_index(), Some(1));
        assert_eq!(current_title(&state), Some("c"));
    }

    #[test]
    fn remove_current_lands_on_following_entry() {
        let state = queue(&["A", "B", "C", "D", "E"], 3);
        let id = state.entries()[3].id.clone();

        let state = reduce(&state, QueueAction::Remove(id)).unwrap();

        assert_eq!(titles(&state), vec!["A", "B", "C", "E"]);
        assert_eq!(state.current_index(), Some(3));
        assert_eq!(current_title(&state), Some("E"));
    }

    #[test]
    fn remove_current_last_entry_clamps() {
        let state = queue(&["a", "b", "c"], 2);
        let id = state.entries()[2].id.clone();

        let state = reduce(&state, QueueAction::Remove(id)).unwrap();

        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn remove_after_current_leaves_index() {
        let state = queue(&["a", "b", "c"], 0);
        let id = state.entries()[2].id.clone();

        let state = reduce(&state, QueueAction::Remove(id)).unwrap();

        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn remove_only_entry_empties_queue() {
        let state = queue(&["a"], 0);
        let state = reduce(&state, QueueAction::SetPlaying(true)).unwrap();
        let id = state.entries()[0].id.clone();

        let state = reduce(&state, QueueAction::Remove(id)).unwrap();

        assert_eq!(state.current_index(), None);
        assert!(!state.is_playing());
    }

    #[test]
    fn remove_unknown_id_is_rejected() {
        let state = queue(&["a"], 0);
        let result = reduce(&state, QueueAction::Remove(EntryId::new("missing")));

        assert_eq!(
            result,
            Err(QueueError::EntryNotFound(EntryId::new("missing")))
        );
    }

    // ===== Clear =====

    #[test]
    fn clear_resets_transport_but_keeps_settings() {
        let state = queue(&["a", "b"], 1);
        let state = reduce(&state, QueueAction::SetPlaying(true)).unwrap();
        let state = reduce(&state, QueueAction::SetCurrentTime(42.0)).unwrap();
        let state = reduce(&state, QueueAction::SetDuration(100.0)).unwrap();
        let state = reduce(&state, QueueAction::SetVolume(0.3)).unwrap();
        let state = with_repeat(&state, RepeatMode::All);

        let state = reduce(&state, QueueAction::Clear).unwrap();

        assert!(state.is_empty());
        assert_eq!(state.current_index(), None);
        assert!(!state.is_playing());
        assert!(!state.is_paused());
        assert_eq!(state.current_time(), 0.0);
        assert_eq!(state.duration(), 0.0);
        assert_eq!(state.volume(), 0.3);
        assert_eq!(state.repeat_mode(), RepeatMode::All);
    }

    // ===== Move =====

    #[test]
    fn move_current_follows_entry() {
        let state = queue(&["a", "b", "c", "d", "e"], 0);

        let state = reduce(&state, QueueAction::Move { from: 0, to: 4 }).unwrap();

        assert_eq!(state.current_index(), Some(4));
        assert_eq!(current_title(&state), Some("a"));
        assert_eq!(titles(&state), vec!["b", "c", "d", "e", "a"]);
    }

    #[test]
    fn move_across_current_shifts_it() {
        // from < current <= to: current moves left
        let state = queue(&["a", "b", "c", "d"], 2);
        let state = reduce(&state, QueueAction::Move { from: 0, to: 3 }).unwrap();
        assert_eq!(current_title(&state), Some("c"));
        assert_eq!(state.current_index(), Some(1));

        // to <= current < from: current moves right
        let state = queue(&["a", "b", "c", "d"], 1);
        let state = reduce(&state, QueueAction::Move { from: 3, to: 0 }).unwrap();
        assert_eq!(current_title(&state), Some("b"));
        assert_eq!(state.current_index(), Some(2));
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let state = queue(&["a", "b"], 0);

        assert_eq!(
            reduce(&state, QueueAction::Move { from: 0, to: 2 }),
            Err(QueueError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            reduce(&state, QueueAction::Move { from: 5, to: 0 }),
            Err(QueueError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    // ===== Jump / Transport =====

    #[test]
    fn set_current_index_rewinds() {
        let state = queue(&["a", "b", "c"], 0);
        let state = reduce(&state, QueueAction::SetCurrentTime(30.0)).unwrap();

        let state = reduce(&state, QueueAction::SetCurrentIndex(2)).unwrap();

        assert_eq!(state.current_index(), Some(2));
        assert_eq!(state.current_time(), 0.0);
        assert!(reduce(&state, QueueAction::SetCurrentIndex(3)).is_err());
    }

    #[test]
    fn playing_and_paused_are_complementary() {
        let state = queue(&["a"], 0);

        let state = reduce(&state, QueueAction::SetPlaying(true)).unwrap();
        assert!(state.is_playing() && !state.is_paused());

        let state = reduce(&state, QueueAction::SetPaused(true)).unwrap();
        assert!(!state.is_playing() && state.is_paused());

        let state = reduce(&state, QueueAction::SetPaused(false)).unwrap();
        assert!(state.is_playing() && !state.is_paused());
    }

    #[test]
    fn volume_is_clamped() {
        let state = reduce(&QueueState::default(), QueueAction::SetVolume(1.5)).unwrap();
        assert_eq!(state.volume(), 1.0);

        let state = reduce(&state, QueueAction::SetVolume(-0.2)).unwrap();
        assert_eq!(state.volume(), 0.0);
    }

    #[test]
    fn negative_times_are_zeroed() {
        let state = reduce(&QueueState::default(), QueueAction::SetCurrentTime(-4.0)).unwrap();
        assert_eq!(state.current_time(), 0.0);

        let state = reduce(&state, QueueAction::SetDuration(f64::NAN)).unwrap();
        assert_eq!(state.duration(), 0.0);
    }

    #[test]
    fn cycle_repeat() {
        let state = reduce(&QueueState::default(), QueueAction::CycleRepeat).unwrap();
        assert_eq!(state.repeat_mode(), RepeatMode::One);
        let state = reduce(&state, QueueAction::CycleRepeat).unwrap();
        assert_eq!(state.repeat_mode(), RepeatMode::All);
        let state = reduce(&state, QueueAction::CycleRepeat).unwrap();
        assert_eq!(state.repeat_mode(), RepeatMode::Off);
    }

    // ===== Advance / Retreat =====

    #[test]
    fn advance_repeat_one_stays() {
        let state = with_repeat(&queue(&["a", "b", "c"], 1), RepeatMode::One);
        let state = reduce(&state, QueueAction::Advance).unwrap();
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn advance_repeat_all_wraps() {
        let state = with_repeat(&queue(&["a", "b", "c"], 2), RepeatMode::All);
        let state = reduce(&state, QueueAction::Advance).unwrap();
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn advance_repeat_none_stalls_at_end() {
        let state = queue(&["a", "b", "c"], 2);
        let state = reduce(&state, QueueAction::SetCurrentTime(12.0)).unwrap();

        let state = reduce(&state, QueueAction::Advance).unwrap();

        assert_eq!(state.current_index(), Some(2));
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn advance_moves_forward() {
        let state = queue(&["a", "b", "c"], 0);
        let state = reduce(&state, QueueAction::Advance).unwrap();
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn advance_on_empty_is_noop() {
        let state = QueueState::default();
        assert_eq!(reduce(&state, QueueAction::Advance).unwrap(), state);
        assert_eq!(reduce(&state, QueueAction::Retreat).unwrap(), state);
    }

    #[test]
    fn retreat_wraps_only_with_repeat_all() {
        let state = queue(&["a", "b", "c"], 0);
        assert_eq!(reduce(&state, QueueAction::Retreat).unwrap().current_index(), Some(0));

        let state = with_repeat(&state, RepeatMode::All);
        assert_eq!(reduce(&state, QueueAction::Retreat).unwrap().current_index(), Some(2));

        let state = queue(&["a", "b", "c"], 2);
        assert_eq!(reduce(&state, QueueAction::Retreat).unwrap().current_index(), Some(1));
    }

    // ===== Shuffle =====

    #[test]
    fn shuffle_keeps_current_and_history() {
        let names: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let state = queue(&refs, 5);
        let before = titles(&state)[..6].to_vec();

        let shuffled = reduce(&state, QueueAction::SetShuffle { enabled: true, seed: 3 }).unwrap();

        assert!(shuffled.is_shuffled());
        assert_eq!(shuffled.current_index(), Some(5));
        assert_eq!(titles(&shuffled)[..6].to_vec(), before);
        assert_eq!(shuffled.len(), 20);
    }

    #[test]
    fn unshuffle_restores_order_and_current_entry() {
        let names: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let state = queue(&refs, 0);

        let state = reduce(&state, QueueAction::SetShuffle { enabled: true, seed: 11 }).unwrap();
        let state = reduce(&state, QueueAction::SetCurrentIndex(4)).unwrap();
        let playing = current_title(&state).map(str::to_owned);

        let state = reduce(&state, QueueAction::SetShuffle { enabled: false, seed: 0 }).unwrap();

        assert!(!state.is_shuffled());
        assert_eq!(titles(&state), refs);
        assert_eq!(current_title(&state).map(str::to_owned), playing);
    }

    #[test]
    fn entries_added_while_shuffled_survive_unshuffle() {
        let state = queue(&["a", "b", "c"], 0);
        let state = reduce(&state, QueueAction::SetShuffle { enabled: true, seed: 5 }).unwrap();
        let state = reduce(&state, QueueAction::AppendMany(entries(&["d", "e"]))).unwrap();
        let b = state.entries().iter().find(|e| e.track.title == "b").unwrap().id.clone();
        let state = reduce(&state, QueueAction::Remove(b)).unwrap();

        let state = reduce(&state, QueueAction::SetShuffle { enabled: false, seed: 0 }).unwrap();

        assert_eq!(titles(&state), vec!["a", "c", "d", "e"]);
        assert_eq!(current_title(&state), Some("a"));
    }

    #[test]
    fn shuffle_twice_is_noop() {
        let state = queue(&["a", "b", "c", "d"], 0);
        let once = reduce(&state, QueueAction::SetShuffle { enabled: true, seed: 1 }).unwrap();
        let twice = reduce(&once, QueueAction::SetShuffle { enabled: true, seed: 2 }).unwrap();
        assert_eq!(once, twice);
    }

    // ===== Helpers =====

    #[test]
    fn display_helpers() {
        let state = queue(&["a", "b", "c"], 1);
        let state = reduce(&state, QueueAction::SetDuration(200.0)).unwrap();
        let state = reduce(&state, QueueAction::SetCurrentTime(50.0)).unwrap();

        assert_eq!(state.total_duration(), 300.0);
        assert!(state.has_previous());
        assert!(state.has_next());
        assert_eq!(state.position_label(), "2 / 3");
        assert_eq!(state.progress(), 0.25);
        assert_eq!(state.upcoming().len(), 1);

        let empty = QueueState::default();
        assert!(!empty.has_previous());
        assert!(!empty.has_next());
        assert_eq!(empty.position_label(), "0 / 0");
        assert_eq!(empty.progress(), 0.0);
        assert!(empty.upcoming().is_empty());
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(61.0), "1:01");
        assert_eq!(format_clock(3725.0), "62:05");
        assert_eq!(format_clock(-5.0), "0:00");
    }

    // ===== Store =====

    #[test]
    fn store_publishes_once_per_batch() {
        let mut store = QueueStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store
            .dispatch_all([
                QueueAction::AppendMany(entries(&["a", "b", "c"])),
                QueueAction::SetCurrentIndex(2),
            ])
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.current_index(), Some(2));
    }

    #[test]
    fn store_rejects_whole_batch_on_error() {
        let mut store = QueueStore::default();
        store.dispatch(QueueAction::AppendMany(entries(&["a"]))).unwrap();
        let before = store.state().clone();

        let result = store.dispatch_all([
            QueueAction::SetVolume(0.1),
            QueueAction::SetCurrentIndex(9),
        ]);

        assert!(result.is_err());
        assert_eq!(store.state(), &before);
    }
}
