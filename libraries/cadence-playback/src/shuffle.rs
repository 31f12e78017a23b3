//! Shuffle ordering for the play queue
//!
//! Shuffling physically reorders the entries that have not been reached yet
//! (Fisher-Yates over a seeded RNG, so a given seed always yields the same
//! order). The unshuffled order is kept as a list of entry ids and restored
//! when shuffle is switched off.

use crate::entry::{EntryId, QueueEntry};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

/// Shuffle `entries[start..]` in place
///
/// Entries before `start` (current and already played) keep their positions.
pub fn shuffle_from(entries: &mut [QueueEntry], start: usize, seed: u64) {
    if start >= entries.len() {
        return;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    entries[start..].shuffle(&mut rng);
}

/// Reorder `entries` to follow `order`
///
/// Entries missing from `order` go last, keeping their relative order.
pub fn restore_order(entries: &mut [QueueEntry], order: &[EntryId]) {
    let rank: HashMap<&EntryId, usize> = order.iter().enumerate().map(|(i, id)| (id, i)).collect();

    // Stable sort keeps unknown entries in their current relative order
    entries.sort_by_key(|entry| rank.get(&entry.id).copied().unwrap_or(usize::MAX));
}

/// Merge the unshuffled order with a replacement entry list
///
/// Ids that survived the replacement keep their place; new ids are appended
/// in the order they appear in `entries`.
pub fn merge_order(order: &[EntryId], entries: &[QueueEntry]) -> Vec<EntryId> {
    let present: HashSet<&EntryId> = entries.iter().map(|e| &e.id).collect();
    let mut merged: Vec<EntryId> = order
        .iter()
        .filter(|id| present.contains(id))
        .cloned()
        .collect();

    let known: HashSet<&EntryId> = order.iter().collect();
    merged.extend(
        entries
            .iter()
            .filter(|e| !known.contains(&e.id))
            .map(|e| e.id.clone()),
    );
    merged
}
