//! Queue entries
//!
//! An entry is one occurrence of a track in the queue. The same track can be
//! queued many times, so entries carry their own id, minted from the track id,
//! the insertion time and a per-factory sequence number.

use cadence_core::{Source, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Queue-unique entry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One queued track with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: EntryId,
    /// Copy of the catalog track taken at enqueue time
    pub track: Track,
    pub source: Source,
    pub added_at: DateTime<Utc>,
}

/// Mints queue entries with unique ids
#[derive(Debug, Default)]
pub struct EntryFactory {
    sequence: AtomicU64,
}

impl EntryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a track in a fresh entry
    pub fn create(&self, track: Track, source: Source) -> QueueEntry {
        let added_at = Utc::now();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = EntryId(format!(
            "{}-{}-{}",
            track.id,
            added_at.timestamp_millis(),
            sequence
        ));

        QueueEntry {
            id,
            track,
            source,
            added_at,
        }
    }

    /// Wrap a batch of tracks, preserving their order, under one source
    pub fn create_batch(&self, tracks: &[Track], source: &Source) -> Vec<QueueEntry> {
        tracks
            .iter()
            .map(|track| self.create(track.clone(), source.clone()))
            .collect()
    }
}
