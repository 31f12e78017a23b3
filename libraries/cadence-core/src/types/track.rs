//! Track types

use super::ids::TrackId;
use serde::{Deserialize, Serialize};

/// A playable catalog track
///
/// Once enqueued, a copy of the track is embedded in the queue entry; later
/// catalog edits never reach the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Duration in seconds, never negative
    #[serde(default)]
    pub duration: f64,

    /// Opaque playable-media locator
    #[serde(rename = "mp3Url")]
    pub media_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_explicit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
}

impl Track {
    /// Create a track with the required fields and no metadata
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration: 0.0,
            media_url: media_url.into(),
            cover_art: None,
            genre: None,
            is_explicit: None,
            track_number: None,
        }
    }

    /// Set the duration (seconds). Negative or non-finite input becomes 0.
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    #[must_use]
    pub fn with_cover_art(mut self, cover_art: impl Into<String>) -> Self {
        self.cover_art = Some(cover_art.into());
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    #[must_use]
    pub fn with_explicit(mut self, is_explicit: bool) -> Self {
        self.is_explicit = Some(is_explicit);
        self
    }

    #[must_use]
    pub fn with_track_number(mut self, number: u32) -> Self {
        self.track_number = Some(number);
        self
    }
}
