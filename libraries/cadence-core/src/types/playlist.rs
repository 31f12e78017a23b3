//! Playlist types

use super::ids::{PlaylistId, UserId};
use super::track::Track;
use serde::{Deserialize, Serialize};

/// A user playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub created_by: UserId,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(
        id: impl Into<PlaylistId>,
        name: impl Into<String>,
        created_by: impl Into<UserId>,
        tracks: Vec<Track>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            cover_art: None,
            is_public: false,
            created_by: created_by.into(),
            tracks,
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total running time in seconds
    pub fn total_duration(&self) -> f64 {
        super::total_duration(&self.tracks)
    }
}
