//! Queue provenance
//!
//! Records how a track got into the play queue. Display and grouping only;
//! playback never branches on it.

use super::album::Album;
use super::playlist::Playlist;
use super::track::Track;
use serde::{Deserialize, Serialize};

/// Where a queued track came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Enqueued on its own
    Single { id: String, name: String },

    /// Enqueued as part of an album
    Album { id: String, name: String },

    /// Enqueued as part of a playlist
    Playlist { id: String, name: String },
}

/// Discriminant of [`Source`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Single,
    Album,
    Playlist,
}

impl Source {
    /// Default provenance for a lone track: the track's own id and title
    pub fn single(track: &Track) -> Self {
        Self::Single {
            id: track.id.to_string(),
            name: track.title.clone(),
        }
    }

    pub fn album(album: &Album) -> Self {
        Self::Album {
            id: album.id.to_string(),
            name: album.title.clone(),
        }
    }

    pub fn playlist(playlist: &Playlist) -> Self {
        Self::Playlist {
            id: playlist.id.to_string(),
            name: playlist.name.clone(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Single { .. } => SourceKind::Single,
            Self::Album { .. } => SourceKind::Album,
            Self::Playlist { .. } => SourceKind::Playlist,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Single { id, .. } | Self::Album { id, .. } | Self::Playlist { id, .. } => id,
        }
    }

    /// Display name of the originating track, album or playlist
    pub fn name(&self) -> &str {
        match self {
            Self::Single { name, .. } | Self::Album { name, .. } | Self::Playlist { name, .. } => {
                name
            }
        }
    }
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Album => "album",
            Self::Playlist => "playlist",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
