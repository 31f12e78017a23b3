//! Album types

use super::ids::AlbumId;
use super::track::Track;
use serde::{Deserialize, Serialize};

/// An album with its tracks in album order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Album {
    pub fn new(
        id: impl Into<AlbumId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        tracks: Vec<Track>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            cover_art: None,
            genre: None,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_tracks() {
        let album = Album::new(
            "a1",
            "Debut",
            "The Band",
            vec![
                Track::new("t1", "One", "The Band", "/1.mp3").with_duration(120.0),
                Track::new("t2", "Two", "The Band", "/2.mp3").with_duration(90.5),
            ],
        );

        assert_eq!(album.track_count(), 2);
        assert_eq!(album.total_duration(), 210.5);
    }

    #[test]
    fn empty_album() {
        let album = Album::new("a1", "Nothing", "Nobody", vec![]);
        assert_eq!(album.track_count(), 0);
        assert_eq!(album.total_duration(), 0.0);
    }
}
