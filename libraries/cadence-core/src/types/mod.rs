mod album;
mod ids;
mod playlist;
mod source;
mod track;

pub use album::Album;
pub use ids::{AlbumId, PlaylistId, TrackId, UserId};
pub use playlist::Playlist;
pub use source::{Source, SourceKind};
pub use track::Track;

/// Sum of track durations in seconds
pub(crate) fn total_duration(tracks: &[Track]) -> f64 {
    tracks.iter().map(|t| t.duration).sum()
}
