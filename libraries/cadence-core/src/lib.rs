//! Cadence Core
//!
//! Catalog value types shared by every Cadence component.
//!
//! Tracks, albums and playlists arrive fully formed from the catalog
//! collaborators (REST endpoints, fixtures, ...). The playback queue only ever
//! embeds copies of them, so everything here is plain data with serde support
//! in the catalog's wire shape.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Album, Source, Track};
//!
//! let track = Track::new("t1", "Intro", "The Band", "https://cdn.example/t1.mp3")
//!     .with_duration(184.0);
//!
//! let album = Album::new("a1", "Debut", "The Band", vec![track.clone()]);
//! assert_eq!(album.track_count(), 1);
//!
//! // Lone tracks default to a "single" provenance named after the track
//! let source = Source::single(&track);
//! assert_eq!(source.name(), "Intro");
//! ```

#![forbid(unsafe_code)]

pub mod types;

pub use types::{Album, AlbumId, Playlist, PlaylistId, Source, SourceKind, Track, TrackId, UserId};
