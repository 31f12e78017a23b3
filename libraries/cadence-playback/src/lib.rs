//! Cadence - Playback
//!
//! The play queue of a Cadence session and the engine that keeps one audio
//! output in step with it.
//!
//! This crate provides:
//! - A pure queue reducer ([`reduce`]) over named transitions ([`QueueAction`])
//! - Repeat modes (none, one, all) and shuffle by reordering upcoming entries
//! - A playback engine task that owns the single [`AudioOutput`]
//! - A cloneable control handle ([`Player`]) for UI callers
//! - A clock-driven [`SimulatedOutput`] for headless use and tests
//!
//! # Architecture
//!
//! ```text
//! Player ──requests──▶ PlaybackEngine ──load/play/pause/seek──▶ AudioOutput
//!    ▲                   │      ▲                                   │
//!    │ watch<QueueState> │      └──────── OutputEvent (mpsc) ───────┘
//!    └───────────────────┘
//! ```
//!
//! The engine task is the only writer of the queue state. UI code renders from
//! [`Player::state`] / [`Player::subscribe_state`] and reacts to
//! [`PlaybackEvent`]s; it never touches the output.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{Album, Track};
//! use cadence_playback::{PlaybackConfig, PlaybackEngine, SimulatedOutput};
//! use std::time::Duration;
//!
//! # async fn demo() -> cadence_playback::Result<()> {
//! let (output, output_events) = SimulatedOutput::channel(Duration::from_millis(250));
//! let output = output.with_media("https://cdn.example/t1.mp3", 184.0);
//!
//! let (engine, player) = PlaybackEngine::new(PlaybackConfig::default(), output, output_events);
//! engine.spawn();
//!
//! let track = Track::new("t1", "Intro", "The Band", "https://cdn.example/t1.mp3")
//!     .with_duration(184.0);
//! player.add_album(&Album::new("a1", "Debut", "The Band", vec![track])).await?;
//! player.play_from_index(0).await?;
//!
//! let state = player.state();
//! assert_eq!(state.current_index(), Some(0));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod events;
pub mod output;
pub mod player;
pub mod shuffle;
pub mod simulated;
pub mod store;
pub mod types;
pub mod volume;

pub use config::PlaybackConfig;
pub use engine::PlaybackEngine;
pub use entry::{EntryFactory, EntryId, QueueEntry};
pub use error::{OutputError, PlaybackError, QueueError, Result};
pub use events::PlaybackEvent;
pub use output::{AudioOutput, LoadId, OutputEvent, OutputEventKind, OutputEvents, PlayFuture};
pub use player::Player;
pub use simulated::SimulatedOutput;
pub use store::{format_clock, reduce, QueueAction, QueueState, QueueStore};
pub use types::{PlaybackStatus, RepeatMode};
