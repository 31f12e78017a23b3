//! Playback configuration
//!
//! Settings come from an optional `cadence.toml` and `CADENCE_`-prefixed
//! environment variables, environment winning.

use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use crate::volume;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, read from the working directory if present
pub const CONFIG_FILE: &str = "cadence.toml";

/// Environment variable prefix (`CADENCE_INITIAL_VOLUME=0.5`)
pub const ENV_PREFIX: &str = "CADENCE";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Volume of a fresh session, in [0, 1]
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    #[serde(default)]
    pub repeat: RepeatMode,

    /// Capacity of the control request channel
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Capacity of the playback event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Fixed shuffle seed; random per session when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: default_initial_volume(),
            repeat: RepeatMode::default(),
            command_buffer: default_command_buffer(),
            event_buffer: default_event_buffer(),
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from `cadence.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from the given file (if it exists) and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        // Environment overrides the file
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(settings)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));

        Self::finish(settings)
    }

    fn finish(settings: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()
    }

    /// Validate configuration, normalizing the volume into range
    pub fn validate(mut self) -> Result<Self> {
        if self.command_buffer == 0 {
            return Err(PlaybackError::Config(
                "command_buffer must be at least 1".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(PlaybackError::Config(
                "event_buffer must be at least 1".to_string(),
            ));
        }

        self.initial_volume = volume::clamp(self.initial_volume);
        Ok(self)
    }
}

// Default values
fn default_initial_volume() -> f32 {
    1.0
}

fn default_command_buffer() -> usize {
    32
}

fn default_event_buffer() -> usize {
    64
}
