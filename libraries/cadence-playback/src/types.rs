//! Core types for playback management

use serde::{Deserialize, Serialize};

/// Repeat mode
///
/// Governs how Advance and Retreat behave at the queue boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the queue
    #[default]
    #[serde(rename = "none")]
    Off,

    /// Loop the current track
    One,

    /// Loop the entire queue
    All,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: none -> one -> all -> none
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::One,
            Self::One => Self::All,
            Self::All => Self::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "none",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport status as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing playing (no track, stopped, ended or failed)
    #[default]
    Stopped,

    /// Waiting for the output to start the current track
    Loading,

    /// Playing audio
    Playing,

    /// Paused mid-track
    Paused,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_cycles_through_all_modes() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::Off);
    }

    #[test]
    fn repeat_wire_names() {
        assert_eq!(serde_json::to_string(&RepeatMode::Off).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&RepeatMode::All).unwrap(), "\"all\"");

        let mode: RepeatMode = serde_json::from_str("\"one\"").unwrap();
        assert_eq!(mode, RepeatMode::One);
        assert_eq!(RepeatMode::default().to_string(), "none");
    }
}
