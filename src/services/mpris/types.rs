use std::fmt;

use serde::Serialize;

/// Bus name prefix shared by every MPRIS player.
pub const MPRIS_BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Unique identifier for a media player
///
/// Wraps the player's well-known D-Bus bus name. Stable for as long as the
/// name stays registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a PlayerId from a D-Bus bus name
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self(bus_name.to_string())
    }

    /// Get the D-Bus bus name
    pub fn bus_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current playback state of a media player
///
/// `Stopped` doubles as the state of a player that reported nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackState {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    #[default]
    Stopped,
}

impl From<&str> for PlaybackState {
    fn from(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

impl From<PlaybackState> for &'static str {
    fn from(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = (*self).into();
        f.write_str(label)
    }
}

/// Control request forwarded to the active player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Toggle between playing and paused
    PlayPause,

    /// Skip to the next track
    Next,

    /// Skip to the previous track
    Previous,

    /// Stop playback
    Stop,
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlayPause => "PlayPause",
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::Stop => "Stop",
        };
        f.write_str(name)
    }
}

/// Decides which bus names are media players worth tracking.
///
/// A name is relevant when it starts with the configured prefix and contains
/// none of the ignore patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFilter {
    prefix: String,
    ignored_patterns: Vec<String>,
}

impl PlayerFilter {
    /// Create a filter from a bus name prefix and a list of ignore patterns
    pub fn new(prefix: impl Into<String>, ignored_patterns: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ignored_patterns,
        }
    }

    /// Check whether a bus name belongs to a player that should be tracked
    pub fn accepts(&self, bus_name: &str) -> bool {
        bus_name.starts_with(&self.prefix) && !self.is_ignored(bus_name)
    }

    fn is_ignored(&self, bus_name: &str) -> bool {
        self.ignored_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && bus_name.contains(pattern.as_str()))
    }
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self::new(MPRIS_BUS_PREFIX, Vec::new())
    }
}
