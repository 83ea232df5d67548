use serde::Serialize;

use crate::services::mpris::{
    Epoch, MediaError, PlaybackState, PlayerCommand, PlayerId, RawMetadata, Track,
};

/// Full state pulled from a player when it is first subscribed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    /// Reported playback status
    pub state: PlaybackState,

    /// Reported metadata
    pub metadata: RawMetadata,
}

/// Properties a player announced as changed.
///
/// Fields the notification did not carry are `None` and keep their last
/// known value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDelta {
    /// New playback status, if it changed
    pub state: Option<PlaybackState>,

    /// New metadata, if it changed
    pub metadata: Option<RawMetadata>,
}

/// Everything the controller reacts to, in arrival order.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A bus name registered
    PlayerAppeared(PlayerId),

    /// A bus name unregistered
    PlayerVanished(PlayerId),

    /// A subscription finished its initial pull
    PlayerSubscribed {
        /// Subscribed player
        player_id: PlayerId,
        /// Epoch the subscription was started with
        epoch: Epoch,
        /// Initial state, or the transport error that ended the subscription
        result: Result<PlayerSnapshot, MediaError>,
    },

    /// A subscribed player reported property changes
    PropertiesChanged {
        /// Reporting player
        player_id: PlayerId,
        /// Epoch of the subscription that saw the change
        epoch: Epoch,
        /// Changed properties
        delta: PropertyDelta,
    },

    /// The owner asked for a command on the active player
    Command(PlayerCommand),

    /// A forwarded command completed
    CommandFinished {
        /// Player the command went to
        player_id: PlayerId,
        /// Command that was sent
        command: PlayerCommand,
        /// Outcome reported by the transport
        result: Result<(), MediaError>,
    },

    /// Tear the controller down
    Shutdown,
}

/// The one event the controller emits to its owner.
///
/// Describes the surfaced player, or nothing when no player is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Surfaced player, `None` when no player is active
    pub player: Option<PlayerId>,

    /// Playback state of the surfaced player
    pub state: PlaybackState,

    /// Track of the surfaced player
    pub track: Option<Track>,
}

impl StatusChange {
    /// Status for a surfaced player
    pub fn active(player: PlayerId, state: PlaybackState, track: Track) -> Self {
        Self {
            player: Some(player),
            state,
            track: Some(track),
        }
    }

    /// Status when no player is active
    pub fn idle() -> Self {
        Self {
            player: None,
            state: PlaybackState::Stopped,
            track: None,
        }
    }

    /// Whether this describes the absence of any player
    pub fn is_idle(&self) -> bool {
        self.player.is_none()
    }
}

impl Default for StatusChange {
    fn default() -> Self {
        Self::idle()
    }
}

/// Receiver of consolidated status changes.
pub trait StatusSink {
    /// Called once per externally visible transition.
    fn status_changed(&mut self, change: StatusChange);
}

impl<F> StatusSink for F
where
    F: FnMut(StatusChange),
{
    fn status_changed(&mut self, change: StatusChange) {
        self(change);
    }
}
