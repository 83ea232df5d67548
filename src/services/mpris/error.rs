use super::{PlayerCommand, PlayerId};

/// Errors that can occur during media operations
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// Failed to initialize the media service
    #[error("Failed to initialize media service: {0}")]
    InitializationFailed(String),

    /// Could not attach to a player's property notifications
    #[error("Failed to subscribe to player {player}: {details}")]
    SubscriptionFailed {
        /// Player that could not be subscribed
        player: PlayerId,
        /// Transport error details
        details: String,
    },

    /// A player rejected or failed a control request
    #[error("Player {player} failed {command}: {details}")]
    ControlFailed {
        /// Player the command was sent to
        player: PlayerId,
        /// Command that failed
        command: PlayerCommand,
        /// Transport error details
        details: String,
    },

    /// The controller has been torn down and accepts no more requests
    #[error("Media service has stopped")]
    ServiceStopped,
}
