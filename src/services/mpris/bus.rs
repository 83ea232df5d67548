use std::fmt;

use super::{PlayerCommand, PlayerId};

/// Generation token handed out each time a player is subscribed.
///
/// Completions carry the epoch they were started with. The controller drops
/// any completion whose epoch no longer matches the tracked player, which
/// covers players that vanished, reappeared, or outlived a teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

impl Epoch {
    /// The first epoch a controller hands out
    pub const FIRST: Self = Self(1);

    /// The epoch after this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport seam between the controller and the players on the bus.
///
/// Both operations return immediately. Their outcomes come back later as
/// [`ControllerEvent`](super::ControllerEvent)s on the controller's queue:
/// a subscription reports `PlayerSubscribed` once (initial state or failure)
/// followed by `PropertiesChanged` for every change, and a command reports
/// `CommandFinished`.
pub trait PlayerBus {
    /// Live subscription. Dropping it releases the subscription.
    type Subscription;

    /// Start watching a player's properties and pull its current state.
    fn subscribe(&mut self, player_id: &PlayerId, epoch: Epoch) -> Self::Subscription;

    /// Send a control request to a player without waiting for it.
    fn send_command(&mut self, player_id: &PlayerId, command: PlayerCommand);
}
