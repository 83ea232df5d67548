//! Player tracking and active-player selection.
//!
//! The [`Controller`] owns every tracked player and the recency stack that
//! decides which one is surfaced. It is a plain state machine: each
//! [`ControllerEvent`] is handled to completion before the next one, so
//! nothing in here needs a lock. Anything slow (subscribing, pulling state,
//! sending commands) goes through the [`PlayerBus`] and comes back later as
//! another event.

mod events;
mod stack;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use tracing::{debug, warn};

pub use events::{ControllerEvent, PlayerSnapshot, PropertyDelta, StatusChange, StatusSink};
pub use stack::ActiveStack;

use super::{
    Epoch, MediaError, PlaybackState, PlayerBus, PlayerCommand, PlayerFilter, PlayerId,
    RawMetadata, Track,
};

/// A tracked player and its latest reported state.
struct Publisher<S> {
    state: PlaybackState,
    metadata: RawMetadata,
    epoch: Epoch,
    _subscription: S,
}

/// Tracks media players and surfaces the most recently active one.
pub struct Controller<B: PlayerBus, S: StatusSink> {
    bus: B,
    sink: S,
    filter: PlayerFilter,
    players: HashMap<PlayerId, Publisher<B::Subscription>>,
    stack: ActiveStack,
    next_epoch: Epoch,
    alive: bool,
}

impl<B: PlayerBus, S: StatusSink> Controller<B, S> {
    /// Create a controller with no tracked players.
    pub fn new(bus: B, sink: S, filter: PlayerFilter) -> Self {
        Self {
            bus,
            sink,
            filter,
            players: HashMap::new(),
            stack: ActiveStack::new(),
            next_epoch: Epoch::FIRST,
            alive: true,
        }
    }

    /// Start tracking every relevant name from a start-up snapshot of the bus.
    pub fn track_existing<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = PlayerId>,
    {
        for player_id in names {
            self.player_appeared(player_id);
        }
    }

    /// Handle one event to completion.
    pub fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::PlayerAppeared(player_id) => self.player_appeared(player_id),
            ControllerEvent::PlayerVanished(player_id) => self.player_vanished(&player_id),
            ControllerEvent::PlayerSubscribed {
                player_id,
                epoch,
                result,
            } => self.player_subscribed(player_id, epoch, result),
            ControllerEvent::PropertiesChanged {
                player_id,
                epoch,
                delta,
            } => self.properties_changed(player_id, epoch, delta),
            ControllerEvent::Command(command) => self.send_command(command),
            ControllerEvent::CommandFinished {
                player_id,
                command,
                result,
            } => self.command_finished(&player_id, command, result),
            ControllerEvent::Shutdown => self.shutdown(),
        }
    }

    /// Begin tracking a player that registered on the bus.
    ///
    /// Irrelevant names and players already tracked are ignored.
    pub fn player_appeared(&mut self, player_id: PlayerId) {
        if !self.alive || !self.filter.accepts(player_id.bus_name()) {
            return;
        }

        if self.players.contains_key(&player_id) {
            debug!(player = %player_id, "Player already tracked");
            return;
        }

        let epoch = self.next_epoch;
        self.next_epoch = epoch.next();

        let subscription = self.bus.subscribe(&player_id, epoch);
        self.players.insert(
            player_id.clone(),
            Publisher {
                state: PlaybackState::Stopped,
                metadata: RawMetadata::default(),
                epoch,
                _subscription: subscription,
            },
        );

        debug!(player = %player_id, %epoch, "Player tracked");
    }

    /// Stop tracking a player that left the bus.
    pub fn player_vanished(&mut self, player_id: &PlayerId) {
        if !self.alive {
            return;
        }

        self.remove_player(player_id);
    }

    /// Toggle play/pause on the active player.
    pub fn toggle_play_pause(&mut self) {
        self.send_command(PlayerCommand::PlayPause);
    }

    /// Skip to the next track on the active player.
    pub fn skip_next(&mut self) {
        self.send_command(PlayerCommand::Next);
    }

    /// Skip to the previous track on the active player.
    pub fn skip_previous(&mut self) {
        self.send_command(PlayerCommand::Previous);
    }

    /// Stop playback on the active player.
    pub fn stop(&mut self) {
        self.send_command(PlayerCommand::Stop);
    }

    /// Forward a command to the active player. No-op when none is active.
    pub fn send_command(&mut self, command: PlayerCommand) {
        if !self.alive {
            return;
        }

        let Some(player_id) = self.stack.head().cloned() else {
            debug!(%command, "No active player, ignoring command");
            return;
        };

        debug!(player = %player_id, %command, "Forwarding command");
        self.bus.send_command(&player_id, command);
    }

    /// Release every subscription and forget all players.
    ///
    /// Emits nothing. Every event handled afterwards is a no-op.
    pub fn shutdown(&mut self) {
        if !self.alive {
            return;
        }

        self.alive = false;
        self.stack.clear();
        self.players.clear();
        debug!("Controller torn down");
    }

    /// The surfaced player, if any
    pub fn active_player(&self) -> Option<&PlayerId> {
        self.stack.head()
    }

    /// Players ordered from most to least recently active
    pub fn active_stack(&self) -> &[PlayerId] {
        self.stack.as_slice()
    }

    /// Whether the player is currently tracked
    pub fn is_tracking(&self, player_id: &PlayerId) -> bool {
        self.players.contains_key(player_id)
    }

    /// Every tracked player, in no particular order
    pub fn tracked_players(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }

    /// Whether the controller is still accepting events
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// The status the owner would currently see
    pub fn current_status(&self) -> StatusChange {
        self.stack
            .head()
            .and_then(|player_id| self.status_of(player_id))
            .unwrap_or_else(StatusChange::idle)
    }

    fn player_subscribed(
        &mut self,
        player_id: PlayerId,
        epoch: Epoch,
        result: Result<PlayerSnapshot, MediaError>,
    ) {
        if !self.is_current(&player_id, epoch) {
            debug!(player = %player_id, %epoch, "Dropping stale subscription result");
            return;
        }

        match result {
            Ok(snapshot) => {
                let delta = PropertyDelta {
                    state: Some(snapshot.state),
                    metadata: Some(snapshot.metadata),
                };
                self.apply_change(player_id, delta);
            }
            Err(e) => {
                warn!(player = %player_id, error = %e, "Dropping player after failed subscription");
                self.remove_player(&player_id);
            }
        }
    }

    fn properties_changed(&mut self, player_id: PlayerId, epoch: Epoch, delta: PropertyDelta) {
        if !self.is_current(&player_id, epoch) {
            return;
        }

        self.apply_change(player_id, delta);
    }

    fn apply_change(&mut self, player_id: PlayerId, delta: PropertyDelta) {
        let Some(publisher) = self.players.get_mut(&player_id) else {
            return;
        };

        if let Some(state) = delta.state {
            publisher.state = state;
        }
        if let Some(metadata) = delta.metadata {
            publisher.metadata = metadata;
        }

        self.stack.touch(&player_id);

        if !self.stack.is_head(&player_id) {
            return;
        }

        self.surface(&player_id);
    }

    fn command_finished(
        &mut self,
        player_id: &PlayerId,
        command: PlayerCommand,
        result: Result<(), MediaError>,
    ) {
        if !self.alive {
            return;
        }

        if let Err(e) = result {
            warn!(player = %player_id, %command, error = %e, "Player command failed");
        }
    }

    fn remove_player(&mut self, player_id: &PlayerId) {
        if self.players.remove(player_id).is_none() {
            return;
        }

        let was_head = self.stack.is_head(player_id);
        self.stack.remove(player_id);
        debug!(player = %player_id, "Player untracked");

        if !was_head {
            return;
        }

        match self.stack.head().cloned() {
            Some(next) => self.surface(&next),
            None => self.sink.status_changed(StatusChange::idle()),
        }
    }

    fn surface(&mut self, player_id: &PlayerId) {
        if let Some(status) = self.status_of(player_id) {
            self.sink.status_changed(status);
        }
    }

    fn status_of(&self, player_id: &PlayerId) -> Option<StatusChange> {
        let publisher = self.players.get(player_id)?;
        Some(StatusChange::active(
            player_id.clone(),
            publisher.state,
            Track::normalize(&publisher.metadata),
        ))
    }

    fn is_current(&self, player_id: &PlayerId, epoch: Epoch) -> bool {
        self.alive
            && self
                .players
                .get(player_id)
                .is_some_and(|publisher| publisher.epoch == epoch)
    }
}
