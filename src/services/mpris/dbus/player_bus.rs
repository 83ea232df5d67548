use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;
use zbus::{Connection, fdo::PropertiesProxy, proxy::CacheProperties};

use super::conversion::{MissingProperties, property_delta, raw_metadata};
use crate::services::mpris::{
    ControllerEvent, Epoch, MPRIS_OBJECT_PATH, MPRIS_PLAYER_INTERFACE, MediaError,
    MediaPlayer2PlayerProxy, PlaybackState, PlayerBus, PlayerCommand, PlayerId, PlayerSnapshot,
    RawMetadata,
};
use crate::unwrap_or_warn;

/// Property subscription for one player.
///
/// Dropping it stops the monitoring task; anything the task already queued
/// is discarded by the controller's epoch check.
#[derive(Debug)]
pub struct PlayerSubscription {
    task: JoinHandle<()>,
}

impl Drop for PlayerSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// [`PlayerBus`] backed by the D-Bus session connection.
///
/// Every operation runs in its own task and reports back through the
/// controller's event queue.
#[derive(Clone)]
pub(crate) struct ZbusPlayerBus {
    connection: Connection,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl ZbusPlayerBus {
    pub fn new(connection: Connection, events_tx: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self {
            connection,
            events_tx,
        }
    }
}

impl PlayerBus for ZbusPlayerBus {
    type Subscription = PlayerSubscription;

    fn subscribe(&mut self, player_id: &PlayerId, epoch: Epoch) -> Self::Subscription {
        let monitor = PlayerMonitor {
            connection: self.connection.clone(),
            events_tx: self.events_tx.clone(),
            player_id: player_id.clone(),
            epoch,
        };

        PlayerSubscription {
            task: tokio::spawn(monitor.run()),
        }
    }

    fn send_command(&mut self, player_id: &PlayerId, command: PlayerCommand) {
        let connection = self.connection.clone();
        let events_tx = self.events_tx.clone();
        let player_id = player_id.clone();

        tokio::spawn(async move {
            let result = dispatch(&connection, &player_id, command)
                .await
                .map_err(|e| MediaError::ControlFailed {
                    player: player_id.clone(),
                    command,
                    details: e.to_string(),
                });

            let _ = events_tx.send(ControllerEvent::CommandFinished {
                player_id,
                command,
                result,
            });
        });
    }
}

async fn player_proxy(
    connection: &Connection,
    player_id: &PlayerId,
) -> zbus::Result<MediaPlayer2PlayerProxy<'static>> {
    MediaPlayer2PlayerProxy::builder(connection)
        .destination(player_id.bus_name().to_string())?
        .cache_properties(CacheProperties::No)
        .build()
        .await
}

async fn dispatch(
    connection: &Connection,
    player_id: &PlayerId,
    command: PlayerCommand,
) -> zbus::Result<()> {
    let proxy = player_proxy(connection, player_id).await?;

    match command {
        PlayerCommand::PlayPause => proxy.play_pause().await,
        PlayerCommand::Next => proxy.next().await,
        PlayerCommand::Previous => proxy.previous().await,
        PlayerCommand::Stop => proxy.stop().await,
    }
}

struct PlayerMonitor {
    connection: Connection,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    player_id: PlayerId,
    epoch: Epoch,
}

impl PlayerMonitor {
    async fn run(self) {
        let (properties, player) = match self.proxies().await {
            Ok(proxies) => proxies,
            Err(e) => {
                self.report_failure(e);
                return;
            }
        };

        let mut changes = match properties.receive_properties_changed().await {
            Ok(changes) => changes,
            Err(e) => {
                self.report_failure(e);
                return;
            }
        };

        let snapshot = PlayerSnapshot {
            state: self.read_state(&player).await.unwrap_or_default(),
            metadata: self.read_metadata(&player).await.unwrap_or_default(),
        };
        if !self.report(Ok(snapshot)) {
            return;
        }

        while let Some(signal) = changes.next().await {
            let mut delta = {
                let Ok(args) = signal.args() else { continue };

                if args.interface_name().as_str() != MPRIS_PLAYER_INTERFACE {
                    continue;
                }

                property_delta(args.changed_properties())
            };

            let missing = MissingProperties::of(&delta);
            if missing.state {
                delta.state = self.read_state(&player).await;
            }
            if missing.metadata {
                delta.metadata = self.read_metadata(&player).await;
            }

            let event = ControllerEvent::PropertiesChanged {
                player_id: self.player_id.clone(),
                epoch: self.epoch,
                delta,
            };
            if self.events_tx.send(event).is_err() {
                return;
            }
        }

        debug!(player = %self.player_id, "Property updates stopped");
    }

    async fn proxies(
        &self,
    ) -> zbus::Result<(PropertiesProxy<'static>, MediaPlayer2PlayerProxy<'static>)> {
        let properties = PropertiesProxy::builder(&self.connection)
            .destination(self.player_id.bus_name().to_string())?
            .path(MPRIS_OBJECT_PATH)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        let player = player_proxy(&self.connection, &self.player_id).await?;

        Ok((properties, player))
    }

    async fn read_state(&self, player: &MediaPlayer2PlayerProxy<'_>) -> Option<PlaybackState> {
        unwrap_or_warn!(
            player
                .playback_status()
                .await
                .map(|status| Some(PlaybackState::from(status.as_str()))),
            self.player_id,
            None
        )
    }

    async fn read_metadata(&self, player: &MediaPlayer2PlayerProxy<'_>) -> Option<RawMetadata> {
        unwrap_or_warn!(
            player.metadata().await.map(|map| Some(raw_metadata(&map))),
            self.player_id,
            None
        )
    }

    fn report_failure(&self, error: zbus::Error) {
        self.report(Err(MediaError::SubscriptionFailed {
            player: self.player_id.clone(),
            details: error.to_string(),
        }));
    }

    fn report(&self, result: Result<PlayerSnapshot, MediaError>) -> bool {
        self.events_tx
            .send(ControllerEvent::PlayerSubscribed {
                player_id: self.player_id.clone(),
                epoch: self.epoch,
                result,
            })
            .is_ok()
    }
}
