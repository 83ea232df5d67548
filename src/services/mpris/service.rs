use futures::Stream;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, warn};
use zbus::Connection;

use crate::config::MediaConfig;
use crate::services::common::Property;

use super::{
    Controller, ControllerEvent, MediaError, PlayerBus, PlayerCommand, PlayerFilter, StatusChange,
    StatusSink,
    dbus::{BusWatcher, ZbusPlayerBus},
};

/// Now-playing service for the MPRIS players on the session bus.
///
/// Owns the event queue and the single task that drives the [`Controller`].
/// Bus signals, subscription results and owner commands all go through that
/// queue, so they are handled strictly one after another.
pub struct MprisService {
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    now_playing: Property<StatusChange>,
    watcher_handle: Option<JoinHandle<()>>,
    controller_handle: Option<JoinHandle<()>>,
}

impl MprisService {
    /// Connect to the session bus and start tracking players.
    ///
    /// `sink` receives every consolidated status change, in order, from the
    /// controller task.
    ///
    /// # Errors
    /// Returns `MediaError::InitializationFailed` if the session bus is
    /// unreachable or player discovery cannot be set up
    #[instrument(skip_all)]
    pub async fn start<S>(config: &MediaConfig, sink: S) -> Result<Self, MediaError>
    where
        S: StatusSink + Send + 'static,
    {
        info!("Starting MPRIS now-playing service");

        let connection = Connection::session().await.map_err(|e| {
            MediaError::InitializationFailed(format!("D-Bus connection failed: {e}"))
        })?;

        Self::start_on(connection, config.player_filter(), sink).await
    }

    /// Start tracking players on an existing connection.
    ///
    /// # Errors
    /// Returns `MediaError::InitializationFailed` if player discovery cannot
    /// be set up
    pub async fn start_on<S>(
        connection: Connection,
        filter: PlayerFilter,
        mut sink: S,
    ) -> Result<Self, MediaError>
    where
        S: StatusSink + Send + 'static,
    {
        let watcher = BusWatcher::connect(&connection, filter.clone()).await?;
        let existing = watcher.current_players().to_vec();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let now_playing = Property::new(StatusChange::idle());

        let published = now_playing.clone();
        let forward = move |change: StatusChange| {
            published.set(change.clone());
            sink.status_changed(change);
        };

        let bus = ZbusPlayerBus::new(connection, events_tx.clone());
        let mut controller = Controller::new(bus, forward, filter);

        let controller_handle = tokio::spawn(async move {
            controller.track_existing(existing);
            drive(controller, events_rx).await;
        });

        let watcher_handle = watcher.spawn(events_tx.clone());

        info!("MPRIS now-playing service started");

        Ok(Self {
            events_tx,
            now_playing,
            watcher_handle: Some(watcher_handle),
            controller_handle: Some(controller_handle),
        })
    }

    /// Toggle play/pause on the active player.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` after shutdown
    pub fn play_pause(&self) -> Result<(), MediaError> {
        self.request(PlayerCommand::PlayPause)
    }

    /// Skip to the next track on the active player.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` after shutdown
    pub fn next(&self) -> Result<(), MediaError> {
        self.request(PlayerCommand::Next)
    }

    /// Skip to the previous track on the active player.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` after shutdown
    pub fn previous(&self) -> Result<(), MediaError> {
        self.request(PlayerCommand::Previous)
    }

    /// Stop playback on the active player.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` after shutdown
    pub fn stop(&self) -> Result<(), MediaError> {
        self.request(PlayerCommand::Stop)
    }

    /// Queue a command for the active player.
    ///
    /// Delivery failures at the player are logged, never returned.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` after shutdown
    pub fn request(&self, command: PlayerCommand) -> Result<(), MediaError> {
        self.events_tx
            .send(ControllerEvent::Command(command))
            .map_err(|_| MediaError::ServiceStopped)
    }

    /// The latest status the controller surfaced.
    pub fn now_playing(&self) -> StatusChange {
        self.now_playing.get()
    }

    /// Follow the surfaced status.
    ///
    /// Yields the current status first. Unlike the sink, consecutive equal
    /// statuses are collapsed and a slow reader only sees the latest one.
    pub fn watch_now_playing(&self) -> impl Stream<Item = StatusChange> + Send + use<> {
        self.now_playing.watch()
    }

    /// Stop discovery, tear the controller down and wait for it to finish.
    #[instrument(skip_all)]
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.watcher_handle.take() {
            handle.abort();
        }

        let _ = self.events_tx.send(ControllerEvent::Shutdown);

        if let Some(handle) = self.controller_handle.take() {
            if let Err(e) = handle.await {
                warn!("Controller task ended abnormally: {e}");
            }
        }

        info!("MPRIS now-playing service stopped");
    }
}

impl Drop for MprisService {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher_handle.take() {
            handle.abort();
        }

        if self.controller_handle.take().is_some() {
            let _ = self.events_tx.send(ControllerEvent::Shutdown);
        }
    }
}

async fn drive<B, S>(
    mut controller: Controller<B, S>,
    mut events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
) where
    B: PlayerBus,
    S: StatusSink,
{
    while let Some(event) = events_rx.recv().await {
        let stop = matches!(event, ControllerEvent::Shutdown);
        controller.handle(event);

        if stop {
            break;
        }
    }

    controller.shutdown();
    debug!("Controller task finished");
}
