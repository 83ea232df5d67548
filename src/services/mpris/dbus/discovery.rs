use async_stream::stream;
use futures::{Stream, StreamExt, stream::BoxStream};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, instrument};
use zbus::{
    Connection,
    fdo::{DBusProxy, NameOwnerChanged},
};

use crate::services::mpris::{ControllerEvent, MediaError, PlayerFilter, PlayerId};

/// A relevant bus name registering or unregistering
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EndpointChange {
    Appeared(PlayerId),
    Disappeared(PlayerId),
}

impl From<EndpointChange> for ControllerEvent {
    fn from(change: EndpointChange) -> Self {
        match change {
            EndpointChange::Appeared(player_id) => Self::PlayerAppeared(player_id),
            EndpointChange::Disappeared(player_id) => Self::PlayerVanished(player_id),
        }
    }
}

/// Watches the session bus for MPRIS players coming and going.
pub(crate) struct BusWatcher {
    changes: BoxStream<'static, EndpointChange>,
    current: Vec<PlayerId>,
}

impl BusWatcher {
    /// Subscribe to name changes, then snapshot the names already on the bus.
    ///
    /// Subscribing first means a player registering in between is reported
    /// twice at worst, which the controller absorbs.
    ///
    /// # Errors
    /// Returns error if the bus proxy, the signal subscription or the name
    /// listing fails
    #[instrument(skip_all)]
    pub async fn connect(connection: &Connection, filter: PlayerFilter) -> Result<Self, MediaError> {
        let dbus_proxy = DBusProxy::new(connection)
            .await
            .map_err(|e| MediaError::InitializationFailed(format!("DBus proxy failed: {e}")))?;

        let name_changes = dbus_proxy.receive_name_owner_changed().await.map_err(|e| {
            MediaError::InitializationFailed(format!("Signal subscription failed: {e}"))
        })?;

        let names = dbus_proxy
            .list_names()
            .await
            .map_err(|e| MediaError::DbusError(e.into()))?;

        let current = names
            .iter()
            .map(|name| name.as_str())
            .filter(|name| filter.accepts(name))
            .map(PlayerId::from_bus_name)
            .collect::<Vec<_>>();

        debug!(players = current.len(), "Found existing MPRIS players");

        Ok(Self {
            changes: endpoint_changes(name_changes, filter).boxed(),
            current,
        })
    }

    /// Players that were registered when the watcher connected
    pub fn current_players(&self) -> &[PlayerId] {
        &self.current
    }

    /// Forward every later change onto the controller's queue.
    ///
    /// The task ends when the signal stream or the queue closes.
    pub fn spawn(self, events_tx: mpsc::UnboundedSender<ControllerEvent>) -> JoinHandle<()> {
        let mut changes = self.changes;

        tokio::spawn(async move {
            while let Some(change) = changes.next().await {
                debug!(?change, "Bus name changed");
                if events_tx.send(change.into()).is_err() {
                    break;
                }
            }

            debug!("Name monitoring ended");
        })
    }
}

fn endpoint_changes<S>(
    mut name_changes: S,
    filter: PlayerFilter,
) -> impl Stream<Item = EndpointChange> + Send
where
    S: Stream<Item = NameOwnerChanged> + Send + Unpin + 'static,
{
    stream! {
        while let Some(signal) = name_changes.next().await {
            let Ok(args) = signal.args() else { continue };

            let change = classify(
                args.name().as_str(),
                args.old_owner().is_some(),
                args.new_owner().is_some(),
                &filter,
            );

            if let Some(change) = change {
                yield change;
            }
        }
    }
}

/// Turn one `NameOwnerChanged` signal into an endpoint change.
///
/// Names the filter rejects and owner hand-overs between two live
/// connections produce nothing.
fn classify(
    name: &str,
    had_owner: bool,
    has_owner: bool,
    filter: &PlayerFilter,
) -> Option<EndpointChange> {
    if !filter.accepts(name) {
        return None;
    }

    let player_id = PlayerId::from_bus_name(name);
    match (had_owner, has_owner) {
        (false, true) => Some(EndpointChange::Appeared(player_id)),
        (true, false) => Some(EndpointChange::Disappeared(player_id)),
        _ => None,
    }
}
