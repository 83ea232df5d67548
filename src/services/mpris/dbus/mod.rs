//! D-Bus transport for the now-playing engine.

mod conversion;
mod discovery;
mod player_bus;

pub(crate) use discovery::BusWatcher;
pub use player_bus::PlayerSubscription;
pub(crate) use player_bus::ZbusPlayerBus;
