/// Player bus seam and subscription epochs
pub mod bus;
/// Player tracking and active-player selection
pub mod controller;
/// D-Bus implementation of discovery and the player bus
pub mod dbus;
/// Media player error types
pub mod error;
/// Track metadata types and normalization
pub mod metadata;
/// D-Bus proxy trait definitions
pub mod proxy;
/// Session-bus now-playing service
pub mod service;
/// Player identifiers, states and commands
pub mod types;

pub use bus::*;
pub use controller::*;
pub use error::*;
pub use metadata::*;
pub use proxy::*;
pub use service::*;
pub use types::*;
