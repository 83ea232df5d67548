//! Nowplaying - "now playing" tracking for MPRIS media players.
//!
//! Watches the session bus for media players, follows their playback state
//! and track metadata, and reduces them to a single consolidated status for
//! the most recently active player. Playback commands are forwarded to that
//! same player.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nowplaying::{
//!     config::Config,
//!     services::{MprisService, StatusChange},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let service = MprisService::start(&config.media, |change: StatusChange| {
//!     println!("{change:?}");
//! })
//! .await?;
//!
//! service.play_pause()?;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Services for system integration.
pub mod services;

/// Logging setup.
pub mod tracing_config;

pub use config::{Config, ConfigError};
pub use services::{MediaError, MprisService};
