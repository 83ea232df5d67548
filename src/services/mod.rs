/// Shared building blocks for services
pub mod common;
/// MPRIS now-playing service
pub mod mpris;

pub use mpris::{MediaError, MprisService, PlaybackState, PlayerCommand, PlayerId, StatusChange, Track};
