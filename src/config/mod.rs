mod error;
mod general;
mod loading;
mod media;
mod paths;


pub use error::ConfigError;
pub use general::{GeneralConfig, LogFormat, LogLevel};
pub use media::MediaConfig;
pub use paths::ConfigPaths;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// Contains the process-wide settings and the media service settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General application settings.
    pub general: GeneralConfig,

    /// Player discovery settings.
    pub media: MediaConfig,
}
