mod log_format;
mod log_level;

pub use log_format::LogFormat;
pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General configuration settings.
///
/// Contains settings that affect the whole process, such as logging.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: LogLevel,

    /// Format of the console and file log output.
    pub log_format: LogFormat,

    /// Also write logs to a daily rotating file in the log directory.
    pub log_to_file: bool,
}
