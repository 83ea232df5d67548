use std::{env, fs, path::PathBuf};

use super::ConfigError;

const APP_DIR: &str = "nowplaying";

/// Utility struct for managing configuration and state paths
///
/// Provides methods to locate directories and files following
/// the XDG Base Directory specification
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the configuration directory path for the application
    ///
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "nowplaying" to the base config directory
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` environment variables are set
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        base_dir("XDG_CONFIG_HOME", ".config", "config").map(|dir| dir.join(APP_DIR))
    }

    /// Returns the path to the main configuration file
    ///
    /// # Errors
    /// Returns an error if the configuration directory cannot be determined
    pub fn main_config() -> Result<PathBuf, ConfigError> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the application log directory
    ///
    /// Lives under `XDG_STATE_HOME`, falling back to `$HOME/.local/state`.
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if the base directory is unknown or the directory cannot be created
    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        let log_dir = base_dir("XDG_STATE_HOME", ".local/state", "state")?
            .join(APP_DIR)
            .join("logs");

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).map_err(|e| ConfigError::io(e, &log_dir))?;
        }

        Ok(log_dir)
    }
}

fn base_dir(
    xdg_var: &'static str,
    home_fallback: &str,
    kind: &'static str,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os(xdg_var).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(home_fallback))
        .ok_or(ConfigError::NoBaseDirectory { kind, xdg_var })
}
