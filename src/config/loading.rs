use std::{fs, io::ErrorKind, path::Path};

use tracing::debug;

use super::{Config, ConfigError, ConfigPaths};

impl Config {
    /// Load the configuration from the default location.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated, or if the configuration directory cannot be determined
    pub fn load() -> Result<Config, ConfigError> {
        let path = ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    /// Load the configuration from `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(ConfigError::io(e, path)),
        };

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::toml_parse(e, Some(path)))?;
        config.validate()?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or validated
    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check on its own.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidField` for the first unusable field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.media.bus_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "media.bus_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
