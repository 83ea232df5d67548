use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while locating, reading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Configuration field holds a value that cannot be used
    #[error("invalid config field '{field}': {reason}")]
    InvalidField {
        /// Dotted path of the field
        field: String,
        /// Reason why the field is invalid
        reason: String,
    },

    /// Neither the XDG variable nor `HOME` is set
    #[error("cannot locate {kind} directory: neither {xdg_var} nor HOME is set")]
    NoBaseDirectory {
        /// Which directory was being resolved
        kind: &'static str,
        /// XDG variable that was checked first
        xdg_var: &'static str,
    },
}

impl ConfigError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => p.to_string_lossy().to_string(),
            None => "string".to_string(),
        };

        ConfigError::TomlParse {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error for `path`.
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
