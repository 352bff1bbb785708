//! Error types for the AHTx0 client library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the fallible parts of the client.
///
/// Sensor reads never return these; they degrade to sentinel values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Native library could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration file could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::SensorConfig`].
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Why the native library failed to load.
///
/// Stored once for the lifetime of the process, so it carries rendered
/// messages rather than the underlying loader errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Library file not found or rejected by the platform loader.
    #[error("Could not load '{path}': {reason}")]
    Open { path: String, reason: String },

    /// A required entry point is missing from the library.
    #[error("Symbol '{symbol}' not found: {reason}")]
    MissingSymbol {
        symbol: &'static str,
        reason: String,
    },
}
