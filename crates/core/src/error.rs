//! Error types for the menagerie core.
//!
//! A failing lifecycle is fatal to the driver, so errors here are reported,
//! never retried.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An animal's lifecycle failed; the driver stops on the first one.
    #[error("{animal} failed to live: {source}")]
    Life {
        animal: &'static str,
        #[source]
        source: LifeError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Attribute a lifecycle failure to the animal that raised it.
    pub const fn life(animal: &'static str, source: LifeError) -> Self {
        Self::Life { animal, source }
    }
}

/// Failure inside one lifecycle behavior.
#[derive(Debug, Error)]
pub enum LifeError {
    #[error("failed to spawn helper thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    #[error("rendezvous partner hung up before signalling")]
    Disconnected,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("TOML parse error: {reason}")]
    TomlParseFailed { reason: String },

    #[error("tick interval must be between 1ms and {max_secs}s, got {got_ms}ms")]
    TickInterval { got_ms: u128, max_secs: u64 },

    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("hoard cap ({cap} bytes) is smaller than one chunk ({chunk} bytes)")]
    HoardCap { cap: usize, chunk: usize },
}

impl ConfigError {
    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a TOML parse error.
    pub fn toml_parse_failed(reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            reason: reason.into(),
        }
    }
}

/// The standard Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single lifecycle behavior.
pub type LifeResult = std::result::Result<(), LifeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_error_names_the_animal() {
        let err = Error::life("wolf", LifeError::Poisoned("den"));
        assert_eq!(err.to_string(), "wolf failed to live: den lock poisoned");
    }

    #[test]
    fn test_config_error_converts_into_core_error() {
        let err: Error = ConfigError::ZeroParallelism.into();
        assert!(matches!(err, Error::Config(ConfigError::ZeroParallelism)));
        assert!(err.to_string().contains("parallelism"));
    }

    #[test]
    fn test_spawn_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left");
        let err = LifeError::from(io);
        assert!(matches!(err, LifeError::Spawn(_)));
        assert!(err.to_string().contains("no threads left"));
    }
}
