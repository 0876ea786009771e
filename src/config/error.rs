//! Configuration loading errors.

use crate::registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading registry definitions from a document
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the expected shape
    #[error("Invalid registry configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The definitions were rejected during registration
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
