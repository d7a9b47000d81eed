//! Error types for rossa-cli

use thiserror::Error;

/// Result type alias for rossa-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rossa-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from rossa-core
    #[error(transparent)]
    Core(#[from] rossa_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error with the path involved
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that was read or written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Wraps an I/O error together with its path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<std::path::Path>) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
