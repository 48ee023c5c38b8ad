use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the fallible surfaces of the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the (infallible) render path.
#[derive(Debug, Error)]
pub enum Error {
    /// Builder argument rejected before rendering.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Reading a configuration file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing a configuration file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Configuration text was not valid TOML for [`crate::config::CompilerConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Configuration could not be serialized back to TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Bound variables could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
