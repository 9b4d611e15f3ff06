//! Error types for mesh-fs

use std::path::PathBuf;

/// Result type for mesh-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mesh-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {format} in {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Cannot write {path} as {format}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Unsupported settings file extension {extension:?} (expected toml or json)")]
    UnsupportedFormat { extension: String },

    #[error("Invalid config file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("No content supplied for {name}")]
    MissingContent { name: String },

    #[error("Could not lock {path} for writing")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFileName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
