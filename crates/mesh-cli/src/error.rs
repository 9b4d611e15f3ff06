//! Error types for mesh-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mesh-sync
    #[error(transparent)]
    Sync(#[from] mesh_sync::Error),

    /// Error from mesh-rpc
    #[error(transparent)]
    Rpc(#[from] mesh_rpc::RpcError),

    /// Error from mesh-fs
    #[error(transparent)]
    Fs(#[from] mesh_fs::Error),

    /// JSON output failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
