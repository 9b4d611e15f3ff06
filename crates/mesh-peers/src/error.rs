//! Error types for peer discovery

use std::time::Duration;

/// Errors that can occur while querying the mesh network
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// The control CLI could not be started
    #[error("Failed to run mesh CLI: {0}")]
    Io(#[from] std::io::Error),

    /// The control CLI exited with non-zero status
    #[error("Mesh CLI failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code from the subprocess
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// The control CLI did not answer in time
    #[error("Mesh CLI did not respond within {0:?}")]
    Timeout(Duration),

    /// Peer table output was not the expected JSON
    #[error("Failed to parse peer table: {0}")]
    ParseError(String),

    /// Instance configuration could not be read
    #[error(transparent)]
    Config(#[from] mesh_fs::Error),
}

/// Result type alias for peer discovery
pub type Result<T> = std::result::Result<T, PeerError>;
