//! Error types for the sync RPC layer

use std::time::Duration;

use thiserror::Error;

/// Result type alias for RPC operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors raised on either side of the sync RPC contract
#[derive(Debug, Error)]
pub enum RpcError {
    /// The shared secret was missing or did not match. Never retried.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The call did not complete within its deadline
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The peer could not be reached or dropped the connection
    #[error("connection to {endpoint} failed: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The peer answered with a JSON-RPC error
    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    /// Request parameters were malformed
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The handler failed for a reason of its own
    #[error("handler failed: {0}")]
    Handler(String),

    /// Local filesystem layer error
    #[error(transparent)]
    Fs(#[from] mesh_fs::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Listener or socket error outside a peer exchange
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpcError {
    pub fn connection(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}
