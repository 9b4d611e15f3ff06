//! Error types for mesh-sync

/// Result type for mesh-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling configurations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Another sync run holds the run lock
    #[error("A sync run is already in progress")]
    AlreadyRunning,

    /// A service-control action failed for an instance
    #[error("Service control failed for {instance}: {message}")]
    Service { instance: String, message: String },

    /// A blocking filesystem task panicked or was cancelled
    #[error("Blocking filesystem task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    /// Filesystem error from mesh-fs
    #[error(transparent)]
    Fs(#[from] mesh_fs::Error),

    /// RPC error from mesh-rpc
    #[error(transparent)]
    Rpc(#[from] mesh_rpc::RpcError),
}

impl Error {
    pub fn service(instance: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            instance: instance.into(),
            message: message.into(),
        }
    }
}

impl From<Error> for mesh_rpc::RpcError {
    fn from(err: Error) -> Self {
        match err {
            Error::Fs(e) => mesh_rpc::RpcError::Fs(e),
            Error::Rpc(e) => e,
            other => mesh_rpc::RpcError::Handler(other.to_string()),
        }
    }
}
