//! Outcome of a sync run

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What happened with one admitted peer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSummary {
    pub endpoint: String,
    /// Files pushed to the peer
    pub sent: Vec<String>,
    /// Files pulled from the peer and written locally
    pub received: Vec<String>,
    /// Files the peer was told to delete
    pub deleted: Vec<String>,
    /// Whether the peer was told to refresh its model
    pub remote_refreshed: bool,
    /// Why the exchange stopped early, if it did
    pub error: Option<String>,
}

impl PeerSummary {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Report from a sync run
///
/// `messages` are the human-readable status lines a front end shows;
/// `errors` hold failures that were isolated rather than aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every admitted peer was reconciled
    pub success: bool,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub peers: Vec<PeerSummary>,
    /// Whether the local model was reloaded at the end of the run
    pub local_refreshed: bool,
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::success()
    }
}

impl SyncReport {
    pub fn success() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
            errors: Vec::new(),
            peers: Vec::new(),
            local_refreshed: false,
        }
    }

    /// Record a status line.
    pub fn message(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.messages.push(message);
    }

    /// Record an isolated failure.
    pub fn error(&mut self, error: impl Into<String>) {
        let error = error.into();
        warn!("{error}");
        self.errors.push(error);
        self.success = false;
    }

    /// Number of files written locally across all peers
    pub fn files_received(&self) -> usize {
        self.peers.iter().map(|p| p.received.len()).sum()
    }

    /// Number of files pushed across all peers
    pub fn files_sent(&self) -> usize {
        self.peers.iter().map(|p| p.sent.len()).sum()
    }

    pub fn files_deleted(&self) -> usize {
        self.peers.iter().map(|p| p.deleted.len()).sum()
    }

    pub fn peer(&self, endpoint: &str) -> Option<&PeerSummary> {
        self.peers.iter().find(|p| p.endpoint == endpoint)
    }
}
