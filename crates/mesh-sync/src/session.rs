//! Per-run state and the one-shot deletion switch

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mesh_fs::ConfigFileInfo;
use mesh_rpc::SyncClient;

/// User-armed switch that makes the next sync delete, on the first
/// reconciled peer, the files that exist only there.
///
/// Clones share the same switch, so a front end can hold one while the
/// orchestrator holds another.
#[derive(Debug, Clone, Default)]
pub struct DeletionSwitch(Arc<AtomicBool>);

impl DeletionSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Disarm and report whether the switch was armed.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// State of one sync run. Never outlives the run.
#[derive(Debug, Default)]
pub struct SyncSession {
    /// Admitted peers, in visiting order
    pub peers: Vec<Arc<SyncClient>>,
    /// Local inventory, snapshotted once and kept current with pulled files
    pub local: BTreeMap<String, ConfigFileInfo>,
    /// Whether a pull added instances the local model does not know yet
    pub local_needs_refresh: bool,
}

impl SyncSession {
    pub fn new(peers: Vec<Arc<SyncClient>>, local: Vec<ConfigFileInfo>) -> Self {
        Self {
            peers,
            local: local
                .into_iter()
                .map(|info| (info.file_name.clone(), info))
                .collect(),
            local_needs_refresh: false,
        }
    }

    /// Record files just written locally.
    pub fn record_local_writes(&mut self, files: &[ConfigFileInfo]) {
        for file in files {
            self.local
                .insert(file.file_name.clone(), file.without_content());
        }
    }
}
