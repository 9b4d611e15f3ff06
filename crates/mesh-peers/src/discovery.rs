//! Peer discovery across all running instances

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::cli::PeerTable;
use crate::socket::resolve_rpc_socket;
use crate::types::{InstanceTarget, PeerEndpoint};

/// Yields the remote nodes reachable through the locally running instances.
#[derive(Debug, Clone)]
pub struct PeerDirectory<T> {
    table: T,
}

impl<T: PeerTable> PeerDirectory<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    /// The underlying peer-table source
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Discover candidate peers.
    ///
    /// Instances that are not running contribute nothing. Entries marked
    /// as the local node are dropped, and each address appears once, in
    /// first-seen order. Never fails: problems with one instance are
    /// logged and that instance is skipped.
    pub async fn discover(&self, instances: &[InstanceTarget]) -> Vec<PeerEndpoint> {
        let mut seen = HashSet::new();
        let mut endpoints = Vec::new();

        for instance in instances.iter().filter(|i| i.running) {
            let socket = match resolve_rpc_socket(&instance.config_path) {
                Ok(Some(socket)) => socket,
                Ok(None) => continue,
                Err(e) => {
                    warn!(instance = %instance.name, error = %e, "cannot resolve control socket");
                    continue;
                }
            };

            let peers = match self.table.peers(&socket).await {
                Ok(peers) => peers,
                Err(e) => {
                    warn!(instance = %instance.name, socket, error = %e, "peer table query failed");
                    continue;
                }
            };

            for peer in peers.iter().filter(|p| !p.is_local()) {
                let Some(address) = peer.address() else {
                    continue;
                };
                if seen.insert(address.to_string()) {
                    endpoints.push(PeerEndpoint {
                        address: address.to_string(),
                        hostname: (!peer.hostname.is_empty()).then(|| peer.hostname.clone()),
                    });
                }
            }
        }

        debug!(count = endpoints.len(), "discovered peers");
        endpoints
    }
}
