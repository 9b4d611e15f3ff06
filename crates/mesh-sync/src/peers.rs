//! Where sync candidates come from

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use mesh_peers::{PeerDirectory, PeerEndpoint, PeerTable};
use tracing::warn;

use crate::node::LocalNode;

/// Source of candidate `host:port` endpoints for a sync run.
#[async_trait]
pub trait PeerSource: Send + Sync {
    async fn candidates(&self) -> Vec<String>;
}

/// Peers found through the mesh network's live peer tables.
pub struct MeshPeers<T> {
    directory: PeerDirectory<T>,
    node: Arc<LocalNode>,
    rpc_port: u16,
}

impl<T: PeerTable> MeshPeers<T> {
    pub fn new(table: T, node: Arc<LocalNode>, rpc_port: u16) -> Self {
        Self {
            directory: PeerDirectory::new(table),
            node,
            rpc_port,
        }
    }

    /// Remote nodes reachable through the running instances.
    pub async fn endpoints(&self) -> Vec<PeerEndpoint> {
        let instances = match self.node.instance_targets().await {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, "cannot list local instances");
                return Vec::new();
            }
        };
        self.directory.discover(&instances).await
    }
}

#[async_trait]
impl<T: PeerTable> PeerSource for MeshPeers<T> {
    async fn candidates(&self) -> Vec<String> {
        self.endpoints()
            .await
            .iter()
            .map(|peer| peer.rpc_address(self.rpc_port))
            .collect()
    }
}

/// A fixed list of endpoints, bypassing discovery.
#[derive(Debug, Clone, Default)]
pub struct StaticPeers {
    endpoints: Vec<String>,
}

impl StaticPeers {
    /// Addresses without a port get `default_port`.
    pub fn new<I, S>(addresses: I, default_port: u16) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut endpoints: Vec<String> = Vec::new();
        for address in addresses {
            let endpoint = with_default_port(address.as_ref(), default_port);
            if !endpoints.contains(&endpoint) {
                endpoints.push(endpoint);
            }
        }
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

#[async_trait]
impl PeerSource for StaticPeers {
    async fn candidates(&self) -> Vec<String> {
        self.endpoints.clone()
    }
}

/// `host` becomes `host:port`; `host:port` and `[v6]:port` stay; a bare
/// IPv6 address is bracketed.
pub fn with_default_port(address: &str, port: u16) -> String {
    let address = address.trim();
    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }
    match address.rsplit_once(':') {
        Some((host, p)) if !host.contains(':') && p.parse::<u16>().is_ok() => address.to_string(),
        Some(_) => format!("[{address}]:{port}"),
        None => format!("{address}:{port}"),
    }
}
