//! Wiring shared by the commands

use std::sync::Arc;

use mesh_fs::ConfigInventory;
use mesh_peers::MeshCli;
use mesh_rpc::ClientCache;
use mesh_sync::{ExternalServices, LocalNode, MeshPeers};

use crate::error::Result;
use crate::settings::Settings;

/// Everything a command needs, built once from the effective settings.
pub struct NodeContext {
    pub settings: Settings,
    pub node: Arc<LocalNode>,
}

impl NodeContext {
    /// Build the local node over `settings.config_dir` and load its model.
    pub async fn open(settings: Settings) -> Result<Self> {
        std::fs::create_dir_all(&settings.config_dir)?;
        let inventory = ConfigInventory::new(&settings.config_dir);
        let node = Arc::new(LocalNode::new(inventory, Arc::new(ExternalServices)));
        node.refresh().await?;
        Ok(Self { settings, node })
    }

    pub fn clients(&self) -> Arc<ClientCache> {
        let cache = ClientCache::new(self.settings.secret())
            .with_timeouts(self.settings.ping_timeout(), self.settings.call_timeout());
        Arc::new(cache)
    }

    pub fn mesh_cli(&self) -> MeshCli {
        MeshCli::new(self.settings.mesh_cli.clone()).with_timeout(self.settings.cli_timeout())
    }

    pub fn mesh_peers(&self) -> MeshPeers<MeshCli> {
        MeshPeers::new(self.mesh_cli(), Arc::clone(&self.node), self.settings.rpc_port)
    }
}
