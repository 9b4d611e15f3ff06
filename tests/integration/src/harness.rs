//! A small loopback mesh: nodes with their own directories, each served
//! on an ephemeral port.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mesh_fs::{ConfigFileInfo, ConfigInventory};
use mesh_rpc::{ClientCache, SharedSecret, SyncHandler, SyncServer};
use mesh_sync::{LocalNode, ServiceControl, ServiceStatus, StaticPeers, SyncOrchestrator};
use mesh_test_utils::TestConfigDir;
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-secret";

/// Every instance runs; restarts and removals are recorded.
#[derive(Default)]
pub struct RecordingServices {
    restarted: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl RecordingServices {
    pub fn restarted(&self) -> Vec<String> {
        self.restarted.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceControl for RecordingServices {
    async fn status(&self, _instance: &str) -> mesh_sync::Result<ServiceStatus> {
        Ok(ServiceStatus::Running)
    }

    async fn restart(&self, instance: &str) -> mesh_sync::Result<()> {
        self.restarted.lock().unwrap().push(instance.to_string());
        Ok(())
    }

    async fn remove(&self, instance: &str) -> mesh_sync::Result<()> {
        self.removed.lock().unwrap().push(instance.to_string());
        Ok(())
    }
}

pub struct MeshNode {
    pub dir: TestConfigDir,
    pub services: Arc<RecordingServices>,
    pub node: Arc<LocalNode>,
}

impl MeshNode {
    pub fn new() -> Self {
        let dir = TestConfigDir::new();
        let services = Arc::new(RecordingServices::default());
        let node = Arc::new(LocalNode::new(
            ConfigInventory::new(dir.path()),
            Arc::clone(&services) as Arc<dyn ServiceControl>,
        ));
        Self {
            dir,
            services,
            node,
        }
    }

    /// Serve this node with the group secret.
    pub async fn serve(&self) -> String {
        serve(Arc::clone(&self.node), SECRET).await
    }

    /// An orchestrator for this node over a fixed peer list.
    pub fn orchestrator(&self, peers: &[&str]) -> SyncOrchestrator<StaticPeers> {
        let cache = ClientCache::new(SharedSecret::new(SECRET))
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(5));
        SyncOrchestrator::new(
            Arc::clone(&self.node),
            StaticPeers::new(peers, 16666),
            Arc::new(cache),
        )
    }
}

/// Serve `handler` on an ephemeral loopback port for the rest of the test.
pub async fn serve<H: SyncHandler>(handler: Arc<H>, secret: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    let server = SyncServer::new(handler, SharedSecret::new(secret));
    tokio::spawn(server.run(listener, std::future::pending()));
    endpoint
}

/// A node whose inventory call fails, as a peer with an unreadable
/// configuration directory would.
pub struct BrokenInventory(pub Arc<LocalNode>);

#[async_trait]
impl SyncHandler for BrokenInventory {
    async fn get_inventory(&self) -> mesh_rpc::Result<Vec<ConfigFileInfo>> {
        Err(mesh_rpc::RpcError::Handler("configuration directory unreadable".into()))
    }

    async fn get_content(&self, names: Vec<String>) -> mesh_rpc::Result<Vec<ConfigFileInfo>> {
        self.0.get_content(names).await
    }

    async fn put_content(&self, files: Vec<ConfigFileInfo>) -> mesh_rpc::Result<()> {
        self.0.put_content(files).await
    }

    async fn delete_files(&self, names: Vec<String>) -> mesh_rpc::Result<()> {
        self.0.delete_files(names).await
    }

    async fn refresh_configs(&self) -> mesh_rpc::Result<()> {
        self.0.refresh_configs().await
    }
}
