//! Fixtures shared by the mesh-sync test files

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mesh_fs::ConfigInventory;
use mesh_rpc::{SharedSecret, SyncServer};
use mesh_sync::{LocalNode, ServiceControl, ServiceStatus};
use mesh_test_utils::TestConfigDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const SECRET: &str = "mesh-secret";

/// Service control that records every request.
#[derive(Default)]
pub struct FakeServices {
    statuses: Mutex<HashMap<String, ServiceStatus>>,
    pub restarted: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
}

impl FakeServices {
    pub fn with_status(self, instance: &str, status: ServiceStatus) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(instance.to_string(), status);
        self
    }

    pub fn restarted(&self) -> Vec<String> {
        self.restarted.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceControl for FakeServices {
    async fn status(&self, instance: &str) -> mesh_sync::Result<ServiceStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(instance)
            .copied()
            .unwrap_or(ServiceStatus::NotInstalled))
    }

    async fn restart(&self, instance: &str) -> mesh_sync::Result<()> {
        self.restarted.lock().unwrap().push(instance.to_string());
        Ok(())
    }

    async fn remove(&self, instance: &str) -> mesh_sync::Result<()> {
        self.removed.lock().unwrap().push(instance.to_string());
        self.statuses.lock().unwrap().remove(instance);
        Ok(())
    }
}

/// A node with its own directory and fake services.
pub struct TestNode {
    pub dir: TestConfigDir,
    pub services: Arc<FakeServices>,
    pub node: Arc<LocalNode>,
}

impl TestNode {
    pub fn new() -> Self {
        Self::with_services(FakeServices::default())
    }

    pub fn with_services(services: FakeServices) -> Self {
        let dir = TestConfigDir::new();
        let services = Arc::new(services);
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

    /// Serve this node on an ephemeral loopback port; returns `host:port`.
    pub async fn serve(&self, secret: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        let server = SyncServer::new(Arc::clone(&self.node), SharedSecret::new(secret));
        tokio::spawn(server.run(listener, std::future::pending()));
        endpoint
    }
}

/// Loopback relay in front of a served node. Once stalled it keeps every
/// connection open but stops relaying bytes in either direction.
pub struct StallingRelay {
    pub endpoint: String,
    stalled: Arc<AtomicBool>,
}

impl StallingRelay {
    pub async fn start(upstream: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        let stalled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stalled);
        tokio::spawn(async move {
            while let Ok((inbound, _)) = listener.accept().await {
                let outbound = TcpStream::connect(&upstream).await.unwrap();
                let (in_read, in_write) = inbound.into_split();
                let (out_read, out_write) = outbound.into_split();
                tokio::spawn(relay(in_read, out_write, Arc::clone(&flag)));
                tokio::spawn(relay(out_read, in_write, Arc::clone(&flag)));
            }
        });
        Self { endpoint, stalled }
    }

    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }
}

async fn relay<R, W>(mut from: R, mut to: W, stalled: Arc<AtomicBool>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 4096];
    loop {
        let n = match from.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        if stalled.load(Ordering::SeqCst) {
            continue;
        }
        if to.write_all(&buf[..n]).await.is_err() {
            return;
        }
    }
}
