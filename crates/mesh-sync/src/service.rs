//! Service-control seam
//!
//! Installing, starting and stopping the background service that runs an
//! instance is platform plumbing outside this crate. Reconciliation only
//! needs to know whether an instance is running, restart it when its
//! configuration changed underneath it, and tear it down when its
//! configuration is deleted by a peer.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;

/// Status of the service backing an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Paused,
    /// No service is installed for the instance
    #[serde(rename = "None")]
    NotInstalled,
}

impl ServiceStatus {
    pub fn is_running(self) -> bool {
        self == ServiceStatus::Running
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceStatus::Running => "Running",
            ServiceStatus::Stopped => "Stopped",
            ServiceStatus::Paused => "Paused",
            ServiceStatus::NotInstalled => "None",
        };
        f.write_str(label)
    }
}

/// Lifecycle control over the services backing instances.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    async fn status(&self, instance: &str) -> Result<ServiceStatus>;

    /// Restart a running instance so it picks up a rewritten configuration.
    async fn restart(&self, instance: &str) -> Result<()>;

    /// Stop and uninstall the instance's service.
    async fn remove(&self, instance: &str) -> Result<()>;
}

/// Control for instances whose services are managed elsewhere.
///
/// Every instance is assumed to be running; restart and removal requests
/// are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalServices;

#[async_trait]
impl ServiceControl for ExternalServices {
    async fn status(&self, _instance: &str) -> Result<ServiceStatus> {
        Ok(ServiceStatus::Running)
    }

    async fn restart(&self, instance: &str) -> Result<()> {
        info!(instance, "configuration changed, restart the instance to apply it");
        Ok(())
    }

    async fn remove(&self, instance: &str) -> Result<()> {
        info!(instance, "configuration deleted by peer, stop the instance");
        Ok(())
    }
}
