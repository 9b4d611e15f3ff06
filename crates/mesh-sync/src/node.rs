//! The local node
//!
//! Owns the configuration directory, the in-memory instance model and the
//! service-control seam. Serves peers through [`SyncHandler`] and applies
//! what the orchestrator pulls, with the same side effects either way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mesh_fs::{ConfigFileInfo, ConfigInventory, instance_name};
use mesh_peers::InstanceTarget;
use mesh_rpc::SyncHandler;
use tokio::task;
use tracing::{debug, warn};

use crate::Result;
use crate::model::{ConfigList, InstanceEntry};
use crate::service::{ServiceControl, ServiceStatus};

pub struct LocalNode {
    inventory: ConfigInventory,
    services: Arc<dyn ServiceControl>,
    model: Mutex<ConfigList>,
}

impl LocalNode {
    pub fn new(inventory: ConfigInventory, services: Arc<dyn ServiceControl>) -> Self {
        Self {
            inventory,
            services,
            model: Mutex::new(ConfigList::new()),
        }
    }

    pub fn inventory(&self) -> &ConfigInventory {
        &self.inventory
    }

    /// Current instance list
    pub fn instances(&self) -> Vec<InstanceEntry> {
        self.model().snapshot()
    }

    /// Register a model subscriber.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&[InstanceEntry]) + Send + Sync + 'static,
    {
        self.model().subscribe(callback);
    }

    pub fn select(&self, instance: &str, selected: bool) -> bool {
        self.model().select(instance, selected)
    }

    pub async fn list_local(&self) -> Result<Vec<ConfigFileInfo>> {
        self.on_disk(|inventory| inventory.list_local()).await
    }

    pub async fn read_content(&self, names: &[String]) -> Result<Vec<ConfigFileInfo>> {
        let names = names.to_vec();
        self.on_disk(move |inventory| inventory.read_content(&names))
            .await
    }

    /// Write files with their origin timestamps, then restart every running
    /// instance whose configuration was among them.
    ///
    /// Returns the names written. A failed restart is logged, not returned:
    /// the files are already in place.
    pub async fn apply_content(&self, files: &[ConfigFileInfo]) -> Result<Vec<String>> {
        let files = files.to_vec();
        let written = self
            .on_disk(move |inventory| inventory.write_content(&files))
            .await?;

        for instance in written.iter().filter_map(|name| instance_name(name)) {
            match self.services.status(instance).await {
                Ok(status) if status.is_running() => {
                    debug!(instance, "restarting after configuration change");
                    if let Err(e) = self.services.restart(instance).await {
                        warn!(instance, error = %e, "restart failed");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(instance, error = %e, "cannot read service status"),
            }
        }

        Ok(written)
    }

    /// Tear down the instances behind `names`, then delete the files.
    ///
    /// Returns the names actually removed from disk.
    pub async fn delete(&self, names: &[String]) -> Result<Vec<String>> {
        for name in names {
            mesh_fs::validate_file_name(name)?;
        }

        for instance in names.iter().filter_map(|name| instance_name(name)) {
            if let Err(e) = self.services.remove(instance).await {
                warn!(instance, error = %e, "failed to remove service");
            }
            self.model().remove(instance);
        }

        let names = names.to_vec();
        self.on_disk(move |inventory| inventory.delete(&names))
            .await
    }

    /// Re-scan the directory into the instance model.
    pub async fn refresh(&self) -> Result<()> {
        let names = self.on_disk(|inventory| inventory.instance_names()).await?;
        let statuses = self.statuses(&names).await;
        self.model().reload(&names, &statuses);
        debug!(instances = names.len(), "reloaded instance model");
        Ok(())
    }

    /// Instances as discovery sees them, with live service status.
    pub async fn instance_targets(&self) -> Result<Vec<InstanceTarget>> {
        let names = self.on_disk(|inventory| inventory.instance_names()).await?;
        let statuses = self.statuses(&names).await;
        Ok(names
            .into_iter()
            .map(|name| InstanceTarget {
                config_path: self.inventory.config_path(&name),
                running: statuses.get(&name).is_some_and(|s| s.is_running()),
                name,
            })
            .collect())
    }

    async fn statuses(&self, names: &[String]) -> HashMap<String, ServiceStatus> {
        let mut statuses = HashMap::with_capacity(names.len());
        for name in names {
            let status = match self.services.status(name).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(instance = %name, error = %e, "cannot read service status");
                    ServiceStatus::NotInstalled
                }
            };
            statuses.insert(name.clone(), status);
        }
        statuses
    }

    /// Run a directory operation on the blocking pool.
    async fn on_disk<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&ConfigInventory) -> mesh_fs::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inventory = self.inventory.clone();
        Ok(task::spawn_blocking(move || op(&inventory)).await??)
    }

    fn model(&self) -> MutexGuard<'_, ConfigList> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SyncHandler for LocalNode {
    async fn get_inventory(&self) -> mesh_rpc::Result<Vec<ConfigFileInfo>> {
        Ok(self.list_local().await?)
    }

    async fn get_content(&self, names: Vec<String>) -> mesh_rpc::Result<Vec<ConfigFileInfo>> {
        Ok(self.read_content(&names).await?)
    }

    async fn put_content(&self, files: Vec<ConfigFileInfo>) -> mesh_rpc::Result<()> {
        let written = self.apply_content(&files).await?;
        debug!(files = written.len(), "applied content from peer");
        Ok(())
    }

    async fn delete_files(&self, names: Vec<String>) -> mesh_rpc::Result<()> {
        let removed = self.delete(&names).await?;
        debug!(files = removed.len(), "deleted files at peer request");
        Ok(())
    }

    async fn refresh_configs(&self) -> mesh_rpc::Result<()> {
        Ok(self.refresh().await?)
    }
}
