//! Server-side seam of the sync contract

use async_trait::async_trait;
use mesh_fs::ConfigFileInfo;

use crate::Result;

/// What a node does when a peer calls it.
///
/// The server authenticates the caller and validates every file name
/// before any of these methods runs. `ping` is answered by the server
/// itself.
#[async_trait]
pub trait SyncHandler: Send + Sync + 'static {
    /// Local inventory, without content
    async fn get_inventory(&self) -> Result<Vec<ConfigFileInfo>>;

    /// Content of the named files; missing files are skipped
    async fn get_content(&self, names: Vec<String>) -> Result<Vec<ConfigFileInfo>>;

    /// Write the files, stamping each with its origin timestamp
    async fn put_content(&self, files: Vec<ConfigFileInfo>) -> Result<()>;

    /// Delete the named files and tear down their instances
    async fn delete_files(&self, names: Vec<String>) -> Result<()>;

    /// Re-scan the configuration directory into the in-memory model
    async fn refresh_configs(&self) -> Result<()>;
}
