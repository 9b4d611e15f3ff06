//! Subprocess execution for the mesh-VPN control CLI
//!
//! Wraps `<cli> -p <socket> -o json peer` and translates its JSON output
//! into [`PeerInfo`] entries.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{PeerError, Result};
use crate::types::PeerInfo;

/// Default executable name of the control CLI
pub const DEFAULT_CLI: &str = "easytier-cli";

/// Default time allowed for one CLI invocation
pub const DEFAULT_CLI_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of an instance's live peer table.
#[async_trait]
pub trait PeerTable: Send + Sync {
    /// Query the peer table of the instance listening on `socket`.
    async fn peers(&self, socket: &str) -> Result<Vec<PeerInfo>>;
}

/// The mesh-VPN control CLI.
#[derive(Debug, Clone)]
pub struct MeshCli {
    path: PathBuf,
    timeout: Duration,
}

impl MeshCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_CLI_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the CLI executable
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the CLI with `args` and return its stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PeerError::Timeout(self.timeout))??;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            Err(PeerError::CommandFailed { code, stderr })
        }
    }
}

impl Default for MeshCli {
    fn default() -> Self {
        Self::new(DEFAULT_CLI)
    }
}

#[async_trait]
impl PeerTable for MeshCli {
    async fn peers(&self, socket: &str) -> Result<Vec<PeerInfo>> {
        let stdout = self.run(&["-p", socket, "-o", "json", "peer"]).await?;
        let peers = parse_peers(&stdout)?;
        debug!(socket, count = peers.len(), "queried peer table");
        Ok(peers)
    }
}

/// Parse the JSON peer table printed by the CLI.
///
/// Empty output (no peers yet) is an empty table.
pub fn parse_peers(output: &str) -> Result<Vec<PeerInfo>> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|e| PeerError::ParseError(e.to_string()))
}
