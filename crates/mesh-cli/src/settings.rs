//! Node settings
//!
//! Loaded from a TOML or JSON file through [`ConfigStore`]; a missing
//! file means defaults. Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mesh_fs::ConfigStore;
use mesh_peers::cli::DEFAULT_CLI;
use mesh_rpc::{DEFAULT_RPC_PORT, SharedSecret};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::Result;

const APP_DIR: &str = "meshsync";
const SETTINGS_FILE: &str = "settings.toml";
const CONFIG_DIR_NAME: &str = "Config";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub mesh_cli: PathBuf,
    pub sync_secret: String,
    pub rpc_port: u16,
    pub bind_addr: String,
    pub ping_timeout_ms: u64,
    pub call_timeout_ms: u64,
    pub cli_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            mesh_cli: PathBuf::from(DEFAULT_CLI),
            sync_secret: String::new(),
            rpc_port: DEFAULT_RPC_PORT,
            bind_addr: "0.0.0.0".to_string(),
            ping_timeout_ms: 2_000,
            call_timeout_ms: 30_000,
            cli_timeout_ms: 5_000,
        }
    }
}

impl Settings {
    /// Settings file used when `--config` is not given
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    /// Apply command-line overrides.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.config_dir {
            self.config_dir = dir.clone();
        }
        if let Some(secret) = &cli.secret {
            self.sync_secret = secret.clone();
        }
        if let Some(port) = cli.port {
            self.rpc_port = port;
        }
        if let Some(mesh_cli) = &cli.mesh_cli {
            self.mesh_cli = mesh_cli.clone();
        }
        self
    }

    pub fn secret(&self) -> SharedSecret {
        SharedSecret::new(self.sync_secret.clone())
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn cli_timeout(&self) -> Duration {
        Duration::from_millis(self.cli_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.rpc_port)
    }

    /// Copy safe to print, with the secret masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.sync_secret.is_empty() {
            copy.sync_secret = "********".to_string();
        }
        copy
    }
}

/// `Config` next to the executable, else under the platform config dir.
fn default_config_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_DIR_NAME)))
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME))
}
