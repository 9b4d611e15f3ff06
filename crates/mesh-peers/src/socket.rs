//! Control-socket resolution
//!
//! Each instance exposes its control endpoint on the address named by
//! the `rpc_portal` key of its configuration. The CLI must be pointed at
//! a loopback address even when the portal listens on all interfaces.

use std::path::Path;

use mesh_fs::io;
use tracing::debug;

use crate::error::{PeerError, Result};

const DEFAULT_HOST: &str = "127.0.0.1";

/// Control socket used when an instance does not configure one.
pub const DEFAULT_RPC_SOCKET: &str = "127.0.0.1:15888";

/// Resolve the control socket for the instance configured at `config_path`.
///
/// Returns `Ok(None)` when the configuration file does not exist.
pub fn resolve_rpc_socket(config_path: &Path) -> Result<Option<String>> {
    if !config_path.is_file() {
        debug!(path = %config_path.display(), "no configuration for instance");
        return Ok(None);
    }

    let content = io::read_text(config_path)?;
    let table: toml::Table =
        toml::from_str(&content).map_err(|e| PeerError::ParseError(e.to_string()))?;

    let portal = table
        .get("rpc_portal")
        .and_then(|value| value.as_str())
        .unwrap_or("");

    Ok(Some(parse_rpc_portal(portal)))
}

/// Map an `rpc_portal` value to a socket the CLI can connect to.
///
/// - empty or `"0"` -> the default socket
/// - a bare port -> that port on loopback
/// - `0.0.0.0:<port>` -> that port on loopback
/// - any other `host:port` -> used as is
pub fn parse_rpc_portal(portal: &str) -> String {
    let portal = portal.trim();
    if portal.is_empty() {
        return DEFAULT_RPC_SOCKET.to_string();
    }

    let parts: Vec<&str> = portal.split(':').collect();
    match parts.as_slice() {
        ["0"] => DEFAULT_RPC_SOCKET.to_string(),
        [port] => format!("{DEFAULT_HOST}:{port}"),
        ["0.0.0.0", port] => format!("{DEFAULT_HOST}:{port}"),
        [_, _] => portal.to_string(),
        _ => DEFAULT_RPC_SOCKET.to_string(),
    }
}
