//! Shared types for peer discovery

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Cost tag the mesh CLI uses for the local node's own entry
pub const LOCAL_COST: &str = "Local";

/// One entry of an instance's live peer table, as printed by
/// `<mesh-cli> -o json peer`.
///
/// Only `ipv4` and `cost` drive discovery; the rest is carried for
/// display. Fields are lenient because CLI versions disagree on whether
/// numbers are printed as numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    #[serde(default)]
    pub cidr: String,
    #[serde(default)]
    pub ipv4: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub loss_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rx_bytes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tx_bytes: String,
    #[serde(default)]
    pub tunnel_proto: String,
    #[serde(default)]
    pub nat_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub version: String,
}

impl PeerInfo {
    /// Whether this entry is the local node reflected back.
    pub fn is_local(&self) -> bool {
        self.cost.eq_ignore_ascii_case(LOCAL_COST)
    }

    /// The peer's mesh address without any prefix length.
    pub fn address(&self) -> Option<&str> {
        let raw = self.ipv4.trim();
        let address = raw.split_once('/').map_or(raw, |(ip, _)| ip).trim();
        (!address.is_empty()).then_some(address)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// A locally configured instance, as seen by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTarget {
    /// Instance name (configuration file stem)
    pub name: String,
    /// Path to the instance's `.toml` configuration
    pub config_path: PathBuf,
    /// Whether the instance's service is currently running
    pub running: bool,
}

/// A remote node reachable through the mesh.
///
/// Derived fresh on every sync run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerEndpoint {
    /// Mesh address of the peer
    pub address: String,
    /// Host name reported by the mesh, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl PeerEndpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: None,
        }
    }

    /// `host:port` of the peer's sync service.
    pub fn rpc_address(&self, port: u16) -> String {
        format!("{}:{}", self.address, port)
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hostname {
            Some(host) if !host.is_empty() => write!(f, "{} ({})", self.address, host),
            _ => write!(f, "{}", self.address),
        }
    }
}
