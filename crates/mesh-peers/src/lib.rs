//! Peer discovery for meshsync
//!
//! Every node learns who to synchronize with from the mesh network
//! itself. For each running instance this crate asks the mesh-VPN
//! control CLI for the instance's live peer table, drops the entry that
//! reflects the local node back, and yields the unique remote addresses.
//!
//! Discovery never fails a sync run: an instance whose control socket
//! cannot be resolved or whose CLI call fails simply contributes no
//! peers.

pub mod cli;
pub mod discovery;
pub mod error;
pub mod socket;
pub mod types;

pub use cli::{MeshCli, PeerTable, parse_peers};
pub use discovery::PeerDirectory;
pub use error::{PeerError, Result};
pub use socket::{DEFAULT_RPC_SOCKET, parse_rpc_portal, resolve_rpc_socket};
pub use types::{InstanceTarget, LOCAL_COST, PeerEndpoint, PeerInfo};
