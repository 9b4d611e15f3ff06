//! Configuration reconciliation for meshsync
//!
//! Nodes of a mesh exchange their `<instance>.toml` files with every peer
//! they can reach. Conflicts are settled by modification time alone: the
//! strictly newer copy wins, equal times mean "in sync". Synced files keep
//! the origin's timestamp so they are not mistaken for local edits on the
//! next run.
//!
//! - [`SyncOrchestrator`] drives a run and produces a [`SyncReport`]
//! - [`LocalNode`] owns the directory, the instance model and the
//!   service-control seam, and answers peers as a [`mesh_rpc::SyncHandler`]
//! - [`InventoryDiff`] is the four-way comparison
//! - [`DeletionSwitch`] is the one-shot "delete extra configs" flag

pub mod diff;
pub mod error;
pub mod model;
pub mod node;
pub mod orchestrator;
pub mod peers;
pub mod report;
pub mod service;
pub mod session;

pub use diff::InventoryDiff;
pub use error::{Error, Error as SyncError, Result};
pub use model::{ConfigList, InstanceEntry};
pub use node::LocalNode;
pub use orchestrator::{NO_CLIENTS_MESSAGE, SyncOrchestrator};
pub use peers::{MeshPeers, PeerSource, StaticPeers, with_default_port};
pub use report::{PeerSummary, SyncReport};
pub use service::{ExternalServices, ServiceControl, ServiceStatus};
pub use session::{DeletionSwitch, SyncSession};
