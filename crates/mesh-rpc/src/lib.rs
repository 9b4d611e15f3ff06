//! Sync RPC service and client for meshsync
//!
//! Every node exposes the same small contract over newline-delimited
//! JSON-RPC 2.0 on a fixed TCP port:
//!
//! | Method | Params | Result |
//! |---|---|---|
//! | `ping` | none | `true` |
//! | `getInventory` | none | `[ConfigFileInfo]` without content |
//! | `getContent` | `{"names": [..]}` | `[ConfigFileInfo]` with content |
//! | `putContent` | `{"files": [..]}` | `null` |
//! | `deleteFiles` | `{"names": [..]}` | `null` |
//! | `refreshConfigs` | none | `null` |
//!
//! Every request carries an `authorization` member holding
//! `Bearer <shared secret>`. A mismatch is answered with
//! [`protocol::UNAUTHENTICATED`] before the handler is consulted.

pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

pub use auth::SharedSecret;
pub use cache::ClientCache;
pub use client::{DEFAULT_CALL_TIMEOUT, DEFAULT_PING_TIMEOUT, SyncClient};
pub use error::{Result, RpcError};
pub use handler::SyncHandler;
pub use protocol::Method;
pub use server::{DEFAULT_MAX_REQUEST_BYTES, SyncServer};

/// Fixed TCP port of the sync service
pub const DEFAULT_RPC_PORT: u16 = 16666;
