//! Shared test utilities for the meshsync workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`config_dir`]: [`TestConfigDir`], a temporary configuration directory
//!   whose files carry pinned modification times

pub mod config_dir;

pub use config_dir::{TestConfigDir, utc};
