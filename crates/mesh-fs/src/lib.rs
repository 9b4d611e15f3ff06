//! Filesystem layer for meshsync
//!
//! Provides the local half of configuration synchronization: listing the
//! configuration directory, reading and writing file content while
//! preserving the origin's modification time, and deleting files. Also
//! hosts the format-agnostic settings store used by the binary.

pub mod config;
pub mod error;
pub mod info;
pub mod inventory;
pub mod io;
pub mod name;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use info::ConfigFileInfo;
pub use inventory::{CONFIG_EXTENSION, ConfigInventory, instance_name};
pub use name::validate_file_name;
