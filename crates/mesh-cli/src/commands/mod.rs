//! Command implementations for meshsync

pub mod inventory;
pub mod peers;
pub mod serve;
pub mod settings;
pub mod status;
pub mod sync;

pub use inventory::run_inventory;
pub use peers::run_peers;
pub use serve::run_serve;
pub use settings::run_settings;
pub use status::run_status;
pub use sync::run_sync;

use serde::Serialize;

use crate::error::Result;

/// Pretty JSON on stdout for `--json`.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
