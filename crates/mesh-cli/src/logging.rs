//! Tracing setup for the binary

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "warn,meshsync=info,mesh_sync=info,mesh_rpc=info,mesh_peers=info,mesh_fs=info";
const VERBOSE_FILTER: &str = "info,meshsync=debug,mesh_sync=debug,mesh_rpc=debug,mesh_peers=debug,mesh_fs=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Logs go to stderr so `--json` output on
/// stdout stays machine-readable.
pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
