//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// meshsync - Keep mesh-VPN instance configurations in sync across nodes
#[derive(Parser, Debug)]
#[command(name = "meshsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML or JSON)
    #[arg(long, global = true, env = "MESHSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the `<instance>.toml` files
    #[arg(long, global = true, env = "MESHSYNC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Shared secret every node of the sync group uses
    #[arg(long, global = true, env = "MESHSYNC_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// TCP port of the sync service
    #[arg(long, global = true, env = "MESHSYNC_PORT")]
    pub port: Option<u16>,

    /// Path to the mesh-VPN control CLI
    #[arg(long, global = true, env = "MESHSYNC_MESH_CLI")]
    pub mesh_cli: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the sync RPC service until interrupted
    Serve {
        /// Address to bind (overrides the settings file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Reconcile configurations with every reachable peer
    ///
    /// Examples:
    ///   meshsync sync                          # Peers from the mesh network
    ///   meshsync sync --peer 10.126.126.2      # A specific peer
    ///   meshsync sync --delete-extra           # Also delete files only the first peer has
    Sync {
        /// Delete, on the first reconciled peer, files that do not exist here
        #[arg(long)]
        delete_extra: bool,

        /// Peer to sync with instead of discovering (host or host:port)
        #[arg(long = "peer", value_name = "HOST[:PORT]")]
        peers: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List peers discovered through the running instances
    Peers {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the local configuration files
    Inventory {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show configured instances and their service status
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   meshsync completions bash > ~/.local/share/bash-completion/completions/meshsync
    ///   meshsync completions zsh > ~/.zfunc/_meshsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show the effective settings
    Settings {
        /// Write the effective settings to the settings file
        #[arg(long)]
        save: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
