//! meshsync
//!
//! Keeps the `<instance>.toml` configurations of a mesh-VPN in sync
//! across the nodes of the mesh.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod settings;

use std::path::Path;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use context::NodeContext;
use error::Result;
use settings::Settings;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!("{} Mesh configuration sync", "meshsync".green().bold());
        println!();
        println!("Run {} for available commands.", "meshsync --help".cyan());
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "meshsync", &mut std::io::stdout());
        return Ok(());
    }

    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?.merge_cli(&cli);
    tracing::debug!(path = %settings_path.display(), "loaded settings");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(command, settings, &settings_path))
}

async fn execute(command: Commands, settings: Settings, settings_path: &Path) -> Result<()> {
    match command {
        Commands::Completions { .. } => Ok(()),
        Commands::Settings { save, json } => {
            commands::run_settings(&settings, settings_path, save, json)
        }
        Commands::Serve { bind } => {
            let ctx = NodeContext::open(settings).await?;
            commands::run_serve(&ctx, bind).await
        }
        Commands::Sync {
            delete_extra,
            peers,
            json,
        } => {
            let ctx = NodeContext::open(settings).await?;
            commands::run_sync(&ctx, &peers, delete_extra, json).await
        }
        Commands::Peers { json } => {
            let ctx = NodeContext::open(settings).await?;
            commands::run_peers(&ctx, json).await
        }
        Commands::Inventory { json } => {
            let ctx = NodeContext::open(settings).await?;
            commands::run_inventory(&ctx, json).await
        }
        Commands::Status { json } => {
            let ctx = NodeContext::open(settings).await?;
            commands::run_status(&ctx, json)
        }
    }
}
