//! Sync command implementation

use colored::Colorize;
use mesh_sync::{NO_CLIENTS_MESSAGE, PeerSource, StaticPeers, SyncOrchestrator, SyncReport};

use super::print_json;
use crate::context::NodeContext;
use crate::error::{CliError, Result};

/// Run one reconciliation, against `peers` if given, else the mesh.
pub async fn run_sync(
    ctx: &NodeContext,
    peers: &[String],
    delete_extra: bool,
    json: bool,
) -> Result<()> {
    if ctx.settings.secret().is_empty() {
        tracing::warn!("no sync secret configured, no peer will accept this node");
    }

    let report = if peers.is_empty() {
        reconcile(ctx, ctx.mesh_peers(), delete_extra).await?
    } else {
        let peers = StaticPeers::new(peers, ctx.settings.rpc_port);
        reconcile(ctx, peers, delete_extra).await?
    };

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.success {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "sync finished with {} failed peer(s)",
            report.errors.len()
        )))
    }
}

async fn reconcile<P: PeerSource>(
    ctx: &NodeContext,
    peers: P,
    delete_extra: bool,
) -> Result<SyncReport> {
    let orchestrator = SyncOrchestrator::new(ctx.node.clone(), peers, ctx.clients());
    if delete_extra {
        orchestrator.deletion().arm();
    }
    Ok(orchestrator.sync().await?)
}

fn print_report(report: &SyncReport) {
    for message in &report.messages {
        if message == NO_CLIENTS_MESSAGE {
            println!("{}", message.yellow());
        } else if message.starts_with("Synced") {
            println!("{} {}", "+".green(), message);
        } else {
            println!("  {}", message);
        }
    }
    for error in &report.errors {
        println!("{} {}", "x".red(), error.red());
    }

    if report.peers.is_empty() {
        return;
    }
    println!();
    println!(
        "{}: {} sent, {} received, {} deleted",
        "Summary".bold(),
        report.files_sent(),
        report.files_received(),
        report.files_deleted()
    );
}
