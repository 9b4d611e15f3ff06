//! Peers command implementation

use colored::Colorize;
use serde::Serialize;

use super::print_json;
use crate::context::NodeContext;
use crate::error::Result;

#[derive(Serialize)]
struct PeerRow {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    endpoint: String,
}

/// List the remote nodes discovered through the running instances.
pub async fn run_peers(ctx: &NodeContext, json: bool) -> Result<()> {
    let port = ctx.settings.rpc_port;
    let rows: Vec<PeerRow> = ctx
        .mesh_peers()
        .endpoints()
        .await
        .into_iter()
        .map(|peer| PeerRow {
            endpoint: peer.rpc_address(port),
            address: peer.address,
            hostname: peer.hostname,
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    println!("{}", "Mesh Peers".bold());
    println!();
    if rows.is_empty() {
        println!(
            "  {} (is an instance running and {} on the PATH?)",
            "None".dimmed(),
            ctx.settings.mesh_cli.display().to_string().cyan()
        );
        return Ok(());
    }
    for row in &rows {
        let name = row.hostname.as_deref().unwrap_or("-");
        println!("  {} {} {}", "+".green(), row.endpoint.cyan(), name.dimmed());
    }
    Ok(())
}
