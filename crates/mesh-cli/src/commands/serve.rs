//! Serve command implementation

use std::sync::Arc;

use colored::Colorize;
use mesh_rpc::SyncServer;
use tokio::net::TcpListener;
use tracing::warn;

use crate::context::NodeContext;
use crate::error::{CliError, Result};

/// Answer peers until Ctrl-C.
pub async fn run_serve(ctx: &NodeContext, bind: Option<String>) -> Result<()> {
    let address = bind.unwrap_or_else(|| ctx.settings.bind_address());
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| CliError::user(format!("cannot listen on {address}: {e}")))?;
    let local = listener.local_addr()?;

    println!(
        "{} sync service on {} for {}",
        "Serving".green().bold(),
        local.to_string().cyan(),
        ctx.settings.config_dir.display()
    );

    let server = SyncServer::new(Arc::clone(&ctx.node), ctx.settings.secret());
    server
        .run(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    println!("{}", "Stopped".dimmed());
    Ok(())
}
