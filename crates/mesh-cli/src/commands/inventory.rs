//! Inventory command implementation

use colored::Colorize;

use super::print_json;
use crate::context::NodeContext;
use crate::error::Result;

/// List the local configuration files with their modification times.
pub async fn run_inventory(ctx: &NodeContext, json: bool) -> Result<()> {
    let files = ctx.node.list_local().await?;

    if json {
        return print_json(&files);
    }

    println!("{}", "Local Configs".bold());
    println!("{}:   {}", "Path".dimmed(), ctx.settings.config_dir.display());
    println!();
    if files.is_empty() {
        println!("  {}", "None".dimmed());
        return Ok(());
    }
    for file in &files {
        println!(
            "  {} {}  {}",
            "+".green(),
            file.file_name.cyan(),
            file.file_time_utc.to_rfc3339().dimmed()
        );
    }
    Ok(())
}
