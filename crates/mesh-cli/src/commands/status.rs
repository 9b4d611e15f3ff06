//! Status command implementation

use colored::Colorize;
use mesh_sync::ServiceStatus;

use super::print_json;
use crate::context::NodeContext;
use crate::error::Result;

/// Show each configured instance with its service status.
pub fn run_status(ctx: &NodeContext, json: bool) -> Result<()> {
    let instances = ctx.node.instances();

    if json {
        return print_json(&instances);
    }

    println!("{}", "Instances".bold());
    println!();
    if instances.is_empty() {
        println!("  {}", "None".dimmed());
        return Ok(());
    }
    for entry in &instances {
        let status = match entry.status {
            ServiceStatus::Running => entry.status.to_string().green(),
            ServiceStatus::Paused => entry.status.to_string().yellow(),
            ServiceStatus::Stopped | ServiceStatus::NotInstalled => {
                entry.status.to_string().dimmed()
            }
        };
        println!("  {} ({})", entry.name.cyan(), status);
    }
    Ok(())
}
