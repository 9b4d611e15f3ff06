//! Settings command implementation

use std::path::Path;

use colored::Colorize;

use super::print_json;
use crate::error::Result;
use crate::settings::Settings;

/// Print the effective settings, optionally persisting them first.
pub fn run_settings(settings: &Settings, path: &Path, save: bool, json: bool) -> Result<()> {
    if save {
        settings.save(path)?;
        if !json {
            println!("{} {}", "Saved".green().bold(), path.display());
        }
    }

    let shown = settings.redacted();
    if json {
        return print_json(&shown);
    }

    println!("{}", "Settings".bold());
    println!();
    println!("{}:      {}", "File".dimmed(), path.display());
    println!("{}:   {}", "Configs".dimmed(), shown.config_dir.display());
    println!("{}:  {}", "Mesh CLI".dimmed(), shown.mesh_cli.display());
    println!(
        "{}:    {}",
        "Secret".dimmed(),
        if shown.sync_secret.is_empty() {
            "not set".yellow()
        } else {
            shown.sync_secret.normal()
        }
    );
    println!("{}:    {}", "Listen".dimmed(), shown.bind_address().cyan());
    println!(
        "{}:  ping {} ms, call {} ms, cli {} ms",
        "Timeouts".dimmed(),
        shown.ping_timeout_ms,
        shown.call_timeout_ms,
        shown.cli_timeout_ms
    );
    Ok(())
}
