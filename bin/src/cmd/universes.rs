//! Universe listing command implementation.

use crate::settings::Settings;
use anyhow::Result;

/// List the configured universes.
pub(crate) async fn list_universes(settings: &Settings, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Configured Universes                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for universe in &settings.universes {
        let members = universe.members();
        println!("{:12} {} ({} members)", universe.id, universe.name, members.len());
        if verbose {
            println!("  {}", members.join(", "));
            if !universe.excluded.is_empty() {
                println!("  excluded: {}", universe.excluded.join(", "));
            }
            if let Some(limit) = universe.max_symbols {
                println!("  capped at {limit} symbols");
            }
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose to list members.\n");
    }
    Ok(())
}
