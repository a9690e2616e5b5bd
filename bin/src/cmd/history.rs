//! History command implementation.

use crate::settings::Settings;
use anyhow::Result;
use cima_history::HistoryStore;

/// Print the most recent history entries, newest first.
pub(crate) async fn show_history(
    settings: &Settings,
    universe: Option<String>,
    limit: usize,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Ranking History                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let load = HistoryStore::load(&settings.history.path, settings.history.config());
    if let Some(warning) = &load.warning {
        println!("Warning: {warning}\n");
    }
    let store = load.store;
    println!(
        "{} ({} of at most {} days)\n",
        settings.history.path.display(),
        store.len(),
        store.config().retention_limit
    );

    // Accept a universe id as well as its display name.
    let name = universe.map(|key| {
        settings
            .universe(&key)
            .map_or(key, |u| u.name.clone())
    });

    for (date, entry) in store.entries_desc().take(limit) {
        println!("{date}");
        for universe in entry.universes() {
            if name.as_deref().is_some_and(|n| n != universe) {
                continue;
            }
            if let Some(tiers) = entry.get(universe) {
                println!("  {universe}");
                println!("    top10:     {}", tiers.top10.join(", "));
                println!("    ultraTop5: {}", tiers.ultra_top5.join(", "));
            }
        }
        println!();
    }

    if store.is_empty() {
        println!("No history recorded yet.\n");
    }
    Ok(())
}
