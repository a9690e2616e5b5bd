//! Changes command implementation.

use crate::settings::Settings;
use anyhow::Result;
use cima_history::{ChangeAnalyzer, HistoryStore, Tier};

/// Print position changes between the two latest runs of each universe.
pub(crate) async fn show_changes(
    settings: &Settings,
    universe: Option<String>,
    tier: Tier,
    depth: Option<usize>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Ranking Changes                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let load = HistoryStore::load(&settings.history.path, settings.history.config());
    if let Some(warning) = &load.warning {
        println!("Warning: {warning}\n");
    }
    let store = load.store;

    let analyzer = ChangeAnalyzer::new(tier, depth.unwrap_or_else(|| tier.size()));
    let names: Vec<String> = match universe {
        Some(key) => vec![settings.universe(&key).map_or(key, |u| u.name.clone())],
        None => settings.universes.iter().map(|u| u.name.clone()).collect(),
    };

    for name in names {
        match analyzer.report(&store, &name) {
            Some(report) => {
                println!(
                    "{name}: {} {} vs {}",
                    report.tier, report.current, report.previous
                );
                for change in &report.changes {
                    println!("  {change}");
                }
                let moved = report.moved().count();
                println!("  {moved} of {} positions changed", report.changes.len());
            }
            None => println!("{name}: fewer than two runs recorded"),
        }
        println!();
    }
    Ok(())
}
