//! Rank command implementation.

use crate::data::{self, FileSource};
use crate::report::RunReport;
use crate::settings::Settings;
use anyhow::Result;
use chrono::Utc;
use cima_engine::{RankingEngine, RankingOutcome};
use cima_history::{ChangeAnalyzer, HistoryStore, TierPair};
use cima_traits::{RetryingSource, Universe};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Options for one ranking run.
#[derive(Debug)]
pub(crate) struct RankArgs {
    pub(crate) prices: Option<PathBuf>,
    pub(crate) universes: Vec<String>,
    pub(crate) date: Option<String>,
    pub(crate) dry_run: bool,
}

/// Rank every selected universe, then update history and the run report.
pub(crate) async fn run_rank(settings: &Settings, args: RankArgs) -> Result<()> {
    let started = Instant::now();

    let run_date = match &args.date {
        Some(d) => data::parse_date(d)?,
        None => Utc::now().date_naive(),
    };
    let environment = settings.environment();
    let universes = settings.selected_universes(&args.universes)?;
    let prices = settings.prices(args.prices)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Momentum Ranking                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Run date:    {run_date}");
    println!("Environment: {environment}");
    println!("Prices:      {}", prices.display());
    println!("Universes:   {}", universes.len());
    println!();

    let source = Arc::new(RetryingSource::new(
        FileSource::open(&prices)?,
        settings.retry.clone(),
    ));
    let engine = Arc::new(RankingEngine::new(settings.engine.clone())?);
    info!(
        policy = engine.policy_name(),
        universes = universes.len(),
        %environment,
        "ranking run started"
    );

    let outcomes = rank_all(&engine, &source, universes).await?;

    // Fold every snapshot into one history update.
    let record = |store: &mut HistoryStore| {
        for (_, outcome) in &outcomes {
            if let Some(snapshot) = outcome.snapshot() {
                store.record(run_date, &snapshot.universe_name, TierPair::from(snapshot));
            }
        }
    };

    let mut report = RunReport::new(environment);
    for (universe, outcome) in &outcomes {
        report
            .rankings
            .insert(universe.id.clone(), outcome.snapshot().cloned());
    }

    let history = &settings.history;
    let load = if args.dry_run {
        println!("Dry run: history and report left untouched\n");
        let mut load = HistoryStore::load(&history.path, history.config());
        record(&mut load.store);
        load
    } else {
        let load = match HistoryStore::update(&history.path, history.config(), &record) {
            Ok(load) => {
                println!("History saved: {}", history.path.display());
                load
            }
            Err(e) => {
                error!(error = %e, "history not saved");
                println!("Failed to save history: {e}");
                let mut load = HistoryStore::load(&history.path, history.config());
                record(&mut load.store);
                load
            }
        };
        match report.write(&settings.output) {
            Ok(()) => println!("Report saved:  {}", settings.output.display()),
            Err(e) => {
                error!(error = %e, "report not saved");
                println!("Failed to save report: {e:#}");
            }
        }
        println!();
        load
    };
    if let Some(warning) = &load.warning {
        println!("Warning: {warning}; started a fresh history");
    }
    let store = load.store;

    print_summary(&outcomes, &store);

    let elapsed = started.elapsed().as_secs_f64();
    info!(seconds = elapsed, "ranking run finished");
    println!("Total time: {elapsed:.1}s\n");

    if let Some(path) = env::var_os("GITHUB_OUTPUT") {
        if let Err(e) = report.append_step_outputs(Path::new(&path), elapsed) {
            warn!(error = %e, "step outputs not written");
        }
    }
    Ok(())
}

/// Rank universes in parallel on blocking workers, keeping their order.
async fn rank_all(
    engine: &Arc<RankingEngine>,
    source: &Arc<RetryingSource<FileSource>>,
    universes: Vec<Universe>,
) -> Result<Vec<(Universe, RankingOutcome)>> {
    let tasks: Vec<_> = universes
        .into_iter()
        .map(|universe| {
            let engine = Arc::clone(engine);
            let source = Arc::clone(source);
            tokio::task::spawn_blocking(move || {
                let outcome = engine.rank_universe(&universe, &*source);
                (universe, outcome)
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        let (universe, outcome) = task.await?;
        if let RankingOutcome::NoResult(reason) = &outcome {
            warn!(universe = %universe.id, %reason, "universe skipped");
        }
        outcomes.push((universe, outcome));
    }
    Ok(outcomes)
}

fn print_summary(outcomes: &[(Universe, RankingOutcome)], store: &HistoryStore) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("SUMMARY");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let analyzer = ChangeAnalyzer::default();
    for (universe, outcome) in outcomes {
        match outcome {
            RankingOutcome::Ranked(snapshot) => {
                let lead: Vec<&str> = snapshot.top10.iter().take(5).map(String::as_str).collect();
                println!("{}:", snapshot.universe_name);
                println!("  As of:      {}", snapshot.as_of_date);
                println!("  Processed:  {} assets", snapshot.processed_asset_count);
                println!("  Top 10:     {} ...", lead.join(", "));
                println!("  Ultra top5: {}", snapshot.ultra_top5.join(", "));

                if let Some(report) = analyzer.report(store, &snapshot.universe_name) {
                    println!("  Changes since {}:", report.previous);
                    for change in &report.changes {
                        println!("    {change}");
                    }
                }
            }
            RankingOutcome::NoResult(reason) => {
                println!("{}: not ranked ({reason})", universe.name);
            }
        }
        println!();
    }
}
