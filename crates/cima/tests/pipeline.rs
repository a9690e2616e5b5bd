//! End-to-end: price source -> engine -> history -> change analyzer.

use chrono::{Datelike, Months};
use cima::prelude::*;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

/// Daily closes on days 1..=28 for `months` months, growing `rate` per month.
fn series(asset: &str, first_month: Date, months: u32, rate: f64) -> PriceSeries {
    let mut points = Vec::new();
    for i in 0..months {
        let month = first_month + Months::new(i);
        let price = 100.0 * rate.powi(i as i32);
        for day in 1..=28 {
            points.push((d(month.year(), month.month(), day), price));
        }
    }
    PriceSeries::new(asset, points).unwrap()
}

fn universe() -> Universe {
    Universe::new(
        "test",
        "Test 100",
        ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG"]
            .map(String::from)
            .to_vec(),
    )
}

fn source(rates: &[(&str, f64)], months: u32) -> MemorySource {
    MemorySource::new(
        rates
            .iter()
            .map(|(asset, rate)| series(asset, d(2023, 1, 1), months, *rate)),
    )
}

#[test]
fn test_two_runs_produce_history_and_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let engine = RankingEngine::new(EngineConfig::default()).unwrap();
    let universe = universe();

    // Day one: AAA leads everywhere.
    let day_one = source(
        &[
            ("AAA", 1.06),
            ("BBB", 1.05),
            ("CCC", 1.04),
            ("DDD", 1.03),
            ("EEE", 1.02),
            ("FFF", 1.01),
            ("GGG", 1.00),
        ],
        13,
    );
    let first = engine
        .rank_universe(&universe, &day_one)
        .into_snapshot()
        .unwrap();
    assert_eq!(first.ultra_top5, vec!["AAA", "BBB", "CCC", "DDD", "EEE"]);

    let mut store = HistoryStore::load(&path, HistoryConfig::default()).store;
    store.record(d(2024, 2, 1), &first.universe_name, TierPair::from(&first));
    store.save(&path).unwrap();

    // Day two: one more month of data in which GGG surges.
    let mut day_two: Vec<PriceSeries> = [
        ("AAA", 1.06),
        ("BBB", 1.05),
        ("CCC", 1.04),
        ("DDD", 1.03),
        ("EEE", 1.02),
        ("FFF", 1.01),
    ]
    .iter()
    .map(|(asset, rate)| series(asset, d(2023, 1, 1), 14, *rate))
    .collect();
    let mut ggg: Vec<(Date, f64)> = series("GGG", d(2023, 1, 1), 13, 1.00).points().to_vec();
    for day in 1..=28 {
        ggg.push((d(2024, 2, day), 130.0));
    }
    day_two.push(PriceSeries::new("GGG", ggg).unwrap());

    let second = engine
        .rank_universe(&universe, &MemorySource::new(day_two))
        .into_snapshot()
        .unwrap();
    assert_eq!(second.as_of_date, d(2024, 2, 29));
    assert_eq!(second.ultra_top5[0], "GGG");

    let load = HistoryStore::load(&path, HistoryConfig::default());
    assert!(load.warning.is_none());
    let mut store = load.store;
    store.record(d(2024, 2, 2), &second.universe_name, TierPair::from(&second));
    store.save(&path).unwrap();

    let store = HistoryStore::load(&path, HistoryConfig::default()).store;
    let report = ChangeAnalyzer::default()
        .report(&store, "Test 100")
        .unwrap();
    assert_eq!(report.current, d(2024, 2, 2));
    assert_eq!(report.previous, d(2024, 2, 1));
    assert_eq!(report.changes.len(), 5);
    assert_eq!(report.changes[0].to_string(), "#1 AAA -> GGG");

    // The file is newest first.
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.find("2024-02-02").unwrap() < text.find("2024-02-01").unwrap());
}

#[test]
fn test_unrankable_universe_leaves_history_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let engine = RankingEngine::new(EngineConfig::default()).unwrap();

    // Only three months of data: nobody passes the gate.
    let outcome = engine.rank_universe(&universe(), &source(&[("AAA", 1.05), ("BBB", 1.02)], 3));
    assert_eq!(outcome, RankingOutcome::NoResult(NoResult::NoSurvivors));

    let store = HistoryStore::load(&path, HistoryConfig::default()).store;
    assert!(store.is_empty());
    assert!(ChangeAnalyzer::default().diff(&store, "Test 100").is_empty());
}

#[test]
fn test_snapshot_json_contract() {
    let engine = RankingEngine::new(EngineConfig::default()).unwrap();
    let rates = [
        ("AAA", 1.06),
        ("BBB", 1.05),
        ("CCC", 1.04),
        ("DDD", 1.03),
        ("EEE", 1.02),
    ];
    let snapshot = engine
        .rank_universe(&universe(), &source(&rates, 13))
        .into_snapshot()
        .unwrap();

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["universeName"], "Test 100");
    assert_eq!(json["asOfDate"], "2024-01-31");
    assert_eq!(json["processedAssetCount"], 5);
    assert_eq!(json["top10"].as_array().unwrap().len(), 5);
    assert_eq!(json["ultraTop5"][0], "AAA");
}
