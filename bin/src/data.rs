//! Price loading for the cima CLI.
//!
//! Prices come from local files, in one of three layouts:
//!
//! - a long-format CSV with `symbol`, `date` and `close` columns
//! - a JSON object mapping each symbol to `[{ "date": "2024-01-02", "close": 185.6 }, ...]`
//! - a directory holding one `<SYMBOL>.csv` or `<SYMBOL>.json` per asset,
//!   read lazily as each asset is requested

use chrono::NaiveDate;
use cima_traits::{CimaError, MarketData, MemorySource, PriceSeries, PriceSource, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct PricePoint {
    date: NaiveDate,
    close: f64,
}

/// Price source over a file or a directory of files.
#[derive(Debug)]
pub(crate) enum FileSource {
    /// Every series read up front from one file
    File(MemorySource),
    /// One file per asset
    Directory(PathBuf),
}

impl FileSource {
    /// Open `path` as a single price file or a per-asset directory.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }
        let series = load_file(path)?;
        Ok(Self::File(MemorySource::new(series)))
    }

    fn fetch_from_dir(dir: &Path, asset: &str) -> Result<PriceSeries> {
        for ext in ["csv", "json"] {
            let path = dir.join(format!("{asset}.{ext}"));
            match fs::metadata(&path) {
                Ok(_) => return load_asset_file(&path, asset),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CimaError::DataFetch(format!("{}: {e}", path.display()))),
            }
        }
        Err(CimaError::Unavailable(asset.to_string()))
    }
}

impl PriceSource for FileSource {
    fn name(&self) -> &str {
        match self {
            Self::File(_) => "file",
            Self::Directory(_) => "directory",
        }
    }

    fn fetch(&self, asset: &str) -> Result<PriceSeries> {
        match self {
            Self::File(source) => source.fetch(asset),
            Self::Directory(dir) => Self::fetch_from_dir(dir, asset),
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CimaError::DataFetch(format!("{}: {e}", path.display())))
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    Ok(CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?)
}

/// Load every series from a long-format CSV or a JSON mapping.
pub(crate) fn load_file(path: &Path) -> Result<Vec<PriceSeries>> {
    match extension(path).as_str() {
        "csv" => MarketData::new(read_csv(path)?).price_series(),
        "json" => {
            let text = read_text(path)?;
            let mapping: BTreeMap<String, Vec<PricePoint>> = serde_json::from_str(&text)
                .map_err(|e| CimaError::InvalidData(format!("{}: {e}", path.display())))?;
            mapping
                .into_iter()
                .map(|(asset, points)| series_from_points(asset, points))
                .collect()
        }
        other => Err(CimaError::InvalidData(format!(
            "unsupported price file extension `{other}` for {}",
            path.display()
        ))),
    }
}

/// Load one asset's file from a price directory.
fn load_asset_file(path: &Path, asset: &str) -> Result<PriceSeries> {
    match extension(path).as_str() {
        "csv" => {
            let mut df = read_csv(path)?;
            if !df.get_column_names().iter().any(|c| c.as_str() == "symbol") {
                let symbols = Series::new("symbol".into(), vec![asset; df.height()]);
                df.with_column(symbols)?;
            }
            MarketData::new(df)
                .price_series()?
                .into_iter()
                .find(|s| s.asset() == asset)
                .ok_or_else(|| CimaError::Unavailable(asset.to_string()))
        }
        _ => {
            let text = read_text(path)?;
            let points: Vec<PricePoint> = serde_json::from_str(&text)
                .map_err(|e| CimaError::InvalidData(format!("{}: {e}", path.display())))?;
            series_from_points(asset.to_string(), points)
        }
    }
}

fn series_from_points(asset: String, mut points: Vec<PricePoint>) -> Result<PriceSeries> {
    points.sort_by_key(|p| p.date);
    PriceSeries::new(asset, points.into_iter().map(|p| (p.date, p.close)).collect())
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| CimaError::InvalidDate(format!("{date_str}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("invalid").is_err());
    }

    #[test]
    fn test_load_json_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(
            &path,
            r#"{
                "MSFT": [{"date": "2024-01-03", "close": 370.6}, {"date": "2024-01-02", "close": 370.9}],
                "AAPL": [{"date": "2024-01-02", "close": 185.6}]
            }"#,
        )
        .unwrap();

        let series = load_file(&path).unwrap();
        assert_eq!(series.len(), 2);
        let msft = series.iter().find(|s| s.asset() == "MSFT").unwrap();
        assert_eq!(msft.len(), 2);
        assert_eq!(msft.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn test_load_long_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            "symbol,date,close\nAAPL,2024-01-02,185.6\nAAPL,2024-01-03,184.3\nMSFT,2024-01-02,370.9\n",
        )
        .unwrap();

        let source = FileSource::open(&path).unwrap();
        assert_eq!(source.name(), "file");
        assert_eq!(source.fetch("AAPL").unwrap().len(), 2);
        assert!(matches!(
            source.fetch("NVDA"),
            Err(CimaError::Unavailable(_))
        ));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("AAPL.csv"),
            "date,close\n2024-01-02,185.6\n2024-01-03,184.3\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("MSFT.json"),
            r#"[{"date": "2024-01-02", "close": 370.9}]"#,
        )
        .unwrap();

        let source = FileSource::open(dir.path()).unwrap();
        assert_eq!(source.name(), "directory");
        assert_eq!(source.fetch("AAPL").unwrap().len(), 2);
        assert_eq!(source.fetch("MSFT").unwrap().asset(), "MSFT");
        assert!(matches!(
            source.fetch("NVDA"),
            Err(CimaError::Unavailable(_))
        ));
    }

    #[test]
    fn test_invalid_prices_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, r#"{"AAPL": [{"date": "2024-01-02", "close": -1.0}]}"#).unwrap();
        assert!(matches!(load_file(&path), Err(CimaError::InvalidData(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_file(Path::new("prices.parquet")).is_err());
    }
}
