//! CSV file data adapter.
//!
//! Reads one file holding every instrument, with a header row naming the
//! columns `timestamp, open, high, low, close, instrument_id` (or `coin`)
//! and an optional `volume`. Extra columns are ignored.

use crate::domain::error::{Result, TradesimError};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(alias = "coin")]
    instrument_id: String,
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn no_data(&self, reason: impl Into<String>) -> TradesimError {
        TradesimError::NoData {
            source_name: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Parse CSV content. Rows without a close (gaps left by resampling)
    /// are dropped; missing open/high/low fall back to the close.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<OhlcvBar>> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut bars = Vec::new();
        let mut gaps = 0usize;

        for (row_number, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            let Some(close) = row.close else {
                gaps += 1;
                continue;
            };
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                TradesimError::InvalidSchema {
                    reason: format!(
                        "row {}: unrecognised timestamp '{}'",
                        row_number + 1,
                        row.timestamp
                    ),
                }
            })?;
            let prices = [
                ("open", row.open),
                ("high", row.high),
                ("low", row.low),
                ("close", Some(close)),
                ("volume", row.volume),
            ];
            if let Some((column, value)) = prices
                .iter()
                .find_map(|(column, v)| v.filter(|x| !x.is_finite()).map(|x| (column, x)))
            {
                return Err(TradesimError::InvalidSchema {
                    reason: format!("row {}: non-finite {column} '{value}'", row_number + 1),
                });
            }
            if row.instrument_id.is_empty() {
                return Err(TradesimError::InvalidSchema {
                    reason: format!("row {}: empty instrument_id", row_number + 1),
                });
            }

            bars.push(OhlcvBar {
                instrument: row.instrument_id,
                timestamp,
                open: row.open.unwrap_or(close),
                high: row.high.unwrap_or(close),
                low: row.low.unwrap_or(close),
                close,
                volume: row.volume,
            });
        }

        if gaps > 0 {
            debug!(rows = gaps, "dropped rows without a close");
        }
        Ok(bars)
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (either with
/// optional fractional seconds) and bare dates at midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl DataPort for CsvAdapter {
    fn fetch_observations(&self) -> Result<Vec<OhlcvBar>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(self.no_data("file not found"));
            }
            Err(e) => return Err(e.into()),
        };

        let bars = Self::parse(file)?;
        if bars.is_empty() {
            return Err(self.no_data("no observations"));
        }
        info!(path = %self.path.display(), rows = bars.len(), "loaded observations");
        Ok(bars)
    }

    fn source_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
