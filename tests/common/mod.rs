#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::path::PathBuf;
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::ohlcv::OhlcvBar;
use tradesim::domain::series::PriceSeries;
use tradesim::ports::data_port::DataPort;
use tradesim::ports::report_port::{ReportPort, RunRecord};

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<OhlcvBar>) -> Self {
        self.bars.extend(bars);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_observations(&self) -> Result<Vec<OhlcvBar>, TradesimError> {
        if let Some(reason) = &self.error {
            return Err(TradesimError::NoData {
                source_name: self.source_name(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn source_name(&self) -> String {
        "mock".to_string()
    }
}

/// Records every run handed to it.
pub struct MockReportPort {
    pub calls: RefCell<Vec<RunRecord>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, record: &RunRecord) -> Result<Option<PathBuf>, TradesimError> {
        self.calls.borrow_mut().push(record.clone());
        Ok(None)
    }
}

/// Hourly timestamps from 2024-01-01 00:00.
pub fn hour(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub fn make_bar(instrument: &str, i: usize, close: f64) -> OhlcvBar {
    OhlcvBar {
        instrument: instrument.to_string(),
        timestamp: hour(i),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: Some(1000.0),
    }
}

pub fn bars_from_closes(instrument: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(instrument, i, close))
        .collect()
}

pub fn series_from_closes(instrument: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(instrument, bars_from_closes(instrument, closes)).unwrap()
}

/// Rises 100..=115, falls 3 per bar to 91, then climbs 4 per bar to 131.
///
/// With RSI(14), oversold 40, overbought 60 this enters at bar 20 (close
/// 100, RSI 37.5) and exits at bar 31 (close 123, RSI 64).
pub fn rsi_swing_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
    closes.extend((1..=8).map(|k| 115.0 - 3.0 * k as f64));
    closes.extend((1..=10).map(|k| 91.0 + 4.0 * k as f64));
    closes
}

/// Interleave several instruments' bars by timestamp, as a CSV export would.
pub fn interleave(parts: Vec<Vec<OhlcvBar>>) -> Vec<OhlcvBar> {
    let mut all: Vec<OhlcvBar> = parts.into_iter().flatten().collect();
    all.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    all
}
