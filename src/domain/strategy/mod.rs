//! Strategy abstraction and built-in variants.
//!
//! A strategy is a pure decision unit: given the history visible at the
//! current bar it says whether to enter, whether to exit an open position,
//! and how much of the initial balance to commit. Variants hold nothing but
//! their construction parameters, so one instance can be shared across
//! instrument partitions and threads.

pub mod breakout;
pub mod mean_reversion;
pub mod momentum;
pub mod params;
pub mod registry;
pub mod rsi;
pub mod scalper;
pub mod volume_momentum;

use std::fmt;

use crate::domain::error::Result;
use crate::domain::indicator::mean_volume;
use crate::domain::position::Position;
use crate::domain::series::Window;

pub use params::{ParamReader, StrategyParams};
pub use registry::StrategyRegistry;

pub trait Strategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Whether to open a position at the window's current bar.
    /// Returns false until the strategy's warm-up history is available.
    fn entry_condition(&self, window: &Window<'_>) -> bool;

    /// Whether to close `position` at the window's current bar.
    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool;

    /// Pre-entry gate applied alongside `entry_condition`.
    fn filter(&self, _window: &Window<'_>) -> bool {
        true
    }

    /// Fraction of the initial balance committed to each position, in (0, 1].
    fn position_size(&self) -> f64;

    /// Parameters the strategy runs with, defaults included.
    fn params(&self) -> &StrategyParams;
}

/// Percentage P&L of `position` at the window's current close.
pub fn pnl_pct(window: &Window<'_>, position: &Position) -> f64 {
    position.pnl_pct(window.close())
}

const VOLUME_FILTER_MIN_INDEX: usize = 5;

/// Rejects entries on bars whose volume is well below the recent average.
///
/// Off unless `min_volume` is set. Series without a volume column always
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeFilter {
    enabled: bool,
    window: usize,
    min_ratio: f64,
}

impl VolumeFilter {
    pub fn from_params(reader: &mut ParamReader<'_>) -> Result<Self> {
        Ok(VolumeFilter {
            enabled: reader.flag("min_volume", false)?,
            window: reader.bars("filter_window", 10, 1)?,
            min_ratio: reader.positive("min_volume_ratio", 0.5)?,
        })
    }

    pub fn allows(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        if !self.enabled || !window.has_volume() || index < VOLUME_FILTER_MIN_INDEX {
            return true;
        }

        let start = index.saturating_sub(self.window);
        let avg = mean_volume(&window.bars()[start..index]);
        let volume = window.volume_at(index);

        !(avg > 0.0 && volume < avg * self.min_ratio)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::position::Position;
    use crate::domain::series::PriceSeries;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    pub fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(i as i64)
    }

    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                instrument: "TEST".into(),
                timestamp: ts(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: None,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    pub fn series_with_volume(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| OhlcvBar {
                instrument: "TEST".into(),
                timestamp: ts(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: Some(volume),
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    pub fn position_at(series: &PriceSeries, index: usize) -> Position {
        let bar = &series.bars()[index];
        Position::open("TEST", 100.0, bar.close, bar.timestamp, index)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn filter(params: StrategyParams) -> VolumeFilter {
        let mut reader = ParamReader::new("test", &params);
        let filter = VolumeFilter::from_params(&mut reader).unwrap();
        reader.finish().unwrap();
        filter
    }

    #[test]
    fn volume_filter_off_by_default() {
        let series = series_with_volume(&[1.0; 8], &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 1.0]);
        let f = filter(StrategyParams::new());
        assert!(f.allows(&series.window(7).unwrap()));
    }

    #[test]
    fn volume_filter_rejects_thin_bar() {
        let series = series_with_volume(&[1.0; 8], &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 40.0]);
        let f = filter(StrategyParams::new().with("min_volume", 1.0));
        assert!(!f.allows(&series.window(7).unwrap()));
    }

    #[test]
    fn volume_filter_accepts_normal_bar() {
        let series = series_with_volume(&[1.0; 8], &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 60.0]);
        let f = filter(StrategyParams::new().with("min_volume", 1.0));
        assert!(f.allows(&series.window(7).unwrap()));
    }

    #[test]
    fn volume_filter_skips_early_bars_and_missing_volume() {
        let f = filter(StrategyParams::new().with("min_volume", 1.0));

        let series = series_with_volume(&[1.0; 5], &[100.0, 100.0, 100.0, 100.0, 1.0]);
        assert!(f.allows(&series.window(4).unwrap()));

        let series = series_from_closes(&[1.0; 8]);
        assert!(f.allows(&series.window(7).unwrap()));
    }

    #[test]
    fn volume_filter_zero_average_passes() {
        let series = series_with_volume(&[1.0; 7], &[0.0; 7]);
        let f = filter(StrategyParams::new().with("min_volume", 1.0));
        assert!(f.allows(&series.window(6).unwrap()));
    }

    #[test]
    fn pnl_pct_at_current_close() {
        let series = series_from_closes(&[10.0, 11.0]);
        let position = position_at(&series, 0);
        let pct = pnl_pct(&series.window(1).unwrap(), &position);
        assert!((pct - 10.0).abs() < 1e-9);
    }
}
