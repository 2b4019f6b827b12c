//! Per-instrument price series and the no-look-ahead window view.

use crate::domain::error::{Result, TradesimError};
use crate::domain::ohlcv::OhlcvBar;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    instrument: String,
    bars: Vec<OhlcvBar>,
    has_volume: bool,
}

impl PriceSeries {
    /// Build a series, rejecting foreign bars, non-finite values and
    /// non-increasing timestamps.
    pub fn new(instrument: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self> {
        let instrument = instrument.into();

        if let Some(bar) = bars.iter().find(|b| b.instrument != instrument) {
            return Err(TradesimError::InvalidSchema {
                reason: format!(
                    "bar for {} at {} found in series {}",
                    bar.instrument, bar.timestamp, instrument
                ),
            });
        }

        if let Some(bar) = bars.iter().find(|b| !b.is_finite()) {
            return Err(TradesimError::InvalidSchema {
                reason: format!(
                    "non-finite price or volume for {} at {}",
                    instrument, bar.timestamp
                ),
            });
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            let reason = if pair[1].timestamp == pair[0].timestamp {
                format!("duplicate timestamp {} for {}", pair[1].timestamp, instrument)
            } else {
                format!(
                    "timestamps out of order for {}: {} after {}",
                    instrument, pair[1].timestamp, pair[0].timestamp
                )
            };
            return Err(TradesimError::InvalidSchema { reason });
        }

        let has_volume = bars.iter().any(|b| b.volume.is_some());
        Ok(Self {
            instrument,
            bars,
            has_volume,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn has_volume(&self) -> bool {
        self.has_volume
    }

    /// The history visible at `index`: bars `0..=index`, nothing later.
    pub fn window(&self, index: usize) -> Option<Window<'_>> {
        if index >= self.bars.len() {
            return None;
        }
        Some(Window {
            bars: &self.bars[..=index],
            has_volume: self.has_volume,
        })
    }
}

/// Group a flat observation list by instrument, keeping first-seen order.
pub fn partition_by_instrument(bars: Vec<OhlcvBar>) -> Result<Vec<PriceSeries>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<OhlcvBar>> = HashMap::new();

    for bar in bars {
        if !groups.contains_key(&bar.instrument) {
            order.push(bar.instrument.clone());
        }
        groups.entry(bar.instrument.clone()).or_default().push(bar);
    }

    order
        .into_iter()
        .map(|instrument| {
            let bars = groups.remove(&instrument).unwrap_or_default();
            PriceSeries::new(instrument, bars)
        })
        .collect()
}

/// Read-only prefix of a series ending at the current bar.
///
/// Strategies only ever see a `Window`, so they cannot read observations
/// after the bar being decided on.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    bars: &'a [OhlcvBar],
    has_volume: bool,
}

impl<'a> Window<'a> {
    /// Index of the current bar within the full series.
    pub fn index(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn current(&self) -> &'a OhlcvBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn close(&self) -> f64 {
        self.current().close
    }

    /// Close at `i`; callers stay within `0..=index()`.
    pub fn close_at(&self, i: usize) -> f64 {
        self.bars[i].close
    }

    pub fn bars(&self) -> &'a [OhlcvBar] {
        self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volume_at(&self, i: usize) -> f64 {
        self.bars[i].volume_or_zero()
    }

    /// True when the underlying series carries a volume column.
    pub fn has_volume(&self) -> bool {
        self.has_volume
    }
}
