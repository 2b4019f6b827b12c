//! SMA (Simple Moving Average) indicator.
//!
//! SMA(n)[i] = mean of closes i-n+1 ..= i
//! Warmup: undefined until n bars are available.

use crate::domain::indicator::mean;
use crate::domain::ohlcv::OhlcvBar;

pub fn sma_at(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    Some(mean(bars[bars.len() - period..].iter().map(|b| b.close)))
}
