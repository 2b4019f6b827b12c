//! Trailing volume statistics.

use crate::domain::indicator::mean;
use crate::domain::ohlcv::OhlcvBar;

/// Mean volume of `bars`, missing volumes counted as 0. Empty slice gives 0.
pub fn mean_volume(bars: &[OhlcvBar]) -> f64 {
    mean(bars.iter().map(|b| b.volume_or_zero()))
}
