//! Highest high over a slice of bars.

use crate::domain::ohlcv::OhlcvBar;

/// Maximum `high` in `bars`, `None` when empty.
pub fn highest_high(bars: &[OhlcvBar]) -> Option<f64> {
    bars.iter().map(|b| b.high).fold(None, |acc, h| match acc {
        Some(max) if max >= h => Some(max),
        _ => Some(h),
    })
}
