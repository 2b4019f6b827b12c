//! RSI (Relative Strength Index) over a rolling window.
//!
//! Uses simple rolling means, not Wilder's smoothing:
//! - gain: mean of positive close-to-close changes over the last n changes
//! - loss: mean of absolute negative changes over the same n changes
//!
//! Formula: RSI = 100 - (100 / (1 + gain / loss))
//! If loss == 0: RSI = 100
//!
//! Warmup: n changes need n + 1 bars, so RSI is undefined before index n.

use crate::domain::ohlcv::OhlcvBar;

pub fn rsi_at(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    let needed = period.saturating_add(1);
    if period == 0 || bars.len() < needed {
        return None;
    }

    let tail = &bars[bars.len() - needed..];
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for pair in tail.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            gain_sum += change;
        } else if change < 0.0 {
            loss_sum -= change;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.is_finite().then_some(rsi)
}
