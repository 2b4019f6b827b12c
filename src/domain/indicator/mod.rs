//! Technical indicators evaluated at the last bar of a history slice.
//!
//! Every function takes the bars visible to a strategy (`Window::bars()`)
//! and reads only the tail it needs. `None` means the history is too short
//! for the indicator to be defined; no function returns NaN.

pub mod extremes;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use extremes::highest_high;
pub use rsi::rsi_at;
pub use sma::sma_at;
pub use volume::mean_volume;

/// Arithmetic mean, 0 for an empty iterator.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
