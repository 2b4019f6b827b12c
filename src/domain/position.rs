//! Open positions and closed trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_index: usize,
}

impl Position {
    /// Quantity bought with `allocation` at `price`. Callers guarantee `price > 0`.
    pub fn open(
        instrument: &str,
        allocation: f64,
        price: f64,
        time: NaiveDateTime,
        index: usize,
    ) -> Self {
        Position {
            instrument: instrument.to_string(),
            quantity: allocation / price,
            entry_price: price,
            entry_time: time,
            entry_index: index,
        }
    }

    pub fn cost(&self) -> f64 {
        self.quantity * self.entry_price
    }

    /// Percentage move from entry to `price`; 0 when the entry price is not positive.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        pnl_pct(self.entry_price, price)
    }

    /// Bars held as of `index`.
    pub fn bars_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    pub fn close(self, exit_price: f64, exit_time: NaiveDateTime, exit_index: usize) -> Trade {
        Trade {
            pnl: (exit_price - self.entry_price) * self.quantity,
            pnl_pct: pnl_pct(self.entry_price, exit_price),
            instrument: self.instrument,
            quantity: self.quantity,
            entry_price: self.entry_price,
            entry_time: self.entry_time,
            entry_index: self.entry_index,
            exit_price,
            exit_time,
            exit_index,
        }
    }
}

fn pnl_pct(entry_price: f64, price: f64) -> f64 {
    if entry_price > 0.0 {
        (price - entry_price) / entry_price * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub instrument: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_index: usize,
    pub exit_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_index: usize,
    pub pnl: f64,
    pub pnl_pct: f64,
}

impl Trade {
    pub fn proceeds(&self) -> f64 {
        self.quantity * self.exit_price
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_position() -> Position {
        Position::open("DOGE", 500.0, 0.05, at(1), 12)
    }

    #[test]
    fn open_sizes_from_allocation() {
        let pos = sample_position();
        assert!((pos.quantity - 10_000.0).abs() < 1e-9);
        assert!((pos.cost() - 500.0).abs() < 1e-9);
        assert_eq!(pos.entry_index, 12);
    }

    #[test]
    fn pnl_pct_from_entry() {
        let pos = sample_position();
        assert!((pos.pnl_pct(0.055) - 10.0).abs() < 1e-9);
        assert!((pos.pnl_pct(0.045) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn pnl_pct_zero_entry_is_zero() {
        let pos = Position {
            instrument: "DOGE".into(),
            quantity: 1.0,
            entry_price: 0.0,
            entry_time: at(1),
            entry_index: 0,
        };
        assert_eq!(pos.pnl_pct(1.0), 0.0);
        let trade = pos.close(1.0, at(2), 1);
        assert_eq!(trade.pnl_pct, 0.0);
        assert!(trade.pnl.is_finite());
    }

    #[test]
    fn bars_held_counts_from_entry() {
        let pos = sample_position();
        assert_eq!(pos.bars_held(12), 0);
        assert_eq!(pos.bars_held(16), 4);
    }

    #[test]
    fn close_realizes_trade() {
        let trade = sample_position().close(0.04, at(5), 16);
        assert_eq!(trade.instrument, "DOGE");
        assert!((trade.pnl - (0.04 - 0.05) * 10_000.0).abs() < 1e-9);
        assert!((trade.pnl_pct + 20.0).abs() < 1e-9);
        assert!((trade.proceeds() - 400.0).abs() < 1e-9);
        assert_eq!(trade.entry_time, at(1));
        assert_eq!(trade.exit_time, at(5));
        assert_eq!(trade.exit_index, 16);
        assert!(!trade.is_win());
    }
}
