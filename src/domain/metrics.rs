//! Performance metrics over a closed-trade log.

use serde::{Deserialize, Serialize};

use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub instrument_id: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}

impl From<&Trade> for TradeSummary {
    fn from(trade: &Trade) -> Self {
        TradeSummary {
            instrument_id: trade.instrument.clone(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            pnl: trade.pnl,
            pnl_pct: trade.pnl_pct,
        }
    }
}

/// Aggregate results of a run. Every field is finite, including for an
/// empty trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_trades: usize,
    pub profitable: usize,
    pub losing: usize,
    pub breakeven: usize,
    /// Percentage of trades with positive pnl.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_profit: f64,
    /// Mean of losing pnls; negative or zero.
    pub avg_loss: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub final_balance: f64,
    pub return_pct: f64,
    pub trades: Vec<TradeSummary>,
}

impl Metrics {
    pub fn compute(trades: &[Trade], initial_balance: f64) -> Self {
        let mut profitable = 0usize;
        let mut losing = 0usize;
        let mut breakeven = 0usize;
        let mut total_profit = 0.0_f64;
        let mut total_loss = 0.0_f64;
        let mut max_profit = 0.0_f64;
        let mut max_loss = 0.0_f64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                profitable += 1;
                total_profit += pnl;
                max_profit = max_profit.max(pnl);
            } else if pnl < 0.0 {
                losing += 1;
                total_loss += pnl;
                max_loss = max_loss.min(pnl);
            } else {
                breakeven += 1;
            }
        }

        let total_trades = trades.len();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();

        let win_rate = if total_trades > 0 {
            profitable as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_profit = if profitable > 0 {
            total_profit / profitable as f64
        } else {
            0.0
        };

        let avg_loss = if losing > 0 {
            total_loss / losing as f64
        } else {
            0.0
        };

        let return_pct = if initial_balance > 0.0 {
            total_pnl / initial_balance * 100.0
        } else {
            0.0
        };

        Metrics {
            total_trades,
            profitable,
            losing,
            breakeven,
            win_rate,
            total_pnl,
            avg_profit,
            avg_loss,
            max_profit,
            max_loss,
            final_balance: initial_balance + total_pnl,
            return_pct,
            trades: trades.iter().map(TradeSummary::from).collect(),
        }
    }
}

/// Trade count, win rate and pnl for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub instrument: String,
    pub total_trades: usize,
    pub profitable: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

impl InstrumentSummary {
    /// One summary per instrument, in order of first appearance.
    pub fn compute_per_instrument(trades: &[Trade]) -> Vec<Self> {
        let mut summaries: Vec<InstrumentSummary> = Vec::new();

        for trade in trades {
            let idx = match summaries
                .iter()
                .position(|s| s.instrument == trade.instrument)
            {
                Some(idx) => idx,
                None => {
                    summaries.push(InstrumentSummary {
                        instrument: trade.instrument.clone(),
                        total_trades: 0,
                        profitable: 0,
                        win_rate: 0.0,
                        total_pnl: 0.0,
                    });
                    summaries.len() - 1
                }
            };

            let summary = &mut summaries[idx];
            summary.total_trades += 1;
            summary.total_pnl += trade.pnl;
            if trade.is_win() {
                summary.profitable += 1;
            }
        }

        for summary in &mut summaries {
            summary.win_rate = summary.profitable as f64 / summary.total_trades as f64 * 100.0;
        }
        summaries
    }
}
