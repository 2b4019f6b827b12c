//! Per-instrument simulation loop.
//!
//! Each instrument partition runs independently against its own capital
//! sleeve. At every bar an open position is offered to the exit rule first;
//! only a position that was flat at the start of the bar may be opened.
//! Whatever is still open after the last bar is closed at that bar's close.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::account::Account;
use crate::domain::error::{Result, TradesimError};
use crate::domain::position::{Position, Trade};
use crate::domain::series::PriceSeries;
use crate::domain::strategy::Strategy;

pub const DEFAULT_MIN_BARS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    /// Partitions with fewer observations are skipped.
    pub min_bars: usize,
    /// Run partitions on the rayon pool.
    pub parallel: bool,
}

impl BacktestConfig {
    pub fn new(initial_balance: f64) -> Result<Self> {
        if !initial_balance.is_finite() || initial_balance <= 0.0 {
            return Err(TradesimError::ConfigInvalid {
                section: "backtest".into(),
                key: "initial_balance".into(),
                reason: format!("must be a positive number, got {initial_balance}"),
            });
        }
        Ok(BacktestConfig {
            initial_balance,
            min_bars: DEFAULT_MIN_BARS,
            parallel: false,
        })
    }

    pub fn with_min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = min_bars;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Exposure of one instrument between bars.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    Long(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientBars { available: usize, required: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InsufficientBars {
                available,
                required,
            } => write!(f, "{available} bars, need {required}"),
        }
    }
}

/// Outcome of simulating one instrument partition.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRun {
    pub instrument: String,
    pub bars: usize,
    pub trades: Vec<Trade>,
    /// Sleeve balance after the final exit.
    pub final_balance: f64,
    pub skipped: Option<SkipReason>,
}

impl InstrumentRun {
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_balance: f64,
    /// One entry per input partition, in input order.
    pub runs: Vec<InstrumentRun>,
}

impl BacktestResult {
    /// All closed trades, partition by partition, each in exit order.
    pub fn trades(&self) -> Vec<Trade> {
        self.runs.iter().flat_map(|r| r.trades.iter().cloned()).collect()
    }

    pub fn skipped(&self) -> Vec<(&str, SkipReason)> {
        self.runs
            .iter()
            .filter_map(|r| r.skipped.map(|reason| (r.instrument.as_str(), reason)))
            .collect()
    }
}

/// Simulate `strategy` over one instrument series.
pub fn run_instrument(
    series: &PriceSeries,
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> InstrumentRun {
    let instrument = series.instrument().to_string();

    if series.len() < config.min_bars {
        let reason = SkipReason::InsufficientBars {
            available: series.len(),
            required: config.min_bars,
        };
        warn!(instrument = %instrument, %reason, "skipping instrument");
        return InstrumentRun {
            instrument,
            bars: series.len(),
            trades: Vec::new(),
            final_balance: config.initial_balance,
            skipped: Some(reason),
        };
    }

    let mut account = Account::new(config.initial_balance, strategy.position_size());
    let mut state = PositionState::Flat;
    let mut trades = Vec::new();

    for (index, bar) in series.bars().iter().enumerate() {
        let Some(window) = series.window(index) else {
            break;
        };

        // A bar that closes a position ends Flat without consulting entry.
        state = match state {
            PositionState::Long(position) if strategy.exit_condition(&window, &position) => {
                let trade = position.close(bar.close, bar.timestamp, index);
                account.credit_exit(&trade);
                debug!(
                    instrument = %instrument,
                    index,
                    price = trade.exit_price,
                    pnl = trade.pnl,
                    "position closed"
                );
                trades.push(trade);
                PositionState::Flat
            }
            PositionState::Long(position) => PositionState::Long(position),
            PositionState::Flat => {
                if bar.has_tradable_close()
                    && strategy.entry_condition(&window)
                    && strategy.filter(&window)
                {
                    let position = Position::open(
                        &instrument,
                        account.allocation,
                        bar.close,
                        bar.timestamp,
                        index,
                    );
                    account.debit_entry(&position);
                    debug!(
                        instrument = %instrument,
                        index,
                        price = position.entry_price,
                        quantity = position.quantity,
                        "position opened"
                    );
                    PositionState::Long(position)
                } else {
                    PositionState::Flat
                }
            }
        };
    }

    if let (PositionState::Long(position), Some(last)) = (state, series.last()) {
        let trade = position.close(last.close, last.timestamp, series.len() - 1);
        account.credit_exit(&trade);
        debug!(instrument = %instrument, pnl = trade.pnl, "position marked to close");
        trades.push(trade);
    }

    info!(
        instrument = %instrument,
        bars = series.len(),
        trades = trades.len(),
        pnl = account.realized_pnl(),
        "instrument complete"
    );

    InstrumentRun {
        instrument,
        bars: series.len(),
        trades,
        final_balance: account.balance,
        skipped: None,
    }
}

/// Simulate every partition with its own sleeve; output follows input order.
pub fn run_backtest(
    partitions: &[PriceSeries],
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> BacktestResult {
    let runs = if config.parallel {
        partitions
            .par_iter()
            .map(|series| run_instrument(series, strategy, config))
            .collect()
    } else {
        partitions
            .iter()
            .map(|series| run_instrument(series, strategy, config))
            .collect()
    };

    BacktestResult {
        initial_balance: config.initial_balance,
        runs,
    }
}
