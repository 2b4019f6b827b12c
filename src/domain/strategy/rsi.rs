//! RSI reversal with a stop-loss and a 2:1 take-profit.
//!
//! Entry: RSI(period) below `oversold`, once `period + 5` bars of history
//! exist so the first readings after warm-up are skipped.
//! Exit: P&L% below `-stop_loss * 100`, P&L% above `stop_loss * 200`, or
//! RSI(period) above `overbought`.

use crate::domain::error::{Result, TradesimError};
use crate::domain::indicator::rsi_at;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter, pnl_pct};

pub const NAME: &str = "rsi";

const ENTRY_SETTLE_BARS: usize = 5;
const TAKE_PROFIT_RATIO: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct RsiReversal {
    period: usize,
    oversold: f64,
    overbought: f64,
    stop_loss: f64,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl RsiReversal {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(NAME, params);
        let period = reader.bars("period", 14, 2)?;
        let oversold = reader.bounded("oversold", 40.0, 0.0, 100.0)?;
        let overbought = reader.bounded("overbought", 60.0, 0.0, 100.0)?;
        let stop_loss = reader.positive("stop_loss", 0.03)?;
        let position_size = reader.fraction("position_size", 0.2)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        if oversold >= overbought {
            return Err(TradesimError::invalid_param(
                NAME,
                "oversold",
                format!("must be below overbought ({overbought}), got {oversold}"),
            ));
        }

        Ok(RsiReversal {
            period,
            oversold,
            overbought,
            stop_loss,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }

    fn warmup(&self) -> usize {
        self.period.saturating_add(ENTRY_SETTLE_BARS)
    }
}

impl Strategy for RsiReversal {
    fn name(&self) -> &str {
        NAME
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        if window.index() < self.warmup() {
            return false;
        }
        rsi_at(window.bars(), self.period).is_some_and(|rsi| rsi < self.oversold)
    }

    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool {
        let pnl = pnl_pct(window, position);
        let stop = self.stop_loss * 100.0;
        if pnl < -stop || pnl > stop * TAKE_PROFIT_RATIO {
            return true;
        }
        rsi_at(window.bars(), self.period).is_some_and(|rsi| rsi > self.overbought)
    }

    fn filter(&self, window: &Window<'_>) -> bool {
        self.volume_filter.allows(window)
    }

    fn position_size(&self) -> f64 {
        self.position_size
    }

    fn params(&self) -> &StrategyParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;

    fn strategy(params: StrategyParams) -> RsiReversal {
        RsiReversal::from_params(&params).unwrap()
    }

    #[test]
    fn defaults() {
        let s = strategy(StrategyParams::new());
        assert_eq!(s.name(), "rsi");
        assert_eq!(s.position_size(), 0.2);
        assert_eq!(s.params().get("oversold"), Some(40.0));
        assert_eq!(s.params().get("overbought"), Some(60.0));
        assert_eq!(s.params().get("stop_loss"), Some(0.03));
    }

    #[test]
    fn no_entry_during_warmup() {
        // Falling closes: RSI is 0 from index 14, but entry waits for index 19.
        let closes: Vec<f64> = (0..25).map(|i| 100.0 - i as f64).collect();
        let series = series_from_closes(&closes);
        let s = strategy(StrategyParams::new());
        for i in 0..19 {
            assert!(!s.entry_condition(&series.window(i).unwrap()), "bar {i}");
        }
        assert!(s.entry_condition(&series.window(19).unwrap()));
    }

    #[test]
    fn no_entry_when_not_oversold() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let s = strategy(StrategyParams::new());
        assert!(!s.entry_condition(&series.window(24).unwrap()));
    }

    #[test]
    fn exit_on_stop_loss_and_take_profit() {
        let series = series_from_closes(&[100.0, 96.9, 106.1, 105.0]);
        let s = strategy(StrategyParams::new());
        let position = position_at(&series, 0);
        // -3.1% breaches the 3% stop.
        assert!(s.exit_condition(&series.window(1).unwrap(), &position));
        // +6.1% clears the 6% take-profit.
        assert!(s.exit_condition(&series.window(2).unwrap(), &position));
        // +5% with too little history for RSI: hold.
        assert!(!s.exit_condition(&series.window(3).unwrap(), &position));
    }

    #[test]
    fn exit_on_overbought() {
        let mut closes = vec![100.0; 15];
        closes.push(101.0);
        let series = series_from_closes(&closes);
        let s = strategy(StrategyParams::new().with("stop_loss", 0.5));
        let position = position_at(&series, 14);
        // Only a gain in the last 14 changes: RSI 100.
        assert!(s.exit_condition(&series.window(15).unwrap(), &position));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let params = StrategyParams::new()
            .with("oversold", 70.0)
            .with("overbought", 30.0);
        assert!(RsiReversal::from_params(&params).is_err());
    }

    #[test]
    fn rejects_short_period() {
        assert!(RsiReversal::from_params(&StrategyParams::new().with("period", 1.0)).is_err());
    }
}
