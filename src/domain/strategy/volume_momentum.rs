//! Momentum confirmed by above-average volume.

use crate::domain::error::Result;
use crate::domain::indicator::mean_volume;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter, pnl_pct};

pub const NAME: &str = "vol_momentum";

const ENTRY_SETTLE_BARS: usize = 5;
const TAKE_PROFIT_RATIO: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct VolumeMomentum {
    lookback: usize,
    price_gain: f64,
    volume_window: usize,
    volume_multiplier: f64,
    reversal: f64,
    stop_loss: f64,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl VolumeMomentum {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(NAME, params);
        let lookback = reader.bars("lookback", 3, 2)?;
        let price_gain = reader.non_negative("price_gain", 0.015)?;
        let volume_window = reader.bars("volume_window", 5, 1)?;
        let volume_multiplier = reader.non_negative("volume_multiplier", 1.2)?;
        let reversal = reader.non_negative("reversal", 0.02)?;
        let stop_loss = reader.positive("stop_loss", 0.02)?;
        let position_size = reader.fraction("position_size", 0.15)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(VolumeMomentum {
            lookback,
            price_gain,
            volume_window,
            volume_multiplier,
            reversal,
            stop_loss,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }

    fn price_up(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        let first = window.close_at(index - self.lookback);
        let last = window.close_at(index - 1);
        last > first * (1.0 + self.price_gain)
    }

    /// Passes when there is no volume history to compare against.
    fn volume_up(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        let start = index.saturating_sub(self.volume_window);
        let avg = mean_volume(&window.bars()[start..index]);
        if avg <= 0.0 {
            return true;
        }
        window.volume_at(index) > avg * self.volume_multiplier
    }
}

impl Strategy for VolumeMomentum {
    fn name(&self) -> &str {
        NAME
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        if window.index() < self.lookback.saturating_add(ENTRY_SETTLE_BARS) {
            return false;
        }
        self.price_up(window) && self.volume_up(window)
    }

    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool {
        let pnl = pnl_pct(window, position);
        let stop = self.stop_loss * 100.0;
        if pnl < -stop || pnl > stop * TAKE_PROFIT_RATIO {
            return true;
        }

        let index = window.index();
        index > 2 && window.close_at(index - 1) < window.close_at(index - 2) * (1.0 - self.reversal)
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
