//! Channel breakout with a time stop.
//!
//! Enters when the close clears the highest high of the preceding `lookback`
//! bars by `breakout_pct`, exits after `hold_bars` or once the target gain
//! is reached.

use crate::domain::error::Result;
use crate::domain::indicator::highest_high;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter, pnl_pct};

pub const NAME: &str = "breakout";

#[derive(Debug, Clone)]
pub struct Breakout {
    lookback: usize,
    breakout_pct: f64,
    hold_bars: usize,
    target: f64,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl Breakout {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(NAME, params);
        let lookback = reader.bars("lookback", 20, 1)?;
        let breakout_pct = reader.non_negative("breakout_pct", 0.01)?;
        let hold_bars = reader.bars("hold_bars", 10, 1)?;
        let target = reader.positive("target", 0.05)?;
        let position_size = reader.fraction("position_size", 1.0)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(Breakout {
            lookback,
            breakout_pct,
            hold_bars,
            target,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }
}

impl Strategy for Breakout {
    fn name(&self) -> &str {
        NAME
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        if index < self.lookback {
            return false;
        }
        let channel = &window.bars()[index - self.lookback..index];
        highest_high(channel).is_some_and(|high| window.close() > high * (1.0 + self.breakout_pct))
    }

    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool {
        position.bars_held(window.index()) >= self.hold_bars
            || pnl_pct(window, position) >= self.target * 100.0
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
