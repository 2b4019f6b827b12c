//! Short-horizon scalping after a run of rising closes.

use crate::domain::error::Result;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter, pnl_pct};

pub const NAME: &str = "scalper";

#[derive(Debug, Clone)]
pub struct Scalper {
    consecutive: usize,
    gain_threshold: f64,
    stop_loss: f64,
    max_hold_bars: usize,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl Scalper {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(NAME, params);
        let consecutive = reader.bars("consecutive", 3, 2)?;
        let gain_threshold = reader.positive("gain_threshold", 0.015)?;
        let stop_loss = reader.positive("stop_loss", 0.01)?;
        let max_hold_bars = reader.bars("max_hold_bars", 4, 1)?;
        let position_size = reader.fraction("position_size", 0.1)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(Scalper {
            consecutive,
            gain_threshold,
            stop_loss,
            max_hold_bars,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }
}

impl Strategy for Scalper {
    fn name(&self) -> &str {
        NAME
    }

    /// The `consecutive` closes before the current bar strictly increase.
    fn entry_condition(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        if index < self.consecutive {
            return false;
        }
        window.bars()[index - self.consecutive..index]
            .windows(2)
            .all(|pair| pair[1].close > pair[0].close)
    }

    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool {
        let pnl = pnl_pct(window, position);
        pnl > self.gain_threshold * 100.0
            || pnl < -self.stop_loss * 100.0
            || position.bars_held(window.index()) >= self.max_hold_bars
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
