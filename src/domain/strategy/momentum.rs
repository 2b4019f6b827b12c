//! Price momentum: buy a rise over `lookback` bars, sell a short-term drop.

use crate::domain::error::Result;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter};

pub const NAME: &str = "momentum";

/// Bars between the current close and the close it is compared to on exit.
const EXIT_LOOKBACK: usize = 2;

#[derive(Debug, Clone)]
pub struct Momentum {
    lookback: usize,
    gain: f64,
    loss: f64,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl Momentum {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(NAME, params);
        let lookback = reader.bars("lookback", 3, 1)?;
        let gain = reader.non_negative("gain", 0.02)?;
        let loss = reader.non_negative("loss", 0.01)?;
        let position_size = reader.fraction("position_size", 1.0)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(Momentum {
            lookback,
            gain,
            loss,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        NAME
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        let index = window.index();
        if index < self.lookback {
            return false;
        }
        window.close() > window.close_at(index - self.lookback) * (1.0 + self.gain)
    }

    fn exit_condition(&self, window: &Window<'_>, _position: &Position) -> bool {
        let index = window.index();
        if index < EXIT_LOOKBACK {
            return false;
        }
        window.close() < window.close_at(index - EXIT_LOOKBACK) * (1.0 - self.loss)
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
