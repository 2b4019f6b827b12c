//! Mean reversion around a simple moving average.
//!
//! Both variants buy when the close sits `band` below SMA(ma_period) and
//! sell once it recovers to half a band above it. `TightBand` adds a fixed
//! percentage stop-loss with no matching take-profit.

use crate::domain::error::Result;
use crate::domain::indicator::sma_at;
use crate::domain::position::Position;
use crate::domain::series::Window;
use crate::domain::strategy::{ParamReader, Strategy, StrategyParams, VolumeFilter, pnl_pct};

pub const MEAN_REVERSION: &str = "mean_reversion";
pub const TIGHT_BAND: &str = "tight_band";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    ma_period: usize,
    width: f64,
}

impl Band {
    fn read(reader: &mut ParamReader<'_>, ma_period: usize, width: f64) -> Result<Self> {
        Ok(Band {
            ma_period: reader.bars("ma_period", ma_period, 1)?,
            width: reader.non_negative("band", width)?,
        })
    }

    fn average(&self, window: &Window<'_>) -> Option<f64> {
        if window.index() < self.ma_period {
            return None;
        }
        sma_at(window.bars(), self.ma_period)
    }

    fn below_lower(&self, window: &Window<'_>) -> bool {
        self.average(window)
            .is_some_and(|ma| window.close() < ma * (1.0 - self.width))
    }

    fn above_exit(&self, window: &Window<'_>) -> bool {
        self.average(window)
            .is_some_and(|ma| window.close() > ma * (1.0 + self.width * 0.5))
    }
}

#[derive(Debug, Clone)]
pub struct MeanReversion {
    band: Band,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl MeanReversion {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(MEAN_REVERSION, params);
        let band = Band::read(&mut reader, 20, 0.02)?;
        let position_size = reader.fraction("position_size", 1.0)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(MeanReversion {
            band,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        MEAN_REVERSION
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        self.band.below_lower(window)
    }

    fn exit_condition(&self, window: &Window<'_>, _position: &Position) -> bool {
        self.band.above_exit(window)
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

#[derive(Debug, Clone)]
pub struct TightBand {
    band: Band,
    stop_loss: f64,
    position_size: f64,
    volume_filter: VolumeFilter,
    params: StrategyParams,
}

impl TightBand {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let mut reader = ParamReader::new(TIGHT_BAND, params);
        let band = Band::read(&mut reader, 10, 0.01)?;
        let stop_loss = reader.positive("stop_loss", 0.02)?;
        let position_size = reader.fraction("position_size", 0.15)?;
        let volume_filter = VolumeFilter::from_params(&mut reader)?;

        Ok(TightBand {
            band,
            stop_loss,
            position_size,
            volume_filter,
            params: reader.finish()?,
        })
    }
}

impl Strategy for TightBand {
    fn name(&self) -> &str {
        TIGHT_BAND
    }

    fn entry_condition(&self, window: &Window<'_>) -> bool {
        self.band.below_lower(window)
    }

    fn exit_condition(&self, window: &Window<'_>, position: &Position) -> bool {
        if pnl_pct(window, position) < -self.stop_loss * 100.0 {
            return true;
        }
        self.band.above_exit(window)
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
