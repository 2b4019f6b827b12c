//! Data access port trait.

use crate::domain::error::Result;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Every observation in the source, all instruments interleaved, in
    /// source order.
    fn fetch_observations(&self) -> Result<Vec<OhlcvBar>>;

    /// Human-readable name of the source, recorded with saved results.
    fn source_name(&self) -> String;
}
