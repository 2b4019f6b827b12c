//! Report output port trait.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyParams;

/// One completed run, as persisted and displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub strategy: String,
    pub params: StrategyParams,
    pub data_source: String,
    pub timestamp: NaiveDateTime,
    pub metrics: Metrics,
}

/// Port for writing run results.
pub trait ReportPort {
    /// Emit `record`. Returns the path written, if the report went to a file.
    fn write(&self, record: &RunRecord) -> Result<Option<PathBuf>>;
}
