//! Flat strategy parameter maps and their validated reader.

use crate::domain::error::{Result, TradesimError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Largest window or lookback a strategy accepts.
pub const MAX_BARS: f64 = u32::MAX as f64;

/// Option name to numeric value, as supplied by configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, f64>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_lowercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl<K: AsRef<str>> FromIterator<(K, f64)> for StrategyParams {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut params = StrategyParams::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v);
        }
        params
    }
}

/// Reads parameters for one strategy, applying defaults and range checks.
///
/// Every key read is recorded; `finish` rejects keys nobody asked for and
/// returns the resolved parameter set (defaults included).
pub struct ParamReader<'a> {
    strategy: &'static str,
    params: &'a StrategyParams,
    consumed: BTreeSet<String>,
    resolved: StrategyParams,
}

impl<'a> ParamReader<'a> {
    pub fn new(strategy: &'static str, params: &'a StrategyParams) -> Self {
        Self {
            strategy,
            params,
            consumed: BTreeSet::new(),
            resolved: StrategyParams::new(),
        }
    }

    fn read(&mut self, key: &str, default: f64) -> Result<f64> {
        self.consumed.insert(key.to_string());
        let value = self.params.get(key).unwrap_or(default);
        if !value.is_finite() {
            return Err(TradesimError::invalid_param(self.strategy, key, "must be finite"));
        }
        self.resolved.insert(key, value);
        Ok(value)
    }

    /// Any finite value within `[min, max]`.
    pub fn bounded(&mut self, key: &str, default: f64, min: f64, max: f64) -> Result<f64> {
        let value = self.read(key, default)?;
        if value < min || value > max {
            return Err(TradesimError::invalid_param(
                self.strategy,
                key,
                format!("must be between {min} and {max}, got {value}"),
            ));
        }
        Ok(value)
    }

    pub fn positive(&mut self, key: &str, default: f64) -> Result<f64> {
        let value = self.read(key, default)?;
        if value <= 0.0 {
            return Err(TradesimError::invalid_param(
                self.strategy,
                key,
                format!("must be positive, got {value}"),
            ));
        }
        Ok(value)
    }

    pub fn non_negative(&mut self, key: &str, default: f64) -> Result<f64> {
        let value = self.read(key, default)?;
        if value < 0.0 {
            return Err(TradesimError::invalid_param(
                self.strategy,
                key,
                format!("must be non-negative, got {value}"),
            ));
        }
        Ok(value)
    }

    /// Fraction of initial balance committed per position, in (0, 1].
    pub fn fraction(&mut self, key: &str, default: f64) -> Result<f64> {
        let value = self.read(key, default)?;
        if value <= 0.0 || value > 1.0 {
            return Err(TradesimError::invalid_param(
                self.strategy,
                key,
                format!("must be in (0, 1], got {value}"),
            ));
        }
        Ok(value)
    }

    /// Whole number of bars in `[min, MAX_BARS]`.
    pub fn bars(&mut self, key: &str, default: usize, min: usize) -> Result<usize> {
        let value = self.read(key, default as f64)?;
        if value.fract() != 0.0 || value < min as f64 || value > MAX_BARS {
            return Err(TradesimError::invalid_param(
                self.strategy,
                key,
                format!("must be a whole number between {min} and {MAX_BARS}, got {value}"),
            ));
        }
        Ok(value as usize)
    }

    /// Non-zero means on.
    pub fn flag(&mut self, key: &str, default: bool) -> Result<bool> {
        let value = self.read(key, if default { 1.0 } else { 0.0 })?;
        Ok(value != 0.0)
    }

    pub fn finish(self) -> Result<StrategyParams> {
        if let Some(key) = self.params.keys().find(|k| !self.consumed.contains(*k)) {
            return Err(TradesimError::UnknownParameter {
                strategy: self.strategy.to_string(),
                key: key.clone(),
            });
        }
        Ok(self.resolved)
    }
}
