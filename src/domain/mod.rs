//! Core domain types and logic.

pub mod account;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod series;
pub mod strategy;
