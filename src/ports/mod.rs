//! Port traits: the narrow interfaces the core uses to reach the outside.

pub mod config_port;
pub mod data_port;
pub mod report_port;
