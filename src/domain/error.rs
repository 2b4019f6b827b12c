//! Domain error types.

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error("strategy {strategy} does not accept parameter '{key}'")]
    UnknownParameter { strategy: String, key: String },

    #[error("invalid parameter for {strategy}: {key} {reason}")]
    InvalidParameter {
        strategy: String,
        key: String,
        reason: String,
    },

    #[error("malformed input: {reason}")]
    InvalidSchema { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data in {source_name}: {reason}")]
    NoData { source_name: String, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    /// Configuration errors are fatal to a run and never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TradesimError::UnknownStrategy { .. }
                | TradesimError::UnknownParameter { .. }
                | TradesimError::InvalidParameter { .. }
                | TradesimError::InvalidSchema { .. }
                | TradesimError::ConfigParse { .. }
                | TradesimError::ConfigMissing { .. }
                | TradesimError::ConfigInvalid { .. }
        )
    }

    pub(crate) fn invalid_param(strategy: &str, key: &str, reason: impl Into<String>) -> Self {
        TradesimError::InvalidParameter {
            strategy: strategy.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) | TradesimError::Json(_) => 1,
            TradesimError::UnknownStrategy { .. }
            | TradesimError::UnknownParameter { .. }
            | TradesimError::InvalidParameter { .. }
            | TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::InvalidSchema { .. } | TradesimError::Csv(_) => 3,
            TradesimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

pub type Result<T> = std::result::Result<T, TradesimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        let err = TradesimError::UnknownStrategy {
            name: "nope".into(),
            available: "rsi".into(),
        };
        assert!(err.is_configuration());
        assert!(TradesimError::invalid_param("rsi", "period", "must be >= 2").is_configuration());
        assert!(
            TradesimError::InvalidSchema {
                reason: "duplicate timestamp".into()
            }
            .is_configuration()
        );
    }

    #[test]
    fn data_errors_are_not_configuration() {
        let err = TradesimError::NoData {
            source_name: "prices.csv".into(),
            reason: "empty".into(),
        };
        assert!(!err.is_configuration());
        let io = TradesimError::Io(std::io::Error::other("boom"));
        assert!(!io.is_configuration());
    }

    #[test]
    fn display_messages() {
        let err = TradesimError::InvalidParameter {
            strategy: "rsi".into(),
            key: "position_size".into(),
            reason: "must be in (0, 1]".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter for rsi: position_size must be in (0, 1]"
        );

        let err = TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "data_file".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] data_file");
    }
}
