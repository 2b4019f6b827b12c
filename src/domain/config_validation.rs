//! Configuration validation.
//!
//! Validates all config fields before a backtest runs. Absent keys fall back
//! to defaults; present keys must parse and be in range.

use crate::domain::error::{Result, TradesimError};
use crate::domain::strategy::{Strategy, StrategyParams, StrategyRegistry};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_STRATEGY: &str = "rsi";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<()> {
    validate_initial_balance(config)?;
    read_min_bars(config)?;
    read_flag(config, "backtest", "parallel")?;
    validate_paths(config)?;
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<()> {
    one_of(config, "logging", "level", &LOG_LEVELS)?;
    one_of(config, "logging", "format", &LOG_FORMATS)?;
    Ok(())
}

/// Build the configured strategy; construction is where its parameters are
/// range-checked.
pub fn validate_strategy_config(
    config: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<Box<dyn Strategy>> {
    let name = strategy_name(config);
    let params = strategy_params(config)?;
    registry.build(&name, &params)
}

pub fn strategy_name(config: &dyn ConfigPort) -> String {
    config
        .get_string("strategy", "name")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string())
}

/// Every `[strategy]` key except `name`, parsed as a number.
/// `true`/`yes` and `false`/`no` read as 1 and 0.
pub fn strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams> {
    let mut params = StrategyParams::new();
    for key in config.keys("strategy") {
        if key == "name" {
            continue;
        }
        let raw = config.get_string("strategy", &key).unwrap_or_default();
        let value = match raw.trim().to_lowercase().as_str() {
            "true" | "yes" => 1.0,
            "false" | "no" => 0.0,
            other => other.parse::<f64>().map_err(|_| TradesimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.clone(),
                reason: format!("expected a number, got '{raw}'"),
            })?,
        };
        params.insert(&key, value);
    }
    Ok(params)
}

/// A number, or `None` when the key is absent.
pub fn read_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| TradesimError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got '{raw}'"),
            }),
    }
}

/// `true`/`yes`/`1` or `false`/`no`/`0`, any case.
pub fn read_flag(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<bool>> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        _ => Err(TradesimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be true or false, got '{raw}'"),
        }),
    }
}

/// `[backtest] min_bars` as a whole number of at least 1.
pub fn read_min_bars(config: &dyn ConfigPort) -> Result<Option<usize>> {
    let Some(raw) = config.get_string("backtest", "min_bars") else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Some(n)),
        _ => Err(TradesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "min_bars".to_string(),
            reason: format!("min_bars must be a whole number >= 1, got '{raw}'"),
        }),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<()> {
    if let Some(value) = read_number(config, "backtest", "initial_balance")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(TradesimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_balance".to_string(),
                reason: "initial_balance must be positive".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_paths(config: &dyn ConfigPort) -> Result<()> {
    for key in ["data_file", "results_dir"] {
        if let Some(value) = config.get_string("backtest", key) {
            if value.trim().is_empty() {
                return Err(TradesimError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must not be empty"),
                });
            }
        }
    }
    Ok(())
}

fn one_of(config: &dyn ConfigPort, section: &str, key: &str, allowed: &[&str]) -> Result<()> {
    if let Some(value) = config.get_string(section, key) {
        if !allowed.contains(&value.trim().to_lowercase().as_str()) {
            return Err(TradesimError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_balance = 1000
min_bars = 20
parallel = true
data_file = data/ohlcv.csv
results_dir = results
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn empty_backtest_section_uses_defaults() {
        let config = make_config("[backtest]\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn initial_balance_must_be_positive() {
        for bad in ["-100", "0", "abc"] {
            let config = make_config(&format!("[backtest]\ninitial_balance = {bad}\n"));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, TradesimError::ConfigInvalid { ref key, .. } if key == "initial_balance"),
                "{bad}"
            );
        }
    }

    #[test]
    fn min_bars_must_be_whole_and_positive() {
        for bad in ["0", "2.5", "-3", "ten"] {
            let config = make_config(&format!("[backtest]\nmin_bars = {bad}\n"));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, TradesimError::ConfigInvalid { ref key, .. } if key == "min_bars"),
                "{bad}"
            );
        }
    }

    #[test]
    fn parallel_must_be_boolean() {
        let config = make_config("[backtest]\nparallel = sometimes\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, TradesimError::ConfigInvalid { key, .. } if key == "parallel"));
    }

    #[test]
    fn flags_accept_words_and_digits() {
        let config = make_config("[backtest]\nparallel = Yes\n\n[report]\njson = 0\n");
        assert_eq!(read_flag(&config, "backtest", "parallel").unwrap(), Some(true));
        assert_eq!(read_flag(&config, "report", "json").unwrap(), Some(false));
        assert_eq!(read_flag(&config, "report", "console").unwrap(), None);
    }

    #[test]
    fn typed_reads_are_absent_for_missing_keys() {
        let config = make_config("[backtest]\nmin_bars = 30\n");
        assert_eq!(read_min_bars(&config).unwrap(), Some(30));
        assert_eq!(read_number(&config, "backtest", "initial_balance").unwrap(), None);
        assert_eq!(read_min_bars(&make_config("[backtest]\n")).unwrap(), None);
    }

    #[test]
    fn logging_values_checked() {
        assert!(validate_logging_config(&make_config("[logging]\nlevel = DEBUG\nformat = json\n")).is_ok());
        assert!(validate_logging_config(&make_config("[logging]\nlevel = loud\n")).is_err());
        assert!(validate_logging_config(&make_config("[logging]\nformat = xml\n")).is_err());
    }

    #[test]
    fn strategy_defaults_to_rsi() {
        let config = make_config("[backtest]\n");
        assert_eq!(strategy_name(&config), "rsi");
        let strategy = validate_strategy_config(&config, &StrategyRegistry::builtin()).unwrap();
        assert_eq!(strategy.name(), "rsi");
    }

    #[test]
    fn strategy_params_collects_other_keys() {
        let config = make_config("[strategy]\nname = breakout\nlookback = 30\nmin_volume = true\n");
        let params = strategy_params(&config).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("lookback"), Some(30.0));
        assert_eq!(params.get("min_volume"), Some(1.0));

        let strategy = validate_strategy_config(&config, &StrategyRegistry::builtin()).unwrap();
        assert_eq!(strategy.params().get("lookback"), Some(30.0));
    }

    #[test]
    fn non_numeric_param_fails() {
        let config = make_config("[strategy]\nname = rsi\nperiod = fourteen\n");
        let err = strategy_params(&config).unwrap_err();
        assert!(matches!(err, TradesimError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config("[strategy]\nname = martingale\n");
        let err = validate_strategy_config(&config, &StrategyRegistry::builtin()).unwrap_err();
        assert!(matches!(err, TradesimError::UnknownStrategy { .. }));
    }

    #[test]
    fn out_of_range_param_fails() {
        let config = make_config("[strategy]\nname = scalper\nposition_size = 1.5\n");
        let err = validate_strategy_config(&config, &StrategyRegistry::builtin()).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidParameter { .. }));
    }

    #[test]
    fn unknown_param_fails() {
        let config = make_config("[strategy]\nname = momentum\nperiod = 3\n");
        let err = validate_strategy_config(&config, &StrategyRegistry::builtin()).unwrap_err();
        assert!(matches!(err, TradesimError::UnknownParameter { .. }));
    }
}
