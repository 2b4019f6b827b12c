//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::{
    render_comparison, render_instrument_summary, ConsoleReport,
};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{load_results, JsonReportAdapter};
use crate::domain::config_validation::{
    read_flag, read_min_bars, read_number, strategy_name, strategy_params,
    validate_backtest_config, validate_logging_config, validate_strategy_config,
};
use crate::domain::engine::{self, BacktestConfig, DEFAULT_MIN_BARS};
use crate::domain::error::{Result, TradesimError};
use crate::domain::metrics::{InstrumentSummary, Metrics};
use crate::domain::series::partition_by_instrument;
use crate::domain::strategy::{Strategy, StrategyParams, StrategyRegistry};
use crate::logging::{init_logging, LogConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportPort, RunRecord};

pub const DEFAULT_INITIAL_BALANCE: f64 = 1000.0;
pub const DEFAULT_RESULTS_DIR: &str = "results";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Crypto strategy backtest simulator")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy name, overriding [strategy] name
        #[arg(short, long)]
        strategy: Option<String>,
        /// OHLCV CSV file, overriding [backtest] data_file
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Results directory, overriding [backtest] results_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the most recent saved run
    Results {
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        dir: PathBuf,
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Compare all saved runs
    Compare {
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        dir: PathBuf,
    },
    /// List strategies and their default parameters
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let verbose = cli.verbose;
    let outcome = match cli.command {
        Command::Backtest {
            config,
            strategy,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, strategy.as_deref(), data.as_ref(), verbose)
            } else {
                run_backtest(
                    &config,
                    strategy.as_deref(),
                    data.as_ref(),
                    output.as_ref(),
                    verbose,
                )
            }
        }
        Command::Results { dir, strategy } => {
            setup_logging(verbose, None);
            run_results(&dir, strategy.as_deref())
        }
        Command::Compare { dir } => {
            setup_logging(verbose, None);
            run_compare(&dir)
        }
        Command::Strategies => {
            setup_logging(verbose, None);
            run_strategies()
        }
        Command::Validate { config } => run_validate(&config, verbose),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_configuration() {
                eprintln!("hint: `tradesim validate --config <file>` checks a configuration");
            }
            (&e).into()
        }
    }
}

/// `-v` flags win over `[logging] level`; `RUST_LOG` wins over both.
fn setup_logging(verbose: u8, config: Option<&dyn ConfigPort>) {
    let mut log_config = config.map(LogConfig::from_config).unwrap_or_default();
    match verbose {
        0 => {}
        1 => log_config = log_config.with_level("info"),
        2 => log_config = log_config.with_level("debug"),
        _ => log_config = log_config.with_level("trace"),
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: logging unavailable: {e}");
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter> {
    FileConfigAdapter::from_file(path)
}

/// Absent keys take their defaults; present ones must parse.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig> {
    let initial_balance = read_number(adapter, "backtest", "initial_balance")?
        .unwrap_or(DEFAULT_INITIAL_BALANCE);
    let min_bars = read_min_bars(adapter)?.unwrap_or(DEFAULT_MIN_BARS);
    let parallel = read_flag(adapter, "backtest", "parallel")?.unwrap_or(false);

    Ok(BacktestConfig::new(initial_balance)?
        .with_min_bars(min_bars)
        .with_parallel(parallel))
}

/// `--data` if given, else `[backtest] data_file`.
pub fn resolve_data_path(data_override: Option<&PathBuf>, adapter: &dyn ConfigPort) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    adapter
        .get_string("backtest", "data_file")
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "data_file".into(),
        })
}

/// `--output` if given, else `[backtest] results_dir`, else `results`.
pub fn resolve_results_dir(output_override: Option<&PathBuf>, adapter: &dyn ConfigPort) -> PathBuf {
    output_override.cloned().unwrap_or_else(|| {
        adapter
            .get_string("backtest", "results_dir")
            .map(|s| PathBuf::from(s.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR))
    })
}

/// Build the strategy to run. Without an override the config decides.
/// With one, `[strategy]` parameters apply only if the config names the
/// same strategy; otherwise the override runs on its defaults.
pub fn build_strategy(
    adapter: &dyn ConfigPort,
    strategy_override: Option<&str>,
    registry: &StrategyRegistry,
) -> Result<Box<dyn Strategy>> {
    match strategy_override {
        None => validate_strategy_config(adapter, registry),
        Some(name) => {
            let configured = strategy_name(adapter);
            let params = if configured.eq_ignore_ascii_case(name.trim()) {
                strategy_params(adapter)?
            } else {
                StrategyParams::new()
            };
            registry.build(name, &params)
        }
    }
}

fn format_params(params: &StrategyParams) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the full backtest over `data_port` and hand the record to each report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    config: &BacktestConfig,
    reports: &[&dyn ReportPort],
) -> Result<RunRecord> {
    let observations = data_port.fetch_observations()?;
    let partitions = partition_by_instrument(observations)?;

    eprintln!(
        "Running {} on {} instruments ({} initial balance each)",
        strategy.name(),
        partitions.len(),
        config.initial_balance
    );

    let result = engine::run_backtest(&partitions, strategy, config);
    for (instrument, reason) in result.skipped() {
        eprintln!("  skipped {instrument}: {reason}");
    }

    let trades = result.trades();
    let metrics = Metrics::compute(&trades, config.initial_balance);
    eprint!(
        "{}",
        render_instrument_summary(&InstrumentSummary::compute_per_instrument(&trades))
    );

    let record = RunRecord {
        strategy: strategy.name().to_string(),
        params: strategy.params().clone(),
        data_source: data_port.source_name(),
        timestamp: chrono::Local::now().naive_local(),
        metrics,
    };

    for report in reports {
        if let Some(path) = report.write(&record)? {
            eprintln!("\nResults saved to: {}", path.display());
        }
    }

    Ok(record)
}

fn run_backtest(
    config_path: &Path,
    strategy_override: Option<&str>,
    data_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
    verbose: u8,
) -> Result<()> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    setup_logging(verbose, Some(&adapter));

    validate_backtest_config(&adapter)?;
    validate_logging_config(&adapter)?;

    let registry = StrategyRegistry::builtin();
    let strategy = build_strategy(&adapter, strategy_override, &registry)?;
    eprintln!("Strategy: {} ({})", strategy.name(), format_params(strategy.params()));

    let bt_config = build_backtest_config(&adapter)?;
    let data_path = resolve_data_path(data_override, &adapter)?;
    eprintln!("Loading data from {}", data_path.display());

    let data_port = CsvAdapter::new(data_path);
    let console = ConsoleReport::default();
    let json = JsonReportAdapter::new(resolve_results_dir(output_override, &adapter));

    let reports: [&dyn ReportPort; 2] = [&console, &json];

    run_backtest_pipeline(&data_port, strategy.as_ref(), &bt_config, &reports)?;
    Ok(())
}

pub fn run_dry_run(
    config_path: &Path,
    strategy_override: Option<&str>,
    data_override: Option<&PathBuf>,
    verbose: u8,
) -> Result<()> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    setup_logging(verbose, Some(&adapter));

    validate_backtest_config(&adapter)?;
    validate_logging_config(&adapter)?;
    let strategy = build_strategy(&adapter, strategy_override, &StrategyRegistry::builtin())?;
    let bt_config = build_backtest_config(&adapter)?;
    let data_path = resolve_data_path(data_override, &adapter)?;
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy:");
    eprintln!("  name:          {}", strategy.name());
    eprintln!("  params:        {}", format_params(strategy.params()));
    eprintln!("  position size: {}", strategy.position_size());

    eprintln!("\nBacktest:");
    eprintln!("  initial balance: {}", bt_config.initial_balance);
    eprintln!("  min bars:        {}", bt_config.min_bars);
    eprintln!("  parallel:        {}", bt_config.parallel);
    eprintln!("  data:            {}", data_path.display());
    eprintln!(
        "  results:         {}",
        resolve_results_dir(None, &adapter).display()
    );

    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_results(dir: &Path, strategy: Option<&str>) -> Result<()> {
    let records = load_results(dir, strategy)?;
    match records.first() {
        Some(latest) => {
            eprintln!("Showing {} of {} saved runs", latest.timestamp, records.len());
            print!("{}", ConsoleReport::default().render(latest));
        }
        None => eprintln!("No results found in {}", dir.display()),
    }
    Ok(())
}

fn run_compare(dir: &Path) -> Result<()> {
    let records = load_results(dir, None)?;
    print!("{}", render_comparison(&records));
    Ok(())
}

fn run_strategies() -> Result<()> {
    for (name, params) in StrategyRegistry::builtin().defaults()? {
        println!("{name:<16} {}", format_params(&params));
    }
    Ok(())
}

fn run_validate(config_path: &Path, verbose: u8) -> Result<()> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    setup_logging(verbose, Some(&adapter));

    validate_backtest_config(&adapter)?;
    validate_logging_config(&adapter)?;
    let strategy = validate_strategy_config(&adapter, &StrategyRegistry::builtin())?;

    eprintln!("\nStrategy: {}", strategy.name());
    for (key, value) in strategy.params().iter() {
        eprintln!("  {key:<16} {value}");
    }
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
