//! Plain-text rendering of run results for the terminal.
//!
//! Renderers return strings; `ConsoleReport` prints them to stdout and
//! implements `ReportPort` so the CLI can treat the console like any other
//! report sink.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::domain::error::Result;
use crate::domain::metrics::{InstrumentSummary, Metrics, TradeSummary};
use crate::ports::report_port::{ReportPort, RunRecord};

pub const DEFAULT_TRADE_LIMIT: usize = 10;

const WIDE_RULE: usize = 50;
const TRADE_RULE: usize = 60;
const COMPARE_RULE: usize = 70;

/// `$1,234.56`, with the sign ahead of the dollar symbol.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac}")
}

/// Signed percentage with two decimals, e.g. `+3.10%`.
pub fn format_percent(pct: f64) -> String {
    format!("{pct:+.2}%")
}

pub fn render_metrics(metrics: &Metrics) -> String {
    let rule = "=".repeat(WIDE_RULE);
    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}\nBACKTEST RESULTS\n{rule}");

    let _ = writeln!(out, "\nSUMMARY");
    let _ = writeln!(out, "  Total Trades:    {}", metrics.total_trades);
    let _ = writeln!(out, "  Win Rate:        {:.1}%", metrics.win_rate);

    let _ = writeln!(out, "\nPROFIT/LOSS");
    let _ = writeln!(out, "  Total P&L:       {}", format_currency(metrics.total_pnl));
    let _ = writeln!(out, "  Return:          {}", format_percent(metrics.return_pct));
    let _ = writeln!(out, "  Final Balance:   {}", format_currency(metrics.final_balance));

    let _ = writeln!(out, "\nWINNING TRADES");
    let _ = writeln!(out, "  Count:           {}", metrics.profitable);
    let _ = writeln!(out, "  Avg Profit:      {}", format_currency(metrics.avg_profit));
    let _ = writeln!(out, "  Max Profit:      {}", format_currency(metrics.max_profit));

    let _ = writeln!(out, "\nLOSING TRADES");
    let _ = writeln!(out, "  Count:           {}", metrics.losing);
    let _ = writeln!(out, "  Avg Loss:        {}", format_currency(metrics.avg_loss));
    let _ = writeln!(out, "  Max Loss:        {}", format_currency(metrics.max_loss));

    let _ = writeln!(out, "\n{rule}");
    out
}

/// The last `limit` trades, oldest of them first.
pub fn render_trades(trades: &[TradeSummary], limit: usize) -> String {
    if trades.is_empty() {
        return "No trades executed.\n".to_string();
    }

    let shown = &trades[trades.len().saturating_sub(limit)..];
    let rule = "-".repeat(TRADE_RULE);
    let mut out = String::new();
    let _ = writeln!(out, "\nLAST {} TRADES\n{rule}", shown.len());
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>12} {:>8}",
        "Instrument", "Entry", "Exit", "P&L", "%"
    );
    let _ = writeln!(out, "{rule}");
    for t in shown {
        let _ = writeln!(
            out,
            "{:<10} ${:>9.4} ${:>9.4} {:>12} {:>8}",
            t.instrument_id,
            t.entry_price,
            t.exit_price,
            format_currency(t.pnl),
            format_percent(t.pnl_pct)
        );
    }
    out
}

pub fn render_instrument_summary(summaries: &[InstrumentSummary]) -> String {
    if summaries.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nPER-INSTRUMENT SUMMARY\n");
    for s in summaries {
        let _ = writeln!(
            out,
            "  {}:  {} trades, {:.1}% win rate, {}",
            s.instrument,
            s.total_trades,
            s.win_rate,
            format_currency(s.total_pnl)
        );
    }
    out
}

pub fn render_comparison(records: &[RunRecord]) -> String {
    if records.is_empty() {
        return "No results to compare.\n".to_string();
    }

    let double = "=".repeat(COMPARE_RULE);
    let mut out = String::new();
    let _ = writeln!(out, "\n{double}\nSTRATEGY COMPARISON\n{double}");
    let _ = writeln!(
        out,
        "{:<20} {:>8} {:>8} {:>12} {:>10}",
        "Strategy", "Trades", "Win%", "P&L", "Return"
    );
    let _ = writeln!(out, "{}", "-".repeat(COMPARE_RULE));
    for r in records {
        let m = &r.metrics;
        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>7.1}% {:>12} {:>10}",
            r.strategy,
            m.total_trades,
            m.win_rate,
            format_currency(m.total_pnl),
            format_percent(m.return_pct)
        );
    }
    let _ = writeln!(out, "{double}");
    out
}

/// Prints metrics and the most recent trades to stdout.
pub struct ConsoleReport {
    pub trade_limit: usize,
}

impl Default for ConsoleReport {
    fn default() -> Self {
        ConsoleReport {
            trade_limit: DEFAULT_TRADE_LIMIT,
        }
    }
}

impl ConsoleReport {
    pub fn render(&self, record: &RunRecord) -> String {
        let mut out = format!(
            "Strategy: {} ({})\n",
            record.strategy, record.data_source
        );
        out.push_str(&render_metrics(&record.metrics));
        out.push_str(&render_trades(&record.metrics.trades, self.trade_limit));
        out
    }
}

impl ReportPort for ConsoleReport {
    fn write(&self, record: &RunRecord) -> Result<Option<PathBuf>> {
        print!("{}", self.render(record));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::StrategyParams;
    use chrono::NaiveDate;

    fn summary(instrument: &str, pnl: f64) -> TradeSummary {
        TradeSummary {
            instrument_id: instrument.to_string(),
            entry_price: 0.0071,
            exit_price: 0.0075,
            pnl,
            pnl_pct: 5.63,
        }
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.346), "$12.35");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-999.999), "-$1,000.00");
        assert_eq!(format_currency(-42.0), "-$42.00");
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(3.1), "+3.10%");
        assert_eq!(format_percent(-0.5), "-0.50%");
        assert_eq!(format_percent(0.0), "+0.00%");
    }

    #[test]
    fn metrics_block_lists_sections() {
        let out = render_metrics(&Metrics::compute(&[], 1000.0));
        assert!(out.contains("BACKTEST RESULTS"));
        assert!(out.contains("Total Trades:    0"));
        assert!(out.contains("Win Rate:        0.0%"));
        assert!(out.contains("Final Balance:   $1,000.00"));
        assert!(out.contains("Return:          +0.00%"));
    }

    #[test]
    fn trades_shows_last_n() {
        let trades: Vec<_> = (0..12).map(|i| summary(&format!("C{i}"), i as f64)).collect();
        let out = render_trades(&trades, 10);
        assert!(out.contains("LAST 10 TRADES"));
        assert!(!out.contains("C0 "));
        assert!(!out.contains("C1 "));
        assert!(out.contains("C2 "));
        assert!(out.contains("C11"));
        assert!(out.contains("0.0071"));
    }

    #[test]
    fn trades_empty() {
        assert_eq!(render_trades(&[], 10), "No trades executed.\n");
    }

    #[test]
    fn comparison_table() {
        let record = RunRecord {
            strategy: "tight_band".into(),
            params: StrategyParams::new(),
            data_source: "ohlcv.csv".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            metrics: Metrics::compute(&[], 1000.0),
        };
        let out = render_comparison(&[record]);
        assert!(out.contains("STRATEGY COMPARISON"));
        assert!(out.contains("tight_band"));
        assert_eq!(render_comparison(&[]), "No results to compare.\n");
    }

    #[test]
    fn instrument_summary_lines() {
        let summaries = vec![InstrumentSummary {
            instrument: "pepe".into(),
            total_trades: 3,
            profitable: 2,
            win_rate: 66.666,
            total_pnl: -12.5,
        }];
        let out = render_instrument_summary(&summaries);
        assert!(out.contains("pepe:  3 trades, 66.7% win rate, -$12.50"));
        assert!(render_instrument_summary(&[]).is_empty());
    }
}
