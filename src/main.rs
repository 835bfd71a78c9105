use analytics::{AnalyticsEngine, MetricsSnapshot};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{LogFormat, settings::Config};
use journal::{TradeQuery, TradeStore};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use web_server::AppState;

/// The main entry point for the tradelog application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the config file and defaults still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    // The guard flushes the file writer on drop, so it must live until main returns.
    let _guard = configuration::init_tracing(&config.logging)
        .context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Report(args) => handle_report(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A trading journal with performance analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./tradelog.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON API over a fresh, empty session.
    Serve(ServeArgs),
    /// Import a trade CSV and print its performance report.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct ReportArgs {
    /// A CSV file in the export format.
    #[arg(long)]
    file: PathBuf,

    /// Only include trades on or after this date (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only include trades on or before this date (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only include trades in this symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Only include trades with this strategy label ("Unlabeled" for none).
    #[arg(long)]
    strategy: Option<String>,
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("Invalid server settings")?;

    let addr = config.server.socket_addr()?;
    let state = AppState::from_settings(&config.analytics)
        .context("Invalid analytics settings")?;

    web_server::run_server(addr, Arc::new(state)).await
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::with_parameters(
        config.analytics.risk_free_rate,
        config.analytics.trading_days_per_year,
    )?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let mut store = TradeStore::new();
    store
        .import_csv(file)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    let query = TradeQuery {
        from: args.from,
        to: args.to,
        symbol: args.symbol,
        strategy: args.strategy,
        ..TradeQuery::default()
    };
    let trades = query.apply(store.trades(), store.now().date());
    tracing::info!(
        imported = store.len(),
        selected = trades.len(),
        "Building performance report."
    );

    if trades.is_empty() {
        println!("No trades match the given filters.");
        return Ok(());
    }

    println!("Performance");
    println!("{}", metrics_table(&engine.basic_metrics(&trades)));

    let volatility = engine.volatility_metrics(&trades);
    let mut table = new_table(vec!["Daily Std", "VaR 95%", "VaR 99%", "Worst Day", "Best Day"]);
    table.add_row(vec![
        volatility.daily_std.round_dp(2).to_string(),
        volatility.var_95.round_dp(2).to_string(),
        volatility.var_99.round_dp(2).to_string(),
        volatility.worst_day.to_string(),
        volatility.best_day.to_string(),
    ]);
    println!("\nDaily Volatility");
    println!("{table}");

    let mut table = new_table(vec!["Strategy", "Trades", "Win Rate %", "Total P&L", "Sharpe"]);
    for row in engine.strategy_performance(&trades) {
        table.add_row(vec![
            row.strategy,
            row.metrics.total_trades.to_string(),
            row.metrics.win_rate.to_string(),
            row.metrics.total_pnl.to_string(),
            row.metrics.sharpe_ratio.to_string(),
        ]);
    }
    println!("\nStrategies");
    println!("{table}");

    let patterns = engine.trading_patterns(&trades);
    let mut table = new_table(vec!["Bucket", "Trades", "Mean P&L", "Total P&L"]);
    for row in &patterns.hourly {
        table.add_row(vec![
            format!("{:02}:00", row.hour),
            row.stats.trade_count.to_string(),
            row.stats.mean_pnl.to_string(),
            row.stats.total_pnl.to_string(),
        ]);
    }
    for row in &patterns.daily {
        table.add_row(vec![
            row.day_of_week.clone(),
            row.stats.trade_count.to_string(),
            row.stats.mean_pnl.to_string(),
            row.stats.total_pnl.to_string(),
        ]);
    }
    println!("\nTrading Patterns");
    println!("{table}");

    let mut table = new_table(vec!["Month", "Trades", "Total P&L"]);
    for row in engine.monthly_performance(&trades) {
        table.add_row(vec![
            row.month,
            row.trade_count.to_string(),
            row.total_pnl.to_string(),
        ]);
    }
    println!("\nMonthly");
    println!("{table}");

    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn metrics_table(metrics: &MetricsSnapshot) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    for (key, value) in metrics.entries() {
        table.add_row(vec![label(key), format_metric(key, value)]);
    }
    table
}

/// Turns `risk_reward_ratio` into "Risk Reward Ratio".
fn label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn format_metric(key: &str, value: Decimal) -> String {
    match key {
        "total_trades" => value.trunc().to_string(),
        "win_rate" => format!("{value}%"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn metric_keys_become_title_case_labels() {
        assert_eq!(label("risk_reward_ratio"), "Risk Reward Ratio");
        assert_eq!(label("total_pnl"), "Total Pnl");
    }

    #[test]
    fn counts_and_percentages_are_formatted() {
        assert_eq!(format_metric("total_trades", dec!(12)), "12");
        assert_eq!(format_metric("win_rate", dec!(66.67)), "66.67%");
        assert_eq!(format_metric("sharpe_ratio", dec!(1.25)), "1.25");
    }

    #[test]
    fn cli_parses_report_filters() {
        let cli = Cli::try_parse_from([
            "tradelog",
            "report",
            "--file",
            "trades.csv",
            "--from",
            "2024-01-01",
            "--symbol",
            "AAPL",
        ])
        .unwrap();

        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.file, PathBuf::from("trades.csv"));
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(args.symbol.as_deref(), Some("AAPL"));
            }
            Commands::Serve(_) => panic!("expected the report command"),
        }
    }
}
