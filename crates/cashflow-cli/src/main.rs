mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use cashflow_core::CashFlowEngine;
use commands::alerts::AlertsArgs;
use commands::collections::CollectionsArgs;
use commands::forecast::ForecastArgs;
use commands::optimize::OptimizeArgs;
use commands::seasonal::SeasonalArgs;

/// Cash-flow forecasting and collection-risk analysis
#[derive(Parser)]
#[command(
    name = "cff",
    version,
    about = "Cash-flow forecasting and collection-risk analysis",
    long_about = "A batch runner for the cash-flow engine. Reads practice records \
                  (invoices, payments, matters, time entries) as JSON and produces \
                  seasonally adjusted projections, scenarios, collection analysis, \
                  alerts and ranked improvement strategies."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log pipeline stages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a seasonally adjusted cash-flow forecast
    Forecast(ForecastArgs),
    /// Analyse collection patterns and outstanding receivables
    Collections(CollectionsArgs),
    /// Scan a forecast for shortages, seasonal risk and opportunities
    Alerts(AlertsArgs),
    /// Rank strategies for improving cash position
    Optimize(OptimizeArgs),
    /// Print the effective seasonal table
    Seasonal(SeasonalArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries the result; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_engine(config: Option<&str>) -> Result<CashFlowEngine, Box<dyn std::error::Error>> {
    match config {
        Some(path) => {
            let config = input::config::load_engine_config(path)?;
            Ok(CashFlowEngine::new(config)?)
        }
        None => Ok(CashFlowEngine::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Forecast(args) => {
            build_engine(config).and_then(|engine| commands::forecast::run_forecast(&engine, args))
        }
        Commands::Collections(args) => build_engine(config)
            .and_then(|engine| commands::collections::run_collections(&engine, args)),
        Commands::Alerts(args) => {
            build_engine(config).and_then(|engine| commands::alerts::run_alerts(&engine, args))
        }
        Commands::Optimize(args) => {
            build_engine(config).and_then(|engine| commands::optimize::run_optimize(&engine, args))
        }
        Commands::Seasonal(args) => {
            build_engine(config).and_then(|engine| commands::seasonal::run_seasonal(&engine, args))
        }
        Commands::Version => {
            println!("cff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
