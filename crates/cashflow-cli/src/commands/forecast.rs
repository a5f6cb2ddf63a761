use clap::Args;
use serde_json::Value;
use std::time::Instant;

use cashflow_core::forecast::ForecastInput;
use cashflow_core::{with_metadata, CashFlowEngine};

use super::{default_as_of, elapsed_us, read_input, today};

/// Arguments for forecast generation
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to JSON input file (invoices, payments, matters, time entries)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the number of periods to project
    #[arg(long)]
    pub horizon: Option<u32>,
}

pub fn run_forecast(
    engine: &CashFlowEngine,
    args: ForecastArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_input(args.input.as_deref(), "forecast generation")?;
    let mut forecast_input: ForecastInput = serde_json::from_value(default_as_of(raw, today()))?;
    if args.horizon.is_some() {
        forecast_input.horizon = args.horizon;
    }

    let start = Instant::now();
    let forecast = engine.generate_forecast(&forecast_input)?;
    let warnings = engine.forecast_warnings(&forecast_input, &forecast);

    let output = with_metadata(
        "Open invoices discounted by aging probability, placed by due date, \
         rescaled by the seasonal table; fixed-weight scenarios",
        &engine.config().assumptions,
        warnings,
        elapsed_us(start),
        forecast,
    );
    Ok(serde_json::to_value(output)?)
}
