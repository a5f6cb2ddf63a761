use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use cashflow_core::engine::AlertInput;
use cashflow_core::{with_metadata, CashFlowEngine};

use super::{elapsed_us, read_input};

/// Arguments for alert generation
#[derive(Args)]
pub struct AlertsArgs {
    /// Path to JSON input file ({ forecast, current_balance, minimum_balance? })
    #[arg(long)]
    pub input: Option<String>,

    /// Minimum acceptable balance, overriding the input and configuration.
    /// Negative values set an overdraft floor.
    #[arg(long, allow_negative_numbers = true)]
    pub minimum_balance: Option<Decimal>,
}

pub fn run_alerts(
    engine: &CashFlowEngine,
    args: AlertsArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_input(args.input.as_deref(), "alert generation")?;
    let alert_input: AlertInput = serde_json::from_value(raw)?;
    let minimum_balance = args.minimum_balance.or(alert_input.minimum_balance);

    let start = Instant::now();
    let alerts = engine.generate_cash_flow_alerts(
        &alert_input.forecast,
        alert_input.current_balance,
        minimum_balance,
    )?;

    let output = with_metadata(
        "Shortage per period below the minimum balance, seasonal slowdown for the \
         current month, surplus across high-confidence periods; ranked by severity",
        &engine.config().thresholds,
        Vec::new(),
        elapsed_us(start),
        alerts,
    );
    Ok(serde_json::to_value(output)?)
}
