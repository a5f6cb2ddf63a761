use clap::Args;
use serde_json::Value;
use std::time::Instant;

use cashflow_core::engine::OptimizationInput;
use cashflow_core::{with_metadata, CashFlowEngine};

use super::{elapsed_us, read_input};

/// Arguments for strategy optimization
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to JSON input file ({ forecast, invoices, matters })
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_optimize(
    engine: &CashFlowEngine,
    args: OptimizeArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_input(args.input.as_deref(), "cash flow optimization")?;
    let opt_input: OptimizationInput = serde_json::from_value(raw)?;

    let start = Instant::now();
    let plan = engine.optimize_cash_flow(
        &opt_input.forecast,
        &opt_input.invoices,
        &opt_input.matters,
    );

    let output = with_metadata(
        "Independent triggers for overdue receivables, unbilled WIP and near-term \
         net outflow; ranked by estimated impact per unit of effort",
        &engine.config().advisor,
        Vec::new(),
        elapsed_us(start),
        plan,
    );
    Ok(serde_json::to_value(output)?)
}
