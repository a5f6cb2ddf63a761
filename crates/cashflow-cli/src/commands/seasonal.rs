use clap::Args;
use serde_json::Value;

use cashflow_core::seasonal::SeasonalPattern;
use cashflow_core::CashFlowEngine;

/// Arguments for printing the seasonal table
#[derive(Args)]
pub struct SeasonalArgs {
    /// Show a single calendar month (1 = January)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

pub fn run_seasonal(
    engine: &CashFlowEngine,
    args: SeasonalArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let patterns = &engine.config().seasonal_patterns;
    let rows: Vec<&SeasonalPattern> = match args.month {
        Some(month) => {
            let pattern = patterns
                .get(&(month - 1))
                .ok_or_else(|| format!("No seasonal pattern configured for month {}", month))?;
            vec![pattern]
        }
        None => patterns.values().collect(),
    };
    Ok(serde_json::json!({ "result": rows }))
}
