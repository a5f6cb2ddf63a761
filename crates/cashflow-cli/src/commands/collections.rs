use clap::Args;
use serde_json::Value;
use std::time::Instant;

use cashflow_core::collections::analysis::CollectionInput;
use cashflow_core::{with_metadata, CashFlowEngine};

use super::{default_as_of, elapsed_us, read_input, today};

/// Arguments for collection analysis
#[derive(Args)]
pub struct CollectionsArgs {
    /// Path to JSON input file (invoices and payments)
    #[arg(long)]
    pub input: Option<String>,

    /// Print alerts for critical-risk invoices instead of the analysis
    #[arg(long)]
    pub alerts: bool,
}

pub fn run_collections(
    engine: &CashFlowEngine,
    args: CollectionsArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_input(args.input.as_deref(), "collection analysis")?;
    let collection_input: CollectionInput = serde_json::from_value(default_as_of(raw, today()))?;

    let start = Instant::now();
    let analysis = engine.analyze_collection_patterns(&collection_input)?;

    let mut warnings = Vec::new();
    if analysis.matched_payments == 0 {
        warnings.push(format!(
            "No settled invoice could be matched to a payment; average collection \
             period assumed to be {} days.",
            engine.config().assumptions.default_collection_days
        ));
    }

    let methodology = "Average days from issue to first payment on paid invoices; \
                       outstanding invoices projected at that average with an aging \
                       probability curve";

    if args.alerts {
        let alerts = engine.generate_collection_alerts(&analysis, collection_input.as_of);
        let output = with_metadata(
            methodology,
            &engine.config().collection_curve,
            warnings,
            elapsed_us(start),
            alerts,
        );
        return Ok(serde_json::to_value(output)?);
    }

    let output = with_metadata(
        methodology,
        &engine.config().collection_curve,
        warnings,
        elapsed_us(start),
        analysis,
    );
    Ok(serde_json::to_value(output)?)
}
