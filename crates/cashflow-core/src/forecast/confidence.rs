use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::types::Probability;

/// Overall reliability of a forecast, independent of per-period confidence.
///
/// Starts from the base confidence, is penalised for a thin invoice sample
/// and for volatile payment history, then clamped to the configured bounds.
pub fn overall_confidence(
    invoice_count: usize,
    volatility: Decimal,
    config: &EngineConfig,
) -> Probability {
    let a = &config.assumptions;
    let t = &config.thresholds;

    let mut confidence = a.base_confidence;
    if invoice_count < t.minimum_invoice_sample {
        confidence -= a.small_sample_penalty;
    }
    if volatility > t.volatility_confidence_penalty {
        confidence -= a.volatility_penalty;
    }
    confidence.max(a.min_confidence).min(a.max_confidence)
}
