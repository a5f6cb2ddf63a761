use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{pattern_for, SeasonalPattern};
use crate::types::CashFlowProjection;

/// Rescale projections by the seasonal pattern of each period's month.
///
/// Inflow is multiplied by the pattern multiplier and net flow recomputed
/// from it. The resulting change in net flow is carried forward into this
/// and every later cumulative balance, so the running balance stays chained.
/// Confidence is weighted by the pattern confidence. Periods whose month has
/// no pattern pass through with only the carried delta applied.
pub fn apply_seasonal_adjustment(
    projections: &[CashFlowProjection],
    patterns: &BTreeMap<u32, SeasonalPattern>,
) -> Vec<CashFlowProjection> {
    let mut carried_delta = Decimal::ZERO;
    let mut adjusted_periods = 0usize;

    let adjusted: Vec<CashFlowProjection> = projections
        .iter()
        .map(|p| {
            let mut adjusted = p.clone();
            if let Some(pattern) = pattern_for(patterns, p.date) {
                adjusted.expected_inflow = p.expected_inflow * pattern.multiplier;
                adjusted.net_cash_flow = adjusted.expected_inflow - adjusted.expected_outflow;
                adjusted.confidence = p.confidence * pattern.confidence;
                carried_delta += adjusted.net_cash_flow - p.net_cash_flow;
                adjusted_periods += 1;
            }
            adjusted.cumulative_balance = p.cumulative_balance + carried_delta;
            adjusted
        })
        .collect();

    tracing::debug!(
        periods = projections.len(),
        adjusted_periods,
        cumulative_delta = %carried_delta,
        "seasonal adjustment applied"
    );

    adjusted
}
