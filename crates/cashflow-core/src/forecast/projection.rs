//! Base (unadjusted) period projections.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ForecastInput;
use crate::collections::risk::collection_probability;
use crate::config::EngineConfig;
use crate::types::{days_between, CashFlowProjection, Money, Probability};
use crate::{CashFlowError, CashFlowResult};

/// Build the period-by-period projection before seasonal adjustment.
///
/// Each open invoice (sent or unpaid) lands in the period whose window
/// `[date_i, date_i+1)` contains its due date; anything already past due is
/// expected in the first period. Its contribution is the face amount
/// discounted by the collection probability for its days past due at that
/// period's date. Invoices due after the horizon contribute nothing.
pub fn generate_base_projections(
    input: &ForecastInput,
    config: &EngineConfig,
) -> CashFlowResult<Vec<CashFlowProjection>> {
    let horizon = resolve_horizon(input)?;

    // One extra boundary closes the final window.
    let boundaries = (0..=horizon)
        .map(|i| input.period.advance(input.as_of, i))
        .collect::<CashFlowResult<Vec<NaiveDate>>>()?;

    let mut inflows = vec![Decimal::ZERO; horizon as usize];
    let mut beyond_horizon = 0usize;
    for invoice in input.invoices.iter().filter(|inv| inv.status.is_open()) {
        match window_index(invoice.due_date, &boundaries) {
            Some(i) => {
                let days_overdue = days_between(invoice.due_date, boundaries[i]);
                inflows[i] +=
                    invoice.amount * collection_probability(days_overdue, &config.collection_curve);
            }
            None => beyond_horizon += 1,
        }
    }

    let outflow = config.baseline_expense;
    let mut cumulative = input.starting_balance;
    let projections: Vec<CashFlowProjection> = inflows
        .into_iter()
        .enumerate()
        .map(|(i, inflow)| {
            let net = inflow - outflow;
            cumulative += net;
            CashFlowProjection {
                date: boundaries[i],
                expected_inflow: inflow,
                expected_outflow: outflow,
                net_cash_flow: net,
                cumulative_balance: cumulative,
                confidence: period_confidence(i as u32, config),
            }
        })
        .collect();

    tracing::debug!(
        horizon,
        period = ?input.period,
        open_invoices = input.invoices.iter().filter(|inv| inv.status.is_open()).count(),
        beyond_horizon,
        "base projections generated"
    );

    Ok(projections)
}

/// Confidence of period `i`: linear decay from the initial value, floored at 0.
pub fn period_confidence(i: u32, config: &EngineConfig) -> Probability {
    let a = &config.assumptions;
    (a.initial_period_confidence - a.period_confidence_decay * Decimal::from(i))
        .max(Decimal::ZERO)
}

/// Sum of `projections` expected inflow.
pub fn total_inflow(projections: &[CashFlowProjection]) -> Money {
    projections.iter().map(|p| p.expected_inflow).sum()
}

pub(crate) fn resolve_horizon(input: &ForecastInput) -> CashFlowResult<u32> {
    let horizon = input
        .horizon
        .unwrap_or_else(|| input.period.default_horizon());
    if horizon == 0 {
        return Err(CashFlowError::InvalidInput {
            field: "horizon".into(),
            reason: "Horizon must be at least one period.".into(),
        });
    }
    Ok(horizon)
}

/// Index of the window containing `due`, given `horizon + 1` ascending
/// boundaries. Dates before the first boundary map to window 0.
fn window_index(due: NaiveDate, boundaries: &[NaiveDate]) -> Option<usize> {
    let last = *boundaries.last()?;
    if due >= last {
        return None;
    }
    // Number of boundaries at or before `due`, minus one, clamped to 0.
    let at_or_before = boundaries.partition_point(|b| *b <= due);
    Some(at_or_before.saturating_sub(1))
}
