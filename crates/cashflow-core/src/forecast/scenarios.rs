//! Optimistic / likely / pessimistic variants of an adjusted projection.
//!
//! Scenario weights are fixed. They are not derived from the historical
//! trend or volatility; see DESIGN.md.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{CashFlowProjection, Money, Probability, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowScenario {
    pub name: String,
    pub description: String,
    pub probability: Probability,
    /// Relative revenue impact versus the likely case (+0.2 = 20% better).
    pub impact: Rate,
    pub projections: Vec<CashFlowProjection>,
}

struct ScenarioDef {
    name: &'static str,
    description: &'static str,
    probability: Probability,
    impact: Rate,
    inflow_factor: Rate,
}

const SCENARIOS: [ScenarioDef; 3] = [
    ScenarioDef {
        name: "Most Likely",
        description: "Collections follow current aging patterns and the seasonal calendar.",
        probability: dec!(0.6),
        impact: dec!(0),
        inflow_factor: dec!(1.0),
    },
    ScenarioDef {
        name: "Optimistic",
        description: "Faster client payments and stronger matter activity lift receipts by 20%.",
        probability: dec!(0.2),
        impact: dec!(0.2),
        inflow_factor: dec!(1.2),
    },
    ScenarioDef {
        name: "Pessimistic",
        description: "Slow payers and deferred matters cut receipts by 30%.",
        probability: dec!(0.2),
        impact: dec!(-0.3),
        inflow_factor: dec!(0.7),
    },
];

/// Derive the three standard scenarios from `projections`.
///
/// `starting_balance` is the balance the projection series was chained from,
/// so each scenario's cumulative balance is re-chained consistently.
pub fn generate_scenarios(
    projections: &[CashFlowProjection],
    starting_balance: Money,
) -> Vec<CashFlowScenario> {
    SCENARIOS
        .iter()
        .map(|def| CashFlowScenario {
            name: def.name.to_string(),
            description: def.description.to_string(),
            probability: def.probability,
            impact: def.impact,
            projections: scale_series(projections, def.inflow_factor, starting_balance),
        })
        .collect()
}

/// Scale a whole series, re-chaining cumulative balances from `starting_balance`.
pub fn scale_series(
    projections: &[CashFlowProjection],
    factor: Rate,
    starting_balance: Money,
) -> Vec<CashFlowProjection> {
    let mut previous_balance = starting_balance;
    projections
        .iter()
        .map(|p| {
            let scaled = scale_projection(p, factor, previous_balance);
            previous_balance = scaled.cumulative_balance;
            scaled
        })
        .collect()
}

/// The one place a scenario touches a projection.
///
/// Inflow is scaled by `factor`; outflow is treated as fixed regardless of
/// revenue, so it is copied unchanged. Net flow is recomputed from the two
/// and the cumulative balance chained from `previous_balance`. Confidence is
/// carried over. The source projection is never modified.
pub fn scale_projection(
    projection: &CashFlowProjection,
    factor: Rate,
    previous_balance: Money,
) -> CashFlowProjection {
    let expected_inflow = projection.expected_inflow * factor;
    let net_cash_flow = expected_inflow - projection.expected_outflow;
    CashFlowProjection {
        date: projection.date,
        expected_inflow,
        expected_outflow: projection.expected_outflow,
        net_cash_flow,
        cumulative_balance: previous_balance + net_cash_flow,
        confidence: projection.confidence,
    }
}

/// Probability-weighted final balance across `scenarios`.
pub fn expected_closing_balance(scenarios: &[CashFlowScenario]) -> Money {
    scenarios
        .iter()
        .filter_map(|s| {
            s.projections
                .last()
                .map(|p| p.cumulative_balance * s.probability)
        })
        .sum::<Decimal>()
}
