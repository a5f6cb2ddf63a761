//! Remediation strategies for a forecast.
//!
//! Each trigger is independent. Strategies are ranked by estimated impact
//! per unit of implementation effort.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::forecast::CashFlowForecast;
use crate::types::{Invoice, InvoiceStatus, Matter, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

impl EffortLevel {
    /// Ranking divisor: low 1, medium 2, high 3.
    pub fn weight(&self) -> Decimal {
        match self {
            EffortLevel::Low => Decimal::ONE,
            EffortLevel::Medium => Decimal::TWO,
            EffortLevel::High => Decimal::from(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStrategy {
    pub id: String,
    pub title: String,
    pub description: String,
    pub estimated_impact: Money,
    pub timeframe: String,
    pub effort: EffortLevel,
    pub actions: Vec<String>,
}

impl CashFlowStrategy {
    pub fn impact_per_effort(&self) -> Decimal {
        self.estimated_impact / self.effort.weight()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPlan {
    /// Strategies in priority order.
    pub strategies: Vec<CashFlowStrategy>,
    /// Sum of all strategy impacts.
    pub projected_improvement: Money,
    /// Strategy ids in priority order.
    pub implementation_priority: Vec<String>,
}

/// Propose ranked strategies for improving the forecast's cash position.
pub fn optimize_cash_flow(
    forecast: &CashFlowForecast,
    invoices: &[Invoice],
    matters: &[Matter],
    config: &EngineConfig,
) -> OptimizationPlan {
    let thresholds = &config.thresholds;
    let factors = &config.advisor;
    let mut strategies = Vec::new();

    let overdue: Vec<&Invoice> = invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Overdue)
        .collect();
    if !overdue.is_empty() {
        let overdue_total: Money = overdue.iter().map(|inv| inv.amount).sum();
        strategies.push(CashFlowStrategy {
            id: "accelerate-collections".to_string(),
            title: "Accelerate Collections".to_string(),
            description: format!(
                "{} overdue invoices totalling {} are tying up working capital.",
                overdue.len(),
                overdue_total
            ),
            estimated_impact: overdue_total * factors.collection_recovery_rate,
            timeframe: "30 days".to_string(),
            effort: EffortLevel::Medium,
            actions: vec![
                "Call clients on the ten largest overdue balances this week".to_string(),
                "Offer a small discount for settlement within 10 days".to_string(),
                "Set up automated reminders at 7, 14 and 30 days past due".to_string(),
                "Agree payment plans for balances that cannot be settled in full".to_string(),
            ],
        });
    }

    let unbilled_total: Money = matters.iter().map(|m| m.wip_value).sum();
    if unbilled_total > thresholds.unbilled_wip {
        strategies.push(CashFlowStrategy {
            id: "optimize-billing-frequency".to_string(),
            title: "Optimize Billing Frequency".to_string(),
            description: format!(
                "{} of work-in-progress is unbilled across {} matters.",
                unbilled_total,
                matters.len()
            ),
            estimated_impact: unbilled_total * factors.billing_conversion_rate,
            timeframe: "60 days".to_string(),
            effort: EffortLevel::Low,
            actions: vec![
                "Move long-running matters to monthly interim billing".to_string(),
                "Bill on matter milestones rather than at conclusion".to_string(),
                "Request retainers on new matters".to_string(),
            ],
        });
    }

    let lookahead = thresholds.seasonal_preparation_lookahead;
    let squeeze = forecast
        .projections
        .iter()
        .take(lookahead)
        .any(|p| p.net_cash_flow < thresholds.seasonal_preparation_net_floor);
    if squeeze {
        strategies.push(CashFlowStrategy {
            id: "seasonal-preparation".to_string(),
            title: "Seasonal Preparation".to_string(),
            description: format!(
                "Net outflow exceeds {} within the next {} periods.",
                thresholds.seasonal_preparation_net_floor.abs(),
                lookahead
            ),
            estimated_impact: factors.seasonal_reserve,
            timeframe: "90 days".to_string(),
            effort: EffortLevel::High,
            actions: vec![
                "Build a cash reserve covering the slow months".to_string(),
                "Arrange a standby line of credit".to_string(),
                "Defer discretionary spending until receipts recover".to_string(),
            ],
        });
    }

    rank_strategies(&mut strategies);

    let projected_improvement: Money = strategies.iter().map(|s| s.estimated_impact).sum();
    let implementation_priority: Vec<String> = strategies.iter().map(|s| s.id.clone()).collect();

    tracing::debug!(
        strategies = strategies.len(),
        projected_improvement = %projected_improvement,
        "optimization strategies ranked"
    );

    OptimizationPlan {
        strategies,
        projected_improvement,
        implementation_priority,
    }
}

/// Sort descending by impact / effort weight; ties keep insertion order.
pub fn rank_strategies(strategies: &mut [CashFlowStrategy]) {
    strategies.sort_by(|a, b| b.impact_per_effort().cmp(&a.impact_per_effort()));
}
