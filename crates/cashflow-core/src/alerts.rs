//! Cash-flow alerts.
//!
//! Rules are evaluated independently and their alerts collected into one
//! list, ranked by severity. Alerts are not deduplicated.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collections::analysis::CollectionAnalysis;
use crate::collections::risk::RiskLevel;
use crate::config::EngineConfig;
use crate::forecast::projection::total_inflow;
use crate::forecast::CashFlowForecast;
use crate::history::YearMonth;
use crate::seasonal::pattern_for;
use crate::types::{CashFlowProjection, Money};
use crate::{CashFlowError, CashFlowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Shortage,
    Opportunity,
    Seasonal,
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Ordering weight: critical 4, high 3, medium 2, low 1.
    pub fn rank(&self) -> u8 {
        match self {
            AlertSeverity::Critical => 4,
            AlertSeverity::High => 3,
            AlertSeverity::Medium => 2,
            AlertSeverity::Low => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowAlert {
    pub id: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub due_date: NaiveDate,
    pub estimated_impact: Money,
}

/// Scan a forecast for shortages, seasonal risk and surplus opportunities.
///
/// `minimum_balance` defaults to the configured threshold and may be
/// negative to express an overdraft floor. The current
/// month for the seasonal rule is the forecast's `as_of` month.
pub fn generate_cash_flow_alerts(
    forecast: &CashFlowForecast,
    current_balance: Money,
    minimum_balance: Option<Money>,
    config: &EngineConfig,
) -> CashFlowResult<Vec<CashFlowAlert>> {
    let threshold = minimum_balance.unwrap_or(config.thresholds.minimum_balance);

    let mut alerts: Vec<CashFlowAlert> = forecast
        .projections
        .iter()
        .filter(|p| p.cumulative_balance < threshold)
        .map(|p| shortage_alert(p, threshold))
        .collect();

    if let Some(alert) = seasonal_alert(forecast.as_of, current_balance, config)? {
        alerts.push(alert);
    }

    if let Some(alert) = opportunity_alert(&forecast.projections, config) {
        alerts.push(alert);
    }

    rank_alerts(&mut alerts);

    tracing::debug!(
        alerts = alerts.len(),
        threshold = %threshold,
        current_balance = %current_balance,
        "cash flow alerts generated"
    );

    Ok(alerts)
}

/// One alert per outstanding invoice whose collection risk is critical.
pub fn generate_collection_alerts(
    analysis: &CollectionAnalysis,
    as_of: NaiveDate,
) -> Vec<CashFlowAlert> {
    let mut alerts: Vec<CashFlowAlert> = analysis
        .projected_collections
        .iter()
        .filter(|c| c.risk_level == RiskLevel::Critical)
        .map(|c| {
            let at_risk = c.amount - c.expected_amount;
            CashFlowAlert {
                id: format!("collection-{}", c.invoice_id),
                category: AlertCategory::Collection,
                severity: AlertSeverity::High,
                title: format!("Invoice {} at risk of non-payment", c.invoice_id),
                description: format!(
                    "Collection probability has fallen to {}; {} of {} is at risk.",
                    c.probability, at_risk, c.amount
                ),
                recommendation: "Escalate to the billing partner and agree a payment plan."
                    .to_string(),
                due_date: as_of,
                estimated_impact: at_risk,
            }
        })
        .collect();
    rank_alerts(&mut alerts);
    alerts
}

/// Sort by severity descending; equal severities keep insertion order.
pub fn rank_alerts(alerts: &mut [CashFlowAlert]) {
    alerts.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn shortage_alert(p: &CashFlowProjection, threshold: Money) -> CashFlowAlert {
    let negative = p.cumulative_balance < Decimal::ZERO;
    let severity = if negative {
        AlertSeverity::Critical
    } else {
        AlertSeverity::High
    };
    CashFlowAlert {
        id: format!("shortage-{}", p.date),
        category: AlertCategory::Shortage,
        severity,
        title: if negative {
            "Projected negative cash balance".to_string()
        } else {
            "Projected balance below minimum".to_string()
        },
        description: format!(
            "Balance projected at {} on {}, below the {} minimum.",
            p.cumulative_balance, p.date, threshold
        ),
        recommendation: "Accelerate collections on outstanding invoices or arrange \
                         short-term financing ahead of this period."
            .to_string(),
        due_date: p.date,
        estimated_impact: threshold - p.cumulative_balance,
    }
}

fn seasonal_alert(
    as_of: NaiveDate,
    current_balance: Money,
    config: &EngineConfig,
) -> CashFlowResult<Option<CashFlowAlert>> {
    let Some(pattern) = pattern_for(&config.seasonal_patterns, as_of) else {
        return Ok(None);
    };
    if pattern.multiplier >= config.thresholds.seasonal_alert_multiplier {
        return Ok(None);
    }

    let lead = config.thresholds.seasonal_alert_lead_days;
    let due_date = as_of
        .checked_add_days(Days::new(u64::from(lead)))
        .ok_or_else(|| CashFlowError::DateError(format!("{as_of} + {lead} days overflows")))?;
    let month = YearMonth::from_date(as_of);
    let factors = if pattern.factors.is_empty() {
        String::new()
    } else {
        format!(" Drivers: {}.", pattern.factors.join(", "))
    };

    Ok(Some(CashFlowAlert {
        id: format!("seasonal-{month}"),
        category: AlertCategory::Seasonal,
        severity: AlertSeverity::Medium,
        title: format!("Seasonal slowdown expected in {}", as_of.format("%B")),
        description: format!(
            "Receipts in month {} historically run at {}x of normal.{}",
            as_of.month(),
            pattern.multiplier,
            factors
        ),
        recommendation: "Build a cash reserve and bring forward billing on active \
                         matters before the slow period."
            .to_string(),
        due_date,
        estimated_impact: current_balance * (Decimal::ONE - pattern.multiplier),
    }))
}

fn opportunity_alert(
    projections: &[CashFlowProjection],
    config: &EngineConfig,
) -> Option<CashFlowAlert> {
    let confident: Vec<CashFlowProjection> = projections
        .iter()
        .filter(|p| p.confidence > config.thresholds.opportunity_confidence)
        .cloned()
        .collect();
    let earliest = confident.iter().map(|p| p.date).min()?;
    let inflow = total_inflow(&confident);

    Some(CashFlowAlert {
        id: format!("opportunity-{earliest}"),
        category: AlertCategory::Opportunity,
        severity: AlertSeverity::Low,
        title: "High-confidence inflow available".to_string(),
        description: format!(
            "{} of expected inflow across {} high-confidence periods.",
            inflow,
            confident.len()
        ),
        recommendation: "Consider placing surplus cash in short-term deposits or \
                         paying down expensive debt."
            .to_string(),
        due_date: earliest,
        estimated_impact: inflow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{generate_forecast, ForecastInput};
    use crate::history::analyze_historical_patterns;
    use crate::types::PeriodType;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn projection(date: NaiveDate, balance: Decimal, confidence: Decimal) -> CashFlowProjection {
        CashFlowProjection {
            date,
            expected_inflow: dec!(10_000),
            expected_outflow: Decimal::ZERO,
            net_cash_flow: dec!(10_000),
            cumulative_balance: balance,
            confidence,
        }
    }

    fn forecast(as_of: NaiveDate, projections: Vec<CashFlowProjection>) -> CashFlowForecast {
        let mut f = generate_forecast(
            &ForecastInput {
                as_of,
                period: PeriodType::Monthly,
                invoices: vec![],
                matters: vec![],
                time_entries: vec![],
                payments: vec![],
                starting_balance: Decimal::ZERO,
                horizon: Some(1),
            },
            &EngineConfig::default(),
        )
        .unwrap();
        f.projections = projections;
        f.historical = analyze_historical_patterns(&[], &[]).unwrap();
        f
    }

    #[test]
    fn test_single_shortage_high_severity() {
        // April: multiplier 1.0, no seasonal alert
        let as_of = date(2024, 4, 1);
        let f = forecast(
            as_of,
            vec![
                projection(date(2024, 4, 1), dec!(40_000), dec!(0.5)),
                projection(date(2024, 5, 1), dec!(90_000), dec!(0.5)),
            ],
        );
        let config = EngineConfig::default();
        let alerts =
            generate_cash_flow_alerts(&f, dec!(40_000), Some(dec!(50_000)), &config).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AlertCategory::Shortage);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].estimated_impact, dec!(10_000));
    }

    #[test]
    fn test_negative_balance_is_critical() {
        let f = forecast(
            date(2024, 4, 1),
            vec![projection(date(2024, 4, 1), dec!(-5_000), dec!(0.5))],
        );
        let alerts =
            generate_cash_flow_alerts(&f, dec!(0), None, &EngineConfig::default()).unwrap();
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].estimated_impact, dec!(55_000));
    }

    #[test]
    fn test_seasonal_alert_in_slow_month() {
        // December multiplier 0.6
        let as_of = date(2024, 12, 1);
        let f = forecast(as_of, vec![projection(as_of, dec!(1_000_000), dec!(0.5))]);
        let alerts =
            generate_cash_flow_alerts(&f, dec!(200_000), None, &EngineConfig::default()).unwrap();
        assert_eq!(alerts.len(), 1);
        let a = &alerts[0];
        assert_eq!(a.category, AlertCategory::Seasonal);
        assert_eq!(a.severity, AlertSeverity::Medium);
        assert_eq!(a.estimated_impact, dec!(80_000));
        assert_eq!(a.due_date, date(2024, 12, 31));
        assert_eq!(a.id, "seasonal-2024-12");
    }

    #[test]
    fn test_threshold_multiplier_not_alerted() {
        // May multiplier is exactly 0.8
        let as_of = date(2024, 5, 1);
        let f = forecast(as_of, vec![projection(as_of, dec!(1_000_000), dec!(0.5))]);
        let alerts =
            generate_cash_flow_alerts(&f, dec!(200_000), None, &EngineConfig::default()).unwrap();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_opportunity_alert_sums_confident_inflow() {
        let as_of = date(2024, 4, 1);
        let f = forecast(
            as_of,
            vec![
                projection(date(2024, 4, 1), dec!(1_000_000), dec!(0.8)),
                projection(date(2024, 5, 1), dec!(1_000_000), dec!(0.85)),
                projection(date(2024, 6, 1), dec!(1_000_000), dec!(0.9)),
            ],
        );
        let alerts =
            generate_cash_flow_alerts(&f, dec!(1_000_000), None, &EngineConfig::default()).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AlertCategory::Opportunity);
        assert_eq!(alerts[0].severity, AlertSeverity::Low);
        assert_eq!(alerts[0].estimated_impact, dec!(20_000));
        assert_eq!(alerts[0].due_date, date(2024, 5, 1));
    }

    #[test]
    fn test_alerts_sorted_by_severity_and_stable() {
        let as_of = date(2024, 12, 1);
        let f = forecast(
            as_of,
            vec![
                projection(date(2024, 12, 1), dec!(30_000), dec!(0.9)),
                projection(date(2025, 1, 1), dec!(-1_000), dec!(0.5)),
                projection(date(2025, 2, 1), dec!(20_000), dec!(0.5)),
                projection(date(2025, 3, 1), dec!(-2_000), dec!(0.5)),
            ],
        );
        let alerts =
            generate_cash_flow_alerts(&f, dec!(30_000), None, &EngineConfig::default()).unwrap();
        let order: Vec<(AlertSeverity, String)> =
            alerts.iter().map(|a| (a.severity, a.id.clone())).collect();
        assert_eq!(
            order,
            vec![
                (AlertSeverity::Critical, "shortage-2025-01-01".to_string()),
                (AlertSeverity::Critical, "shortage-2025-03-01".to_string()),
                (AlertSeverity::High, "shortage-2024-12-01".to_string()),
                (AlertSeverity::High, "shortage-2025-02-01".to_string()),
                (AlertSeverity::Medium, "seasonal-2024-12".to_string()),
                (AlertSeverity::Low, "opportunity-2024-12-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_overdraft_floor_only_flags_breaches() {
        let f = forecast(
            date(2024, 4, 1),
            vec![
                projection(date(2024, 4, 1), dec!(-40_000), dec!(0.5)),
                projection(date(2024, 5, 1), dec!(-60_000), dec!(0.5)),
            ],
        );
        let alerts =
            generate_cash_flow_alerts(&f, dec!(0), Some(dec!(-50_000)), &EngineConfig::default())
                .unwrap();
        let shortages: Vec<&CashFlowAlert> = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Shortage)
            .collect();
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].id, "shortage-2024-05-01");
        assert_eq!(shortages[0].severity, AlertSeverity::Critical);
        assert_eq!(shortages[0].estimated_impact, dec!(10_000));
    }

    #[test]
    fn test_collection_alerts_for_critical_invoices() {
        use crate::collections::analysis::{analyze_collection_patterns, CollectionInput};
        use crate::types::{Invoice, InvoiceStatus};

        let input = CollectionInput {
            as_of: date(2024, 6, 1),
            invoices: vec![
                Invoice {
                    id: "OLD".into(),
                    matter_id: "M-1".into(),
                    issue_date: date(2024, 1, 1),
                    due_date: date(2024, 1, 31),
                    amount: dec!(10_000),
                    status: InvoiceStatus::Overdue,
                },
                Invoice {
                    id: "NEW".into(),
                    matter_id: "M-1".into(),
                    issue_date: date(2024, 5, 25),
                    due_date: date(2024, 6, 24),
                    amount: dec!(10_000),
                    status: InvoiceStatus::Sent,
                },
            ],
            payments: vec![],
        };
        let analysis = analyze_collection_patterns(&input, &EngineConfig::default()).unwrap();
        let alerts = generate_collection_alerts(&analysis, input.as_of);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "collection-OLD");
        assert_eq!(alerts[0].estimated_impact, dec!(7_000));
    }
}
