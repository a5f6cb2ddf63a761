//! Engine configuration.
//!
//! Every business assumption the engine relies on lives here: the seasonal
//! pattern table, the baseline expense figure, the aging-based collection
//! curve, alert/advisor thresholds and the fallback values used when input
//! history is sparse. The engine never mutates its configuration, so a single
//! `EngineConfig` may be shared across concurrent forecasts.
//!
//! All sections carry `#[serde(default)]`, so a partial YAML/JSON document
//! only needs to name the values it recalibrates.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::seasonal::{default_seasonal_patterns, SeasonalPattern};
use crate::types::{Money, Probability, Rate};
use crate::{CashFlowError, CashFlowResult};

// ---------------------------------------------------------------------------
// Fallback assumptions
// ---------------------------------------------------------------------------

/// Average issue-to-payment days assumed when no paid invoice can be matched
/// to a payment.
pub const DEFAULT_COLLECTION_DAYS: Decimal = dec!(45);

/// Starting point for the overall forecast confidence score.
pub const BASE_CONFIDENCE: Probability = dec!(0.8);

/// Confidence of the first projected period; later periods decay from here.
pub const INITIAL_PERIOD_CONFIDENCE: Probability = dec!(0.8);

/// Linear confidence decay per projected period.
pub const PERIOD_CONFIDENCE_DECAY: Probability = dec!(0.05);

/// Lower bound of the overall confidence score.
pub const MIN_OVERALL_CONFIDENCE: Probability = dec!(0.3);

/// Upper bound of the overall confidence score.
pub const MAX_OVERALL_CONFIDENCE: Probability = dec!(0.95);

/// Placeholder operating expense per projected period.
pub const DEFAULT_BASELINE_EXPENSE: Money = dec!(150_000);

/// Balance below which a projected period raises a shortage alert.
pub const DEFAULT_MINIMUM_BALANCE: Money = dec!(50_000);

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calendar month index (0 = January) to seasonal pattern.
    pub seasonal_patterns: BTreeMap<u32, SeasonalPattern>,
    /// Operating expense charged against every projected period.
    pub baseline_expense: Money,
    pub collection_curve: CollectionCurve,
    pub thresholds: Thresholds,
    pub assumptions: Assumptions,
    pub advisor: AdvisorFactors,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seasonal_patterns: default_seasonal_patterns(),
            baseline_expense: DEFAULT_BASELINE_EXPENSE,
            collection_curve: CollectionCurve::default(),
            thresholds: Thresholds::default(),
            assumptions: Assumptions::default(),
            advisor: AdvisorFactors::default(),
        }
    }
}

/// Aging-based collection probability ladder.
///
/// `current` applies to anything not yet past due (days <= 0). Each step
/// applies once the age strictly exceeds `after_days`; the last matching
/// step wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionCurve {
    pub current: Probability,
    pub steps: Vec<CollectionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStep {
    pub after_days: i64,
    pub probability: Probability,
}

impl Default for CollectionCurve {
    fn default() -> Self {
        CollectionCurve {
            current: dec!(0.9),
            steps: vec![
                CollectionStep { after_days: 0, probability: dec!(0.8) },
                CollectionStep { after_days: 30, probability: dec!(0.7) },
                CollectionStep { after_days: 60, probability: dec!(0.5) },
                CollectionStep { after_days: 90, probability: dec!(0.3) },
            ],
        }
    }
}

/// Trigger levels for alerts, recommendations and advisor strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Default minimum balance for shortage alerts.
    pub minimum_balance: Money,
    /// Seasonal alert fires when the current month's multiplier is below this.
    pub seasonal_alert_multiplier: Rate,
    /// Days ahead of the forecast date a seasonal alert is due.
    pub seasonal_alert_lead_days: u32,
    /// Periods above this confidence feed the opportunity alert.
    pub opportunity_confidence: Probability,
    /// Historical volatility that triggers a billing-frequency recommendation.
    pub volatility_recommendation: Money,
    /// Historical volatility that lowers the overall confidence score.
    pub volatility_confidence_penalty: Money,
    /// Invoice count below which the sample counts as insufficient.
    pub minimum_invoice_sample: usize,
    /// Average collection days above which collections are flagged slow.
    pub slow_collection_days: Decimal,
    /// Share of overdue invoices above which collections are flagged risky.
    pub overdue_ratio: Rate,
    /// Unbilled WIP above which billing-frequency optimization is proposed.
    pub unbilled_wip: Money,
    /// Net flow below which the near-term outlook calls for reserves.
    pub seasonal_preparation_net_floor: Money,
    /// Number of leading projections inspected for seasonal preparation.
    pub seasonal_preparation_lookahead: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            minimum_balance: DEFAULT_MINIMUM_BALANCE,
            seasonal_alert_multiplier: dec!(0.8),
            seasonal_alert_lead_days: 30,
            opportunity_confidence: dec!(0.8),
            volatility_recommendation: dec!(50_000),
            volatility_confidence_penalty: dec!(100_000),
            minimum_invoice_sample: 10,
            slow_collection_days: dec!(60),
            overdue_ratio: dec!(0.2),
            unbilled_wip: dec!(100_000),
            seasonal_preparation_net_floor: dec!(-50_000),
            seasonal_preparation_lookahead: 3,
        }
    }
}

/// Values used in place of missing data, and the confidence scoring ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    pub default_collection_days: Decimal,
    pub base_confidence: Probability,
    pub initial_period_confidence: Probability,
    pub period_confidence_decay: Probability,
    pub small_sample_penalty: Probability,
    pub volatility_penalty: Probability,
    pub min_confidence: Probability,
    pub max_confidence: Probability,
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            default_collection_days: DEFAULT_COLLECTION_DAYS,
            base_confidence: BASE_CONFIDENCE,
            initial_period_confidence: INITIAL_PERIOD_CONFIDENCE,
            period_confidence_decay: PERIOD_CONFIDENCE_DECAY,
            small_sample_penalty: dec!(0.2),
            volatility_penalty: dec!(0.1),
            min_confidence: MIN_OVERALL_CONFIDENCE,
            max_confidence: MAX_OVERALL_CONFIDENCE,
        }
    }
}

/// Impact factors used when sizing remediation strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorFactors {
    /// Share of overdue receivables recoverable by accelerated collection.
    pub collection_recovery_rate: Rate,
    /// Share of unbilled WIP converted by shorter billing cycles.
    pub billing_conversion_rate: Rate,
    /// Reserve target proposed ahead of a seasonal trough.
    pub seasonal_reserve: Money,
}

impl Default for AdvisorFactors {
    fn default() -> Self {
        AdvisorFactors {
            collection_recovery_rate: dec!(0.7),
            billing_conversion_rate: dec!(0.8),
            seasonal_reserve: dec!(200_000),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> CashFlowResult<()> {
        for (month, pattern) in &self.seasonal_patterns {
            if *month > 11 {
                return Err(invalid(
                    "seasonal_patterns",
                    format!("month index {month} is outside 0-11"),
                ));
            }
            if pattern.month != *month {
                return Err(invalid(
                    "seasonal_patterns",
                    format!(
                        "pattern keyed under month {month} declares month {}",
                        pattern.month
                    ),
                ));
            }
            if pattern.multiplier <= Decimal::ZERO {
                return Err(invalid(
                    "seasonal_patterns",
                    format!("multiplier for month {month} must be positive"),
                ));
            }
            if !is_probability(pattern.confidence) {
                return Err(invalid(
                    "seasonal_patterns",
                    format!("confidence for month {month} must be within [0, 1]"),
                ));
            }
        }

        if self.baseline_expense < Decimal::ZERO {
            return Err(invalid("baseline_expense", "cannot be negative".into()));
        }

        self.collection_curve.validate()?;

        let a = &self.assumptions;
        if a.default_collection_days < Decimal::ZERO {
            return Err(invalid(
                "assumptions.default_collection_days",
                "cannot be negative".into(),
            ));
        }
        if !is_probability(a.min_confidence)
            || !is_probability(a.max_confidence)
            || a.min_confidence > a.max_confidence
        {
            return Err(invalid(
                "assumptions.min_confidence",
                "confidence bounds must satisfy 0 <= min <= max <= 1".into(),
            ));
        }
        if a.period_confidence_decay < Decimal::ZERO {
            return Err(invalid(
                "assumptions.period_confidence_decay",
                "cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

impl CollectionCurve {
    fn validate(&self) -> CashFlowResult<()> {
        if !is_probability(self.current) {
            return Err(invalid(
                "collection_curve.current",
                "must be within [0, 1]".into(),
            ));
        }
        let mut previous_days = i64::MIN;
        let mut previous_probability = self.current;
        for step in &self.steps {
            if step.after_days <= previous_days {
                return Err(invalid(
                    "collection_curve.steps",
                    "steps must be sorted by strictly increasing after_days".into(),
                ));
            }
            if !is_probability(step.probability) || step.probability > previous_probability {
                return Err(invalid(
                    "collection_curve.steps",
                    format!(
                        "probability after {} days must be within [0, {}]",
                        step.after_days, previous_probability
                    ),
                ));
            }
            previous_days = step.after_days;
            previous_probability = step.probability;
        }
        Ok(())
    }
}

fn is_probability(p: Decimal) -> bool {
    p >= Decimal::ZERO && p <= Decimal::ONE
}

fn invalid(field: &str, reason: String) -> CashFlowError {
    CashFlowError::InvalidInput {
        field: field.into(),
        reason,
    }
}
