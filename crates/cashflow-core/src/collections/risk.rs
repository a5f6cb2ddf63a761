//! Aging-based collection risk.
//!
//! A deliberately coarse step function: auditors can read off exactly why
//! an invoice was discounted to 70% rather than reverse-engineer a curve.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CollectionCurve;
use crate::types::{days_between, Invoice, Money, Probability};
use crate::{CashFlowError, CashFlowResult};

/// Qualitative bucket for a collection probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Expected settlement of one unpaid invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCollection {
    pub invoice_id: String,
    /// Projected settlement date.
    pub date: NaiveDate,
    /// Face amount outstanding.
    pub amount: Money,
    /// `amount × probability`.
    pub expected_amount: Money,
    pub probability: Probability,
    pub risk_level: RiskLevel,
}

/// Probability that a receivable `days` old (or past due) is collected.
///
/// Non-increasing in `days`: anything not yet aged gets the curve's
/// `current` value, otherwise the last step whose threshold is exceeded.
pub fn collection_probability(days: i64, curve: &CollectionCurve) -> Probability {
    curve
        .steps
        .iter()
        .rev()
        .find(|step| days > step.after_days)
        .map(|step| step.probability)
        .unwrap_or(curve.current)
}

/// Map a collection probability onto a risk tier.
pub fn risk_level(probability: Probability) -> RiskLevel {
    if probability >= Decimal::new(9, 1) {
        RiskLevel::Low
    } else if probability >= Decimal::new(7, 1) {
        RiskLevel::Medium
    } else if probability >= Decimal::new(5, 1) {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Project when and how much of `invoice` is likely to be collected.
///
/// Settlement is assumed `average_collection_days` after issue; the
/// probability is keyed on days since issue as of `as_of`.
pub fn project_settlement(
    invoice: &Invoice,
    as_of: NaiveDate,
    average_collection_days: Decimal,
    curve: &CollectionCurve,
) -> CashFlowResult<ProjectedCollection> {
    let offset = average_collection_days
        .round()
        .to_i64()
        .ok_or_else(|| CashFlowError::InvalidInput {
            field: "average_collection_days".into(),
            reason: format!("{average_collection_days} is not a usable day count"),
        })?;
    let date = chrono::Duration::try_days(offset)
        .and_then(|delta| invoice.issue_date.checked_add_signed(delta))
        .ok_or_else(|| {
            CashFlowError::DateError(format!(
                "invoice {} settlement date overflows ({} + {} days)",
                invoice.id, invoice.issue_date, offset
            ))
        })?;

    let probability = collection_probability(days_between(invoice.issue_date, as_of), curve);

    Ok(ProjectedCollection {
        invoice_id: invoice.id.clone(),
        date,
        amount: invoice.amount,
        expected_amount: invoice.amount * probability,
        probability,
        risk_level: risk_level(probability),
    })
}
