//! Collection pattern analysis over the full invoice book.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::risk::{project_settlement, ProjectedCollection};
use crate::config::EngineConfig;
use crate::types::{days_between, Invoice, InvoiceStatus, Money, Payment, Rate};
use crate::{CashFlowError, CashFlowResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInput {
    /// Date the analysis is run for; drives invoice aging.
    pub as_of: NaiveDate,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionAnalysis {
    /// Mean days from issue to first payment over matched paid invoices.
    pub average_collection_days: Decimal,
    /// Paired paid invoices the average was computed from (0 = fallback used).
    pub matched_payments: usize,
    /// Collected / invoiced, as a percentage.
    pub collection_rate: Rate,
    pub total_invoiced: Money,
    pub total_collected: Money,
    pub total_overdue: Money,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub projected_collections: Vec<ProjectedCollection>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise how quickly and how completely the firm collects its invoices,
/// and project settlement for everything still outstanding.
pub fn analyze_collection_patterns(
    input: &CollectionInput,
    config: &EngineConfig,
) -> CashFlowResult<CollectionAnalysis> {
    validate_invoices(&input.invoices)?;

    let (average_collection_days, matched_payments) = average_collection_days(
        &input.invoices,
        &input.payments,
        config.assumptions.default_collection_days,
    );
    if matched_payments == 0 {
        tracing::warn!(
            fallback_days = %average_collection_days,
            "no paid invoice matched a payment; using fallback collection period"
        );
    }

    let billed: Vec<&Invoice> = input
        .invoices
        .iter()
        .filter(|inv| inv.status != InvoiceStatus::Draft)
        .collect();
    let billed_ids: HashSet<&str> = billed.iter().map(|inv| inv.id.as_str()).collect();

    let total_invoiced: Money = billed.iter().map(|inv| inv.amount).sum();
    let total_collected: Money = input
        .payments
        .iter()
        .filter(|p| billed_ids.contains(p.invoice_id.as_str()))
        .map(|p| p.amount)
        .sum();
    let collection_rate = if total_invoiced.is_zero() {
        Decimal::ZERO
    } else {
        total_collected / total_invoiced * dec!(100)
    };

    let overdue: Vec<&Invoice> = billed
        .iter()
        .copied()
        .filter(|inv| inv.status == InvoiceStatus::Overdue)
        .collect();
    let total_overdue: Money = overdue.iter().map(|inv| inv.amount).sum();
    let overdue_ratio = if billed.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(overdue.len()) / Decimal::from(billed.len())
    };
    let disputed: Money = billed
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Disputed)
        .map(|inv| inv.amount)
        .sum();

    let projected_collections = input
        .invoices
        .iter()
        .filter(|inv| inv.status.is_unpaid())
        .map(|inv| {
            project_settlement(
                inv,
                input.as_of,
                average_collection_days,
                &config.collection_curve,
            )
        })
        .collect::<CashFlowResult<Vec<_>>>()?;

    let (risk_factors, recommendations) = assess_risk(
        config,
        average_collection_days,
        overdue_ratio,
        total_overdue,
        disputed,
    );

    tracing::debug!(
        invoices = input.invoices.len(),
        payments = input.payments.len(),
        matched_payments,
        collection_rate = %collection_rate,
        outstanding = projected_collections.len(),
        "collection analysis complete"
    );

    Ok(CollectionAnalysis {
        average_collection_days,
        matched_payments,
        collection_rate,
        total_invoiced,
        total_collected,
        total_overdue,
        risk_factors,
        recommendations,
        projected_collections,
    })
}

/// Mean issue-to-payment days over paid invoices with a matching payment.
///
/// Each paid invoice is paired with the first payment that references it.
/// Returns `(fallback, 0)` when nothing can be paired.
pub fn average_collection_days(
    invoices: &[Invoice],
    payments: &[Payment],
    fallback: Decimal,
) -> (Decimal, usize) {
    let durations: Vec<i64> = invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Paid)
        .filter_map(|inv| {
            payments
                .iter()
                .find(|p| p.invoice_id == inv.id)
                .map(|p| days_between(inv.issue_date, p.payment_date))
        })
        .collect();

    if durations.is_empty() {
        return (fallback, 0);
    }
    let total: i64 = durations.iter().sum();
    (
        Decimal::from(total) / Decimal::from(durations.len()),
        durations.len(),
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_invoices(invoices: &[Invoice]) -> CashFlowResult<()> {
    for inv in invoices {
        if inv.due_date < inv.issue_date {
            return Err(CashFlowError::InvalidInput {
                field: format!("invoice:{} due_date", inv.id),
                reason: format!(
                    "due date {} precedes issue date {}",
                    inv.due_date, inv.issue_date
                ),
            });
        }
    }
    Ok(())
}

fn assess_risk(
    config: &EngineConfig,
    average_days: Decimal,
    overdue_ratio: Rate,
    total_overdue: Money,
    disputed: Money,
) -> (Vec<String>, Vec<String>) {
    let thresholds = &config.thresholds;
    let mut factors = Vec::new();
    let mut recs = Vec::new();

    if average_days > thresholds.slow_collection_days {
        factors.push(format!(
            "Average collection period of {} days exceeds {} days.",
            average_days.round_dp(1),
            thresholds.slow_collection_days
        ));
        recs.push(
            "Shorten payment terms and send reminders before invoices fall due."
                .to_string(),
        );
    }

    if overdue_ratio > thresholds.overdue_ratio {
        factors.push(format!(
            "{}% of issued invoices are overdue ({} outstanding).",
            (overdue_ratio * dec!(100)).round_dp(1),
            total_overdue
        ));
        recs.push(
            "Prioritise follow-up on overdue accounts and consider payment plans \
             for the largest balances."
                .to_string(),
        );
    }

    if disputed > Decimal::ZERO {
        factors.push(format!("{} is held up in disputed invoices.", disputed));
        recs.push(
            "Resolve disputed invoices with the responsible partner before they \
             age further."
                .to_string(),
        );
    }

    if recs.is_empty() {
        recs.push(
            "Collection performance is within targets. Continue current billing \
             and follow-up practices."
                .to_string(),
        );
    }

    (factors, recs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
