use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CashFlowError, CashFlowResult};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and multipliers expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Probabilities and confidence values in [0, 1].
pub type Probability = Decimal;

// ---------------------------------------------------------------------------
// Source records (read-only snapshots supplied by the practice system)
// ---------------------------------------------------------------------------

/// Billing lifecycle state of an invoice. Owned by the billing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Unpaid,
    Paid,
    Overdue,
    Disputed,
    WrittenOff,
}

impl InvoiceStatus {
    /// Issued to the client and still expected to convert into cash.
    pub fn is_open(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Unpaid)
    }

    /// Unsettled, including invoices already flagged as overdue.
    pub fn is_unpaid(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Sent | InvoiceStatus::Unpaid | InvoiceStatus::Overdue
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub matter_id: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub amount: Money,
    pub payment_date: NaiveDate,
}

/// A matter and its accumulated unbilled work-in-progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub wip_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub matter_id: String,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub rate: Money,
    #[serde(default)]
    pub billed: bool,
}

impl TimeEntry {
    pub fn value(&self) -> Money {
        self.hours * self.rate
    }
}

// ---------------------------------------------------------------------------
// Projection periods
// ---------------------------------------------------------------------------

/// Forecast bucket granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

impl PeriodType {
    /// Number of periods projected when the caller does not override it.
    pub fn default_horizon(&self) -> u32 {
        match self {
            PeriodType::Weekly | PeriodType::Monthly => 12,
            PeriodType::Quarterly => 4,
        }
    }

    /// Advance `from` by `periods` whole periods.
    ///
    /// Each date is computed from the anchor rather than chained, so month-end
    /// clamping (31 Jan -> 28 Feb) does not drift later periods.
    pub fn advance(&self, from: NaiveDate, periods: u32) -> CashFlowResult<NaiveDate> {
        let next = match self {
            PeriodType::Weekly => from.checked_add_days(Days::new(7 * u64::from(periods))),
            PeriodType::Monthly => from.checked_add_months(Months::new(periods)),
            PeriodType::Quarterly => from.checked_add_months(Months::new(3 * periods)),
        };
        next.ok_or_else(|| {
            CashFlowError::DateError(format!(
                "cannot advance {from} by {periods} {self:?} periods"
            ))
        })
    }
}

/// One forecast bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub date: NaiveDate,
    pub expected_inflow: Money,
    pub expected_outflow: Money,
    pub net_cash_flow: Money,
    pub cumulative_balance: Money,
    pub confidence: Probability,
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
