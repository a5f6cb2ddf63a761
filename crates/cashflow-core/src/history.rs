//! Historical payment pattern analysis.
//!
//! Payments are bucketed by calendar month and the monthly totals reduced to
//! a least-squares trend and a population volatility. Both feed confidence
//! scoring and the forecast recommendations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{Invoice, Money, Payment};
use crate::{CashFlowError, CashFlowResult};

/// Number of monthly buckets needed before the history is treated as
/// seasonal. A coverage gate only, not a statistical seasonality test.
pub const SEASONALITY_MIN_MONTHS: usize = 12;

/// Canonical calendar-month key. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CashFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CashFlowError::DateError(format!("'{s}' is not a YYYY-MM month"));
        let (year, month) = s.split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }
        Ok(YearMonth { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAnalysis {
    /// Collected cash per calendar month, oldest first.
    pub monthly_totals: Vec<MonthlyTotal>,
    /// Least-squares slope of monthly totals per month.
    pub trend: Decimal,
    /// Population standard deviation of monthly totals.
    pub volatility: Decimal,
    /// Approximate: true once a full year of monthly buckets exists.
    pub seasonality_detected: bool,
    pub total_collected: Money,
    /// Number of invoices the history was analysed alongside.
    pub invoice_count: usize,
}

impl HistoricalAnalysis {
    pub fn months_observed(&self) -> usize {
        self.monthly_totals.len()
    }
}

/// Aggregate past payments into monthly totals and derive trend/volatility.
///
/// Fails with `InvalidInput` when the totals leave the decimal range.
pub fn analyze_historical_patterns(
    payments: &[Payment],
    invoices: &[Invoice],
) -> CashFlowResult<HistoricalAnalysis> {
    let mut buckets: BTreeMap<YearMonth, Money> = BTreeMap::new();
    for payment in payments {
        let bucket = buckets
            .entry(YearMonth::from_date(payment.payment_date))
            .or_insert(Decimal::ZERO);
        *bucket = bucket
            .checked_add(payment.amount)
            .ok_or_else(|| out_of_range("monthly total"))?;
    }

    let totals: Vec<Money> = buckets.values().copied().collect();
    let trend = trend_slope(&totals)?;
    let volatility = population_std_dev(&totals)?;
    let total_collected = checked_sum(&totals).ok_or_else(|| out_of_range("total collected"))?;

    tracing::debug!(
        months = totals.len(),
        trend = %trend,
        volatility = %volatility,
        "historical payment pattern analysed"
    );

    Ok(HistoricalAnalysis {
        monthly_totals: buckets
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect(),
        trend,
        volatility,
        seasonality_detected: totals.len() >= SEASONALITY_MIN_MONTHS,
        total_collected,
        invoice_count: invoices.len(),
    })
}

/// OLS slope of `values` against their index 0..n. Zero below two points.
pub fn trend_slope(values: &[Decimal]) -> CashFlowResult<Decimal> {
    if values.len() < 2 {
        return Ok(Decimal::ZERO);
    }
    let overflow = || out_of_range("trend");
    let n = Decimal::from(values.len());
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_xx = Decimal::ZERO;
    for (i, y) in values.iter().enumerate() {
        let x = Decimal::from(i);
        sum_x += x;
        sum_y = sum_y.checked_add(*y).ok_or_else(overflow)?;
        sum_xy = x
            .checked_mul(*y)
            .and_then(|xy| sum_xy.checked_add(xy))
            .ok_or_else(overflow)?;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let numerator = n
        .checked_mul(sum_xy)
        .zip(sum_x.checked_mul(sum_y))
        .and_then(|(a, b)| a.checked_sub(b))
        .ok_or_else(overflow)?;
    numerator.checked_div(denominator).ok_or_else(overflow)
}

/// Population standard deviation of `values`. Zero below two points.
pub fn population_std_dev(values: &[Decimal]) -> CashFlowResult<Decimal> {
    if values.len() < 2 {
        return Ok(Decimal::ZERO);
    }
    let overflow = || out_of_range("volatility");
    let n = Decimal::from(values.len());
    let mean = checked_sum(values)
        .and_then(|sum| sum.checked_div(n))
        .ok_or_else(overflow)?;
    let mut squares = Decimal::ZERO;
    for v in values {
        squares = v
            .checked_sub(mean)
            .and_then(|d| d.checked_mul(d))
            .and_then(|sq| squares.checked_add(sq))
            .ok_or_else(overflow)?;
    }
    let variance = squares.checked_div(n).ok_or_else(overflow)?;
    Ok(variance.sqrt().unwrap_or(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn checked_sum(values: &[Decimal]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
}

fn out_of_range(what: &str) -> CashFlowError {
    CashFlowError::InvalidInput {
        field: "payments".into(),
        reason: format!("Payment history is too large to compute the {what} in decimal range."),
    }
}
