//! Cash-flow forecast composition.
//!
//! Flow: payment history and open invoices are analysed independently, the
//! base projection is rescaled by the seasonal table, scenarios are derived
//! from the adjusted series, and the whole is scored and annotated with
//! recommendations.

pub mod confidence;
pub mod projection;
pub mod scenarios;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collections::analysis::validate_invoices;
use crate::config::EngineConfig;
use crate::history::{analyze_historical_patterns, HistoricalAnalysis, SEASONALITY_MIN_MONTHS};
use crate::seasonal::adjust::apply_seasonal_adjustment;
use crate::types::{
    CashFlowProjection, Invoice, Matter, Money, Payment, PeriodType, Probability, TimeEntry,
};
use crate::CashFlowResult;

pub use scenarios::CashFlowScenario;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    /// Anchor date of the first projected period.
    pub as_of: NaiveDate,
    #[serde(default)]
    pub period: PeriodType,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub matters: Vec<Matter>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Cash on hand before the first period.
    #[serde(default)]
    pub starting_balance: Money,
    /// Number of periods; defaults to 12 (weekly/monthly) or 4 (quarterly).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowForecast {
    pub as_of: NaiveDate,
    pub period: PeriodType,
    pub starting_balance: Money,
    /// Seasonally adjusted projections, oldest first.
    pub projections: Vec<CashFlowProjection>,
    pub overall_confidence: Probability,
    pub scenarios: Vec<CashFlowScenario>,
    /// Probability-weighted closing balance across the scenarios.
    pub expected_closing_balance: Money,
    pub recommendations: Vec<String>,
    pub historical: HistoricalAnalysis,
    /// Unbilled work-in-progress across all matters.
    pub unbilled_wip: Money,
    /// Value of recorded time entries not yet billed.
    pub unbilled_time_value: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Produce a complete forecast from already-fetched practice records.
pub fn generate_forecast(
    input: &ForecastInput,
    config: &EngineConfig,
) -> CashFlowResult<CashFlowForecast> {
    validate_invoices(&input.invoices)?;

    let historical = analyze_historical_patterns(&input.payments, &input.invoices)?;
    let base = projection::generate_base_projections(input, config)?;
    let projections = apply_seasonal_adjustment(&base, &config.seasonal_patterns);
    let scenarios = scenarios::generate_scenarios(&projections, input.starting_balance);
    let expected_closing_balance = scenarios::expected_closing_balance(&scenarios);
    let overall_confidence =
        confidence::overall_confidence(input.invoices.len(), historical.volatility, config);

    let unbilled_wip: Money = input.matters.iter().map(|m| m.wip_value).sum();
    let unbilled_time_value: Money = input
        .time_entries
        .iter()
        .filter(|t| !t.billed)
        .map(|t| t.value())
        .sum();

    let recommendations =
        build_recommendations(config, &historical, &projections, unbilled_time_value);

    let closing_balance = projections
        .last()
        .map(|p| p.cumulative_balance)
        .unwrap_or(input.starting_balance);
    tracing::info!(
        as_of = %input.as_of,
        period = ?input.period,
        periods = projections.len(),
        overall_confidence = %overall_confidence,
        closing_balance = %closing_balance,
        expected_closing_balance = %expected_closing_balance,
        "cash flow forecast generated"
    );

    Ok(CashFlowForecast {
        as_of: input.as_of,
        period: input.period,
        starting_balance: input.starting_balance,
        projections,
        overall_confidence,
        scenarios,
        expected_closing_balance,
        recommendations,
        historical,
        unbilled_wip,
        unbilled_time_value,
    })
}

/// Data-quality caveats worth surfacing alongside a forecast.
pub fn forecast_warnings(
    input: &ForecastInput,
    forecast: &CashFlowForecast,
    config: &EngineConfig,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if input.invoices.len() < config.thresholds.minimum_invoice_sample {
        warnings.push(format!(
            "Only {} invoices supplied; overall confidence reduced for small sample.",
            input.invoices.len()
        ));
    }
    if input.payments.is_empty() {
        warnings.push("No payment history supplied; trend and volatility are zero.".into());
    } else if !forecast.historical.seasonality_detected {
        warnings.push(format!(
            "Payment history covers {} of the {} months the approximate seasonality \
             check needs. Seasonal adjustment always uses the configured table.",
            forecast.historical.months_observed(),
            SEASONALITY_MIN_MONTHS
        ));
    }
    warnings
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_recommendations(
    config: &EngineConfig,
    historical: &HistoricalAnalysis,
    projections: &[CashFlowProjection],
    unbilled_time_value: Money,
) -> Vec<String> {
    let mut recs = Vec::new();

    if historical.volatility > config.thresholds.volatility_recommendation {
        recs.push(format!(
            "Monthly receipts vary by {} (standard deviation). Move to more frequent \
             interim billing to smooth cash inflow.",
            historical.volatility.round_dp(2)
        ));
    }

    if historical.trend < Decimal::ZERO {
        recs.push(format!(
            "Collections are trending down by {} per month. Review the matter pipeline \
             and billing cadence.",
            historical.trend.abs().round_dp(2)
        ));
    }

    if let Some(first_negative) = projections
        .iter()
        .find(|p| p.cumulative_balance < Decimal::ZERO)
    {
        recs.push(format!(
            "Projected balance turns negative on {}. Arrange a credit facility or defer \
             discretionary spending before then.",
            first_negative.date
        ));
    }

    if unbilled_time_value > Decimal::ZERO {
        recs.push(format!(
            "{} of recorded time is unbilled. Invoice it to bring it into the forecast.",
            unbilled_time_value.round_dp(2)
        ));
    }

    if recs.is_empty() {
        recs.push(
            "Cash position is stable across the horizon. Continue monitoring receivables \
             aging each period."
                .to_string(),
        );
    }

    recs
}
