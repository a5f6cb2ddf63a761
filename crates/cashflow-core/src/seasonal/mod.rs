//! Seasonal business-cycle patterns.
//!
//! A litigation practice bills unevenly through the year: court recesses,
//! fiscal year-ends and holidays all move receipts. Patterns are supplied
//! through [`EngineConfig`](crate::config::EngineConfig); the table below is
//! only the default calibration.

pub mod adjust;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Probability, Rate};

/// Historical activity profile for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    /// Calendar month index, 0 = January.
    pub month: u32,
    /// Multiplier applied to expected inflow (> 0).
    pub multiplier: Rate,
    /// Weight applied to period confidence, in [0, 1].
    pub confidence: Probability,
    #[serde(default)]
    pub factors: Vec<String>,
}

/// Pattern for the calendar month of `date`, if one is configured.
pub fn pattern_for(
    patterns: &BTreeMap<u32, SeasonalPattern>,
    date: NaiveDate,
) -> Option<&SeasonalPattern> {
    patterns.get(&date.month0())
}

/// Default litigation-calendar table with year-end and mid-year slowdowns.
pub fn default_seasonal_patterns() -> BTreeMap<u32, SeasonalPattern> {
    let rows: [(u32, Rate, Probability, &[&str]); 12] = [
        (0, dec!(0.7), dec!(0.8), &["Post-holiday slowdown", "Clients settling year-end budgets"]),
        (
            1,
            dec!(0.9),
            dec!(0.75),
            &["Court calendars resuming", "Delayed year-end payments arriving"],
        ),
        (
            2,
            dec!(1.1),
            dec!(0.8),
            &["Quarter-end billing push", "Fiscal year-end for many clients"],
        ),
        (3, dec!(1.0), dec!(0.75), &["Steady court activity"]),
        (4, dec!(0.8), dec!(0.7), &["Trial preparation absorbs billable capacity"]),
        (5, dec!(1.0), dec!(0.75), &["Half-year settlements", "Quarter-end billing push"]),
        (6, dec!(0.9), dec!(0.7), &["Summer vacation begins", "Reduced client responsiveness"]),
        (7, dec!(0.8), dec!(0.7), &["Court recess", "Peak vacation period"]),
        (8, dec!(1.1), dec!(0.8), &["Return from recess", "Backlog of hearings"]),
        (
            9,
            dec!(1.2),
            dec!(0.85),
            &["Peak litigation activity", "Clients spending remaining budgets"],
        ),
        (10, dec!(1.1), dec!(0.8), &["Pre-holiday settlements"]),
        (11, dec!(0.6), dec!(0.7), &["Holiday slowdown", "Year-end payment delays"]),
    ];

    rows.into_iter()
        .map(|(month, multiplier, confidence, factors)| {
            (
                month,
                SeasonalPattern {
                    month,
                    multiplier,
                    confidence,
                    factors: factors.iter().map(|f| f.to_string()).collect(),
                },
            )
        })
        .collect()
}
