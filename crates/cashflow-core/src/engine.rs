//! The engine's outer boundary.
//!
//! `CashFlowEngine` owns a validated configuration and exposes the four
//! operations the practice application calls. Failures inside forecast
//! generation and collection analysis are wrapped so callers can fall back
//! to a single "no forecast available" state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::alerts::{self, CashFlowAlert};
use crate::collections::analysis::{self, CollectionAnalysis, CollectionInput};
use crate::config::EngineConfig;
use crate::forecast::{self, CashFlowForecast, ForecastInput};
use crate::optimization::{self, OptimizationPlan};
use crate::types::{Invoice, Matter, Money};
use crate::{CashFlowError, CashFlowResult};

/// Input for alert generation over an existing forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInput {
    pub forecast: CashFlowForecast,
    pub current_balance: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_balance: Option<Money>,
}

/// Input for strategy optimization over an existing forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationInput {
    pub forecast: CashFlowForecast,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub matters: Vec<Matter>,
}

#[derive(Debug, Clone)]
pub struct CashFlowEngine {
    config: EngineConfig,
}

impl Default for CashFlowEngine {
    fn default() -> Self {
        CashFlowEngine {
            config: EngineConfig::default(),
        }
    }
}

impl CashFlowEngine {
    /// Build an engine around `config`, rejecting unusable calibrations.
    pub fn new(config: EngineConfig) -> CashFlowResult<Self> {
        config.validate()?;
        Ok(CashFlowEngine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn generate_forecast(&self, input: &ForecastInput) -> CashFlowResult<CashFlowForecast> {
        forecast::generate_forecast(input, &self.config).map_err(|e| {
            tracing::warn!(error = %e, "forecast generation failed");
            CashFlowError::forecast_failed(e)
        })
    }

    pub fn analyze_collection_patterns(
        &self,
        input: &CollectionInput,
    ) -> CashFlowResult<CollectionAnalysis> {
        analysis::analyze_collection_patterns(input, &self.config).map_err(|e| {
            tracing::warn!(error = %e, "collection analysis failed");
            CashFlowError::collection_analysis_failed(e)
        })
    }

    pub fn generate_cash_flow_alerts(
        &self,
        forecast: &CashFlowForecast,
        current_balance: Money,
        minimum_balance: Option<Money>,
    ) -> CashFlowResult<Vec<CashFlowAlert>> {
        alerts::generate_cash_flow_alerts(forecast, current_balance, minimum_balance, &self.config)
    }

    pub fn generate_collection_alerts(
        &self,
        analysis: &CollectionAnalysis,
        as_of: NaiveDate,
    ) -> Vec<CashFlowAlert> {
        alerts::generate_collection_alerts(analysis, as_of)
    }

    pub fn optimize_cash_flow(
        &self,
        forecast: &CashFlowForecast,
        invoices: &[Invoice],
        matters: &[Matter],
    ) -> OptimizationPlan {
        optimization::optimize_cash_flow(forecast, invoices, matters, &self.config)
    }

    /// Caveats about the data a forecast was built from.
    pub fn forecast_warnings(
        &self,
        input: &ForecastInput,
        forecast: &CashFlowForecast,
    ) -> Vec<String> {
        forecast::forecast_warnings(input, forecast, &self.config)
    }
}
