use napi::Result as NapiResult;
use napi_derive::napi;

use cashflow_core::collections::analysis::CollectionInput;
use cashflow_core::engine::{AlertInput, OptimizationInput};
use cashflow_core::forecast::ForecastInput;
use cashflow_core::{CashFlowEngine, EngineConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine for one call: defaults, or a validated config supplied as JSON.
fn engine(config_json: Option<String>) -> NapiResult<CashFlowEngine> {
    match config_json {
        Some(json) => {
            let config: EngineConfig = serde_json::from_str(&json).map_err(to_napi_error)?;
            CashFlowEngine::new(config).map_err(to_napi_error)
        }
        None => Ok(CashFlowEngine::default()),
    }
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_forecast(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: ForecastInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine(config_json)?
        .generate_forecast(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_collection_patterns(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: CollectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine(config_json)?
        .analyze_collection_patterns(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_collection_alerts(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: CollectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let engine = engine(config_json)?;
    let analysis = engine
        .analyze_collection_patterns(&input)
        .map_err(to_napi_error)?;
    let output = engine.generate_collection_alerts(&analysis, input.as_of);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Alerts and optimization
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_cash_flow_alerts(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: AlertInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine(config_json)?
        .generate_cash_flow_alerts(&input.forecast, input.current_balance, input.minimum_balance)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_cash_flow(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: OptimizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        engine(config_json)?.optimize_cash_flow(&input.forecast, &input.invoices, &input.matters);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The default calibration, as a starting point for a practice's own config.
#[napi]
pub fn default_config() -> NapiResult<String> {
    serde_json::to_string(&EngineConfig::default()).map_err(to_napi_error)
}
