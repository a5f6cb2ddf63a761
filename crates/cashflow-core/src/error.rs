use thiserror::Error;

#[derive(Debug, Error)]
pub enum CashFlowError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Boundary wrapper for anything that goes wrong while building a forecast.
    #[error("Forecast generation failed: {0}")]
    ForecastFailed(#[source] Box<CashFlowError>),

    /// Boundary wrapper for collection pattern analysis.
    #[error("Collection analysis failed: {0}")]
    CollectionAnalysisFailed(#[source] Box<CashFlowError>),
}

impl CashFlowError {
    pub fn forecast_failed(inner: CashFlowError) -> Self {
        match inner {
            already @ CashFlowError::ForecastFailed(_) => already,
            other => CashFlowError::ForecastFailed(Box::new(other)),
        }
    }

    pub fn collection_analysis_failed(inner: CashFlowError) -> Self {
        match inner {
            already @ CashFlowError::CollectionAnalysisFailed(_) => already,
            other => CashFlowError::CollectionAnalysisFailed(Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for CashFlowError {
    fn from(e: serde_json::Error) -> Self {
        CashFlowError::SerializationError(e.to_string())
    }
}
