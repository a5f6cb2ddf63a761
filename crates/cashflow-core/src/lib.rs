//! Cash-flow forecasting and collection-risk engine.
//!
//! Pure computation over already-fetched practice records: invoices,
//! payments, matters and time entries go in, projections, scenarios, alerts
//! and strategies come out. No I/O happens here.
//!
//! All calculations use `rust_decimal::Decimal`. No `f64`.

pub mod alerts;
pub mod collections;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod history;
pub mod optimization;
pub mod seasonal;
pub mod types;

pub use config::EngineConfig;
pub use engine::CashFlowEngine;
pub use error::CashFlowError;
pub use types::*;

/// Standard result type for all engine operations
pub type CashFlowResult<T> = Result<T, CashFlowError>;
