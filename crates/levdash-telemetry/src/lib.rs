//! Prometheus metrics and structured logging for levdash.
//!
//! - Prometheus metrics for backend requests, query cache and mutations
//! - Structured logging with tracing (JSON in production, pretty otherwise)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
