// observability/mod.rs - Tracing and Metrics

//! Observability module providing structured logging and Prometheus metrics.
//!
//! # Features
//!
//! - **Tracing**: Structured logging with span context for every decision
//! - **Metrics**: Prometheus-compatible counters and histograms for evaluations
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder,
//! so library users that never call it pay nothing.
//!
//! # Example
//!
//! ```ignore
//! use travos_trust::observability::{init_metrics, init_tracing, MetricsConfig, TracingConfig};
//!
//! init_tracing(TracingConfig::default());
//! let handle = init_metrics(MetricsConfig::default()).unwrap();
//! ```

mod metrics;
mod tracing_setup;

pub use self::metrics::{
    init_metrics, record_decision, record_evaluation, DecisionMetrics, EvaluationMetrics,
    MetricsConfig, MetricsHandle,
};

pub use self::tracing_setup::{init_tracing, TracingConfig, TracingFormat};
