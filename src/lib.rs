// lib.rs - TRAVOS Trust Evaluation
//
// Bayesian trust evaluation between interacting agents, with a persistent
// scenario store and an HTTP API.

#![doc = include_str!("../README.md")]

pub mod api;
pub mod config;
pub mod observability;
pub mod scenario;
pub mod store;
pub mod trust;

// Re-export commonly used types
pub use scenario::{
    HistoryEntry, HistoryTable, Observation, Scenario, ScenarioBuilder, ScenarioDocument, UserId,
};

pub use trust::{
    evaluate, BatchEvaluator, Outcome, TieBreak, TrustDecision, TrustEngine, TrustError,
    TrustPolicy, TrustResult, TrustSource,
};

pub use store::{ScenarioStore, StoreError};

pub use config::{AppConfig, ConfigError};

pub use observability::{
    init_metrics, init_tracing, MetricsConfig, MetricsHandle, TracingConfig, TracingFormat,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::scenario::{HistoryEntry, Observation, Scenario, ScenarioDocument, UserId};
    pub use crate::trust::{
        evaluate, BatchEvaluator, Outcome, TieBreak, TrustEngine, TrustError, TrustPolicy,
        TrustResult, TrustSource,
    };
}
