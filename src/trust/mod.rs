// trust/mod.rs - TRAVOS Trust Evaluation

//! Bayesian trust evaluation between interacting agents.
//!
//! The model follows TRAVOS: a recipient's record of a sender's past behavior
//! is treated as the evidence of a beta posterior.
//!
//! - **Beta**: beta density and its definite integral
//! - **Experience**: posterior mean of the recipient's own history
//! - **Confidence**: posterior mass within a margin of the experience value
//! - **Opinion**: pooled histories reported by third parties
//! - **Engine**: per-observation decision and outcome reclassification
//! - **Batch**: ordered evaluation of a whole scenario
//!
//! # Example
//!
//! ```
//! use travos_trust::scenario::Scenario;
//! use travos_trust::trust::evaluate;
//!
//! let scenario = Scenario::builder()
//!     .users(["A", "B", "C"])
//!     .history("B", "A", 9, 1)
//!     .history("C", "A", 2, 2)
//!     .observe("A", "B", "m1")
//!     .build()
//!     .unwrap();
//!
//! let results = evaluate(&scenario).unwrap();
//! assert_eq!(results[0].final_outcome.to_string(), "(10, 1)");
//! ```

pub mod batch;
pub mod beta;
pub mod confidence;
pub mod engine;
pub mod experience;
pub mod opinion;

pub use batch::{evaluate, BatchEvaluator, TrustResult};
pub use beta::{definite_integral, density};
pub use confidence::{confidence, confidence_with_margin, ERROR_MARGIN};
pub use engine::{Outcome, TieBreak, TrustDecision, TrustEngine, TrustPolicy, TrustSource};
pub use experience::experience;
pub use opinion::{aggregate_opinions, opinions, OpinionAggregate};

use thiserror::Error;

use crate::scenario::UserId;

/// Errors raised while evaluating trust
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrustError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Missing history: {observer} has no record of {subject}")]
    MissingHistory { observer: UserId, subject: UserId },

    #[error("Insufficient data: no third party can give an opinion on {sender} for {recipient}")]
    InsufficientData { sender: UserId, recipient: UserId },

    #[error("Malformed scenario: {0}")]
    MalformedScenario(String),
}

impl TrustError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TrustError::Domain(_) => "domain",
            TrustError::MissingHistory { .. } => "missing_history",
            TrustError::InsufficientData { .. } => "insufficient_data",
            TrustError::MalformedScenario(_) => "malformed_scenario",
        }
    }
}
