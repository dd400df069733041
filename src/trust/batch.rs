// trust/batch.rs - Batch Evaluation of Scenario Observations

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::time::Instant;
use tracing::{info, instrument, warn};

use super::engine::{Outcome, TrustDecision, TrustEngine, TrustPolicy, TrustSource};
use super::TrustError;
use crate::observability::record_evaluation;
use crate::scenario::{HistoryEntry, Observation, Scenario, UserId};

/// Result of judging one observation.
///
/// Serializes to the wire object
/// `{ "observation(i)", final_trust_score, final_trust_outcome, previous_history, sender, receiver }`.
/// The decision trace fields are kept for callers but are not part of that object.
#[derive(Clone, Debug, PartialEq)]
pub struct TrustResult {
    /// 1-based position in the scenario's observation list
    pub index: usize,
    pub message: String,
    pub final_trust_value: f64,
    pub final_outcome: HistoryEntry,
    pub previous_history: HistoryEntry,
    pub sender: UserId,
    pub recipient: UserId,

    pub source: TrustSource,
    pub outcome: Outcome,
    pub experience: f64,
    pub confidence: f64,
}

impl TrustResult {
    fn from_decision(index: usize, observation: &Observation, decision: TrustDecision) -> Self {
        Self {
            index,
            message: observation.message.clone(),
            final_trust_value: decision.final_trust_value,
            final_outcome: decision.final_outcome,
            previous_history: decision.previous_history,
            sender: decision.sender,
            recipient: decision.recipient,
            source: decision.source,
            outcome: decision.outcome,
            experience: decision.experience,
            confidence: decision.confidence,
        }
    }

    /// Key under which the message appears in the wire object
    pub fn observation_key(&self) -> String {
        format!("observation({})", self.index)
    }
}

impl Serialize for TrustResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry(&self.observation_key(), &self.message)?;
        map.serialize_entry("final_trust_score", &self.final_trust_value)?;
        map.serialize_entry("final_trust_outcome", &self.final_outcome.to_string())?;
        map.serialize_entry("previous_history", &self.previous_history.to_string())?;
        map.serialize_entry("sender", &self.sender)?;
        map.serialize_entry("receiver", &self.recipient)?;
        map.end()
    }
}

/// Evaluates every observation of a scenario
#[derive(Clone, Debug)]
pub struct BatchEvaluator {
    engine: TrustEngine,
    parallel: bool,
}

impl Default for BatchEvaluator {
    fn default() -> Self {
        Self::new(TrustEngine::default())
    }
}

impl BatchEvaluator {
    pub fn new(engine: TrustEngine) -> Self {
        Self {
            engine,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Evaluator with the given policy
    pub fn with_policy(policy: TrustPolicy) -> Self {
        Self::new(TrustEngine::new(policy))
    }

    /// Enable or disable parallel evaluation.
    ///
    /// Without the `parallel` feature this is always sequential.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel && cfg!(feature = "parallel");
        self
    }

    pub fn engine(&self) -> &TrustEngine {
        &self.engine
    }

    /// Judge every observation in order.
    ///
    /// Results are in observation order regardless of execution strategy.
    /// The first failing observation (by index) aborts the whole batch.
    #[instrument(skip_all, fields(scenario = scenario.name().unwrap_or("<unnamed>"), observations = scenario.observations().len()))]
    pub fn evaluate(&self, scenario: &Scenario) -> Result<Vec<TrustResult>, TrustError> {
        let started = Instant::now();

        let results = if self.parallel {
            self.evaluate_parallel(scenario)
        } else {
            self.evaluate_sequential(scenario)
        };

        let elapsed = started.elapsed();
        record_evaluation(scenario.observations().len(), elapsed, results.is_ok());

        match &results {
            Ok(results) => info!(
                results = results.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Scenario evaluated"
            ),
            Err(e) => warn!(error = %e, kind = e.kind(), "Scenario evaluation failed"),
        }
        results
    }

    fn judge(&self, index: usize, observation: &Observation, scenario: &Scenario) -> Result<TrustResult, TrustError> {
        let decision = self
            .engine
            .decide(&observation.sender, &observation.recipient, scenario)?;
        Ok(TrustResult::from_decision(index + 1, observation, decision))
    }

    fn evaluate_sequential(&self, scenario: &Scenario) -> Result<Vec<TrustResult>, TrustError> {
        scenario
            .observations()
            .iter()
            .enumerate()
            .map(|(i, observation)| self.judge(i, observation, scenario))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_parallel(&self, scenario: &Scenario) -> Result<Vec<TrustResult>, TrustError> {
        use rayon::prelude::*;

        let judged: Vec<Result<TrustResult, TrustError>> = scenario
            .observations()
            .par_iter()
            .enumerate()
            .map(|(i, observation)| self.judge(i, observation, scenario))
            .collect();

        // Collected in index order, so the first error here is the lowest-indexed one
        judged.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_parallel(&self, scenario: &Scenario) -> Result<Vec<TrustResult>, TrustError> {
        self.evaluate_sequential(scenario)
    }
}

/// Evaluate a scenario with the default policy
pub fn evaluate(scenario: &Scenario) -> Result<Vec<TrustResult>, TrustError> {
    BatchEvaluator::default().evaluate(scenario)
}
