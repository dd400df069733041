// trust/engine.rs - Trust Decision Engine

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use super::confidence::{confidence_with_margin, ERROR_MARGIN};
use super::experience::experience;
use super::opinion::{aggregate_opinions, OpinionAggregate};
use super::TrustError;
use crate::observability::record_decision;
use crate::scenario::{HistoryEntry, Scenario, UserId};

/// Which side wins when confidence lands exactly on the threshold
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Reaching the threshold is not enough; ask third parties
    #[default]
    Opinion,

    /// Reaching the threshold is enough; trust direct experience
    Experience,
}

/// Threshold policy for trust decisions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustPolicy {
    /// Confidence above which direct experience is used on its own
    pub confidence_threshold: f64,

    /// Trust value above which an interaction counts as trustworthy
    pub cooperation_threshold: f64,

    /// Half-width of the confidence interval around the experience value
    pub error_margin: f64,

    /// Behavior when confidence equals `confidence_threshold`
    pub tie_break: TieBreak,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.95,
            cooperation_threshold: 0.50,
            error_margin: ERROR_MARGIN,
            tie_break: TieBreak::Opinion,
        }
    }
}

impl TrustPolicy {
    /// Check that thresholds are probabilities and the margin is usable
    pub fn validate(&self) -> Result<(), TrustError> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("cooperation_threshold", self.cooperation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrustError::Domain(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.error_margin.is_finite() && self.error_margin > 0.0) {
            return Err(TrustError::Domain(format!(
                "error_margin must be positive, got {}",
                self.error_margin
            )));
        }
        Ok(())
    }
}

/// Source of the final trust value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustSource {
    Experience,
    Opinion,
}

impl TrustSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustSource::Experience => "experience",
            TrustSource::Opinion => "opinion",
        }
    }
}

impl fmt::Display for TrustSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an observed interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Trustworthy,
    Untrustworthy,
}

impl Outcome {
    /// The history as it would read after recording this outcome
    pub fn apply(&self, history: HistoryEntry) -> HistoryEntry {
        match self {
            Outcome::Trustworthy => history.record_success(),
            Outcome::Untrustworthy => history.record_failure(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Trustworthy => "trustworthy",
            Outcome::Untrustworthy => "untrustworthy",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full trace of one trust decision
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrustDecision {
    pub sender: UserId,
    pub recipient: UserId,

    /// The recipient's record of the sender
    pub previous_history: HistoryEntry,

    pub experience: f64,
    pub confidence: f64,
    pub source: TrustSource,

    /// Present only when the opinion path was taken
    pub opinion: Option<OpinionAggregate>,

    pub final_trust_value: f64,
    pub outcome: Outcome,

    /// `previous_history` with the outcome recorded
    pub final_outcome: HistoryEntry,
}

/// Decides how far a recipient should trust a sender
#[derive(Clone, Debug, Default)]
pub struct TrustEngine {
    policy: TrustPolicy,
}

impl TrustEngine {
    pub fn new(policy: TrustPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Pick the value source for a confidence level
    pub fn select_source(&self, confidence: f64) -> TrustSource {
        let threshold = self.policy.confidence_threshold;
        if confidence > threshold {
            TrustSource::Experience
        } else if confidence < threshold {
            TrustSource::Opinion
        } else {
            match self.policy.tie_break {
                TieBreak::Opinion => TrustSource::Opinion,
                TieBreak::Experience => TrustSource::Experience,
            }
        }
    }

    /// Classify an interaction.
    ///
    /// An opinion must clear the cooperation threshold and must not be more
    /// pessimistic than direct experience.
    pub fn classify(&self, source: TrustSource, experience: f64, trust_value: f64) -> Outcome {
        let cooperative = trust_value > self.policy.cooperation_threshold;
        let trustworthy = match source {
            TrustSource::Experience => cooperative,
            TrustSource::Opinion => cooperative && trust_value >= experience,
        };
        if trustworthy {
            Outcome::Trustworthy
        } else {
            Outcome::Untrustworthy
        }
    }

    /// Judge one interaction from `sender` to `recipient`.
    ///
    /// Reads the recipient's record of the sender, falls back to third-party
    /// opinions when that record is not convincing, and reclassifies the
    /// interaction. The scenario is never modified.
    #[instrument(skip_all, fields(sender = %sender, recipient = %recipient))]
    pub fn decide(
        &self,
        sender: &UserId,
        recipient: &UserId,
        scenario: &Scenario,
    ) -> Result<TrustDecision, TrustError> {
        let history = scenario.history().get(recipient, sender)?;
        let experience = experience(history);
        let confidence = confidence_with_margin(experience, history, self.policy.error_margin)?;
        let source = self.select_source(confidence);

        let (final_trust_value, opinion) = match source {
            TrustSource::Experience => (experience, None),
            TrustSource::Opinion => {
                let aggregate = aggregate_opinions(sender, recipient, scenario)?;
                (aggregate.value, Some(aggregate))
            }
        };

        let outcome = self.classify(source, experience, final_trust_value);
        let final_outcome = outcome.apply(history);

        debug!(
            history = %history,
            experience,
            confidence,
            source = %source,
            trust = final_trust_value,
            outcome = %outcome,
            "Trust decided"
        );
        record_decision(source.as_str(), outcome.as_str(), confidence);

        Ok(TrustDecision {
            sender: sender.clone(),
            recipient: recipient.clone(),
            previous_history: history,
            experience,
            confidence,
            source,
            opinion,
            final_trust_value,
            outcome,
            final_outcome,
        })
    }
}
