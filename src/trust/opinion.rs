// trust/opinion.rs - Third-Party Opinions

use serde::Serialize;
use tracing::trace;

use super::TrustError;
use crate::scenario::{HistoryEntry, Scenario, UserId};

/// Pooled opinion of every third party about one sender
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpinionAggregate {
    /// Users whose records were pooled, in scenario order
    pub providers: Vec<UserId>,

    /// Sum of the providers' success counts
    pub successes: u64,

    /// Sum of the providers' failure counts
    pub failures: u64,

    /// Posterior mean of the pooled counts
    pub value: f64,
}

impl OpinionAggregate {
    /// The pooled counts as a single history
    pub fn pooled(&self) -> HistoryEntry {
        HistoryEntry::new(self.successes, self.failures)
    }
}

/// Pool every third party's record of `sender`.
///
/// Providers are all scenario users except `sender` and `recipient`. Counts
/// are summed without weighting providers by their own reliability. Fails
/// with `InsufficientData` when there are no providers and `MissingHistory`
/// when a provider has no record of the sender.
pub fn aggregate_opinions(
    sender: &UserId,
    recipient: &UserId,
    scenario: &Scenario,
) -> Result<OpinionAggregate, TrustError> {
    let mut providers = Vec::new();
    let mut successes: u64 = 0;
    let mut failures: u64 = 0;

    for provider in scenario.third_parties(sender, recipient) {
        let report = scenario.history().get(provider, sender)?;
        trace!(provider = %provider, sender = %sender, report = %report, "Opinion collected");

        successes = successes.saturating_add(report.successes);
        failures = failures.saturating_add(report.failures);
        providers.push(provider.clone());
    }

    if providers.is_empty() {
        return Err(TrustError::InsufficientData {
            sender: sender.clone(),
            recipient: recipient.clone(),
        });
    }

    let (alpha, beta) = HistoryEntry::new(successes, failures).shape();
    Ok(OpinionAggregate {
        providers,
        successes,
        failures,
        value: alpha / (alpha + beta),
    })
}

/// Opinion-based trust value of `sender`, see [`aggregate_opinions`]
pub fn opinions(sender: &UserId, recipient: &UserId, scenario: &Scenario) -> Result<f64, TrustError> {
    aggregate_opinions(sender, recipient, scenario).map(|aggregate| aggregate.value)
}
