// scenario/mod.rs - Users, Interaction Histories and Observations

//! Scenario data model.
//!
//! A [`Scenario`] is the unit of evaluation: a set of users, a table of
//! pairwise interaction histories and an ordered list of observations to judge.
//! Scenarios are validated once at the boundary (see [`document`]) and are
//! read-only for the duration of an evaluation.
//!
//! # Example
//!
//! ```
//! use travos_trust::scenario::Scenario;
//!
//! let scenario = Scenario::builder()
//!     .users(["A", "B", "C"])
//!     .history("B", "A", 9, 1)
//!     .observe("A", "B", "m1")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(scenario.observations().len(), 1);
//! ```

pub mod document;

pub use document::{ObservationDocument, ScenarioDocument};

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::trust::TrustError;

/// Identifier of a user taking part in a scenario
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One observer's record of one subject's behavior.
///
/// Serialized as `[successes, failures]`; displayed as `(successes, failures)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct HistoryEntry {
    pub successes: u64,
    pub failures: u64,
}

impl HistoryEntry {
    pub fn new(successes: u64, failures: u64) -> Self {
        Self { successes, failures }
    }

    /// Beta shape parameters `(successes + 1, failures + 1)`
    pub fn shape(&self) -> (f64, f64) {
        (self.successes as f64 + 1.0, self.failures as f64 + 1.0)
    }

    /// Total number of recorded interactions
    pub fn total(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    /// Copy of this entry with one more success
    pub fn record_success(self) -> Self {
        Self {
            successes: self.successes.saturating_add(1),
            ..self
        }
    }

    /// Copy of this entry with one more failure
    pub fn record_failure(self) -> Self {
        Self {
            failures: self.failures.saturating_add(1),
            ..self
        }
    }
}

impl From<(u64, u64)> for HistoryEntry {
    fn from((successes, failures): (u64, u64)) -> Self {
        Self { successes, failures }
    }
}

impl From<HistoryEntry> for (u64, u64) {
    fn from(entry: HistoryEntry) -> Self {
        (entry.successes, entry.failures)
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.successes, self.failures)
    }
}

/// Histories keyed by observer, then subject
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryTable {
    entries: HashMap<UserId, HashMap<UserId, HistoryEntry>>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the observer's record of the subject
    pub fn insert(&mut self, observer: UserId, subject: UserId, entry: HistoryEntry) {
        self.entries.entry(observer).or_default().insert(subject, entry);
    }

    /// The observer's record of the subject, if one exists
    pub fn find(&self, observer: &UserId, subject: &UserId) -> Option<HistoryEntry> {
        self.entries
            .get(observer)
            .and_then(|records| records.get(subject))
            .copied()
    }

    /// The observer's record of the subject, or `MissingHistory`
    pub fn get(&self, observer: &UserId, subject: &UserId) -> Result<HistoryEntry, TrustError> {
        self.find(observer, subject)
            .ok_or_else(|| TrustError::MissingHistory {
                observer: observer.clone(),
                subject: subject.clone(),
            })
    }

    /// Number of `(observer, subject)` records
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &UserId, &HistoryEntry)> {
        self.entries.iter().flat_map(|(observer, records)| {
            records
                .iter()
                .map(move |(subject, entry)| (observer, subject, entry))
        })
    }
}

/// One interaction event to be judged
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub sender: UserId,
    pub recipient: UserId,
    pub message: String,
}

impl Observation {
    pub fn new(
        sender: impl Into<UserId>,
        recipient: impl Into<UserId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            message: message.into(),
        }
    }
}

/// A validated scenario
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    name: Option<String>,
    users: Vec<UserId>,
    history: HistoryTable,
    observations: Vec<Observation>,
}

impl Scenario {
    /// Build a scenario, checking user uniqueness and observation membership
    pub fn new(
        users: Vec<UserId>,
        history: HistoryTable,
        observations: Vec<Observation>,
    ) -> Result<Self, TrustError> {
        let mut seen = HashSet::with_capacity(users.len());
        for user in &users {
            if !seen.insert(user) {
                return Err(TrustError::MalformedScenario(format!(
                    "duplicate user '{}'",
                    user
                )));
            }
        }

        for (i, observation) in observations.iter().enumerate() {
            for user in [&observation.sender, &observation.recipient] {
                if !seen.contains(user) {
                    return Err(TrustError::MalformedScenario(format!(
                        "observation {} references unknown user '{}'",
                        i + 1,
                        user
                    )));
                }
            }
        }

        Ok(Self {
            name: None,
            users,
            history,
            observations,
        })
    }

    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Attach a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Users other than the sender and recipient, in scenario order
    pub fn third_parties<'a>(
        &'a self,
        sender: &'a UserId,
        recipient: &'a UserId,
    ) -> impl Iterator<Item = &'a UserId> + 'a {
        self.users
            .iter()
            .filter(move |user| *user != sender && *user != recipient)
    }
}

/// Incremental construction of a [`Scenario`]
#[derive(Clone, Debug, Default)]
pub struct ScenarioBuilder {
    name: Option<String>,
    users: Vec<UserId>,
    history: HistoryTable,
    observations: Vec<Observation>,
}

impl ScenarioBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn user(mut self, user: impl Into<UserId>) -> Self {
        self.users.push(user.into());
        self
    }

    pub fn users<I, U>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Record `observer`'s history of `subject`
    pub fn history(
        mut self,
        observer: impl Into<UserId>,
        subject: impl Into<UserId>,
        successes: u64,
        failures: u64,
    ) -> Self {
        self.history.insert(
            observer.into(),
            subject.into(),
            HistoryEntry::new(successes, failures),
        );
        self
    }

    pub fn observe(
        mut self,
        sender: impl Into<UserId>,
        recipient: impl Into<UserId>,
        message: impl Into<String>,
    ) -> Self {
        self.observations
            .push(Observation::new(sender, recipient, message));
        self
    }

    pub fn build(self) -> Result<Scenario, TrustError> {
        let scenario = Scenario::new(self.users, self.history, self.observations)?;
        Ok(match self.name {
            Some(name) => scenario.with_name(name),
            None => scenario,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_display_and_shape() {
        let entry = HistoryEntry::new(9, 1);
        assert_eq!(entry.to_string(), "(9, 1)");
        assert_eq!(entry.shape(), (10.0, 2.0));
        assert_eq!(entry.total(), 10);
    }

    #[test]
    fn test_history_entry_updates() {
        let entry = HistoryEntry::new(3, 4);
        assert_eq!(entry.record_success(), HistoryEntry::new(4, 4));
        assert_eq!(entry.record_failure(), HistoryEntry::new(3, 5));
    }

    #[test]
    fn test_history_entry_serializes_as_pair() {
        let json = serde_json::to_string(&HistoryEntry::new(2, 5)).unwrap();
        assert_eq!(json, "[2,5]");

        let parsed: HistoryEntry = serde_json::from_str("[7,0]").unwrap();
        assert_eq!(parsed, HistoryEntry::new(7, 0));
    }

    #[test]
    fn test_history_entry_rejects_negative_counts() {
        assert!(serde_json::from_str::<HistoryEntry>("[-1,0]").is_err());
    }

    #[test]
    fn test_history_table_direction_matters() {
        let mut table = HistoryTable::new();
        table.insert("B".into(), "A".into(), HistoryEntry::new(9, 1));

        assert_eq!(
            table.get(&"B".into(), &"A".into()).unwrap(),
            HistoryEntry::new(9, 1)
        );

        let err = table.get(&"A".into(), &"B".into()).unwrap_err();
        assert!(matches!(err, TrustError::MissingHistory { .. }));
    }

    #[test]
    fn test_builder_rejects_duplicate_users() {
        let err = Scenario::builder().users(["A", "B", "A"]).build().unwrap_err();
        assert!(matches!(err, TrustError::MalformedScenario(_)));
    }

    #[test]
    fn test_builder_rejects_unknown_observation_user() {
        let err = Scenario::builder()
            .users(["A", "B"])
            .observe("A", "Z", "hello")
            .build()
            .unwrap_err();
        assert!(matches!(err, TrustError::MalformedScenario(msg) if msg.contains("'Z'")));
    }

    #[test]
    fn test_third_parties_excludes_pair() {
        let scenario = Scenario::builder()
            .users(["A", "B", "C", "D"])
            .build()
            .unwrap();
        let sender = UserId::from("A");
        let recipient = UserId::from("C");

        let providers: Vec<_> = scenario
            .third_parties(&sender, &recipient)
            .map(UserId::as_str)
            .collect();
        assert_eq!(providers, vec!["B", "D"]);
    }
}
