// scenario/document.rs - Stored Scenario Documents

//! Loosely-shaped scenario documents as they are stored and transported.
//!
//! Every top-level field is optional here so that an incomplete document is
//! reported as [`TrustError::MalformedScenario`] naming the missing field,
//! instead of surfacing as an opaque parse failure. Conversion into a
//! [`Scenario`] is the single validation point.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{HistoryEntry, HistoryTable, Observation, Scenario, UserId};
use crate::trust::TrustError;

/// One observation as stored: `{ sender, recipient | receiver, message }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationDocument {
    pub sender: String,

    #[serde(alias = "receiver")]
    pub recipient: String,

    #[serde(default)]
    pub message: String,
}

/// Scenario document.
///
/// `history` is nested as `observer -> subject -> [successes, failures]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub users: Option<Vec<String>>,

    #[serde(default)]
    pub history: Option<BTreeMap<String, BTreeMap<String, HistoryEntry>>>,

    #[serde(default)]
    pub observations: Option<Vec<ObservationDocument>>,
}

impl ScenarioDocument {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, TrustError> {
        serde_json::from_str(json).map_err(|e| TrustError::MalformedScenario(e.to_string()))
    }

    /// Render as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn user_count(&self) -> usize {
        self.users.as_ref().map_or(0, Vec::len)
    }

    pub fn observation_count(&self) -> usize {
        self.observations.as_ref().map_or(0, Vec::len)
    }
}

impl TryFrom<ScenarioDocument> for Scenario {
    type Error = TrustError;

    fn try_from(doc: ScenarioDocument) -> Result<Self, Self::Error> {
        let users = doc
            .users
            .ok_or_else(|| missing_field("users"))?
            .into_iter()
            .map(UserId::from)
            .collect();

        let mut history = HistoryTable::new();
        for (observer, records) in doc.history.ok_or_else(|| missing_field("history"))? {
            let observer = UserId::from(observer);
            for (subject, entry) in records {
                history.insert(observer.clone(), UserId::from(subject), entry);
            }
        }

        let observations = doc
            .observations
            .ok_or_else(|| missing_field("observations"))?
            .into_iter()
            .map(|o| Observation::new(o.sender, o.recipient, o.message))
            .collect();

        let scenario = Scenario::new(users, history, observations)?;
        Ok(match doc.name {
            Some(name) => scenario.with_name(name),
            None => scenario,
        })
    }
}

impl From<&Scenario> for ScenarioDocument {
    fn from(scenario: &Scenario) -> Self {
        let mut history: BTreeMap<String, BTreeMap<String, HistoryEntry>> = BTreeMap::new();
        for (observer, subject, entry) in scenario.history().iter() {
            history
                .entry(observer.to_string())
                .or_default()
                .insert(subject.to_string(), *entry);
        }

        Self {
            name: scenario.name().map(str::to_string),
            users: Some(scenario.users().iter().map(UserId::to_string).collect()),
            history: Some(history),
            observations: Some(
                scenario
                    .observations()
                    .iter()
                    .map(|o| ObservationDocument {
                        sender: o.sender.to_string(),
                        recipient: o.recipient.to_string(),
                        message: o.message.clone(),
                    })
                    .collect(),
            ),
        }
    }
}

fn missing_field(field: &str) -> TrustError {
    TrustError::MalformedScenario(format!("scenario document has no '{}'", field))
}
