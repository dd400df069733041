// store/mod.rs - Persistent Scenario Store using Sled

//! Scenario documents persisted in a sled database.
//!
//! The store is an explicitly opened handle: callers own it, pass it where it
//! is needed and drop it to release the database. Scenario names follow the
//! `scenario_<n>` convention (see [`scenario_name`]).

use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::scenario::ScenarioDocument;

/// Errors related to scenario store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Scenario not found: {0}")]
    NotFound(String),
}

const TREE_SCENARIOS: &str = "scenarios";

/// Name under which scenario `number` is stored
pub fn scenario_name(number: u64) -> String {
    format!("scenario_{}", number)
}

/// A stored document plus bookkeeping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredScenario {
    pub document: ScenarioDocument,

    /// Unix timestamp of the last write
    pub stored_at: i64,
}

/// Listing entry for a stored scenario
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub users: usize,
    pub observations: usize,
    pub stored_at: i64,
}

/// Persistent scenario store backed by sled
#[derive(Clone)]
pub struct ScenarioStore {
    db: Db,
    scenarios: Tree,
}

impl ScenarioStore {
    /// Open or create a scenario store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create an in-memory scenario store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let scenarios = db.open_tree(TREE_SCENARIOS)?;
        Ok(Self { db, scenarios })
    }

    /// Store (or replace) a scenario document
    pub fn put_scenario(&self, name: &str, document: &ScenarioDocument) -> Result<(), StoreError> {
        let record = StoredScenario {
            document: document.clone(),
            stored_at: chrono::Utc::now().timestamp(),
        };
        let bytes = bincode::serde::encode_to_vec(&record, bincode::config::standard())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.scenarios.insert(name.as_bytes(), bytes)?;
        debug!(scenario = name, "Scenario stored");
        Ok(())
    }

    /// Load a stored scenario record
    pub fn load_record(&self, name: &str) -> Result<Option<StoredScenario>, StoreError> {
        match self.scenarios.get(name.as_bytes())? {
            Some(bytes) => {
                let (record, _): (StoredScenario, _) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Load a scenario document by name
    pub fn get_scenario(&self, name: &str) -> Result<Option<ScenarioDocument>, StoreError> {
        Ok(self.load_record(name)?.map(|record| record.document))
    }

    /// Load a scenario document, failing with `NotFound` when absent
    pub fn require_scenario(&self, name: &str) -> Result<ScenarioDocument, StoreError> {
        self.get_scenario(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Names of all stored scenarios, sorted
    pub fn list_scenarios(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for key in self.scenarios.iter().keys() {
            names.push(String::from_utf8_lossy(&key?).into_owned());
        }
        Ok(names)
    }

    /// Summaries of all stored scenarios, sorted by name
    pub fn scenario_summaries(&self) -> Result<Vec<ScenarioSummary>, StoreError> {
        let mut summaries = Vec::new();
        for result in self.scenarios.iter() {
            let (key, bytes) = result?;
            let (record, _): (StoredScenario, _) =
                bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
            summaries.push(ScenarioSummary {
                name: String::from_utf8_lossy(&key).into_owned(),
                users: record.document.user_count(),
                observations: record.document.observation_count(),
                stored_at: record.stored_at,
            });
        }
        Ok(summaries)
    }

    /// Delete a scenario; returns whether it existed
    pub fn delete_scenario(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.scenarios.remove(name.as_bytes())?.is_some())
    }

    /// Flush all pending writes
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Get database size in bytes
    pub fn size_on_disk(&self) -> u64 {
        self.db.size_on_disk().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    fn sample_document() -> ScenarioDocument {
        let scenario = Scenario::builder()
            .name("scenario_1")
            .users(["A", "B", "C"])
            .history("B", "A", 9, 1)
            .history("C", "A", 3, 3)
            .observe("A", "B", "m1")
            .build()
            .unwrap();
        ScenarioDocument::from(&scenario)
    }

    #[test]
    fn test_store_and_load_scenario() {
        let store = ScenarioStore::in_memory().unwrap();
        let doc = sample_document();

        store.put_scenario(&scenario_name(1), &doc).unwrap();

        let loaded = store.get_scenario("scenario_1").unwrap().unwrap();
        assert_eq!(loaded, doc);
        assert!(store.get_scenario("scenario_2").unwrap().is_none());
    }

    #[test]
    fn test_require_missing_scenario() {
        let store = ScenarioStore::in_memory().unwrap();
        let err = store.require_scenario("scenario_9").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "scenario_9"));
    }

    #[test]
    fn test_list_and_summaries() {
        let store = ScenarioStore::in_memory().unwrap();
        store.put_scenario("scenario_2", &sample_document()).unwrap();
        store.put_scenario("scenario_1", &ScenarioDocument::default()).unwrap();

        assert_eq!(store.list_scenarios().unwrap(), vec!["scenario_1", "scenario_2"]);

        let summaries = store.scenario_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].users, 0);
        assert_eq!(summaries[1].users, 3);
        assert_eq!(summaries[1].observations, 1);
        assert!(summaries[1].stored_at > 0);
    }

    #[test]
    fn test_delete_scenario() {
        let store = ScenarioStore::in_memory().unwrap();
        store.put_scenario("scenario_1", &sample_document()).unwrap();

        assert!(store.delete_scenario("scenario_1").unwrap());
        assert!(!store.delete_scenario("scenario_1").unwrap());
        assert!(store.list_scenarios().unwrap().is_empty());
    }

    #[test]
    fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::open(dir.path().join("scenarios")).unwrap();

        store.put_scenario("scenario_1", &sample_document()).unwrap();
        store.flush().unwrap();

        let loaded = store.require_scenario("scenario_1").unwrap();
        assert_eq!(loaded.users.unwrap(), vec!["A", "B", "C"]);
        assert!(store.size_on_disk() > 0);
    }
}
