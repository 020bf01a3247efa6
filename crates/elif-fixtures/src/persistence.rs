//! Persistence collaborator contract
//!
//! Factories hand objects created with `create_*` to a persistence manager.
//! Storing them is the manager's business; the factory only registers.

use crate::error::BoxError;
use crate::property::FixtureObject;
use crate::Properties;
use std::sync::Mutex;

/// Registers built objects for persistence
pub trait PersistenceManager: Send + Sync {
    /// Mark `object`, constructed as the registered type `type_name`, for storage
    fn add(&self, type_name: &str, object: &dyn FixtureObject) -> Result<(), BoxError>;
}

/// A record of one object passed to [`InMemoryPersistence::add`]
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub type_name: String,
    pub properties: Properties,
}

/// Persistence manager that keeps property snapshots in memory
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    records: Mutex<Vec<PersistedRecord>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PersistedRecord> {
        self.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Records of the registered type `type_name`
    pub fn records_of(&self, type_name: &str) -> Vec<PersistedRecord> {
        self.lock()
            .iter()
            .filter(|record| record.type_name == type_name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PersistedRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceManager for InMemoryPersistence {
    fn add(&self, type_name: &str, object: &dyn FixtureObject) -> Result<(), BoxError> {
        self.lock().push(PersistedRecord {
            type_name: type_name.to_string(),
            properties: object.snapshot(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Note {
        body: String,
    }

    crate::impl_property_bag!(Note { body });

    #[test]
    fn test_add_records_snapshot() {
        let persistence = InMemoryPersistence::new();
        let note = Note {
            body: "hello".to_string(),
        };

        persistence.add("Note", &note).unwrap();

        let records = persistence.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].type_name, "Note");
        assert_eq!(records[0].properties.get("body"), Some(&json!("hello")));
        assert_eq!(persistence.records_of("Note").len(), 1);
        assert!(persistence.records_of("Post").is_empty());
    }

    #[test]
    fn test_records_of_matches_exact_type_name() {
        let persistence = InMemoryPersistence::new();
        persistence.add("Note", &Note::default()).unwrap();
        persistence.add("StickyNote", &Note::default()).unwrap();

        assert_eq!(persistence.records_of("Note").len(), 1);
        assert_eq!(persistence.records_of("StickyNote").len(), 1);
        assert!(persistence.records_of("ote").is_empty());
    }

    #[test]
    fn test_clear() {
        let persistence = InMemoryPersistence::new();
        persistence.add("Note", &Note::default()).unwrap();
        persistence.clear();
        assert_eq!(persistence.count(), 0);
    }
}
