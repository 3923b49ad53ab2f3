use tracing::{debug, warn};

use super::state::StoreState;
use super::storage::{read_state, write_state, LoadFallback, STORE_SLOT_KEY};
use super::types::{Document, UpdateDocumentInput};
use crate::database::{DbError, KeyValueSlot};

/// Document collection with an active pointer, persisted to a key-value slot.
///
/// State is rehydrated once by [`DocumentStore::load`] and written back by
/// [`DocumentStore::save`] after every mutation. A failed write is logged and the
/// in-memory mutation stands.
pub struct DocumentStore<S: KeyValueSlot> {
    slot: S,
    key: String,
    state: StoreState,
}

impl<S: KeyValueSlot> DocumentStore<S> {
    /// Load the store from the default slot key
    pub fn load(slot: S) -> Self {
        Self::load_with_key(slot, STORE_SLOT_KEY)
    }

    pub fn load_with_key(slot: S, key: impl Into<String>) -> Self {
        let key = key.into();

        let state = match read_state(&slot, &key) {
            Ok(state) => {
                debug!(key = %key, docs = state.docs.len(), "Rehydrated document store");
                state
            }
            Err(LoadFallback::Missing) => {
                debug!(key = %key, "No persisted store, seeding");
                StoreState::seeded()
            }
            Err(LoadFallback::Unreadable(e)) => {
                warn!(key = %key, error = %e, "Store slot unreadable, seeding");
                StoreState::seeded()
            }
            Err(LoadFallback::Corrupt(e)) => {
                warn!(key = %key, error = %e, "Persisted store is corrupt, seeding");
                StoreState::seeded()
            }
            Err(LoadFallback::Empty) => {
                warn!(key = %key, "Persisted store has no documents, seeding");
                StoreState::seeded()
            }
        };

        DocumentStore { slot, key, state }
    }

    /// Write the entire state to the slot
    pub fn save(&self) -> Result<(), DbError> {
        write_state(&self.slot, &self.key, &self.state)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(key = %self.key, error = %e, "Failed to persist document store");
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn docs(&self) -> &[Document] {
        &self.state.docs
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active_id.as_deref()
    }

    pub fn active_doc(&self) -> Option<&Document> {
        self.state.active_doc()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.state.get(id)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn create_doc(&mut self, title: Option<&str>) -> String {
        let id = self.state.create_doc(title);
        debug!(doc_id = %id, "Created document");
        self.persist();
        id
    }

    pub fn update_doc(&mut self, id: &str, input: UpdateDocumentInput) {
        if !self.state.update_doc(id, input) {
            debug!(doc_id = %id, "Update for unknown document ignored");
        }
        self.persist();
    }

    pub fn set_active(&mut self, id: &str) {
        self.state.set_active(id);
        debug!(doc_id = %id, "Active document changed");
        self.persist();
    }

    pub fn delete_doc(&mut self, id: &str) {
        if self.state.delete_doc(id) {
            debug!(doc_id = %id, remaining = self.state.docs.len(), "Deleted document");
        }
        self.persist();
    }

    pub fn save_version(&mut self, id: &str) -> Option<String> {
        let version_id = self.state.save_version(id);
        match &version_id {
            Some(v) => debug!(doc_id = %id, version_id = %v, "Saved version"),
            None => debug!(doc_id = %id, "Snapshot of unknown document ignored"),
        }
        self.persist();
        version_id
    }

    pub fn restore_version(&mut self, doc_id: &str, version_id: &str) -> bool {
        let restored = self.state.restore_version(doc_id, version_id);
        if restored {
            debug!(doc_id = %doc_id, version_id = %version_id, "Restored version");
        } else {
            debug!(doc_id = %doc_id, version_id = %version_id, "Restore target not found");
        }
        self.persist();
        restored
    }

    /// Discard every document and start over from the welcome document
    pub fn reset(&mut self) {
        let discarded = self.state.docs.len();
        self.state = StoreState::seeded();
        debug!(key = %self.key, discarded, "Reset document store");
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::docs::types::{MAX_VERSIONS, SAMPLE_TITLE};
    use std::sync::Arc;

    /// Slot whose backing storage is gone
    struct UnavailableSlot;

    impl KeyValueSlot for UnavailableSlot {
        fn read(&self, _key: &str) -> Result<Option<String>, DbError> {
            Err(DbError::Lock)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), DbError> {
            Err(DbError::Lock)
        }

        fn remove(&self, _key: &str) -> Result<bool, DbError> {
            Err(DbError::Lock)
        }
    }

    #[test]
    fn test_first_run_seeds_welcome_doc() {
        let store = DocumentStore::load(Database::in_memory().unwrap());
        assert_eq!(store.docs().len(), 1);
        assert_eq!(store.docs()[0].title, SAMPLE_TITLE);
        assert_eq!(store.active_id(), Some(store.docs()[0].id.as_str()));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let db = Arc::new(Database::in_memory().unwrap());
        let mut store = DocumentStore::load(db.clone());

        let id = store.create_doc(Some("Notes"));
        store.update_doc(&id, UpdateDocumentInput::content("<p>body</p>"));
        store.save_version(&id);

        let reloaded = DocumentStore::load(db.clone());
        assert_eq!(reloaded.state(), store.state());
        assert_eq!(reloaded.active_id(), Some(id.as_str()));
        assert_eq!(reloaded.get(&id).unwrap().versions.len(), 1);
    }

    #[test]
    fn test_roundtrip_preserves_versions_and_active() {
        let db = Arc::new(Database::in_memory().unwrap());
        let mut store = DocumentStore::load(db.clone());
        let first = store.docs()[0].id.clone();

        let a = store.create_doc(Some("A"));
        for n in 0..3 {
            store.update_doc(&a, UpdateDocumentInput::content(format!("<p>{n}</p>")));
            store.save_version(&a);
        }
        store.set_active(&first);

        let reloaded = DocumentStore::load(db);
        assert_eq!(reloaded.docs(), store.docs());
        assert_eq!(reloaded.active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_corrupt_slot_falls_back_to_seed() {
        let db = Database::in_memory().unwrap();
        db.write(STORE_SLOT_KEY, "<<garbage>>").unwrap();

        let store = DocumentStore::load(db);
        assert_eq!(store.docs().len(), 1);
        assert_eq!(store.docs()[0].title, SAMPLE_TITLE);
    }

    #[test]
    fn test_unavailable_slot_still_works_in_memory() {
        let mut store = DocumentStore::load(UnavailableSlot);
        assert_eq!(store.docs()[0].title, SAMPLE_TITLE);
        assert!(store.save().is_err());

        let id = store.create_doc(Some("Offline"));
        assert_eq!(store.active_id(), Some(id.as_str()));
        assert_eq!(store.docs().len(), 2);
    }

    #[test]
    fn test_custom_slot_key_is_isolated() {
        let db = Arc::new(Database::in_memory().unwrap());
        let mut work = DocumentStore::load_with_key(db.clone(), "work");
        work.create_doc(Some("Work"));

        let personal = DocumentStore::load_with_key(db.clone(), "personal");
        assert_eq!(personal.docs().len(), 1);
        assert_eq!(personal.key(), "personal");
        assert_eq!(DocumentStore::load_with_key(db, "work").docs().len(), 2);
    }

    #[test]
    fn test_noop_operations_leave_state_unchanged() {
        let mut store = DocumentStore::load(Database::in_memory().unwrap());
        let before = store.state().clone();

        store.update_doc("missing", UpdateDocumentInput::title("x"));
        store.save_version("missing");
        store.restore_version("missing", "missing");

        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_reset_replaces_state_and_persists() {
        let db = Arc::new(Database::in_memory().unwrap());
        let mut store = DocumentStore::load(db.clone());
        store.create_doc(Some("Secret"));
        store.reset();

        assert_eq!(store.docs().len(), 1);
        assert_eq!(store.docs()[0].title, SAMPLE_TITLE);
        assert_eq!(store.active_id(), Some(store.docs()[0].id.as_str()));

        store.save_version(&store.docs()[0].id.clone());
        let reloaded = DocumentStore::load(db);
        let titles: Vec<_> = reloaded.docs().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec![SAMPLE_TITLE]);
    }

    #[test]
    fn test_thirteen_snapshots_keep_twelve() {
        let mut store = DocumentStore::load(Database::in_memory().unwrap());
        let id = store.create_doc(None);
        let mut snapshot_ids = Vec::new();

        for n in 1..=13 {
            store.update_doc(&id, UpdateDocumentInput::content(format!("<p>rev {n}</p>")));
            snapshot_ids.push(store.save_version(&id).unwrap());
        }

        let versions = &store.get(&id).unwrap().versions;
        assert_eq!(versions.len(), MAX_VERSIONS);
        assert_eq!(versions[0].id, snapshot_ids[12]);
        assert_eq!(versions[11].id, snapshot_ids[1]);
    }
}
