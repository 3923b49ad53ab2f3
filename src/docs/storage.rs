use super::state::StoreState;
use crate::database::{DbError, KeyValueSlot};

/// Default slot key for the persisted store
pub const STORE_SLOT_KEY: &str = "rich-editor-store";

/// Why a load fell back to the seeded state
#[derive(Debug)]
pub enum LoadFallback {
    Missing,
    Unreadable(DbError),
    Corrupt(serde_json::Error),
    Empty,
}

/// Rehydrate the store state from a slot.
///
/// Returns the seeded state together with the reason when the slot is missing,
/// unreadable, corrupt or holds no documents.
pub fn read_state<S: KeyValueSlot + ?Sized>(
    slot: &S,
    key: &str,
) -> Result<StoreState, LoadFallback> {
    let raw = match slot.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Err(LoadFallback::Missing),
        Err(e) => return Err(LoadFallback::Unreadable(e)),
    };

    let state: StoreState = serde_json::from_str(&raw).map_err(LoadFallback::Corrupt)?;
    if state.docs.is_empty() {
        return Err(LoadFallback::Empty);
    }

    Ok(state)
}

/// Serialize the whole store state into a slot
pub fn write_state<S: KeyValueSlot + ?Sized>(
    slot: &S,
    key: &str,
    state: &StoreState,
) -> Result<(), DbError> {
    let json = serde_json::to_string(state)?;
    slot.write(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[test]
    fn test_missing_slot() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            read_state(&db, STORE_SLOT_KEY),
            Err(LoadFallback::Missing)
        ));
    }

    #[test]
    fn test_corrupt_slot() {
        let db = Database::in_memory().unwrap();
        db.write(STORE_SLOT_KEY, "{not json").unwrap();
        assert!(matches!(
            read_state(&db, STORE_SLOT_KEY),
            Err(LoadFallback::Corrupt(_))
        ));
    }

    #[test]
    fn test_incompatible_shape_is_corrupt() {
        let db = Database::in_memory().unwrap();
        db.write(STORE_SLOT_KEY, r#"{"docs": 42, "activeId": null}"#)
            .unwrap();
        assert!(matches!(
            read_state(&db, STORE_SLOT_KEY),
            Err(LoadFallback::Corrupt(_))
        ));
    }

    #[test]
    fn test_empty_docs() {
        let db = Database::in_memory().unwrap();
        db.write(STORE_SLOT_KEY, r#"{"docs": [], "activeId": null}"#)
            .unwrap();
        assert!(matches!(
            read_state(&db, STORE_SLOT_KEY),
            Err(LoadFallback::Empty)
        ));
    }

    #[test]
    fn test_write_then_read() {
        let db = Database::in_memory().unwrap();
        let mut state = StoreState::seeded();
        let id = state.create_doc(Some("Notes"));
        state.save_version(&id);

        write_state(&db, STORE_SLOT_KEY, &state).unwrap();
        let loaded = read_state(&db, STORE_SLOT_KEY).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.active_id.as_deref(), Some(id.as_str()));
    }
}
