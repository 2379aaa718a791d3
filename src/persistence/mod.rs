//! Save/load of the session blob and the level history
//!
//! Features:
//! - Versionless JSON session snapshot under one key
//! - Append-only history log
//! - Corruption detection and recovery (corrupt session removed, corrupt
//!   history read as empty)

use crate::history::{History, LevelRecord};
use crate::platform::KeyValueStore;
use crate::session::Session;

/// Storage keys
pub mod keys {
    pub const STATE: &str = "verse_search_state";
    pub const HISTORY: &str = "verse_search_history";
    pub const GRID_SIZE: &str = "verse_search_grid_size";
    pub const MUTED: &str = "verse_search_muted";
}

/// Write the session snapshot; failures are logged and ignored
pub fn save_session(store: &mut impl KeyValueStore, session: &Session) {
    match serde_json::to_string(session) {
        Ok(json) => {
            if let Err(e) = store.set(keys::STATE, &json) {
                log::warn!("Failed to save session: {}", e);
            }
        }
        Err(e) => log::warn!("Failed to serialize session: {}", e),
    }
}

/// Read the saved session. A blob that fails to parse is removed.
pub fn load_session(store: &mut impl KeyValueStore) -> Option<Session> {
    let json = store.get(keys::STATE)?;
    match serde_json::from_str::<Session>(&json) {
        Ok(session) => {
            log::info!(
                "Found saved session (level {}, score {})",
                session.level,
                session.score
            );
            Some(session)
        }
        Err(e) => {
            log::warn!("Failed to parse saved session, starting fresh: {}", e);
            store.remove(keys::STATE);
            None
        }
    }
}

pub fn clear_session(store: &mut impl KeyValueStore) {
    store.remove(keys::STATE);
    log::info!("Saved session cleared");
}

pub fn load_history(store: &impl KeyValueStore) -> History {
    let Some(json) = store.get(keys::HISTORY) else {
        return History::new();
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("Ignoring corrupt history: {}", e);
        History::new()
    })
}

/// Append one record to the stored history
pub fn append_history(store: &mut impl KeyValueStore, record: LevelRecord) {
    let mut history = load_history(store);
    log::info!(
        "Level {} recorded ({}, {} points)",
        record.level,
        if record.completed { "completed" } else { "incomplete" },
        record.points_earned
    );
    history.push(record);
    match serde_json::to_string(&history) {
        Ok(json) => {
            if let Err(e) = store.set(keys::HISTORY, &json) {
                log::warn!("Failed to save history: {}", e);
            }
        }
        Err(e) => log::warn!("Failed to serialize history: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{Language, Mode};
    use crate::platform::MemoryStore;

    #[test]
    fn test_session_round_trip() {
        let mut store = MemoryStore::new();
        let mut session = Session::new(Language::English, Mode::Standard, 250, 42);
        session.level = 7;
        save_session(&mut store, &session);
        let loaded = load_session(&mut store).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_corrupt_session_is_removed() {
        let mut store = MemoryStore::new();
        store.set(keys::STATE, "{\"level\": \"oops\"").unwrap();
        assert!(load_session(&mut store).is_none());
        assert_eq!(store.get(keys::STATE), None);
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut store = MemoryStore::new();
        append_history(&mut store, LevelRecord::new(1, "Standard (english)".into(), 1.0));
        append_history(&mut store, LevelRecord::new(2, "Standard (english)".into(), 2.0));
        let history = load_history(&store);
        assert_eq!(history.len(), 2);
        assert_eq!(history.most_recent_first().next().unwrap().level, 2);
    }

    #[test]
    fn test_corrupt_history_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(keys::HISTORY, "not json").unwrap();
        assert!(load_history(&store).is_empty());
        append_history(&mut store, LevelRecord::new(1, "Scripture (romanian)".into(), 0.0));
        assert_eq!(load_history(&store).len(), 1);
    }
}
