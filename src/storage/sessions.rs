use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::game::session::{SessionRecord, SESSION_SCHEMA_VERSION};

use super::{SessionStore, StorageError};

const TREE_SESSIONS: &str = "sessions";

fn session_key(user_id: &str) -> Vec<u8> {
    format!("session:{}", user_id).into_bytes()
}

fn check_version(record: SessionRecord) -> Result<SessionRecord, StorageError> {
    if record.schema_version != SESSION_SCHEMA_VERSION {
        return Err(StorageError::SchemaMismatch {
            entity: "session",
            expected: SESSION_SCHEMA_VERSION,
            found: record.schema_version,
        });
    }
    Ok(record)
}

/// Sled-backed session persistence; survives restarts.
pub struct SledSessionStore {
    _db: sled::Db,
    sessions: sled::Tree,
}

impl SledSessionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let sessions = db.open_tree(TREE_SESSIONS)?;
        Ok(Self { _db: db, sessions })
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for SledSessionStore {
    fn get(&self, user_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        let Some(bytes) = self.sessions.get(session_key(user_id))? else {
            return Ok(None);
        };
        // the version byte leads the encoding; a different layout may not decode at all
        if let Some(&found) = bytes.first() {
            if found != SESSION_SCHEMA_VERSION {
                return Err(StorageError::SchemaMismatch {
                    entity: "session",
                    expected: SESSION_SCHEMA_VERSION,
                    found,
                });
            }
        }
        let record: SessionRecord = bincode::deserialize(&bytes)?;
        check_version(record).map(Some)
    }

    fn put(&self, user_id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        let key = session_key(user_id);
        let bytes = bincode::serialize(record)?;
        let revision = record.revision;
        // Compare-and-swap loop: an older revision never overwrites a newer one.
        self.sessions.update_and_fetch(&key, |existing| {
            if let Some(old) = existing {
                if let Ok(prev) = bincode::deserialize::<SessionRecord>(old) {
                    if prev.revision > revision {
                        return Some(old.to_vec());
                    }
                }
            }
            Some(bytes.clone())
        })?;
        self.sessions.flush()?;
        Ok(())
    }
}

/// Process-local session store.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionRecord>>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Internal("session map poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        let mut map = self.lock()?;
        match map.get(user_id) {
            Some(prev) if prev.revision > record.revision => {}
            _ => {
                map.insert(user_id.to_string(), record.clone());
            }
        }
        Ok(())
    }
}
