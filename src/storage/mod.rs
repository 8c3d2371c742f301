//! # Storage Module - Session and High-Score Persistence
//!
//! Two small collaborators sit behind traits so the dispatcher never depends on a
//! concrete backend:
//!
//! - [`SessionStore`] - one in-progress game per user id
//! - [`HighScoreStore`] - best score per user id
//!
//! ## Backends
//!
//! ```text
//! data/
//! ├── sessions/          ← sled database, tree "sessions" (bincode SessionRecord)
//! └── highscores.json    ← fs2-locked JSON table
//! ```
//!
//! In-memory implementations ([`MemorySessionStore`], [`MemoryHighScoreStore`]) back
//! tests and ephemeral console runs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citychain::storage::{HighScoreStore, JsonHighScoreStore, SessionStore, SledSessionStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let sessions = SledSessionStore::open("./data/sessions")?;
//!     let scores = JsonHighScoreStore::new("./data");
//!     println!("best: {}", scores.get("42")?);
//!     let _ = sessions.get("42")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`StorageError`]. The store implementations never retry;
//! the dispatcher logs failures and degrades (fresh session, score not recorded).

use thiserror::Error;

use crate::game::session::SessionRecord;

pub mod highscores;
pub mod sessions;

pub use highscores::{HighScoreEntry, JsonHighScoreStore, MemoryHighScoreStore};
pub use sessions::{MemorySessionStore, SledSessionStore};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when decoding a record written with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    #[error("storage call timed out after {0}ms")]
    Timeout(u64),

    /// Blocking task failures and other unexpected conditions.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Persisted per-user game sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<SessionRecord>, StorageError>;

    /// Store `record` unless a record with a higher revision is already present.
    /// A finished game is stored as a record without a session.
    fn put(&self, user_id: &str, record: &SessionRecord) -> Result<(), StorageError>;
}

/// Persisted best score per user.
pub trait HighScoreStore: Send + Sync {
    /// Best score so far, 0 for unknown users.
    fn get(&self, user_id: &str) -> Result<u32, StorageError>;

    /// Unconditional overwrite. Finished games go through [`HighScoreStore::raise`].
    fn put(&self, user_id: &str, score: u32) -> Result<(), StorageError>;

    /// Store `score` only if it strictly beats the current best, checking and writing
    /// under a single lock. Returns the best score as it was before the call.
    fn raise(&self, user_id: &str, score: u32) -> Result<u32, StorageError>;

    /// All entries, highest first.
    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError>;
}
