//! High-score table.
//!
//! Persistence: JSON file at `<data_dir>/highscores.json` keyed by user id. Reads take
//! a shared `fs2` lock and writes an exclusive one, so several bot processes pointed
//! at the same data directory do not corrupt the table.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{HighScoreStore, StorageError};
use crate::game::score::is_new_record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub best: u32,
    pub achieved_at: DateTime<Utc>,
}

/// On-disk schema for the whole table.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ScoresFile {
    #[serde(default)]
    players: HashMap<String, HighScoreEntry>,
}

fn sorted_table(players: &HashMap<String, HighScoreEntry>) -> Vec<(String, HighScoreEntry)> {
    let mut rows: Vec<(String, HighScoreEntry)> =
        players.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    rows.sort_by(|a, b| b.1.best.cmp(&a.1.best).then_with(|| a.0.cmp(&b.0)));
    rows
}

pub struct JsonHighScoreStore {
    path: PathBuf,
}

impl JsonHighScoreStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("highscores.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    fn parse(raw: &str) -> ScoresFile {
        let cleaned = raw.trim_start_matches('\0');
        if cleaned.trim().is_empty() {
            return ScoresFile::default();
        }
        match serde_json::from_str(cleaned) {
            Ok(file) => file,
            Err(e) => {
                warn!("highscores: unreadable table ({}); starting empty", e);
                ScoresFile::default()
            }
        }
    }

    fn load(&self) -> Result<ScoresFile, StorageError> {
        let mut f = match fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ScoresFile::default()),
            Err(e) => return Err(e.into()),
        };
        f.lock_shared()?;
        let mut s = String::new();
        let read = f.read_to_string(&mut s);
        let _ = f.unlock();
        read?;
        Ok(Self::parse(&s))
    }
}

impl JsonHighScoreStore {
    /// Read-modify-write under one exclusive lock. `edit` returns its result and
    /// whether the table changed; an unchanged table is not rewritten.
    fn update<T>(
        &self,
        edit: impl FnOnce(&mut ScoresFile) -> (T, bool),
    ) -> Result<T, StorageError> {
        self.ensure_dir()?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)?;
        f.lock_exclusive()?;
        let result = (|| -> Result<T, StorageError> {
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            let mut table = Self::parse(&s);
            let (out, changed) = edit(&mut table);
            if !changed {
                return Ok(out);
            }
            let data = serde_json::to_string_pretty(&table)?;
            // Rewrite from the start so no stale tail survives
            f.seek(SeekFrom::Start(0))?;
            f.set_len(0)?;
            f.write_all(data.as_bytes())?;
            f.flush()?;
            f.sync_all()?;
            Ok(out)
        })();
        let _ = f.unlock();
        result
    }
}

/// Shared by both stores: bump `user_id` to `score` on strict improvement.
fn raise_in(
    players: &mut HashMap<String, HighScoreEntry>,
    user_id: &str,
    score: u32,
) -> (u32, bool) {
    let previous = players.get(user_id).map(|e| e.best).unwrap_or(0);
    if !is_new_record(previous, score) {
        return (previous, false);
    }
    players.insert(
        user_id.to_string(),
        HighScoreEntry {
            best: score,
            achieved_at: Utc::now(),
        },
    );
    (previous, true)
}

impl HighScoreStore for JsonHighScoreStore {
    fn get(&self, user_id: &str) -> Result<u32, StorageError> {
        Ok(self.load()?.players.get(user_id).map(|e| e.best).unwrap_or(0))
    }

    fn put(&self, user_id: &str, score: u32) -> Result<(), StorageError> {
        self.update(|table| {
            table.players.insert(
                user_id.to_string(),
                HighScoreEntry {
                    best: score,
                    achieved_at: Utc::now(),
                },
            );
            ((), true)
        })
    }

    fn raise(&self, user_id: &str, score: u32) -> Result<u32, StorageError> {
        self.update(|table| raise_in(&mut table.players, user_id, score))
    }

    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError> {
        Ok(sorted_table(&self.load()?.players))
    }
}

/// Process-local high-score table.
#[derive(Default)]
pub struct MemoryHighScoreStore {
    inner: Mutex<HashMap<String, HighScoreEntry>>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HighScoreEntry>>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Internal("high-score map poisoned".into()))
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn get(&self, user_id: &str) -> Result<u32, StorageError> {
        Ok(self.lock()?.get(user_id).map(|e| e.best).unwrap_or(0))
    }

    fn put(&self, user_id: &str, score: u32) -> Result<(), StorageError> {
        self.lock()?.insert(
            user_id.to_string(),
            HighScoreEntry {
                best: score,
                achieved_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn raise(&self, user_id: &str, score: u32) -> Result<u32, StorageError> {
        Ok(raise_in(&mut *self.lock()?, user_id, score).0)
    }

    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError> {
        Ok(sorted_table(&*self.lock()?))
    }
}
