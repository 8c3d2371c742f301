//! High-score bookkeeping.
//!
//! The comparison is pure; reading and writing the best score is delegated to a
//! [`HighScoreStore`]. A store is written only when the score strictly beats the
//! previous best, so the persisted value never decreases.

use crate::storage::{HighScoreStore, StorageError};

/// Strict improvement over the previous best.
pub fn is_new_record(previous_best: u32, score: u32) -> bool {
    score > previous_best
}

/// Outcome of a finished game's score check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    pub score: u32,
    /// Best score on record after this check.
    pub best: u32,
    pub new_record: bool,
}

/// Compare `score` with the stored best for `user_id`; persist it on strict improvement.
///
/// The comparison and the write happen inside the store's own lock, so a slow
/// check for an older game cannot overwrite a higher best recorded meanwhile.
pub fn record_high_score(
    store: &dyn HighScoreStore,
    user_id: &str,
    score: u32,
) -> Result<ScoreReport, StorageError> {
    let previous = store.raise(user_id, score)?;
    let new_record = is_new_record(previous, score);
    Ok(ScoreReport {
        score,
        best: if new_record { score } else { previous },
        new_record,
    })
}
