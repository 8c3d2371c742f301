//! Per-player game state.
//!
//! A [`GameSession`] is created on `/start`, mutated only by the engine and the
//! score tracker, and discarded when the game finishes. It is persisted as a
//! [`SessionRecord`] whose `schema_version` guards against decoding records written
//! by an incompatible build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Layout version of [`SessionRecord`]. Records are bincode, which is positional:
/// adding, removing or reordering any field of the record, [`GameSession`] or
/// [`Phase`] changes the layout and must bump this.
pub const SESSION_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    /// The engine ran out of cities (or the player declined a rescue and claimed the win).
    PlayerWon,
    /// The player gave up.
    Surrendered,
}

/// Turn-validation state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    /// No city played yet; any dictionary city is accepted.
    AwaitingFirstMove,
    /// The player must answer on `expected_letter` (or the rescue letter).
    AwaitingReply,
    /// The engine has nothing on the expected letter; the player decides whether the
    /// engine continues on `letter` or the game ends in the player's favour.
    RescueOffered { letter: char },
    Finished(Outcome),
}

impl Phase {
    /// Short tag used in logs and store listings.
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::AwaitingFirstMove => "awaiting_first_move",
            Phase::AwaitingReply => "awaiting_reply",
            Phase::RescueOffered { .. } => "rescue_offered",
            Phase::Finished(_) => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    /// Keys played in this game by either side. Only ever grows.
    pub used_keys: HashSet<String>,
    pub expected_letter: Option<char>,
    pub expected_penultimate_letter: Option<char>,
    pub score: u32,
    pub phase: Phase,
    /// Display name of the player's most recently accepted city.
    pub last_player_city: Option<String>,
    /// Display name of the engine's most recent reply.
    pub last_engine_city: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            used_keys: HashSet::new(),
            expected_letter: None,
            expected_penultimate_letter: None,
            score: 0,
            phase: Phase::AwaitingFirstMove,
            last_player_city: None,
            last_engine_city: None,
            started_at: Utc::now(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn is_used(&self, key: &str) -> bool {
        self.used_keys.contains(key)
    }

    /// The pair of cities a trivia lookup talks about: (player's, engine's).
    pub fn trivia_pair(&self) -> Option<(String, String)> {
        match (&self.last_player_city, &self.last_engine_city) {
            (Some(a), Some(b)) => Some((a.clone(), b.clone())),
            _ => None,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted envelope around a session. `session: None` marks a user with no game
/// in progress (never started, or the last game finished).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Must stay the first field: stores read it before decoding the rest.
    pub schema_version: u8,
    /// Monotonic per-user write counter; stores keep the highest revision they have seen.
    pub revision: u64,
    pub session: Option<GameSession>,
}

impl SessionRecord {
    pub fn new(revision: u64, session: Option<GameSession>) -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            revision,
            session,
        }
    }

    /// State tag for listings: `idle` or the phase tag.
    pub fn state_tag(&self) -> &'static str {
        self.session.as_ref().map(|s| s.phase.tag()).unwrap_or("idle")
    }
}
