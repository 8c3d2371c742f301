//! Process-local game counters.
//! Read by the `status` command and logged when a game finishes.
use std::sync::atomic::{AtomicU64, Ordering};

static GAMES_STARTED: AtomicU64 = AtomicU64::new(0);
static GAMES_WON: AtomicU64 = AtomicU64::new(0);
static GAMES_SURRENDERED: AtomicU64 = AtomicU64::new(0);
static MOVES_ACCEPTED: AtomicU64 = AtomicU64::new(0);
static MOVES_REJECTED: AtomicU64 = AtomicU64::new(0);
static RESCUES_GRANTED: AtomicU64 = AtomicU64::new(0);
static TRIVIA_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static STORAGE_FAILURES: AtomicU64 = AtomicU64::new(0);

pub fn inc_games_started() {
    GAMES_STARTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_games_won() {
    GAMES_WON.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_games_surrendered() {
    GAMES_SURRENDERED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_moves_accepted() {
    MOVES_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_moves_rejected() {
    MOVES_REJECTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_rescues_granted() {
    RESCUES_GRANTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_trivia_fallbacks() {
    TRIVIA_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_storage_failures() {
    STORAGE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub games_started: u64,
    pub games_won: u64,
    pub games_surrendered: u64,
    pub moves_accepted: u64,
    pub moves_rejected: u64,
    pub rescues_granted: u64,
    pub trivia_fallbacks: u64,
    pub storage_failures: u64,
}

impl Snapshot {
    /// Games that ended either way.
    pub fn games_finished(&self) -> u64 {
        self.games_won + self.games_surrendered
    }
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        games_started: GAMES_STARTED.load(Ordering::Relaxed),
        games_won: GAMES_WON.load(Ordering::Relaxed),
        games_surrendered: GAMES_SURRENDERED.load(Ordering::Relaxed),
        moves_accepted: MOVES_ACCEPTED.load(Ordering::Relaxed),
        moves_rejected: MOVES_REJECTED.load(Ordering::Relaxed),
        rescues_granted: RESCUES_GRANTED.load(Ordering::Relaxed),
        trivia_fallbacks: TRIVIA_FALLBACKS.load(Ordering::Relaxed),
        storage_failures: STORAGE_FAILURES.load(Ordering::Relaxed),
    }
}
