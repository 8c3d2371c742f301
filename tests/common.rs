//! Test utilities & fixtures.
//! Small dictionaries, instrumented stores and canned trivia sources shared by the
//! integration tests.
#![allow(dead_code)] // each test binary uses a different subset

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use citychain::chat::GameServer;
use citychain::game::session::SessionRecord;
use citychain::game::CityDictionary;
use citychain::storage::{
    HighScoreEntry, HighScoreStore, MemoryHighScoreStore, MemorySessionStore, SessionStore,
    StorageError,
};
use citychain::trivia::{TriviaError, TriviaSource};

/// Path to the reference lists shipped with the crate.
pub fn data_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub fn dict(cities: &[&str], priority: &[&str]) -> CityDictionary {
    CityDictionary::from_lines(cities.iter(), priority.iter())
}

/// Collaborators of one test server, kept so tests can inspect them.
pub struct Harness {
    pub server: GameServer,
    pub sessions: Arc<MemorySessionStore>,
    pub scores: Arc<CountingScores>,
}

pub fn harness(cities: &[&str], trivia: Arc<dyn TriviaSource>) -> Harness {
    let sessions = Arc::new(MemorySessionStore::new());
    let scores = Arc::new(CountingScores::default());
    let server = GameServer::new(
        Arc::new(dict(cities, &[])),
        sessions.clone(),
        scores.clone(),
        trivia,
    )
    .with_rng_seed(11)
    .with_io_timeout(Duration::from_millis(500))
    .with_trivia_timeout(Duration::from_millis(200));
    Harness {
        server,
        sessions,
        scores,
    }
}

/// High-score store that counts best-score checks and the writes they caused.
#[derive(Default)]
pub struct CountingScores {
    inner: MemoryHighScoreStore,
    pub checks: AtomicUsize,
    pub records: AtomicUsize,
}

impl CountingScores {
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }
}

impl HighScoreStore for CountingScores {
    fn get(&self, user_id: &str) -> Result<u32, StorageError> {
        self.inner.get(user_id)
    }

    fn put(&self, user_id: &str, score: u32) -> Result<(), StorageError> {
        self.records.fetch_add(1, Ordering::SeqCst);
        self.inner.put(user_id, score)
    }

    fn raise(&self, user_id: &str, score: u32) -> Result<u32, StorageError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let previous = self.inner.raise(user_id, score)?;
        if score > previous {
            self.records.fetch_add(1, Ordering::SeqCst);
        }
        Ok(previous)
    }

    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError> {
        self.inner.table()
    }
}

/// High-score store whose first best-score check stalls before reaching the table,
/// as a busy disk would.
pub struct LaggingScores {
    pub inner: MemoryHighScoreStore,
    lag: Duration,
    calls: AtomicUsize,
}

impl LaggingScores {
    pub fn new(lag: Duration) -> Self {
        Self {
            inner: MemoryHighScoreStore::new(),
            lag,
            calls: AtomicUsize::new(0),
        }
    }
}

impl HighScoreStore for LaggingScores {
    fn get(&self, user_id: &str) -> Result<u32, StorageError> {
        self.inner.get(user_id)
    }

    fn put(&self, user_id: &str, score: u32) -> Result<(), StorageError> {
        self.inner.put(user_id, score)
    }

    fn raise(&self, user_id: &str, score: u32) -> Result<u32, StorageError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(self.lag);
        }
        self.inner.raise(user_id, score)
    }

    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError> {
        self.inner.table()
    }
}

/// Session store whose every call fails.
pub struct BrokenSessions;

impl SessionStore for BrokenSessions {
    fn get(&self, _user_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }

    fn put(&self, _user_id: &str, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }
}

/// High-score store whose every call fails.
pub struct BrokenScores;

impl HighScoreStore for BrokenScores {
    fn get(&self, _user_id: &str) -> Result<u32, StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }

    fn put(&self, _user_id: &str, _score: u32) -> Result<(), StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }

    fn raise(&self, _user_id: &str, _score: u32) -> Result<u32, StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }

    fn table(&self) -> Result<Vec<(String, HighScoreEntry)>, StorageError> {
        Err(StorageError::Internal("disk on fire".into()))
    }
}

/// Session store that blocks longer than any sensible timeout.
pub struct StuckSessions(pub Duration);

impl SessionStore for StuckSessions {
    fn get(&self, _user_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        std::thread::sleep(self.0);
        Ok(None)
    }

    fn put(&self, _user_id: &str, _record: &SessionRecord) -> Result<(), StorageError> {
        std::thread::sleep(self.0);
        Ok(())
    }
}

/// Trivia that answers with a fixed text and records the cities it was asked about.
#[derive(Default)]
pub struct EchoTrivia {
    pub asked: std::sync::Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl TriviaSource for EchoTrivia {
    async fn describe(&self, city_a: &str, city_b: &str) -> Result<String, TriviaError> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push((city_a.to_string(), city_b.to_string()));
        }
        Ok(format!("{} and {} are both lovely.", city_a, city_b))
    }
}

/// Trivia that fails.
pub struct DownTrivia;

#[async_trait]
impl TriviaSource for DownTrivia {
    async fn describe(&self, _a: &str, _b: &str) -> Result<String, TriviaError> {
        Err(TriviaError::Api {
            status: 529,
            message: "overloaded".into(),
        })
    }
}

/// Trivia that never answers in time.
pub struct SlowTrivia;

#[async_trait]
impl TriviaSource for SlowTrivia {
    async fn describe(&self, _a: &str, _b: &str) -> Result<String, TriviaError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".into())
    }
}
