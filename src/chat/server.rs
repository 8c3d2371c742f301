//! # Game Server - chat message dispatcher
//!
//! [`GameServer::handle`] takes one chat message from one user and returns the
//! [`Reply`] to send back. It owns the per-user state machine glue around the pure
//! rules in [`crate::game`]:
//!
//! 1. parse the message into an [`Intent`]
//! 2. make sure the user's session is loaded (store read, bounded by a timeout)
//! 3. apply the intent under the user's lock; no I/O happens while it is held
//! 4. after the lock is released: persist the new revision, record the high score
//!    of a finished game, fetch trivia
//!
//! Different users never wait on each other. Messages from the same user are
//! applied one at a time in arrival order of the lock.
//!
//! A user's slot is dropped from memory once it has been idle for the configured
//! session timeout and no message is in flight for it; the next message reloads the
//! game from the session store.
//!
//! Store failures never abort a game: a failed load starts the user fresh, a failed
//! write is logged and the in-memory state stays authoritative.
use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::commands::{
    Intent, IntentParser, BTN_CLAIM_VICTORY, BTN_FACTS, BTN_GIVE_UP, BTN_HINT, BTN_KEEP_PLAYING,
};
use crate::config::Config;
use crate::game::engine::{GameEngine, Hint, ReplyOutcome};
use crate::game::errors::MoveError;
use crate::game::fuzzy::{FuzzyMatcher, DEFAULT_THRESHOLD};
use crate::game::score::{record_high_score, ScoreReport};
use crate::game::session::{GameSession, Outcome, Phase, SessionRecord};
use crate::game::CityDictionary;
use crate::logutil::escape_log;
use crate::metrics;
use crate::storage::{
    HighScoreStore, JsonHighScoreStore, MemorySessionStore, SessionStore, SledSessionStore,
    StorageError,
};
use crate::trivia::{describe_or_fallback, HttpTrivia, TriviaSource};

/// Log target for game lifecycle events.
pub const GAME_LOG: &str = "citychain::games";

const PLAYING_BUTTONS: &[&str] = &[BTN_HINT, BTN_FACTS, BTN_GIVE_UP];
const RESCUE_BUTTONS: &[&str] = &[BTN_CLAIM_VICTORY, BTN_KEEP_PLAYING];

/// Upper bound between two idle-slot sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const NO_GAME: &str = "No game in progress. Send /start to play.";

const HELP_TEXT: &str = "Cities: name a city that starts with the last letter of my city \
(ь, ъ, ы and й are skipped).\n\
/start - new game\n\
/stop - give up\n\
/score - current score and personal best\n\
Hint - suggest a city\n\
Facts - trivia about the last two cities";

/// Text plus reply-keyboard buttons for one outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<&'static str>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    fn with_buttons(mut self, buttons: &[&'static str]) -> Self {
        self.buttons = buttons.to_vec();
        self
    }

    fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.buttons.is_empty() {
            write!(f, "\n[ {} ]", self.buttons.join(" | "))?;
        }
        Ok(())
    }
}

/// In-memory state for one user; guarded by that user's lock.
#[derive(Debug)]
struct UserSlot {
    loaded: bool,
    revision: u64,
    session: Option<GameSession>,
    last_seen: Instant,
}

impl UserSlot {
    fn new() -> Self {
        Self {
            loaded: false,
            revision: 0,
            session: None,
            last_seen: Instant::now(),
        }
    }

    fn idle_for(&self, limit: Duration) -> bool {
        self.last_seen.elapsed() >= limit
    }

    /// Revisions follow the wall clock so writes after a failed load still supersede
    /// whatever the store holds.
    fn next_revision(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.revision = (self.revision + 1).max(now);
        self.revision
    }
}

/// Work to run once the user's lock is released.
#[derive(Debug, Default)]
struct Effects {
    persist: Option<SessionRecord>,
    finished_score: Option<u32>,
    show_best: bool,
    trivia: Option<(String, String)>,
}

pub struct GameServer {
    dict: Arc<CityDictionary>,
    parser: IntentParser,
    threshold: u8,
    sessions: Arc<dyn SessionStore>,
    scores: Arc<dyn HighScoreStore>,
    trivia: Arc<dyn TriviaSource>,
    io_timeout: Duration,
    trivia_timeout: Duration,
    idle_timeout: Duration,
    last_sweep: StdMutex<Instant>,
    rng: StdMutex<StdRng>,
    slots: Mutex<HashMap<String, Arc<Mutex<UserSlot>>>>,
}

impl GameServer {
    pub fn new(
        dict: Arc<CityDictionary>,
        sessions: Arc<dyn SessionStore>,
        scores: Arc<dyn HighScoreStore>,
        trivia: Arc<dyn TriviaSource>,
    ) -> Self {
        Self {
            dict,
            parser: IntentParser::new(),
            threshold: DEFAULT_THRESHOLD,
            sessions,
            scores,
            trivia,
            io_timeout: Duration::from_millis(2000),
            trivia_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30 * 60),
            last_sweep: StdMutex::new(Instant::now()),
            rng: StdMutex::new(StdRng::from_entropy()),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Build a server from configuration. Never fails: a missing city list gives an
    /// empty dictionary and an unusable session database falls back to memory.
    pub fn from_config(config: &Config) -> Self {
        let dict = CityDictionary::load_or_empty(
            Path::new(&config.game.cities_file),
            config.game.priority_file.as_deref().map(Path::new),
        );
        let sessions_path = config.storage.sessions_path();
        let sessions: Arc<dyn SessionStore> = match SledSessionStore::open(&sessions_path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(
                    "Session store at {} unavailable ({}); sessions will not survive a restart",
                    sessions_path.display(),
                    e
                );
                metrics::inc_storage_failures();
                Arc::new(MemorySessionStore::new())
            }
        };
        let scores = Arc::new(JsonHighScoreStore::new(&config.storage.data_dir));
        let trivia = Arc::new(HttpTrivia::new(config.trivia.clone()));

        let mut server = Self::new(Arc::new(dict), sessions, scores, trivia)
            .with_threshold(config.game.fuzzy_threshold)
            .with_io_timeout(Duration::from_millis(config.storage.io_timeout_ms))
            .with_trivia_timeout(Duration::from_secs(config.trivia.timeout_seconds as u64))
            .with_idle_timeout(Duration::from_secs(config.game.session_timeout.saturating_mul(60)));
        if let Some(seed) = config.game.rng_seed {
            server = server.with_rng_seed(seed);
        }
        server
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    pub fn with_io_timeout(mut self, limit: Duration) -> Self {
        self.io_timeout = limit;
        self
    }

    pub fn with_trivia_timeout(mut self, limit: Duration) -> Self {
        self.trivia_timeout = limit;
        self
    }

    /// How long a user's slot may sit unused before it is dropped from memory.
    /// Zero keeps every slot.
    pub fn with_idle_timeout(mut self, limit: Duration) -> Self {
        self.idle_timeout = limit;
        self
    }

    /// Make every engine choice reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdMutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn dictionary(&self) -> &CityDictionary {
        &self.dict
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Snapshot of the user's current game, if any.
    pub async fn session(&self, user_id: &str) -> Option<GameSession> {
        let slot = self.slot(user_id).await;
        self.ensure_loaded(user_id, &slot).await;
        let guard = slot.lock().await;
        guard.session.clone()
    }

    /// Number of users currently held in memory.
    pub async fn active_slots(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Drop every slot that has been idle for the session timeout and that no
    /// in-flight message holds. Returns how many were dropped.
    pub async fn prune_idle_slots(&self) -> usize {
        if self.idle_timeout.is_zero() {
            return 0;
        }
        let limit = self.idle_timeout;
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        // new handles are only cloned out under the map lock, so a count of 1 stays 1
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => !guard.idle_for(limit),
                Err(_) => true,
            }
        });
        let pruned = before - slots.len();
        if pruned > 0 {
            debug!("Pruned {} idle player slot(s), {} remain", pruned, slots.len());
        }
        pruned
    }

    async fn sweep_if_due(&self) {
        if self.idle_timeout.is_zero() {
            return;
        }
        {
            let mut last = self.last_sweep.lock().unwrap_or_else(|p| p.into_inner());
            if last.elapsed() < SWEEP_INTERVAL.min(self.idle_timeout) {
                return;
            }
            *last = Instant::now();
        }
        self.prune_idle_slots().await;
    }

    /// Handle one chat message from `user_id`.
    pub async fn handle(&self, user_id: &str, text: &str) -> Reply {
        self.sweep_if_due().await;
        let intent = self.parser.parse(text);
        debug!(
            "chat: user={} text='{}' intent={}",
            escape_log(user_id),
            escape_log(text),
            intent_name(&intent)
        );
        let slot = self.slot(user_id).await;
        self.ensure_loaded(user_id, &slot).await;

        let mut effects = Effects::default();
        let mut reply = {
            let mut guard = slot.lock().await;
            guard.last_seen = Instant::now();
            self.apply(user_id, &mut guard, intent, &mut effects)
        };
        self.run_effects(user_id, effects, &mut reply).await;
        reply
    }

    async fn slot(&self, user_id: &str) -> Arc<Mutex<UserSlot>> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserSlot::new())))
            .clone()
    }

    async fn ensure_loaded(&self, user_id: &str, slot: &Mutex<UserSlot>) {
        if slot.lock().await.loaded {
            return;
        }
        let record = self.load(user_id).await;
        let mut guard = slot.lock().await;
        if guard.loaded {
            return;
        }
        guard.loaded = true;
        if let Some(record) = record {
            guard.revision = record.revision;
            guard.session = record.session.filter(|s| !s.is_finished());
        }
    }

    fn rng(&self) -> StdMutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ---------------------------------------------------------------------
    // State transitions (run under the user's lock, no I/O)
    // ---------------------------------------------------------------------

    fn apply(&self, user_id: &str, slot: &mut UserSlot, intent: Intent, effects: &mut Effects) -> Reply {
        match intent {
            Intent::Start => self.on_start(user_id, slot, effects),
            Intent::Stop => self.on_stop(user_id, slot, effects),
            Intent::Hint => self.on_hint(user_id, slot, effects),
            Intent::ClaimVictory => self.on_rescue_choice(user_id, slot, false, effects),
            Intent::KeepPlaying => self.on_rescue_choice(user_id, slot, true, effects),
            Intent::Facts => match slot.session.as_ref().and_then(|s| s.trivia_pair()) {
                Some(pair) => {
                    effects.trivia = Some(pair);
                    Reply::new("")
                }
                None => Reply::new("Facts are available once we have both named a city."),
            },
            Intent::Score => {
                effects.show_best = true;
                match slot.session.as_ref() {
                    Some(s) => Reply::new(format!("Current score: {}.", s.score)),
                    None => Reply::new(NO_GAME),
                }
            }
            Intent::Help => Reply::new(HELP_TEXT),
            Intent::Empty => Reply::new("Send a city name, or /help."),
            Intent::Move(text) => self.on_move(user_id, slot, &text, effects),
        }
    }

    fn on_start(&self, user_id: &str, slot: &mut UserSlot, effects: &mut Effects) -> Reply {
        if let Some(old) = slot.session.as_ref() {
            info!(
                target: GAME_LOG,
                "game.abandon user={} score={}",
                escape_log(user_id),
                old.score
            );
        }
        slot.session = Some(GameSession::new());
        self.checkpoint(slot, effects);
        metrics::inc_games_started();
        info!(target: GAME_LOG, "game.start user={}", escape_log(user_id));
        Reply::new(
            "Let's play cities! Name any city. Every next city must start with the last \
             letter of the previous one (ь, ъ, ы and й are skipped).",
        )
        .with_buttons(&[BTN_HINT, BTN_GIVE_UP])
    }

    fn on_stop(&self, user_id: &str, slot: &mut UserSlot, effects: &mut Effects) -> Reply {
        let Some(session) = slot.session.as_mut() else {
            return Reply::new(NO_GAME);
        };
        GameEngine::new(&self.dict).surrender(session);
        let score = self.finish(user_id, slot, effects);
        Reply::new(format!("You gave up. Final score: {}.", score))
    }

    fn on_hint(&self, user_id: &str, slot: &mut UserSlot, effects: &mut Effects) -> Reply {
        let Some(session) = slot.session.as_mut() else {
            return Reply::new(NO_GAME);
        };
        if let Phase::RescueOffered { letter } = session.phase {
            return rescue_prompt(letter);
        }
        let hint = GameEngine::new(&self.dict).hint(session, &mut *self.rng());
        match hint {
            Hint::NotStarted => {
                Reply::new("Any city will do for the first move.").with_buttons(PLAYING_BUTTONS)
            }
            Hint::Suggestion(display) => {
                Reply::new(format!("💡 Try {}.", display)).with_buttons(PLAYING_BUTTONS)
            }
            Hint::NoCitiesLeft => {
                session.phase = Phase::Finished(Outcome::PlayerWon);
                let score = self.finish(user_id, slot, effects);
                Reply::new(format!(
                    "There are no cities left to play. You win! 🏆 Final score: {}.",
                    score
                ))
            }
        }
    }

    fn on_rescue_choice(
        &self,
        user_id: &str,
        slot: &mut UserSlot,
        accept: bool,
        effects: &mut Effects,
    ) -> Reply {
        let Some(session) = slot.session.as_mut() else {
            return Reply::new(NO_GAME);
        };
        let engine = GameEngine::new(&self.dict);
        let outcome = engine.resolve_rescue_choice(session, accept, &mut *self.rng());
        match outcome {
            Err(e) => render_move_error(&e),
            Ok(ReplyOutcome::Replied { city, next_letter }) => {
                metrics::inc_rescues_granted();
                self.checkpoint(slot, effects);
                Reply::new(format!(
                    "Then I continue: {}. Your letter: {}.",
                    city.display,
                    upper(next_letter)
                ))
                .with_buttons(PLAYING_BUTTONS)
            }
            Ok(ReplyOutcome::RescueOffered { letter }) => {
                self.checkpoint(slot, effects);
                rescue_prompt(letter)
            }
            Ok(ReplyOutcome::PlayerWins) => {
                let score = self.finish(user_id, slot, effects);
                let lead = if accept {
                    "I could not find anything after all."
                } else {
                    "Victory is yours!"
                };
                Reply::new(format!("{} 🏆 Final score: {}.", lead, score))
            }
        }
    }

    fn on_move(&self, user_id: &str, slot: &mut UserSlot, text: &str, effects: &mut Effects) -> Reply {
        let Some(session) = slot.session.as_mut() else {
            return Reply::new(NO_GAME);
        };
        if self.dict.is_empty() {
            return Reply::new("I can't check cities right now, the city list is unavailable.");
        }
        let Some(resolved) = FuzzyMatcher::new(&self.dict).resolve(text, self.threshold) else {
            metrics::inc_moves_rejected();
            info!(
                target: GAME_LOG,
                "move.rejected user={} reason=no_match input='{}'",
                escape_log(user_id),
                escape_log(text)
            );
            return Reply::new("I don't know that city 🤷 Check the spelling and try again.")
                .with_buttons(PLAYING_BUTTONS);
        };
        let key = resolved.city.key.clone();
        let display = resolved.city.display.clone();

        let mut reply = Reply::new("");
        if resolved.corrected {
            reply.push_line(&format!("Did you mean {}? Taking it.", display));
        }

        let engine = GameEngine::new(&self.dict);
        let accepted = match engine.submit_move(session, &key, &display) {
            Ok(accepted) => accepted,
            Err(e) => {
                metrics::inc_moves_rejected();
                info!(
                    target: GAME_LOG,
                    "move.rejected user={} city='{}' reason={}",
                    escape_log(user_id),
                    escape_log(&display),
                    e
                );
                let mut rendered = render_move_error(&e);
                if !reply.text.is_empty() {
                    rendered.text = format!("{}\n{}", reply.text, rendered.text);
                }
                return rendered;
            }
        };
        metrics::inc_moves_accepted();
        info!(
            target: GAME_LOG,
            "move.accepted user={} city='{}' score={} rescue={}",
            escape_log(user_id),
            escape_log(&display),
            session.score,
            accepted.rescue_used
        );
        if accepted.rescue_used {
            metrics::inc_rescues_granted();
        }
        reply.push_line(&format!("✅ {} accepted.", display));

        let outcome = engine.choose_reply(session, accepted.reply_letter, &display, &mut *self.rng());
        match outcome {
            ReplyOutcome::Replied { city, next_letter } => {
                self.checkpoint(slot, effects);
                reply.push_line(&format!(
                    "My city: {}. Your letter: {}.",
                    city.display,
                    upper(next_letter)
                ));
                reply.with_buttons(PLAYING_BUTTONS)
            }
            ReplyOutcome::RescueOffered { letter } => {
                self.checkpoint(slot, effects);
                info!(
                    target: GAME_LOG,
                    "rescue.offered user={} missing={} rescue={}",
                    escape_log(user_id),
                    accepted.reply_letter,
                    letter
                );
                reply.push_line(&format!(
                    "I have no cities on {}. I could go on with {}.",
                    upper(accepted.reply_letter),
                    upper(letter)
                ));
                reply.push_line("Claim victory, or let me keep playing?");
                reply.with_buttons(RESCUE_BUTTONS)
            }
            ReplyOutcome::PlayerWins => {
                let score = self.finish(user_id, slot, effects);
                reply.push_line(&format!(
                    "I have no cities on {} left. You win! 🏆 Final score: {}.",
                    upper(accepted.reply_letter),
                    score
                ));
                reply
            }
        }
    }

    /// Queue the current session for persistence under a fresh revision.
    fn checkpoint(&self, slot: &mut UserSlot, effects: &mut Effects) {
        let revision = slot.next_revision();
        effects.persist = Some(SessionRecord::new(revision, slot.session.clone()));
    }

    /// Discard a finished session and queue its high-score check. Returns the final score.
    fn finish(&self, user_id: &str, slot: &mut UserSlot, effects: &mut Effects) -> u32 {
        let Some(session) = slot.session.take() else {
            return 0;
        };
        let outcome = match session.phase {
            Phase::Finished(Outcome::PlayerWon) => {
                metrics::inc_games_won();
                "won"
            }
            Phase::Finished(Outcome::Surrendered) => {
                metrics::inc_games_surrendered();
                "surrendered"
            }
            _ => "abandoned",
        };
        info!(
            target: GAME_LOG,
            "game.finish user={} outcome={} score={} cities={}",
            escape_log(user_id),
            outcome,
            session.score,
            session.used_keys.len()
        );
        let revision = slot.next_revision();
        effects.persist = Some(SessionRecord::new(revision, None));
        effects.finished_score = Some(session.score);
        session.score
    }

    // ---------------------------------------------------------------------
    // I/O (after the user's lock is released)
    // ---------------------------------------------------------------------

    async fn run_effects(&self, user_id: &str, effects: Effects, reply: &mut Reply) {
        if let Some(record) = effects.persist {
            self.persist(user_id, record).await;
        }
        if let Some(score) = effects.finished_score {
            match self.record_score(user_id, score).await {
                Ok(ScoreReport { new_record: true, best, .. }) => {
                    reply.push_line(&format!("🎉 New personal best: {}!", best));
                }
                Ok(report) => reply.push_line(&format!("Personal best: {}.", report.best)),
                Err(e) => {
                    warn!("High score for {} not recorded: {}", escape_log(user_id), e);
                    metrics::inc_storage_failures();
                    reply.push_line("(Your score could not be saved this time.)");
                }
            }
            reply.buttons.clear();
        }
        if effects.show_best {
            match self.best_score(user_id).await {
                Ok(best) => reply.push_line(&format!("Personal best: {}.", best)),
                Err(e) => {
                    warn!("High score lookup for {} failed: {}", escape_log(user_id), e);
                    metrics::inc_storage_failures();
                    reply.push_line("Personal best is unavailable right now.");
                }
            }
        }
        if let Some((city_a, city_b)) = effects.trivia {
            let (text, _) =
                describe_or_fallback(self.trivia.as_ref(), &city_a, &city_b, self.trivia_timeout).await;
            reply.push_line(&format!("📖 {} and {}:\n{}", city_a, city_b, text));
        }
    }

    async fn blocking_io<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce() -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let limit = self.io_timeout;
        match timeout(limit, tokio::task::spawn_blocking(f)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(StorageError::Internal(join.to_string())),
            Err(_) => Err(StorageError::Timeout(limit.as_millis() as u64)),
        }
    }

    async fn load(&self, user_id: &str) -> Option<SessionRecord> {
        let store = self.sessions.clone();
        let uid = user_id.to_string();
        match self.blocking_io(move || store.get(&uid)).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Session load for {} failed: {}; starting fresh",
                    escape_log(user_id),
                    e
                );
                metrics::inc_storage_failures();
                None
            }
        }
    }

    async fn persist(&self, user_id: &str, record: SessionRecord) {
        let store = self.sessions.clone();
        let uid = user_id.to_string();
        let revision = record.revision;
        if let Err(e) = self.blocking_io(move || store.put(&uid, &record)).await {
            warn!(
                "Session write for {} (revision {}) failed: {}",
                escape_log(user_id),
                revision,
                e
            );
            metrics::inc_storage_failures();
        }
    }

    async fn record_score(&self, user_id: &str, score: u32) -> Result<ScoreReport, StorageError> {
        let store = self.scores.clone();
        let uid = user_id.to_string();
        self.blocking_io(move || record_high_score(store.as_ref(), &uid, score))
            .await
    }

    async fn best_score(&self, user_id: &str) -> Result<u32, StorageError> {
        let store = self.scores.clone();
        let uid = user_id.to_string();
        self.blocking_io(move || store.get(&uid)).await
    }
}

fn upper(letter: char) -> String {
    letter.to_uppercase().collect()
}

fn rescue_prompt(letter: char) -> Reply {
    Reply::new(format!(
        "Decide first: claim victory, or let me continue on {}?",
        upper(letter)
    ))
    .with_buttons(RESCUE_BUTTONS)
}

fn render_move_error(e: &MoveError) -> Reply {
    match e {
        MoveError::NotACity => Reply::new("That doesn't look like a city.").with_buttons(PLAYING_BUTTONS),
        MoveError::AlreadyUsed { display } => {
            Reply::new(format!("{} has already been played. Try another one.", display))
                .with_buttons(PLAYING_BUTTONS)
        }
        MoveError::WrongLetter { expected } => {
            Reply::new(format!("The city must start with {}.", upper(*expected)))
                .with_buttons(PLAYING_BUTTONS)
        }
        MoveError::PrematureRescue { expected } => Reply::new(format!(
            "There are still cities on {}. The rescue letter only counts once they run out.",
            upper(*expected)
        ))
        .with_buttons(PLAYING_BUTTONS),
        MoveError::RescuePending { letter } => rescue_prompt(*letter),
        MoveError::GameFinished => Reply::new("This game is over. Send /start to play again."),
        MoveError::NoRescuePending => {
            Reply::new("There is nothing to decide right now.").with_buttons(PLAYING_BUTTONS)
        }
    }
}

fn intent_name(intent: &Intent) -> &'static str {
    match intent {
        Intent::Start => "start",
        Intent::Stop => "stop",
        Intent::Hint => "hint",
        Intent::ClaimVictory => "claim_victory",
        Intent::KeepPlaying => "keep_playing",
        Intent::Facts => "facts",
        Intent::Score => "score",
        Intent::Help => "help",
        Intent::Move(_) => "move",
        Intent::Empty => "empty",
    }
}
