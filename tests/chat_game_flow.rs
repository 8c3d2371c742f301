//! End-to-end games through the chat dispatcher with in-memory collaborators.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use citychain::chat::commands::{
    BTN_CLAIM_VICTORY, BTN_FACTS, BTN_GIVE_UP, BTN_HINT, BTN_KEEP_PLAYING,
};
use citychain::chat::GameServer;
use citychain::game::session::Phase;
use citychain::metrics;
use citychain::storage::{HighScoreStore, MemoryHighScoreStore, MemorySessionStore, SessionStore};
use citychain::trivia::{TriviaSource, FALLBACK_MESSAGE};

use common::{
    harness, BrokenScores, BrokenSessions, DownTrivia, EchoTrivia, LaggingScores, SlowTrivia,
    StuckSessions,
};

const SMALL: &[&str] = &["Тверь", "Рязань", "Новгород"];

#[tokio::test]
async fn exhaustion_finishes_game_and_records_score_once() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    h.server.handle("u1", "/start").await;

    let r = h.server.handle("u1", "Тверь").await;
    assert!(r.text.contains("My city: Рязань"), "{}", r.text);
    assert!(r.text.contains("Your letter: Н"), "{}", r.text);
    assert_eq!(r.buttons, vec![BTN_HINT, BTN_FACTS, BTN_GIVE_UP]);

    // nothing on 'д' and nothing on the rescue letter 'о'
    let r = h.server.handle("u1", "Новгород").await;
    assert!(r.text.contains("You win"), "{}", r.text);
    assert!(r.text.contains("Final score: 2"), "{}", r.text);
    assert!(r.text.contains("New personal best: 2"), "{}", r.text);
    assert!(r.buttons.is_empty());

    assert_eq!(h.scores.checks(), 1);
    assert_eq!(h.scores.records(), 1);
    assert!(h.server.session("u1").await.is_none());

    let stored = h.sessions.get("u1").unwrap().unwrap();
    assert_eq!(stored.state_tag(), "idle");

    // messages after the game do not touch the high score again
    let r = h.server.handle("u1", "Тверь").await;
    assert!(r.text.contains("/start"), "{}", r.text);
    assert_eq!(h.scores.records(), 1);
}

#[tokio::test]
async fn rescue_offer_then_keep_playing() {
    let h = harness(&["Тверь", "Елец", "Цюрих"], Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;

    let r = h.server.handle("u", "Тверь").await;
    assert!(r.text.contains("no cities on Р"), "{}", r.text);
    assert!(r.text.contains("go on with Е"), "{}", r.text);
    assert_eq!(r.buttons, vec![BTN_CLAIM_VICTORY, BTN_KEEP_PLAYING]);
    let s = h.server.session("u").await.unwrap();
    assert_eq!(s.phase, Phase::RescueOffered { letter: 'е' });

    // a move while the choice is pending is refused without mutation
    let r = h.server.handle("u", "Цюрих").await;
    assert!(r.text.starts_with("Decide first"), "{}", r.text);
    assert_eq!(h.server.session("u").await.unwrap(), s);

    let r = h.server.handle("u", BTN_KEEP_PLAYING).await;
    assert!(r.text.contains("Then I continue: Елец"), "{}", r.text);
    assert!(r.text.contains("Your letter: Ц"), "{}", r.text);

    let r = h.server.handle("u", "Цюрих").await;
    assert!(r.text.contains("You win"), "{}", r.text);
    assert!(r.text.contains("Final score: 2"), "{}", r.text);
    assert_eq!(h.scores.records(), 1);
}

#[tokio::test]
async fn rescue_offer_then_claim_victory() {
    let h = harness(&["Тверь", "Елец"], Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;
    h.server.handle("u", "Тверь").await;

    let r = h.server.handle("u", BTN_CLAIM_VICTORY).await;
    assert!(r.text.contains("Victory is yours"), "{}", r.text);
    assert!(r.text.contains("Final score: 1"), "{}", r.text);
    assert_eq!(h.scores.records(), 1);
    assert!(h.server.session("u").await.is_none());
}

#[tokio::test]
async fn claim_victory_without_offer_is_refused() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;
    let r = h.server.handle("u", BTN_CLAIM_VICTORY).await;
    assert!(r.text.contains("nothing to decide"), "{}", r.text);
    assert!(h.server.session("u").await.is_some());
}

#[tokio::test]
async fn validation_failures_leave_session_untouched() {
    let h = harness(&["Тверь", "Рязань", "Новгород", "Омск", "Тула"], Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;
    h.server.handle("u", "Тверь").await;
    let before = h.server.session("u").await.unwrap();
    assert_eq!(before.score, 1);

    let r = h.server.handle("u", "Омск").await;
    assert!(r.text.contains("must start with Н"), "{}", r.text);

    let r = h.server.handle("u", "Тверь").await;
    assert!(r.text.contains("Тверь has already been played"), "{}", r.text);

    // the engine's own city counts as played too
    let r = h.server.handle("u", "Рязань").await;
    assert!(r.text.contains("already been played"), "{}", r.text);

    assert_eq!(h.server.session("u").await.unwrap(), before);
}

#[tokio::test]
async fn typos_are_corrected_and_gibberish_is_refused() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;

    let r = h.server.handle("u", "Твер").await;
    assert!(r.text.starts_with("Did you mean Тверь?"), "{}", r.text);
    assert!(r.text.contains("Тверь accepted"), "{}", r.text);

    let r = h.server.handle("u", "Кукарямба").await;
    assert!(r.text.contains("don't know that city"), "{}", r.text);
    assert_eq!(h.server.session("u").await.unwrap().score, 1);
}

#[tokio::test]
async fn hints_follow_the_game() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let r = h.server.handle("u", BTN_HINT).await;
    assert!(r.text.contains("/start"));

    h.server.handle("u", "/start").await;
    let r = h.server.handle("u", BTN_HINT).await;
    assert!(r.text.contains("Any city"), "{}", r.text);

    h.server.handle("u", "Тверь").await;
    let r = h.server.handle("u", BTN_HINT).await;
    assert_eq!(r.text, "💡 Try Новгород.");
}

#[tokio::test]
async fn hint_with_nothing_left_is_a_win() {
    let h = harness(&["Тверь", "Рязань"], Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;
    h.server.handle("u", "Тверь").await;
    let r = h.server.handle("u", BTN_HINT).await;
    assert!(r.text.contains("no cities left"), "{}", r.text);
    assert!(r.text.contains("You win"), "{}", r.text);
    assert_eq!(h.scores.records(), 1);
    assert!(h.server.session("u").await.is_none());
}

#[tokio::test]
async fn stop_reports_score_and_best() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let r = h.server.handle("u", "/stop").await;
    assert!(r.text.contains("No game in progress"));
    assert_eq!(h.scores.checks(), 0);

    // a zero score never becomes a record
    h.server.handle("u", "/start").await;
    let r = h.server.handle("u", "Give up").await;
    assert!(r.text.contains("Final score: 0"), "{}", r.text);
    assert!(r.text.contains("Personal best: 0"), "{}", r.text);
    assert_eq!(h.scores.records(), 0);

    h.server.handle("u", "/start").await;
    h.server.handle("u", "Тверь").await;
    let r = h.server.handle("u", "/stop").await;
    assert!(r.text.contains("New personal best: 1"), "{}", r.text);

    let r = h.server.handle("u", "/score").await;
    assert!(r.text.contains("No game in progress"), "{}", r.text);
    assert!(r.text.contains("Personal best: 1"), "{}", r.text);
}

#[tokio::test]
async fn start_resets_a_running_game() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    h.server.handle("u", "/start").await;
    h.server.handle("u", "Тверь").await;
    h.server.handle("u", "/start").await;
    let s = h.server.session("u").await.unwrap();
    assert_eq!(s.phase, Phase::AwaitingFirstMove);
    assert_eq!(s.score, 0);
    assert!(s.used_keys.is_empty());
    assert_eq!(h.scores.records(), 0);
}

#[tokio::test]
async fn facts_use_the_stored_city_pair() {
    let trivia = Arc::new(EchoTrivia::default());
    let h = harness(SMALL, trivia.clone());
    h.server.handle("u", "/start").await;
    let r = h.server.handle("u", BTN_FACTS).await;
    assert!(r.text.contains("once we have both named a city"), "{}", r.text);

    h.server.handle("u", "Тверь").await;
    let r = h.server.handle("u", BTN_FACTS).await;
    assert!(r.text.contains("Тверь and Рязань are both lovely."), "{}", r.text);
    let asked = trivia.asked.lock().unwrap().clone();
    assert_eq!(asked, vec![("Тверь".to_string(), "Рязань".to_string())]);
}

#[tokio::test]
async fn facts_fall_back_when_service_fails_or_hangs() {
    let sources: Vec<Arc<dyn TriviaSource>> = vec![Arc::new(DownTrivia), Arc::new(SlowTrivia)];
    for trivia in sources {
        let h = harness(SMALL, trivia);
        h.server.handle("u", "/start").await;
        h.server.handle("u", "Тверь").await;
        let started = Instant::now();
        let r = h.server.handle("u", BTN_FACTS).await;
        assert!(r.text.contains(FALLBACK_MESSAGE), "{}", r.text);
        assert!(started.elapsed() < Duration::from_secs(5));
        // the game goes on
        assert_eq!(h.server.session("u").await.unwrap().score, 1);
    }
}

#[tokio::test]
async fn session_survives_a_new_server_instance() {
    let sessions = Arc::new(MemorySessionStore::new());
    let build = |sessions: Arc<MemorySessionStore>| {
        GameServer::new(
            Arc::new(common::dict(SMALL, &[])),
            sessions,
            Arc::new(MemoryHighScoreStore::new()),
            Arc::new(DownTrivia),
        )
        .with_rng_seed(3)
    };

    let first = build(sessions.clone());
    first.handle("u", "/start").await;
    first.handle("u", "Тверь").await;
    drop(first);

    let second = build(sessions.clone());
    let s = second.session("u").await.unwrap();
    assert_eq!(s.score, 1);
    assert_eq!(s.expected_letter, Some('н'));
    let r = second.handle("u", "Новгород").await;
    assert!(r.text.contains("Final score: 2"), "{}", r.text);
}

#[tokio::test]
async fn broken_stores_degrade_without_stopping_the_game() {
    let before = metrics::snapshot();
    let server = GameServer::new(
        Arc::new(common::dict(SMALL, &[])),
        Arc::new(BrokenSessions),
        Arc::new(BrokenScores),
        Arc::new(DownTrivia),
    );
    server.handle("u", "/start").await;
    let r = server.handle("u", "Тверь").await;
    assert!(r.text.contains("My city: Рязань"), "{}", r.text);

    let r = server.handle("u", "Новгород").await;
    assert!(r.text.contains("You win"), "{}", r.text);
    assert!(r.text.contains("could not be saved"), "{}", r.text);

    let after = metrics::snapshot();
    assert!(after.storage_failures >= before.storage_failures + 3);
}

#[tokio::test]
async fn slow_session_store_is_bounded_by_timeout() {
    let server = GameServer::new(
        Arc::new(common::dict(SMALL, &[])),
        Arc::new(StuckSessions(Duration::from_millis(800))),
        Arc::new(MemoryHighScoreStore::new()),
        Arc::new(DownTrivia),
    )
    .with_io_timeout(Duration::from_millis(50));

    let started = Instant::now();
    server.handle("u", "/start").await;
    let r = server.handle("u", "Тверь").await;
    assert!(r.text.contains("Тверь accepted"), "{}", r.text);
    assert!(started.elapsed() < Duration::from_millis(700));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn users_play_independently() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let server = Arc::new(h.server);
    let mut tasks = Vec::new();
    for i in 0..16 {
        let server = server.clone();
        tasks.push(tokio::spawn(async move {
            let user = format!("player-{}", i);
            server.handle(&user, "/start").await;
            server.handle(&user, "Тверь").await
        }));
    }
    for task in tasks {
        let reply = task.await.unwrap();
        assert!(reply.text.contains("My city: Рязань"), "{}", reply.text);
    }
    for i in 0..16 {
        let s = server.session(&format!("player-{}", i)).await.unwrap();
        assert_eq!(s.score, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_from_one_user_apply_once() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let server = Arc::new(h.server);
    server.handle("u", "/start").await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let server = server.clone();
        tasks.push(tokio::spawn(async move { server.handle("u", "Тверь").await }));
    }
    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap().text.contains("Тверь accepted") {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    let s = server.session("u").await.unwrap();
    assert_eq!(s.score, 1);
    assert_eq!(s.used_keys.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_score_check_cannot_lower_the_best() {
    let scores = Arc::new(LaggingScores::new(Duration::from_millis(300)));
    let server = Arc::new(
        GameServer::new(
            Arc::new(common::dict(SMALL, &[])),
            Arc::new(MemorySessionStore::new()),
            scores.clone(),
            Arc::new(DownTrivia),
        )
        .with_rng_seed(5)
        .with_io_timeout(Duration::from_secs(2)),
    );

    // first game ends on 1; its best-score check stalls
    server.handle("u", "/start").await;
    server.handle("u", "Тверь").await;
    let quitter = {
        let server = server.clone();
        tokio::spawn(async move { server.handle("u", "/stop").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // second game ends on 2 while the first check is still pending
    server.handle("u", "/start").await;
    server.handle("u", "Тверь").await;
    let r = server.handle("u", "Новгород").await;
    assert!(r.text.contains("New personal best: 2"), "{}", r.text);

    let r = quitter.await.unwrap();
    assert!(r.text.contains("Final score: 1"), "{}", r.text);
    assert!(r.text.contains("Personal best: 2"), "{}", r.text);
    assert!(!r.text.contains("New personal best"), "{}", r.text);
    assert_eq!(scores.inner.get("u").unwrap(), 2);
}

#[tokio::test]
async fn idle_slots_are_dropped_and_games_reload() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let server = h.server.with_idle_timeout(Duration::from_millis(20));
    server.handle("u", "/start").await;
    server.handle("u", "Тверь").await;
    assert_eq!(server.active_slots().await, 1);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(server.prune_idle_slots().await, 1);
    assert_eq!(server.active_slots().await, 0);

    // the running game comes back from the session store
    let s = server.session("u").await.unwrap();
    assert_eq!(s.score, 1);
    assert_eq!(s.expected_letter, Some('н'));
    let r = server.handle("u", "Новгород").await;
    assert!(r.text.contains("Final score: 2"), "{}", r.text);
}

#[tokio::test]
async fn incoming_messages_sweep_other_idle_players() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let server = h.server.with_idle_timeout(Duration::from_millis(200));
    for user in ["a", "b", "c"] {
        server.handle(user, "/start").await;
        server.handle(user, "/stop").await;
    }
    assert_eq!(server.active_slots().await, 3);

    tokio::time::sleep(Duration::from_millis(300)).await;
    server.handle("d", "/help").await;
    assert_eq!(server.active_slots().await, 1);
}

#[tokio::test]
async fn zero_session_timeout_keeps_slots() {
    let h = harness(SMALL, Arc::new(DownTrivia));
    let server = h.server.with_idle_timeout(Duration::ZERO);
    server.handle("u", "/start").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(server.prune_idle_slots().await, 0);
    server.handle("v", "/start").await;
    assert_eq!(server.active_slots().await, 2);
}
