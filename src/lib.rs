//! # Citychain - the city word-chain game as a chat bot
//!
//! Players and the bot take turns naming cities. Every city must start with the
//! last playable letter of the previous one (ь, ъ, ы and й are skipped), and no city
//! may be repeated within a game. Typos are forgiven by a fuzzy matcher; when the bot
//! runs out of cities on a letter it may ask the player for a rescue on the
//! penultimate letter, or concede.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use citychain::chat::GameServer;
//! use citychain::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::from_config(&config);
//!     let reply = server.handle("player-1", "/start").await;
//!     println!("{}", reply);
//!     let reply = server.handle("player-1", "Москва").await;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - rules engine: normalization, letters, dictionary, fuzzy lookup, sessions, scoring
//! - [`chat`] - intent parsing and the per-user dispatcher
//! - [`storage`] - session and high-score persistence
//! - [`trivia`] - optional AI trivia about the last two cities
//! - [`config`] - configuration management and validation
//! - [`logutil`] - single-line escaping for user text in logs
//! - [`metrics`] - process-local game counters
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   GameServer    │ ← per-user locks, store I/O, rendering
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Game rules    │ ← pure, synchronous, seeded RNG injected
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← sled sessions, JSON high scores
//! └─────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod storage;
pub mod trivia;
