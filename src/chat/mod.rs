//! # Chat Module
//!
//! The application layer between a chat transport and the game rules.
//!
//! - [`commands`] - maps raw message text to an [`Intent`]
//! - [`server`] - the [`GameServer`] dispatcher: per-user serialization, store I/O,
//!   high scores, trivia and reply rendering
//!
//! ```text
//! transport ─► GameServer::handle(user, text) ─► Reply { text, buttons } ─► transport
//!                     │
//!        ┌────────────┼─────────────┐
//!   SessionStore  HighScoreStore  TriviaSource
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citychain::chat::GameServer;
//! use citychain::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::from_config(&config);
//!     println!("{}", server.handle("42", "/start").await);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod server;

pub use commands::{Intent, IntentParser};
pub use server::{GameServer, Reply};
