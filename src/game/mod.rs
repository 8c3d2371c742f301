//! # Game Rules
//!
//! The rules engine for the city word-chain game. Everything here is synchronous
//! and free of I/O apart from loading the reference lists.
//!
//! ## Components
//!
//! - [`normalize`] - comparison keys for city names
//! - [`letters`] - last and penultimate playable letters
//! - [`dictionary`] - the immutable reference dictionary
//! - [`fuzzy`] - typo-tolerant lookup of typed cities
//! - [`engine`] - turn validation, engine replies, rescues and hints
//! - [`session`] - per-player state and its persisted record
//! - [`score`] - high-score comparison
//!
//! ```text
//! raw text ─► normalize/fuzzy ─► engine.submit_move ─► engine.choose_reply
//!                                       │                     │
//!                                  GameSession ◄──────────────┘
//! ```

pub mod dictionary;
pub mod engine;
pub mod errors;
pub mod fuzzy;
pub mod letters;
pub mod normalize;
pub mod score;
pub mod session;

pub use dictionary::{City, CityDictionary};
pub use engine::{Accepted, GameEngine, Hint, ReplyOutcome};
pub use errors::MoveError;
pub use fuzzy::FuzzyMatcher;
pub use session::{GameSession, Outcome, Phase, SessionRecord};
