//! Chat intent parser.
//!
//! Maps one raw chat message to an [`Intent`]. Commands are matched
//! case-insensitively with an optional leading `/`; reply-keyboard buttons are
//! matched by their label, with or without the emoji the keyboard shows. Anything
//! that is not a known command is treated as a city move.
use log::trace;

pub const BTN_HINT: &str = "💡 Hint";
pub const BTN_GIVE_UP: &str = "🏳 Give up";
pub const BTN_FACTS: &str = "📖 Facts";
pub const BTN_CLAIM_VICTORY: &str = "🏆 Claim victory";
pub const BTN_KEEP_PLAYING: &str = "▶ Keep playing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Stop,
    Hint,
    ClaimVictory,
    KeepPlaying,
    Facts,
    Score,
    Help,
    /// Free text to be resolved as a city.
    Move(String),
    /// Blank message.
    Empty,
}

pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> Intent {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Intent::Empty;
        }
        let body = strip_button_decoration(trimmed);
        let body = body.strip_prefix('/').unwrap_or(body);
        // Telegram-style "/start@botname"
        let body = body.split('@').next().unwrap_or(body).trim();
        let lowered = body.to_lowercase();

        let intent = match lowered.as_str() {
            "start" | "new" | "restart" => Intent::Start,
            "stop" | "give up" | "surrender" => Intent::Stop,
            "hint" => Intent::Hint,
            "claim victory" | "claim" => Intent::ClaimVictory,
            "keep playing" | "continue" => Intent::KeepPlaying,
            "facts" | "trivia" => Intent::Facts,
            "score" => Intent::Score,
            "help" | "?" => Intent::Help,
            _ => Intent::Move(trimmed.to_string()),
        };
        trace!("Parsed {:?} from '{}'", intent, crate::logutil::escape_log(raw));
        intent
    }
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a leading emoji (and the space after it) that a keyboard button carries.
fn strip_button_decoration(text: &str) -> &str {
    let start = text
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric() || *c == '/' || *c == '?')
        .map(|(i, _)| i)
        .unwrap_or(0);
    if start == 0 {
        return text;
    }
    let prefix = &text[..start];
    if prefix.chars().all(|c| !c.is_alphanumeric() && (c.is_whitespace() || !c.is_ascii())) {
        &text[start..]
    } else {
        text
    }
}
