//! Turn validation, engine replies and hints.
//!
//! The engine is a thin set of rules over a borrowed, immutable [`CityDictionary`].
//! All state lives in the [`GameSession`] handed in by the caller, and all
//! randomness comes from the `Rng` the caller injects, so a seeded generator makes
//! every choice reproducible.
//!
//! Flow of one turn:
//! 1. [`GameEngine::submit_move`] validates the player's city and records it.
//! 2. [`GameEngine::choose_reply`] answers on the last playable letter of that city,
//!    offers a rescue on the penultimate letter, or concedes.
//! 3. While a rescue is offered, [`GameEngine::resolve_rescue_choice`] either ends the
//!    game in the player's favour or lets the engine continue on the rescue letter.

use rand::seq::SliceRandom;
use rand::Rng;

use super::dictionary::{City, CityDictionary};
use super::errors::MoveError;
use super::letters::{last_playable_letter, penultimate_playable_letter};
use super::session::{GameSession, Outcome, Phase};

/// A move that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// True when the move was allowed only through the rescue (penultimate) letter.
    pub rescue_used: bool,
    /// Last playable letter of the accepted city; the engine answers on it.
    pub reply_letter: char,
}

/// What the engine did with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The engine played `city`; the player must continue on `next_letter`.
    Replied { city: City, next_letter: char },
    /// Nothing on the expected letter; the engine could continue on `letter` if the player agrees.
    RescueOffered { letter: char },
    /// The engine has no move left (or the player claimed the win). The game is finished.
    PlayerWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// No city played yet, any city will do.
    NotStarted,
    Suggestion(String),
    /// Neither the expected letter nor the rescue letter has unused cities.
    NoCitiesLeft,
}

pub struct GameEngine<'a> {
    dict: &'a CityDictionary,
}

impl<'a> GameEngine<'a> {
    pub fn new(dict: &'a CityDictionary) -> Self {
        Self { dict }
    }

    pub fn dictionary(&self) -> &'a CityDictionary {
        self.dict
    }

    /// Validate and record the player's move. On error the session is untouched.
    pub fn submit_move(
        &self,
        session: &mut GameSession,
        key: &str,
        display: &str,
    ) -> Result<Accepted, MoveError> {
        match session.phase {
            Phase::Finished(_) => return Err(MoveError::GameFinished),
            Phase::RescueOffered { letter } => return Err(MoveError::RescuePending { letter }),
            Phase::AwaitingFirstMove | Phase::AwaitingReply => {}
        }
        if key.is_empty() {
            return Err(MoveError::NotACity);
        }
        if session.is_used(key) {
            return Err(MoveError::AlreadyUsed {
                display: display.to_string(),
            });
        }

        let mut rescue_used = false;
        if let Some(expected) = session.expected_letter {
            if !key.starts_with(expected) {
                let penult_ok = session
                    .expected_penultimate_letter
                    .map(|p| key.starts_with(p))
                    .unwrap_or(false);
                if !penult_ok {
                    return Err(MoveError::WrongLetter { expected });
                }
                if self.dict.any_unused_starting_with(expected, &session.used_keys) {
                    return Err(MoveError::PrematureRescue { expected });
                }
                rescue_used = true;
            }
        }

        let Some(reply_letter) = last_playable_letter(key) else {
            return Err(MoveError::NotACity);
        };

        session.used_keys.insert(key.to_string());
        session.score = session.score.saturating_add(1);
        session.expected_letter = Some(reply_letter);
        session.expected_penultimate_letter = penultimate_playable_letter(display);
        session.last_player_city = Some(display.to_string());
        session.phase = Phase::AwaitingReply;

        Ok(Accepted {
            rescue_used,
            reply_letter,
        })
    }

    /// Pick the engine's city on `letter`.
    ///
    /// When nothing is left on `letter`, the penultimate playable letter of
    /// `last_player_display` is checked: if it still has cities a rescue is offered,
    /// otherwise the game ends with the player winning.
    pub fn choose_reply<R: Rng + ?Sized>(
        &self,
        session: &mut GameSession,
        letter: char,
        last_player_display: &str,
        rng: &mut R,
    ) -> ReplyOutcome {
        let candidates = self.dict.unused_starting_with(letter, &session.used_keys);
        if let Some(city) = self.pick(&candidates, rng) {
            let city = city.clone();
            session.used_keys.insert(city.key.clone());
            let next_letter = last_playable_letter(&city.display)
                .or_else(|| city.key.chars().last())
                .unwrap_or(letter);
            session.expected_letter = Some(next_letter);
            session.expected_penultimate_letter = penultimate_playable_letter(&city.display);
            session.last_engine_city = Some(city.display.clone());
            session.phase = Phase::AwaitingReply;
            return ReplyOutcome::Replied { city, next_letter };
        }

        if let Some(p) = penultimate_playable_letter(last_player_display) {
            if self.dict.any_unused_starting_with(p, &session.used_keys) {
                session.phase = Phase::RescueOffered { letter: p };
                return ReplyOutcome::RescueOffered { letter: p };
            }
        }

        session.phase = Phase::Finished(Outcome::PlayerWon);
        ReplyOutcome::PlayerWins
    }

    /// Settle a pending rescue. Declining hands the win to the player; accepting lets
    /// the engine answer on the rescue letter.
    pub fn resolve_rescue_choice<R: Rng + ?Sized>(
        &self,
        session: &mut GameSession,
        accept: bool,
        rng: &mut R,
    ) -> Result<ReplyOutcome, MoveError> {
        let letter = match session.phase {
            Phase::RescueOffered { letter } => letter,
            Phase::Finished(_) => return Err(MoveError::GameFinished),
            _ => return Err(MoveError::NoRescuePending),
        };
        if !accept {
            session.phase = Phase::Finished(Outcome::PlayerWon);
            return Ok(ReplyOutcome::PlayerWins);
        }
        let last = session.last_player_city.clone().unwrap_or_default();
        Ok(self.choose_reply(session, letter, &last, rng))
    }

    /// Suggest an unused city for the player's next move.
    pub fn hint<R: Rng + ?Sized>(&self, session: &GameSession, rng: &mut R) -> Hint {
        let Some(expected) = session.expected_letter else {
            return Hint::NotStarted;
        };
        let primary = self.dict.unused_starting_with(expected, &session.used_keys);
        if let Some(city) = self.pick(&primary, rng) {
            return Hint::Suggestion(city.display.clone());
        }
        if let Some(p) = session.expected_penultimate_letter {
            let rescue = self.dict.unused_starting_with(p, &session.used_keys);
            if let Some(city) = self.pick(&rescue, rng) {
                return Hint::Suggestion(city.display.clone());
            }
        }
        Hint::NoCitiesLeft
    }

    /// The player gives up; the score stays as it is.
    pub fn surrender(&self, session: &mut GameSession) {
        if !session.is_finished() {
            session.phase = Phase::Finished(Outcome::Surrendered);
        }
    }

    /// Uniform pick, restricted to priority cities when any are among the candidates.
    fn pick<'c, R: Rng + ?Sized>(&self, candidates: &[&'c City], rng: &mut R) -> Option<&'c City> {
        let preferred: Vec<&City> = candidates
            .iter()
            .copied()
            .filter(|c| self.dict.is_priority(&c.key))
            .collect();
        if preferred.is_empty() {
            candidates.choose(rng).copied()
        } else {
            preferred.choose(rng).copied()
        }
    }
}
