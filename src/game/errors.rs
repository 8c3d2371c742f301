use thiserror::Error;

/// Validation outcomes for a submitted move. None of them mutate the session;
/// the player may retry the same turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The candidate has no letters, so it cannot be a city.
    #[error("not a city")]
    NotACity,

    /// The city was already played in this game.
    #[error("{display} was already played")]
    AlreadyUsed { display: String },

    /// The city does not start with the expected letter (nor a usable rescue letter).
    #[error("the city must start with '{expected}'")]
    WrongLetter { expected: char },

    /// The rescue letter was used while cities on the expected letter remain.
    #[error("cities on '{expected}' are still available")]
    PrematureRescue { expected: char },

    /// The engine is waiting for the player to accept or decline a rescue.
    #[error("a rescue on '{letter}' is pending a decision")]
    RescuePending { letter: char },

    /// The game is over; a new one has to be started.
    #[error("the game is finished")]
    GameFinished,

    /// A rescue decision arrived while no rescue was offered.
    #[error("no rescue is pending")]
    NoRescuePending,
}
