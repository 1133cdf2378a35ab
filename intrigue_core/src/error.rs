use thiserror::Error;

/// Rejected moves and engine faults. All variants except `Internal` describe
/// a player mistake and leave the game untouched; `Internal` marks a
/// state-model violation so callers can tell engine bugs apart from bad
/// input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("it is not this player's turn")]
    NotYourTurn,

    #[error("the played card is not in the player's hand")]
    CardNotInHand,

    #[error("the countess must be played instead of the king or the prince")]
    CountessObliges,

    #[error("a guard guess may not name the guard's own number")]
    IllegalGuess,

    #[error("no round is in progress")]
    RoundNotActive,

    #[error("player is not part of this game")]
    UnknownPlayer,

    #[error("internal state error: {0}")]
    Internal(String),
}
