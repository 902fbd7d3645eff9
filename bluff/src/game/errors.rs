//! Errors for rejected participant actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::PlayerIndex;

/// Reasons the authority refuses an action request.
///
/// A rejected action never mutates the game and is never broadcast.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("participant is already registered")]
    AlreadyRegistered,
    #[error("can't challenge your own wager")]
    CannotChallengeOwnWager,
    #[error("card is not in the bettor's hand")]
    CardNotInHand,
    #[error("card position {position} is out of range for a hand of {hand_size}")]
    CardPositionOutOfRange { position: usize, hand_size: usize },
    #[error("same card listed twice")]
    DuplicateCard,
    #[error("card position {0} selected twice")]
    DuplicateCardPosition(usize),
    #[error("select at least one card")]
    EmptySelection,
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("game is not in progress")]
    GameNotInProgress,
    #[error("wager must be 1 to {max} cards, got {size}")]
    InvalidBetSize { size: usize, max: usize },
    #[error("invalid game state: player index {0} out of bounds")]
    InvalidPlayerIndex(PlayerIndex),
    #[error("no active wager to challenge")]
    NoActiveWager,
    #[error("need {min}+ players")]
    NotEnoughPlayers { min: usize },
    #[error("not your turn")]
    NotYourTurn,
    #[error("reveal index {index} is out of range for a wager of {wager_size}")]
    RevealIndexOutOfRange { index: usize, wager_size: usize },
    #[error("session is full")]
    SessionFull,
    #[error("unknown participant")]
    UnknownParticipant,
}
