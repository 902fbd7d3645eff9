//! Bluff game engine: cards, the canonical state and the rules over it.
//!
//! This module has no networking. The session authority drives it and
//! the replica reuses its entity types.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod rules;
pub mod state;

pub use entities::{Card, CardId, Deck, DeckKind, ParticipantId, Player, PlayerIndex, PlayerName, Rank, Suit};
pub use errors::ActionError;
pub use rules::{ChallengeMode, ChallengeOutcome, ChallengeResolution};
pub use state::{GamePhase, GameState, LastBet, deal_round_robin};
