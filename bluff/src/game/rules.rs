//! Pure legality checks and challenge resolution.
//!
//! Nothing in here mutates a [`GameState`]; the session authority asks
//! these functions first and applies the transitions afterwards.

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

use super::{
    constants::MAX_BET_CARDS,
    entities::{Card, PlayerIndex, Rank},
    errors::ActionError,
    state::{GamePhase, GameState},
};

/// How the current player challenges the last wager.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ChallengeMode {
    /// Inspect a card expecting it to match the declared rank.
    Believe,
    /// Inspect a card expecting to catch the bettor lying.
    Bluff,
}

impl fmt::Display for ChallengeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Believe => write!(f, "believe"),
            Self::Bluff => write!(f, "bluff"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ChallengeOutcome {
    /// Believe: the card matched. Pile is discarded.
    TrustJustified,
    /// Believe: the card did not match. Challenger takes the pile.
    TrustMisplaced,
    /// Bluff: the card did not match. Bettor takes the pile.
    LiarCaught,
    /// Bluff: the card matched. Pile is discarded.
    FalseAccusation,
}

impl ChallengeOutcome {
    /// Whether the declared rank survived the inspection.
    pub fn declaration_upheld(self) -> bool {
        matches!(self, Self::TrustJustified | Self::FalseAccusation)
    }
}

impl fmt::Display for ChallengeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::TrustJustified => "trust was justified",
            Self::TrustMisplaced => "trust was misplaced",
            Self::LiarCaught => "liar caught",
            Self::FalseAccusation => "false accusation",
        };
        write!(f, "{repr}")
    }
}

/// Result of resolving a challenge against the current state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChallengeResolution {
    pub revealed: Card,
    pub outcome: ChallengeOutcome,
    /// `None` means the pile goes to the discard.
    pub pile_recipient: Option<PlayerIndex>,
}

/// The game is running and `player` is the one to act.
pub fn ensure_turn(state: &GameState, player: PlayerIndex) -> Result<(), ActionError> {
    if state.phase != GamePhase::Playing {
        return Err(ActionError::GameNotInProgress);
    }
    if player >= state.players.len() {
        return Err(ActionError::InvalidPlayerIndex(player));
    }
    if state.current_turn != player {
        return Err(ActionError::NotYourTurn);
    }
    Ok(())
}

pub fn validate_bet(
    state: &GameState,
    player: PlayerIndex,
    cards: &[Card],
) -> Result<(), ActionError> {
    ensure_turn(state, player)?;
    if cards.is_empty() || cards.len() > MAX_BET_CARDS {
        return Err(ActionError::InvalidBetSize {
            size: cards.len(),
            max: MAX_BET_CARDS,
        });
    }
    let hand = &state.players[player];
    let mut seen = HashSet::with_capacity(cards.len());
    for card in cards {
        if !seen.insert(card.id) {
            return Err(ActionError::DuplicateCard);
        }
        if !hand.holds(card) {
            return Err(ActionError::CardNotInHand);
        }
    }
    Ok(())
}

/// Legal iff `player` is to act, wagers 1 to 4 cards, and holds every one
/// of them.
pub fn can_place_bet(state: &GameState, player: PlayerIndex, cards: &[Card]) -> bool {
    validate_bet(state, player, cards).is_ok()
}

pub fn validate_challenge(state: &GameState, player: PlayerIndex) -> Result<(), ActionError> {
    ensure_turn(state, player)?;
    match &state.last_bet {
        Some(bet) if bet.cards.is_empty() => Err(ActionError::NoActiveWager),
        Some(bet) if bet.bettor == player => Err(ActionError::CannotChallengeOwnWager),
        Some(_) => Ok(()),
        None => Err(ActionError::NoActiveWager),
    }
}

/// Legal iff `player` is to act and there is someone else's wager to
/// challenge.
pub fn can_challenge(state: &GameState, player: PlayerIndex) -> bool {
    validate_challenge(state, player).is_ok()
}

pub fn check_card(card: &Card, declared_rank: Rank) -> bool {
    card.rank == declared_rank
}

fn revealed_card(state: &GameState, card_index: usize) -> Result<(Card, Rank), ActionError> {
    let bet = state.last_bet.as_ref().ok_or(ActionError::NoActiveWager)?;
    let card = bet
        .cards
        .get(card_index)
        .ok_or(ActionError::RevealIndexOutOfRange {
            index: card_index,
            wager_size: bet.cards.len(),
        })?;
    Ok((*card, bet.declared_rank))
}

/// The challenger trusted the declaration. `true` when the inspected
/// card matches, meaning the pile goes to the discard.
pub fn resolve_believe(state: &GameState, card_index: usize) -> Result<bool, ActionError> {
    let (card, declared_rank) = revealed_card(state, card_index)?;
    Ok(check_card(&card, declared_rank))
}

/// The challenger accused the bettor. `true` when the inspected card does
/// not match, meaning the bettor takes the pile.
pub fn resolve_bluff(state: &GameState, card_index: usize) -> Result<bool, ActionError> {
    let (card, declared_rank) = revealed_card(state, card_index)?;
    Ok(!check_card(&card, declared_rank))
}

/// Validate a challenge and work out where the pile goes.
pub fn resolve_challenge(
    state: &GameState,
    challenger: PlayerIndex,
    mode: ChallengeMode,
    card_index: usize,
) -> Result<ChallengeResolution, ActionError> {
    validate_challenge(state, challenger)?;
    let (revealed, _) = revealed_card(state, card_index)?;
    let bettor = state
        .last_bet
        .as_ref()
        .map(|bet| bet.bettor)
        .ok_or(ActionError::NoActiveWager)?;

    let (outcome, pile_recipient) = match mode {
        ChallengeMode::Believe => {
            if resolve_believe(state, card_index)? {
                (ChallengeOutcome::TrustJustified, None)
            } else {
                (ChallengeOutcome::TrustMisplaced, Some(challenger))
            }
        }
        ChallengeMode::Bluff => {
            if resolve_bluff(state, card_index)? {
                (ChallengeOutcome::LiarCaught, Some(bettor))
            } else {
                (ChallengeOutcome::FalseAccusation, None)
            }
        }
    };

    Ok(ChallengeResolution {
        revealed,
        outcome,
        pile_recipient,
    })
}

/// Map hand positions to the cards at those positions, in selection
/// order.
pub fn cards_at_positions(hand: &[Card], positions: &[usize]) -> Result<Vec<Card>, ActionError> {
    if positions.is_empty() {
        return Err(ActionError::EmptySelection);
    }
    let mut seen = HashSet::with_capacity(positions.len());
    positions
        .iter()
        .map(|&position| {
            if !seen.insert(position) {
                return Err(ActionError::DuplicateCardPosition(position));
            }
            hand.get(position)
                .copied()
                .ok_or(ActionError::CardPositionOutOfRange {
                    position,
                    hand_size: hand.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Player, Suit};

    /// Player 0 holds K♠ K♥ 3♥ 9♣ 5♦, player 1 holds A♦ 2♣ Q♠; player 0 to
    /// act.
    fn game() -> GameState {
        let mut p0 = Player::new(10, "alice");
        p0.add_cards([
            Card::new(0, Suit::Spade, Rank::King),
            Card::new(1, Suit::Heart, Rank::King),
            Card::new(2, Suit::Heart, Rank::Three),
            Card::new(3, Suit::Club, Rank::Nine),
            Card::new(4, Suit::Diamond, Rank::Five),
        ]);
        let mut p1 = Player::new(11, "bob");
        p1.add_cards([
            Card::new(5, Suit::Diamond, Rank::Ace),
            Card::new(6, Suit::Club, Rank::Two),
            Card::new(7, Suit::Spade, Rank::Queen),
        ]);
        let mut state = GameState::new();
        state.start_game_at(vec![p0, p1], 0).unwrap();
        state
    }

    /// Player 0 wagers K♠ and 3♥ as kings; player 1 to act.
    fn game_with_wager() -> GameState {
        let mut state = game();
        let wager = vec![state.players[0].hand[0], state.players[0].hand[2]];
        state.place_bet(0, &wager, Rank::King);
        state.advance_turn();
        state
    }

    #[test]
    fn bet_requires_turn() {
        let state = game();
        let cards = vec![state.players[1].hand[0]];
        assert!(!can_place_bet(&state, 1, &cards));
        assert_eq!(validate_bet(&state, 1, &cards), Err(ActionError::NotYourTurn));
    }

    #[test]
    fn bet_size_bounds() {
        let state = game();
        let hand = state.players[0].hand.clone();
        assert!(!can_place_bet(&state, 0, &[]));
        for n in 1..=4 {
            assert!(can_place_bet(&state, 0, &hand[..n]), "{n} cards");
        }
        assert_eq!(
            validate_bet(&state, 0, &hand[..5]),
            Err(ActionError::InvalidBetSize { size: 5, max: 4 })
        );
    }

    #[test]
    fn bet_cards_must_be_held() {
        let state = game();
        let foreign = vec![state.players[1].hand[0]];
        assert_eq!(validate_bet(&state, 0, &foreign), Err(ActionError::CardNotInHand));

        // Same face as a held card, but a different physical card.
        let lookalike = vec![Card::new(40, Suit::Spade, Rank::King)];
        assert!(!can_place_bet(&state, 0, &lookalike));
    }

    #[test]
    fn bet_rejects_repeated_card() {
        let state = game();
        let card = state.players[0].hand[0];
        assert_eq!(validate_bet(&state, 0, &[card, card]), Err(ActionError::DuplicateCard));
    }

    #[test]
    fn challenge_requires_turn() {
        let state = game_with_wager();
        assert!(!can_challenge(&state, 0));
        assert!(can_challenge(&state, 1));
    }

    #[test]
    fn challenge_requires_wager() {
        let state = game();
        assert_eq!(validate_challenge(&state, 0), Err(ActionError::NoActiveWager));
    }

    #[test]
    fn cannot_challenge_own_wager() {
        let mut state = game_with_wager();
        state.current_turn = 0;
        assert_eq!(
            validate_challenge(&state, 0),
            Err(ActionError::CannotChallengeOwnWager)
        );
    }

    #[test]
    fn nothing_is_legal_after_game_over() {
        let mut state = game_with_wager();
        state.phase = GamePhase::GameOver;
        assert!(!can_challenge(&state, 1));
        assert!(!can_place_bet(&state, 1, &[state.players[1].hand[0]]));
    }

    #[test]
    fn check_card_compares_rank_only() {
        assert!(check_card(&Card::new(0, Suit::Club, Rank::Ten), Rank::Ten));
        assert!(!check_card(&Card::new(0, Suit::Club, Rank::Ten), Rank::Jack));
    }

    #[test]
    fn believe_and_bluff_are_complements() {
        let state = game_with_wager();
        for i in 0..2 {
            assert_eq!(
                resolve_believe(&state, i).unwrap(),
                !resolve_bluff(&state, i).unwrap()
            );
        }
        assert!(resolve_believe(&state, 0).unwrap());
        assert!(resolve_bluff(&state, 1).unwrap());
    }

    #[test]
    fn reveal_index_is_bounds_checked() {
        let state = game_with_wager();
        let err = ActionError::RevealIndexOutOfRange {
            index: 2,
            wager_size: 2,
        };
        assert_eq!(resolve_believe(&state, 2), Err(err.clone()));
        assert_eq!(resolve_challenge(&state, 1, ChallengeMode::Bluff, 2), Err(err));
    }

    #[test]
    fn believe_outcomes() {
        let state = game_with_wager();
        let ok = resolve_challenge(&state, 1, ChallengeMode::Believe, 0).unwrap();
        assert_eq!(ok.outcome, ChallengeOutcome::TrustJustified);
        assert_eq!(ok.pile_recipient, None);
        assert_eq!(ok.revealed.rank, Rank::King);

        let wrong = resolve_challenge(&state, 1, ChallengeMode::Believe, 1).unwrap();
        assert_eq!(wrong.outcome, ChallengeOutcome::TrustMisplaced);
        assert_eq!(wrong.pile_recipient, Some(1));
    }

    #[test]
    fn bluff_outcomes() {
        let state = game_with_wager();
        let caught = resolve_challenge(&state, 1, ChallengeMode::Bluff, 1).unwrap();
        assert_eq!(caught.outcome, ChallengeOutcome::LiarCaught);
        assert_eq!(caught.pile_recipient, Some(0));
        assert!(!caught.outcome.declaration_upheld());

        let wrong = resolve_challenge(&state, 1, ChallengeMode::Bluff, 0).unwrap();
        assert_eq!(wrong.outcome, ChallengeOutcome::FalseAccusation);
        assert_eq!(wrong.pile_recipient, None);
        assert!(wrong.outcome.declaration_upheld());
    }

    #[test]
    fn positions_map_to_cards() {
        let state = game();
        let hand = &state.players[0].hand;
        assert_eq!(cards_at_positions(hand, &[3, 0]).unwrap(), vec![hand[3], hand[0]]);
        assert_eq!(cards_at_positions(hand, &[]), Err(ActionError::EmptySelection));
        assert_eq!(
            cards_at_positions(hand, &[1, 1]),
            Err(ActionError::DuplicateCardPosition(1))
        );
        assert_eq!(
            cards_at_positions(hand, &[7]),
            Err(ActionError::CardPositionOutOfRange {
                position: 7,
                hand_size: 5
            })
        );
    }
}
