//! Canonical game state and its transitions.
//!
//! Only the session authority mutates a [`GameState`]. The transitions in
//! here trust their caller: legality is checked beforehand by
//! [`crate::game::rules`].

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

use super::{
    constants::MIN_PLAYERS,
    entities::{Card, Deck, Player, PlayerIndex, Rank},
    errors::ActionError,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum GamePhase {
    #[default]
    WaitingForPlayers,
    Playing,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "waiting for players",
            Self::Playing => "playing",
            Self::GameOver => "game over",
        };
        write!(f, "{repr}")
    }
}

/// The most recent wager, still awaiting a challenge.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LastBet {
    pub cards: Vec<Card>,
    pub declared_rank: Rank,
    pub bettor: PlayerIndex,
}

#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub phase: GamePhase,
    /// Turn order is fixed when the game starts.
    pub players: Vec<Player>,
    pub current_turn: PlayerIndex,
    /// Cards wagered and not yet resolved. The last wager is always the
    /// tail of the pile.
    pub pile: Vec<Card>,
    /// Cards permanently out of play.
    pub discard: Vec<Card>,
    pub last_bet: Option<LastBet>,
    pub loser: Option<PlayerIndex>,
    /// Number of cards the game started with, for conservation checks.
    pub deck_size: usize,
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the game with a uniformly random first player.
    pub fn start_game(&mut self, players: Vec<Player>) -> Result<(), ActionError> {
        self.start_game_with(players, &mut rand::rng())
    }

    pub fn start_game_with<R: Rng>(
        &mut self,
        players: Vec<Player>,
        rng: &mut R,
    ) -> Result<(), ActionError> {
        if players.len() < MIN_PLAYERS {
            return Err(ActionError::NotEnoughPlayers { min: MIN_PLAYERS });
        }
        let starting_turn = rng.random_range(0..players.len());
        self.start_game_at(players, starting_turn)
    }

    /// Start the game with a known first player.
    pub fn start_game_at(
        &mut self,
        players: Vec<Player>,
        starting_turn: PlayerIndex,
    ) -> Result<(), ActionError> {
        if self.phase != GamePhase::WaitingForPlayers {
            return Err(ActionError::GameAlreadyStarted);
        }
        if players.len() < MIN_PLAYERS {
            return Err(ActionError::NotEnoughPlayers { min: MIN_PLAYERS });
        }
        if starting_turn >= players.len() {
            return Err(ActionError::InvalidPlayerIndex(starting_turn));
        }
        self.deck_size = players.iter().map(Player::card_count).sum();
        self.players = players;
        self.current_turn = starting_turn;
        self.pile.clear();
        self.discard.clear();
        self.last_bet = None;
        self.loser = None;
        self.phase = GamePhase::Playing;
        Ok(())
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn]
    }

    pub fn last_bettor(&self) -> Option<&Player> {
        self.last_bet
            .as_ref()
            .and_then(|bet| self.players.get(bet.bettor))
    }

    pub fn loser(&self) -> Option<&Player> {
        self.loser.and_then(|idx| self.players.get(idx))
    }

    /// Move `cards` from the bettor's hand onto the pile and remember them
    /// as the wager to challenge.
    pub fn place_bet(&mut self, bettor: PlayerIndex, cards: &[Card], declared_rank: Rank) {
        let Some(player) = self.players.get_mut(bettor) else {
            return;
        };
        player.remove_cards(cards);
        self.pile.extend_from_slice(cards);
        self.last_bet = Some(LastBet {
            cards: cards.to_vec(),
            declared_rank,
            bettor,
        });
    }

    /// The declared rank was upheld: the whole pile leaves play.
    pub fn resolve_to_discard(&mut self) {
        self.discard.append(&mut self.pile);
        self.last_bet = None;
    }

    /// The pile is forfeit to `recipient`, appended to their hand in pile
    /// order.
    pub fn give_pile_to_player(&mut self, recipient: PlayerIndex) {
        let Some(player) = self.players.get_mut(recipient) else {
            return;
        };
        player.add_cards(self.pile.drain(..));
        self.last_bet = None;
    }

    pub fn advance_turn(&mut self) {
        if !self.players.is_empty() {
            self.current_turn = (self.current_turn + 1) % self.players.len();
        }
    }

    /// Advance the turn past players who have run out of cards. If nobody
    /// else holds cards the plain next seat is used.
    pub fn advance_to_next_holder(&mut self) {
        if self.players.is_empty() {
            return;
        }
        let start = self.current_turn;
        for _ in 0..self.players.len() {
            self.advance_turn();
            if self.current_player().has_cards() {
                return;
            }
        }
        self.current_turn = start;
        self.advance_turn();
    }

    /// A player stays in contention while they hold cards or while their
    /// wager is the one still open to challenge.
    pub fn in_contention(&self, idx: PlayerIndex) -> bool {
        let holds_cards = self.players.get(idx).is_some_and(Player::has_cards);
        let open_wager = self.last_bet.as_ref().is_some_and(|bet| bet.bettor == idx);
        holds_cards || open_wager
    }

    /// Holding the last cards loses. When exactly one player remains in
    /// contention, they become the loser and the game ends.
    pub fn check_for_winner(&mut self) -> Option<PlayerIndex> {
        if self.phase != GamePhase::Playing {
            return self.loser;
        }
        let mut contenders = (0..self.players.len()).filter(|&idx| self.in_contention(idx));
        if let (Some(last), None) = (contenders.next(), contenders.next()) {
            debug!("{} is the last player holding cards", self.players[last].name);
            self.loser = Some(last);
            self.phase = GamePhase::GameOver;
        }
        self.loser
    }

    /// Total cards across every hand, the pile and the discard.
    pub fn total_cards(&self) -> usize {
        self.players.iter().map(Player::card_count).sum::<usize>()
            + self.pile.len()
            + self.discard.len()
    }

    /// Whether the card count matches the starting deck and no card sits
    /// in two places at once.
    pub fn is_conserved(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.deck_size);
        let all_unique = self
            .players
            .iter()
            .flat_map(|p| p.hand.iter())
            .chain(self.pile.iter())
            .chain(self.discard.iter())
            .all(|card| seen.insert(card.id));
        all_unique && seen.len() == self.deck_size
    }
}

/// Deal the whole deck one card at a time, starting from the first
/// player. Hand sizes differ by at most one.
pub fn deal_round_robin(deck: &mut Deck, players: &mut [Player]) {
    if players.is_empty() {
        return;
    }
    let mut idx = 0;
    while let Some(card) = deck.deal() {
        players[idx % players.len()].add_card(card);
        idx += 1;
    }
}
