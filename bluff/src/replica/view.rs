//! What a participant is shown, and the trait that shows it.

use std::fmt;

use super::mirror::{Reveal, TableMirror};
use crate::game::{
    GamePhase,
    entities::{Card, PlayerIndex, PlayerName, Rank},
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpponentView {
    pub index: PlayerIndex,
    pub name: PlayerName,
    pub card_count: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WagerView {
    pub bettor: PlayerIndex,
    pub bettor_name: PlayerName,
    pub size: usize,
    pub declared_rank: Rank,
}

impl fmt::Display for WagerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.size == 1 { "" } else { "s" };
        write!(
            f,
            "{} claims {} card{plural} of rank {}",
            self.bettor_name, self.size, self.declared_rank
        )
    }
}

/// Read-only snapshot handed to the presentation layer after every
/// state-changing broadcast.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableView {
    pub local_index: PlayerIndex,
    pub local_name: PlayerName,
    pub hand: Vec<Card>,
    pub opponents: Vec<OpponentView>,
    pub current_turn: PlayerIndex,
    pub is_local_turn: bool,
    pub can_challenge: bool,
    pub active_wager: Option<WagerView>,
    pub pile_size: usize,
    pub discard_size: usize,
    pub phase: GamePhase,
    pub loser: Option<PlayerIndex>,
    pub last_reveal: Option<Reveal>,
}

impl TableView {
    pub fn from_mirror(table: &TableMirror, local_index: PlayerIndex) -> Option<Self> {
        let local = table.players.get(local_index)?;
        let opponents = table
            .players
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != local_index)
            .map(|(index, player)| OpponentView {
                index,
                name: player.name.clone(),
                card_count: player.hand.len(),
            })
            .collect();
        let active_wager = table.last_bet.and_then(|bet| {
            Some(WagerView {
                bettor: bet.bettor,
                bettor_name: table.players.get(bet.bettor)?.name.clone(),
                size: bet.size,
                declared_rank: bet.declared_rank,
            })
        });

        let is_local_turn = table.phase == GamePhase::Playing && table.current_turn == local_index;
        let can_challenge = is_local_turn
            && active_wager
                .as_ref()
                .is_some_and(|wager| wager.bettor != local_index);

        Some(Self {
            local_index,
            local_name: local.name.clone(),
            hand: local.hand.iter().filter_map(|slot| slot.card()).collect(),
            opponents,
            current_turn: table.current_turn,
            is_local_turn,
            can_challenge,
            active_wager,
            pile_size: table.pile.len(),
            discard_size: table.discard_size,
            phase: table.phase,
            loser: table.loser,
            last_reveal: table.last_reveal,
        })
    }

    /// Name of the player at `index`, local or not.
    pub fn name_of(&self, index: PlayerIndex) -> Option<&PlayerName> {
        if index == self.local_index {
            return Some(&self.local_name);
        }
        self.opponents
            .iter()
            .find(|opponent| opponent.index == index)
            .map(|opponent| &opponent.name)
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hand = self
            .hand
            .iter()
            .map(|card| card.to_string().trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{} [{hand}]", self.local_name)?;
        for opponent in &self.opponents {
            write!(f, ", {}: {}", opponent.name, opponent.card_count)?;
        }
        write!(f, ", pile {}, discard {}", self.pile_size, self.discard_size)?;
        if let Some(wager) = &self.active_wager {
            write!(f, ", {wager}")?;
        }
        Ok(())
    }
}

/// The presentation layer: gets told, never asked.
pub trait Presentation {
    fn refresh(&mut self, view: &TableView);

    fn notify_game_over(&mut self, loser_name: &str);
}

/// Keeps the latest view. Used by bots and tests.
#[derive(Clone, Debug, Default)]
pub struct ViewRecorder {
    pub latest: Option<TableView>,
    pub refreshes: usize,
    pub game_over: Option<String>,
}

impl Presentation for ViewRecorder {
    fn refresh(&mut self, view: &TableView) {
        self.latest = Some(view.clone());
        self.refreshes += 1;
    }

    fn notify_game_over(&mut self, loser_name: &str) {
        self.game_over = Some(loser_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;
    use crate::replica::mirror::{CardSlot, MirroredBet, MirroredPlayer};

    fn table() -> TableMirror {
        TableMirror {
            players: vec![
                MirroredPlayer {
                    name: PlayerName::new("alice"),
                    hand: vec![CardSlot::Hidden; 4],
                },
                MirroredPlayer {
                    name: PlayerName::new("bob"),
                    hand: vec![
                        CardSlot::Known(Card::new(7, Suit::Club, Rank::Nine)),
                        CardSlot::Known(Card::new(20, Suit::Diamond, Rank::Eight)),
                    ],
                },
                MirroredPlayer {
                    name: PlayerName::new("carol"),
                    hand: vec![CardSlot::Hidden; 3],
                },
            ],
            pile: vec![CardSlot::Hidden; 2],
            discard_size: 5,
            last_bet: Some(MirroredBet {
                bettor: 0,
                size: 2,
                declared_rank: Rank::Queen,
            }),
            phase: GamePhase::Playing,
            current_turn: 1,
            loser: None,
            last_reveal: None,
        }
    }

    #[test]
    fn test_view_of_local_turn() {
        let view = TableView::from_mirror(&table(), 1).unwrap();
        assert_eq!(view.hand.len(), 2);
        assert!(view.is_local_turn);
        assert!(view.can_challenge);
        assert_eq!(view.opponents.len(), 2);
        assert_eq!(view.opponents[0].card_count, 4);
        assert_eq!(view.opponents[1].index, 2);
        assert_eq!(view.pile_size, 2);
        assert_eq!(view.discard_size, 5);
        assert_eq!(
            view.active_wager.as_ref().map(ToString::to_string),
            Some("alice claims 2 cards of rank Q".to_string())
        );
    }

    #[test]
    fn test_view_of_waiting_player() {
        let view = TableView::from_mirror(&table(), 2).unwrap();
        assert!(!view.is_local_turn);
        assert!(!view.can_challenge);
        assert!(view.hand.is_empty());
        assert_eq!(view.name_of(1).map(PlayerName::as_str), Some("bob"));
        assert_eq!(view.name_of(2).map(PlayerName::as_str), Some("carol"));
    }

    #[test]
    fn test_bettor_cannot_challenge_own_wager() {
        let mut table = table();
        table.current_turn = 0;
        let view = TableView::from_mirror(&table, 0).unwrap();
        assert!(view.is_local_turn);
        assert!(!view.can_challenge);
    }

    #[test]
    fn test_no_turn_after_game_over() {
        let mut table = table();
        table.phase = GamePhase::GameOver;
        table.loser = Some(1);
        let view = TableView::from_mirror(&table, 1).unwrap();
        assert!(!view.is_local_turn);
        assert_eq!(view.loser, Some(1));
    }

    #[test]
    fn test_unknown_seat_has_no_view() {
        assert!(TableView::from_mirror(&table(), 3).is_none());
    }
}
