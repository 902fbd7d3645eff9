//! Partial-information copy of the game state and the deltas that move it.

use enum_dispatch::enum_dispatch;
use std::collections::HashMap;

use super::errors::ReplicaError;
use crate::{
    game::{
        ChallengeMode, ChallengeOutcome, GamePhase,
        entities::{Card, ParticipantId, PlayerIndex, PlayerName, Rank},
    },
    net::messages::{BetPlaced, ChallengeResolved, InitialState, ParticipantIndexAssigned},
};

/// A card as one participant sees it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CardSlot {
    Known(Card),
    /// Face down: only its position is known.
    Hidden,
}

impl CardSlot {
    pub fn card(&self) -> Option<Card> {
        match self {
            CardSlot::Known(card) => Some(*card),
            CardSlot::Hidden => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, CardSlot::Hidden)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MirroredPlayer {
    pub name: PlayerName,
    pub hand: Vec<CardSlot>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MirroredBet {
    pub bettor: PlayerIndex,
    pub size: usize,
    pub declared_rank: Rank,
}

/// The card shown by the latest challenge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reveal {
    pub challenger: PlayerIndex,
    pub mode: ChallengeMode,
    pub card: Card,
    pub outcome: ChallengeOutcome,
    pub pile_recipient: Option<PlayerIndex>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableMirror {
    pub players: Vec<MirroredPlayer>,
    pub pile: Vec<CardSlot>,
    pub discard_size: usize,
    pub last_bet: Option<MirroredBet>,
    pub phase: GamePhase,
    pub current_turn: PlayerIndex,
    pub loser: Option<PlayerIndex>,
    pub last_reveal: Option<Reveal>,
}

impl TableMirror {
    fn player_mut(&mut self, idx: PlayerIndex) -> Result<&mut MirroredPlayer, ReplicaError> {
        let count = self.players.len();
        self.players
            .get_mut(idx)
            .ok_or_else(|| ReplicaError::Desync(format!("player {idx} of {count}")))
    }

    fn check_turn(&self, idx: PlayerIndex) -> Result<(), ReplicaError> {
        if idx < self.players.len() {
            Ok(())
        } else {
            Err(ReplicaError::Desync(format!(
                "turn {idx} with {} players",
                self.players.len()
            )))
        }
    }

    fn finish(&mut self, next_turn: PlayerIndex, game_over: bool, loser: Option<PlayerIndex>) -> Applied {
        self.current_turn = next_turn;
        if game_over {
            self.phase = GamePhase::GameOver;
            self.loser = loser;
            if let Some(loser) = loser {
                return Applied::GameOver(loser);
            }
        }
        Applied::Refreshed
    }
}

/// Everything a participant knows about the session.
#[derive(Clone, Debug, Default)]
pub struct ReplicaState {
    pub participant: ParticipantId,
    pub local_index: Option<PlayerIndex>,
    /// Seats learned from `ParticipantIndexAssigned` broadcasts.
    pub directory: HashMap<ParticipantId, PlayerIndex>,
    pub table: Option<TableMirror>,
    pub last_seq: u64,
}

impl ReplicaState {
    pub fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            ..Self::default()
        }
    }

    fn table_mut(&mut self) -> Result<&mut TableMirror, ReplicaError> {
        self.table.as_mut().ok_or(ReplicaError::NotStarted)
    }
}

/// What applying an event changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Applied {
    /// Only the directory changed; nothing to show.
    Directory,
    /// Already applied; dropped.
    Stale,
    Refreshed,
    GameOver(PlayerIndex),
}

/// Apply one broadcast event to a replica.
#[enum_dispatch]
pub trait Mirror {
    fn apply(&self, state: &mut ReplicaState) -> Result<Applied, ReplicaError>;
}

impl Mirror for ParticipantIndexAssigned {
    fn apply(&self, state: &mut ReplicaState) -> Result<Applied, ReplicaError> {
        state.directory.insert(self.participant, self.index);
        Ok(Applied::Directory)
    }
}

impl Mirror for InitialState {
    fn apply(&self, state: &mut ReplicaState) -> Result<Applied, ReplicaError> {
        let local = state.local_index.ok_or(ReplicaError::IndexUnresolved {
            participant: state.participant,
        })?;
        if self.names.len() != self.hand_counts.len() {
            return Err(ReplicaError::Desync(format!(
                "{} names for {} hands",
                self.names.len(),
                self.hand_counts.len()
            )));
        }
        if self.hand_counts.get(local) != Some(&self.hand.len()) {
            return Err(ReplicaError::Desync(format!(
                "local hand of {} cards does not match seat {local}",
                self.hand.len()
            )));
        }

        let players = self
            .names
            .iter()
            .zip(&self.hand_counts)
            .enumerate()
            .map(|(idx, (name, &count))| MirroredPlayer {
                name: name.clone(),
                hand: if idx == local {
                    self.hand.iter().copied().map(CardSlot::Known).collect()
                } else {
                    vec![CardSlot::Hidden; count]
                },
            })
            .collect();

        let mut table = TableMirror {
            players,
            pile: Vec::new(),
            discard_size: 0,
            last_bet: None,
            phase: GamePhase::Playing,
            current_turn: 0,
            loser: None,
            last_reveal: None,
        };
        table.check_turn(self.starting_turn)?;
        table.current_turn = self.starting_turn;
        state.table = Some(table);
        Ok(Applied::Refreshed)
    }
}

impl Mirror for BetPlaced {
    fn apply(&self, state: &mut ReplicaState) -> Result<Applied, ReplicaError> {
        let table = state.table_mut()?;
        table.check_turn(self.next_turn)?;
        if self.wager_size != self.card_positions.len() {
            return Err(ReplicaError::Desync(format!(
                "wager of {} cards lists {} positions",
                self.wager_size,
                self.card_positions.len()
            )));
        }

        let bettor = table.player_mut(self.bettor)?;
        let hand_size = bettor.hand.len();
        if let Some(&position) = self.card_positions.iter().find(|&&p| p >= hand_size) {
            return Err(ReplicaError::Desync(format!(
                "position {position} in a hand of {hand_size}"
            )));
        }

        // Positions refer to the hand before the wager; pull from the back
        // so earlier positions stay valid.
        let wagered: Vec<CardSlot> = self.card_positions.iter().map(|&p| bettor.hand[p]).collect();
        let mut positions = self.card_positions.clone();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();
        if positions.len() != self.card_positions.len() {
            return Err(ReplicaError::Desync("repeated wager position".to_string()));
        }
        for position in positions {
            bettor.hand.remove(position);
        }

        table.pile.extend(wagered);
        table.last_bet = Some(MirroredBet {
            bettor: self.bettor,
            size: self.wager_size,
            declared_rank: self.declared_rank,
        });
        Ok(table.finish(self.next_turn, self.game_over, self.loser))
    }
}

impl Mirror for ChallengeResolved {
    fn apply(&self, state: &mut ReplicaState) -> Result<Applied, ReplicaError> {
        let local = state.local_index;
        let table = state.table_mut()?;
        table.check_turn(self.next_turn)?;
        if table.pile.len() != self.pile_size {
            return Err(ReplicaError::Desync(format!(
                "pile of {} cards, authority resolved {}",
                table.pile.len(),
                self.pile_size
            )));
        }

        match self.pile_recipient {
            Some(recipient) if Some(recipient) == local => {
                if self.received_cards.len() != self.pile_size {
                    return Err(ReplicaError::Desync(format!(
                        "received {} of {} pile cards",
                        self.received_cards.len(),
                        self.pile_size
                    )));
                }
                let player = table.player_mut(recipient)?;
                player
                    .hand
                    .extend(self.received_cards.iter().copied().map(CardSlot::Known));
            }
            Some(recipient) => {
                let pile_size = self.pile_size;
                let player = table.player_mut(recipient)?;
                player
                    .hand
                    .extend(std::iter::repeat_n(CardSlot::Hidden, pile_size));
            }
            None => table.discard_size += self.pile_size,
        }

        table.pile.clear();
        table.last_bet = None;
        table.last_reveal = Some(Reveal {
            challenger: self.challenger,
            mode: self.mode,
            card: self.revealed_card,
            outcome: self.outcome,
            pile_recipient: self.pile_recipient,
        });
        Ok(table.finish(self.next_turn, self.game_over, self.loser))
    }
}
