use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::protocol_version::ProtocolVersion;
use crate::{
    game::{
        ChallengeMode, ChallengeOutcome,
        entities::{Card, ParticipantId, PlayerIndex, PlayerName, Rank},
    },
    replica::{Applied, Mirror, ReplicaError, ReplicaState},
};

/// An action a participant asks the authority to perform.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionRequest {
    /// Join the session. The game starts once enough participants have
    /// registered.
    RegisterParticipant { name: PlayerName },
    /// Wager the cards at these hand positions, declaring `declared_rank`.
    PlaceBet {
        card_positions: Vec<usize>,
        declared_rank: Rank,
    },
    /// Inspect the card at `reveal_index` of the last wager.
    Challenge {
        mode: ChallengeMode,
        reveal_index: usize,
    },
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterParticipant { name } => write!(f, "registered as {name}"),
            Self::PlaceBet {
                card_positions,
                declared_rank,
            } => write!(f, "bet {}x {declared_rank}", card_positions.len()),
            Self::Challenge { mode, reveal_index } => {
                write!(f, "challenged ({mode}) on card {reveal_index}")
            }
        }
    }
}

/// A request tagged with the participant it comes from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientMessage {
    pub participant: ParticipantId,
    pub request: ActionRequest,
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "participant {} {}", self.participant, self.request)
    }
}

/// A participant was given a seat in the turn order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParticipantIndexAssigned {
    pub participant: ParticipantId,
    pub index: PlayerIndex,
}

/// Start-of-game snapshot, tailored per recipient: only the recipient's
/// own hand is sent as real cards.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InitialState {
    pub hand: Vec<Card>,
    /// Card count of every player, by player index.
    pub hand_counts: Vec<usize>,
    pub names: Vec<PlayerName>,
    pub starting_turn: PlayerIndex,
}

/// A wager was placed. Carries positions and sizes, never card identities.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BetPlaced {
    pub bettor: PlayerIndex,
    /// Positions in the bettor's hand before the wager, in wager order.
    pub card_positions: Vec<usize>,
    pub wager_size: usize,
    pub declared_rank: Rank,
    pub next_turn: PlayerIndex,
    pub game_over: bool,
    pub loser: Option<PlayerIndex>,
}

/// A challenge was resolved by revealing one card of the last wager.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChallengeResolved {
    pub challenger: PlayerIndex,
    pub mode: ChallengeMode,
    pub reveal_index: usize,
    pub revealed_card: Card,
    pub outcome: ChallengeOutcome,
    /// `None` when the pile went to the discard.
    pub pile_recipient: Option<PlayerIndex>,
    pub pile_size: usize,
    /// The cards the recipient now holds, in pile order. Only filled in
    /// on the copy sent to the pile recipient.
    pub received_cards: Vec<Card>,
    pub next_turn: PlayerIndex,
    pub game_over: bool,
    pub loser: Option<PlayerIndex>,
}

/// Every delta the authority broadcasts, one variant per kind.
#[enum_dispatch(Mirror)]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BroadcastEvent {
    ParticipantIndexAssigned(ParticipantIndexAssigned),
    InitialState(InitialState),
    BetPlaced(BetPlaced),
    ChallengeResolved(ChallengeResolved),
}

impl fmt::Display for BroadcastEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParticipantIndexAssigned(event) => write!(
                f,
                "participant {} seated at {}",
                event.participant, event.index
            ),
            Self::InitialState(event) => write!(
                f,
                "game started with {} players, player {} first",
                event.names.len(),
                event.starting_turn
            ),
            Self::BetPlaced(event) => write!(
                f,
                "player {} bet {}x {}",
                event.bettor, event.wager_size, event.declared_rank
            ),
            Self::ChallengeResolved(event) => write!(
                f,
                "player {} revealed {}: {}",
                event.challenger,
                event.revealed_card.to_string().trim(),
                event.outcome
            ),
        }
    }
}

/// A broadcast as delivered to one participant. `seq` counts up from 1
/// per recipient so deltas can be applied exactly once, in order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Envelope {
    pub version: ProtocolVersion,
    pub seq: u64,
    pub event: BroadcastEvent,
}

impl Envelope {
    pub fn new(seq: u64, event: BroadcastEvent) -> Self {
        Self {
            version: ProtocolVersion::current(),
            seq,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;

    #[test]
    fn test_action_request_display() {
        let bet = ActionRequest::PlaceBet {
            card_positions: vec![0, 3],
            declared_rank: Rank::King,
        };
        assert_eq!(bet.to_string(), "bet 2x K");

        let challenge = ActionRequest::Challenge {
            mode: ChallengeMode::Bluff,
            reveal_index: 1,
        };
        assert_eq!(challenge.to_string(), "challenged (bluff) on card 1");
    }

    #[test]
    fn test_client_message_display() {
        let msg = ClientMessage {
            participant: 7,
            request: ActionRequest::RegisterParticipant {
                name: PlayerName::new("alice"),
            },
        };
        assert_eq!(msg.to_string(), "participant 7 registered as alice");
    }

    #[test]
    fn test_broadcast_event_from_variant() {
        let event: BroadcastEvent = ParticipantIndexAssigned {
            participant: 3,
            index: 1,
        }
        .into();
        assert!(matches!(event, BroadcastEvent::ParticipantIndexAssigned(_)));
        assert_eq!(event.to_string(), "participant 3 seated at 1");
    }

    #[test]
    fn test_challenge_resolved_display() {
        let event = BroadcastEvent::ChallengeResolved(ChallengeResolved {
            challenger: 1,
            mode: ChallengeMode::Bluff,
            reveal_index: 0,
            revealed_card: Card::new(11, Suit::Club, Rank::King),
            outcome: ChallengeOutcome::FalseAccusation,
            pile_recipient: None,
            pile_size: 2,
            received_cards: vec![],
            next_turn: 0,
            game_over: false,
            loser: None,
        });
        assert_eq!(event.to_string(), "player 1 revealed K/♣: false accusation");
    }

    #[test]
    fn test_envelope_uses_current_version() {
        let envelope = Envelope::new(
            1,
            BroadcastEvent::ParticipantIndexAssigned(ParticipantIndexAssigned {
                participant: 1,
                index: 0,
            }),
        );
        assert_eq!(envelope.version, ProtocolVersion::current());
    }
}
