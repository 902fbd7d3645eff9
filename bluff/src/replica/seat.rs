use crate::{
    game::{
        ChallengeMode,
        entities::{ParticipantId, Rank},
    },
    session::{SessionClosed, SessionHandle, SessionResponse},
};

/// The only way a presentation layer talks back: one participant's
/// requests into the session.
#[derive(Clone, Debug)]
pub struct Seat {
    participant: ParticipantId,
    session: SessionHandle,
}

impl Seat {
    pub fn new(participant: ParticipantId, session: SessionHandle) -> Self {
        Self {
            participant,
            session,
        }
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Wager the cards at `card_positions` of the local hand.
    pub async fn place_bet(
        &self,
        card_positions: Vec<usize>,
        declared_rank: Rank,
    ) -> Result<SessionResponse, SessionClosed> {
        self.session
            .place_bet(self.participant, card_positions, declared_rank)
            .await
    }

    /// Reveal card `reveal_index` of the last wager, expecting it to match.
    pub async fn believe(&self, reveal_index: usize) -> Result<SessionResponse, SessionClosed> {
        self.session
            .challenge(self.participant, ChallengeMode::Believe, reveal_index)
            .await
    }

    /// Reveal card `reveal_index` of the last wager, expecting a lie.
    pub async fn bluff(&self, reveal_index: usize) -> Result<SessionResponse, SessionClosed> {
        self.session
            .challenge(self.participant, ChallengeMode::Bluff, reveal_index)
            .await
    }
}
