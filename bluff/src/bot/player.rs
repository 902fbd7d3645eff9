//! A bot seated at a session: replica in, seat out.

use thiserror::Error;
use tokio::sync::mpsc;

use super::{
    decision::{BotAction, BotDecisionMaker},
    models::{BotConfig, BotStats, TemperamentParams},
};
use crate::{
    game::entities::ParticipantId,
    net::messages::Envelope,
    replica::{Applied, Replica, ReplicaError, Seat, TableView, ViewRecorder},
    session::{SessionClosed, SessionHandle, SessionResponse},
};

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Replica(#[from] ReplicaError),
    #[error(transparent)]
    Session(#[from] SessionClosed),
    #[error("bot task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// How a bot's game ended.
#[derive(Debug, Clone)]
pub struct BotOutcome {
    pub participant: ParticipantId,
    /// Name of the loser, if the game finished
    pub loser: Option<String>,
    /// Whether this bot was the one left holding cards
    pub lost: bool,
    pub stats: BotStats,
}

/// Bot player state
pub struct BotPlayer {
    pub config: BotConfig,
    pub stats: BotStats,
    replica: Replica,
    seat: Seat,
    decision: BotDecisionMaker,
    recorder: ViewRecorder,
}

impl BotPlayer {
    /// Register with the session. Returns the bot and the broadcast stream
    /// to hand to [`BotPlayer::play`].
    pub async fn join(
        session: &SessionHandle,
        config: BotConfig,
    ) -> Result<(Self, mpsc::Receiver<Envelope>), SessionClosed> {
        let registration = session.register(config.participant, config.name.clone()).await?;
        let (replica, events) = Replica::from_registration(registration, session.index_wait());

        let params = TemperamentParams::from_temperament(config.temperament);
        let decision = match config.seed {
            Some(seed) => BotDecisionMaker::with_seed(params, seed),
            None => BotDecisionMaker::new(params),
        };

        let bot = Self {
            seat: Seat::new(config.participant, session.clone()),
            config,
            stats: BotStats::default(),
            replica,
            decision,
            recorder: ViewRecorder::default(),
        };
        Ok((bot, events))
    }

    /// Play until the game ends or the session goes away.
    pub async fn play(mut self, mut events: mpsc::Receiver<Envelope>) -> Result<BotOutcome, BotError> {
        while let Some(envelope) = events.recv().await {
            match self.replica.receive(envelope, &mut self.recorder).await {
                Ok(Applied::GameOver(loser)) => {
                    let lost = self.replica.local_index() == Some(loser);
                    log::info!(
                        "{}: game over, {} lost",
                        self.config.name,
                        self.recorder.game_over.as_deref().unwrap_or("nobody")
                    );
                    return Ok(self.outcome(lost));
                }
                Ok(Applied::Refreshed) => {
                    if let Some(view) = self.replica.view() {
                        self.act(&view).await?;
                    }
                }
                Ok(Applied::Directory | Applied::Stale) => {}
                // Already logged; the next broadcast may still resolve it.
                Err(ReplicaError::IndexUnresolved { .. }) => {}
                Err(error) => return Err(error.into()),
            }
        }
        Ok(self.outcome(false))
    }

    fn outcome(self, lost: bool) -> BotOutcome {
        BotOutcome {
            participant: self.config.participant,
            loser: self.recorder.game_over,
            lost,
            stats: self.stats,
        }
    }

    async fn act(&mut self, view: &TableView) -> Result<(), SessionClosed> {
        let Some(action) = self.decision.decide(view) else {
            return Ok(());
        };

        if self.config.paced {
            tokio::time::sleep(self.decision.think_delay()).await;
        }

        let SessionResponse::Rejected(error) = self.submit(view, &action).await? else {
            return Ok(());
        };
        self.stats.rejected += 1;
        log::warn!("{}: {action:?} refused: {error}", self.config.name);

        for retry in BotDecisionMaker::retries(&action, view) {
            let SessionResponse::Rejected(error) = self.submit(view, &retry).await? else {
                return Ok(());
            };
            self.stats.rejected += 1;
            log::warn!("{}: {retry:?} refused: {error}", self.config.name);
        }
        log::warn!("{}: no action accepted this turn", self.config.name);
        Ok(())
    }

    async fn submit(
        &mut self,
        view: &TableView,
        action: &BotAction,
    ) -> Result<SessionResponse, SessionClosed> {
        log::debug!("{}: {action:?}", self.config.name);
        let response = match action {
            BotAction::PlaceBet {
                card_positions,
                declared_rank,
            } => {
                let response = self
                    .seat
                    .place_bet(card_positions.clone(), *declared_rank)
                    .await?;
                if response.is_success() {
                    self.stats.bets_placed += 1;
                    let lie = card_positions
                        .iter()
                        .filter_map(|&position| view.hand.get(position))
                        .any(|card| card.rank != *declared_rank);
                    if lie {
                        self.stats.lies_told += 1;
                    }
                }
                response
            }
            BotAction::Believe(reveal_index) => {
                let response = self.seat.believe(*reveal_index).await?;
                if response.is_success() {
                    self.stats.believes += 1;
                }
                response
            }
            BotAction::Bluff(reveal_index) => {
                let response = self.seat.bluff(*reveal_index).await?;
                if response.is_success() {
                    self.stats.bluffs_called += 1;
                }
                response
            }
        };
        Ok(response)
    }
}
