//! Applies an ordered stream of envelopes to a local mirror.

use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};

use super::{
    errors::ReplicaError,
    mirror::{Applied, Mirror, ReplicaState},
    view::{Presentation, TableView},
};
use crate::{
    game::entities::{ParticipantId, PlayerIndex},
    net::{
        messages::{BroadcastEvent, Envelope},
        protocol_version::ProtocolVersion,
    },
    session::{IndexPromise, Registration, SessionResponse},
};

/// One participant's partial-information copy of the game.
#[derive(Debug)]
pub struct Replica {
    state: ReplicaState,
    index_promise: Option<IndexPromise>,
    index_wait: Duration,
}

impl Replica {
    pub fn new(participant: ParticipantId, index_promise: IndexPromise, index_wait: Duration) -> Self {
        Self {
            state: ReplicaState::new(participant),
            index_promise: Some(index_promise),
            index_wait,
        }
    }

    /// Split a registration into a replica and the stream that feeds it.
    pub fn from_registration(
        registration: Registration,
        index_wait: Duration,
    ) -> (Self, mpsc::Receiver<Envelope>) {
        let Registration {
            participant,
            events,
            index,
        } = registration;
        (Self::new(participant, index, index_wait), events)
    }

    pub fn participant(&self) -> ParticipantId {
        self.state.participant
    }

    pub fn local_index(&self) -> Option<PlayerIndex> {
        self.state.local_index
    }

    pub fn state(&self) -> &ReplicaState {
        &self.state
    }

    pub fn view(&self) -> Option<TableView> {
        let local = self.state.local_index?;
        TableView::from_mirror(self.state.table.as_ref()?, local)
    }

    /// Wait a bounded time for the registration answer, then fall back to
    /// the seats seen in `ParticipantIndexAssigned` broadcasts.
    async fn resolve_index(&mut self) -> Result<PlayerIndex, ReplicaError> {
        if let Some(index) = self.state.local_index {
            return Ok(index);
        }
        let participant = self.state.participant;

        if let Some(promise) = self.index_promise.take() {
            match timeout(self.index_wait, promise).await {
                Ok(Ok(SessionResponse::Registered { index })) => {
                    self.state.local_index = Some(index);
                    return Ok(index);
                }
                Ok(Ok(response)) => {
                    log::warn!("Participant {participant}: registration answered {response:?}");
                }
                Ok(Err(_)) => {
                    log::warn!("Participant {participant}: registration answer was dropped");
                }
                Err(_) => {
                    log::warn!(
                        "Participant {participant}: no registration answer after {:?}, checking directory",
                        self.index_wait
                    );
                }
            }
        }

        match self.state.directory.get(&participant) {
            Some(&index) => {
                self.state.local_index = Some(index);
                Ok(index)
            }
            None => {
                log::error!("Participant {participant}: seat index unresolved, dropping broadcast");
                Err(ReplicaError::IndexUnresolved { participant })
            }
        }
    }

    /// Apply one envelope and tell the presentation about it. Envelopes
    /// already applied are ignored; a skipped sequence number is an error.
    pub async fn receive<P>(
        &mut self,
        envelope: Envelope,
        presentation: &mut P,
    ) -> Result<Applied, ReplicaError>
    where
        P: Presentation + ?Sized,
    {
        if !ProtocolVersion::current().is_compatible_with(&envelope.version) {
            return Err(ReplicaError::IncompatibleVersion(envelope.version));
        }

        let expected = self.state.last_seq + 1;
        if envelope.seq < expected {
            log::debug!(
                "Participant {}: ignoring replayed broadcast {}",
                self.state.participant,
                envelope.seq
            );
            return Ok(Applied::Stale);
        }
        if envelope.seq > expected {
            return Err(ReplicaError::SequenceGap {
                expected,
                received: envelope.seq,
            });
        }
        self.state.last_seq = envelope.seq;

        if matches!(envelope.event, BroadcastEvent::InitialState(_)) {
            self.resolve_index().await?;
        }

        let applied = envelope.event.apply(&mut self.state)?;
        match applied {
            Applied::Refreshed => {
                if let Some(view) = self.view() {
                    presentation.refresh(&view);
                }
            }
            Applied::GameOver(loser) => {
                if let Some(view) = self.view() {
                    presentation.refresh(&view);
                    let name = view
                        .name_of(loser)
                        .map(|name| name.to_string())
                        .unwrap_or_default();
                    presentation.notify_game_over(&name);
                }
            }
            Applied::Directory | Applied::Stale => {}
        }
        Ok(applied)
    }

    /// Drain `events` until the game ends or the stream closes. Unresolved
    /// indexes drop only the affected broadcast.
    pub async fn run<P>(
        &mut self,
        events: &mut mpsc::Receiver<Envelope>,
        presentation: &mut P,
    ) -> Result<Option<PlayerIndex>, ReplicaError>
    where
        P: Presentation + ?Sized,
    {
        while let Some(envelope) = events.recv().await {
            match self.receive(envelope, presentation).await {
                Ok(Applied::GameOver(loser)) => return Ok(Some(loser)),
                Ok(_) | Err(ReplicaError::IndexUnresolved { .. }) => {}
                Err(error) => {
                    log::error!("Participant {}: {error}", self.state.participant);
                    return Err(error);
                }
            }
        }
        Ok(None)
    }
}
