//! Session authority actor with async message handling.

use super::{
    config::SessionConfig,
    messages::{SessionClosed, SessionMessage, SessionResponse},
};
use crate::{
    game::{
        ActionError, ChallengeMode, Deck, GamePhase, GameState, deal_round_robin,
        entities::{Card, ParticipantId, Player, PlayerIndex, PlayerName, Rank},
        rules,
    },
    net::messages::{
        ActionRequest, BetPlaced, BroadcastEvent, ChallengeResolved, ClientMessage, Envelope,
        InitialState, ParticipantIndexAssigned,
    },
};
use rand::{SeedableRng, rngs::StdRng};
use std::{collections::HashMap, time::Duration};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};

/// Resolves to the registration answer, carrying the assigned index.
pub type IndexPromise = oneshot::Receiver<SessionResponse>;

/// Everything a participant gets back from registering.
#[derive(Debug)]
pub struct Registration {
    pub participant: ParticipantId,
    /// Broadcasts addressed to this participant, in sequence order.
    pub events: mpsc::Receiver<Envelope>,
    /// Answered once the authority has processed the registration.
    pub index: IndexPromise,
}

/// Session handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    channel_capacity: usize,
    index_wait: Duration,
}

impl SessionHandle {
    fn new(sender: mpsc::Sender<SessionMessage>, config: &SessionConfig) -> Self {
        Self {
            sender,
            channel_capacity: config.channel_capacity,
            index_wait: config.index_wait(),
        }
    }

    /// How long replicas of this session wait for their index.
    pub fn index_wait(&self) -> Duration {
        self.index_wait
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> Result<(), SessionClosed> {
        self.sender.send(message).await.map_err(|_| SessionClosed)
    }

    /// Submit a request and wait for the authority's answer.
    pub async fn submit(&self, message: ClientMessage) -> Result<SessionResponse, SessionClosed> {
        let (response, answer) = oneshot::channel();
        self.send(SessionMessage::Action { message, response }).await?;
        answer.await.map_err(|_| SessionClosed)
    }

    /// Subscribe `participant` and ask for a seat. Does not wait for the
    /// answer: it arrives on [`Registration::index`].
    pub async fn register(
        &self,
        participant: ParticipantId,
        name: impl Into<PlayerName>,
    ) -> Result<Registration, SessionClosed> {
        let (sender, events) = mpsc::channel(self.channel_capacity);
        self.send(SessionMessage::Subscribe {
            participant,
            sender,
        })
        .await?;

        let (response, index) = oneshot::channel();
        let message = ClientMessage {
            participant,
            request: ActionRequest::RegisterParticipant { name: name.into() },
        };
        self.send(SessionMessage::Action { message, response })
            .await?;

        Ok(Registration {
            participant,
            events,
            index,
        })
    }

    pub async fn place_bet(
        &self,
        participant: ParticipantId,
        card_positions: Vec<usize>,
        declared_rank: Rank,
    ) -> Result<SessionResponse, SessionClosed> {
        self.submit(ClientMessage {
            participant,
            request: ActionRequest::PlaceBet {
                card_positions,
                declared_rank,
            },
        })
        .await
    }

    pub async fn challenge(
        &self,
        participant: ParticipantId,
        mode: ChallengeMode,
        reveal_index: usize,
    ) -> Result<SessionResponse, SessionClosed> {
        self.submit(ClientMessage {
            participant,
            request: ActionRequest::Challenge { mode, reveal_index },
        })
        .await
    }

    /// Stop broadcasts to `participant`. Their seat is kept.
    pub async fn unsubscribe(&self, participant: ParticipantId) -> Result<(), SessionClosed> {
        self.send(SessionMessage::Unsubscribe { participant }).await
    }

    /// Clone of the canonical state.
    pub async fn snapshot(&self) -> Result<GameState, SessionClosed> {
        let (response, answer) = oneshot::channel();
        self.send(SessionMessage::GetState { response }).await?;
        answer.await.map_err(|_| SessionClosed)
    }

    pub async fn close(&self) -> Result<(), SessionClosed> {
        let (response, answer) = oneshot::channel();
        self.send(SessionMessage::Close { response }).await?;
        answer.await.map(|_| ()).map_err(|_| SessionClosed)
    }
}

/// Broadcast route to one participant.
#[derive(Debug)]
struct Subscriber {
    sender: mpsc::Sender<Envelope>,
    next_seq: u64,
}

/// Single writer for one game: validates requests, mutates the
/// canonical state and rebroadcasts the result.
pub struct SessionAuthority {
    config: SessionConfig,

    /// Canonical game state
    state: GameState,

    /// Registered participants, in seat order, until the game starts
    roster: Vec<Player>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    subscribers: HashMap<ParticipantId, Subscriber>,

    rng: StdRng,

    is_closed: bool,
}

impl SessionAuthority {
    /// Create a new session authority
    ///
    /// # Returns
    ///
    /// * `(SessionAuthority, SessionHandle)` - Actor and handle for sending messages
    pub fn new(config: SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.channel_capacity.max(1));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let handle = SessionHandle::new(sender, &config);

        let actor = Self {
            config,
            state: GameState::new(),
            roster: Vec::new(),
            inbox,
            subscribers: HashMap::new(),
            rng,
            is_closed: false,
        };

        (actor, handle)
    }

    /// Run the session event loop until closed or every handle is dropped
    pub async fn run(mut self) {
        log::info!("Session '{}' starting", self.config.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.is_closed {
                break;
            }
        }

        log::info!("Session '{}' closed", self.config.name);
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Subscribe {
                participant,
                sender,
            } => {
                if self.subscribers.contains_key(&participant) {
                    log::warn!(
                        "Participant {} is already subscribed to session '{}'",
                        participant,
                        self.config.name
                    );
                    return;
                }
                self.subscribers.insert(
                    participant,
                    Subscriber {
                        sender,
                        next_seq: 1,
                    },
                );
                log::debug!(
                    "Participant {} subscribed to session '{}'",
                    participant,
                    self.config.name
                );
            }

            SessionMessage::Unsubscribe { participant } => {
                self.subscribers.remove(&participant);
                log::debug!(
                    "Participant {} unsubscribed from session '{}'",
                    participant,
                    self.config.name
                );
            }

            SessionMessage::Action { message, response } => {
                let result = self.handle_action(message).await;
                let _ = response.send(result);
            }

            SessionMessage::GetState { response } => {
                let _ = response.send(self.state.clone());
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                self.subscribers.clear();
                let _ = response.send(SessionResponse::Accepted);
            }
        }
    }

    async fn handle_action(&mut self, message: ClientMessage) -> SessionResponse {
        let ClientMessage {
            participant,
            request,
        } = message;
        log::debug!("Session '{}': participant {participant} {request}", self.config.name);

        let result = match request {
            ActionRequest::RegisterParticipant { name } => {
                self.handle_register(participant, name).await
            }
            ActionRequest::PlaceBet {
                card_positions,
                declared_rank,
            } => {
                self.handle_place_bet(participant, card_positions, declared_rank)
                    .await
            }
            ActionRequest::Challenge { mode, reveal_index } => {
                self.handle_challenge(participant, mode, reveal_index)
                    .await
            }
        };

        match result {
            Ok(response) => response,
            Err(ActionError::UnknownParticipant) => {
                log::debug!(
                    "Session '{}': ignoring request from unknown participant {participant}",
                    self.config.name
                );
                SessionResponse::Rejected(ActionError::UnknownParticipant)
            }
            Err(error) => {
                log::warn!(
                    "Session '{}': rejected participant {participant}: {error}",
                    self.config.name
                );
                SessionResponse::Rejected(error)
            }
        }
    }

    async fn handle_register(
        &mut self,
        participant: ParticipantId,
        name: PlayerName,
    ) -> Result<SessionResponse, ActionError> {
        let rejection = if self.roster.iter().any(|p| p.id == participant) {
            Some(ActionError::AlreadyRegistered)
        } else if self.state.phase != GamePhase::WaitingForPlayers {
            Some(ActionError::GameAlreadyStarted)
        } else if self.roster.len() >= self.config.max_players {
            Some(ActionError::SessionFull)
        } else {
            None
        };
        if let Some(error) = rejection {
            // Seated participants keep their route; anyone else never got a seat.
            if error != ActionError::AlreadyRegistered {
                self.subscribers.remove(&participant);
            }
            return Err(error);
        }

        let index = self.roster.len();
        log::info!(
            "Session '{}': {name} (participant {participant}) seated at {index}",
            self.config.name
        );
        self.roster.push(Player::new(participant, name));
        self.broadcast(ParticipantIndexAssigned { participant, index }.into());

        if self.roster.len() >= self.config.min_players {
            self.start_game().await?;
        }

        Ok(SessionResponse::Registered { index })
    }

    async fn start_game(&mut self) -> Result<(), ActionError> {
        let kind = self.config.deck.kind_for(self.roster.len());
        let mut deck = Deck::new(kind);
        deck.shuffle_with(&mut self.rng);

        let mut players = self.roster.clone();
        deal_round_robin(&mut deck, &mut players);
        self.state.start_game_with(players, &mut self.rng)?;

        log::info!(
            "Session '{}': game started with {} players on a {kind} deck, {} to act",
            self.config.name,
            self.state.players.len(),
            self.state.current_player().name
        );

        let hand_counts: Vec<usize> = self.state.players.iter().map(Player::card_count).collect();
        let names: Vec<PlayerName> = self.state.players.iter().map(|p| p.name.clone()).collect();
        let starting_turn = self.state.current_turn;
        let hands: HashMap<ParticipantId, Vec<Card>> = self
            .state
            .players
            .iter()
            .map(|p| (p.id, p.hand.clone()))
            .collect();

        self.broadcast_with(|participant| {
            let hand = hands.get(&participant)?.clone();
            Some(
                InitialState {
                    hand,
                    hand_counts: hand_counts.clone(),
                    names: names.clone(),
                    starting_turn,
                }
                .into(),
            )
        });
        Ok(())
    }

    /// Seat index of a registered participant, once the game is running.
    fn seat_of(&self, participant: ParticipantId) -> Result<PlayerIndex, ActionError> {
        let seated = self
            .state
            .players
            .iter()
            .position(|p| p.id == participant);
        match seated {
            Some(index) => Ok(index),
            None if self.roster.iter().any(|p| p.id == participant) => {
                Err(ActionError::GameNotInProgress)
            }
            None => Err(ActionError::UnknownParticipant),
        }
    }

    async fn handle_place_bet(
        &mut self,
        participant: ParticipantId,
        card_positions: Vec<usize>,
        declared_rank: Rank,
    ) -> Result<SessionResponse, ActionError> {
        let bettor = self.seat_of(participant)?;
        rules::ensure_turn(&self.state, bettor)?;
        let cards = rules::cards_at_positions(&self.state.players[bettor].hand, &card_positions)?;
        rules::validate_bet(&self.state, bettor, &cards)?;

        self.state.place_bet(bettor, &cards, declared_rank);
        let loser = self.finish_turn();
        log::info!(
            "Session '{}': {} bet {}x {declared_rank}",
            self.config.name,
            self.state.players[bettor].name,
            cards.len()
        );

        let event = BetPlaced {
            bettor,
            wager_size: cards.len(),
            card_positions,
            declared_rank,
            next_turn: self.state.current_turn,
            game_over: self.state.phase == GamePhase::GameOver,
            loser,
        };
        self.broadcast(event.into());
        Ok(SessionResponse::Accepted)
    }

    async fn handle_challenge(
        &mut self,
        participant: ParticipantId,
        mode: ChallengeMode,
        reveal_index: usize,
    ) -> Result<SessionResponse, ActionError> {
        let challenger = self.seat_of(participant)?;
        let resolution = rules::resolve_challenge(&self.state, challenger, mode, reveal_index)?;
        let bettor = self
            .state
            .last_bettor()
            .map(|player| player.name.to_string())
            .unwrap_or_default();

        let pile = self.state.pile.clone();
        match resolution.pile_recipient {
            Some(recipient) => self.state.give_pile_to_player(recipient),
            None => self.state.resolve_to_discard(),
        }
        let loser = self.finish_turn();
        log::info!(
            "Session '{}': {} challenged {bettor} ({mode}), revealed {}: {}",
            self.config.name,
            self.state.players[challenger].name,
            resolution.revealed.to_string().trim(),
            resolution.outcome
        );
        debug_assert!(self.state.is_conserved());

        let recipient_id = resolution
            .pile_recipient
            .map(|recipient| self.state.players[recipient].id);
        let event = ChallengeResolved {
            challenger,
            mode,
            reveal_index,
            revealed_card: resolution.revealed,
            outcome: resolution.outcome,
            pile_recipient: resolution.pile_recipient,
            pile_size: pile.len(),
            received_cards: Vec::new(),
            next_turn: self.state.current_turn,
            game_over: self.state.phase == GamePhase::GameOver,
            loser,
        };
        self.broadcast_with(|participant| {
            let mut event = event.clone();
            if recipient_id == Some(participant) {
                event.received_cards = pile.clone();
            }
            Some(event.into())
        });
        Ok(SessionResponse::Accepted)
    }

    /// Check for the end of the game, then pass the turn to the next
    /// player still holding cards.
    fn finish_turn(&mut self) -> Option<PlayerIndex> {
        let loser = self.state.check_for_winner();
        match loser {
            Some(idx) => log::info!(
                "Session '{}': game over, {} holds the last cards",
                self.config.name,
                self.state.players[idx].name
            ),
            None => self.state.advance_to_next_holder(),
        }
        loser
    }

    fn broadcast(&mut self, event: BroadcastEvent) {
        self.broadcast_with(|_| Some(event.clone()));
    }

    /// Send each subscriber its own copy of an event without waiting.
    /// Subscribers whose receiver is gone or whose channel is full are
    /// dropped; their seats are kept.
    fn broadcast_with<F>(&mut self, mut event_for: F)
    where
        F: FnMut(ParticipantId) -> Option<BroadcastEvent>,
    {
        let mut dropped = Vec::new();
        for (&participant, subscriber) in self.subscribers.iter_mut() {
            let Some(event) = event_for(participant) else {
                continue;
            };
            let envelope = Envelope::new(subscriber.next_seq, event);
            match subscriber.sender.try_send(envelope) {
                Ok(()) => subscriber.next_seq += 1,
                Err(TrySendError::Full(_)) => {
                    log::warn!(
                        "Session '{}': participant {participant} is not keeping up, removing",
                        self.config.name
                    );
                    dropped.push(participant);
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("Participant {participant} disconnected, removing");
                    dropped.push(participant);
                }
            }
        }
        for participant in dropped {
            self.subscribers.remove(&participant);
        }
    }
}
