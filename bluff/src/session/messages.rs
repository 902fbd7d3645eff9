//! Session actor message types.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::{
    game::{
        ActionError, GameState,
        entities::{ParticipantId, PlayerIndex},
    },
    net::messages::{ClientMessage, Envelope},
};

/// Messages that can be sent to a [`super::SessionAuthority`]
#[derive(Debug)]
pub enum SessionMessage {
    /// Route broadcasts for `participant` into `sender`
    Subscribe {
        participant: ParticipantId,
        sender: mpsc::Sender<Envelope>,
    },

    /// Stop routing broadcasts to `participant`
    Unsubscribe { participant: ParticipantId },

    /// Register, place a bet or challenge
    Action {
        message: ClientMessage,
        response: oneshot::Sender<SessionResponse>,
    },

    /// Clone of the canonical state
    GetState {
        response: oneshot::Sender<GameState>,
    },

    /// Stop the actor
    Close {
        response: oneshot::Sender<SessionResponse>,
    },
}

/// Response from session operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResponse {
    /// Registration accepted with this seat
    Registered { index: PlayerIndex },

    /// Action applied and broadcast
    Accepted,

    /// Action refused; nothing changed and nothing was broadcast
    Rejected(ActionError),
}

impl SessionResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SessionResponse::Registered { .. } | SessionResponse::Accepted
        )
    }

    /// Get error message if response is a rejection
    pub fn error_message(&self) -> Option<String> {
        match self {
            SessionResponse::Rejected(error) => Some(error.to_string()),
            _ => None,
        }
    }
}

/// The authority is no longer running.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("session is closed")]
pub struct SessionClosed;
