use thiserror::Error;

use crate::{game::entities::ParticipantId, net::protocol_version::ProtocolVersion};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ReplicaError {
    #[error("participant {participant} could not resolve its seat index")]
    IndexUnresolved { participant: ParticipantId },
    #[error("expected broadcast {expected}, received {received}")]
    SequenceGap { expected: u64, received: u64 },
    #[error("incompatible protocol version {0:?}")]
    IncompatibleVersion(ProtocolVersion),
    #[error("game has not started")]
    NotStarted,
    #[error("replica out of sync: {0}")]
    Desync(String),
}
