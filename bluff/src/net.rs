//! Wire types shared by the session authority and replicas.
//!
//! Every broadcast goes out wrapped in an [`messages::Envelope`] carrying
//! the protocol version and a per-recipient sequence number. Transports
//! that cross a process boundary frame values with [`utils::write_prefixed`]
//! and [`utils::read_prefixed`].

/// Serialization error types.
pub mod errors;

/// Requests, broadcast events and envelopes.
pub mod messages;

/// Protocol versioning for envelope compatibility checks.
pub mod protocol_version;

/// Binary encoding and length-prefixed framing.
pub mod utils;
