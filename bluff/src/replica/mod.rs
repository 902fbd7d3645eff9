//! Participant-side mirror of a session.
//!
//! A [`Replica`] consumes the envelopes routed to one participant and keeps
//! a [`mirror::TableMirror`]: the local hand as real cards, everything else
//! the participant is not entitled to see as [`CardSlot::Hidden`]. After
//! each state-changing delta the replica hands a [`TableView`] to its
//! [`Presentation`]. Requests go back through a [`Seat`].

pub mod client;
pub mod errors;
pub mod mirror;
pub mod seat;
pub mod view;

pub use client::Replica;
pub use errors::ReplicaError;
pub use mirror::{Applied, CardSlot, Mirror, ReplicaState, Reveal, TableMirror};
pub use seat::Seat;
pub use view::{OpponentView, Presentation, TableView, ViewRecorder, WagerView};
