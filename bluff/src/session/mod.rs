//! Host-authoritative session: one actor owns the canonical game state.
//!
//! This module implements:
//! - SessionAuthority: async actor that validates and applies every action
//! - SessionHandle: cloneable front door used by participants
//! - Per-participant broadcast routes with their own sequence numbers
//!
//! ## Architecture
//!
//! The authority runs in its own Tokio task and drains a single mpsc
//! inbox, so every mutation is serialized. Requests that are out of turn,
//! malformed or from unknown participants are answered with
//! [`SessionResponse::Rejected`] and never broadcast.
//!
//! ## Example
//!
//! ```no_run
//! use bluff::session::{SessionAuthority, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (authority, handle) = SessionAuthority::new(SessionConfig::default());
//!     tokio::spawn(authority.run());
//!
//!     let alice = handle.register(1, "alice").await.unwrap();
//!     let bob = handle.register(2, "bob").await.unwrap();
//!     // The game starts as soon as the second player is seated.
//!     # drop((alice, bob));
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{IndexPromise, Registration, SessionAuthority, SessionHandle};
pub use config::{DeckMode, SessionConfig};
pub use messages::{SessionClosed, SessionMessage, SessionResponse};
