//! Protocol versioning for broadcast envelopes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// V1: per-recipient sequenced envelopes with tailored initial state
    V1,
}

impl ProtocolVersion {
    /// Get the current protocol version
    pub fn current() -> Self {
        ProtocolVersion::V1
    }

    /// Check if this version can apply deltas produced by `other`
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        matches!((self, other), (ProtocolVersion::V1, ProtocolVersion::V1))
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::current()
    }
}
