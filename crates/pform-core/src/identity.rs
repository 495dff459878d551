//! # Entry Identity
//!
//! Stable identifiers for entries of dynamic lists (the addresses of a
//! person form). An id is minted when the entry is created and travels
//! with it through inserts, removals, swaps, and moves, so a renderer can
//! key its widgets on it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one entry of a field array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a new random entry identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry:{}", self.0)
    }
}
