//! Identifiers used throughout Covenant.
//!
//! Order ids are dense and monotonic: the book assigns them from a
//! pre-increment counter starting at 1. Id 0 is reserved to mean
//! "no such order" and is never assigned.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing order identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// The reserved "no such order" sentinel. Never assigned by the book.
    pub const RESERVED: Self = Self(0);

    /// The next id in the sequence.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this is the reserved sentinel id.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}
