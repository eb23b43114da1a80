//! # BuyerRegistry — per-order buyer and secret bookkeeping
//!
//! Each order embeds one registry. A buyer registers exactly once per
//! order, committing an opaque secret value; the seller later signs over
//! (buyer, secret) to authorize release to that buyer.
//!
//! ## Invariants
//!
//! - A buyer identity appears at most once (second registration rejected).
//! - Secrets are write-once: never overwritten, never deleted.
//! - Enumeration order is registration order.
//!
//! Membership and secret lookup are backed by a `HashMap` keyed on the
//! buyer identity; the ordered `Vec` exists purely for enumeration, so
//! registry size does not degrade the hot lookup path.

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{CovenantError, OrderId, Result};

/// Ordered set of registered buyers plus their committed secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerRegistry {
    /// Registration order. Each address appears exactly once.
    buyers: Vec<Address>,
    /// Buyer identity → committed secret.
    secrets: HashMap<Address, u128>,
}

impl BuyerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buyer with their secret.
    ///
    /// # Errors
    /// Returns [`CovenantError::AlreadyRegistered`] if the buyer is
    /// already present; the registry is unchanged in that case.
    pub fn register(&mut self, order_id: OrderId, buyer: Address, secret: u128) -> Result<()> {
        if self.secrets.contains_key(&buyer) {
            return Err(CovenantError::AlreadyRegistered { order_id, buyer });
        }
        self.buyers.push(buyer);
        self.secrets.insert(buyer, secret);
        Ok(())
    }

    /// Whether the given identity has registered.
    #[must_use]
    pub fn is_registered(&self, buyer: Address) -> bool {
        self.secrets.contains_key(&buyer)
    }

    /// The secret a buyer committed, if registered.
    #[must_use]
    pub fn secret_of(&self, buyer: Address) -> Option<u128> {
        self.secrets.get(&buyer).copied()
    }

    /// Registered buyers in registration order.
    #[must_use]
    pub fn buyers(&self) -> &[Address] {
        &self.buyers
    }

    /// Number of registered buyers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buyers.len()
    }

    /// Whether no buyer has registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty()
    }
}
