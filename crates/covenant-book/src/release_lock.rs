//! Per-order release lock.
//!
//! A release's payout hands value to an external recipient, and in a
//! concurrent host that hand-off can re-enter the book before the first
//! call commits. The lock is acquired at `release_funds` entry and
//! dropped on **every** exit path, so at most one release of a given
//! order is ever in flight — the second caller gets a clean rejection
//! instead of racing the `LISTED` check.

use std::collections::HashSet;

use covenant_types::{CovenantError, OrderId, Result};

/// Tracks which orders currently have a release in flight.
#[derive(Debug, Default)]
pub struct ReleaseLock {
    in_flight: HashSet<OrderId>,
}

impl ReleaseLock {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for an order.
    ///
    /// # Errors
    /// Returns [`CovenantError::ReleaseInProgress`] if a release of this
    /// order is already in flight.
    pub fn acquire(&mut self, order_id: OrderId) -> Result<()> {
        if !self.in_flight.insert(order_id) {
            return Err(CovenantError::ReleaseInProgress(order_id));
        }
        Ok(())
    }

    /// Drop the lock for an order. Idempotent.
    pub fn release(&mut self, order_id: OrderId) {
        self.in_flight.remove(&order_id);
    }

    /// Whether a release of this order is currently in flight.
    #[must_use]
    pub fn is_held(&self, order_id: OrderId) -> bool {
        self.in_flight.contains(&order_id)
    }
}
