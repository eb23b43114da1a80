//! # EscrowOrder — one seller's custodied deposit
//!
//! ## State Machine
//!
//! ```text
//!   (not in table)  list   ┌────────┐  release  ┌──────────┐
//!        ───────────────▶  │ LISTED ├──────────▶│ RELEASED │
//!                          └────────┘           └──────────┘
//! ```
//!
//! Absence from the order table is the implicit initial state — an id the
//! book never assigned has no order. Transitions are **monotonic**:
//! LISTED → RELEASED only, and RELEASED is terminal. Released orders are
//! never deleted; they remain queryable as a historical record.
//!
//! ## Security Properties
//!
//! - **Atomic listing**: an order exists only once its deposit succeeded
//! - **Single release**: LISTED → RELEASED is the double-spend guard
//! - **Immutable parties**: seller and asset are fixed at creation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use alloy::primitives::Address;

use crate::{AssetKind, BuyerRegistry, CovenantError, OrderId, Result};

/// Lifecycle state of an order that exists in the book.
///
/// Transitions never go backwards: `Listed → Released`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    /// Deposit custodied; buyers may register; release pending.
    Listed,
    /// Funds transferred to exactly one buyer. **Terminal.**
    Released,
}

impl OrderState {
    /// Can this state transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Listed, Self::Released))
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listed => write!(f, "LISTED"),
            Self::Released => write!(f, "RELEASED"),
        }
    }
}

/// One escrowed deposit awaiting signature-authorized release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowOrder {
    /// Monotonic order identifier assigned at creation. Never reused.
    pub id: OrderId,
    /// The depositor. Immutable; sole release authority.
    pub seller: Address,
    /// Escrowed quantity. Native orders: display units (custody holds
    /// the scaled base-unit value); token orders: smallest token unit.
    /// Never zero for a stored order.
    pub amount: u128,
    /// Which asset is custodied. Immutable.
    pub asset: AssetKind,
    /// Current lifecycle state.
    pub state: OrderState,
    /// Registered buyers and their committed secrets.
    pub registry: BuyerRegistry,
    /// When the order was listed.
    pub created_at: DateTime<Utc>,
    /// When the order was released, once it has been.
    pub released_at: Option<DateTime<Utc>>,
}

impl EscrowOrder {
    /// Create a freshly listed order with an empty registry.
    #[must_use]
    pub fn new(id: OrderId, seller: Address, amount: u128, asset: AssetKind) -> Self {
        Self {
            id,
            seller,
            amount,
            asset,
            state: OrderState::Listed,
            registry: BuyerRegistry::new(),
            created_at: Utc::now(),
            released_at: None,
        }
    }

    /// Whether the order is still open for registration and release.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.state == OrderState::Listed
    }

    /// Guard an operation that requires the LISTED state.
    pub fn ensure_listed(&self) -> Result<()> {
        if self.is_listed() {
            Ok(())
        } else {
            Err(CovenantError::NotListed {
                order_id: self.id,
                state: self.state,
            })
        }
    }

    /// Attempt the LISTED → RELEASED transition.
    ///
    /// # Errors
    /// Returns [`CovenantError::NotListed`] if the order is not LISTED.
    pub fn mark_released(&mut self) -> Result<()> {
        if !self.state.can_transition_to(OrderState::Released) {
            return Err(CovenantError::NotListed {
                order_id: self.id,
                state: self.state,
            });
        }
        self.state = OrderState::Released;
        self.released_at = Some(Utc::now());
        Ok(())
    }
}

/// Dummy orders for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl EscrowOrder {
    /// A listed native-asset order.
    pub fn dummy_native(id: u64, seller: Address, amount: u128) -> Self {
        Self::new(OrderId(id), seller, amount, AssetKind::Native)
    }

    /// A listed token order against a fixed dummy token address.
    pub fn dummy_token(id: u64, seller: Address, amount: u128) -> Self {
        let token = Address::repeat_byte(0x70);
        Self::new(OrderId(id), seller, amount, AssetKind::Token(token))
    }
}
