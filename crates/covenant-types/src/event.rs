//! Notification events emitted by the order book.
//!
//! Every state transition appends one event to the book's log. The log is
//! append-only and queryable — the audit trail of who listed, who
//! registered, and which signature authorized which release.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use alloy::primitives::Address;

use crate::{AssetKind, OrderId, OrderState};

/// A notification emitted by a successful book operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookEvent {
    /// A new order was listed and its deposit custodied.
    OrderListed {
        order_id: OrderId,
        seller: Address,
        amount: u128,
        asset: AssetKind,
        state: OrderState,
        at: DateTime<Utc>,
    },
    /// A buyer registered a secret against a listed order.
    BuyerRegistered {
        order_id: OrderId,
        buyer: Address,
        secret: u128,
        at: DateTime<Utc>,
    },
    /// Custody was released to a buyer under a verified seller signature.
    FundsReleased {
        order_id: OrderId,
        buyer: Address,
        recovered_signer: Address,
        /// The raw 65-byte signature that authorized the release.
        signature: Vec<u8>,
        at: DateTime<Utc>,
    },
}

impl BookEvent {
    /// The order this event concerns.
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::OrderListed { order_id, .. }
            | Self::BuyerRegistered { order_id, .. }
            | Self::FundsReleased { order_id, .. } => *order_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_accessor_covers_all_variants() {
        let at = Utc::now();
        let listed = BookEvent::OrderListed {
            order_id: OrderId(1),
            seller: Address::repeat_byte(0x51),
            amount: 100,
            asset: AssetKind::Native,
            state: OrderState::Listed,
            at,
        };
        let registered = BookEvent::BuyerRegistered {
            order_id: OrderId(2),
            buyer: Address::repeat_byte(0x01),
            secret: 123,
            at,
        };
        let released = BookEvent::FundsReleased {
            order_id: OrderId(3),
            buyer: Address::repeat_byte(0x01),
            recovered_signer: Address::repeat_byte(0x51),
            signature: vec![0u8; 65],
            at,
        };
        assert_eq!(listed.order_id(), OrderId(1));
        assert_eq!(registered.order_id(), OrderId(2));
        assert_eq!(released.order_id(), OrderId(3));
    }

    #[test]
    fn serde_roundtrip() {
        let event = BookEvent::BuyerRegistered {
            order_id: OrderId(9),
            buyer: Address::repeat_byte(0x02),
            secret: 345,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: BookEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
