//! Asset identification for escrowed deposits.
//!
//! An order custodies either the native currency unit or a fungible-token
//! balance held by an external balance/allowance ledger at a known address.
//! The kind is fixed at listing time and immutable thereafter.

use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Which asset an order custodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// The native currency unit. Deposited at listing time, in base units.
    Native,
    /// A fungible token ledger at the given address. Pulled at release
    /// time via the seller's pre-authorization, not at listing.
    Token(Address),
}

impl AssetKind {
    /// Whether this is the native asset.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The token ledger address, if any.
    #[must_use]
    pub fn token_address(&self) -> Option<Address> {
        match self {
            Self::Native => None,
            Self::Token(addr) => Some(*addr),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Token(addr) => write!(f, "TOKEN:{}", hex::encode(&addr.as_slice()[..4])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_has_no_token_address() {
        assert!(AssetKind::Native.is_native());
        assert_eq!(AssetKind::Native.token_address(), None);
    }

    #[test]
    fn token_exposes_address() {
        let addr = Address::repeat_byte(0xab);
        let kind = AssetKind::Token(addr);
        assert!(!kind.is_native());
        assert_eq!(kind.token_address(), Some(addr));
    }

    #[test]
    fn display_short_form() {
        assert_eq!(AssetKind::Native.to_string(), "NATIVE");
        let kind = AssetKind::Token(Address::repeat_byte(0xab));
        assert_eq!(kind.to_string(), "TOKEN:abababab");
    }

    #[test]
    fn serde_roundtrip() {
        let kind = AssetKind::Token(Address::repeat_byte(0x42));
        let json = serde_json::to_string(&kind).unwrap();
        let back: AssetKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}
