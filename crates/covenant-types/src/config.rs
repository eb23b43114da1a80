//! Configuration for an order book deployment.

use serde::{Deserialize, Serialize};

use alloy::primitives::Address;

use crate::constants;

/// Configuration for a single `OrderBook` instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// The book's own custody account. Native deposits are held here
    /// between listing and release, and token sellers grant their
    /// allowance to this address.
    pub book_address: Address,
    /// Scale factor between native display units and base units.
    pub native_unit_scale: u128,
}

impl BookConfig {
    /// Config with the standard 18-decimal native scale.
    #[must_use]
    pub fn new(book_address: Address) -> Self {
        Self {
            book_address,
            native_unit_scale: constants::NATIVE_UNIT_SCALE,
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self::new(Address::ZERO)
    }
}
