//! # covenant-book
//!
//! The top-level **OrderBook** state machine plus the signature
//! authorization it gates releases on.
//!
//! ## Architecture
//!
//! 1. **`signer`**: canonical release digest over (buyer, secret),
//!    EIP-191 envelope, secp256k1 address recovery
//! 2. **`ReleaseLock`**: per-order in-flight guard against reentrant or
//!    concurrent double release
//! 3. **`OrderBook`**: id assignment, the order table, lifecycle
//!    enforcement (list → register → release), and orchestration of
//!    custody and signature verification
//!
//! ## Order Flow
//!
//! ```text
//! seller → OrderBook.list_order()     → AssetCustody deposit / allowance check
//! buyer  → OrderBook.register_buyer() → BuyerRegistry (while LISTED)
//! seller → OrderBook.release_funds()  → verify signature → RELEASED → payout
//! ```
//!
//! The state flip to RELEASED happens **before** the payout, and the
//! per-order lock is held across both — that pairing is what makes a
//! double release impossible even in a concurrent host.

pub mod book;
pub mod release_lock;
pub mod signer;

pub use book::OrderBook;
pub use release_lock::ReleaseLock;
pub use signer::{recover_signer, release_digest};
