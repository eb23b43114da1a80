//! # covenant-custody
//!
//! **Asset custody** for the Covenant escrow engine: moving value into
//! custody at listing time and out of custody at release time, for both
//! asset kinds.
//!
//! ## Architecture
//!
//! 1. **`NativeLedger`**: per-account native-unit balances. A native
//!    deposit moves the attached value from the seller into the book's
//!    custody account; payout moves it from custody to the buyer.
//! 2. **`TokenLedger`**: a standard balance/allowance ledger (the
//!    "external collaborator" of the design — modelled in-process). Token
//!    orders are *not* pulled at listing: the seller keeps the balance and
//!    grants the book an allowance, which payout consumes at release.
//! 3. **`AssetCustody`**: the single facade the order book talks to.
//!    Deposit-time shortfalls surface as `InsufficientFunds`; release-time
//!    transfer failures surface uniformly as `TransactionFailed` — never
//!    silently swallowed.

pub mod custody;
pub mod ledger;

pub use custody::AssetCustody;
pub use ledger::{NativeLedger, TokenLedger};
