//! # covenant-types
//!
//! Shared types, errors, and configuration for the **Covenant** escrow engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`] and the re-exported [`Address`]
//! - **Asset model**: [`AssetKind`]
//! - **Order model**: [`EscrowOrder`], [`OrderState`]
//! - **Buyer registry**: [`BuyerRegistry`] (embedded in each order)
//! - **Events**: [`BookEvent`] — the notifications the book emits
//! - **Unit conversion**: [`units::to_base_units`], [`units::from_base_units`]
//! - **Configuration**: [`BookConfig`]
//! - **Errors**: [`CovenantError`] with `CV_ERR_` prefix codes
//! - **Constants**: system-wide scale factors and limits

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;
pub mod registry;
pub mod units;

// Re-export primary types at crate root for ergonomic imports:
//   use covenant_types::{EscrowOrder, OrderState, BuyerRegistry, ...};

pub use asset::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;
pub use registry::*;

/// Account / token identity — 20-byte Ethereum-style address.
pub use alloy::primitives::Address;

// Constants are accessed via `covenant_types::constants::FOO` and unit
// conversions via `covenant_types::units` (not re-exported to keep the
// scale factor an explicit, named thing at call sites).
