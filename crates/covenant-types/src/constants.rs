//! System-wide constants for the Covenant escrow engine.

/// Scale factor between the native asset's display unit and its smallest
/// base unit (18 decimals, wei-style).
pub const NATIVE_UNIT_SCALE: u128 = 1_000_000_000_000_000_000;

/// Length in bytes of a raw release signature (r ‖ s ‖ v).
pub const RAW_SIGNATURE_LEN: usize = 65;

/// Length in bytes of the canonical release digest.
pub const DIGEST_LEN: usize = 32;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Covenant";
