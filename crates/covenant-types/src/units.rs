//! Display-unit ↔ base-unit conversion for the native asset.
//!
//! Native order amounts cross the API in display units, but custody holds
//! base units (`display * scale`). This pair of checked functions is the
//! single conversion point, used identically at deposit and at payout —
//! the scale factor is never applied inline anywhere else.

/// Convert a display-unit amount to base units. `None` on overflow.
#[must_use]
pub fn to_base_units(display: u128, scale: u128) -> Option<u128> {
    display.checked_mul(scale)
}

/// Convert a base-unit amount back to display units.
///
/// Returns `None` if `base` is not an exact multiple of `scale` — a
/// non-divisible remainder means the attached value cannot correspond to
/// any whole display amount and must be rejected, never rounded.
#[must_use]
pub fn from_base_units(base: u128, scale: u128) -> Option<u128> {
    if scale == 0 || base % scale != 0 {
        return None;
    }
    Some(base / scale)
}
