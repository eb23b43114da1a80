//! Signature authorization — canonical digest and signer recovery.
//!
//! The seller authorizes a release off-band by signing, with their own
//! key, the canonical digest over the receiving buyer's address and that
//! buyer's committed secret. Both signer and verifier must compute the
//! digest identically:
//!
//! ```text
//! digest   = keccak256(buyer_address ‖ uint256(secret))
//! envelope = keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)
//! ```
//!
//! The EIP-191 envelope matches what personal-sign tooling produces on
//! the seller's side, so a wallet-signed message verifies here without
//! any custom signing path.
//!
//! Recovery never fails outward: a malformed or forged signature recovers
//! to an address (possibly `Address::ZERO`) that will not equal the
//! recorded seller, which yields the natural `SignerMismatch` rejection.

use alloy::primitives::{Address, B256, Signature, eip191_hash_message, keccak256};

/// Canonical digest binding a buyer to their committed secret.
///
/// The secret occupies a full 32-byte big-endian word, matching how a
/// 256-bit unsigned integer is packed by standard signing tools.
#[must_use]
pub fn release_digest(buyer: Address, secret: u128) -> B256 {
    let mut payload = [0u8; 52];
    payload[..20].copy_from_slice(buyer.as_slice());
    payload[36..].copy_from_slice(&secret.to_be_bytes());
    keccak256(payload)
}

/// Recover the signing address from a raw 65-byte (r ‖ s ‖ v) signature
/// over the EIP-191 envelope of `digest`.
///
/// Never errors: any malformed input recovers to `Address::ZERO`.
/// Exposed standalone for off-system verification.
#[must_use]
pub fn recover_signer(digest: B256, signature: &[u8]) -> Address {
    let Ok(sig) = Signature::from_raw(signature) else {
        return Address::ZERO;
    };
    let envelope = eip191_hash_message(digest);
    sig.recover_address_from_prehash(&envelope)
        .unwrap_or(Address::ZERO)
}
