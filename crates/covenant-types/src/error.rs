//! Error types for the Covenant escrow engine.
//!
//! All errors use the `CV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input validity errors
//! - 2xx: Authorization / role errors
//! - 3xx: State-machine violations
//! - 4xx: Custody / transfer failures
//!
//! Every error is a rejection-with-reason: a failed operation leaves all
//! durable state exactly as it was before the call.

use alloy::primitives::Address;
use thiserror::Error;

use crate::{OrderId, OrderState};

/// Central error enum for all Covenant operations.
#[derive(Debug, Error)]
pub enum CovenantError {
    // =================================================================
    // Input Validity (1xx)
    // =================================================================
    /// Listing with a zero amount.
    #[error("CV_ERR_100: Order amount must be positive")]
    InvalidAmount,

    /// The order id was never assigned by this book.
    #[error("CV_ERR_101: Unknown order: {0}")]
    UnknownOrder(OrderId),

    // =================================================================
    // Authorization / Role (2xx)
    // =================================================================
    /// The seller of an order tried to register as a buyer on it.
    #[error("CV_ERR_200: Seller cannot register as buyer on own {0}")]
    SellerCannotRegister(OrderId),

    /// A caller other than the recorded seller attempted a seller-only
    /// operation (release, secret lookup).
    #[error("CV_ERR_201: Caller {caller} is not the seller of {order_id}")]
    NotSeller { order_id: OrderId, caller: Address },

    /// Release named a buyer that never registered on the order.
    #[error("CV_ERR_202: Buyer {buyer} is not registered on {order_id}")]
    BuyerNotRegistered { order_id: OrderId, buyer: Address },

    /// The release signature did not recover to the recorded seller.
    /// This is the core authorization failure: nobody without the
    /// seller's key can produce a passing signature.
    #[error("CV_ERR_203: Recovered signer {recovered} does not match seller {expected}")]
    SignerMismatch { expected: Address, recovered: Address },

    // =================================================================
    // State-Machine Violations (3xx)
    // =================================================================
    /// An operation that requires a LISTED order found it in another state.
    #[error("CV_ERR_300: {order_id} is {state}, not LISTED")]
    NotListed { order_id: OrderId, state: OrderState },

    /// A buyer attempted a second registration on the same order.
    #[error("CV_ERR_301: Buyer {buyer} already registered on {order_id}")]
    AlreadyRegistered { order_id: OrderId, buyer: Address },

    /// A release was attempted while another release of the same order
    /// was already in flight (reentrancy / concurrent double-release).
    #[error("CV_ERR_302: Release already in progress for {0}")]
    ReleaseInProgress(OrderId),

    // =================================================================
    // Custody / Transfer (4xx)
    // =================================================================
    /// Deposit-time balance, allowance, or attached-value mismatch.
    #[error("CV_ERR_400: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    /// The release-time asset transfer failed. The order is rolled back
    /// to LISTED so the release can be retried.
    #[error("CV_ERR_401: Asset transfer failed: {reason}")]
    TransactionFailed { reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CovenantError>;
