//! # OrderBook — the escrow lifecycle state machine
//!
//! Owns the order table, the id counter, custody, the event log, and the
//! release lock. All public operations take the caller address explicitly
//! and either complete fully or leave every store untouched.
//!
//! ## Release ordering
//!
//! `release_funds` is the one operation that touches an external party
//! (the payout recipient). Its ordering is load-bearing:
//!
//! 1. acquire the per-order release lock
//! 2. run every pure check (state, registration, authority, signature)
//! 3. flip `LISTED → RELEASED`
//! 4. execute the payout
//! 5. on payout failure, undo the flip by hand and report
//!    `TransactionFailed` — the host gives us no transaction to abort
//!
//! The flip-before-payout order plus the lock is what prevents two
//! releases of the same order from both passing the `LISTED` check.

use std::collections::BTreeMap;

use chrono::Utc;

use covenant_custody::AssetCustody;
use covenant_types::{
    Address, AssetKind, BookConfig, BookEvent, CovenantError, EscrowOrder, OrderId, OrderState,
    Result, units,
};

use crate::release_lock::ReleaseLock;
use crate::signer;

/// The top-level escrow order book.
pub struct OrderBook {
    config: BookConfig,
    custody: AssetCustody,
    /// All orders ever listed, keyed by id. Never pruned — released
    /// orders stay queryable as historical record.
    orders: BTreeMap<OrderId, EscrowOrder>,
    /// High-water mark of assigned ids. Pre-increment: first order is 1.
    last_id: OrderId,
    release_lock: ReleaseLock,
    /// Append-only notification log.
    events: Vec<BookEvent>,
}

impl OrderBook {
    /// Create an empty book for the given configuration.
    #[must_use]
    pub fn new(config: BookConfig) -> Self {
        let custody = AssetCustody::new(config.book_address);
        Self {
            config,
            custody,
            orders: BTreeMap::new(),
            last_id: OrderId::RESERVED,
            release_lock: ReleaseLock::new(),
            events: Vec::new(),
        }
    }

    /// List a new escrow order, custodying the seller's deposit.
    ///
    /// Native orders: `attached_value` (base units) must equal
    /// `amount` display units exactly — a non-divisible remainder or a
    /// wrong multiple is rejected before any id is consumed. Token
    /// orders: the seller's balance and an exact allowance to the book
    /// are checked, but nothing is pulled until release
    /// (`attached_value` is ignored).
    ///
    /// # Errors
    /// - [`CovenantError::InvalidAmount`] for a zero amount
    /// - [`CovenantError::InsufficientFunds`] for any deposit-time
    ///   value, balance, or allowance mismatch
    pub fn list_order(
        &mut self,
        seller: Address,
        amount: u128,
        asset: AssetKind,
        attached_value: u128,
    ) -> Result<OrderId> {
        if amount == 0 {
            return Err(CovenantError::InvalidAmount);
        }

        match asset {
            AssetKind::Native => {
                let scale = self.config.native_unit_scale;
                match units::from_base_units(attached_value, scale) {
                    Some(display) if display == amount => {}
                    _ => {
                        return Err(CovenantError::InsufficientFunds {
                            needed: amount,
                            available: attached_value.checked_div(scale).unwrap_or(0),
                        });
                    }
                }
                self.custody.deposit_native(seller, attached_value)?;
            }
            AssetKind::Token(token) => {
                self.custody.check_token_listing(token, seller, amount)?;
            }
        }

        // Id is consumed only once the deposit side is settled.
        let order_id = self.last_id.next();
        self.last_id = order_id;

        let order = EscrowOrder::new(order_id, seller, amount, asset);
        self.events.push(BookEvent::OrderListed {
            order_id,
            seller,
            amount,
            asset,
            state: order.state,
            at: order.created_at,
        });
        tracing::info!(%order_id, %seller, amount, %asset, "order listed");
        self.orders.insert(order_id, order);
        Ok(order_id)
    }

    /// Register the caller as a buyer on a listed order, committing a
    /// secret value.
    ///
    /// # Errors
    /// - [`CovenantError::UnknownOrder`] for an id never assigned
    /// - [`CovenantError::SellerCannotRegister`] if the caller sold it
    /// - [`CovenantError::AlreadyRegistered`] on a second registration
    /// - [`CovenantError::NotListed`] once the order is released
    pub fn register_buyer(&mut self, caller: Address, order_id: OrderId, secret: u128) -> Result<()> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(CovenantError::UnknownOrder(order_id))?;

        if caller == order.seller {
            return Err(CovenantError::SellerCannotRegister(order_id));
        }
        if order.registry.is_registered(caller) {
            return Err(CovenantError::AlreadyRegistered {
                order_id,
                buyer: caller,
            });
        }
        order.ensure_listed()?;
        order.registry.register(order_id, caller, secret)?;

        self.events.push(BookEvent::BuyerRegistered {
            order_id,
            buyer: caller,
            secret,
            at: Utc::now(),
        });
        tracing::info!(%order_id, buyer = %caller, "buyer registered");
        Ok(())
    }

    /// Release the custodied asset to one registered buyer, authorized
    /// by the seller's signature over (buyer, committed secret).
    ///
    /// Seller-directed: only the order's seller may call, naming the
    /// receiving buyer.
    ///
    /// # Errors
    /// See the error taxonomy. On [`CovenantError::TransactionFailed`]
    /// the order is rolled back to LISTED so the release can be retried.
    pub fn release_funds(
        &mut self,
        caller: Address,
        order_id: OrderId,
        signature: &[u8],
        buyer: Address,
    ) -> Result<()> {
        self.release_lock.acquire(order_id)?;
        let result = self.release_inner(caller, order_id, signature, buyer);
        self.release_lock.release(order_id);
        result
    }

    fn release_inner(
        &mut self,
        caller: Address,
        order_id: OrderId,
        signature: &[u8],
        buyer: Address,
    ) -> Result<()> {
        let (seller, asset, payout_amount, recovered) = {
            let order = self
                .orders
                .get_mut(&order_id)
                .ok_or(CovenantError::UnknownOrder(order_id))?;
            order.ensure_listed()?;

            let secret = order
                .registry
                .secret_of(buyer)
                .ok_or(CovenantError::BuyerNotRegistered { order_id, buyer })?;

            if caller != order.seller {
                return Err(CovenantError::NotSeller { order_id, caller });
            }

            // Core authorization: the signature must recover to the
            // seller over this buyer's committed secret.
            let digest = signer::release_digest(buyer, secret);
            let recovered = signer::recover_signer(digest, signature);
            if recovered != order.seller {
                return Err(CovenantError::SignerMismatch {
                    expected: order.seller,
                    recovered,
                });
            }

            let payout_amount = match order.asset {
                AssetKind::Native => {
                    units::to_base_units(order.amount, self.config.native_unit_scale).ok_or_else(
                        || CovenantError::TransactionFailed {
                            reason: "native payout amount overflow".into(),
                        },
                    )?
                }
                AssetKind::Token(_) => order.amount,
            };

            // Effects before interaction: leave LISTED before any value
            // moves, so a reentrant caller sees RELEASED.
            order.mark_released()?;
            (order.seller, order.asset, payout_amount, recovered)
        };

        match self.custody.payout(asset, seller, buyer, payout_amount) {
            Ok(()) => {
                self.events.push(BookEvent::FundsReleased {
                    order_id,
                    buyer,
                    recovered_signer: recovered,
                    signature: signature.to_vec(),
                    at: Utc::now(),
                });
                tracing::info!(
                    %order_id,
                    %buyer,
                    amount = payout_amount,
                    signature = %hex::encode(signature),
                    "funds released"
                );
                Ok(())
            }
            Err(err) => {
                // No host transaction to lean on: undo the flip by hand
                // so the release can be retried once the cause is fixed.
                if let Some(order) = self.orders.get_mut(&order_id) {
                    order.state = OrderState::Listed;
                    order.released_at = None;
                }
                tracing::warn!(%order_id, %buyer, %err, "release rolled back");
                Err(err)
            }
        }
    }

    /// Fetch a full order record by value.
    ///
    /// # Errors
    /// Returns [`CovenantError::UnknownOrder`] for an unassigned id.
    pub fn order(&self, order_id: OrderId) -> Result<EscrowOrder> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or(CovenantError::UnknownOrder(order_id))
    }

    /// The secret a buyer committed on an order. Seller-only.
    ///
    /// # Errors
    /// - [`CovenantError::UnknownOrder`] / [`CovenantError::NotSeller`]
    /// - [`CovenantError::BuyerNotRegistered`] if the buyer never
    ///   registered
    pub fn message(&self, caller: Address, order_id: OrderId, buyer: Address) -> Result<u128> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or(CovenantError::UnknownOrder(order_id))?;
        if caller != order.seller {
            return Err(CovenantError::NotSeller { order_id, caller });
        }
        order
            .registry
            .secret_of(buyer)
            .ok_or(CovenantError::BuyerNotRegistered { order_id, buyer })
    }

    /// Total number of ids assigned so far.
    #[must_use]
    pub fn total_orders(&self) -> u64 {
        self.last_id.0
    }

    /// The append-only notification log.
    #[must_use]
    pub fn events(&self) -> &[BookEvent] {
        &self.events
    }

    /// The book configuration.
    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Custody (read).
    #[must_use]
    pub fn custody(&self) -> &AssetCustody {
        &self.custody
    }

    /// Custody (write) — funding accounts and granting allowances.
    pub fn custody_mut(&mut self) -> &mut AssetCustody {
        &mut self.custody
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{SignerSync, local::PrivateKeySigner};
    use covenant_types::constants::NATIVE_UNIT_SCALE;

    const BOOK: Address = Address::repeat_byte(0xcc);
    const BUYER_A: Address = Address::repeat_byte(0x0a);
    const BUYER_B: Address = Address::repeat_byte(0x0b);
    const TOKEN: Address = Address::repeat_byte(0x70);

    struct Setup {
        book: OrderBook,
        seller_key: PrivateKeySigner,
        seller: Address,
    }

    fn setup() -> Setup {
        let seller_key = PrivateKeySigner::random();
        let seller = seller_key.address();
        Setup {
            book: OrderBook::new(BookConfig::new(BOOK)),
            seller_key,
            seller,
        }
    }

    impl Setup {
        fn fund_native(&mut self, account: Address, display_units: u128) {
            self.book
                .custody_mut()
                .native_mut()
                .deposit(account, display_units * NATIVE_UNIT_SCALE);
        }

        fn fund_token(&mut self, amount: u128) {
            let token = self.book.custody_mut().token_mut(TOKEN);
            token.mint(self.seller, amount);
            token.approve(self.seller, BOOK, amount);
        }

        fn list_native(&mut self, amount: u128) -> OrderId {
            self.book
                .list_order(
                    self.seller,
                    amount,
                    AssetKind::Native,
                    amount * NATIVE_UNIT_SCALE,
                )
                .unwrap()
        }

        fn list_token(&mut self, amount: u128) -> OrderId {
            self.book
                .list_order(self.seller, amount, AssetKind::Token(TOKEN), 0)
                .unwrap()
        }

        fn sign_release(&self, buyer: Address, secret: u128) -> Vec<u8> {
            let digest = signer::release_digest(buyer, secret);
            self.seller_key
                .sign_message_sync(digest.as_slice())
                .unwrap()
                .as_bytes()
                .to_vec()
        }
    }

    #[test]
    fn list_then_fetch_roundtrip() {
        let mut s = setup();
        s.fund_native(s.seller, 10);
        let id = s.list_native(3);

        let order = s.book.order(id).unwrap();
        assert_eq!(order.id, OrderId(1));
        assert_eq!(order.seller, s.seller);
        assert_eq!(order.amount, 3);
        assert_eq!(order.state, OrderState::Listed);
        assert!(order.registry.is_empty());
    }

    #[test]
    fn zero_amount_rejected_without_consuming_id() {
        let mut s = setup();
        let err = s
            .book
            .list_order(s.seller, 0, AssetKind::Native, 0)
            .unwrap_err();
        assert!(matches!(err, CovenantError::InvalidAmount));
        assert_eq!(s.book.total_orders(), 0);
    }

    #[test]
    fn native_non_divisible_attachment_rejected() {
        let mut s = setup();
        s.fund_native(s.seller, 10);
        let err = s
            .book
            .list_order(s.seller, 1, AssetKind::Native, NATIVE_UNIT_SCALE + 1)
            .unwrap_err();
        assert!(matches!(err, CovenantError::InsufficientFunds { .. }));
        assert_eq!(s.book.total_orders(), 0);
    }

    #[test]
    fn native_wrong_multiple_rejected() {
        let mut s = setup();
        s.fund_native(s.seller, 10);
        let err = s
            .book
            .list_order(s.seller, 1, AssetKind::Native, 2 * NATIVE_UNIT_SCALE)
            .unwrap_err();
        assert!(matches!(err, CovenantError::InsufficientFunds { .. }));
    }

    #[test]
    fn native_listing_debits_seller_into_custody() {
        let mut s = setup();
        s.fund_native(s.seller, 5);
        s.list_native(2);
        let native = s.book.custody().native();
        assert_eq!(native.balance_of(s.seller), 3 * NATIVE_UNIT_SCALE);
        assert_eq!(native.balance_of(BOOK), 2 * NATIVE_UNIT_SCALE);
    }

    #[test]
    fn token_listing_checks_but_does_not_pull() {
        let mut s = setup();
        s.fund_token(1000);
        s.list_token(1000);
        // Seller still holds the tokens until release.
        let ledger = s.book.custody().token(TOKEN).unwrap();
        assert_eq!(ledger.balance_of(s.seller), 1000);
    }

    #[test]
    fn token_listing_allowance_mismatch_rejected() {
        let mut s = setup();
        let seller = s.seller;
        let token = s.book.custody_mut().token_mut(TOKEN);
        token.mint(seller, 1000);
        token.approve(seller, BOOK, 500);
        let err = s
            .book
            .list_order(seller, 1000, AssetKind::Token(TOKEN), 0)
            .unwrap_err();
        assert!(matches!(err, CovenantError::InsufficientFunds { .. }));
        assert_eq!(s.book.total_orders(), 0);
    }

    #[test]
    fn ids_are_dense_and_monotonic() {
        let mut s = setup();
        s.fund_native(s.seller, 10);
        assert_eq!(s.list_native(1), OrderId(1));
        assert_eq!(s.list_native(2), OrderId(2));
        assert_eq!(s.list_native(3), OrderId(3));
        assert_eq!(s.book.total_orders(), 3);
    }

    #[test]
    fn register_on_unknown_order_fails() {
        let mut s = setup();
        let err = s.book.register_buyer(BUYER_A, OrderId(1), 1).unwrap_err();
        assert!(matches!(err, CovenantError::UnknownOrder(OrderId(1))));
    }

    #[test]
    fn seller_cannot_register_on_own_order() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        let err = s.book.register_buyer(s.seller, id, 1).unwrap_err();
        assert!(matches!(err, CovenantError::SellerCannotRegister(_)));
        assert!(s.book.order(id).unwrap().registry.is_empty());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let err = s.book.register_buyer(BUYER_A, id, 456).unwrap_err();
        assert!(matches!(err, CovenantError::AlreadyRegistered { .. }));

        let order = s.book.order(id).unwrap();
        assert_eq!(order.registry.len(), 1);
        assert_eq!(order.registry.secret_of(BUYER_A), Some(123));
    }

    #[test]
    fn release_happy_path_native() {
        let mut s = setup();
        s.fund_native(s.seller, 2);
        let id = s.list_native(2);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();

        let sig = s.sign_release(BUYER_A, 123);
        s.book.release_funds(s.seller, id, &sig, BUYER_A).unwrap();

        let order = s.book.order(id).unwrap();
        assert_eq!(order.state, OrderState::Released);
        assert!(order.released_at.is_some());
        let native = s.book.custody().native();
        assert_eq!(native.balance_of(BUYER_A), 2 * NATIVE_UNIT_SCALE);
        assert_eq!(native.balance_of(BOOK), 0);
    }

    #[test]
    fn second_release_fails_not_listed() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let sig = s.sign_release(BUYER_A, 123);
        s.book.release_funds(s.seller, id, &sig, BUYER_A).unwrap();

        let err = s
            .book
            .release_funds(s.seller, id, &sig, BUYER_A)
            .unwrap_err();
        assert!(matches!(
            err,
            CovenantError::NotListed {
                state: OrderState::Released,
                ..
            }
        ));
    }

    #[test]
    fn release_to_unregistered_buyer_fails() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let sig = s.sign_release(BUYER_B, 999);
        let err = s
            .book
            .release_funds(s.seller, id, &sig, BUYER_B)
            .unwrap_err();
        assert!(matches!(err, CovenantError::BuyerNotRegistered { .. }));
        assert!(s.book.order(id).unwrap().is_listed());
    }

    #[test]
    fn release_by_non_seller_fails() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let sig = s.sign_release(BUYER_A, 123);
        let err = s.book.release_funds(BUYER_A, id, &sig, BUYER_A).unwrap_err();
        assert!(matches!(err, CovenantError::NotSeller { .. }));
        assert!(s.book.order(id).unwrap().is_listed());
    }

    #[test]
    fn wrong_key_signature_rejected() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();

        let impostor = PrivateKeySigner::random();
        let digest = signer::release_digest(BUYER_A, 123);
        let sig = impostor
            .sign_message_sync(digest.as_slice())
            .unwrap()
            .as_bytes()
            .to_vec();

        let err = s
            .book
            .release_funds(s.seller, id, &sig, BUYER_A)
            .unwrap_err();
        assert!(matches!(err, CovenantError::SignerMismatch { .. }));
        assert!(s.book.order(id).unwrap().is_listed());
    }

    #[test]
    fn malformed_signature_rejected_as_signer_mismatch() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let err = s
            .book
            .release_funds(s.seller, id, &[0u8; 65], BUYER_A)
            .unwrap_err();
        assert!(matches!(
            err,
            CovenantError::SignerMismatch {
                recovered: Address::ZERO,
                ..
            }
        ));
    }

    #[test]
    fn registration_after_release_fails_not_listed() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let sig = s.sign_release(BUYER_A, 123);
        s.book.release_funds(s.seller, id, &sig, BUYER_A).unwrap();

        let err = s.book.register_buyer(BUYER_B, id, 345).unwrap_err();
        assert!(matches!(err, CovenantError::NotListed { .. }));
    }

    #[test]
    fn failed_payout_rolls_back_and_is_retryable() {
        let mut s = setup();
        s.fund_token(1000);
        let id = s.list_token(1000);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();

        // Seller revokes the allowance between listing and release.
        let seller = s.seller;
        s.book.custody_mut().token_mut(TOKEN).approve(seller, BOOK, 0);

        let sig = s.sign_release(BUYER_A, 123);
        let err = s
            .book
            .release_funds(seller, id, &sig, BUYER_A)
            .unwrap_err();
        assert!(matches!(err, CovenantError::TransactionFailed { .. }));

        // Rolled back to LISTED; re-approving makes the same release pass.
        assert!(s.book.order(id).unwrap().is_listed());
        s.book
            .custody_mut()
            .token_mut(TOKEN)
            .approve(seller, BOOK, 1000);
        s.book.release_funds(seller, id, &sig, BUYER_A).unwrap();
        assert_eq!(s.book.order(id).unwrap().state, OrderState::Released);
        assert_eq!(
            s.book.custody().token(TOKEN).unwrap().balance_of(BUYER_A),
            1000
        );
    }

    #[test]
    fn message_is_seller_only() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 777).unwrap();

        assert_eq!(s.book.message(s.seller, id, BUYER_A).unwrap(), 777);
        let err = s.book.message(BUYER_A, id, BUYER_A).unwrap_err();
        assert!(matches!(err, CovenantError::NotSeller { .. }));
        let err = s.book.message(s.seller, id, BUYER_B).unwrap_err();
        assert!(matches!(err, CovenantError::BuyerNotRegistered { .. }));
    }

    #[test]
    fn event_log_records_lifecycle() {
        let mut s = setup();
        s.fund_native(s.seller, 1);
        let id = s.list_native(1);
        s.book.register_buyer(BUYER_A, id, 123).unwrap();
        let sig = s.sign_release(BUYER_A, 123);
        s.book.release_funds(s.seller, id, &sig, BUYER_A).unwrap();

        let events = s.book.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], BookEvent::OrderListed { .. }));
        assert!(matches!(events[1], BookEvent::BuyerRegistered { .. }));
        match &events[2] {
            BookEvent::FundsReleased {
                buyer,
                recovered_signer,
                signature,
                ..
            } => {
                assert_eq!(*buyer, BUYER_A);
                assert_eq!(*recovered_signer, s.seller);
                assert_eq!(signature, &sig);
            }
            other => panic!("expected FundsReleased, got {other:?}"),
        }
    }
}
