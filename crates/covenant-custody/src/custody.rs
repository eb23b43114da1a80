//! Custody facade — the only surface the order book moves value through.
//!
//! Two movements exist, matching the two ends of the order lifecycle:
//! deposit at listing (native only — token orders are allowance-checked,
//! not pulled) and payout at release. Payout failures of either asset
//! kind surface uniformly as `TransactionFailed`.

use std::collections::HashMap;

use covenant_types::{Address, AssetKind, CovenantError, Result};

use crate::ledger::{NativeLedger, TokenLedger};

/// Holds the native ledger and all known token ledgers, and executes
/// custody movements on behalf of one book account.
#[derive(Debug, Default)]
pub struct AssetCustody {
    /// The book's custody account. Native deposits sit here; token
    /// sellers grant their allowance to it.
    book_address: Address,
    native: NativeLedger,
    /// Token ledger address → ledger.
    tokens: HashMap<Address, TokenLedger>,
}

impl AssetCustody {
    /// Create custody operating on behalf of the given book account.
    #[must_use]
    pub fn new(book_address: Address) -> Self {
        Self {
            book_address,
            native: NativeLedger::new(),
            tokens: HashMap::new(),
        }
    }

    /// The book account custody operates for.
    #[must_use]
    pub fn book_address(&self) -> Address {
        self.book_address
    }

    /// The native ledger.
    #[must_use]
    pub fn native(&self) -> &NativeLedger {
        &self.native
    }

    /// Mutable native ledger access (funding accounts).
    pub fn native_mut(&mut self) -> &mut NativeLedger {
        &mut self.native
    }

    /// The token ledger at `token`, if known.
    #[must_use]
    pub fn token(&self, token: Address) -> Option<&TokenLedger> {
        self.tokens.get(&token)
    }

    /// Mutable access to the token ledger at `token`, creating an empty
    /// ledger on first use (minting / approving in tests and bootstrap).
    pub fn token_mut(&mut self, token: Address) -> &mut TokenLedger {
        self.tokens.entry(token).or_default()
    }

    /// Pull an attached native value from the seller into custody.
    ///
    /// # Errors
    /// Returns [`CovenantError::InsufficientFunds`] if the seller's
    /// native balance is short of `attached_value`.
    pub fn deposit_native(&mut self, seller: Address, attached_value: u128) -> Result<()> {
        self.native.transfer(seller, self.book_address, attached_value)
    }

    /// Verify a token listing: seller balance covers `amount` and the
    /// seller pre-authorized the book to move exactly `amount`.
    ///
    /// Nothing is pulled here — the transfer happens at release time via
    /// the allowance, which must still be valid then.
    ///
    /// # Errors
    /// Returns [`CovenantError::InsufficientFunds`] on either mismatch.
    pub fn check_token_listing(
        &self,
        token: Address,
        seller: Address,
        amount: u128,
    ) -> Result<()> {
        let ledger = self
            .tokens
            .get(&token)
            .ok_or(CovenantError::InsufficientFunds {
                needed: amount,
                available: 0,
            })?;

        let balance = ledger.balance_of(seller);
        if balance < amount {
            return Err(CovenantError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }

        let authorized = ledger.allowance(seller, self.book_address);
        if authorized != amount {
            return Err(CovenantError::InsufficientFunds {
                needed: amount,
                available: authorized,
            });
        }
        Ok(())
    }

    /// Execute the release-time transfer to the buyer.
    ///
    /// Native: moves `amount` base units out of the custody account.
    /// Token: delegated transfer straight from the seller's balance,
    /// consuming the allowance granted at listing.
    ///
    /// # Errors
    /// Any underlying failure surfaces as
    /// [`CovenantError::TransactionFailed`].
    pub fn payout(
        &mut self,
        asset: AssetKind,
        seller: Address,
        buyer: Address,
        amount: u128,
    ) -> Result<()> {
        let result = match asset {
            AssetKind::Native => self.native.transfer(self.book_address, buyer, amount),
            AssetKind::Token(token) => {
                let book = self.book_address;
                match self.tokens.get_mut(&token) {
                    Some(ledger) => ledger.transfer_from(book, seller, buyer, amount),
                    None => Err(CovenantError::InsufficientFunds {
                        needed: amount,
                        available: 0,
                    }),
                }
            }
        };

        result.map_err(|err| {
            tracing::warn!(%asset, %buyer, amount, %err, "custody payout failed");
            CovenantError::TransactionFailed {
                reason: err.to_string(),
            }
        })
    }
}
