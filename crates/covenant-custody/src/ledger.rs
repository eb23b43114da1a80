//! Balance ledgers backing custody.
//!
//! Both ledgers follow the same discipline: check everything, then
//! mutate — a failed operation leaves every balance exactly as it was.

use std::collections::HashMap;

use covenant_types::{Address, CovenantError, Result};

/// Per-account native-unit balances, in base units.
#[derive(Debug, Clone, Default)]
pub struct NativeLedger {
    balances: HashMap<Address, u128>,
}

impl NativeLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account (faucet / test funding / inbound value).
    pub fn deposit(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_default() += amount;
    }

    /// Current balance of an account.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Move value between accounts.
    ///
    /// # Errors
    /// Returns [`CovenantError::InsufficientFunds`] if `from` holds less
    /// than `amount`; no balance changes in that case.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CovenantError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        *self.balances.entry(from).or_default() -= amount;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

/// A standard fungible-token balance/allowance ledger.
///
/// `transfer_from` is the delegated-transfer operation: a spender the
/// owner pre-authorized moves owner funds, consuming the allowance.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, u128>,
    /// (owner, spender) → remaining authorized amount.
    allowances: HashMap<(Address, Address), u128>,
}

impl TokenLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account (token issuance / test funding).
    pub fn mint(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_default() += amount;
    }

    /// Current balance of an account.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Set the spender's allowance over the owner's balance.
    /// Overwrites any previous value, like a standard `approve`.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Remaining authorized amount for (owner, spender).
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Delegated transfer: `spender` moves `amount` of `owner`'s balance
    /// to `to`, consuming that much allowance.
    ///
    /// # Errors
    /// Returns [`CovenantError::InsufficientFunds`] if either the
    /// allowance or the owner's balance is short; nothing changes then.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        owner: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        let authorized = self.allowance(owner, spender);
        if authorized < amount {
            return Err(CovenantError::InsufficientFunds {
                needed: amount,
                available: authorized,
            });
        }
        let balance = self.balance_of(owner);
        if balance < amount {
            return Err(CovenantError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }
        self.allowances.insert((owner, spender), authorized - amount);
        *self.balances.entry(owner).or_default() -= amount;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }
}
