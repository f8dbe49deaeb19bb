//! Supply conservation invariant checker.
//!
//! ```text
//! ∀ token: Σ balances == Σ deposits − Σ withdrawals
//! ```
//!
//! Settlement only moves value between accounts (including the fee
//! recipient), so any drift means a ledger bug.

use std::collections::{BTreeSet, HashMap};

use clearswap_types::{ClearswapError, Result, TokenCode};

/// Per-token deposit and withdrawal totals since genesis.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<TokenCode, u128>,
    withdrawals: HashMap<TokenCode, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, token: TokenCode, amount: u128) {
        let total = self.deposits.entry(token).or_insert(0);
        *total = total.saturating_add(amount);
    }

    pub fn record_withdrawal(&mut self, token: TokenCode, amount: u128) {
        let total = self.withdrawals.entry(token).or_insert(0);
        *total = total.saturating_add(amount);
    }

    #[must_use]
    pub fn total_deposits(&self, token: TokenCode) -> u128 {
        self.deposits.get(&token).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, token: TokenCode) -> u128 {
        self.withdrawals.get(&token).copied().unwrap_or(0)
    }

    /// Expected total supply: deposits − withdrawals.
    #[must_use]
    pub fn expected_supply(&self, token: TokenCode) -> u128 {
        self.total_deposits(token)
            .saturating_sub(self.total_withdrawals(token))
    }

    /// Compare the actual sum of balances against the expected supply.
    ///
    /// # Errors
    /// Returns [`ClearswapError::SupplyInvariantViolation`] if they differ.
    pub fn verify(&self, token: TokenCode, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(token);
        if actual_supply != expected {
            return Err(ClearswapError::SupplyInvariantViolation {
                reason: format!(
                    "token {token}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(token),
                    self.total_withdrawals(token),
                ),
            });
        }
        Ok(())
    }

    /// Every token that has seen a deposit or withdrawal, sorted.
    #[must_use]
    pub fn tracked_tokens(&self) -> Vec<TokenCode> {
        let tokens: BTreeSet<TokenCode> = self
            .deposits
            .keys()
            .chain(self.withdrawals.keys())
            .copied()
            .collect();
        tokens.into_iter().collect()
    }
}
