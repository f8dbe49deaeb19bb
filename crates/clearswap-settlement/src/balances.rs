//! In-memory balances ledger.
//!
//! Balances are kept per `(trader, token)` in the token's native unit. Every
//! mutation is atomic: a batch of transfers is staged against a scratch
//! copy of the touched accounts and only written back once every leg has
//! been funded.

use std::collections::HashMap;

use clearswap_types::{ClearswapError, Result, TokenCode, TraderId, Transfer};

use crate::ports::BalancesLedger;
use crate::supply_conservation::SupplyConservation;

#[derive(Debug, Default)]
pub struct InMemoryBalances {
    balances: HashMap<(TraderId, TokenCode), u128>,
    supply: SupplyConservation,
}

impl InMemoryBalances {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` from outside the ledger.
    ///
    /// # Errors
    /// Returns [`ClearswapError::ArithmeticOverflow`] if the balance would
    /// exceed `u128::MAX`.
    pub fn deposit(&mut self, trader: TraderId, token: TokenCode, amount: u128) -> Result<()> {
        let entry = self.balances.entry((trader, token)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or_else(|| {
            ClearswapError::ArithmeticOverflow(format!("deposit of {amount} {token} for {trader}"))
        })?;
        self.supply.record_deposit(token, amount);
        Ok(())
    }

    /// Debit `amount` to outside the ledger.
    ///
    /// # Errors
    /// Returns [`ClearswapError::InsufficientBalance`] if the trader holds
    /// less than `amount`.
    pub fn withdraw(&mut self, trader: TraderId, token: TokenCode, amount: u128) -> Result<()> {
        let available = self.balance(trader, token);
        if available < amount {
            return Err(ClearswapError::InsufficientBalance {
                token,
                needed: amount,
                available,
            });
        }
        self.balances.insert((trader, token), available - amount);
        self.supply.record_withdrawal(token, amount);
        Ok(())
    }

    /// Check supply conservation for one token.
    pub fn verify_supply(&self, token: TokenCode) -> Result<()> {
        let actual = self
            .balances
            .iter()
            .filter(|((_, t), _)| *t == token)
            .try_fold(0u128, |sum, (_, amount)| sum.checked_add(*amount))
            .ok_or_else(|| ClearswapError::ArithmeticOverflow(format!("total supply of {token}")))?;
        self.supply.verify(token, actual)
    }

    /// Check supply conservation for every token ever deposited.
    pub fn verify_all_supply(&self) -> Result<()> {
        self.supply
            .tracked_tokens()
            .into_iter()
            .try_for_each(|token| self.verify_supply(token))
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }
}

impl BalancesLedger for InMemoryBalances {
    fn balance(&self, trader: TraderId, token: TokenCode) -> u128 {
        self.balances.get(&(trader, token)).copied().unwrap_or(0)
    }

    fn apply(&mut self, transfers: &[Transfer]) -> Result<()> {
        let mut staged: HashMap<(TraderId, TokenCode), u128> = HashMap::new();

        for transfer in transfers {
            let from_key = (transfer.from, transfer.token);
            let available = *staged
                .entry(from_key)
                .or_insert_with(|| self.balance(transfer.from, transfer.token));
            if available < transfer.amount {
                tracing::warn!(
                    trader = %transfer.from,
                    token = %transfer.token,
                    needed = transfer.amount,
                    available,
                    "Transfer batch rejected: insufficient balance"
                );
                return Err(ClearswapError::InsufficientBalance {
                    token: transfer.token,
                    needed: transfer.amount,
                    available,
                });
            }
            staged.insert(from_key, available - transfer.amount);

            let to_key = (transfer.to, transfer.token);
            let current = *staged
                .entry(to_key)
                .or_insert_with(|| self.balance(transfer.to, transfer.token));
            let credited = current.checked_add(transfer.amount).ok_or_else(|| {
                ClearswapError::ArithmeticOverflow(format!(
                    "credit of {} {} to {}",
                    transfer.amount, transfer.token, transfer.to
                ))
            })?;
            staged.insert(to_key, credited);
        }

        self.balances.extend(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_and_withdraw() {
        let mut ledger = InMemoryBalances::new();
        let alice = TraderId::new();
        ledger.deposit(alice, TokenCode::REN, 1_000).unwrap();
        ledger.withdraw(alice, TokenCode::REN, 400).unwrap();
        assert_eq!(ledger.balance(alice, TokenCode::REN), 600);
        assert!(ledger.verify_supply(TokenCode::REN).is_ok());
    }

    #[test]
    fn withdraw_insufficient() {
        let mut ledger = InMemoryBalances::new();
        let alice = TraderId::new();
        ledger.deposit(alice, TokenCode::REN, 10).unwrap();
        let err = ledger.withdraw(alice, TokenCode::REN, 11).unwrap_err();
        assert!(matches!(
            err,
            ClearswapError::InsufficientBalance {
                needed: 11,
                available: 10,
                ..
            }
        ));
        assert_eq!(ledger.balance(alice, TokenCode::REN), 10);
    }

    #[test]
    fn apply_moves_value() {
        let mut ledger = InMemoryBalances::new();
        let (alice, bob) = (TraderId::new(), TraderId::new());
        ledger.deposit(alice, TokenCode::DGX, 100).unwrap();
        ledger.deposit(bob, TokenCode::REN, 50).unwrap();

        ledger
            .apply(&[
                Transfer::new(TokenCode::DGX, alice, bob, 100),
                Transfer::new(TokenCode::REN, bob, alice, 50),
            ])
            .unwrap();

        assert_eq!(ledger.balance(alice, TokenCode::DGX), 0);
        assert_eq!(ledger.balance(bob, TokenCode::DGX), 100);
        assert_eq!(ledger.balance(alice, TokenCode::REN), 50);
        assert!(ledger.verify_all_supply().is_ok());
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut ledger = InMemoryBalances::new();
        let (alice, bob) = (TraderId::new(), TraderId::new());
        ledger.deposit(alice, TokenCode::DGX, 100).unwrap();
        ledger.deposit(bob, TokenCode::REN, 49).unwrap();

        let err = ledger
            .apply(&[
                Transfer::new(TokenCode::DGX, alice, bob, 100),
                Transfer::new(TokenCode::REN, bob, alice, 50),
            ])
            .unwrap_err();
        assert!(matches!(err, ClearswapError::InsufficientBalance { .. }));

        // First leg was not applied.
        assert_eq!(ledger.balance(alice, TokenCode::DGX), 100);
        assert_eq!(ledger.balance(bob, TokenCode::DGX), 0);
        assert_eq!(ledger.balance(bob, TokenCode::REN), 49);
    }

    #[test]
    fn repeated_debits_are_cumulative() {
        let mut ledger = InMemoryBalances::new();
        let (alice, bob, carol) = (TraderId::new(), TraderId::new(), TraderId::new());
        ledger.deposit(alice, TokenCode::ETH, 10).unwrap();

        let err = ledger
            .apply(&[
                Transfer::new(TokenCode::ETH, alice, bob, 6),
                Transfer::new(TokenCode::ETH, alice, carol, 6),
            ])
            .unwrap_err();
        assert!(matches!(err, ClearswapError::InsufficientBalance { available: 4, .. }));
        assert_eq!(ledger.balance(alice, TokenCode::ETH), 10);
    }
}
