//! Custody of the value locked in open swaps.

use std::collections::HashMap;

use clearswap_types::{ClearswapError, Result, TokenCode, TraderId};

/// Holds value on behalf of the escrow.
///
/// `lock` pulls value from a party into custody; `release` pays value out
/// of custody. Either call succeeds entirely or changes nothing.
pub trait ValueVault {
    fn lock(&mut self, from: TraderId, amount: u128) -> Result<()>;
    fn release(&mut self, to: TraderId, amount: u128) -> Result<()>;
}

/// Vault over in-memory balances of a single native token.
#[derive(Debug)]
pub struct InMemoryVault {
    token: TokenCode,
    balances: HashMap<TraderId, u128>,
    locked: u128,
}

impl InMemoryVault {
    #[must_use]
    pub fn new(token: TokenCode) -> Self {
        Self {
            token,
            balances: HashMap::new(),
            locked: 0,
        }
    }

    #[must_use]
    pub fn token(&self) -> TokenCode {
        self.token
    }

    pub fn deposit(&mut self, trader: TraderId, amount: u128) -> Result<()> {
        let entry = self.balances.entry(trader).or_insert(0);
        *entry = entry.checked_add(amount).ok_or_else(|| {
            ClearswapError::ArithmeticOverflow(format!("vault deposit of {amount} for {trader}"))
        })?;
        Ok(())
    }

    #[must_use]
    pub fn balance(&self, trader: TraderId) -> u128 {
        self.balances.get(&trader).copied().unwrap_or(0)
    }

    /// Total value currently in custody.
    #[must_use]
    pub fn locked(&self) -> u128 {
        self.locked
    }
}

impl ValueVault for InMemoryVault {
    fn lock(&mut self, from: TraderId, amount: u128) -> Result<()> {
        let available = self.balance(from);
        if available < amount {
            return Err(ClearswapError::InsufficientBalance {
                token: self.token,
                needed: amount,
                available,
            });
        }
        let locked = self.locked.checked_add(amount).ok_or_else(|| {
            ClearswapError::ArithmeticOverflow(format!("locking {amount} {}", self.token))
        })?;
        self.balances.insert(from, available - amount);
        self.locked = locked;
        Ok(())
    }

    fn release(&mut self, to: TraderId, amount: u128) -> Result<()> {
        if self.locked < amount {
            return Err(ClearswapError::SupplyInvariantViolation {
                reason: format!(
                    "release of {amount} {} exceeds custody {}",
                    self.token, self.locked
                ),
            });
        }
        let credited = self.balance(to).checked_add(amount).ok_or_else(|| {
            ClearswapError::ArithmeticOverflow(format!("crediting {amount} {} to {to}", self.token))
        })?;
        self.locked -= amount;
        self.balances.insert(to, credited);
        Ok(())
    }
}
