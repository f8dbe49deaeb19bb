//! The hash-time-locked swap escrow.
//!
//! Every state-changing call records the new swap status first and only
//! then moves value through the vault. If the vault refuses, the record is
//! put back exactly as it was, so a swap can never be both paid out and
//! still open, and `redeem` and `refund` can never both succeed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clearswap_types::{
    swap_id, AtomicSwap, ClearswapError, Result, Secret, SecretHash, SwapId, SwapStatus, TraderId,
};

use crate::clock::Clock;
use crate::vault::ValueVault;

/// HTLC escrow over a clock and a value vault.
pub struct AtomicSwapEscrow<C, V> {
    clock: C,
    vault: V,
    swaps: HashMap<SwapId, AtomicSwap>,
}

impl<C: Clock, V: ValueVault> AtomicSwapEscrow<C, V> {
    #[must_use]
    pub fn new(clock: C, vault: V) -> Self {
        Self {
            clock,
            vault,
            swaps: HashMap::new(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    /// Status of a swap; unknown ids are [`SwapStatus::Empty`].
    #[must_use]
    pub fn status(&self, id: &SwapId) -> SwapStatus {
        self.swaps.get(id).map_or(SwapStatus::Empty, |swap| swap.status)
    }

    // -----------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------

    /// Open a swap locking `value` from `initiator` for `recipient`.
    ///
    /// The id is derived from `secret_hash` and the current time in unix
    /// seconds (see [`swap_id`]).
    ///
    /// # Errors
    /// [`ClearswapError::SwapAlreadyOpened`] if a swap with the same
    /// commitment was opened in the same second, or the vault's error if
    /// the initiator cannot fund `value`.
    pub fn initiate(
        &mut self,
        initiator: TraderId,
        secret_hash: SecretHash,
        recipient: TraderId,
        expiry: DateTime<Utc>,
        value: u128,
    ) -> Result<SwapId> {
        let now = self.clock.now();
        let timestamp = u64::try_from(now.timestamp()).map_err(|_| {
            ClearswapError::Configuration(format!("{} reads before the unix epoch", self.clock.name()))
        })?;
        let id = swap_id(&secret_hash, timestamp);
        if self.status(&id) != SwapStatus::Empty {
            return Err(ClearswapError::SwapAlreadyOpened(id));
        }

        self.swaps.insert(
            id,
            AtomicSwap {
                id,
                initiator,
                recipient,
                secret_hash,
                value,
                expiry,
                created_at: now,
                status: SwapStatus::Open,
                revealed_secret: None,
            },
        );
        if let Err(err) = self.vault.lock(initiator, value) {
            self.swaps.remove(&id);
            return Err(err);
        }

        tracing::info!(
            swap = %id,
            initiator = %initiator,
            recipient = %recipient,
            value,
            expiry = %expiry,
            "Swap initiated"
        );
        Ok(id)
    }

    /// Redeem an open swap by revealing its secret. Pays the recipient.
    ///
    /// No time restriction applies: an expired swap that has not been
    /// refunded can still be redeemed.
    pub fn redeem(&mut self, id: &SwapId, secret: Secret) -> Result<()> {
        let swap = self
            .swaps
            .get_mut(id)
            .filter(|swap| swap.status == SwapStatus::Open)
            .ok_or(ClearswapError::SwapNotOpen(*id))?;
        if !swap.secret_matches(&secret) {
            tracing::warn!(swap = %id, "Redeem rejected: secret does not match commitment");
            return Err(ClearswapError::InvalidSecret(*id));
        }

        let prior = swap.clone();
        swap.status = SwapStatus::Closed;
        swap.revealed_secret = Some(secret);
        if let Err(err) = self.vault.release(prior.recipient, prior.value) {
            *swap = prior;
            return Err(err);
        }

        tracing::info!(swap = %id, recipient = %prior.recipient, value = prior.value, "Swap redeemed");
        Ok(())
    }

    /// Return an open, expired swap's value to its initiator.
    pub fn refund(&mut self, id: &SwapId) -> Result<()> {
        let now = self.clock.now();
        let swap = self
            .swaps
            .get_mut(id)
            .filter(|swap| swap.is_refundable_at(now))
            .ok_or(ClearswapError::SwapNotExpirable(*id))?;

        let prior = swap.clone();
        swap.status = SwapStatus::Expired;
        if let Err(err) = self.vault.release(prior.initiator, prior.value) {
            *swap = prior;
            return Err(err);
        }

        tracing::info!(swap = %id, initiator = %prior.initiator, value = prior.value, "Swap refunded");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn initiatable(&self, id: &SwapId) -> bool {
        self.status(id) == SwapStatus::Empty
    }

    #[must_use]
    pub fn redeemable(&self, id: &SwapId) -> bool {
        self.status(id) == SwapStatus::Open
    }

    #[must_use]
    pub fn refundable(&self, id: &SwapId) -> bool {
        let now = self.clock.now();
        self.swaps
            .get(id)
            .is_some_and(|swap| swap.is_refundable_at(now))
    }

    /// Full details of an initiated swap.
    ///
    /// # Errors
    /// [`ClearswapError::SwapNotOpen`] if the swap was never initiated.
    pub fn audit(&self, id: &SwapId) -> Result<&AtomicSwap> {
        self.swaps.get(id).ok_or(ClearswapError::SwapNotOpen(*id))
    }

    /// The secret revealed by a redemption.
    ///
    /// # Errors
    /// [`ClearswapError::SwapNotClosed`] unless the swap has been redeemed.
    pub fn audit_secret(&self, id: &SwapId) -> Result<Secret> {
        self.swaps
            .get(id)
            .filter(|swap| swap.status == SwapStatus::Closed)
            .and_then(|swap| swap.revealed_secret)
            .ok_or(ClearswapError::SwapNotClosed(*id))
    }
}
