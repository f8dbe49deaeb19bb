//! Settlement idempotency guard: an order settles at most once.
//!
//! Settling an order a second time returns
//! [`ClearswapError::OrderAlreadySettled`]. Settled ids are never
//! forgotten: submitted orders and their order book matches live for the
//! engine's lifetime, so the record of their settlement must too.

use std::collections::HashSet;

use clearswap_types::{ClearswapError, OrderId, Result};

/// Permanent set of settled order ids.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    settled: HashSet<OrderId>,
}

impl IdempotencyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if `order` has already been settled.
    pub fn ensure_unsettled(&self, order: OrderId) -> Result<()> {
        if self.settled.contains(&order) {
            return Err(ClearswapError::OrderAlreadySettled(order));
        }
        Ok(())
    }

    /// Mark an order as settled.
    ///
    /// # Errors
    /// Returns [`ClearswapError::OrderAlreadySettled`] if `order` was
    /// already marked.
    pub fn mark_settled(&mut self, order: OrderId) -> Result<()> {
        if !self.settled.insert(order) {
            return Err(ClearswapError::OrderAlreadySettled(order));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_settled(&self, order: &OrderId) -> bool {
        self.settled.contains(order)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}
