//! In-memory order book.
//!
//! Tracks only what settlement needs: each order's state, its owner, and
//! the counterparty it was confirmed against.
//!
//! ```text
//!   UNDEFINED ──open──▶ OPEN ──confirm──▶ CONFIRMED
//!                        │
//!                        └──cancel──▶ CANCELED
//! ```

use std::collections::HashMap;

use clearswap_types::{ClearswapError, OrderId, OrderState, Result, TraderId};

use crate::ports::OrderBook;

#[derive(Debug, Clone, Copy)]
struct BookEntry {
    state: OrderState,
    trader: TraderId,
    matched_with: Option<OrderId>,
}

/// Order book state kept in a map.
#[derive(Debug, Default)]
pub struct InMemoryOrderBook {
    entries: HashMap<OrderId, BookEntry>,
}

impl InMemoryOrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an order for `trader`.
    ///
    /// # Errors
    /// Returns [`ClearswapError::DuplicateOrder`] if the order already exists.
    pub fn open(&mut self, order: OrderId, trader: TraderId) -> Result<()> {
        if self.entries.contains_key(&order) {
            return Err(ClearswapError::DuplicateOrder(order));
        }
        self.entries.insert(
            order,
            BookEntry {
                state: OrderState::Open,
                trader,
                matched_with: None,
            },
        );
        Ok(())
    }

    /// Confirm two open orders against each other.
    ///
    /// # Errors
    /// Returns [`ClearswapError::OrderNotFound`] for unknown orders and
    /// [`ClearswapError::IncompatibleOrders`] if either is not open.
    pub fn confirm(&mut self, buy: OrderId, sell: OrderId) -> Result<()> {
        for id in [buy, sell] {
            let entry = self.entries.get(&id).ok_or(ClearswapError::OrderNotFound(id))?;
            if entry.state != OrderState::Open {
                return Err(ClearswapError::incompatible(format!(
                    "order {id} is {}, not OPEN",
                    entry.state
                )));
            }
        }
        for (id, other) in [(buy, sell), (sell, buy)] {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.state = OrderState::Confirmed;
                entry.matched_with = Some(other);
            }
        }
        Ok(())
    }

    /// Cancel an open order.
    ///
    /// # Errors
    /// Returns [`ClearswapError::OrderNotFound`] or, if the order is no longer
    /// open, [`ClearswapError::IncompatibleOrders`].
    pub fn cancel(&mut self, order: OrderId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&order)
            .ok_or(ClearswapError::OrderNotFound(order))?;
        if entry.state != OrderState::Open {
            return Err(ClearswapError::incompatible(format!(
                "order {order} is {}, cannot cancel",
                entry.state
            )));
        }
        entry.state = OrderState::Canceled;
        Ok(())
    }
}

impl OrderBook for InMemoryOrderBook {
    fn order_state(&self, order: OrderId) -> OrderState {
        self.entries
            .get(&order)
            .map_or(OrderState::Undefined, |entry| entry.state)
    }

    fn order_trader(&self, order: OrderId) -> Option<TraderId> {
        self.entries.get(&order).map(|entry| entry.trader)
    }

    fn order_match(&self, order: OrderId) -> Option<OrderId> {
        self.entries.get(&order).and_then(|entry| entry.matched_with)
    }
}
