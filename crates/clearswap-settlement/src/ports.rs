//! Capabilities the settlement engine consumes but does not own.
//!
//! Each port is a narrow trait so the engine can be driven by in-memory
//! implementations (see [`crate::registry`], [`crate::orderbook`],
//! [`crate::balances`]) or by adapters over real ledgers.

use clearswap_types::{
    BrokerId, OrderId, OrderState, Result, TokenCode, TokenDetails, TraderId, Transfer,
};

/// Token metadata lookup.
pub trait TokenRegistry {
    /// Details of a registered token, or `None` if it is not listed.
    fn token_details(&self, code: TokenCode) -> Option<TokenDetails>;
}

/// Answers whether a broker may currently countersign orders.
pub trait BrokerVerifier: Send + Sync {
    fn is_authorized(&self, broker: &BrokerId) -> bool;
}

/// The external order book: order existence, status, owner and pairing.
pub trait OrderBook {
    fn order_state(&self, order: OrderId) -> OrderState;

    /// The trader who opened `order`.
    fn order_trader(&self, order: OrderId) -> Option<TraderId>;

    /// The order `order` was confirmed against, if any.
    fn order_match(&self, order: OrderId) -> Option<OrderId>;
}

/// Per-trader, per-token balances.
pub trait BalancesLedger {
    /// Balance in the token's native unit. Unknown accounts hold zero.
    fn balance(&self, trader: TraderId, token: TokenCode) -> u128;

    /// Apply all transfers, or none of them.
    ///
    /// # Errors
    /// Returns [`clearswap_types::ClearswapError::InsufficientBalance`] if
    /// any debit cannot be funded; the ledger is then unchanged.
    fn apply(&mut self, transfers: &[Transfer]) -> Result<()>;
}
