//! Error types for the Clearswap settlement engine and swap escrow.
//!
//! All errors use the `CS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order validation errors
//! - 2xx: Resolution errors (registries, order book, ledger)
//! - 3xx: Atomic swap state errors
//! - 4xx: Settlement state errors
//! - 9xx: General / internal errors
//!
//! Every variant also belongs to an [`ErrorClass`], which tells the caller
//! whether retrying with different inputs, re-querying state, or fixing a
//! missing dependency is the right reaction.

use thiserror::Error;

use crate::{BrokerId, OrderId, SettlementId, SwapId, TokenCode, TraderId};

/// Central error enum for all Clearswap operations.
#[derive(Debug, Error)]
pub enum ClearswapError {
    // =================================================================
    // Order Validation Errors (1xx)
    // =================================================================
    /// The two orders cannot be matched against each other.
    #[error("CS_ERR_100: Incompatible orders: {reason}")]
    IncompatibleOrders { reason: String },

    /// Both orders belong to the same trader.
    #[error("CS_ERR_101: Orders from same trader: {0}")]
    SelfTrade(TraderId),

    /// The settlement id is not registered or not handled by this engine.
    #[error("CS_ERR_102: Invalid settlement id: {0}")]
    InvalidSettlementMode(SettlementId),

    /// Atomic settlement requires exactly one native-ledger token.
    #[error("CS_ERR_103: Non-native atomic swaps are not supported: {priority}/{non_priority}")]
    UnsupportedAtomicPair {
        priority: TokenCode,
        non_priority: TokenCode,
    },

    /// The token's decimal precision exceeds what the arithmetic supports.
    #[error("CS_ERR_104: Unsupported token precision: token {token} has {decimals} decimals (max {max})")]
    UnsupportedTokenPrecision {
        token: TokenCode,
        decimals: u8,
        max: u8,
    },

    /// The order failed structural validation.
    #[error("CS_ERR_105: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Resolution Errors (2xx)
    // =================================================================
    /// The token is not present in the registry.
    #[error("CS_ERR_200: Token not registered: {0}")]
    TokenNotRegistered(TokenCode),

    /// The order has not been submitted for settlement.
    #[error("CS_ERR_201: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order book does not report the order as confirmed.
    #[error("CS_ERR_202: Order not confirmed: {0}")]
    OrderNotConfirmed(OrderId),

    /// The order book did not match these two orders with each other.
    #[error("CS_ERR_203: Orders not matched: {buy} / {sell}")]
    OrdersNotMatched { buy: OrderId, sell: OrderId },

    /// The broker is not authorized to countersign orders.
    #[error("CS_ERR_204: Unauthorized broker: {0}")]
    UnauthorizedBroker(BrokerId),

    /// The broker countersignature does not verify.
    #[error("CS_ERR_205: Invalid broker signature on order {0}")]
    InvalidBrokerSignature(OrderId),

    /// A ledger debit could not be funded.
    #[error("CS_ERR_206: Insufficient balance of token {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: TokenCode,
        needed: u128,
        available: u128,
    },

    /// The order book's trader for this order differs from the order's trader.
    #[error("CS_ERR_207: Unauthorized trader for order {0}")]
    UnauthorizedTrader(OrderId),

    // =================================================================
    // Atomic Swap Errors (3xx)
    // =================================================================
    /// A swap with this id has already been opened.
    #[error("CS_ERR_300: Swap opened previously: {0}")]
    SwapAlreadyOpened(SwapId),

    /// The swap is not open (never opened, or already closed/expired).
    #[error("CS_ERR_301: Swap not open: {0}")]
    SwapNotOpen(SwapId),

    /// The swap cannot be refunded (not open, or expiry not reached).
    #[error("CS_ERR_302: Swap not expirable: {0}")]
    SwapNotExpirable(SwapId),

    /// The secret does not hash to the swap's commitment.
    #[error("CS_ERR_303: Invalid secret for swap {0}")]
    InvalidSecret(SwapId),

    /// The swap has not been redeemed, so no secret is available.
    #[error("CS_ERR_304: Swap not closed: {0}")]
    SwapNotClosed(SwapId),

    // =================================================================
    // Settlement State Errors (4xx)
    // =================================================================
    /// An order has already been settled (idempotency guard).
    #[error("CS_ERR_400: Order already settled: {0}")]
    OrderAlreadySettled(OrderId),

    /// An order with this id was already submitted.
    #[error("CS_ERR_401: Order already submitted: {0}")]
    DuplicateOrder(OrderId),

    /// Supply conservation invariant violated.
    #[error("CS_ERR_402: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Fixed-point arithmetic exceeded its intermediate width.
    #[error("CS_ERR_900: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("CS_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("CS_ERR_902: Serialization error: {0}")]
    Serialization(String),
}

/// Taxonomy of failures, independent of the specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Caller error; retry with different inputs. No state was mutated.
    Validation,
    /// Ordering or state conflict; re-query current state before retrying.
    StateConflict,
    /// A registry, order book, or ledger lookup failed.
    Resolution,
    /// Arithmetic, configuration, or serialization failure.
    Internal,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::StateConflict => write!(f, "STATE_CONFLICT"),
            Self::Resolution => write!(f, "RESOLUTION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl ClearswapError {
    /// Which taxonomy class this error belongs to.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::IncompatibleOrders { .. }
            | Self::SelfTrade(_)
            | Self::InvalidSettlementMode(_)
            | Self::UnsupportedAtomicPair { .. }
            | Self::UnsupportedTokenPrecision { .. }
            | Self::InvalidOrder { .. } => ErrorClass::Validation,

            Self::SwapAlreadyOpened(_)
            | Self::SwapNotOpen(_)
            | Self::SwapNotExpirable(_)
            | Self::InvalidSecret(_)
            | Self::SwapNotClosed(_)
            | Self::OrderAlreadySettled(_)
            | Self::DuplicateOrder(_) => ErrorClass::StateConflict,

            Self::TokenNotRegistered(_)
            | Self::OrderNotFound(_)
            | Self::OrderNotConfirmed(_)
            | Self::OrdersNotMatched { .. }
            | Self::UnauthorizedBroker(_)
            | Self::InvalidBrokerSignature(_)
            | Self::InsufficientBalance { .. }
            | Self::UnauthorizedTrader(_) => ErrorClass::Resolution,

            Self::SupplyInvariantViolation { .. }
            | Self::ArithmeticOverflow(_)
            | Self::Configuration(_)
            | Self::Serialization(_) => ErrorClass::Internal,
        }
    }

    /// Shorthand for [`ClearswapError::IncompatibleOrders`].
    #[must_use]
    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::IncompatibleOrders {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ClearswapError>;

impl From<serde_json::Error> for ClearswapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = ClearswapError::SelfTrade(TraderId::from_bytes([1; 16]));
        let msg = format!("{err}");
        assert!(msg.starts_with("CS_ERR_101"), "Got: {msg}");
    }

    #[test]
    fn insufficient_balance_display() {
        let err = ClearswapError::InsufficientBalance {
            token: TokenCode::DGX,
            needed: 100,
            available: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("CS_ERR_206"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(
            ClearswapError::incompatible("price").class(),
            ErrorClass::Validation
        );
        assert_eq!(
            ClearswapError::SwapNotOpen(SwapId([0; 32])).class(),
            ErrorClass::StateConflict
        );
        assert_eq!(
            ClearswapError::TokenNotRegistered(TokenCode::BTC).class(),
            ErrorClass::Resolution
        );
        assert_eq!(
            ClearswapError::ArithmeticOverflow("x".into()).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn all_errors_have_cs_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(ClearswapError::InvalidSettlementMode(SettlementId(3))),
            Box::new(ClearswapError::SwapAlreadyOpened(SwapId([1; 32]))),
            Box::new(ClearswapError::OrderAlreadySettled(OrderId::new())),
            Box::new(ClearswapError::Configuration("test".into())),
            Box::new(ClearswapError::UnsupportedTokenPrecision {
                token: TokenCode(3),
                decimals: 30,
                max: 18,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("CS_ERR_"),
                "Error missing CS_ERR_ prefix: {msg}"
            );
        }
    }
}
