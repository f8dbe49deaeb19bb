//! # clearswap-settlement
//!
//! The **settlement engine**: takes a confirmed buy/sell order pair,
//! validates compatibility, computes clearing price, matched volume and
//! fees, and applies the resulting transfers atomically to a balances
//! ledger.
//!
//! ## Architecture
//!
//! - [`ports`]: capability traits the engine consumes ([`TokenRegistry`],
//!   [`BrokerVerifier`], [`OrderBook`], [`BalancesLedger`])
//! - [`matching`]: pure match arithmetic, no I/O
//! - [`engine`]: check ordering, resolution, submission, settlement
//! - [`registry`], [`orderbook`], [`balances`]: in-memory implementations
//! - [`idempotency`], [`supply_conservation`]: settlement safety nets

pub mod balances;
pub mod engine;
pub mod idempotency;
pub mod matching;
pub mod orderbook;
pub mod ports;
pub mod registry;
pub mod supply_conservation;

pub use balances::InMemoryBalances;
pub use engine::SettlementEngine;
pub use idempotency::IdempotencyGuard;
pub use orderbook::InMemoryOrderBook;
pub use ports::{BalancesLedger, BrokerVerifier, OrderBook, TokenRegistry};
pub use registry::{InMemoryTokenRegistry, RegisteredBrokers, SettlementRegistry};
pub use supply_conservation::SupplyConservation;
