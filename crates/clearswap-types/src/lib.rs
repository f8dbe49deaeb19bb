//! # clearswap-types
//!
//! Shared types, errors, and configuration for the **Clearswap** settlement
//! engine and atomic swap escrow.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TraderId`], [`BrokerId`], [`TokenCode`], [`TokenPair`], [`SettlementId`], [`SwapId`]
//! - **Fixed-point arithmetic**: [`Fixed`], [`Price`], [`Volume`]
//! - **Order model**: [`Order`], [`OrderParity`], [`OrderState`], [`SettlementMode`]
//! - **Match model**: [`MatchResult`], [`Fee`], [`Transfer`], [`SettlementInstructions`]
//! - **Token model**: [`TokenDetails`]
//! - **Swap model**: [`AtomicSwap`], [`SwapStatus`], [`Secret`], [`SecretHash`]
//! - **Configuration**: [`EngineConfig`], [`FeeSchedule`], [`TokenListing`]
//! - **Errors**: [`ClearswapError`] with `CS_ERR_` prefix codes
//! - **Constants**: precision limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod fixed;
pub mod ids;
pub mod order;
pub mod swap;
pub mod token;
pub mod trade;

// Re-export all primary types at crate root:
//   use clearswap_types::{Order, OrderParity, MatchResult, AtomicSwap, ...};

pub use config::*;
pub use error::*;
pub use fixed::*;
pub use ids::*;
pub use order::*;
pub use swap::*;
pub use token::*;
pub use trade::*;

// Constants are accessed via `clearswap_types::constants::FOO`.
