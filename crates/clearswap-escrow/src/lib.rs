//! # clearswap-escrow
//!
//! A hash-time-locked contract (HTLC) escrow that lets two parties swap
//! value across independent ledgers without a trusted intermediary.
//!
//! An initiator locks value behind `SHA-256(secret)` and an expiry. The
//! recipient claims it by revealing the secret; after expiry the initiator
//! can take it back instead. Revealing the secret here is what lets the
//! initiator claim the counter-leg on the other ledger.
//!
//! - [`AtomicSwapEscrow`]: the state machine
//! - [`Clock`]: injected time source ([`SystemClock`], [`ManualClock`])
//! - [`ValueVault`]: custody of locked value ([`InMemoryVault`])

pub mod clock;
pub mod swapper;
pub mod vault;

pub use clearswap_types::{secret_hash, swap_id};
pub use clock::{Clock, ManualClock, SystemClock};
pub use swapper::AtomicSwapEscrow;
pub use vault::{InMemoryVault, ValueVault};
