//! System-wide constants for the Clearswap settlement engine.

/// Decimal places carried by order prices.
pub const PRICE_DECIMALS: u32 = 12;

/// Decimal places carried by order volumes.
pub const VOLUME_DECIMALS: u32 = 12;

/// Decimal places of the clearing price. The midpoint of two prices with
/// [`PRICE_DECIMALS`] places is always exact at one extra place.
pub const CLEARING_PRICE_DECIMALS: u32 = PRICE_DECIMALS + 1;

/// Highest token precision the settlement arithmetic accepts.
///
/// `volume × clearing price` carries `VOLUME_DECIMALS + CLEARING_PRICE_DECIMALS`
/// (25) places; keeping every token at or below 18 means converting to a
/// token amount only ever divides, and the 256-bit product never has to be
/// scaled up.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Settlement identifier for standard (same-ledger) settlement.
pub const STANDARD_SETTLEMENT_ID: u64 = 1;

/// Settlement identifier for atomic cross-chain settlement.
pub const ATOMIC_SETTLEMENT_ID: u64 = 2;

/// Default darknode fee numerator (0.2%).
pub const DEFAULT_FEE_NUMERATOR: u128 = 2;

/// Default darknode fee denominator.
pub const DEFAULT_FEE_DENOMINATOR: u128 = 1000;

/// Domain separator for order signing payloads.
pub const ORDER_SIGNING_DOMAIN: &[u8] = b"clearswap:order:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Clearswap";
