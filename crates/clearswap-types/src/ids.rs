//! Identifiers used throughout Clearswap.
//!
//! Orders and traders use UUIDv7 for time-ordered lexicographic sorting.
//! Brokers are identified by their raw ed25519 public key. Swap ids are
//! content-derived SHA-256 digests (see [`crate::swap::swap_id`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Globally unique order identifier, assigned by the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TraderId
// ---------------------------------------------------------------------------

/// Identity of a trader (and of any ledger account, e.g. the fee recipient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TraderId(pub Uuid);

impl TraderId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for TraderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BrokerId
// ---------------------------------------------------------------------------

/// A broker allowed to countersign orders.
/// This is the raw ed25519 verifying key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BrokerId(pub [u8; 32]);

impl BrokerId {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "broker:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// TokenCode / TokenPair
// ---------------------------------------------------------------------------

/// Registry code of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenCode(pub u32);

impl TokenCode {
    pub const BTC: Self = Self(0x0);
    pub const ETH: Self = Self(0x1);
    pub const DGX: Self = Self(0x100);
    pub const TUSD: Self = Self(0x101);
    pub const REN: Self = Self(0x10000);
    pub const ZRX: Self = Self(0x10001);
    pub const OMG: Self = Self(0x10002);

    /// Well-known symbol for this code, if any.
    #[must_use]
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::BTC => Some("BTC"),
            Self::ETH => Some("ETH"),
            Self::DGX => Some("DGX"),
            Self::TUSD => Some("TUSD"),
            Self::REN => Some("REN"),
            Self::ZRX => Some("ZRX"),
            Self::OMG => Some("OMG"),
            _ => None,
        }
    }
}

impl fmt::Display for TokenCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => write!(f, "{symbol}"),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// A directional trading pair: prices are quoted in the priority token per
/// unit of the non-priority token, volumes are in the non-priority token.
///
/// `(A, B)` and `(B, A)` are different markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenPair {
    pub priority: TokenCode,
    pub non_priority: TokenCode,
}

impl TokenPair {
    #[must_use]
    pub const fn new(priority: TokenCode, non_priority: TokenCode) -> Self {
        Self {
            priority,
            non_priority,
        }
    }

    /// Packed wire form: priority code in the high 32 bits.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        (u64::from(self.priority.0) << 32) | u64::from(self.non_priority.0)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_u64(packed: u64) -> Self {
        Self {
            priority: TokenCode((packed >> 32) as u32),
            non_priority: TokenCode(packed as u32),
        }
    }

    /// Whether `token` is one of the two legs.
    #[must_use]
    pub fn contains(&self, token: TokenCode) -> bool {
        self.priority == token || self.non_priority == token
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.priority, self.non_priority)
    }
}

// ---------------------------------------------------------------------------
// SettlementId
// ---------------------------------------------------------------------------

/// Numeric settlement-layer identifier carried by each order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SettlementId(pub u64);

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settlement:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SwapId
// ---------------------------------------------------------------------------

/// Content-derived atomic swap identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SwapId(pub [u8; 32]);

impl SwapId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
