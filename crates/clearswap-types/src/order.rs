//! Order types for the Clearswap settlement engine.
//!
//! An [`Order`] is immutable once submitted. Every order is countersigned by
//! a broker (ed25519) over its canonical signing payload; the settlement
//! engine checks both the signature and the broker's authorization before
//! accepting the order.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::constants::{ATOMIC_SETTLEMENT_ID, ORDER_SIGNING_DOMAIN, STANDARD_SETTLEMENT_ID};
use crate::{
    BrokerId, ClearswapError, OrderId, Price, Result, SettlementId, TokenPair, TraderId, Volume,
};

/// Which side of the market this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderParity {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderParity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Settlement modes this engine knows how to execute.
///
/// Orders carry a numeric [`SettlementId`]; other settlement layers may
/// register further ids in the settlement registry, but only these two are
/// executed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementMode {
    /// Both legs move on the local balances ledger.
    Standard,
    /// One leg crosses to a foreign ledger through the atomic swap escrow;
    /// only fees move on the local ledger.
    AtomicCrossChain,
}

impl SettlementMode {
    #[must_use]
    pub const fn id(self) -> SettlementId {
        match self {
            Self::Standard => SettlementId(STANDARD_SETTLEMENT_ID),
            Self::AtomicCrossChain => SettlementId(ATOMIC_SETTLEMENT_ID),
        }
    }

    #[must_use]
    pub const fn from_id(id: SettlementId) -> Option<Self> {
        match id.0 {
            STANDARD_SETTLEMENT_ID => Some(Self::Standard),
            ATOMIC_SETTLEMENT_ID => Some(Self::AtomicCrossChain),
            _ => None,
        }
    }
}

impl TryFrom<SettlementId> for SettlementMode {
    type Error = ClearswapError;

    fn try_from(id: SettlementId) -> Result<Self> {
        Self::from_id(id).ok_or(ClearswapError::InvalidSettlementMode(id))
    }
}

impl std::fmt::Display for SettlementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "STANDARD"),
            Self::AtomicCrossChain => write!(f, "ATOMIC"),
        }
    }
}

/// Order state as reported by the external order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Undefined,
    Open,
    Confirmed,
    Canceled,
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "UNDEFINED"),
            Self::Open => write!(f, "OPEN"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// A limit order as submitted for settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub settlement_id: SettlementId,
    pub tokens: TokenPair,
    pub parity: OrderParity,
    /// Priority token per non-priority token.
    pub price: Price,
    /// Maximum volume, in the non-priority token.
    pub volume: Volume,
    /// Smallest volume this order accepts. Zero accepts any volume.
    pub minimum_volume: Volume,
    pub trader: TraderId,
    pub nonce: u64,
    /// Broker that countersigned this order.
    pub broker: BrokerId,
    /// Ed25519 signature by `broker` over [`Order::signing_payload`].
    pub broker_signature: Vec<u8>,
}

impl Order {
    /// A standard-settlement order whose minimum volume equals its volume.
    /// Unsigned until [`Order::signed_by`] is called.
    #[must_use]
    pub fn new(
        id: OrderId,
        parity: OrderParity,
        tokens: TokenPair,
        price: Price,
        volume: Volume,
        trader: TraderId,
    ) -> Self {
        Self {
            id,
            settlement_id: SettlementMode::Standard.id(),
            tokens,
            parity,
            price,
            volume,
            minimum_volume: volume,
            trader,
            nonce: 0,
            broker: BrokerId([0u8; 32]),
            broker_signature: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_settlement(mut self, settlement_id: SettlementId) -> Self {
        self.settlement_id = settlement_id;
        self
    }

    #[must_use]
    pub fn with_minimum_volume(mut self, minimum_volume: Volume) -> Self {
        self.minimum_volume = minimum_volume;
        self
    }

    #[must_use]
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Countersign with a broker key. Must be the last builder call: any
    /// later change invalidates the signature.
    #[must_use]
    pub fn signed_by(mut self, broker_key: &SigningKey) -> Self {
        self.broker = BrokerId(broker_key.verifying_key().to_bytes());
        let signature = broker_key.sign(&self.signing_payload());
        self.broker_signature = signature.to_bytes().to_vec();
        self
    }

    /// Structural invariants: non-zero volume, `minimum_volume <= volume`.
    ///
    /// # Errors
    /// Returns [`ClearswapError::InvalidOrder`].
    pub fn validate(&self) -> Result<()> {
        if self.volume.is_zero() {
            return Err(ClearswapError::InvalidOrder {
                reason: format!("order {} has zero volume", self.id),
            });
        }
        if self.minimum_volume > self.volume {
            return Err(ClearswapError::InvalidOrder {
                reason: format!(
                    "order {} minimum volume {} exceeds volume {}",
                    self.id, self.minimum_volume, self.volume
                ),
            });
        }
        Ok(())
    }

    /// Canonical signing payload.
    ///
    /// Format: `"clearswap:order:v1:" || id || settlement_id || tokens ||
    /// parity || price || volume || minimum_volume || trader || nonce ||
    /// broker`, integers big-endian.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(192);
        payload.extend_from_slice(ORDER_SIGNING_DOMAIN);
        payload.extend_from_slice(self.id.0.as_bytes());
        payload.extend_from_slice(&self.settlement_id.0.to_be_bytes());
        payload.extend_from_slice(&self.tokens.as_u64().to_be_bytes());
        payload.push(match self.parity {
            OrderParity::Buy => 0,
            OrderParity::Sell => 1,
        });
        payload.extend_from_slice(&self.price.raw().to_be_bytes());
        payload.extend_from_slice(&self.volume.raw().to_be_bytes());
        payload.extend_from_slice(&self.minimum_volume.raw().to_be_bytes());
        payload.extend_from_slice(self.trader.0.as_bytes());
        payload.extend_from_slice(&self.nonce.to_be_bytes());
        payload.extend_from_slice(self.broker.as_bytes());
        payload
    }

    /// Verify the broker countersignature.
    ///
    /// # Errors
    /// Returns [`ClearswapError::InvalidBrokerSignature`] if the broker key
    /// is malformed or the signature does not verify.
    pub fn verify_broker_signature(&self) -> Result<()> {
        let invalid = |_| ClearswapError::InvalidBrokerSignature(self.id);
        let key = VerifyingKey::from_bytes(self.broker.as_bytes()).map_err(invalid)?;
        let signature = Signature::from_slice(&self.broker_signature).map_err(invalid)?;
        key.verify_strict(&self.signing_payload(), &signature)
            .map_err(invalid)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// Deterministic broker key used by [`Order::dummy`].
    #[must_use]
    pub fn test_broker_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    /// A signed standard order for a fresh trader.
    ///
    /// # Panics
    /// Panics if `price` or `volume` carry more than 12 decimal places.
    pub fn dummy(
        parity: OrderParity,
        tokens: TokenPair,
        price: rust_decimal::Decimal,
        volume: rust_decimal::Decimal,
    ) -> Self {
        Self::dummy_for_trader(TraderId::new(), parity, tokens, price, volume)
    }

    /// Like [`Order::dummy`] but for a given trader.
    ///
    /// # Panics
    /// Panics if `price` or `volume` carry more than 12 decimal places.
    pub fn dummy_for_trader(
        trader: TraderId,
        parity: OrderParity,
        tokens: TokenPair,
        price: rust_decimal::Decimal,
        volume: rust_decimal::Decimal,
    ) -> Self {
        Self::new(
            OrderId::new(),
            parity,
            tokens,
            Price::from_decimal(price).expect("test price"),
            Volume::from_decimal(volume).expect("test volume"),
            trader,
        )
        .signed_by(&Self::test_broker_key())
    }

    /// Re-sign after mutating fields in a test.
    #[must_use]
    pub fn resigned(self) -> Self {
        self.signed_by(&Self::test_broker_key())
    }
}
