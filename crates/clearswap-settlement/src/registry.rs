//! In-memory registries: tokens, brokers, and settlement layers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use clearswap_types::{
    BrokerId, ClearswapError, Result, SettlementId, TokenCode, TokenDetails, TokenListing,
};

use crate::ports::{BrokerVerifier, TokenRegistry};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Token registry backed by a map. Registration enforces the precision
/// ceiling so unsupported tokens never reach the matcher.
#[derive(Debug, Default)]
pub struct InMemoryTokenRegistry {
    tokens: HashMap<TokenCode, TokenDetails>,
}

impl InMemoryTokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from listings, failing on the first unsupported one.
    pub fn from_listings(listings: &[TokenListing]) -> Result<Self> {
        let mut registry = Self::new();
        for listing in listings {
            registry.register_token(TokenDetails::new(
                listing.code,
                listing.address.clone(),
                listing.decimals,
            ))?;
        }
        Ok(registry)
    }

    /// Register or replace a token.
    ///
    /// # Errors
    /// Returns [`ClearswapError::UnsupportedTokenPrecision`] if the token has
    /// more decimals than the settlement arithmetic supports.
    pub fn register_token(&mut self, details: TokenDetails) -> Result<()> {
        details.ensure_supported_precision()?;
        tracing::debug!(token = %details.code, decimals = details.decimals, "Token registered");
        self.tokens.insert(details.code, details);
        Ok(())
    }

    /// Remove a token. Returns its details if it was registered.
    pub fn deregister_token(&mut self, code: TokenCode) -> Option<TokenDetails> {
        self.tokens.remove(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenRegistry for InMemoryTokenRegistry {
    fn token_details(&self, code: TokenCode) -> Option<TokenDetails> {
        self.tokens.get(&code).cloned()
    }
}

// ---------------------------------------------------------------------------
// Brokers
// ---------------------------------------------------------------------------

/// A [`BrokerVerifier`] over an explicit set of broker keys.
///
/// Shared through an `Arc` by the [`SettlementRegistry`], so registration
/// goes through an interior lock.
#[derive(Debug, Default)]
pub struct RegisteredBrokers {
    brokers: RwLock<HashSet<BrokerId>>,
}

impl RegisteredBrokers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the broker was already registered.
    pub fn register(&self, broker: BrokerId) -> bool {
        self.brokers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(broker)
    }

    /// Returns `false` if the broker was not registered.
    pub fn deregister(&self, broker: &BrokerId) -> bool {
        self.brokers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(broker)
    }
}

impl BrokerVerifier for RegisteredBrokers {
    fn is_authorized(&self, broker: &BrokerId) -> bool {
        self.brokers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(broker)
    }
}

// ---------------------------------------------------------------------------
// Settlement layers
// ---------------------------------------------------------------------------

/// Maps settlement ids to the broker verifier responsible for them.
///
/// Registering an id does not make this engine able to execute it: only
/// the ids of [`clearswap_types::SettlementMode`] are executable, anything
/// else is rejected at match time.
#[derive(Default)]
pub struct SettlementRegistry {
    settlements: HashMap<SettlementId, Arc<dyn BrokerVerifier>>,
}

impl SettlementRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the verifier for a settlement id.
    pub fn register(&mut self, id: SettlementId, verifier: Arc<dyn BrokerVerifier>) {
        tracing::debug!(settlement = %id, "Settlement layer registered");
        self.settlements.insert(id, verifier);
    }

    pub fn deregister(&mut self, id: SettlementId) -> bool {
        self.settlements.remove(&id).is_some()
    }

    #[must_use]
    pub fn is_registered(&self, id: SettlementId) -> bool {
        self.settlements.contains_key(&id)
    }

    /// Broker verifier for `id`.
    ///
    /// # Errors
    /// Returns [`ClearswapError::InvalidSettlementMode`] if `id` is unknown.
    pub fn verifier(&self, id: SettlementId) -> Result<&Arc<dyn BrokerVerifier>> {
        self.settlements
            .get(&id)
            .ok_or(ClearswapError::InvalidSettlementMode(id))
    }
}

impl std::fmt::Debug for SettlementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.settlements.keys().collect();
        ids.sort();
        f.debug_struct("SettlementRegistry")
            .field("settlements", &ids)
            .finish()
    }
}
