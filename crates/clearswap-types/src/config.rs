//! Configuration types for the settlement engine and token registry.
//!
//! Configuration is plain serde data, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FEE_DENOMINATOR, DEFAULT_FEE_NUMERATOR};
use crate::fixed::mul_div_floor;
use crate::{ClearswapError, Result, TokenCode, TraderId};

/// Proportional darknode fee: `amount × numerator / denominator`, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub numerator: u128,
    pub denominator: u128,
}

impl FeeSchedule {
    /// No fees at all.
    pub const ZERO: Self = Self {
        numerator: 0,
        denominator: 1,
    };

    /// Fee owed on `amount` (native token units).
    pub fn fee_on(&self, amount: u128) -> Result<u128> {
        mul_div_floor(amount, self.numerator, self.denominator).ok_or_else(|| {
            ClearswapError::ArithmeticOverflow(format!("fee on {amount}"))
        })
    }

    /// A fee schedule must have a non-zero denominator and never exceed 100%.
    pub fn validate(&self) -> Result<()> {
        if self.denominator == 0 {
            return Err(ClearswapError::Configuration(
                "fee denominator must be non-zero".into(),
            ));
        }
        if self.numerator > self.denominator {
            return Err(ClearswapError::Configuration(format!(
                "fee {}/{} exceeds 100%",
                self.numerator, self.denominator
            )));
        }
        Ok(())
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            numerator: DEFAULT_FEE_NUMERATOR,
            denominator: DEFAULT_FEE_DENOMINATOR,
        }
    }
}

fn default_native_token() -> TokenCode {
    TokenCode::ETH
}

/// Settlement engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The token the atomic swap escrow locks natively. Atomic settlement
    /// requires exactly one leg in this token.
    #[serde(default = "default_native_token")]
    pub native_token: TokenCode,
    /// Ledger account credited with settlement fees.
    pub fee_recipient: TraderId,
    #[serde(default)]
    pub fees: FeeSchedule,
}

impl EngineConfig {
    /// Default configuration (ETH native token, 0.2% fees).
    #[must_use]
    pub fn new(fee_recipient: TraderId) -> Self {
        Self {
            native_token: default_native_token(),
            fee_recipient,
            fees: FeeSchedule::default(),
        }
    }

    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`ClearswapError::Configuration`] on malformed JSON or an
    /// invalid fee schedule.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ClearswapError::Configuration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fees.validate()
    }
}

/// One token entry used to bootstrap a token registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenListing {
    pub code: TokenCode,
    pub address: String,
    pub decimals: u8,
}

impl TokenListing {
    #[must_use]
    pub fn new(code: TokenCode, address: impl Into<String>, decimals: u8) -> Self {
        Self {
            code,
            address: address.into(),
            decimals,
        }
    }

    /// The standard listing: BTC, ETH and the common ERC-20 tokens.
    #[must_use]
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new(TokenCode::BTC, "0x0000000000000000000000000000000000000000", 8),
            Self::new(TokenCode::ETH, "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE", 18),
            Self::new(TokenCode::DGX, "0x4f3AfEC4E5a3F2A6a1A411DEF7D7dFe50eE057bF", 9),
            Self::new(TokenCode::REN, "0x408e41876cCCDC0F92210600ef50372656052a38", 18),
            Self::new(TokenCode::TUSD, "0x8dd5fbCe2F6a956C3022bA3663759011Dd51e73E", 18),
            Self::new(TokenCode::ZRX, "0xE41d2489571d322189246DaFA5ebDe1F4699F498", 18),
            Self::new(TokenCode::OMG, "0xd26114cd6EE289AccF82350c8d8487fedB8A0C07", 18),
        ]
    }

    /// Parse a JSON array of listings.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        serde_json::from_str(json).map_err(|err| ClearswapError::Configuration(err.to_string()))
    }
}
