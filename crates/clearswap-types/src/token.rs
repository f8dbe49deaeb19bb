//! Token metadata as resolved from the token registry.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_TOKEN_DECIMALS;
use crate::{ClearswapError, Result, TokenCode};

/// A registered token: where it lives on its ledger and its precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub code: TokenCode,
    /// Ledger address of the token contract (opaque to the engine).
    pub address: String,
    /// Number of decimal places of the token's native unit.
    pub decimals: u8,
}

impl TokenDetails {
    #[must_use]
    pub fn new(code: TokenCode, address: impl Into<String>, decimals: u8) -> Self {
        Self {
            code,
            address: address.into(),
            decimals,
        }
    }

    /// Reject tokens whose precision exceeds [`MAX_TOKEN_DECIMALS`].
    ///
    /// # Errors
    /// Returns [`ClearswapError::UnsupportedTokenPrecision`].
    pub fn ensure_supported_precision(&self) -> Result<()> {
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(ClearswapError::UnsupportedTokenPrecision {
                token: self.code,
                decimals: self.decimals,
                max: MAX_TOKEN_DECIMALS,
            });
        }
        Ok(())
    }
}
