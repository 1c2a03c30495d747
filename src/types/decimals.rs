//! Token decimal precision type

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// ERC-20 token decimal precision
///
/// The display scale applied to raw on-chain amounts. CLAWD and most
/// ERC-20 tokens use 18.
///
/// # Examples
///
/// ```
/// use revokescan::TokenDecimals;
/// use alloy_primitives::U256;
///
/// assert_eq!(TokenDecimals::STANDARD.as_u8(), 18);
/// assert_eq!(TokenDecimals::new(6).unit(), U256::from(1_000_000u64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDecimals(u8);

impl TokenDecimals {
    /// Standard decimals for ETH-like tokens (18)
    pub const STANDARD: Self = Self(18);

    /// Create a new decimal precision value
    pub const fn new(decimals: u8) -> Self {
        Self(decimals)
    }

    /// Get the inner u8 value
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// One whole token in raw units: `10^decimals`, saturating at `U256::MAX`
    pub fn unit(&self) -> U256 {
        U256::from(10u64).saturating_pow(U256::from(self.0))
    }
}

impl Default for TokenDecimals {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl From<u8> for TokenDecimals {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TokenDecimals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} decimals", self.0)
    }
}
