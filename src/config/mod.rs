//! Configuration for approval scanning and revocation
//!
//! # Example: Using defaults
//!
//! ```rust
//! use revokescan::RevokeConfig;
//!
//! // CLAWD on Base, 100k-block pagination windows
//! let config = RevokeConfig::default();
//! assert_eq!(config.scan_window.as_u64(), 100_000);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use revokescan::RevokeConfigBuilder;
//! use std::time::Duration;
//!
//! let config = RevokeConfigBuilder::with_defaults()
//!     .scan_window(10_000)
//!     .rate_limit_delay(Duration::from_millis(250))
//!     .build();
//! assert_eq!(config.scan_window.as_u64(), 10_000);
//! ```

use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::Address;

use crate::types::{ScanWindow, TokenDecimals};

pub mod constants;

/// Configuration for the revocation engine
///
/// Use [`RevokeConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct RevokeConfig {
    /// Token whose approvals are scanned and revoked
    /// Default: CLAWD
    pub token: Address,

    /// Chain the token lives on
    /// Default: Base
    pub chain: NamedChain,

    /// Blocks per window when the full-range log query is rejected
    /// Default: 100,000
    pub scan_window: ScanWindow,

    /// Delay between pagination windows to avoid rate limiting
    /// Default: None (no delay)
    pub rate_limit_delay: Option<Duration>,

    /// Timeout applied to every chain-data query
    /// Default: 30 seconds
    pub rpc_timeout: Duration,

    /// Display scale for allowance amounts
    /// Default: 18
    pub decimals: TokenDecimals,

    /// Extra attempts for a failed allowance read
    /// Default: 2
    pub allowance_retries: u32,

    /// Delay between allowance read attempts
    /// Default: 500ms
    pub allowance_retry_delay: Duration,
}

impl Default for RevokeConfig {
    fn default() -> Self {
        Self {
            token: constants::CLAWD_TOKEN,
            chain: NamedChain::Base,
            scan_window: ScanWindow::DEFAULT,
            rate_limit_delay: None,
            rpc_timeout: Duration::from_secs(30),
            decimals: TokenDecimals::STANDARD,
            allowance_retries: 2,
            allowance_retry_delay: Duration::from_millis(500),
        }
    }
}

impl RevokeConfig {
    /// Config with no delays and no retries
    ///
    /// Suitable for tests and local nodes.
    pub fn minimal() -> Self {
        Self {
            allowance_retries: 0,
            allowance_retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Builder for [`RevokeConfig`]
///
/// # Example
///
/// ```rust
/// use revokescan::RevokeConfigBuilder;
/// use alloy_chains::NamedChain;
/// use alloy_primitives::address;
///
/// let config = RevokeConfigBuilder::new()
///     .token(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"))
///     .chain(NamedChain::Mainnet)
///     .decimals(6)
///     .build();
/// assert_eq!(config.decimals.as_u8(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RevokeConfigBuilder {
    config: RevokeConfig,
}

impl RevokeConfigBuilder {
    /// Create a new builder starting from [`RevokeConfig::minimal`]
    pub fn new() -> Self {
        Self {
            config: RevokeConfig::minimal(),
        }
    }

    /// Create a new builder starting from [`RevokeConfig::default`]
    pub fn with_defaults() -> Self {
        Self {
            config: RevokeConfig::default(),
        }
    }

    /// Set the token contract
    pub fn token(mut self, token: Address) -> Self {
        self.config.token = token;
        self
    }

    /// Set the chain
    pub fn chain(mut self, chain: NamedChain) -> Self {
        self.config.chain = chain;
        self
    }

    /// Set the pagination window size in blocks
    pub fn scan_window(mut self, blocks: u64) -> Self {
        self.config.scan_window = ScanWindow::new(blocks);
        self
    }

    /// Set the delay between pagination windows
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = Some(delay);
        self
    }

    /// Set the per-query RPC timeout
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.config.rpc_timeout = timeout;
        self
    }

    /// Set the display decimals
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.config.decimals = TokenDecimals::new(decimals);
        self
    }

    /// Set the allowance read retry policy
    pub fn allowance_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.config.allowance_retries = retries;
        self.config.allowance_retry_delay = delay;
        self
    }

    /// Build the configuration
    pub fn build(self) -> RevokeConfig {
        self.config
    }
}
