//! Well-known addresses and fixed parameters
//!
//! Centralizes the magic numbers the revocation engine is bound to.

use alloy_primitives::{address, Address, U256};

/// CLAWD token on Base
///
/// Contract: 0x9f86dB9fc6f7c9408e8Fda3Ff8ce4e78ac7a6b07
pub const CLAWD_TOKEN: Address = address!("9f86db9fc6f7c9408e8fda3ff8ce4e78ac7a6b07");

/// Allowances at or above this value are displayed as unlimited
pub const UNLIMITED_THRESHOLD: U256 = U256::MAX;

/// Amount passed to `approve` to revoke an allowance
pub const REVOKE_AMOUNT: U256 = U256::ZERO;
