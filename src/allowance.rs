// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Current allowance reads and their classification
//!
//! Historical Approval values are never trusted as current state. Every row
//! reads `allowance(owner, spender)` fresh through an [`AllowanceProbe`] and
//! classifies the result:
//!
//! | Amount | Class | Display |
//! |--------|-------|---------|
//! | `0` | [`AllowanceClass::Zero`] | `0` |
//! | `>= 2^256 - 1` | [`AllowanceClass::Unlimited`] | `Unlimited` |
//! | anything else | [`AllowanceClass::Finite`] | scaled, e.g. `5.0000`, `1.50K`, `2.00M` |

use std::time::Duration;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, warn, Instrument};

use crate::config::constants::UNLIMITED_THRESHOLD;
use crate::config::RevokeConfig;
use crate::errors::RpcError;
use crate::provider::AllowanceSource;
use crate::spans;
use crate::types::TokenDecimals;

/// Placeholder shown while a read is in flight
pub const LOADING_DISPLAY: &str = "...";

/// Display text for an unlimited approval
pub const UNLIMITED_DISPLAY: &str = "Unlimited";

/// Classification of a current allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllowanceClass {
    /// Nothing approved
    Zero,
    /// A bounded positive amount
    Finite,
    /// The maximum representable amount
    Unlimited,
}

impl AllowanceClass {
    /// Classify a raw allowance
    ///
    /// ```rust
    /// use revokescan::AllowanceClass;
    /// use alloy_primitives::U256;
    ///
    /// assert_eq!(AllowanceClass::of(U256::MAX), AllowanceClass::Unlimited);
    /// assert_eq!(AllowanceClass::of(U256::MAX - U256::from(1)), AllowanceClass::Finite);
    /// assert_eq!(AllowanceClass::of(U256::ZERO), AllowanceClass::Zero);
    /// ```
    pub fn of(amount: U256) -> Self {
        if amount.is_zero() {
            AllowanceClass::Zero
        } else if amount >= UNLIMITED_THRESHOLD {
            AllowanceClass::Unlimited
        } else {
            AllowanceClass::Finite
        }
    }
}

/// The current allowance of one spender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllowanceReading {
    /// Spender the reading is for
    pub spender: Address,
    /// Amount read from chain; `None` while loading or after a failed read
    pub amount: Option<U256>,
    /// Whether a read is in flight
    pub loading: bool,
}

impl AllowanceReading {
    /// A reading whose first read has not resolved yet
    pub fn pending(spender: Address) -> Self {
        Self {
            spender,
            amount: None,
            loading: true,
        }
    }

    /// A resolved reading
    pub fn resolved(spender: Address, amount: U256) -> Self {
        Self {
            spender,
            amount: Some(amount),
            loading: false,
        }
    }

    /// Classification of the amount, once known
    pub fn class(&self) -> Option<AllowanceClass> {
        self.amount.map(AllowanceClass::of)
    }

    /// Human-scaled amount
    pub fn display(&self, decimals: TokenDecimals) -> String {
        format_allowance(self.amount, decimals)
    }
}

/// Format an allowance for display
///
/// `None` renders as `"..."`. Finite amounts are divided by `10^decimals`
/// and shown with two decimals and a `M` or `K` suffix above one million or
/// one thousand tokens, otherwise with four decimals. Rounding is half-up.
///
/// ```rust
/// use revokescan::{format_allowance, TokenDecimals};
/// use alloy_primitives::U256;
///
/// let five = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
/// assert_eq!(format_allowance(Some(five), TokenDecimals::STANDARD), "5.0000");
/// assert_eq!(format_allowance(None, TokenDecimals::STANDARD), "...");
/// ```
pub fn format_allowance(amount: Option<U256>, decimals: TokenDecimals) -> String {
    let Some(amount) = amount else {
        return LOADING_DISPLAY.to_string();
    };

    match AllowanceClass::of(amount) {
        AllowanceClass::Zero => "0".to_string(),
        AllowanceClass::Unlimited => UNLIMITED_DISPLAY.to_string(),
        AllowanceClass::Finite => {
            let unit = decimals.unit();
            let million = unit.saturating_mul(U256::from(1_000_000u64));
            let thousand = unit.saturating_mul(U256::from(1_000u64));

            if amount > million {
                format!("{}M", fixed_point(amount, million, 2))
            } else if amount > thousand {
                format!("{}K", fixed_point(amount, thousand, 2))
            } else {
                fixed_point(amount, unit, 4)
            }
        }
    }
}

/// `amount / divisor` with `places` decimals, rounded half-up
fn fixed_point(amount: U256, divisor: U256, places: usize) -> String {
    let scale = U256::from(10u64).pow(U256::from(places as u64));
    let (mut whole, remainder) = amount.div_rem(divisor);

    let mut fraction = match remainder.checked_mul(scale) {
        Some(scaled) => scaled.saturating_add(divisor / U256::from(2u64)) / divisor,
        None => remainder / (divisor / scale).max(U256::from(1u64)),
    };

    if fraction >= scale {
        whole = whole.saturating_add(U256::from(1u64));
        fraction -= scale;
    }

    let fraction = fraction.saturating_to::<u64>();
    format!("{whole}.{fraction:0>places$}")
}

/// Reads the current allowance of one owner's token towards a spender
#[derive(Debug, Clone)]
pub struct AllowanceProbe {
    token: Address,
    owner: Address,
    retries: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl AllowanceProbe {
    /// Probe for `owner` using the token, retry and timeout settings in `config`
    pub fn from_config(config: &RevokeConfig, owner: Address) -> Self {
        Self {
            token: config.token,
            owner,
            retries: config.allowance_retries,
            retry_delay: config.allowance_retry_delay,
            timeout: config.rpc_timeout,
        }
    }

    /// Owner whose allowances are read
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Read the current allowance of `spender`
    ///
    /// Failed or timed-out attempts are retried up to the configured count.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once retries are exhausted.
    pub async fn read<A>(&self, source: &A, spender: Address) -> Result<U256, RpcError>
    where
        A: AllowanceSource + ?Sized,
    {
        async {
            let mut attempt = 0u32;
            loop {
                let result = match tokio::time::timeout(
                    self.timeout,
                    source.allowance(self.token, self.owner, spender),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RpcError::timeout(
                        format!("allowance({}, {spender})", self.owner),
                        self.timeout,
                    )),
                };

                match result {
                    Ok(amount) => {
                        debug!(amount = %amount, attempt = attempt, "Allowance read");
                        return Ok(amount);
                    }
                    Err(err) if attempt < self.retries => {
                        attempt += 1;
                        warn!(
                            error = %err,
                            attempt = attempt,
                            retries = self.retries,
                            "Allowance read failed, retrying"
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        .instrument(spans::probe_allowance(self.owner, spender))
        .await
    }
}
