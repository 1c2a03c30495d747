// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain collaborator traits and their alloy-backed implementation
//!
//! The revocation engine never talks to an RPC node directly. It consumes
//! three capabilities:
//!
//! - [`ApprovalLogSource`] - chain height and historical Approval logs
//! - [`AllowanceSource`] - current `allowance(owner, spender)`
//! - [`ApprovalSubmitter`] - `approve(spender, amount)` transactions
//!
//! [`AlloyChain`] implements all three over any alloy [`Provider`]. Tests
//! substitute scripted mocks.
//!
//! ```rust,ignore
//! use revokescan::provider::{connect_http, AlloyChain};
//!
//! let provider = connect_http("https://mainnet.base.org", None)?;
//! let chain = AlloyChain::new(provider);
//! let head = chain.latest_block().await?;
//! ```
//!
//! [`Provider`]: alloy_provider::Provider

mod chain;
mod factory;

pub use chain::AlloyChain;
pub use factory::connect_http;

use std::sync::Arc;

use alloy_primitives::{Address, BlockNumber, TxHash, U256};
use async_trait::async_trait;

use crate::errors::{RpcError, WriteError};
use crate::events::{ApprovalEvent, ApprovalQuery};

/// Read access to chain height and Approval event history
#[async_trait]
pub trait ApprovalLogSource: Send + Sync {
    /// Highest block the provider considers confirmed
    async fn latest_block(&self) -> Result<BlockNumber, RpcError>;

    /// Approval events matching `query`
    ///
    /// Providers may reject wide ranges; the error is returned as-is so the
    /// scanner can fall back to pagination.
    async fn approval_logs(&self, query: &ApprovalQuery) -> Result<Vec<ApprovalEvent>, RpcError>;
}

/// Read access to current allowances
#[async_trait]
pub trait AllowanceSource: Send + Sync {
    /// Current allowance of `spender` over `owner`'s `token`
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError>;
}

/// Submission of `approve` transactions
#[async_trait]
pub trait ApprovalSubmitter: Send + Sync {
    /// Submit `approve(spender, amount)` on `token` and wait for the outcome
    ///
    /// Resolves only once the transaction is confirmed or has failed.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WriteError>;
}

/// Everything a session needs from the chain
pub trait ChainClient: ApprovalLogSource + AllowanceSource + ApprovalSubmitter {}

impl<T> ChainClient for T where
    T: ApprovalLogSource + AllowanceSource + ApprovalSubmitter + ?Sized
{
}

#[async_trait]
impl<T: ApprovalLogSource + ?Sized> ApprovalLogSource for Arc<T> {
    async fn latest_block(&self) -> Result<BlockNumber, RpcError> {
        (**self).latest_block().await
    }

    async fn approval_logs(&self, query: &ApprovalQuery) -> Result<Vec<ApprovalEvent>, RpcError> {
        (**self).approval_logs(query).await
    }
}

#[async_trait]
impl<T: AllowanceSource + ?Sized> AllowanceSource for Arc<T> {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError> {
        (**self).allowance(token, owner, spender).await
    }
}

#[async_trait]
impl<T: ApprovalSubmitter + ?Sized> ApprovalSubmitter for Arc<T> {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WriteError> {
        (**self).approve(token, spender, amount).await
    }
}
