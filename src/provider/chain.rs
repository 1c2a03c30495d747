// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Alloy provider implementation of the chain collaborator traits

use alloy_primitives::{Address, BlockNumber, TxHash, U256};
use alloy_provider::Provider;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{AllowanceSource, ApprovalLogSource, ApprovalSubmitter};
use crate::errors::{RpcError, WriteError};
use crate::events::{ApprovalEvent, ApprovalQuery, IERC20};

/// Chain collaborator backed by an alloy [`Provider`]
///
/// Read operations work with any provider. `approve` needs a provider with
/// a wallet filler (see [`connect_http`](super::connect_http)).
#[derive(Debug, Clone)]
pub struct AlloyChain<P> {
    provider: P,
}

impl<P: Provider> AlloyChain<P> {
    /// Wrap a provider
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider + Send + Sync> ApprovalLogSource for AlloyChain<P> {
    async fn latest_block(&self) -> Result<BlockNumber, RpcError> {
        self.provider
            .get_block_number()
            .await
            .map_err(RpcError::get_block_number_failed)
    }

    async fn approval_logs(&self, query: &ApprovalQuery) -> Result<Vec<ApprovalEvent>, RpcError> {
        let filter = query.to_filter();
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| RpcError::get_logs_failed(query.to_string(), e))?;

        debug!(logs_count = logs.len(), %query, "Fetched Approval logs");

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match ApprovalEvent::from_log(log) {
                Ok(event) => events.push(event),
                Err(e) => {
                    // Non-standard tokens occasionally emit look-alike logs
                    warn!(
                        error = %e,
                        tx_hash = ?log.transaction_hash,
                        "Skipping undecodable Approval log"
                    );
                }
            }
        }

        Ok(events)
    }
}

#[async_trait]
impl<P: Provider + Send + Sync> AllowanceSource for AlloyChain<P> {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| RpcError::call_failed(format!("allowance({owner}, {spender})"), e))
    }
}

#[async_trait]
impl<P: Provider + Send + Sync> ApprovalSubmitter for AlloyChain<P> {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WriteError> {
        let pending = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| WriteError::classify(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, %spender, "Approve transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| WriteError::classify(e.to_string()))?;

        if !receipt.status() {
            return Err(WriteError::Reverted { tx_hash });
        }

        Ok(tx_hash)
    }
}
