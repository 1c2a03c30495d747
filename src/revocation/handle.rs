// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use tokio::sync::watch;
use tracing::{info, warn, Instrument};

use crate::allowance::AllowanceProbe;
use crate::config::constants::REVOKE_AMOUNT;
use crate::errors::RevokeError;
use crate::provider::{AllowanceSource, ApprovalSubmitter};
use crate::spans;

use super::row::{RevocationRow, RowState};

/// Shared handle to one spender's row
///
/// Clones observe and update the same row. Updates are published through a
/// `watch` channel so observers can [`subscribe`](RowHandle::subscribe).
#[derive(Debug, Clone)]
pub struct RowHandle {
    spender: Address,
    state: Arc<watch::Sender<RevocationRow>>,
}

impl RowHandle {
    /// A new row for `spender`, loading
    pub fn new(spender: Address) -> Self {
        let (tx, _rx) = watch::channel(RevocationRow::new(spender));
        Self {
            spender,
            state: Arc::new(tx),
        }
    }

    pub fn spender(&self) -> Address {
        self.spender
    }

    /// Copy of the current row
    pub fn snapshot(&self) -> RevocationRow {
        self.state.borrow().clone()
    }

    /// Current presentation state
    pub fn state(&self) -> RowState {
        self.state.borrow().state()
    }

    /// Receiver notified on every row change
    pub fn subscribe(&self) -> watch::Receiver<RevocationRow> {
        self.state.subscribe()
    }

    pub fn apply_reading(&self, amount: U256) {
        self.state.send_modify(|row| row.apply_reading(amount));
    }

    pub fn mark_read_failed(&self) {
        self.state.send_modify(RevocationRow::mark_read_failed);
    }

    /// Settle a read whose task was stopped before it finished
    ///
    /// Leaves rows that are not loading untouched.
    pub fn abandon_read(&self) {
        self.state.send_if_modified(|row| {
            if !row.allowance.loading {
                return false;
            }
            row.mark_read_failed();
            true
        });
    }

    /// Wait until no allowance read is in flight
    pub async fn settled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|row| !row.allowance.loading).await;
    }

    /// Read the current allowance through `probe` and record the result
    ///
    /// A read that fails after retries leaves the row [`RowState::Unknown`]
    /// unless an earlier amount is known.
    pub async fn load_allowance<A>(&self, probe: &AllowanceProbe, source: &A)
    where
        A: AllowanceSource + ?Sized,
    {
        self.state.send_if_modified(|row| {
            let was_loading = row.allowance.loading;
            row.begin_read();
            !was_loading
        });

        match probe.read(source, self.spender).await {
            Ok(amount) => self.apply_reading(amount),
            Err(err) => {
                warn!(
                    spender = %self.spender,
                    error = %err,
                    "Allowance unavailable"
                );
                self.mark_read_failed();
            }
        }
    }

    /// Revoke this spender with `approve(spender, 0)`
    ///
    /// The row moves to `Revoking` before submission and to `Revoked` as soon
    /// as the transaction confirms, without re-reading the allowance. On
    /// failure it returns to its previous state with the error kind recorded.
    ///
    /// # Errors
    ///
    /// - [`RevokeError::NotRevocable`] if the row is loading, zero, revoking
    ///   or already revoked
    /// - [`RevokeError::Write`] if the transaction fails
    pub async fn revoke<S>(&self, submitter: &S, token: Address) -> Result<TxHash, RevokeError>
    where
        S: ApprovalSubmitter + ?Sized,
    {
        let mut rejected = None;
        self.state.send_if_modified(|row| match row.begin_revoke() {
            Ok(()) => true,
            Err(state) => {
                rejected = Some(state);
                false
            }
        });

        if let Some(state) = rejected {
            return Err(RevokeError::NotRevocable {
                spender: self.spender,
                state,
            });
        }

        let outcome = submitter
            .approve(token, self.spender, REVOKE_AMOUNT)
            .instrument(spans::revoke_spender(token, self.spender))
            .await;

        self.state.send_modify(|row| row.complete_revoke(&outcome));

        match &outcome {
            Ok(tx_hash) => info!(spender = %self.spender, tx_hash = %tx_hash, "Approval revoked"),
            Err(err) => warn!(spender = %self.spender, error = %err, "Revoke failed"),
        }

        outcome.map_err(RevokeError::from)
    }
}
