// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn, Instrument};

use crate::errors::{RevokeError, RevokeErrorKind};
use crate::generation::ScanTicket;
use crate::provider::ApprovalSubmitter;
use crate::spans;
use crate::types::SpenderSet;

use super::handle::RowHandle;
use super::row::RowState;

/// What the batch did with one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchItemOutcome {
    /// The revoke confirmed
    Revoked(TxHash),
    /// The revoke failed; the row carries the same error
    Failed(RevokeErrorKind),
    /// No transaction was sent because the row was in this state
    Skipped(RowState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub spender: Address,
    pub outcome: BatchItemOutcome,
}

/// Result of one revoke-all run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// One entry per row, in iteration order
    pub items: Vec<BatchItem>,
    /// Spenders revoked by this run
    pub revoked: SpenderSet,
}

impl BatchReport {
    /// Number of transactions submitted
    pub fn attempted(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !matches!(item.outcome, BatchItemOutcome::Skipped(_)))
            .count()
    }

    /// Spenders whose revoke failed
    pub fn failed(&self) -> impl Iterator<Item = (Address, RevokeErrorKind)> + '_ {
        self.items.iter().filter_map(|item| match item.outcome {
            BatchItemOutcome::Failed(kind) => Some((item.spender, kind)),
            _ => None,
        })
    }
}

/// Revokes every outstanding row, one transaction at a time
///
/// Transaction N+1 is submitted only after transaction N has confirmed or
/// failed. A failure is logged and recorded on its row, and the batch moves
/// on. Nothing is retried within a run. A cancelled batch submits nothing
/// further, but a transaction already submitted still resolves its row.
#[derive(Debug)]
pub struct BatchRevoker {
    token: Address,
    in_progress: watch::Sender<bool>,
}

/// Clears the in-progress flag when the batch ends or is dropped
struct InProgress<'a>(&'a watch::Sender<bool>);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl BatchRevoker {
    pub fn new(token: Address) -> Self {
        let (in_progress, _rx) = watch::channel(false);
        Self { token, in_progress }
    }

    /// Whether a batch is running
    pub fn is_in_progress(&self) -> bool {
        *self.in_progress.borrow()
    }

    /// Receiver for the in-progress flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.in_progress.subscribe()
    }

    /// Revoke every row that still has an outstanding allowance
    ///
    /// Rows still loading are awaited first. Rows that are revoked, zero, or
    /// already being revoked elsewhere are skipped. Once `ticket` is
    /// cancelled the remaining rows are reported as skipped and the batch
    /// ends without waiting for their reads.
    ///
    /// # Errors
    ///
    /// Returns [`RevokeError::BatchInProgress`] if another batch is running on
    /// this revoker. Per-row failures never fail the batch.
    pub async fn revoke_all<S>(
        &self,
        rows: &[RowHandle],
        submitter: &S,
        ticket: &ScanTicket,
    ) -> Result<BatchReport, RevokeError>
    where
        S: ApprovalSubmitter + ?Sized,
    {
        let started = self.in_progress.send_if_modified(|running| {
            if *running {
                false
            } else {
                *running = true;
                true
            }
        });
        if !started {
            return Err(RevokeError::BatchInProgress);
        }
        let _guard = InProgress(&self.in_progress);

        let report = self
            .run(rows, submitter, ticket)
            .instrument(spans::revoke_all(self.token, rows.len()))
            .await;
        Ok(report)
    }

    async fn run<S>(&self, rows: &[RowHandle], submitter: &S, ticket: &ScanTicket) -> BatchReport
    where
        S: ApprovalSubmitter + ?Sized,
    {
        let mut report = BatchReport::default();

        for (index, row) in rows.iter().enumerate() {
            let cancelled = tokio::select! {
                biased;
                _ = ticket.cancelled() => true,
                _ = row.settled() => false,
            };
            if cancelled {
                let remaining = &rows[index..];
                warn!(remaining = remaining.len(), "Revoke-all cancelled");
                report.items.extend(remaining.iter().map(|row| BatchItem {
                    spender: row.spender(),
                    outcome: BatchItemOutcome::Skipped(row.state()),
                }));
                break;
            }

            let spender = row.spender();
            let state = row.state();
            if !state.can_revoke() {
                report.items.push(BatchItem {
                    spender,
                    outcome: BatchItemOutcome::Skipped(state),
                });
                continue;
            }

            let outcome = match row.revoke(submitter, self.token).await {
                Ok(tx_hash) => {
                    report.revoked.insert(spender);
                    BatchItemOutcome::Revoked(tx_hash)
                }
                Err(RevokeError::Write(err)) => {
                    error!(spender = %spender, error = %err, "Batch revoke failed, continuing");
                    BatchItemOutcome::Failed(err.kind())
                }
                Err(RevokeError::NotRevocable { state, .. }) => BatchItemOutcome::Skipped(state),
                Err(err) => {
                    error!(spender = %spender, error = %err, "Batch revoke failed, continuing");
                    BatchItemOutcome::Failed(RevokeErrorKind::TransactionFailed)
                }
            };

            report.items.push(BatchItem { spender, outcome });
        }

        info!(
            rows = rows.len(),
            attempted = report.attempted(),
            revoked = report.revoked.len(),
            "Revoke-all finished"
        );

        report
    }
}
