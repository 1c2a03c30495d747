// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Owner-scoped approval session
//!
//! An [`ApprovalSession`] binds one owner address to a scan, the rows it
//! discovers and the revoke actions on those rows:
//!
//! 1. [`set_owner`](ApprovalSession::set_owner) cancels any running scan,
//!    drops every row and starts a new scan under a fresh [`ScanTicket`]
//! 2. a completed scan publishes its [`ScanResult`] only if its ticket is
//!    still current, then creates one row per new spender and spawns that
//!    row's allowance read
//! 3. [`revoke`](ApprovalSession::revoke) and
//!    [`revoke_all`](ApprovalSession::revoke_all) run on spawned tasks, so a
//!    submitted transaction always resolves and updates its row even if the
//!    caller goes away
//!
//! Dropping the session cancels scans, allowance reads and any revoke-all
//! batch, but leaves in-flight revoke transactions running.

use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use crate::allowance::AllowanceProbe;
use crate::config::RevokeConfig;
use crate::errors::{RevokeError, ScanError, ScanErrorKind, WriteError};
use crate::events::{ApprovalScanner, ScanOutcome};
use crate::generation::{ScanGeneration, ScanTicket};
use crate::provider::ChainClient;
use crate::revocation::{BatchReport, BatchRevoker, RevocationRow, RowHandle, RowState};
use crate::types::SpenderSet;

/// Externally observed state of the owner's scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Owner being scanned, if any
    pub owner: Option<Address>,
    /// Spenders found by the last completed scan
    pub spenders: SpenderSet,
    /// A scan is running
    pub loading: bool,
    /// Why the last scan failed
    pub error: Option<ScanFailure>,
}

/// A scan failure as published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub kind: ScanErrorKind,
    pub message: String,
}

impl From<&ScanError> for ScanFailure {
    fn from(err: &ScanError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Counts derived from the current rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApprovalSummary {
    /// Rows in the session, hidden ones included
    pub spenders: usize,
    /// Rows that are shown
    pub visible: usize,
    /// Visible rows that still need a revoke
    pub outstanding: usize,
    /// Rows revoked during this session
    pub revoked: usize,
    /// At least one spender exists and none needs action
    pub all_revoked: bool,
}

impl ApprovalSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a RevocationRow>) -> Self {
        let mut summary = Self {
            spenders: 0,
            visible: 0,
            outstanding: 0,
            revoked: 0,
            all_revoked: false,
        };

        for row in rows {
            let state = row.state();
            summary.spenders += 1;
            if state.is_visible() {
                summary.visible += 1;
            }
            if !state.is_settled() {
                summary.outstanding += 1;
            }
            if state == RowState::Revoked {
                summary.revoked += 1;
            }
        }

        summary.all_revoked = summary.spenders > 0 && summary.outstanding == 0;
        summary
    }

    /// Banner text for the summary
    pub fn headline(&self) -> String {
        if self.all_revoked {
            "All Approvals Revoked".to_string()
        } else {
            let plural = if self.outstanding == 1 { "" } else { "s" };
            format!("{} Active Approval{plural} Found", self.outstanding)
        }
    }
}

struct Inner<C: ?Sized> {
    chain: Arc<C>,
    config: RevokeConfig,
    generation: ScanGeneration,
    /// Advanced whenever the rows are dropped; revoke-all runs under it
    rows_generation: ScanGeneration,
    scan: watch::Sender<ScanResult>,
    rows: watch::Sender<Vec<RowHandle>>,
    probes: Mutex<Vec<(AbortHandle, RowHandle)>>,
    batch: BatchRevoker,
}

impl<C: ChainClient + ?Sized + 'static> Inner<C> {
    /// Publish a finished scan if `ticket` is still current
    ///
    /// Runs under the scan channel lock, which also serializes owner changes,
    /// so a superseded scan can never publish.
    fn publish(
        &self,
        ticket: &ScanTicket,
        owner: Address,
        outcome: Result<SpenderSet, ScanFailure>,
    ) {
        self.scan.send_if_modified(|scan| {
            if ticket.is_cancelled() {
                debug!(owner = %owner, "Discarding superseded scan result");
                return false;
            }

            let (spenders, error) = match outcome {
                Ok(spenders) => (spenders, None),
                Err(error) => (SpenderSet::new(), Some(error)),
            };

            self.reconcile_rows(owner, &spenders);
            *scan = ScanResult {
                owner: Some(owner),
                spenders,
                loading: false,
                error,
            };
            true
        });
    }

    /// Keep rows for surviving spenders, create and probe new ones, drop the rest
    fn reconcile_rows(&self, owner: Address, spenders: &SpenderSet) {
        let probe = AllowanceProbe::from_config(&self.config, owner);
        let mut spawned = Vec::new();

        self.rows.send_modify(|rows| {
            let previous = std::mem::take(rows);
            *rows = spenders
                .iter()
                .map(|spender| {
                    if let Some(existing) = previous.iter().find(|row| row.spender() == *spender) {
                        return existing.clone();
                    }

                    let row = RowHandle::new(*spender);
                    let task_row = row.clone();
                    let chain = Arc::clone(&self.chain);
                    let probe = probe.clone();
                    let handle = tokio::spawn(async move {
                        task_row.load_allowance(&probe, &*chain).await;
                    });
                    spawned.push((handle.abort_handle(), row.clone()));
                    row
                })
                .collect();
        });

        if let Ok(mut probes) = self.probes.lock() {
            probes.retain(|(probe, _)| !probe.is_finished());
            probes.extend(spawned);
        }
    }

    /// Stop every allowance read and settle the rows they were loading
    fn abort_probes(&self) {
        if let Ok(mut probes) = self.probes.lock() {
            for (probe, row) in probes.drain(..) {
                probe.abort();
                row.abandon_read();
            }
        }
    }

    async fn run_scan(self: Arc<Self>, owner: Address, ticket: ScanTicket) {
        let scanner = ApprovalScanner::new(Arc::clone(&self.chain), self.config.clone());
        match scanner.scan(owner, &ticket).await {
            Ok(ScanOutcome::Complete(report)) => self.publish(&ticket, owner, Ok(report.spenders)),
            Ok(ScanOutcome::Cancelled) => {}
            Err(err) => self.publish(&ticket, owner, Err(ScanFailure::from(&err))),
        }
    }
}

/// Approval discovery and revocation for one owner at a time
pub struct ApprovalSession<C: ChainClient + ?Sized + 'static> {
    inner: Arc<Inner<C>>,
    scan_task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: ChainClient + ?Sized + 'static> ApprovalSession<C> {
    /// Create an idle session with no owner
    pub fn new(chain: Arc<C>, config: RevokeConfig) -> Self {
        let (scan, _) = watch::channel(ScanResult::default());
        let (rows, _) = watch::channel(Vec::new());
        let batch = BatchRevoker::new(config.token);

        Self {
            inner: Arc::new(Inner {
                chain,
                config,
                generation: ScanGeneration::new(),
                rows_generation: ScanGeneration::new(),
                scan,
                rows,
                probes: Mutex::new(Vec::new()),
                batch,
            }),
            scan_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RevokeConfig {
        &self.inner.config
    }

    /// Current owner
    pub fn owner(&self) -> Option<Address> {
        self.inner.scan.borrow().owner
    }

    /// Switch to `owner`, restarting the scan
    ///
    /// Setting the current owner again is a no-op; use
    /// [`rescan`](Self::rescan) to refresh. `None` clears the session.
    pub fn set_owner(&self, owner: Option<Address>) {
        if self.owner() == owner {
            return;
        }

        info!(owner = ?owner, "Owner changed");
        self.restart(owner, true);
    }

    /// Scan the current owner again, keeping rows for spenders still found
    pub fn rescan(&self) {
        let owner = self.owner();
        self.restart(owner, false);
    }

    fn restart(&self, owner: Option<Address>, clear_rows: bool) {
        let inner = &self.inner;
        let mut ticket = None;

        inner.scan.send_modify(|scan| {
            let next = inner.generation.begin();
            if clear_rows {
                inner.rows_generation.cancel();
                inner.abort_probes();
                inner.rows.send_replace(Vec::new());
                *scan = ScanResult {
                    owner,
                    ..ScanResult::default()
                };
            }
            scan.owner = owner;
            scan.loading = owner.is_some();
            scan.error = None;
            ticket = Some(next);
        });

        if let Ok(mut task) = self.scan_task.lock() {
            if let Some(previous) = task.take() {
                previous.abort();
            }

            if let (Some(owner), Some(ticket)) = (owner, ticket) {
                let inner = Arc::clone(&self.inner);
                *task = Some(tokio::spawn(inner.run_scan(owner, ticket)));
            }
        }
    }

    /// Receiver notified whenever the scan result changes
    pub fn subscribe_scan(&self) -> watch::Receiver<ScanResult> {
        self.inner.scan.subscribe()
    }

    /// Receiver notified whenever the set of rows changes
    pub fn subscribe_rows(&self) -> watch::Receiver<Vec<RowHandle>> {
        self.inner.rows.subscribe()
    }

    pub fn scan_result(&self) -> ScanResult {
        self.inner.scan.borrow().clone()
    }

    /// Handles for every row, hidden ones included
    pub fn rows(&self) -> Vec<RowHandle> {
        self.inner.rows.borrow().clone()
    }

    pub fn row(&self, spender: Address) -> Option<RowHandle> {
        self.inner
            .rows
            .borrow()
            .iter()
            .find(|row| row.spender() == spender)
            .cloned()
    }

    /// Snapshots of the rows that are shown
    pub fn visible_rows(&self) -> Vec<RevocationRow> {
        self.inner
            .rows
            .borrow()
            .iter()
            .map(RowHandle::snapshot)
            .filter(|row| row.state().is_visible())
            .collect()
    }

    pub fn summary(&self) -> ApprovalSummary {
        let snapshots: Vec<RevocationRow> = self
            .inner
            .rows
            .borrow()
            .iter()
            .map(RowHandle::snapshot)
            .collect();
        ApprovalSummary::from_rows(&snapshots)
    }

    /// Wait for the running scan, if any, and return its result
    pub async fn wait_for_scan(&self) -> ScanResult {
        let mut rx = self.inner.scan.subscribe();
        let result = match rx.wait_for(|scan| !scan.loading).await {
            Ok(scan) => scan.clone(),
            Err(_) => self.scan_result(),
        };
        result
    }

    /// Wait until every row's allowance read has settled
    pub async fn wait_for_allowances(&self) {
        for row in self.rows() {
            row.settled().await;
        }
    }

    /// Revoke one spender
    ///
    /// # Errors
    ///
    /// - [`RevokeError::UnknownSpender`] if the spender has no row
    /// - any error from [`RowHandle::revoke`]
    pub async fn revoke(&self, spender: Address) -> Result<TxHash, RevokeError> {
        let row = self
            .row(spender)
            .ok_or(RevokeError::UnknownSpender(spender))?;
        let chain = Arc::clone(&self.inner.chain);
        let token = self.inner.config.token;

        let task = tokio::spawn(async move { row.revoke(&*chain, token).await });
        task.await.unwrap_or_else(|err| {
            Err(RevokeError::Write(WriteError::transaction_failed(format!(
                "revoke task ended: {err}"
            ))))
        })
    }

    /// Revoke every outstanding row, one transaction at a time
    ///
    /// # Errors
    ///
    /// Returns [`RevokeError::BatchInProgress`] if a batch is already
    /// running. Per-row failures are reported in the [`BatchReport`].
    /// Changing the owner or dropping the session ends the batch after the
    /// transaction in flight, if any, resolves.
    pub async fn revoke_all(&self) -> Result<BatchReport, RevokeError> {
        let ticket = self.inner.rows_generation.ticket();
        let rows = self.rows();
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            inner
                .batch
                .revoke_all(&rows, &*inner.chain, &ticket)
                .await
        });
        task.await.unwrap_or_else(|err| {
            Err(RevokeError::Write(WriteError::transaction_failed(format!(
                "revoke-all task ended: {err}"
            ))))
        })
    }

    pub fn is_revoking_all(&self) -> bool {
        self.inner.batch.is_in_progress()
    }

    /// Receiver for the revoke-all in-progress flag
    pub fn subscribe_revoking_all(&self) -> watch::Receiver<bool> {
        self.inner.batch.subscribe()
    }
}

impl<C: ChainClient + ?Sized + 'static> Drop for ApprovalSession<C> {
    fn drop(&mut self) {
        self.inner.generation.cancel();
        self.inner.rows_generation.cancel();
        self.inner.abort_probes();
        if let Ok(mut task) = self.scan_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}
