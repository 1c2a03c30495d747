// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Historical approval discovery
//!
//! [`ApprovalScanner`] turns an owner address into the [`SpenderSet`] of
//! every address the owner ever approved on the configured token. Strategies
//! are tried in order until one produces a result:
//!
//! 1. [`ScanStrategy::FullRange`] - one `[0, head]` query
//! 2. [`ScanStrategy::Paginated`] - ascending fixed-size windows, where a
//!    failed window is recorded and skipped
//!
//! Every provider call is bounded by the configured RPC timeout and raced
//! against the caller's [`ScanTicket`]. A cancelled scan returns
//! [`ScanOutcome::Cancelled`] and never a partial report.

use std::fmt;
use std::future::Future;

use alloy_primitives::{Address, BlockNumber};
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument};

use crate::config::RevokeConfig;
use crate::errors::{RpcError, ScanError, WindowError};
use crate::generation::ScanTicket;
use crate::provider::ApprovalLogSource;
use crate::spans;
use crate::types::{ScanWindow, SpenderSet};

use super::definitions::ApprovalEvent;
use super::filter::{ApprovalFilterBuilder, ApprovalQuery};

/// How the block range of a scan is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanStrategy {
    /// A single query over the whole range
    FullRange,
    /// Consecutive windows of the given size, failures tolerated per window
    Paginated(ScanWindow),
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStrategy::FullRange => f.write_str("full range"),
            ScanStrategy::Paginated(window) => write!(f, "paginated ({window})"),
        }
    }
}

/// Result of a completed scan
#[derive(Debug)]
pub struct ScanReport {
    /// Owner whose history was scanned
    pub owner: Address,
    /// Chain height the scan ran up to (inclusive)
    pub head: BlockNumber,
    /// Strategy that produced the result
    pub strategy: ScanStrategy,
    /// Distinct spenders found
    pub spenders: SpenderSet,
    /// Number of Approval events seen, duplicates included
    pub events: usize,
    /// Windows that failed and whose spenders are missing from `spenders`
    pub failed_windows: Vec<WindowError>,
}

impl ScanReport {
    /// Whether every block in `[0, head]` was covered
    pub fn is_complete(&self) -> bool {
        self.failed_windows.is_empty()
    }
}

/// Outcome of [`ApprovalScanner::scan`]
#[derive(Debug)]
pub enum ScanOutcome {
    /// The scan ran to completion
    Complete(ScanReport),
    /// The ticket was cancelled before the scan finished
    Cancelled,
}

impl ScanOutcome {
    /// The report, if the scan completed
    pub fn into_report(self) -> Option<ScanReport> {
        match self {
            ScanOutcome::Complete(report) => Some(report),
            ScanOutcome::Cancelled => None,
        }
    }
}

/// Accumulator for one strategy attempt
#[derive(Debug, Default)]
struct Collected {
    spenders: SpenderSet,
    events: usize,
    failed_windows: Vec<WindowError>,
}

impl Collected {
    fn absorb(&mut self, events: Vec<ApprovalEvent>) {
        self.events += events.len();
        self.spenders
            .extend(events.into_iter().map(|event| event.spender));
    }
}

/// Scans Approval history for one token
pub struct ApprovalScanner<S> {
    source: S,
    config: RevokeConfig,
}

impl<S: ApprovalLogSource> ApprovalScanner<S> {
    /// Create a scanner over `source`
    pub fn new(source: S, config: RevokeConfig) -> Self {
        Self { source, config }
    }

    /// The underlying log source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The scanner configuration
    pub fn config(&self) -> &RevokeConfig {
        &self.config
    }

    /// Strategies in the order they are attempted
    pub fn strategies(&self) -> [ScanStrategy; 2] {
        [
            ScanStrategy::FullRange,
            ScanStrategy::Paginated(self.config.scan_window),
        ]
    }

    /// Discover every spender `owner` has approved
    ///
    /// # Errors
    ///
    /// - [`ScanError::BlockHeight`] if the chain height cannot be read
    /// - [`ScanError::AllWindowsFailed`] if the full-range query and every
    ///   pagination window failed
    ///
    /// Individual window failures do not fail the scan; they are listed in
    /// [`ScanReport::failed_windows`].
    pub async fn scan(
        &self,
        owner: Address,
        ticket: &ScanTicket,
    ) -> Result<ScanOutcome, ScanError> {
        self.scan_inner(owner, ticket)
            .instrument(spans::scan_approvals(self.config.token, owner))
            .await
    }

    async fn scan_inner(
        &self,
        owner: Address,
        ticket: &ScanTicket,
    ) -> Result<ScanOutcome, ScanError> {
        if ticket.is_cancelled() {
            return Ok(ScanOutcome::Cancelled);
        }

        let head = match self
            .bounded(ticket, "get_block_number", self.source.latest_block())
            .await
        {
            Some(result) => result.map_err(ScanError::BlockHeight)?,
            None => return Ok(ScanOutcome::Cancelled),
        };

        let query = ApprovalFilterBuilder::new(self.config.token)
            .for_owner(owner)
            .in_block_range(0, head)
            .build();

        info!(owner = %owner, head = head, "Scanning approval history");

        let [fallbacks @ .., last] = self.strategies();
        for strategy in fallbacks {
            match self.attempt(strategy, &query, ticket).await {
                Ok(collected) => return Ok(self.finish(owner, head, strategy, collected, ticket)),
                Err(err) => {
                    warn!(
                        strategy = %strategy,
                        error = %err,
                        "Scan strategy failed, falling back"
                    );
                }
            }
        }

        let collected = self.attempt(last, &query, ticket).await?;
        Ok(self.finish(owner, head, last, collected, ticket))
    }

    fn finish(
        &self,
        owner: Address,
        head: BlockNumber,
        strategy: ScanStrategy,
        collected: Option<Collected>,
        ticket: &ScanTicket,
    ) -> ScanOutcome {
        let Some(collected) = collected.filter(|_| !ticket.is_cancelled()) else {
            debug!(owner = %owner, "Scan cancelled");
            return ScanOutcome::Cancelled;
        };

        info!(
            owner = %owner,
            strategy = %strategy,
            spenders = collected.spenders.len(),
            events = collected.events,
            failed_windows = collected.failed_windows.len(),
            "Approval scan complete"
        );

        ScanOutcome::Complete(ScanReport {
            owner,
            head,
            strategy,
            spenders: collected.spenders,
            events: collected.events,
            failed_windows: collected.failed_windows,
        })
    }

    /// Run one strategy. `Ok(None)` means the ticket was cancelled.
    async fn attempt(
        &self,
        strategy: ScanStrategy,
        query: &ApprovalQuery,
        ticket: &ScanTicket,
    ) -> Result<Option<Collected>, ScanError> {
        match strategy {
            ScanStrategy::FullRange => {
                let operation = query.to_string();
                match self
                    .bounded(ticket, &operation, self.source.approval_logs(query))
                    .await
                {
                    None => Ok(None),
                    Some(Err(err)) => Err(ScanError::LogQuery(err)),
                    Some(Ok(events)) => {
                        let mut collected = Collected::default();
                        collected.absorb(events);
                        Ok(Some(collected))
                    }
                }
            }
            ScanStrategy::Paginated(window) => self.paginate(window, query, ticket).await,
        }
    }

    async fn paginate(
        &self,
        window: ScanWindow,
        query: &ApprovalQuery,
        ticket: &ScanTicket,
    ) -> Result<Option<Collected>, ScanError> {
        let windows = window.chunk_range(query.from_block, query.to_block);
        let total = windows.len();
        let mut collected = Collected::default();
        let mut succeeded = 0usize;

        debug!(windows = total, window = %window, "Paginating approval scan");

        for (index, (from_block, to_block)) in windows.enumerate() {
            if index > 0 {
                if let Some(delay) = self.config.rate_limit_delay {
                    tokio::select! {
                        biased;
                        _ = ticket.cancelled() => return Ok(None),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }

            if ticket.is_cancelled() {
                return Ok(None);
            }

            let window_query = query.with_range(from_block, to_block);
            let operation = window_query.to_string();
            let result = self
                .bounded(ticket, &operation, self.source.approval_logs(&window_query))
                .instrument(spans::scan_window(from_block, to_block))
                .await;

            match result {
                None => return Ok(None),
                Some(Ok(events)) => {
                    debug!(
                        from_block = from_block,
                        to_block = to_block,
                        events = events.len(),
                        "Window scanned"
                    );
                    collected.absorb(events);
                    succeeded += 1;
                }
                Some(Err(source)) => {
                    let err = WindowError {
                        from_block,
                        to_block,
                        source,
                    };
                    error!(
                        from_block = from_block,
                        to_block = to_block,
                        error = %err.source,
                        "Approval window failed, continuing"
                    );
                    collected.failed_windows.push(err);
                }
            }
        }

        if succeeded == 0 {
            return Err(ScanError::AllWindowsFailed { windows: total });
        }

        Ok(Some(collected))
    }

    /// Await `call` under the RPC timeout, or `None` once the ticket is cancelled
    async fn bounded<T>(
        &self,
        ticket: &ScanTicket,
        operation: &str,
        call: impl Future<Output = Result<T, RpcError>>,
    ) -> Option<Result<T, RpcError>> {
        let timeout = self.config.rpc_timeout;
        tokio::select! {
            biased;
            _ = ticket.cancelled() => None,
            result = tokio::time::timeout(timeout, call) => Some(match result {
                Ok(inner) => inner,
                Err(_) => Err(RpcError::timeout(operation, timeout)),
            }),
        }
    }
}
