// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Scan generation counter used for cancellation
//!
//! Every scan runs under a [`ScanTicket`] taken from a [`ScanGeneration`].
//! Starting a new scan or calling [`ScanGeneration::cancel`] advances the
//! counter, which invalidates every ticket handed out before. A scan checks
//! its ticket before each query and before publishing, so a superseded scan
//! never publishes anything.

use std::sync::Arc;

use tokio::sync::watch;

/// Monotonic scan counter owned by whoever starts scans
#[derive(Debug)]
pub struct ScanGeneration {
    tx: watch::Sender<u64>,
}

impl ScanGeneration {
    /// Create a counter at generation zero
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Advance the counter and return a ticket for the new generation
    pub fn begin(&self) -> ScanTicket {
        let mut epoch = 0;
        self.tx.send_modify(|generation| {
            *generation += 1;
            epoch = *generation;
        });

        ScanTicket {
            epoch,
            rx: self.tx.subscribe(),
            _detached: None,
        }
    }

    /// A ticket for the current generation, cancelled by the next
    /// [`begin`](Self::begin) or [`cancel`](Self::cancel)
    pub fn ticket(&self) -> ScanTicket {
        let rx = self.tx.subscribe();
        let epoch = *rx.borrow();
        ScanTicket {
            epoch,
            rx,
            _detached: None,
        }
    }

    /// Invalidate every outstanding ticket
    pub fn cancel(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    /// Current generation number
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ScanGeneration {
    fn default() -> Self {
        Self::new()
    }
}

/// Permission for one scan to keep running and publish its result
///
/// A ticket is cancelled once its generation has been superseded or the
/// owning [`ScanGeneration`] has been dropped.
#[derive(Debug, Clone)]
pub struct ScanTicket {
    epoch: u64,
    rx: watch::Receiver<u64>,
    _detached: Option<Arc<watch::Sender<u64>>>,
}

impl ScanTicket {
    /// A ticket that is never cancelled, for one-off scans
    pub fn detached() -> Self {
        let (tx, rx) = watch::channel(0);
        Self {
            epoch: 0,
            rx,
            _detached: Some(Arc::new(tx)),
        }
    }

    /// Generation this ticket belongs to
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether this ticket has been superseded
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.epoch || self.rx.has_changed().is_err()
    }

    /// Resolves once this ticket is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let epoch = self.epoch;
        // An error means the generation was dropped, which also cancels
        let _ = rx.wait_for(|generation| *generation != epoch).await;
    }
}
