//! Error types for the revokescan library.
//!
//! - [`RpcError`] - chain-data provider failures
//! - [`ScanError`] - terminal scan failures, with [`ScanErrorKind`] naming the
//!   variant once the error is rendered; [`WindowError`] records a single
//!   failed pagination window without failing the scan
//! - [`WriteError`] - approve transaction failures, classified into
//!   [`RevokeErrorKind`] for display on a row
//! - [`RevokeError`] - single-spender revoke failures
//!
//! Per-window and per-batch-item failures are contained where they happen;
//! only scan-level and per-row failures reach the caller.

mod rpc;
mod scan;
mod write;

pub use rpc::RpcError;
pub use scan::{ScanError, ScanErrorKind, WindowError};
pub use write::{RevokeError, RevokeErrorKind, WriteError};
