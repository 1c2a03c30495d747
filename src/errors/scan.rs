// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for historical approval scanning.

use alloy_primitives::BlockNumber;
use serde::Serialize;

use super::RpcError;

/// Terminal failure of an approval scan.
///
/// A `ScanError` means the scan could not determine *any* result. It is
/// distinct from an empty [`SpenderSet`](crate::SpenderSet), which means
/// the owner has no approval history.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The chain height could not be read, so no range could be scanned.
    #[error("Could not determine chain height: {0}")]
    BlockHeight(#[source] RpcError),

    /// A single-query strategy failed and no later strategy remained.
    #[error("Approval log query failed: {0}")]
    LogQuery(#[source] RpcError),

    /// The full-range query failed and every pagination window failed too.
    #[error("All {windows} pagination windows failed")]
    AllWindowsFailed {
        /// Number of windows attempted
        windows: usize,
    },
}

impl ScanError {
    /// Which way the scan failed, without the provider detail
    pub fn kind(&self) -> ScanErrorKind {
        match self {
            Self::BlockHeight(_) => ScanErrorKind::BlockHeight,
            Self::LogQuery(_) => ScanErrorKind::LogQuery,
            Self::AllWindowsFailed { .. } => ScanErrorKind::AllWindowsFailed,
        }
    }
}

/// Variant of a [`ScanError`], kept after the error itself is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanErrorKind {
    BlockHeight,
    LogQuery,
    AllWindowsFailed,
}

/// Failure of a single pagination window.
///
/// Window failures are recorded in the [`ScanReport`](crate::ScanReport) and
/// never fail the scan on their own. Spenders that only appear inside a failed
/// window are absent from the result.
#[derive(Debug, thiserror::Error)]
#[error("Window {from_block}-{to_block} failed: {source}")]
pub struct WindowError {
    /// First block of the window (inclusive)
    pub from_block: BlockNumber,
    /// Last block of the window (inclusive)
    pub to_block: BlockNumber,
    /// The provider failure
    #[source]
    pub source: RpcError,
}
