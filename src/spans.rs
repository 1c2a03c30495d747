//! Span creation helpers for revokescan operations.
//!
//! Telemetry stays out of business logic: each instrumented operation has a
//! span constructor here and attaches it with [`tracing::Instrument`].
//!
//! ```rust,ignore
//! async {
//!     // business logic
//! }
//! .instrument(spans::scan_approvals(token, owner))
//! .await
//! ```

use alloy_primitives::{Address, BlockNumber};
use tracing::Span;

/// Span for a full approval scan of one owner.
///
/// Parent: None (root span for this operation)
/// Children: scan_window spans when pagination is used
#[inline]
pub(crate) fn scan_approvals(token: Address, owner: Address) -> Span {
    tracing::info_span!(
        "revokescan.scan_approvals",
        token = %token,
        owner = %owner,
    )
}

/// Span for one pagination window.
///
/// Parent: scan_approvals span
#[inline]
pub(crate) fn scan_window(from_block: BlockNumber, to_block: BlockNumber) -> Span {
    tracing::debug_span!(
        "revokescan.scan_window",
        from_block = from_block,
        to_block = to_block,
        block_count = to_block.saturating_sub(from_block).saturating_add(1),
    )
}

/// Span for reading one spender's current allowance.
#[inline]
pub(crate) fn probe_allowance(owner: Address, spender: Address) -> Span {
    tracing::debug_span!(
        "revokescan.probe_allowance",
        owner = %owner,
        spender = %spender,
    )
}

/// Span for a single `approve(spender, 0)` transaction.
///
/// Parent: revoke_all span when issued by a batch, otherwise None
#[inline]
pub(crate) fn revoke_spender(token: Address, spender: Address) -> Span {
    tracing::info_span!(
        "revokescan.revoke_spender",
        token = %token,
        spender = %spender,
    )
}

/// Span for a sequential revoke-all batch.
///
/// Children: revoke_spender spans (one per attempted spender)
#[inline]
pub(crate) fn revoke_all(token: Address, rows: usize) -> Span {
    tracing::info_span!("revokescan.revoke_all", token = %token, rows = rows)
}
