// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-spender revocation state and the revoke-all batch
//!
//! Each spender owns one [`RowHandle`]: a row-local state bundle combining
//! its latest allowance reading with local write outcomes. Rows never share
//! mutable state, so a single-row revoke and a running batch over other rows
//! do not interfere.
//!
//! ```text
//! Loading ──0──────────────► ZeroAllowance (hidden)
//!    │
//!    └──>0──► Active ──revoke──► Revoking ──ok──► Revoked (terminal)
//!               ▲                   │
//!               └──── error ────────┘
//! ```
//!
//! A read that fails after retries leaves the row `Unknown`, which is shown
//! and may be revoked like `Active`.

mod batch;
mod handle;
mod row;

pub use batch::{BatchItem, BatchItemOutcome, BatchReport, BatchRevoker};
pub use handle::RowHandle;
pub use row::{RevocationRow, RowState};
