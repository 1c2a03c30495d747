// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use alloy_primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::allowance::AllowanceReading;
use crate::errors::{RevokeErrorKind, WriteError};
use crate::types::TokenDecimals;

/// Presentation state of a revocation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowState {
    /// The first allowance read has not resolved
    Loading,
    /// Every allowance read failed; the amount is not known
    Unknown,
    /// The allowance was already zero; the row is hidden
    ZeroAllowance,
    /// A positive allowance is outstanding
    Active,
    /// A revoke transaction is pending
    Revoking,
    /// A revoke transaction confirmed during this session
    Revoked,
}

impl RowState {
    /// Whether the row belongs in the visible list
    pub fn is_visible(&self) -> bool {
        !matches!(self, RowState::ZeroAllowance)
    }

    /// Whether the row needs no further action
    pub fn is_settled(&self) -> bool {
        matches!(self, RowState::ZeroAllowance | RowState::Revoked)
    }

    /// Whether a revoke may be issued from this state
    pub fn can_revoke(&self) -> bool {
        matches!(self, RowState::Active | RowState::Unknown)
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RowState::Loading => "loading",
            RowState::Unknown => "unknown",
            RowState::ZeroAllowance => "zero allowance",
            RowState::Active => "active",
            RowState::Revoking => "revoking",
            RowState::Revoked => "revoked",
        };
        f.write_str(label)
    }
}

/// State of one spender's row
///
/// [`RevocationRow::state`] derives the presentation state. `locally_revoked`
/// is set when a revoke confirms and is never cleared, so later reads cannot
/// move a revoked row back to `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevocationRow {
    /// The spender
    pub spender: Address,
    /// Latest allowance reading
    pub allowance: AllowanceReading,
    /// A revoke confirmed for this spender
    pub locally_revoked: bool,
    /// A revoke transaction is in flight
    pub pending_write: bool,
    /// Outcome of the last failed revoke, cleared on the next attempt
    pub last_error: Option<RevokeErrorKind>,
    /// Hash of the confirmed revoke transaction
    pub last_tx: Option<TxHash>,
}

impl RevocationRow {
    /// A fresh row whose allowance is still loading
    pub fn new(spender: Address) -> Self {
        Self {
            spender,
            allowance: AllowanceReading::pending(spender),
            locally_revoked: false,
            pending_write: false,
            last_error: None,
            last_tx: None,
        }
    }

    /// Current presentation state
    pub fn state(&self) -> RowState {
        if self.locally_revoked {
            return RowState::Revoked;
        }
        if self.pending_write {
            return RowState::Revoking;
        }

        match self.allowance.amount {
            None if self.allowance.loading => RowState::Loading,
            None => RowState::Unknown,
            Some(amount) if amount.is_zero() => RowState::ZeroAllowance,
            Some(_) => RowState::Active,
        }
    }

    /// Allowance text for display
    pub fn display_allowance(&self, decimals: TokenDecimals) -> String {
        self.allowance.display(decimals)
    }

    /// Mark a new read as in flight, keeping the previous amount
    pub fn begin_read(&mut self) {
        self.allowance.loading = true;
    }

    /// Record a resolved allowance read
    pub fn apply_reading(&mut self, amount: U256) {
        self.allowance = AllowanceReading::resolved(self.spender, amount);
    }

    /// Record that every read attempt failed
    pub fn mark_read_failed(&mut self) {
        self.allowance.loading = false;
    }

    /// Enter `Revoking`
    ///
    /// Returns the current state as the error when a revoke is not allowed.
    pub fn begin_revoke(&mut self) -> Result<(), RowState> {
        let state = self.state();
        if !state.can_revoke() {
            return Err(state);
        }

        self.pending_write = true;
        self.last_error = None;
        Ok(())
    }

    /// Leave `Revoking` with the transaction outcome
    pub fn complete_revoke(&mut self, outcome: &Result<TxHash, WriteError>) {
        self.pending_write = false;
        match outcome {
            Ok(tx_hash) => {
                self.locally_revoked = true;
                self.last_tx = Some(*tx_hash);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.kind()),
        }
    }
}
