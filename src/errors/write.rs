// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for approve transactions and row-level revocation.

use std::fmt;

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::revocation::RowState;

/// EIP-1193 "user rejected request" error code.
const USER_REJECTED_CODE: &str = "4001";

/// Failure of an approve transaction, as reported by the submitter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The wallet holder declined to sign.
    #[error("Transaction rejected: {details}")]
    UserRejected {
        /// Message from the signer
        details: String,
    },

    /// Submission or confirmation failed for any other reason.
    #[error("Transaction failed: {details}")]
    TransactionFailed {
        /// Message from the provider
        details: String,
    },

    /// The transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction
        tx_hash: TxHash,
    },
}

impl WriteError {
    /// Classify a raw signer/provider error message.
    ///
    /// Messages mentioning a user rejection or denial, or carrying the
    /// EIP-1193 code 4001, are [`WriteError::UserRejected`]. Everything else
    /// is [`WriteError::TransactionFailed`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use revokescan::{RevokeErrorKind, WriteError};
    ///
    /// let err = WriteError::classify("MetaMask Tx Signature: User denied transaction signature.");
    /// assert_eq!(err.kind(), RevokeErrorKind::UserRejected);
    ///
    /// let err = WriteError::classify("insufficient funds for gas * price + value");
    /// assert_eq!(err.kind(), RevokeErrorKind::TransactionFailed);
    /// ```
    pub fn classify(message: impl Into<String>) -> Self {
        let details = message.into();
        let lowered = details.to_lowercase();

        let rejected = lowered.contains("user rejected")
            || lowered.contains("denied")
            || lowered.contains(&format!("code {USER_REJECTED_CODE}"))
            || lowered.contains(&format!("\"code\":{USER_REJECTED_CODE}"));

        if rejected {
            WriteError::UserRejected { details }
        } else {
            WriteError::TransactionFailed { details }
        }
    }

    /// Create a `TransactionFailed` error with details.
    pub fn transaction_failed(details: impl Into<String>) -> Self {
        WriteError::TransactionFailed {
            details: details.into(),
        }
    }

    /// The row-level error kind for this failure.
    pub fn kind(&self) -> RevokeErrorKind {
        match self {
            WriteError::UserRejected { .. } => RevokeErrorKind::UserRejected,
            WriteError::TransactionFailed { .. } | WriteError::Reverted { .. } => {
                RevokeErrorKind::TransactionFailed
            }
        }
    }
}

/// Error kind recorded on a revocation row after a failed write.
///
/// Both kinds are retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevokeErrorKind {
    /// The wallet holder declined to sign
    UserRejected,
    /// Any other submission or confirmation failure
    TransactionFailed,
}

impl RevokeErrorKind {
    /// Short user-facing message for this kind.
    pub const fn message(&self) -> &'static str {
        match self {
            RevokeErrorKind::UserRejected => "Transaction rejected",
            RevokeErrorKind::TransactionFailed => "Transaction failed",
        }
    }
}

impl fmt::Display for RevokeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors from revoking a single spender.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevokeError {
    /// The row is not in a state that accepts a revoke (already revoked,
    /// zero allowance, or a write is already pending).
    #[error("Spender {spender} cannot be revoked while {state}")]
    NotRevocable {
        /// The spender whose row rejected the action
        spender: Address,
        /// The row state at the time of the attempt
        state: RowState,
    },

    /// The spender has no row in the current session.
    #[error("Spender {0} was not found for this owner")]
    UnknownSpender(Address),

    /// A revoke-all batch is already running.
    #[error("A revoke-all batch is already in progress")]
    BatchInProgress,

    /// The approve transaction failed.
    #[error(transparent)]
    Write(#[from] WriteError),
}
