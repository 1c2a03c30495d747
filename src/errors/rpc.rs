// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for chain-data provider operations.

use std::time::Duration;

/// Errors that can occur while talking to a chain-data provider.
///
/// Each variant carries enough context to tell which call failed. The
/// underlying provider error is boxed so that mock providers used in tests
/// and the alloy-backed provider share one error type.
///
/// # Examples
///
/// ```rust
/// use revokescan::RpcError;
/// use std::time::Duration;
///
/// let error = RpcError::Timeout {
///     operation: "Approval logs 0-99999".to_string(),
///     after: Duration::from_secs(30),
/// };
/// assert!(error.to_string().contains("timed out"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch the current block number.
    #[error("Failed to get current block number")]
    GetBlockNumberFailed {
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to fetch logs from the provider.
    ///
    /// Providers reject unbounded ranges, rate limit, or time out; all of
    /// these surface here.
    #[error("Failed to fetch logs for {operation}")]
    GetLogsFailed {
        /// Description of the query that failed (e.g., "Approval logs 0-99999")
        operation: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A read-only contract call (`eth_call`) failed.
    #[error("Contract call failed: {operation}")]
    CallFailed {
        /// Description of the call that failed
        operation: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The provider did not answer within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Description of the call that timed out
        operation: String,
        /// The timeout that elapsed
        after: Duration,
    },

    /// The RPC URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),

    /// Log data did not decode as the expected event.
    #[error("Failed to decode event: {details}")]
    DecodeFailed {
        /// Why decoding failed
        details: String,
    },
}

impl RpcError {
    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RpcError::GetBlockNumberFailed {
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `CallFailed` error from any error type.
    pub fn call_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::CallFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `Timeout` error.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        RpcError::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Helper to create a `DecodeFailed` error.
    pub fn decode_failed(details: impl Into<String>) -> Self {
        RpcError::DecodeFailed {
            details: details.into(),
        }
    }
}
