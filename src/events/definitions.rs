//! ERC-20 approval event and contract bindings
//!
//! - **Approval**: `Approval(address,address,uint256)` with `owner` and
//!   `spender` indexed. The `spender` (topic2) is what the scanner collects.
//! - **IERC20**: the `allowance` query and `approve` mutation used to read
//!   and revoke current allowances.
//!
//! # Example: Decoding an Approval log
//!
//! ```rust,ignore
//! use revokescan::ApprovalEvent;
//!
//! for log in provider.get_logs(&filter).await? {
//!     let event = ApprovalEvent::from_log(&log)?;
//!     println!("{} approved {} for {}", event.owner, event.spender, event.value);
//! }
//! ```

use std::fmt::Debug;

use alloy_primitives::{Address, BlockNumber, U256};
use alloy_rpc_types::Log;
use alloy_sol_types::{sol, SolEvent};
use serde::{Deserialize, Serialize};

use crate::errors::RpcError;

sol! {
    /// ERC-20 Approval event
    ///
    /// Emitted when `owner` sets the allowance of `spender`, including when
    /// the allowance is set back to zero.
    event Approval(address indexed owner, address indexed spender, uint256 value);
}

impl Debug for Approval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Approval(owner: {}, spender: {}, value: {})",
            self.owner, self.spender, self.value
        )
    }
}

sol! {
    /// Minimal ERC-20 surface needed to read and revoke allowances
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// A historical Approval event observed on chain
///
/// Only used to discover spenders. `value` is whatever was approved at
/// `block_number` and says nothing about the current allowance, which may
/// have been changed or revoked since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    /// Token holder who granted the approval
    pub owner: Address,
    /// Address allowed to spend
    pub spender: Address,
    /// Approved amount at the time of the event
    pub value: U256,
    /// Block the event was emitted in, if the provider reported it
    pub block_number: Option<BlockNumber>,
}

impl ApprovalEvent {
    /// Decode an RPC log into an approval event
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::DecodeFailed`] if the log is not a well-formed
    /// Approval event.
    pub fn from_log(log: &Log) -> Result<Self, RpcError> {
        let decoded = Approval::decode_log(&log.inner)
            .map_err(|e| RpcError::decode_failed(format!("Approval log: {e}")))?;

        Ok(Self {
            owner: decoded.data.owner,
            spender: decoded.data.spender,
            value: decoded.data.value,
            block_number: log.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256, LogData, B256};

    fn approval_log(owner: Address, spender: Address, value: U256) -> Log {
        let topics = vec![
            Approval::SIGNATURE_HASH,
            owner.into_word(),
            spender.into_word(),
        ];
        Log {
            inner: alloy_primitives::Log {
                address: address!("9f86db9fc6f7c9408e8fda3ff8ce4e78ac7a6b07"),
                data: LogData::new(topics, value.to_be_bytes::<32>().to_vec().into()).unwrap(),
            },
            block_hash: Some(B256::ZERO),
            block_number: Some(42),
            block_timestamp: None,
            transaction_hash: Some(B256::ZERO),
            transaction_index: Some(0),
            log_index: Some(0),
            removed: false,
        }
    }

    #[test]
    fn test_signature_hash() {
        assert_eq!(
            Approval::SIGNATURE_HASH,
            keccak256(b"Approval(address,address,uint256)")
        );
    }

    #[test]
    fn test_from_log() {
        let owner = address!("1111111111111111111111111111111111111111");
        let spender = address!("2222222222222222222222222222222222222222");
        let log = approval_log(owner, spender, U256::from(7u64));

        let event = ApprovalEvent::from_log(&log).unwrap();

        assert_eq!(event.owner, owner);
        assert_eq!(event.spender, spender);
        assert_eq!(event.value, U256::from(7u64));
        assert_eq!(event.block_number, Some(42));
    }

    #[test]
    fn test_from_log_rejects_other_events() {
        let mut log = approval_log(Address::ZERO, Address::ZERO, U256::ZERO);
        let transfer = keccak256(b"Transfer(address,address,uint256)");
        log.inner.data = LogData::new(
            vec![transfer, B256::ZERO, B256::ZERO],
            U256::ZERO.to_be_bytes::<32>().to_vec().into(),
        )
        .unwrap();

        assert!(matches!(
            ApprovalEvent::from_log(&log),
            Err(RpcError::DecodeFailed { .. })
        ));
    }
}
