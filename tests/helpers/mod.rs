// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for revokescan integration tests
//!
//! [`MockChain`] implements every chain collaborator trait with scripted
//! behavior and records the calls it receives.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, BlockNumber, TxHash, U256};
use async_trait::async_trait;
use revokescan::{
    AllowanceSource, ApprovalEvent, ApprovalLogSource, ApprovalQuery, ApprovalSubmitter, RpcError,
    WriteError,
};

/// Scripted chain for scanner, revocation and session tests
///
/// # Example
///
/// ```rust,ignore
/// let chain = MockChain::new(250_000)
///     .with_event(owner, spender_a, 10)
///     .with_max_range(100_000)
///     .with_failing_window(100_000)
///     .with_allowance(spender_a, U256::from(5));
/// ```
pub struct MockChain {
    head: BlockNumber,
    head_fails: bool,
    events: Vec<ApprovalEvent>,
    max_range: Option<u64>,
    failing_windows: HashSet<BlockNumber>,
    log_delay: Option<Duration>,
    failing_allowances: HashSet<Address>,
    allowance_delays: HashMap<Address, Duration>,
    approve_delay: Option<Duration>,
    allowances: Mutex<HashMap<Address, U256>>,
    revoke_failures: Mutex<HashMap<Address, VecDeque<WriteError>>>,
    log_queries: Mutex<Vec<(BlockNumber, BlockNumber)>>,
    approvals: Mutex<Vec<Address>>,
    allowance_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockChain {
    /// Chain at height `head` with no events
    pub fn new(head: BlockNumber) -> Self {
        Self {
            head,
            head_fails: false,
            events: Vec::new(),
            max_range: None,
            failing_windows: HashSet::new(),
            log_delay: None,
            failing_allowances: HashSet::new(),
            allowance_delays: HashMap::new(),
            approve_delay: None,
            allowances: Mutex::new(HashMap::new()),
            revoke_failures: Mutex::new(HashMap::new()),
            log_queries: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            allowance_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Add an Approval event from `owner` to `spender` at `block`
    pub fn with_event(mut self, owner: Address, spender: Address, block: BlockNumber) -> Self {
        self.events.push(ApprovalEvent {
            owner,
            spender,
            value: U256::MAX,
            block_number: Some(block),
        });
        self
    }

    /// Make `latest_block` fail
    pub fn with_failing_head(mut self) -> Self {
        self.head_fails = true;
        self
    }

    /// Reject log queries covering more than `blocks` blocks
    pub fn with_max_range(mut self, blocks: u64) -> Self {
        self.max_range = Some(blocks);
        self
    }

    /// Fail the window query starting at `from_block`
    pub fn with_failing_window(mut self, from_block: BlockNumber) -> Self {
        self.failing_windows.insert(from_block);
        self
    }

    /// Delay every log query
    pub fn with_log_delay(mut self, delay: Duration) -> Self {
        self.log_delay = Some(delay);
        self
    }

    /// Current allowance of `spender`
    pub fn with_allowance(self, spender: Address, amount: U256) -> Self {
        self.allowances.lock().unwrap().insert(spender, amount);
        self
    }

    /// Make every allowance read for `spender` fail
    pub fn with_failing_allowance(mut self, spender: Address) -> Self {
        self.failing_allowances.insert(spender);
        self
    }

    /// Delay every allowance read for `spender`
    pub fn with_allowance_delay(mut self, spender: Address, delay: Duration) -> Self {
        self.allowance_delays.insert(spender, delay);
        self
    }

    /// Delay every approve
    pub fn with_approve_delay(mut self, delay: Duration) -> Self {
        self.approve_delay = Some(delay);
        self
    }

    /// Fail the next approve for `spender` with `error`
    pub fn with_failing_revoke(self, spender: Address, error: WriteError) -> Self {
        self.revoke_failures
            .lock()
            .unwrap()
            .entry(spender)
            .or_default()
            .push_back(error);
        self
    }

    /// Log query ranges in the order they were issued
    pub fn log_queries(&self) -> Vec<(BlockNumber, BlockNumber)> {
        self.log_queries.lock().unwrap().clone()
    }

    /// Spenders passed to `approve`, in submission order
    pub fn approvals(&self) -> Vec<Address> {
        self.approvals.lock().unwrap().clone()
    }

    pub fn allowance_calls(&self) -> usize {
        self.allowance_calls.load(Ordering::SeqCst)
    }

    /// Highest number of approves observed in flight at once
    pub fn max_concurrent_approvals(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApprovalLogSource for MockChain {
    async fn latest_block(&self) -> Result<BlockNumber, RpcError> {
        if self.head_fails {
            return Err(RpcError::get_block_number_failed(std::io::Error::other(
                "connection refused",
            )));
        }
        Ok(self.head)
    }

    async fn approval_logs(&self, query: &ApprovalQuery) -> Result<Vec<ApprovalEvent>, RpcError> {
        self.log_queries
            .lock()
            .unwrap()
            .push((query.from_block, query.to_block));

        if let Some(delay) = self.log_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(max) = self.max_range {
            if query.block_count() > max {
                return Err(RpcError::get_logs_failed(
                    query.to_string(),
                    std::io::Error::other("query exceeds max block range"),
                ));
            }
        }

        if self.failing_windows.contains(&query.from_block) {
            return Err(RpcError::get_logs_failed(
                query.to_string(),
                std::io::Error::other("rate limited"),
            ));
        }

        Ok(self
            .events
            .iter()
            .filter(|event| event.owner == query.owner)
            .filter(|event| {
                event
                    .block_number
                    .is_some_and(|block| query.contains_block(block))
            })
            .copied()
            .collect())
    }
}

#[async_trait]
impl AllowanceSource for MockChain {
    async fn allowance(
        &self,
        _token: Address,
        _owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError> {
        self.allowance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.allowance_delays.get(&spender) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_allowances.contains(&spender) {
            return Err(RpcError::decode_failed("execution reverted"));
        }
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&spender)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ApprovalSubmitter for MockChain {
    async fn approve(
        &self,
        _token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WriteError> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.approvals.lock().unwrap().push(spender);

        if let Some(delay) = self.approve_delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .revoke_failures
            .lock()
            .unwrap()
            .get_mut(&spender)
            .and_then(VecDeque::pop_front);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = failure {
            return Err(error);
        }

        self.allowances.lock().unwrap().insert(spender, amount);
        let count = self.approvals.lock().unwrap().len() as u8;
        Ok(TxHash::repeat_byte(count))
    }
}

/// Deterministic address for test fixtures
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// `whole` tokens at 18 decimals
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}
