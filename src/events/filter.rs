// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Semantic filter builder for Approval event queries
//!
//! Approval events have this structure:
//! ```solidity
//! event Approval(address indexed owner, address indexed spender, uint256 value);
//! ```
//!
//! - topic0: event signature hash
//! - topic1: `owner`
//! - topic2: `spender`
//!
//! [`ApprovalFilterBuilder`] hides the topic positions behind `for_owner` /
//! `for_spender` and produces an [`ApprovalQuery`] that the scanner narrows
//! to each block range it needs.

use alloy_primitives::{Address, BlockNumber};
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;

use super::definitions::Approval;

/// A fully specified Approval log query
///
/// This is the request shape handed to an
/// [`ApprovalLogSource`](crate::ApprovalLogSource): one token, one owner,
/// one inclusive block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalQuery {
    /// Token contract emitting the events
    pub token: Address,
    /// Owner (topic1) to filter on
    pub owner: Address,
    /// Optional spender (topic2) to filter on
    pub spender: Option<Address>,
    /// First block (inclusive)
    pub from_block: BlockNumber,
    /// Last block (inclusive)
    pub to_block: BlockNumber,
}

impl ApprovalQuery {
    /// The same query over a different block range
    pub fn with_range(self, from_block: BlockNumber, to_block: BlockNumber) -> Self {
        Self {
            from_block,
            to_block,
            ..self
        }
    }

    /// Number of blocks covered by this query
    pub fn block_count(&self) -> u64 {
        self.to_block.saturating_sub(self.from_block).saturating_add(1)
    }

    /// Whether `block` falls inside the query range
    pub fn contains_block(&self, block: BlockNumber) -> bool {
        (self.from_block..=self.to_block).contains(&block)
    }

    /// Convert to an alloy `Filter` for `eth_getLogs`
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::new()
            .address(self.token)
            .event_signature(Approval::SIGNATURE_HASH)
            .topic1(self.owner.into_word())
            .from_block(self.from_block)
            .to_block(self.to_block);

        if let Some(spender) = self.spender {
            filter = filter.topic2(spender.into_word());
        }

        filter
    }
}

impl std::fmt::Display for ApprovalQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Approval logs {}-{}", self.from_block, self.to_block)
    }
}

/// Builder for [`ApprovalQuery`]
///
/// # Examples
///
/// ```rust
/// use revokescan::ApprovalFilterBuilder;
/// use alloy_primitives::address;
///
/// let query = ApprovalFilterBuilder::new(address!("9f86db9fc6f7c9408e8fda3ff8ce4e78ac7a6b07"))
///     .for_owner(address!("1111111111111111111111111111111111111111"))
///     .in_block_range(0, 1_000)
///     .build();
///
/// assert_eq!(query.block_count(), 1_001);
/// ```
#[derive(Debug, Clone)]
pub struct ApprovalFilterBuilder {
    token: Address,
    owner: Address,
    spender: Option<Address>,
    from_block: BlockNumber,
    to_block: BlockNumber,
}

impl ApprovalFilterBuilder {
    /// Start a query for Approval events emitted by `token`
    pub fn new(token: Address) -> Self {
        Self {
            token,
            owner: Address::ZERO,
            spender: None,
            from_block: 0,
            to_block: 0,
        }
    }

    /// Only events where `owner` granted the approval (topic1)
    pub fn for_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    /// Only events approving `spender` (topic2)
    pub fn for_spender(mut self, spender: Address) -> Self {
        self.spender = Some(spender);
        self
    }

    /// Restrict to `[from_block, to_block]`
    pub fn in_block_range(mut self, from_block: BlockNumber, to_block: BlockNumber) -> Self {
        self.from_block = from_block;
        self.to_block = to_block;
        self
    }

    /// Build the query
    pub fn build(self) -> ApprovalQuery {
        ApprovalQuery {
            token: self.token,
            owner: self.owner,
            spender: self.spender,
            from_block: self.from_block,
            to_block: self.to_block,
        }
    }
}
