// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Spender set type for the deduplicated result of an approval scan

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of unique spender addresses discovered for one owner
///
/// Addresses are compared on their 20 raw bytes, so two hex spellings that
/// differ only in letter case (checksummed or not) are the same spender.
///
/// Uses `BTreeSet` internally for:
/// - Automatic deduplication
/// - Deterministic iteration order, independent of the order events arrived in
///
/// # Examples
///
/// ```
/// use revokescan::SpenderSet;
/// use alloy_primitives::address;
///
/// let mut spenders = SpenderSet::new();
/// spenders.insert(address!("1111111254eeb25477b68fb85ed929f73a960582"));
/// spenders.insert(address!("1111111254EEB25477B68FB85ED929F73A960582"));
///
/// assert_eq!(spenders.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpenderSet(BTreeSet<Address>);

impl SpenderSet {
    /// Create a new empty spender set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a spender
    ///
    /// Returns `true` if the spender was newly inserted.
    pub fn insert(&mut self, spender: Address) -> bool {
        self.0.insert(spender)
    }

    /// Merge every spender from `other` into this set
    pub fn merge(&mut self, other: SpenderSet) {
        self.0.extend(other.0);
    }

    /// Check if a spender is in the set
    pub fn contains(&self, spender: &Address) -> bool {
        self.0.contains(spender)
    }

    /// Number of unique spenders
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over spenders in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }
}

impl FromIterator<Address> for SpenderSet {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self(BTreeSet::from_iter(iter))
    }
}

impl Extend<Address> for SpenderSet {
    fn extend<T: IntoIterator<Item = Address>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for SpenderSet {
    type Item = Address;
    type IntoIter = std::collections::btree_set::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SpenderSet {
    type Item = &'a Address;
    type IntoIter = std::collections::btree_set::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for SpenderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpenderSet({} spenders)", self.len())
    }
}
