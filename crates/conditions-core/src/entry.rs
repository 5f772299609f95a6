//! Condition rows and the ordered table that holds them

use crate::provider::ProviderId;
use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

/// A single row in the conditions table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionEntry {
    /// A directly stored value (a primary condition)
    Local(i64),
    /// A value computed on demand by a provider
    Derived {
        /// The provider that computes this row
        provider: ProviderId,
        /// The exact key this row was synthesized for
        ///
        /// `None` on the row at the provider's own registered name.
        full_key: Option<String>,
    },
}

impl ConditionEntry {
    /// Create the row a provider owns at its registered name
    pub fn provider_root(provider: ProviderId) -> Self {
        ConditionEntry::Derived {
            provider,
            full_key: None,
        }
    }

    /// Check if this row holds a stored value
    pub fn is_local(&self) -> bool {
        matches!(self, ConditionEntry::Local(_))
    }

    /// Check if this row is backed by a provider
    pub fn is_derived(&self) -> bool {
        matches!(self, ConditionEntry::Derived { .. })
    }

    /// Try to get the stored value
    pub fn as_local(&self) -> Option<i64> {
        match self {
            ConditionEntry::Local(value) => Some(*value),
            ConditionEntry::Derived { .. } => None,
        }
    }

    /// Try to get the backing provider
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            ConditionEntry::Local(_) => None,
            ConditionEntry::Derived { provider, .. } => Some(*provider),
        }
    }
}

impl Default for ConditionEntry {
    fn default() -> Self {
        ConditionEntry::Local(0)
    }
}

/// Ordered mapping from condition key to row
///
/// Keys sort lexicographically by byte. The ordering is load-bearing: prefix
/// resolution looks up the nearest predecessor of a key, and primaries are
/// enumerated in key order.
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    rows: BTreeMap<String, ConditionEntry>,
}

impl EntryTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the row stored at exactly `key`
    pub fn get(&self, key: &str) -> Option<&ConditionEntry> {
        self.rows.get(key)
    }

    /// Get a mutable reference to the row stored at exactly `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConditionEntry> {
        self.rows.get_mut(key)
    }

    /// Check if a row exists at exactly `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Insert or overwrite a row, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, entry: ConditionEntry) -> Option<ConditionEntry> {
        self.rows.insert(key.into(), entry)
    }

    /// Get the row at `key`, inserting the result of `default` if absent
    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> ConditionEntry,
    ) -> &mut ConditionEntry {
        self.rows.entry(key.to_owned()).or_insert_with(default)
    }

    /// Remove a row
    pub fn remove(&mut self, key: &str) -> Option<ConditionEntry> {
        self.rows.remove(key)
    }

    /// The row with the greatest key less than or equal to `key`
    pub fn predecessor(&self, key: &str) -> Option<(&str, &ConditionEntry)> {
        self.rows
            .range::<str, _>((Bound::Unbounded, Bound::Included(key)))
            .next_back()
            .map(|(k, entry)| (k.as_str(), entry))
    }

    /// Rows in key order
    pub fn iter(&self) -> btree_map::Range<'_, String, ConditionEntry> {
        self.rows.range::<str, _>(..)
    }

    /// Rows in key order, starting at the first key not less than `key`
    pub fn range_from(&self, key: &str) -> btree_map::Range<'_, String, ConditionEntry> {
        self.rows.range::<str, _>((Bound::Included(key), Bound::Unbounded))
    }

    /// Get the number of rows, derived rows included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove every row
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
