//! Key resolution against the entry table
//!
//! A query key is governed either by the row stored at exactly that key, or
//! by a prefix provider whose name is a literal prefix of the key. Both cases
//! are found with a single predecessor search: a prefix provider's row sorts
//! immediately before every key it governs, so the nearest row at or before
//! the key is the only candidate.
//!
//! Prefix providers are assumed not to nest. With `"a: "` and `"a: b: "` both
//! registered, keys under `"a: b: "` can land on a row that belongs to
//! `"a: "`. Stores reject such registrations unless configured otherwise.

use crate::entry::{ConditionEntry, EntryTable};
use crate::provider::ProviderId;
use crate::registry::ProviderRegistry;

/// The row that governs a query key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A stored value at exactly the queried key
    Local(i64),
    /// A provider, reached by exact name or by prefix
    Derived(ProviderId),
}

/// Find the row that governs `key`
pub fn resolve(entries: &EntryTable, providers: &ProviderRegistry, key: &str) -> Option<Resolved> {
    let (row_key, entry) = entries.predecessor(key)?;

    if row_key == key {
        return Some(match entry {
            ConditionEntry::Local(value) => Resolved::Local(*value),
            ConditionEntry::Derived { provider, .. } => Resolved::Derived(*provider),
        });
    }

    let id = entry.provider()?;
    let provider = providers.get(id)?;
    if provider.is_prefix() && key.starts_with(provider.name()) {
        Some(Resolved::Derived(id))
    } else {
        None
    }
}
