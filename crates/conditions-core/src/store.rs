//! The conditions store
//!
//! Every operation first resolves its key (see [`crate::resolve`]), then
//! either touches the stored value directly or delegates to the provider that
//! governs the key:
//!
//! | Governing row | `get`            | `has`            | `set(v)`            | `erase`            |
//! |---------------|------------------|------------------|---------------------|--------------------|
//! | none          | `0`              | `false`          | store `v`           | no-op, `true`      |
//! | stored        | stored value     | `true`           | overwrite           | remove row         |
//! | provider      | `provider.get(k)`| `provider.has(k)`| `provider.set(k,v)` | `provider.erase(k)`|
//!
//! `add(k, d)` is always `set(k, get(k) + d)`, with two's-complement wrapping.

use crate::config::StoreConfig;
use crate::entry::{ConditionEntry, EntryTable};
use crate::error::{Error, Result};
use crate::handle::ConditionHandle;
use crate::primaries::Primaries;
use crate::provider::{DerivedProvider, ProviderKind};
use crate::record::ConditionRecord;
use crate::registry::ProviderRegistry;
use crate::resolve::{resolve, Resolved};
use tracing::{debug, trace};

/// Key-value store of integer conditions, stored or derived
///
/// # Example
///
/// ```
/// use conditions_core::ConditionsStore;
///
/// let mut store = ConditionsStore::new();
/// store.set("visited: Earth", 1);
///
/// store
///     .register_prefix_provider("event: ")
///     .unwrap()
///     .set_get_fn(|_| 42)
///     .set_has_fn(|_| true);
///
/// assert_eq!(store.get("visited: Earth"), 1);
/// assert_eq!(store.get("event: launch"), 42);
/// assert!(store.has("event: landing"));
/// assert_eq!(store.get("unknown"), 0);
/// ```
#[derive(Debug, Default)]
pub struct ConditionsStore {
    entries: EntryTable,
    providers: ProviderRegistry,
    config: StoreConfig,
}

impl ConditionsStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: EntryTable::new(),
            providers: ProviderRegistry::new(),
            config,
        }
    }

    /// Create a store holding the given saved records
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ConditionRecord>,
    {
        let mut store = Self::new();
        store.load(records);
        store
    }

    /// Get the store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Apply saved records
    ///
    /// Each record sets its key to its value, or to `1` if it has none.
    pub fn load<I>(&mut self, records: I)
    where
        I: IntoIterator,
        I::Item: Into<ConditionRecord>,
    {
        let mut count = 0usize;
        for record in records {
            let record = record.into();
            self.set(&record.key, record.load_value());
            count += 1;
        }
        debug!(records = count, "loaded conditions");
    }

    /// Produce records for every stored condition, in key order
    ///
    /// Derived conditions are never saved, nor are stored conditions whose
    /// value is zero.
    pub fn save(&self) -> Vec<ConditionRecord> {
        self.primaries()
            .filter_map(|(key, value)| ConditionRecord::from_primary(key, value))
            .collect()
    }

    /// Get the value of a condition, `0` if nothing governs the key
    pub fn get(&self, key: &str) -> i64 {
        match self.resolve(key) {
            None => 0,
            Some(Resolved::Local(value)) => value,
            Some(Resolved::Derived(id)) => self.providers[id].get(key),
        }
    }

    /// Check if a condition exists
    pub fn has(&self, key: &str) -> bool {
        match self.resolve(key) {
            None => false,
            Some(Resolved::Local(_)) => true,
            Some(Resolved::Derived(id)) => self.providers[id].has(key),
        }
    }

    /// Check if a condition exists and get its value in one lookup
    ///
    /// The value is `0` whenever the condition does not exist; a provider's
    /// get function is only called when its has function reports `true`.
    pub fn has_get(&self, key: &str) -> (bool, i64) {
        match self.resolve(key) {
            None => (false, 0),
            Some(Resolved::Local(value)) => (true, value),
            Some(Resolved::Derived(id)) => {
                let provider = &self.providers[id];
                if provider.has(key) {
                    (true, provider.get(key))
                } else {
                    (false, 0)
                }
            }
        }
    }

    /// Set the value of a condition
    ///
    /// Returns `false` only when a provider rejects the write.
    pub fn set(&mut self, key: &str, value: i64) -> bool {
        match self.resolve(key) {
            None => {
                self.entries.insert(key, ConditionEntry::Local(value));
                true
            }
            Some(Resolved::Local(_)) => {
                if let Some(entry) = self.entries.get_mut(key) {
                    *entry = ConditionEntry::Local(value);
                }
                true
            }
            Some(Resolved::Derived(id)) => {
                let accepted = self.providers[id].set(key, value);
                if !accepted {
                    debug!(key, value, provider = self.providers[id].name(), "provider rejected set");
                }
                accepted
            }
        }
    }

    /// Add `delta` to the value of a condition, wrapping on overflow
    pub fn add(&mut self, key: &str, delta: i64) -> bool {
        let current = self.get(key);
        self.set(key, current.wrapping_add(delta))
    }

    /// Erase a condition
    ///
    /// Erasing an unknown key succeeds without doing anything. Returns `false`
    /// only when a provider rejects the erase.
    pub fn erase(&mut self, key: &str) -> bool {
        match self.resolve(key) {
            None => true,
            Some(Resolved::Local(_)) => {
                self.entries.remove(key);
                true
            }
            Some(Resolved::Derived(id)) => {
                let accepted = self.providers[id].erase(key);
                if !accepted {
                    debug!(key, provider = self.providers[id].name(), "provider rejected erase");
                }
                accepted
            }
        }
    }

    /// Get a mutable handle to the condition at exactly `key`
    ///
    /// If no row exists at `key` yet, one is created: bound to the prefix
    /// provider that governs `key` if there is one, and otherwise a stored
    /// condition starting at `0`. The row stays in the table afterwards.
    pub fn entry(&mut self, key: &str) -> ConditionHandle<'_> {
        let fresh = (!self.entries.contains_key(key)).then(|| self.fresh_entry(key));
        let Self {
            entries, providers, ..
        } = self;
        let entry = entries.get_or_insert_with(key, || fresh.unwrap_or_default());
        ConditionHandle::new(entry, providers)
    }

    fn fresh_entry(&self, key: &str) -> ConditionEntry {
        match self.resolve(key) {
            Some(Resolved::Derived(provider)) => {
                trace!(key, provider = self.providers[provider].name(), "synthesized derived row");
                ConditionEntry::Derived {
                    provider,
                    full_key: Some(key.to_owned()),
                }
            }
            _ => ConditionEntry::default(),
        }
    }

    /// Register a provider serving every key that starts with `prefix`
    ///
    /// Registering an existing name again returns the same provider with its
    /// original kind. Fails if `prefix` nests with another prefix provider and
    /// the configuration refuses that.
    pub fn register_prefix_provider(&mut self, prefix: &str) -> Result<&mut DerivedProvider> {
        if self.config.rejects_overlapping_prefixes() {
            if let Some(existing) = self.providers.overlapping_prefix(prefix) {
                return Err(Error::OverlappingPrefix {
                    prefix: prefix.to_owned(),
                    existing: existing.name().to_owned(),
                });
            }
        }
        Ok(self.register(prefix, ProviderKind::Prefix))
    }

    /// Register a provider serving exactly the key `name`
    ///
    /// Registering an existing name again returns the same provider, which
    /// keeps the kind it was first registered with.
    pub fn register_named_provider(&mut self, name: &str) -> &mut DerivedProvider {
        self.register(name, ProviderKind::Named)
    }

    fn register(&mut self, name: &str, kind: ProviderKind) -> &mut DerivedProvider {
        let id = self.providers.register(name, kind);
        let replaced = self.entries.insert(name, ConditionEntry::provider_root(id));
        debug!(
            name,
            kind = %self.providers[id].kind(),
            shadowed_value = replaced.as_ref().and_then(ConditionEntry::as_local),
            "registered provider"
        );
        &mut self.providers[id]
    }

    /// Get a provider by its registered name
    pub fn provider(&self, name: &str) -> Option<&DerivedProvider> {
        self.providers.by_name(name)
    }

    /// Get the number of registered providers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Find what governs `key` without touching it
    pub fn resolve(&self, key: &str) -> Option<Resolved> {
        resolve(&self.entries, &self.providers, key)
    }

    /// Stored conditions in key order
    pub fn primaries(&self) -> Primaries<'_> {
        Primaries::new(self.entries.iter())
    }

    /// Stored conditions in key order, starting at the first key not less
    /// than `key`
    pub fn primaries_from(&self, key: &str) -> Primaries<'_> {
        Primaries::new(self.entries.range_from(key))
    }

    /// The exhausted primaries position, for comparing against
    pub fn primaries_end(&self) -> Primaries<'_> {
        Primaries::end()
    }

    /// Get the number of rows, including provider rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no rows at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every condition and every provider
    pub fn clear(&mut self) {
        debug!(
            rows = self.entries.len(),
            providers = self.providers.len(),
            "clearing conditions"
        );
        self.entries.clear();
        self.providers.clear();
    }
}

impl<K: AsRef<str>> FromIterator<(K, i64)> for ConditionsStore {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<K: AsRef<str>> Extend<(K, i64)> for ConditionsStore {
    fn extend<I: IntoIterator<Item = (K, i64)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key.as_ref(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Wire a prefix provider over a shared map, the way an embedding
    /// collaborator would expose one of its own collections.
    fn map_provider(store: &mut ConditionsStore, prefix: &str) -> Rc<RefCell<HashMap<String, i64>>> {
        let backing = Rc::new(RefCell::new(HashMap::new()));
        let (get_map, has_map, set_map, erase_map) =
            (backing.clone(), backing.clone(), backing.clone(), backing.clone());
        store
            .register_prefix_provider(prefix)
            .unwrap()
            .set_get_fn(move |key| get_map.borrow().get(key).copied().unwrap_or(0))
            .set_has_fn(move |key| has_map.borrow().contains_key(key))
            .set_set_fn(move |key, value| {
                set_map.borrow_mut().insert(key.to_owned(), value);
                true
            })
            .set_erase_fn(move |key| erase_map.borrow_mut().remove(key).is_some());
        backing
    }

    #[test]
    fn test_unknown_keys() {
        let mut store = ConditionsStore::new();
        assert_eq!(store.get("nothing"), 0);
        assert!(!store.has("nothing"));
        assert_eq!(store.has_get("nothing"), (false, 0));
        assert!(store.erase("nothing"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_local_set_get_erase() {
        let mut store = ConditionsStore::new();
        assert!(store.set("fuel", 12));
        assert_eq!(store.get("fuel"), 12);
        assert!(store.has("fuel"));
        assert_eq!(store.has_get("fuel"), (true, 12));

        assert!(store.set("fuel", -3));
        assert_eq!(store.get("fuel"), -3);

        assert!(store.erase("fuel"));
        assert_eq!(store.get("fuel"), 0);
        assert!(!store.has("fuel"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_is_still_present() {
        let mut store = ConditionsStore::new();
        store.set("score", 0);
        assert!(store.has("score"));
        assert_eq!(store.has_get("score"), (true, 0));
    }

    #[test]
    fn test_add() {
        let mut store = ConditionsStore::new();
        assert!(store.add("kills", 3));
        assert!(store.add("kills", 4));
        assert!(store.add("kills", -2));
        assert_eq!(store.get("kills"), 5);
    }

    #[test]
    fn test_add_wraps_at_bounds() {
        let mut store = ConditionsStore::new();
        store.set("x", 1);
        assert!(store.add("x", i64::MAX));
        assert_eq!(store.get("x"), i64::MIN);
        assert!(store.add("x", -1));
        assert_eq!(store.get("x"), i64::MAX);
        assert!(store.add("y", i64::MIN));
        assert!(store.add("y", i64::MIN));
        assert_eq!(store.get("y"), 0);
    }

    #[test]
    fn test_prefix_provider() {
        let mut store = ConditionsStore::new();
        store.set("abc", 5);
        store
            .register_prefix_provider("event: ")
            .unwrap()
            .set_get_fn(|_| 42)
            .set_has_fn(|_| true);

        assert_eq!(store.get("event: test"), 42);
        assert_eq!(store.get("event: other"), 42);
        assert_eq!(store.get("abc"), 5);
        assert_eq!(store.get("event:"), 0);
    }

    #[test]
    fn test_prefix_provider_receives_full_key() {
        let mut store = ConditionsStore::new();
        let backing = map_provider(&mut store, "cargo: ");

        assert!(store.set("cargo: ore", 7));
        assert!(store.add("cargo: ore", 3));
        assert_eq!(backing.borrow().get("cargo: ore"), Some(&10));
        assert_eq!(store.get("cargo: ore"), 10);
        assert_eq!(store.has_get("cargo: ice"), (false, 0));

        assert!(store.erase("cargo: ore"));
        assert!(!store.erase("cargo: ore"));
        assert!(!store.has("cargo: ore"));
        // Only the provider's own row lives in the table.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_named_provider_reads_through() {
        let cash = Rc::new(Cell::new(0i64));
        let mut store = ConditionsStore::new();
        let (get_cash, set_cash) = (cash.clone(), cash.clone());
        store
            .register_named_provider("cash")
            .set_get_fn(move |_| get_cash.get())
            .set_has_fn(|_| true)
            .set_set_fn(move |_, value| {
                set_cash.set(value);
                true
            })
            .set_erase_fn(|_| false);

        assert!(store.set("cash", 100));
        assert_eq!(cash.get(), 100);

        cash.set(250);
        assert_eq!(store.get("cash"), 250);
        assert!(!store.erase("cash"));
        assert_eq!(store.get("cash: bonus"), 0);
    }

    #[test]
    fn test_rejected_writes_leave_value() {
        let mut store = ConditionsStore::new();
        store
            .register_named_provider("hull")
            .set_get_fn(|_| 7)
            .set_set_fn(|_, _| false)
            .set_erase_fn(|_| false);

        assert!(!store.set("hull", 1));
        assert!(!store.add("hull", 1));
        assert!(!store.erase("hull"));
        assert_eq!(store.get("hull"), 7);
    }

    #[test]
    fn test_has_get_skips_get_when_absent() {
        let mut store = ConditionsStore::new();
        store
            .register_named_provider("flagship")
            .set_has_fn(|_| false);

        // No get function is wired; reaching it would panic.
        assert_eq!(store.has_get("flagship"), (false, 0));
    }

    #[test]
    #[should_panic(expected = "has no set function")]
    fn test_unwired_set_panics() {
        let mut store = ConditionsStore::new();
        store.register_named_provider("cash").set_get_fn(|_| 0);
        store.set("cash", 10);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut store = ConditionsStore::new();
        store.register_named_provider("cash").set_get_fn(|_| 1);
        store.register_named_provider("cash").set_has_fn(|_| true);

        assert_eq!(store.provider_count(), 1);
        assert_eq!(store.get("cash"), 1);
        assert!(store.has("cash"));
    }

    #[test]
    fn test_registration_replaces_stored_row() {
        let mut store = ConditionsStore::new();
        store.set("cash", 10);
        store.register_named_provider("cash").set_get_fn(|_| 99);

        assert_eq!(store.get("cash"), 99);
        assert!(store.save().is_empty());
    }

    #[test]
    fn test_registration_conflicts() {
        let mut store = ConditionsStore::new();
        store
            .register_prefix_provider("ship: ")
            .unwrap()
            .set_get_fn(|key| key.len() as i64);

        let again = store.register_named_provider("ship: ");
        assert_eq!(again.kind(), ProviderKind::Prefix);
        assert_eq!(store.get("ship: Falcon"), 12);
        assert_eq!(
            store.register_prefix_provider("ship: model: ").unwrap_err(),
            Error::OverlappingPrefix {
                prefix: "ship: model: ".into(),
                existing: "ship: ".into(),
            }
        );
        assert!(store.register_prefix_provider("ship: ").is_ok());
        assert_eq!(store.provider_count(), 1);
    }

    #[test]
    fn test_overlapping_prefixes_allowed_by_config() {
        let config = StoreConfig::new().with_overlapping_prefixes(true);
        let mut store = ConditionsStore::with_config(config);
        store.register_prefix_provider("ship: ").unwrap();
        store.register_prefix_provider("ship: model: ").unwrap();
        assert_eq!(store.provider_count(), 2);
        assert!(!store.config().rejects_overlapping_prefixes());
    }

    #[test]
    fn test_entry_local() {
        let mut store = ConditionsStore::new();
        {
            let mut handle = store.entry("jumps");
            assert!(!handle.is_derived());
            assert_eq!(handle.read(), 0);
            handle.increment();
            handle.add_assign(4);
        }
        assert_eq!(store.get("jumps"), 5);

        store.entry("jumps").sub_assign(2);
        store.entry("jumps").decrement();
        assert_eq!(store.get("jumps"), 2);
    }

    #[test]
    fn test_entry_synthesizes_derived_row() {
        let mut store = ConditionsStore::new();
        let backing = map_provider(&mut store, "crew: ");

        {
            let mut handle = store.entry("crew: gunners");
            assert!(handle.is_derived());
            assert!(handle.write(2));
            assert!(handle.increment());
        }
        assert_eq!(backing.borrow().get("crew: gunners"), Some(&3));
        assert_eq!(store.len(), 2);

        // The synthesized row is addressable by exact key and never saved.
        assert_eq!(store.get("crew: gunners"), 3);
        assert!(store.primaries().next().is_none());

        // Keys sorting after the synthesized row still reach the provider.
        assert!(store.set("crew: pilots", 1));
        assert_eq!(backing.borrow().get("crew: pilots"), Some(&1));
    }

    #[test]
    fn test_entry_on_provider_root() {
        let cash = Rc::new(Cell::new(40i64));
        let mut store = ConditionsStore::new();
        let (get_cash, set_cash) = (cash.clone(), cash.clone());
        store
            .register_named_provider("cash")
            .set_get_fn(move |_| get_cash.get())
            .set_set_fn(move |_, value| {
                set_cash.set(value);
                true
            });

        store.entry("cash").add_assign(10);
        assert_eq!(cash.get(), 50);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_primaries_skip_derived() {
        let mut store = ConditionsStore::new();
        map_provider(&mut store, "event: ");
        store.entry("event: b").write(4);
        store.set("event", 1);
        store.set("events", 3);

        let pairs: Vec<_> = store.primaries().collect();
        assert_eq!(pairs, vec![("event", 1), ("events", 3)]);

        let pairs: Vec<_> = store.primaries_from("event: b").collect();
        assert_eq!(pairs, vec![("events", 3)]);

        let mut primaries = store.primaries();
        primaries.next();
        primaries.next();
        assert!(primaries == store.primaries_end());
    }

    #[test]
    fn test_save_omission() {
        let mut store = ConditionsStore::new();
        store.set("fuel", 1);
        store.set("score", 0);
        store.set("debt", -5);
        store.set("cargo", 30);

        assert_eq!(
            store.save(),
            vec![
                ConditionRecord::with_value("cargo", 30),
                ConditionRecord::with_value("debt", -5),
                ConditionRecord::flag("fuel"),
            ]
        );
    }

    #[test]
    fn test_load() {
        let mut store = ConditionsStore::new();
        store.load(vec![("fuel", None), ("cargo", Some(30i64)), ("score", Some(0))]);

        assert_eq!(store.get("fuel"), 1);
        assert_eq!(store.get("cargo"), 30);
        assert!(store.has("score"));
    }

    #[test]
    fn test_load_goes_through_providers() {
        let mut store = ConditionsStore::new();
        let backing = map_provider(&mut store, "rep: ");
        store.load(vec![ConditionRecord::with_value("rep: Navy", 8)]);

        assert_eq!(backing.borrow().get("rep: Navy"), Some(&8));
        assert!(store.save().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = ConditionsStore::new();
        store.set("fuel", 1);
        store.set("cargo", 30);
        store.set("debt", -5);

        let restored = ConditionsStore::from_records(store.save());
        for key in ["fuel", "cargo", "debt", "score"] {
            assert_eq!(restored.get(key), store.get(key), "key {key}");
        }
    }

    #[test]
    fn test_from_iterator() {
        let store: ConditionsStore = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(store.get("a"), 1);
        assert_eq!(store.get("b"), 2);

        let mut store = store;
        store.extend(vec![(String::from("c"), 3)]);
        assert_eq!(store.get("c"), 3);
    }

    #[test]
    fn test_clear() {
        let mut store = ConditionsStore::new();
        store.set("fuel", 4);
        map_provider(&mut store, "crew: ");
        store.entry("crew: pilots").write(1);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.provider_count(), 0);
        assert_eq!(store.get("fuel"), 0);
        assert_eq!(store.get("crew: pilots"), 0);
        assert!(store.provider("crew: ").is_none());

        // A fresh registration after clearing starts from scratch.
        store.register_named_provider("cash").set_get_fn(|_| 7);
        assert_eq!(store.get("cash"), 7);
    }
}
