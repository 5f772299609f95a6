//! Registry owning every derived provider of a store

use crate::provider::{DerivedProvider, ProviderId, ProviderKind};
use indexmap::IndexMap;
use std::ops::{Index, IndexMut};
use tracing::warn;

/// Arena of providers keyed by name
///
/// A provider's [`ProviderId`] is its insertion index. Providers are only
/// dropped all at once by [`ProviderRegistry::clear`], so ids never shift.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, DerivedProvider>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, or return the existing one with the same name
    ///
    /// An existing provider keeps the kind it was first registered with.
    pub fn register(&mut self, name: &str, kind: ProviderKind) -> ProviderId {
        if let Some((index, _, existing)) = self.providers.get_full(name) {
            if existing.kind() != kind {
                warn!(
                    name,
                    registered_as = %existing.kind(),
                    requested = %kind,
                    "provider re-registered as a different kind"
                );
            }
            return ProviderId(index);
        }

        let (index, _) = self
            .providers
            .insert_full(name.to_owned(), DerivedProvider::new(name, kind));
        ProviderId(index)
    }

    /// Find a prefix provider whose prefix overlaps `prefix`
    ///
    /// Two prefixes overlap when one is a literal prefix of the other. A
    /// provider registered under exactly `prefix` is not an overlap.
    pub fn overlapping_prefix(&self, prefix: &str) -> Option<&DerivedProvider> {
        self.providers.values().find(|provider| {
            provider.is_prefix()
                && provider.name() != prefix
                && (prefix.starts_with(provider.name()) || provider.name().starts_with(prefix))
        })
    }

    /// Get a provider by id
    pub fn get(&self, id: ProviderId) -> Option<&DerivedProvider> {
        self.providers.get_index(id.0).map(|(_, provider)| provider)
    }

    /// Get a provider by name
    pub fn by_name(&self, name: &str) -> Option<&DerivedProvider> {
        self.providers.get(name)
    }

    /// Get the id of the provider registered under `name`
    pub fn id_of(&self, name: &str) -> Option<ProviderId> {
        self.providers.get_index_of(name).map(ProviderId)
    }

    /// Iterate providers in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &DerivedProvider)> {
        self.providers
            .values()
            .enumerate()
            .map(|(index, provider)| (ProviderId(index), provider))
    }

    /// Get the number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Drop every provider, invalidating all ids
    pub fn clear(&mut self) {
        self.providers.clear();
    }
}

impl Index<ProviderId> for ProviderRegistry {
    type Output = DerivedProvider;

    fn index(&self, id: ProviderId) -> &DerivedProvider {
        &self.providers[id.0]
    }
}

impl IndexMut<ProviderId> for ProviderRegistry {
    fn index_mut(&mut self, id: ProviderId) -> &mut DerivedProvider {
        &mut self.providers[id.0]
    }
}
