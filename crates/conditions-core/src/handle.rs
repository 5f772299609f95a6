//! Mutable handle to a single condition row

use crate::entry::ConditionEntry;
use crate::provider::DerivedProvider;
use crate::registry::ProviderRegistry;

/// Read-modify-write access to one condition
///
/// Returned by [`ConditionsStore::entry`]. The row it points at always exists
/// at the exact key it was requested for. Stored rows are updated in place;
/// provider-backed rows route every operation through the provider, using the
/// row's full key or, on the provider's own row, the provider's name.
///
/// Write operations return the provider's verdict and are always `true` for
/// stored rows.
///
/// [`ConditionsStore::entry`]: crate::ConditionsStore::entry
#[derive(Debug)]
pub struct ConditionHandle<'a> {
    target: Target<'a>,
}

#[derive(Debug)]
enum Target<'a> {
    Local(&'a mut i64),
    Derived {
        provider: &'a mut DerivedProvider,
        key: String,
    },
}

impl<'a> ConditionHandle<'a> {
    pub(crate) fn new(entry: &'a mut ConditionEntry, providers: &'a mut ProviderRegistry) -> Self {
        let target = match entry {
            ConditionEntry::Local(value) => Target::Local(value),
            ConditionEntry::Derived { provider, full_key } => {
                let provider = &mut providers[*provider];
                let key = match full_key {
                    Some(key) => key.clone(),
                    None => provider.name().to_owned(),
                };
                Target::Derived { provider, key }
            }
        };
        Self { target }
    }

    /// Check if this handle routes through a provider
    pub fn is_derived(&self) -> bool {
        matches!(self.target, Target::Derived { .. })
    }

    /// Read the current value
    pub fn read(&self) -> i64 {
        match &self.target {
            Target::Local(value) => **value,
            Target::Derived { provider, key } => provider.get(key),
        }
    }

    /// Overwrite the value
    pub fn write(&mut self, value: i64) -> bool {
        match &mut self.target {
            Target::Local(slot) => {
                **slot = value;
                true
            }
            Target::Derived { provider, key } => provider.set(key, value),
        }
    }

    /// Add `delta` to the value, wrapping on overflow
    pub fn add_assign(&mut self, delta: i64) -> bool {
        self.update(|value| value.wrapping_add(delta))
    }

    /// Subtract `delta` from the value, wrapping on overflow
    pub fn sub_assign(&mut self, delta: i64) -> bool {
        self.update(|value| value.wrapping_sub(delta))
    }

    /// Add one to the value
    pub fn increment(&mut self) -> bool {
        self.add_assign(1)
    }

    /// Subtract one from the value
    pub fn decrement(&mut self) -> bool {
        self.sub_assign(1)
    }

    fn update(&mut self, op: impl FnOnce(i64) -> i64) -> bool {
        match &mut self.target {
            Target::Local(slot) => {
                **slot = op(**slot);
                true
            }
            Target::Derived { provider, key } => {
                let current = provider.get(key);
                provider.set(key, op(current))
            }
        }
    }
}
