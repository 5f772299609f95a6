//! Derived-condition providers
//!
//! A provider is a bundle of four optional functions (get, has, set, erase)
//! that computes condition values on demand instead of storing them. Every
//! function receives the exact key that was queried, so a single prefix
//! provider can serve a whole namespace of keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Computes the value of a derived condition.
pub type GetFn = Box<dyn Fn(&str) -> i64>;
/// Reports whether a derived condition currently exists.
pub type HasFn = Box<dyn Fn(&str) -> bool>;
/// Writes a derived condition, returning `false` when the write is rejected.
pub type SetFn = Box<dyn FnMut(&str, i64) -> bool>;
/// Erases a derived condition, returning `false` when the erase is rejected.
pub type EraseFn = Box<dyn FnMut(&str) -> bool>;

/// Stable index of a provider inside its registry
///
/// Entries refer to providers through this index rather than owning them.
/// Providers are never removed individually, so an index stays valid until
/// the owning store is cleared, which drops every entry along with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub(crate) usize);

impl ProviderId {
    /// Get the raw index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider:{}", self.0)
    }
}

/// How a provider claims keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Serves exactly one key, its own name
    Named,
    /// Serves every key that starts with its name
    Prefix,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Named => write!(f, "named"),
            ProviderKind::Prefix => write!(f, "prefix"),
        }
    }
}

/// A named or prefix-scoped source of derived conditions
///
/// Obtained from [`ConditionsStore::register_named_provider`] or
/// [`ConditionsStore::register_prefix_provider`]. All four functions must be
/// wired before any key can reach the provider through the matching
/// operation: dispatching to an unset function panics.
///
/// [`ConditionsStore::register_named_provider`]: crate::ConditionsStore::register_named_provider
/// [`ConditionsStore::register_prefix_provider`]: crate::ConditionsStore::register_prefix_provider
pub struct DerivedProvider {
    name: String,
    kind: ProviderKind,
    get_fn: Option<GetFn>,
    has_fn: Option<HasFn>,
    set_fn: Option<SetFn>,
    erase_fn: Option<EraseFn>,
}

impl DerivedProvider {
    pub(crate) fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            get_fn: None,
            has_fn: None,
            set_fn: None,
            erase_fn: None,
        }
    }

    /// The registered name (or prefix)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this provider is named or prefix-scoped
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Check if this provider governs a whole key namespace
    pub fn is_prefix(&self) -> bool {
        self.kind == ProviderKind::Prefix
    }

    /// Check if this provider governs `key`, either by name or by prefix
    pub fn governs(&self, key: &str) -> bool {
        match self.kind {
            ProviderKind::Named => key == self.name,
            ProviderKind::Prefix => key.starts_with(self.name.as_str()),
        }
    }

    /// Attach the get function
    pub fn set_get_fn(&mut self, f: impl Fn(&str) -> i64 + 'static) -> &mut Self {
        self.get_fn = Some(Box::new(f));
        self
    }

    /// Attach the has function
    pub fn set_has_fn(&mut self, f: impl Fn(&str) -> bool + 'static) -> &mut Self {
        self.has_fn = Some(Box::new(f));
        self
    }

    /// Attach the set function
    pub fn set_set_fn(&mut self, f: impl FnMut(&str, i64) -> bool + 'static) -> &mut Self {
        self.set_fn = Some(Box::new(f));
        self
    }

    /// Attach the erase function
    pub fn set_erase_fn(&mut self, f: impl FnMut(&str) -> bool + 'static) -> &mut Self {
        self.erase_fn = Some(Box::new(f));
        self
    }

    /// Check that all four functions are attached
    pub fn is_complete(&self) -> bool {
        self.get_fn.is_some()
            && self.has_fn.is_some()
            && self.set_fn.is_some()
            && self.erase_fn.is_some()
    }

    pub(crate) fn get(&self, key: &str) -> i64 {
        match &self.get_fn {
            Some(f) => f(key),
            None => self.unwired("get", key),
        }
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        match &self.has_fn {
            Some(f) => f(key),
            None => self.unwired("has", key),
        }
    }

    pub(crate) fn set(&mut self, key: &str, value: i64) -> bool {
        if let Some(f) = self.set_fn.as_mut() {
            return f(key, value);
        }
        self.unwired("set", key)
    }

    pub(crate) fn erase(&mut self, key: &str) -> bool {
        if let Some(f) = self.erase_fn.as_mut() {
            return f(key);
        }
        self.unwired("erase", key)
    }

    // Unset slots are a wiring bug in the registering code, never a zero.
    fn unwired(&self, slot: &str, key: &str) -> ! {
        panic!(
            "{} provider `{}` has no {} function (dispatched for key `{}`)",
            self.kind, self.name, slot, key
        )
    }
}

impl fmt::Debug for DerivedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedProvider")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("get", &self.get_fn.is_some())
            .field("has", &self.has_fn.is_some())
            .field("set", &self.set_fn.is_some())
            .field("erase", &self.erase_fn.is_some())
            .finish()
    }
}
