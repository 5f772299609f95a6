//! Store configuration

use serde::{Deserialize, Serialize};

/// Configuration for a [`ConditionsStore`](crate::ConditionsStore)
///
/// # Example
///
/// ```
/// use conditions_core::StoreConfig;
///
/// let config = StoreConfig::default();
/// assert!(config.rejects_overlapping_prefixes());
///
/// let config = StoreConfig::default().with_overlapping_prefixes(true);
/// assert!(!config.rejects_overlapping_prefixes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Refuse to register a prefix provider that nests with another one
    ///
    /// Resolution cannot tell nested prefixes apart, so keys under the inner
    /// prefix may reach the outer provider.
    reject_overlapping_prefixes: bool,
}

impl StoreConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow or refuse nested prefix providers
    pub fn with_overlapping_prefixes(mut self, allow: bool) -> Self {
        self.reject_overlapping_prefixes = !allow;
        self
    }

    /// Check if nested prefix providers are refused
    pub fn rejects_overlapping_prefixes(&self) -> bool {
        self.reject_overlapping_prefixes
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reject_overlapping_prefixes: true,
        }
    }
}
