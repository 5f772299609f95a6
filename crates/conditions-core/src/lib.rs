//! Conditions Core - Integer condition store with derived values
//!
//! This crate provides a key-value store of integer "conditions" for
//! scripted state evaluation:
//! - Stored (primary) conditions, saved and loaded as flat records
//! - Derived conditions computed on demand by registered providers
//! - Providers addressed by exact name or by ownership of a key prefix
//! - Ordered iteration over stored conditions only
//!
//! A derived condition reads and writes exactly like a stored one, so code
//! evaluating conditions never needs to know which keys are backed by a
//! provider.
//!
//! ## Providers
//!
//! ```
//! use conditions_core::ConditionsStore;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let credits = Rc::new(Cell::new(500i64));
//! let mut store = ConditionsStore::new();
//!
//! let (read, write) = (credits.clone(), credits.clone());
//! store
//!     .register_named_provider("credits")
//!     .set_get_fn(move |_| read.get())
//!     .set_has_fn(|_| true)
//!     .set_set_fn(move |_, value| {
//!         write.set(value);
//!         true
//!     })
//!     .set_erase_fn(|_| false);
//!
//! store.add("credits", 250);
//! assert_eq!(credits.get(), 750);
//! assert!(store.save().is_empty());
//! ```
//!
//! Stores are single-threaded: providers hold plain closures and nothing is
//! synchronized.

mod config;
mod entry;
mod error;
mod handle;
mod primaries;
mod provider;
mod record;
mod registry;
pub mod resolve;
mod store;

pub use config::StoreConfig;
pub use entry::{ConditionEntry, EntryTable};
pub use error::{Error, Result};
pub use handle::ConditionHandle;
pub use primaries::Primaries;
pub use provider::{DerivedProvider, EraseFn, GetFn, HasFn, ProviderId, ProviderKind, SetFn};
pub use record::{ConditionRecord, IMPLICIT_VALUE};
pub use registry::ProviderRegistry;
pub use resolve::Resolved;
pub use store::ConditionsStore;
