//! Error types for conditions-core

use thiserror::Error;

/// Core error type
///
/// Only prefix provider registration can fail. Reads are total and delegated
/// writes report rejection through their `bool` result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Prefix provider `{prefix}` overlaps existing prefix provider `{existing}`")]
    OverlappingPrefix { prefix: String, existing: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
