//! Error types for Tabspace Core
//!
//! Tab and pane operations never fail; a missing target is a no-op that is
//! reported through [`crate::Diagnostics`]. Errors are reserved for:
//! - Storage backend failures
//! - Spaces API failures and system-space protection
//! - Configuration loading
//! - View resolution

use std::path::PathBuf;
use tabspace_cache::CacheError;

/// Main workspace error type
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Space operation failed
    #[error("space error: {0}")]
    Space(#[from] SpaceError),

    /// Configuration invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// View resolution failed
    #[error("view error: {0}")]
    View(#[from] CacheError),

    /// Engine built without a view resolver
    #[error("no view resolver configured")]
    NoViewResolver,
}

/// Storage backend errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// Space errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpaceError {
    /// No space with this id
    #[error("space not found: {0}")]
    NotFound(String),

    /// The system space cannot be renamed or deleted
    #[error("space {0} is the system space")]
    SystemSpace(String),

    /// Spaces API call failed
    #[error("spaces api error: {0}")]
    Api(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong
        reason: String,
    },
}

impl ConfigError {
    /// Create invalid-value error
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for workspace operations
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
