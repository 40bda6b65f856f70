//! Error types for view resolution and caching

/// Failure reported by a [`ViewResolver`](crate::ViewResolver)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// View does not exist (deleted or never created)
    #[error("view not found: {0}")]
    NotFound(String),

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with something unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Resolution failed; the cache was left unchanged
    #[error("failed to resolve view {view_id}: {source}")]
    Resolve {
        /// View being resolved
        view_id: String,
        /// Underlying failure
        #[source]
        source: ResolveError,
    },
}

impl CacheError {
    /// Create resolve error for view
    pub fn resolve(view_id: impl Into<String>, source: ResolveError) -> Self {
        Self::Resolve {
            view_id: view_id.into(),
            source,
        }
    }
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = CacheError::resolve("view_1", ResolveError::Network("timeout".into()));
        assert_eq!(
            err.to_string(),
            "failed to resolve view view_1: network error: timeout"
        );
    }
}
