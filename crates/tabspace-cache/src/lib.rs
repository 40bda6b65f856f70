//! Tabspace Cache
//!
//! Caches that sit next to the tab engine:
//!
//! - [`ViewCache`]: resolved saved views, invalidated by namespace or
//!   wholesale (backed by moka)
//! - [`EntityMetadataRegistry`]: lazily created, locally patchable display
//!   metadata for referenced entities
//! - [`Generation`]: last-request-wins guard for overlapping async fetches
//!
//! # Example
//!
//! ```rust
//! use tabspace_cache::Generation;
//!
//! let stream = Generation::new();
//! let stale = stream.begin();
//! let fresh = stream.begin();
//!
//! assert!(stream.commit(fresh, "fresh"));
//! assert!(!stream.commit(stale, "stale"));
//! assert_eq!(stream.latest(), Some("fresh"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod generation;
pub mod metadata;
pub mod resolver;
pub mod view_cache;

// Re-exports
pub use error::{CacheError, CacheResult, ResolveError};
pub use generation::{Generation, GenerationSet, Ticket};
pub use metadata::{EntityMetadata, EntityMetadataRegistry, MetadataPatch};
pub use resolver::{ViewEntity, ViewResolution, ViewResolver};
pub use view_cache::{ViewCache, ViewCacheEntry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
