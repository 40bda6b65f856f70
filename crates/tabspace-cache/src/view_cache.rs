//! Resolved view cache using moka
//!
//! Memoizes [`ViewResolution`]s by view id. Entries are dropped by
//! namespace (after an entity create/update/delete in that namespace) or
//! wholesale (on space switch).

use crate::error::{CacheError, CacheResult};
use crate::generation::GenerationSet;
use crate::resolver::{ViewEntity, ViewResolution, ViewResolver};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use moka::future::Cache;
use std::collections::HashSet;
use std::sync::Arc;

/// Cached view resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCacheEntry {
    /// View id
    pub view_id: String,
    /// Namespace tag used for invalidation
    pub namespace: String,
    /// Resolved entities
    pub entities: Vec<ViewEntity>,
    /// When the entry was stored
    pub cached_at: DateTime<Utc>,
}

/// View resolution cache
///
/// Cloning is cheap; clones share storage.
#[derive(Debug, Clone)]
pub struct ViewCache {
    inner: Cache<String, Arc<ViewCacheEntry>>,
    by_namespace: Arc<DashMap<String, HashSet<String>>>,
    requests: Arc<GenerationSet<String>>,
    in_flight: Arc<DashMap<String, usize>>,
}

impl ViewCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            by_namespace: Arc::new(DashMap::new()),
            requests: Arc::new(GenerationSet::new()),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Cached entry, if present
    #[inline]
    pub async fn get(&self, view_id: &str) -> Option<Arc<ViewCacheEntry>> {
        self.inner.get(view_id).await
    }

    /// Check if view is cached
    #[inline]
    pub async fn contains(&self, view_id: &str) -> bool {
        self.inner.get(view_id).await.is_some()
    }

    /// Return cached entities or resolve them
    ///
    /// With `force_refresh`, or when nothing is cached, calls the resolver
    /// and stores the result. If a newer resolve for the same view started
    /// while this one was in flight, this result is returned to the caller
    /// but not stored.
    ///
    /// # Errors
    /// `CacheError::Resolve` when the resolver fails; the cache is left
    /// unchanged.
    pub async fn resolve<R>(
        &self,
        view_id: &str,
        force_refresh: bool,
        resolver: &R,
    ) -> CacheResult<Vec<ViewEntity>>
    where
        R: ViewResolver + ?Sized,
    {
        if !force_refresh {
            if let Some(entry) = self.inner.get(view_id).await {
                tracing::trace!(view_id, "view cache hit");
                return Ok(entry.entities.clone());
            }
        }

        let key = view_id.to_string();
        let ticket = self.requests.begin(&key);
        *self.in_flight.entry(key.clone()).or_default() += 1;
        let result = resolver.resolve_view(view_id).await;
        self.finish_flight(&key);
        let resolution = result.map_err(|source| {
            tracing::warn!(view_id, error = %source, "view resolution failed");
            CacheError::resolve(view_id, source)
        })?;
        let entities = resolution.entities.clone();

        if self.requests.is_current(&key, ticket) {
            self.insert(resolution).await;
        } else {
            tracing::debug!(view_id, "discarding superseded view resolution");
        }

        Ok(entities)
    }

    fn finish_flight(&self, view_id: &str) {
        if let Some(mut pending) = self.in_flight.get_mut(view_id) {
            *pending = pending.saturating_sub(1);
        }
        self.in_flight.remove_if(view_id, |_, pending| *pending == 0);
    }

    /// In-flight views not yet known to belong to another namespace
    fn pending_in(&self, namespace: &str) -> Vec<String> {
        self.in_flight
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|view_id| {
                !self
                    .by_namespace
                    .iter()
                    .any(|ids| ids.key() != namespace && ids.value().contains(view_id))
            })
            .collect()
    }

    /// Store a resolution
    pub async fn insert(&self, resolution: ViewResolution) {
        let ViewResolution {
            view_id,
            namespace,
            entities,
        } = resolution;

        self.by_namespace
            .entry(namespace.clone())
            .or_default()
            .insert(view_id.clone());

        let entry = ViewCacheEntry {
            view_id: view_id.clone(),
            namespace,
            entities,
            cached_at: Utc::now(),
        };
        self.inner.insert(view_id, Arc::new(entry)).await;
    }

    /// Drop one namespace's views, or everything when `namespace` is `None`
    ///
    /// Resolves still in flight for an affected view are not stored when
    /// they complete.
    pub async fn invalidate(&self, namespace: Option<&str>) {
        let Some(namespace) = namespace else {
            self.clear();
            return;
        };

        // A view's namespace is only learned when its first fetch lands, so
        // unregistered in-flight fetches are superseded too.
        for view_id in self.pending_in(namespace) {
            self.requests.invalidate(&view_id);
        }

        let Some((_, view_ids)) = self.by_namespace.remove(namespace) else {
            return;
        };
        tracing::debug!(namespace, views = view_ids.len(), "invalidating views");
        for view_id in view_ids {
            self.requests.invalidate(&view_id);
            self.inner.invalidate(&view_id).await;
        }
    }

    /// Drop a single view
    pub async fn invalidate_view(&self, view_id: &str) {
        self.requests.invalidate(&view_id.to_string());
        self.inner.invalidate(view_id).await;
        for mut ids in self.by_namespace.iter_mut() {
            ids.value_mut().remove(view_id);
        }
    }

    /// Drop every entry and supersede in-flight resolves
    pub fn clear(&self) {
        self.requests.invalidate_all();
        self.by_namespace.clear();
        self.inner.invalidate_all();
    }

    /// Approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for ViewCache {
    /// Create cache with default capacity (1,000 views)
    fn default() -> Self {
        Self::new(1_000)
    }
}
