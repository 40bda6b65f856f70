//! Workspace engine
//!
//! One explicit instance owns every piece of workspace state. Each
//! mutating call runs the manager and then [`WorkspaceEngine::commit`]s
//! the result: history push, persistence, URL sync, snapshot publish, in
//! that order and within the same call.

use crate::config::WorkspaceConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, DiagnosticsHook};
use crate::error::{SpaceError, WorkspaceError, WorkspaceResult};
use crate::history::HistoryStack;
use crate::manager::{Change, OpenOptions, PaneTabManager, TabInput, TabPatch};
use crate::persistence::{MemoryStorage, PersistenceCodec, StorageBackend};
use crate::space::{
    CreateSpace, LocalSpaces, Space, SpaceContents, SpaceSwitcher, SpacesApi, UpdateSpace,
};
use crate::types::{PaneId, TabId, WorkbenchState, WorkspaceSnapshot};
use crate::url::{derive_url, parse_url, UrlSynchronizer, UrlUpdate};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tabspace_cache::{
    EntityMetadata, EntityMetadataRegistry, MetadataPatch, ViewCache, ViewEntity, ViewResolver,
};
use tabspace_route::{DefaultRouteRegistry, EntityNamespace, RouteRegistry};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Builder for [`WorkspaceEngine`]
#[derive(Default)]
pub struct WorkspaceEngineBuilder {
    config: WorkspaceConfig,
    registry: Option<Arc<dyn RouteRegistry>>,
    storage: Option<Arc<dyn StorageBackend>>,
    spaces_api: Option<Arc<dyn SpacesApi>>,
    view_resolver: Option<Arc<dyn ViewResolver>>,
    diagnostics_hook: Option<DiagnosticsHook>,
    initial_space: Option<String>,
    spaces: Vec<Space>,
}

impl WorkspaceEngineBuilder {
    /// With configuration
    #[must_use]
    pub fn config(mut self, config: WorkspaceConfig) -> Self {
        self.config = config;
        self
    }

    /// With route registry (defaults to [`DefaultRouteRegistry`])
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn RouteRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// With storage backend (defaults to [`MemoryStorage`])
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// With spaces API (defaults to [`LocalSpaces`])
    #[must_use]
    pub fn spaces_api(mut self, api: Arc<dyn SpacesApi>) -> Self {
        self.spaces_api = Some(api);
        self
    }

    /// With view resolver
    #[must_use]
    pub fn view_resolver(mut self, resolver: Arc<dyn ViewResolver>) -> Self {
        self.view_resolver = Some(resolver);
        self
    }

    /// With diagnostics hook
    #[must_use]
    pub fn diagnostics_hook(mut self, hook: DiagnosticsHook) -> Self {
        self.diagnostics_hook = Some(hook);
        self
    }

    /// Space to open first (defaults to the system space)
    #[must_use]
    pub fn initial_space(mut self, space_id: impl Into<String>) -> Self {
        self.initial_space = Some(space_id.into());
        self
    }

    /// Seed the space list before [`WorkspaceEngine::load_spaces`] runs
    #[must_use]
    pub fn spaces(mut self, spaces: Vec<Space>) -> Self {
        self.spaces = spaces;
        self
    }

    /// Build the engine and restore the initial space's tabs
    ///
    /// # Errors
    /// `WorkspaceError::Config` when the configuration is invalid.
    pub fn build(self) -> WorkspaceResult<WorkspaceEngine> {
        self.config.validate()?;
        let config = self.config;

        let diagnostics = match self.diagnostics_hook {
            Some(hook) => Diagnostics::with_hook(hook),
            None => Diagnostics::new(),
        };
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(DefaultRouteRegistry::new()));
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let spaces_api = self
            .spaces_api
            .unwrap_or_else(|| Arc::new(LocalSpaces::new(&config.system_space_id)));

        let mut spaces = SpaceSwitcher::new(config.system_space_id.clone(), diagnostics.clone());
        spaces.set_spaces(self.spaces);
        if let Some(initial) = &self.initial_space {
            if !spaces.set_active(initial) {
                diagnostics.not_found("build", initial);
            }
        }

        let mut manager = PaneTabManager::new(Arc::clone(&registry), &config, diagnostics.clone());
        if let Some(route) = spaces.active_space().and_then(|s| s.default_route.clone()) {
            manager.set_default_route(route);
        }
        let codec = PersistenceCodec::new(storage, &config, diagnostics.clone());
        let state = codec
            .load(spaces.active_space_id())
            .unwrap_or_else(|| manager.default_state());
        manager.replace_state(state);

        let mut history = HistoryStack::new(config.history_limit);
        if let Some(tab) = manager.state().active_tab() {
            history.push(tab.id);
        }
        let mut url = UrlSynchronizer::new();
        url.reset(derive_url(manager.state()));

        let (snapshots, _) = watch::channel(Arc::new(WorkspaceSnapshot {
            space_id: spaces.active_space_id().to_string(),
            state: manager.state().clone(),
            url: url.current().unwrap_or("/").to_string(),
            url_update: None,
            can_go_back: history.can_go_back(),
            can_go_forward: history.can_go_forward(),
        }));

        info!(space_id = spaces.active_space_id(), tabs = manager.state().tab_count(), "workspace engine ready");

        Ok(WorkspaceEngine {
            views: ViewCache::new(config.view_cache_capacity),
            metadata: EntityMetadataRegistry::new(),
            config,
            registry,
            manager,
            history,
            codec,
            url,
            spaces,
            spaces_api,
            view_resolver: self.view_resolver,
            diagnostics,
            snapshots,
        })
    }
}

/// The workspace: spaces, panes, tabs, history, URL and caches
pub struct WorkspaceEngine {
    config: WorkspaceConfig,
    registry: Arc<dyn RouteRegistry>,
    manager: PaneTabManager,
    history: HistoryStack,
    codec: PersistenceCodec,
    url: UrlSynchronizer,
    spaces: SpaceSwitcher,
    spaces_api: Arc<dyn SpacesApi>,
    views: ViewCache,
    metadata: EntityMetadataRegistry,
    view_resolver: Option<Arc<dyn ViewResolver>>,
    diagnostics: Diagnostics,
    snapshots: watch::Sender<Arc<WorkspaceSnapshot>>,
}

impl WorkspaceEngine {
    /// Start building an engine
    #[must_use]
    pub fn builder() -> WorkspaceEngineBuilder {
        WorkspaceEngineBuilder::default()
    }

    // ----- accessors -----

    /// Current panes and tabs
    #[inline]
    #[must_use]
    pub fn state(&self) -> &WorkbenchState {
        self.manager.state()
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<WorkspaceSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receive a snapshot after every mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<WorkspaceSnapshot>> {
        self.snapshots.subscribe()
    }

    /// URL the address bar shows
    #[must_use]
    pub fn current_url(&self) -> String {
        self.url
            .current()
            .map_or_else(|| derive_url(self.manager.state()), str::to_string)
    }

    /// Activation history
    #[inline]
    #[must_use]
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Persistence codec
    #[inline]
    #[must_use]
    pub fn codec(&self) -> &PersistenceCodec {
        &self.codec
    }

    /// Active space record
    #[must_use]
    pub fn active_space(&self) -> Option<&Space> {
        self.spaces.active_space()
    }

    /// Active space id
    #[inline]
    #[must_use]
    pub fn active_space_id(&self) -> &str {
        self.spaces.active_space_id()
    }

    /// Known spaces, system first
    #[inline]
    #[must_use]
    pub fn spaces(&self) -> &[Space] {
        self.spaces.spaces()
    }

    /// Cached sidebar contents of a space
    #[must_use]
    pub fn space_contents(&self, space_id: &str) -> Option<&SpaceContents> {
        self.spaces.contents(space_id)
    }

    // ----- commit pipeline -----

    fn commit(&mut self, change: Change) -> Option<UrlUpdate> {
        if !change.is_effective() {
            return None;
        }
        if let Some(tab_id) = change.activated {
            self.history.push(tab_id);
        }
        self.persist();
        let update = self.url.sync(self.manager.state());
        self.publish(update.clone());
        update
    }

    fn persist(&self) {
        let space_id = self.spaces.active_space_id();
        if let Err(err) = self.codec.save(space_id, self.manager.state()) {
            let key = self.codec.key(space_id);
            warn!(key = %key, error = %err, "failed to persist workspace");
            self.diagnostics.emit(Diagnostic::StorageFailure {
                key,
                error: err.to_string(),
            });
        }
    }

    fn publish(&self, url_update: Option<UrlUpdate>) {
        let snapshot = WorkspaceSnapshot {
            space_id: self.spaces.active_space_id().to_string(),
            state: self.manager.state().clone(),
            url: self.current_url(),
            url_update,
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
        };
        self.snapshots.send_replace(Arc::new(snapshot));
    }

    // ----- tabs and panes -----

    /// Open a tab from explicit fields
    pub fn open_tab(&mut self, input: TabInput, pane_id: Option<PaneId>) -> Option<UrlUpdate> {
        let change = self.manager.open_tab(input, pane_id);
        self.commit(change)
    }

    /// Navigate to a route, reusing or rewriting tabs where possible
    pub fn open_tab_from_route(&mut self, route: &str, options: OpenOptions) -> Option<UrlUpdate> {
        let change = self.manager.open_tab_from_route(route, options);
        self.commit(change)
    }

    /// Activate a tab
    pub fn activate_tab(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        let change = self.manager.activate_tab(tab_id);
        self.commit(change)
    }

    /// Close a tab
    pub fn close_tab(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        let change = self.manager.close_tab(tab_id);
        self.commit(change)
    }

    /// Close every unpinned tab in the pane except `tab_id`
    pub fn close_other_tabs(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        let change = self.manager.close_other_tabs(tab_id);
        self.commit(change)
    }

    /// Close the unpinned tabs right of `tab_id`
    pub fn close_tabs_to_right(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        let change = self.manager.close_tabs_to_right(tab_id);
        self.commit(change)
    }

    /// Pin or unpin a tab
    pub fn toggle_pin(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        let change = self.manager.toggle_pin(tab_id);
        self.commit(change)
    }

    /// Move a tab within its pane
    pub fn reorder_tabs(&mut self, pane_id: PaneId, from: usize, to: usize) -> Option<UrlUpdate> {
        let change = self.manager.reorder_tabs(pane_id, from, to);
        self.commit(change)
    }

    /// Replace a pane's tab order
    pub fn set_tab_order(&mut self, pane_id: PaneId, ids: &[TabId]) -> Option<UrlUpdate> {
        let change = self.manager.set_tab_order(pane_id, ids);
        self.commit(change)
    }

    /// Change a tab's label or icon
    pub fn update_tab(&mut self, tab_id: TabId, patch: TabPatch) -> Option<UrlUpdate> {
        let change = self.manager.update_tab(tab_id, patch);
        self.commit(change)
    }

    /// Remember a tab's scroll offset
    pub fn set_scroll_position(&mut self, tab_id: TabId, position: Option<f64>) -> Option<UrlUpdate> {
        let change = self.manager.set_scroll_position(tab_id, position);
        self.commit(change)
    }

    /// Expand or collapse a view in the sidebar
    pub fn toggle_view_expanded(&mut self, view_id: &str) -> Option<UrlUpdate> {
        let change = self.manager.toggle_view_expanded(view_id);
        self.commit(change)
    }

    /// Split into two panes
    pub fn enable_split(&mut self) -> Option<UrlUpdate> {
        let change = self.manager.enable_split();
        self.commit(change)
    }

    /// Merge back into one pane
    pub fn disable_split(&mut self) -> Option<UrlUpdate> {
        let change = self.manager.disable_split();
        self.commit(change)
    }

    /// Split, or unsplit when already split
    pub fn toggle_split(&mut self) -> Option<UrlUpdate> {
        if self.manager.state().is_split() {
            self.disable_split()
        } else {
            self.enable_split()
        }
    }

    /// Move a tab to the other pane
    pub fn move_tab_to_pane(&mut self, tab_id: TabId, target: PaneId) -> Option<UrlUpdate> {
        let change = self.manager.move_tab_to_pane(tab_id, target);
        self.commit(change)
    }

    /// Set the left pane's width
    pub fn resize_split(&mut self, left_percent: f64) -> Option<UrlUpdate> {
        let change = self.manager.resize_split(left_percent);
        self.commit(change)
    }

    /// Focus a pane
    pub fn focus_pane(&mut self, pane_id: PaneId) -> Option<UrlUpdate> {
        let change = self.manager.focus_pane(pane_id);
        self.commit(change)
    }

    /// Drop every tab and open the default one
    pub fn reset(&mut self) -> Option<UrlUpdate> {
        let change = self.manager.reset_to_default();
        self.commit(change)
    }

    // ----- history -----

    /// Activate the previous tab in history
    pub fn go_back(&mut self) -> Option<UrlUpdate> {
        let tab_id = self.history.back()?;
        self.replay(tab_id)
    }

    /// Activate the next tab in history
    pub fn go_forward(&mut self) -> Option<UrlUpdate> {
        let tab_id = self.history.forward()?;
        self.replay(tab_id)
    }

    fn replay(&mut self, tab_id: TabId) -> Option<UrlUpdate> {
        self.history.begin_replay();
        let change = self.manager.activate_tab(tab_id);
        let update = if change.is_effective() {
            self.commit(change)
        } else {
            // closed since it was recorded; the cursor still moved
            self.publish(None);
            None
        };
        self.history.end_replay();
        update
    }

    // ----- url -----

    /// Bring state in line with an incoming URL (deep link, popstate)
    ///
    /// The path opens in the left pane and `?right=` in the right pane,
    /// splitting or unsplitting as needed. Nothing is pushed to the
    /// address bar; a replace is returned only when normalization changed
    /// the URL.
    pub fn apply_url(&mut self, url: &str) -> Option<UrlUpdate> {
        let target = parse_url(url);
        debug!(path = %target.path, right = ?target.right, "applying url");
        self.url.begin_apply();

        let change = self
            .manager
            .open_tab_from_route(&target.path, OpenOptions::in_pane(PaneId::Left));
        self.commit(change);

        match &target.right {
            Some(right) => {
                if !self.manager.state().is_split() {
                    let change = self.manager.enable_split();
                    self.commit(change);
                }
                let change = self
                    .manager
                    .open_tab_from_route(right, OpenOptions::in_pane(PaneId::Right));
                self.commit(change);
            }
            None if self.manager.state().is_split() => {
                let change = self.manager.disable_split();
                self.commit(change);
            }
            None => {}
        }

        let update = self.url.finish_apply(&target, self.manager.state());
        self.publish(update.clone());
        update
    }

    // ----- spaces -----

    /// Fetch the space list
    ///
    /// The system space is always kept. If the active space disappeared,
    /// the engine switches to the system space.
    ///
    /// # Errors
    /// `WorkspaceError::Space` when the API call fails; the local list is
    /// unchanged.
    pub async fn load_spaces(&mut self) -> WorkspaceResult<()> {
        let list = self.spaces_api.list_spaces().await?;
        self.spaces.set_spaces(list);
        debug!(count = self.spaces.spaces().len(), "loaded spaces");

        if self.spaces.active_space().is_none() {
            let system = self.spaces.system_space_id().to_string();
            self.switch_space(&system).await;
        }
        Ok(())
    }

    /// Switch to another space
    ///
    /// Saves the current tabs, then restores the target's tabs (or its
    /// default tab). The view cache and history start empty.
    pub async fn switch_space(&mut self, space_id: &str) -> Option<UrlUpdate> {
        let Some(space) = self.spaces.space(space_id).cloned() else {
            self.diagnostics.not_found("switch_space", space_id);
            return None;
        };
        if self.spaces.active_space().is_some() && self.spaces.active_space_id() == space_id {
            self.diagnostics.ignored("switch_space", "already active");
            return None;
        }

        if self.spaces.active_space().is_some() {
            self.persist();
        }
        self.spaces.set_active(space_id);
        self.views.clear();
        self.history.clear();

        self.manager.set_default_route(
            space
                .default_route
                .unwrap_or_else(|| self.config.default_route.clone()),
        );
        let state = self
            .codec
            .load(space_id)
            .unwrap_or_else(|| self.manager.default_state());
        self.manager.replace_state(state);
        if let Some(tab) = self.manager.state().active_tab() {
            self.history.push(tab.id);
        }
        self.persist();
        let update = self.url.sync(self.manager.state());
        info!(space_id, tabs = self.manager.state().tab_count(), "switched space");
        self.publish(update.clone());

        if self.ensure_space_contents(space_id).await {
            self.publish(None);
        }
        update
    }

    /// Load a space's views and root items unless cached
    ///
    /// Returns whether new contents were stored.
    pub async fn ensure_space_contents(&mut self, space_id: &str) -> bool {
        if self.spaces.contents(space_id).is_some() {
            return false;
        }
        let ticket = self.spaces.begin_load();
        let api = Arc::clone(&self.spaces_api);
        let loaded = futures::try_join!(api.list_views(space_id), api.list_space_items(space_id));

        match loaded {
            Ok((views, items)) => {
                self.spaces
                    .finish_load(ticket, space_id, SpaceContents { views, items })
            }
            Err(err) => {
                warn!(space_id, error = %err, "failed to load space contents");
                self.diagnostics.emit(Diagnostic::SpaceLoadFailed {
                    space_id: space_id.to_string(),
                    error: err.to_string(),
                });
                false
            }
        }
    }

    /// Create a space
    ///
    /// # Errors
    /// `WorkspaceError::Space` when the API call fails.
    pub async fn create_space(&mut self, request: &CreateSpace) -> WorkspaceResult<Space> {
        let space = self.spaces_api.create_space(request).await?;
        info!(space_id = %space.id, name = %space.name, "created space");
        self.spaces.upsert(space.clone());
        Ok(space)
    }

    /// Update a space
    ///
    /// # Errors
    /// `SpaceError::SystemSpace` when renaming the system space,
    /// `SpaceError::NotFound` for unknown ids, or the API failure.
    pub async fn update_space(&mut self, space_id: &str, request: &UpdateSpace) -> WorkspaceResult<Space> {
        if self.spaces.is_system(space_id) && request.name.is_some() {
            return Err(SpaceError::SystemSpace(space_id.to_string()).into());
        }
        if self.spaces.space(space_id).is_none() {
            return Err(SpaceError::NotFound(space_id.to_string()).into());
        }
        let space = self.spaces_api.update_space(space_id, request).await?;
        if self.spaces.active_space_id() == space_id {
            if let Some(route) = &space.default_route {
                self.manager.set_default_route(route.clone());
            }
        }
        self.spaces.upsert(space.clone());
        Ok(space)
    }

    /// Delete a space and its saved tabs
    ///
    /// Deleting the active space switches to the system space first.
    /// Unknown ids are ignored.
    ///
    /// # Errors
    /// `SpaceError::SystemSpace` for the system space, or the API failure.
    pub async fn delete_space(&mut self, space_id: &str) -> WorkspaceResult<()> {
        if self.spaces.is_system(space_id) {
            return Err(SpaceError::SystemSpace(space_id.to_string()).into());
        }
        if self.spaces.space(space_id).is_none() {
            self.diagnostics.not_found("delete_space", space_id);
            return Ok(());
        }
        if self.spaces.active_space_id() == space_id {
            let system = self.spaces.system_space_id().to_string();
            self.switch_space(&system).await;
        }

        self.spaces_api.delete_space(space_id).await?;
        self.spaces.remove(space_id);
        if let Err(err) = self.codec.clear(space_id) {
            let key = self.codec.key(space_id);
            warn!(key = %key, error = %err, "failed to clear deleted space");
            self.diagnostics.emit(Diagnostic::StorageFailure {
                key,
                error: err.to_string(),
            });
        }
        info!(space_id, "deleted space");
        Ok(())
    }

    // ----- views and entities -----

    /// Resolve a saved view, from cache unless `force_refresh`
    ///
    /// Resolved entities also seed the metadata registry.
    ///
    /// # Errors
    /// `WorkspaceError::NoViewResolver` when none was configured, or
    /// `WorkspaceError::View` when resolution failed.
    pub async fn resolve_view(&self, view_id: &str, force_refresh: bool) -> WorkspaceResult<Vec<ViewEntity>> {
        let resolver = self
            .view_resolver
            .clone()
            .ok_or(WorkspaceError::NoViewResolver)?;
        let entities = self
            .views
            .resolve(view_id, force_refresh, resolver.as_ref())
            .await?;
        self.metadata.ingest(&entities);
        Ok(entities)
    }

    /// Drop cached views of a namespace, or all of them
    pub async fn invalidate_views(&self, namespace: Option<&str>) {
        self.views.invalidate(namespace).await;
    }

    /// View cache
    #[inline]
    #[must_use]
    pub fn view_cache(&self) -> &ViewCache {
        &self.views
    }

    /// Display metadata of an entity (placeholder when unseen)
    #[must_use]
    pub fn entity_metadata(&self, entity_id: &str) -> EntityMetadata {
        self.metadata.get_metadata(entity_id)
    }

    /// Record a rename or icon change and relabel open tabs showing it
    pub fn rename_entity(&mut self, entity_id: &str, patch: &MetadataPatch) -> Option<UrlUpdate> {
        self.metadata.update_metadata(entity_id, patch);
        if patch.is_empty() {
            return None;
        }
        let namespace = EntityNamespace::from_entity_id(entity_id)?;
        let key = self
            .registry
            .parse_route(&namespace.route_for(entity_id))
            .identity_key()?;
        let change = self
            .manager
            .relabel_identity(&key, patch.name.as_deref(), patch.icon.as_deref());
        self.commit(change)
    }
}

impl Debug for WorkspaceEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceEngine")
            .field("space", &self.spaces.active_space_id())
            .field("state", self.manager.state())
            .field("url", &self.url.current())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::UrlMode;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tabspace_route::FixedClock;

    fn engine() -> WorkspaceEngine {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
        WorkspaceEngine::builder()
            .registry(Arc::new(DefaultRouteRegistry::with_clock(clock)))
            .build()
            .unwrap()
    }

    #[test]
    fn starts_with_default_tab() {
        let e = engine();
        assert_eq!(e.state().tab_count(), 1);
        assert_eq!(e.current_url(), "/");
        assert_eq!(e.history().len(), 1);
        assert_eq!(e.snapshot().space_id, "space_system");
    }

    #[test]
    fn navigation_pushes_url_and_publishes() {
        let mut e = engine();
        let rx = e.subscribe();

        let update = e
            .open_tab_from_route("/page/page_1", OpenOptions::new())
            .unwrap();
        assert_eq!(update.url, "/page/page_1");
        assert_eq!(update.mode, UrlMode::Push);

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.url, "/page/page_1");
        assert_eq!(snapshot.url_update, Some(update));
        assert!(snapshot.can_go_back);
    }

    #[test]
    fn noop_publishes_nothing() {
        let mut e = engine();
        let rx = e.subscribe();

        assert_eq!(e.close_tab(TabId::new()), None);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn back_and_forward_replay_without_recording() {
        let mut e = engine();
        e.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
        e.open_tab_from_route("/page/page_2", OpenOptions::new().force_new());
        assert_eq!(e.history().len(), 3);

        assert_eq!(e.go_back().unwrap().url, "/page/page_1");
        assert_eq!(e.history().len(), 3);
        assert!(e.snapshot().can_go_forward);

        assert_eq!(e.go_forward().unwrap().url, "/page/page_2");
        assert_eq!(e.go_forward(), None);
    }

    #[test]
    fn back_over_closed_tab_moves_cursor_only() {
        let mut e = engine();
        e.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
        let closed = e.state().active_tab().unwrap().id;
        e.open_tab_from_route("/page/page_2", OpenOptions::new().force_new());
        e.close_tab(closed);

        let before = e.state().clone();
        assert_eq!(e.go_back(), None);
        assert_eq!(e.state(), &before);
        assert_eq!(e.history().current(), Some(closed));
    }

    #[test]
    fn apply_url_replaces_when_normalized() {
        let mut e = engine();
        let update = e.apply_url("/day?right=/chat").unwrap();

        assert_eq!(update.mode, UrlMode::Replace);
        assert_eq!(update.url, "/day/day_2025-12-10?right=/chat");
        assert!(e.state().is_split());
        assert_eq!(
            e.state().pane(PaneId::Right).unwrap().active_tab().unwrap().route,
            "/chat"
        );
        assert_eq!(e.current_url(), "/day/day_2025-12-10?right=/chat");
    }

    #[test]
    fn apply_url_without_right_unsplits() {
        let mut e = engine();
        e.apply_url("/chat?right=/wiki");
        assert!(e.state().is_split());

        assert_eq!(e.apply_url("/chat"), None);
        assert!(!e.state().is_split());
        assert_eq!(e.current_url(), "/chat");
    }

    #[test]
    fn rename_entity_relabels_open_tabs() {
        let mut e = engine();
        e.open_tab_from_route("/person/person_jane", OpenOptions::new().force_new());

        e.rename_entity("person_jane", &MetadataPatch::rename("Jane Doe"));

        assert_eq!(e.state().active_tab().unwrap().label, "Jane Doe");
        assert_eq!(e.entity_metadata("person_jane").name, "Jane Doe");
    }

    #[tokio::test]
    async fn resolve_view_without_resolver_fails() {
        let e = engine();
        assert!(matches!(
            e.resolve_view("view_1", false).await,
            Err(WorkspaceError::NoViewResolver)
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = WorkspaceEngine::builder()
            .config(WorkspaceConfig::default().with_history_limit(0))
            .build();
        assert!(matches!(result, Err(WorkspaceError::Config(_))));
    }
}
