//! Testing utilities for Tabspace workspace
//!
//! Shared fixtures, stub collaborators, and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tabspace_cache::{ResolveError, ViewEntity, ViewResolution, ViewResolver};
use tabspace_core::{
    CreateSpace, Diagnostic, DiagnosticsHook, LocalSpaces, MemoryStorage, Space, SpaceError,
    SpaceItem, SpaceView, SpacesApi, StorageBackend, UpdateSpace, WorkbenchState,
    WorkspaceConfig, WorkspaceEngine, WorkspaceEngineBuilder,
};
use tabspace_route::{DefaultRouteRegistry, FixedClock, RouteRegistry};
use tokio::sync::Notify;

pub const SYSTEM_SPACE: &str = "space_system";

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
}

pub fn test_registry() -> Arc<dyn RouteRegistry> {
    Arc::new(DefaultRouteRegistry::with_clock(FixedClock(test_date())))
}

pub fn engine_builder() -> WorkspaceEngineBuilder {
    WorkspaceEngine::builder()
        .config(WorkspaceConfig::default())
        .registry(test_registry())
}

pub fn setup_test_engine() -> WorkspaceEngine {
    engine_builder().build().unwrap()
}

pub fn setup_engine_with_storage(storage: Arc<dyn StorageBackend>) -> WorkspaceEngine {
    engine_builder().storage(storage).build().unwrap()
}

pub fn memory_storage() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new())
}

pub fn assert_invariants(state: &WorkbenchState) {
    let violations = state.check_invariants(WorkspaceConfig::default().min_pane_width);
    assert!(violations.is_empty(), "invariants violated: {violations:?}\n{state:#?}");
}

pub fn active_route(state: &WorkbenchState, pane: tabspace_core::PaneId) -> Option<String> {
    state
        .pane(pane)
        .and_then(|p| p.active_tab())
        .map(|t| t.route.clone())
}

pub fn capture_diagnostics() -> (DiagnosticsHook, Arc<Mutex<Vec<Diagnostic>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let hook: DiagnosticsHook = Arc::new(move |d: &Diagnostic| sink.lock().push(d.clone()));
    (hook, seen)
}

/// View resolver answering from a fixed table
#[derive(Debug, Default)]
pub struct StaticViewResolver {
    views: Mutex<HashMap<String, ViewResolution>>,
    failing: Mutex<Option<ResolveError>>,
    calls: AtomicUsize,
}

impl StaticViewResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(self, view_id: &str, namespace: &str, entities: Vec<ViewEntity>) -> Self {
        self.set_view(view_id, namespace, entities);
        self
    }

    pub fn set_view(&self, view_id: &str, namespace: &str, entities: Vec<ViewEntity>) {
        self.views.lock().insert(
            view_id.to_string(),
            ViewResolution {
                view_id: view_id.to_string(),
                namespace: namespace.to_string(),
                entities,
            },
        );
    }

    pub fn fail_with(&self, error: ResolveError) {
        *self.failing.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failing.lock() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewResolver for StaticViewResolver {
    async fn resolve_view(&self, view_id: &str) -> Result<ViewResolution, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failing.lock().clone() {
            return Err(err);
        }
        self.views
            .lock()
            .get(view_id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(view_id.to_string()))
    }
}

/// Spaces API that records calls and can fail or hold content loads
#[derive(Debug)]
pub struct RecordingSpaces {
    inner: LocalSpaces,
    calls: Mutex<Vec<String>>,
    fail_contents: Mutex<bool>,
    hold_contents: AtomicBool,
    contents_gate: Notify,
}

impl RecordingSpaces {
    pub fn new(spaces: Vec<Space>) -> Self {
        let inner = spaces
            .into_iter()
            .fold(LocalSpaces::new(SYSTEM_SPACE), LocalSpaces::with_space);
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_contents: Mutex::new(false),
            hold_contents: AtomicBool::new(false),
            contents_gate: Notify::new(),
        }
    }

    pub fn with_contents(mut self, space_id: &str, views: Vec<SpaceView>, items: Vec<SpaceItem>) -> Self {
        self.inner = self
            .inner
            .with_contents(space_id, tabspace_core::SpaceContents { views, items });
        self
    }

    pub fn fail_contents(&self, fail: bool) {
        *self.fail_contents.lock() = fail;
    }

    /// Make `list_views` wait until [`Self::release_contents`]
    pub fn hold_contents(&self) {
        self.hold_contents.store(true, Ordering::SeqCst);
    }

    pub fn release_contents(&self) {
        self.hold_contents.store(false, Ordering::SeqCst);
        self.contents_gate.notify_one();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl SpacesApi for RecordingSpaces {
    async fn list_spaces(&self) -> Result<Vec<Space>, SpaceError> {
        self.record("list_spaces".into());
        self.inner.list_spaces().await
    }

    async fn create_space(&self, request: &CreateSpace) -> Result<Space, SpaceError> {
        self.record(format!("create_space:{}", request.name));
        self.inner.create_space(request).await
    }

    async fn update_space(&self, id: &str, request: &UpdateSpace) -> Result<Space, SpaceError> {
        self.record(format!("update_space:{id}"));
        self.inner.update_space(id, request).await
    }

    async fn delete_space(&self, id: &str) -> Result<(), SpaceError> {
        self.record(format!("delete_space:{id}"));
        self.inner.delete_space(id).await
    }

    async fn list_views(&self, space_id: &str) -> Result<Vec<SpaceView>, SpaceError> {
        self.record(format!("list_views:{space_id}"));
        if self.hold_contents.load(Ordering::SeqCst) {
            self.contents_gate.notified().await;
        }
        if *self.fail_contents.lock() {
            return Err(SpaceError::Api("views unavailable".into()));
        }
        self.inner.list_views(space_id).await
    }

    async fn list_space_items(&self, space_id: &str) -> Result<Vec<SpaceItem>, SpaceError> {
        self.record(format!("list_space_items:{space_id}"));
        if *self.fail_contents.lock() {
            return Err(SpaceError::Api("items unavailable".into()));
        }
        self.inner.list_space_items(space_id).await
    }
}

pub fn entity(route: &str, name: &str, namespace: &str) -> ViewEntity {
    ViewEntity::new(route, name, namespace, "ri:file-line")
}
