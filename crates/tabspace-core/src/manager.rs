//! Pane/tab state machine
//!
//! Owns the [`WorkbenchState`] of the active space and implements every
//! tab and pane mutation. Two states exist: single (one `left` pane) and
//! split (`left` + `right`). Operations on ids that no longer exist are
//! no-ops reported through [`Diagnostics`]; they never fail.
//!
//! Each operation returns a [`Change`] so the engine can run history,
//! persistence and URL sync afterwards, in that order.

use crate::config::WorkspaceConfig;
use crate::diagnostics::Diagnostics;
use crate::types::{Pane, PaneId, Tab, TabId, WorkbenchState};
use std::sync::Arc;
use tabspace_route::{IdentityKey, RouteDescriptor, RouteRegistry};

/// What a mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Change {
    /// State was modified
    pub changed: bool,
    /// Tab the user navigated to (recorded in history)
    pub activated: Option<TabId>,
}

impl Change {
    /// Nothing happened
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// State changed without a navigation
    #[inline]
    #[must_use]
    pub fn mutated() -> Self {
        Self {
            changed: true,
            activated: None,
        }
    }

    /// State changed and `tab_id` became active
    #[inline]
    #[must_use]
    pub fn activated(tab_id: TabId) -> Self {
        Self {
            changed: true,
            activated: Some(tab_id),
        }
    }

    /// Whether the engine has anything to do
    #[inline]
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.changed || self.activated.is_some()
    }
}

/// Options for [`PaneTabManager::open_tab_from_route`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Always create a new tab
    pub force_new: bool,
    /// In split, open new tabs in an empty pane when there is one
    pub prefer_empty_pane: bool,
    /// Target pane
    pub pane_id: Option<PaneId>,
    /// Label overriding the parsed one
    pub label: Option<String>,
}

impl OpenOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a pane
    #[inline]
    #[must_use]
    pub fn in_pane(pane_id: PaneId) -> Self {
        Self {
            pane_id: Some(pane_id),
            ..Self::default()
        }
    }

    /// With force-new
    #[inline]
    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// With prefer-empty-pane
    #[inline]
    #[must_use]
    pub fn prefer_empty_pane(mut self) -> Self {
        self.prefer_empty_pane = true;
        self
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Explicit tab creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInput {
    /// Route to open
    pub route: String,
    /// Label overriding the parsed one
    pub label: Option<String>,
    /// Icon overriding the parsed one
    pub icon: Option<String>,
    /// Open pinned
    pub pinned: bool,
}

impl TabInput {
    /// Input for a route
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            label: None,
            icon: None,
            pinned: false,
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Pinned
    #[inline]
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// Cosmetic tab update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabPatch {
    /// New label
    pub label: Option<String>,
    /// New icon
    pub icon: Option<String>,
}

/// The pane/tab state machine of one space
#[derive(Debug)]
pub struct PaneTabManager {
    state: WorkbenchState,
    registry: Arc<dyn RouteRegistry>,
    default_route: String,
    open_default_on_empty: bool,
    min_pane_width: f64,
    diagnostics: Diagnostics,
}

impl PaneTabManager {
    /// Create manager with an empty single pane
    #[must_use]
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        config: &WorkspaceConfig,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            state: WorkbenchState::empty(),
            registry,
            default_route: config.default_route.clone(),
            open_default_on_empty: config.open_default_on_empty,
            min_pane_width: config.min_pane_width,
            diagnostics,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &WorkbenchState {
        &self.state
    }

    /// Route opened when the workbench empties
    #[inline]
    #[must_use]
    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    /// Change the default route (per-space preference)
    pub fn set_default_route(&mut self, route: impl Into<String>) {
        self.default_route = route.into();
    }

    /// Swap in a loaded state
    pub fn replace_state(&mut self, state: WorkbenchState) {
        self.state = state;
    }

    /// Fresh state: one pane holding the default tab (or nothing)
    #[must_use]
    pub fn default_state(&self) -> WorkbenchState {
        let mut state = WorkbenchState::empty();
        if self.open_default_on_empty {
            let tab = Tab::from_descriptor(&self.registry.parse_route(&self.default_route));
            state.panes[0].active_tab_id = Some(tab.id);
            state.panes[0].tabs.push(tab);
        }
        state
    }

    /// Replace everything with the default state
    pub fn reset_to_default(&mut self) -> Change {
        self.state = self.default_state();
        match self.state.active_tab() {
            Some(tab) => Change::activated(tab.id),
            None => Change::mutated(),
        }
    }

    // ----- split -----

    /// Single → split; the current tabs stay left, right starts empty
    pub fn enable_split(&mut self) -> Change {
        if self.state.is_split() {
            self.diagnostics.ignored("enable_split", "already split");
            return Change::none();
        }
        self.state.panes[0].id = PaneId::Left;
        self.state.panes[0].width_percent = 50.0;
        self.state.panes.push(Pane::new(PaneId::Right, 50.0));
        self.state.active_pane_id = PaneId::Left;
        tracing::debug!("split enabled");
        Change::mutated()
    }

    /// Split → single; left tabs then right tabs in one pane
    ///
    /// Pinned tabs from either pane move to the front, keeping their order.
    /// The active tab is the active pane's active tab, else left's, else
    /// right's, else the first tab.
    pub fn disable_split(&mut self) -> Change {
        if !self.state.is_split() {
            self.diagnostics.ignored("disable_split", "not split");
            return Change::none();
        }
        self.collapse();
        Change::mutated()
    }

    fn collapse(&mut self) {
        let active_pane = self.state.active_pane_id;
        let preferred = self
            .state
            .pane(active_pane)
            .and_then(|p| p.active_tab_id)
            .or_else(|| self.state.pane(PaneId::Left).and_then(|p| p.active_tab_id))
            .or_else(|| self.state.pane(PaneId::Right).and_then(|p| p.active_tab_id));

        let mut merged = Pane::new(PaneId::Left, 100.0);
        for pane in std::mem::take(&mut self.state.panes) {
            merged.tabs.extend(pane.tabs);
        }
        // Left then right, except pinned tabs from either pane lead.
        merged.sort_pinned_first();
        merged.active_tab_id = preferred;
        merged.repair_active();

        self.state.panes = vec![merged];
        self.state.active_pane_id = PaneId::Left;
        tracing::debug!("split disabled");

        if self.state.panes[0].is_empty() {
            self.fill_empty_single();
        }
    }

    /// Move a tab to the other pane and activate it there
    ///
    /// Split only. Emptying the source pane collapses the split.
    pub fn move_tab_to_pane(&mut self, tab_id: TabId, target: PaneId) -> Change {
        if !self.state.is_split() {
            self.diagnostics.ignored("move_tab_to_pane", "not split");
            return Change::none();
        }
        let Some((source, idx)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("move_tab_to_pane", tab_id);
            return Change::none();
        };
        if source == target {
            self.diagnostics.ignored("move_tab_to_pane", "tab already in target pane");
            return Change::none();
        }

        let Some(tab) = self.take_tab(source, idx) else {
            return Change::none();
        };
        if let Some(pane) = self.state.pane_mut(target) {
            pane.tabs.push(tab);
            pane.sort_pinned_first();
            pane.active_tab_id = Some(tab_id);
        }
        self.state.active_pane_id = target;

        if self.state.pane(source).is_some_and(Pane::is_empty) {
            self.collapse();
        }
        Change::activated(tab_id)
    }

    /// Move the split divider
    pub fn resize_split(&mut self, left_percent: f64) -> Change {
        if !self.state.is_split() {
            self.diagnostics.ignored("resize_split", "not split");
            return Change::none();
        }
        if !left_percent.is_finite() {
            self.diagnostics.ignored("resize_split", "width is not finite");
            return Change::none();
        }
        let left = left_percent.clamp(self.min_pane_width, 100.0 - self.min_pane_width);
        self.state.panes[0].width_percent = left;
        self.state.panes[1].width_percent = 100.0 - left;
        Change::mutated()
    }

    /// Focus a pane
    pub fn focus_pane(&mut self, pane_id: PaneId) -> Change {
        if self.state.pane(pane_id).is_none() {
            self.diagnostics.not_found("focus_pane", pane_id);
            return Change::none();
        }
        if self.state.active_pane_id == pane_id {
            return Change::none();
        }
        self.state.active_pane_id = pane_id;
        Change::mutated()
    }

    // ----- open -----

    /// Open a new tab unconditionally
    pub fn open_tab(&mut self, input: TabInput, pane_id: Option<PaneId>) -> Change {
        let target = pane_id.unwrap_or(self.state.active_pane_id);
        if self.state.pane(target).is_none() {
            self.diagnostics.not_found("open_tab", target);
            return Change::none();
        }
        let descriptor = self.registry.parse_route(&input.route);
        let mut tab = Tab::from_descriptor(&descriptor);
        if let Some(label) = input.label {
            tab.label = label;
        }
        if let Some(icon) = input.icon {
            tab.icon = icon;
        }
        tab.pinned = input.pinned;
        self.insert_tab(target, tab)
    }

    /// Navigate to a route: reuse, rewrite in place, or open
    ///
    /// Unless `force_new`:
    /// 1. the target pane already shows the route, or a tab with the same
    ///    identity exists, ⇒ activate it;
    /// 2. the target pane's active tab is unpinned and in the same domain
    ///    ⇒ rewrite it in place (same id).
    ///
    /// Otherwise a new tab opens in `pane_id`, else the first empty pane
    /// (`prefer_empty_pane`, split only), else the active pane.
    pub fn open_tab_from_route(&mut self, route: &str, options: OpenOptions) -> Change {
        if let Some(pane_id) = options.pane_id {
            if self.state.pane(pane_id).is_none() {
                self.diagnostics.not_found("open_tab_from_route", pane_id);
                return Change::none();
            }
        }
        let descriptor = self.registry.parse_route(route);
        let label = options.label.as_deref();

        let empty_pane = if options.prefer_empty_pane && self.state.is_split() {
            self.state.panes.iter().find(|p| p.is_empty()).map(|p| p.id)
        } else {
            None
        };
        let target = options
            .pane_id
            .or(empty_pane)
            .unwrap_or(self.state.active_pane_id);

        if !options.force_new {
            if let Some(change) = self.reuse_existing(&descriptor, target, options.pane_id.is_some()) {
                return change;
            }
            if empty_pane.is_none() {
                if let Some(change) = self.rewrite_in_place(&descriptor, target, label) {
                    return change;
                }
            }
        }

        let mut tab = Tab::from_descriptor(&descriptor);
        if let Some(label) = label {
            tab.label = label.to_string();
        }
        tracing::debug!(route = %tab.route, pane = %target, "opening new tab");
        self.insert_tab(target, tab)
    }

    fn reuse_existing(
        &mut self,
        descriptor: &RouteDescriptor,
        target: PaneId,
        explicit_pane: bool,
    ) -> Option<Change> {
        let canonical = descriptor.canonical_route();
        if let Some(active) = self.state.pane(target).and_then(Pane::active_tab) {
            if active.route == canonical {
                let id = active.id;
                return Some(self.activate(target, id));
            }
        }

        let key = descriptor.identity_key()?;
        let (pane_id, tab_id) = self.state.find_by_identity(&key, Some(target))?;
        tracing::debug!(identity = %key, pane = %pane_id, "reusing open tab");

        // An explicit pane asks for the document there; pull it over unless
        // it is what the other pane is showing.
        let shown_elsewhere = self
            .state
            .pane(pane_id)
            .is_some_and(|p| p.active_tab_id == Some(tab_id));
        if explicit_pane && pane_id != target && !shown_elsewhere {
            return Some(self.move_tab_to_pane(tab_id, target));
        }
        Some(self.activate(pane_id, tab_id))
    }

    fn rewrite_in_place(
        &mut self,
        descriptor: &RouteDescriptor,
        target: PaneId,
        label: Option<&str>,
    ) -> Option<Change> {
        let target_domain = self.registry.tab_domain(descriptor.content_type)?;
        let registry = Arc::clone(&self.registry);
        let pane = self.state.pane_mut(target)?;
        let active_id = pane.active_tab_id?;
        let tab = pane.tabs.iter_mut().find(|t| t.id == active_id)?;
        if tab.pinned || registry.tab_domain(tab.content_type) != Some(target_domain) {
            return None;
        }
        tracing::debug!(
            from = %tab.route,
            to = %descriptor.canonical_route(),
            domain = ?target_domain,
            "rewriting tab in place"
        );
        tab.retarget(descriptor, label);
        self.state.active_pane_id = target;
        Some(Change::activated(active_id))
    }

    fn insert_tab(&mut self, target: PaneId, tab: Tab) -> Change {
        let id = tab.id;
        let Some(pane) = self.state.pane_mut(target) else {
            self.diagnostics.not_found("insert_tab", target);
            return Change::none();
        };
        let pinned = tab.pinned;
        pane.tabs.push(tab);
        if pinned {
            pane.sort_pinned_first();
        }
        pane.active_tab_id = Some(id);
        self.state.active_pane_id = target;
        Change::activated(id)
    }

    fn activate(&mut self, pane_id: PaneId, tab_id: TabId) -> Change {
        let Some(pane) = self.state.pane_mut(pane_id) else {
            return Change::none();
        };
        let changed = pane.active_tab_id != Some(tab_id);
        pane.active_tab_id = Some(tab_id);
        let changed = changed || self.state.active_pane_id != pane_id;
        self.state.active_pane_id = pane_id;
        Change {
            changed,
            activated: Some(tab_id),
        }
    }

    /// Activate a tab and focus its pane
    pub fn activate_tab(&mut self, tab_id: TabId) -> Change {
        let Some((pane_id, _)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("activate_tab", tab_id);
            return Change::none();
        };
        self.activate(pane_id, tab_id)
    }

    // ----- close -----

    /// Close a tab
    ///
    /// If it was active, the previous tab (else the next) takes over. An
    /// emptied pane collapses the split or, when alone, gets the default
    /// tab.
    pub fn close_tab(&mut self, tab_id: TabId) -> Change {
        let Some((pane_id, idx)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("close_tab", tab_id);
            return Change::none();
        };
        if self.take_tab(pane_id, idx).is_none() {
            return Change::none();
        }
        if self.state.pane(pane_id).is_some_and(Pane::is_empty) {
            self.handle_empty_pane(pane_id);
        }
        Change::mutated()
    }

    /// Close every unpinned tab of the pane except `tab_id`
    pub fn close_other_tabs(&mut self, tab_id: TabId) -> Change {
        let Some((pane_id, _)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("close_other_tabs", tab_id);
            return Change::none();
        };
        let Some(pane) = self.state.pane_mut(pane_id) else {
            return Change::none();
        };
        pane.tabs.retain(|t| t.id == tab_id || t.pinned);
        pane.active_tab_id = Some(tab_id);
        self.state.active_pane_id = pane_id;
        Change::activated(tab_id)
    }

    /// Close the unpinned tabs after `tab_id` in its pane
    pub fn close_tabs_to_right(&mut self, tab_id: TabId) -> Change {
        let Some((pane_id, idx)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("close_tabs_to_right", tab_id);
            return Change::none();
        };
        let Some(pane) = self.state.pane_mut(pane_id) else {
            return Change::none();
        };
        let before = pane.tabs.len();
        let mut position = 0;
        pane.tabs.retain(|t| {
            let keep = position <= idx || t.pinned;
            position += 1;
            keep
        });
        if pane.tabs.len() == before {
            return Change::none();
        }
        if pane.active_tab_id.map_or(true, |id| !pane.contains(id)) {
            pane.active_tab_id = Some(tab_id);
        }
        Change::mutated()
    }

    fn take_tab(&mut self, pane_id: PaneId, idx: usize) -> Option<Tab> {
        let pane = self.state.pane_mut(pane_id)?;
        if idx >= pane.tabs.len() {
            return None;
        }
        let tab = pane.tabs.remove(idx);
        if pane.active_tab_id == Some(tab.id) {
            let neighbor = if idx > 0 {
                pane.tabs.get(idx - 1)
            } else {
                pane.tabs.get(idx)
            };
            pane.active_tab_id = neighbor.map(|t| t.id);
        }
        Some(tab)
    }

    fn handle_empty_pane(&mut self, pane_id: PaneId) {
        if self.state.is_split() {
            tracing::debug!(pane = %pane_id, "pane emptied, collapsing split");
            self.state.panes.retain(|p| p.id != pane_id);
            self.state.active_pane_id = self.state.panes[0].id;
            self.collapse_remaining();
            if self.state.panes[0].is_empty() {
                self.fill_empty_single();
            }
        } else {
            self.fill_empty_single();
        }
    }

    fn collapse_remaining(&mut self) {
        if let Some(pane) = self.state.panes.first_mut() {
            pane.id = PaneId::Left;
            pane.width_percent = 100.0;
        }
        self.state.active_pane_id = PaneId::Left;
    }

    fn fill_empty_single(&mut self) {
        let pane = &mut self.state.panes[0];
        pane.active_tab_id = None;
        if !self.open_default_on_empty {
            return;
        }
        let tab = Tab::from_descriptor(&self.registry.parse_route(&self.default_route));
        tracing::debug!(route = %tab.route, "opening default tab");
        pane.active_tab_id = Some(tab.id);
        pane.tabs.push(tab);
    }

    // ----- order and pins -----

    /// Flip a tab's pin and re-sort its pane, pinned first
    pub fn toggle_pin(&mut self, tab_id: TabId) -> Change {
        let Some((pane_id, idx)) = self.state.find_tab(tab_id) else {
            self.diagnostics.not_found("toggle_pin", tab_id);
            return Change::none();
        };
        let Some(pane) = self.state.pane_mut(pane_id) else {
            return Change::none();
        };
        pane.tabs[idx].pinned = !pane.tabs[idx].pinned;
        pane.sort_pinned_first();
        Change::mutated()
    }

    /// Move the tab at `from` to index `to`
    pub fn reorder_tabs(&mut self, pane_id: PaneId, from: usize, to: usize) -> Change {
        let Some(pane) = self.state.pane_mut(pane_id) else {
            self.diagnostics.not_found("reorder_tabs", pane_id);
            return Change::none();
        };
        if from >= pane.tabs.len() || to >= pane.tabs.len() {
            self.diagnostics.ignored("reorder_tabs", "index out of range");
            return Change::none();
        }
        if from == to {
            return Change::none();
        }
        let before: Vec<TabId> = pane.tabs.iter().map(|t| t.id).collect();
        let tab = pane.tabs.remove(from);
        pane.tabs.insert(to, tab);
        pane.sort_pinned_first();
        let after: Vec<TabId> = pane.tabs.iter().map(|t| t.id).collect();
        if before == after {
            Change::none()
        } else {
            Change::mutated()
        }
    }

    /// Reorder a pane to match `ids`, which must be a permutation of it
    pub fn set_tab_order(&mut self, pane_id: PaneId, ids: &[TabId]) -> Change {
        let Some(pane) = self.state.pane_mut(pane_id) else {
            self.diagnostics.not_found("set_tab_order", pane_id);
            return Change::none();
        };
        let is_permutation = ids.len() == pane.tabs.len()
            && ids.iter().all(|id| pane.contains(*id))
            && ids
                .iter()
                .enumerate()
                .all(|(i, id)| !ids[..i].contains(id));
        if !is_permutation {
            self.diagnostics.ignored("set_tab_order", "ids are not a permutation of the pane");
            return Change::none();
        }
        let mut remaining = std::mem::take(&mut pane.tabs);
        for id in ids {
            if let Some(pos) = remaining.iter().position(|t| t.id == *id) {
                pane.tabs.push(remaining.swap_remove(pos));
            }
        }
        pane.sort_pinned_first();
        Change::mutated()
    }

    // ----- cosmetic -----

    /// Update a tab's label or icon
    pub fn update_tab(&mut self, tab_id: TabId, patch: TabPatch) -> Change {
        let Some(tab) = self.state.tab_mut(tab_id) else {
            self.diagnostics.not_found("update_tab", tab_id);
            return Change::none();
        };
        let mut changed = false;
        if let Some(label) = patch.label {
            changed |= tab.label != label;
            tab.label = label;
        }
        if let Some(icon) = patch.icon {
            changed |= tab.icon != icon;
            tab.icon = icon;
        }
        Change {
            changed,
            activated: None,
        }
    }

    /// Remember a tab's scroll offset
    pub fn set_scroll_position(&mut self, tab_id: TabId, position: Option<f64>) -> Change {
        let Some(tab) = self.state.tab_mut(tab_id) else {
            self.diagnostics.not_found("set_scroll_position", tab_id);
            return Change::none();
        };
        if tab.scroll_position == position {
            return Change::none();
        }
        tab.scroll_position = position;
        Change::mutated()
    }

    /// Expand or collapse a sidebar view
    pub fn toggle_view_expanded(&mut self, view_id: &str) -> Change {
        let expanded = &mut self.state.expanded_view_ids;
        if let Some(pos) = expanded.iter().position(|v| v == view_id) {
            expanded.remove(pos);
        } else {
            expanded.push(view_id.to_string());
        }
        Change::mutated()
    }

    /// Relabel every tab showing `key`
    pub fn relabel_identity(
        &mut self,
        key: &IdentityKey,
        label: Option<&str>,
        icon: Option<&str>,
    ) -> Change {
        let mut changed = false;
        for pane in &mut self.state.panes {
            for tab in &mut pane.tabs {
                if tab.identity_key().as_ref() != Some(key) {
                    continue;
                }
                if let Some(label) = label {
                    if tab.label != label {
                        tab.label = label.to_string();
                        changed = true;
                    }
                }
                if let Some(icon) = icon {
                    if tab.icon != icon {
                        tab.icon = icon.to_string();
                        changed = true;
                    }
                }
            }
        }
        Change {
            changed,
            activated: None,
        }
    }
}
