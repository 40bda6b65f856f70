//! Core types for the workbench
//!
//! Defines the state the pane/tab manager owns:
//! - Tab and pane identifiers
//! - Tabs, panes and the per-space workbench state
//! - Invariant checking over a state
//! - The immutable snapshot published after every mutation

use crate::url::UrlUpdate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tabspace_route::{identity_key, ContentType, IdentityFields, IdentityKey, RouteDescriptor};
use uuid::Uuid;

/// Unique tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub Uuid);

impl TabId {
    /// Generate new tab ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TabId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TabId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Pane position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneId {
    /// Left (or only) pane
    Left,
    /// Right pane, present only in split
    Right,
}

impl PaneId {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The opposite pane
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl Display for PaneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown pane: {other}")),
        }
    }
}

/// An open, addressable unit of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Tab ID
    pub id: TabId,
    /// What the tab renders
    pub content_type: ContentType,
    /// Display label
    pub label: String,
    /// Canonical route
    pub route: String,
    /// Display icon
    pub icon: String,
    /// Type-dependent identity fields
    #[serde(default)]
    pub identity: IdentityFields,
    /// Pinned tabs sort first and are never rewritten in place
    #[serde(default)]
    pub pinned: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Restored scroll offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_position: Option<f64>,
}

impl Tab {
    /// New tab for a parsed route, stored under its canonical route
    #[must_use]
    pub fn from_descriptor(descriptor: &RouteDescriptor) -> Self {
        Self {
            id: TabId::new(),
            content_type: descriptor.content_type,
            label: descriptor.label.clone(),
            route: descriptor.canonical_route().to_string(),
            icon: descriptor.icon.clone(),
            identity: descriptor.identity.clone(),
            pinned: false,
            created_at: Utc::now(),
            scroll_position: None,
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Identity key, if the content type carries one
    #[must_use]
    pub fn identity_key(&self) -> Option<IdentityKey> {
        identity_key(self.content_type, &self.identity, &self.route)
    }

    /// Point this tab at another route, keeping its id
    pub fn retarget(&mut self, descriptor: &RouteDescriptor, label: Option<&str>) {
        self.content_type = descriptor.content_type;
        self.label = label.unwrap_or(&descriptor.label).to_string();
        self.route = descriptor.canonical_route().to_string();
        self.icon.clone_from(&descriptor.icon);
        self.identity = descriptor.identity.clone();
        self.scroll_position = None;
    }
}

/// One viewport holding an ordered tab list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    /// Pane ID
    pub id: PaneId,
    /// Tabs in display order, pinned first
    pub tabs: Vec<Tab>,
    /// Active tab
    pub active_tab_id: Option<TabId>,
    /// Share of the window width
    pub width_percent: f64,
}

impl Pane {
    /// Create empty pane
    #[must_use]
    pub fn new(id: PaneId, width_percent: f64) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            active_tab_id: None,
            width_percent,
        }
    }

    /// Index of a tab
    #[inline]
    #[must_use]
    pub fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    /// Check if the pane holds a tab
    #[inline]
    #[must_use]
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.position(tab_id).is_some()
    }

    /// Active tab
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id?;
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Check if pane is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Stable sort, pinned tabs first
    pub fn sort_pinned_first(&mut self) {
        self.tabs.sort_by_key(|t| !t.pinned);
    }

    /// Point a dangling active id at the first tab
    pub fn repair_active(&mut self) {
        let dangling = self.active_tab_id.map_or(true, |id| !self.contains(id));
        if dangling {
            self.active_tab_id = self.tabs.first().map(|t| t.id);
        }
    }
}

/// Pane layout and tabs of one space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchState {
    /// One or two panes, left first
    pub panes: Vec<Pane>,
    /// Focused pane
    pub active_pane_id: PaneId,
    /// Sidebar views the user expanded
    #[serde(default)]
    pub expanded_view_ids: Vec<String>,
}

impl WorkbenchState {
    /// Single empty left pane
    #[must_use]
    pub fn empty() -> Self {
        Self {
            panes: vec![Pane::new(PaneId::Left, 100.0)],
            active_pane_id: PaneId::Left,
            expanded_view_ids: Vec::new(),
        }
    }

    /// Whether two panes are shown
    #[inline]
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.panes.len() == 2
    }

    /// Pane by id
    #[must_use]
    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id == id)
    }

    /// Mutable pane by id
    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.id == id)
    }

    /// Focused pane
    #[must_use]
    pub fn active_pane(&self) -> Option<&Pane> {
        self.pane(self.active_pane_id)
    }

    /// Active tab of the focused pane
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_pane()?.active_tab()
    }

    /// Locate a tab
    #[must_use]
    pub fn find_tab(&self, tab_id: TabId) -> Option<(PaneId, usize)> {
        self.panes
            .iter()
            .find_map(|p| p.position(tab_id).map(|idx| (p.id, idx)))
    }

    /// Tab by id
    #[must_use]
    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs().find(|t| t.id == tab_id)
    }

    /// Mutable tab by id
    pub fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.panes
            .iter_mut()
            .flat_map(|p| p.tabs.iter_mut())
            .find(|t| t.id == tab_id)
    }

    /// All tabs, left pane first
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.panes.iter().flat_map(|p| p.tabs.iter())
    }

    /// Total tab count
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.panes.iter().map(|p| p.tabs.len()).sum()
    }

    /// Find a tab showing `key`, searching `preferred` first
    #[must_use]
    pub fn find_by_identity(
        &self,
        key: &IdentityKey,
        preferred: Option<PaneId>,
    ) -> Option<(PaneId, TabId)> {
        let mut order: Vec<&Pane> = self.panes.iter().collect();
        if let Some(preferred) = preferred {
            order.sort_by_key(|p| p.id != preferred);
        }
        order.into_iter().find_map(|pane| {
            pane.tabs
                .iter()
                .find(|t| t.identity_key().as_ref() == Some(key))
                .map(|t| (pane.id, t.id))
        })
    }

    /// Identity keys held by more than one tab
    #[must_use]
    pub fn identity_conflicts(&self) -> Vec<IdentityKey> {
        let mut seen = HashSet::new();
        let mut conflicts = Vec::new();
        for key in self.tabs().filter_map(Tab::identity_key) {
            if !seen.insert(key.clone()) && !conflicts.contains(&key) {
                conflicts.push(key);
            }
        }
        conflicts
    }

    /// Structural invariant violations (empty when the state is valid)
    #[must_use]
    pub fn check_invariants(&self, min_pane_width: f64) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        match self.panes.as_slice() {
            [single] => {
                if single.id != PaneId::Left {
                    violations.push(InvariantViolation::SinglePaneNotLeft);
                }
            }
            [left, right] => {
                if left.id != PaneId::Left || right.id != PaneId::Right {
                    violations.push(InvariantViolation::PaneOrder);
                }
                let total = left.width_percent + right.width_percent;
                let in_range =
                    |w: f64| w >= min_pane_width - 1e-6 && w <= 100.0 - min_pane_width + 1e-6;
                if (total - 100.0).abs() > 1e-6
                    || !in_range(left.width_percent)
                    || !in_range(right.width_percent)
                {
                    violations.push(InvariantViolation::Widths {
                        left: left.width_percent,
                        right: right.width_percent,
                    });
                }
            }
            panes => violations.push(InvariantViolation::PaneCount(panes.len())),
        }

        let mut seen = HashSet::new();
        for tab in self.tabs() {
            if !seen.insert(tab.id) {
                violations.push(InvariantViolation::DuplicateTab(tab.id));
            }
        }

        for pane in &self.panes {
            match pane.active_tab_id {
                Some(id) if !pane.contains(id) => {
                    violations.push(InvariantViolation::DanglingActiveTab(pane.id));
                }
                None if !pane.is_empty() => {
                    violations.push(InvariantViolation::MissingActiveTab(pane.id));
                }
                _ => {}
            }
            if pane.tabs.windows(2).any(|w| !w[0].pinned && w[1].pinned) {
                violations.push(InvariantViolation::PinnedOrder(pane.id));
            }
        }

        if self.active_pane().is_none() {
            violations.push(InvariantViolation::DanglingActivePane(self.active_pane_id));
        }

        violations
    }
}

impl Default for WorkbenchState {
    fn default() -> Self {
        Self::empty()
    }
}

/// A broken structural invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// Not one or two panes
    #[error("expected one or two panes, found {0}")]
    PaneCount(usize),

    /// Single pane not labelled left
    #[error("single pane must be the left pane")]
    SinglePaneNotLeft,

    /// Split panes out of order
    #[error("split panes must be [left, right]")]
    PaneOrder,

    /// Split widths broken
    #[error("split widths {left}/{right} out of range")]
    Widths {
        /// Left width
        left: f64,
        /// Right width
        right: f64,
    },

    /// Tab id repeated
    #[error("tab {0} appears more than once")]
    DuplicateTab(TabId),

    /// Active tab not in its pane
    #[error("active tab of {0} pane is not in that pane")]
    DanglingActiveTab(PaneId),

    /// Non-empty pane without an active tab
    #[error("{0} pane has tabs but no active tab")]
    MissingActiveTab(PaneId),

    /// Unpinned tab before a pinned one
    #[error("{0} pane has an unpinned tab before a pinned one")]
    PinnedOrder(PaneId),

    /// Active pane missing
    #[error("active pane {0} does not exist")]
    DanglingActivePane(PaneId),
}

/// Immutable view of the engine published after every mutation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSnapshot {
    /// Active space
    pub space_id: String,
    /// Panes and tabs
    pub state: WorkbenchState,
    /// Current address-bar URL
    pub url: String,
    /// Last address-bar write, if the mutation caused one
    pub url_update: Option<UrlUpdate>,
    /// History can go back
    pub can_go_back: bool,
    /// History can go forward
    pub can_go_forward: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabspace_route::{FixedClock, RouteParser};

    fn tab(route: &str) -> Tab {
        let parser = RouteParser::with_clock(FixedClock(
            chrono::NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        ));
        Tab::from_descriptor(&parser.parse(route))
    }

    #[test]
    fn tab_stores_canonical_route() {
        let t = tab("/day");
        assert_eq!(t.route, "/day/day_2025-12-10");
        assert_eq!(t.identity_key().unwrap().as_str(), "entity:day_2025-12-10");
    }

    #[test]
    fn retarget_keeps_id_and_resets_scroll() {
        let mut t = tab("/wiki/alpha");
        t.scroll_position = Some(120.0);
        let id = t.id;

        let parser = RouteParser::new();
        t.retarget(&parser.parse("/wiki/beta"), None);

        assert_eq!(t.id, id);
        assert_eq!(t.route, "/wiki/beta");
        assert_eq!(t.label, "Beta");
        assert_eq!(t.scroll_position, None);
    }

    #[test]
    fn pinned_sort_is_stable() {
        let mut pane = Pane::new(PaneId::Left, 100.0);
        let mut a = tab("/chat");
        let b = tab("/wiki");
        let mut c = tab("/page");
        a.pinned = false;
        c.pinned = true;
        let ids = [a.id, b.id, c.id];
        pane.tabs = vec![a, b, c];

        pane.sort_pinned_first();

        let order: Vec<_> = pane.tabs.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn detects_duplicate_and_dangling_ids() {
        let mut state = WorkbenchState::empty();
        let t = tab("/chat");
        let pane = &mut state.panes[0];
        pane.tabs = vec![t.clone(), t];
        pane.active_tab_id = Some(TabId::new());

        let violations = state.check_invariants(20.0);
        assert!(violations
            .iter()
            .any(|v| matches!(v, InvariantViolation::DuplicateTab(_))));
        assert!(violations.contains(&InvariantViolation::DanglingActiveTab(PaneId::Left)));
    }

    #[test]
    fn detects_width_violation() {
        let mut state = WorkbenchState::empty();
        state.panes[0].width_percent = 90.0;
        state.panes.push(Pane::new(PaneId::Right, 10.0));
        assert_eq!(
            state.check_invariants(20.0),
            vec![InvariantViolation::Widths {
                left: 90.0,
                right: 10.0
            }]
        );
    }

    #[test]
    fn identity_lookup_prefers_requested_pane() {
        let mut state = WorkbenchState::empty();
        let left = tab("/wiki/alpha");
        let right = tab("/wiki/alpha");
        let right_id = right.id;
        let key = left.identity_key().unwrap();
        state.panes[0].tabs.push(left);
        state.panes[0].repair_active();
        let mut right_pane = Pane::new(PaneId::Right, 50.0);
        right_pane.tabs.push(right);
        right_pane.repair_active();
        state.panes.push(right_pane);

        assert_eq!(
            state.find_by_identity(&key, Some(PaneId::Right)),
            Some((PaneId::Right, right_id))
        );
        assert_eq!(state.identity_conflicts(), vec![key]);
    }

    #[test]
    fn pane_id_parses() {
        assert_eq!("right".parse::<PaneId>(), Ok(PaneId::Right));
        assert!("middle".parse::<PaneId>().is_err());
    }
}
