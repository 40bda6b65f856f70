//! Spaces
//!
//! A space is an isolated, independently themed tab set. Space records
//! live behind the [`SpacesApi`]; [`SpaceSwitcher`] keeps the local list,
//! the active space and a lazily filled cache of each space's views and
//! root items.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::SpaceError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabspace_cache::{Generation, Ticket};

/// Space record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Space ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// The immutable system space
    #[serde(default)]
    pub is_system: bool,
    /// Theme
    pub theme_id: String,
    /// Accent color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    /// Sidebar order
    #[serde(default)]
    pub sort_order: i32,
    /// Route the default tab opens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,
}

impl Space {
    /// Create a user space
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            is_system: false,
            theme_id: "default".to_string(),
            accent_color: None,
            sort_order: 0,
            default_route: None,
        }
    }

    /// The system space
    #[must_use]
    pub fn system(id: impl Into<String>) -> Self {
        Self {
            is_system: true,
            sort_order: i32::MIN,
            ..Self::new(id, "Virtues")
        }
    }

    /// With theme
    #[inline]
    #[must_use]
    pub fn with_theme(mut self, theme_id: impl Into<String>) -> Self {
        self.theme_id = theme_id.into();
        self
    }

    /// With default route
    #[inline]
    #[must_use]
    pub fn with_default_route(mut self, route: impl Into<String>) -> Self {
        self.default_route = Some(route.into());
        self
    }

    /// With sort order
    #[inline]
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Space creation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpace {
    /// Display name
    pub name: String,
    /// Icon
    pub icon: Option<String>,
    /// Theme
    pub theme_id: Option<String>,
    /// Accent color
    pub accent_color: Option<String>,
    /// Default route
    pub default_route: Option<String>,
}

impl CreateSpace {
    /// Request with a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Space update request; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpace {
    /// New name
    pub name: Option<String>,
    /// New icon
    pub icon: Option<String>,
    /// New theme
    pub theme_id: Option<String>,
    /// New accent color
    pub accent_color: Option<String>,
    /// New default route
    pub default_route: Option<String>,
}

impl UpdateSpace {
    /// Apply to a record
    pub fn apply(&self, space: &mut Space) {
        if let Some(name) = &self.name {
            space.name.clone_from(name);
        }
        if let Some(icon) = &self.icon {
            space.icon = Some(icon.clone());
        }
        if let Some(theme) = &self.theme_id {
            space.theme_id.clone_from(theme);
        }
        if let Some(accent) = &self.accent_color {
            space.accent_color = Some(accent.clone());
        }
        if let Some(route) = &self.default_route {
            space.default_route = Some(route.clone());
        }
    }
}

/// Saved view listed in a space's sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceView {
    /// View ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Item pinned at a space's root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceItem {
    /// Route of the item
    pub url: String,
    /// Display name
    pub name: String,
    /// Icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Sidebar contents of one space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceContents {
    /// Saved views
    pub views: Vec<SpaceView>,
    /// Root items
    pub items: Vec<SpaceItem>,
}

/// Backend spaces API
#[async_trait]
pub trait SpacesApi: Send + Sync {
    /// All spaces
    async fn list_spaces(&self) -> Result<Vec<Space>, SpaceError>;

    /// Create a space
    async fn create_space(&self, request: &CreateSpace) -> Result<Space, SpaceError>;

    /// Update a space
    async fn update_space(&self, id: &str, request: &UpdateSpace) -> Result<Space, SpaceError>;

    /// Delete a space
    async fn delete_space(&self, id: &str) -> Result<(), SpaceError>;

    /// Views of a space
    async fn list_views(&self, space_id: &str) -> Result<Vec<SpaceView>, SpaceError>;

    /// Root items of a space
    async fn list_space_items(&self, space_id: &str) -> Result<Vec<SpaceItem>, SpaceError>;
}

/// In-process [`SpacesApi`]
///
/// Used when no backend is attached (the CLI) and as a base for test
/// doubles. New spaces get ids `space_{n}`.
#[derive(Debug, Default)]
pub struct LocalSpaces {
    spaces: RwLock<Vec<Space>>,
    contents: RwLock<HashMap<String, SpaceContents>>,
}

impl LocalSpaces {
    /// Store holding only the system space
    #[must_use]
    pub fn new(system_space_id: &str) -> Self {
        Self {
            spaces: RwLock::new(vec![Space::system(system_space_id)]),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// With an extra space
    #[must_use]
    pub fn with_space(self, space: Space) -> Self {
        self.spaces.write().push(space);
        self
    }

    /// With sidebar contents for a space
    #[must_use]
    pub fn with_contents(self, space_id: &str, contents: SpaceContents) -> Self {
        self.contents.write().insert(space_id.to_string(), contents);
        self
    }

    /// Insert a space if its id is new
    pub fn ensure_space(&self, space: Space) {
        let mut spaces = self.spaces.write();
        if !spaces.iter().any(|s| s.id == space.id) {
            spaces.push(space);
        }
    }
}

#[async_trait]
impl SpacesApi for LocalSpaces {
    async fn list_spaces(&self) -> Result<Vec<Space>, SpaceError> {
        Ok(self.spaces.read().clone())
    }

    async fn create_space(&self, request: &CreateSpace) -> Result<Space, SpaceError> {
        let mut spaces = self.spaces.write();
        let mut n = spaces.len();
        let id = loop {
            let candidate = format!("space_{n}");
            if !spaces.iter().any(|s| s.id == candidate) {
                break candidate;
            }
            n += 1;
        };
        let mut space = Space::new(id, request.name.clone())
            .with_sort_order(i32::try_from(n).unwrap_or(i32::MAX));
        space.icon.clone_from(&request.icon);
        if let Some(theme) = &request.theme_id {
            space.theme_id.clone_from(theme);
        }
        space.accent_color.clone_from(&request.accent_color);
        space.default_route.clone_from(&request.default_route);
        spaces.push(space.clone());
        Ok(space)
    }

    async fn update_space(&self, id: &str, request: &UpdateSpace) -> Result<Space, SpaceError> {
        let mut spaces = self.spaces.write();
        let space = spaces
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SpaceError::NotFound(id.to_string()))?;
        request.apply(space);
        Ok(space.clone())
    }

    async fn delete_space(&self, id: &str) -> Result<(), SpaceError> {
        let mut spaces = self.spaces.write();
        let before = spaces.len();
        spaces.retain(|s| s.id != id);
        if spaces.len() == before {
            return Err(SpaceError::NotFound(id.to_string()));
        }
        self.contents.write().remove(id);
        Ok(())
    }

    async fn list_views(&self, space_id: &str) -> Result<Vec<SpaceView>, SpaceError> {
        Ok(self
            .contents
            .read()
            .get(space_id)
            .map(|c| c.views.clone())
            .unwrap_or_default())
    }

    async fn list_space_items(&self, space_id: &str) -> Result<Vec<SpaceItem>, SpaceError> {
        Ok(self
            .contents
            .read()
            .get(space_id)
            .map(|c| c.items.clone())
            .unwrap_or_default())
    }
}

/// Local view of the spaces and which one is active
#[derive(Debug)]
pub struct SpaceSwitcher {
    spaces: Vec<Space>,
    active_space_id: String,
    system_space_id: String,
    contents: HashMap<String, SpaceContents>,
    loads: Generation<String>,
    diagnostics: Diagnostics,
}

impl SpaceSwitcher {
    /// Create switcher with the system space active
    #[must_use]
    pub fn new(system_space_id: impl Into<String>, diagnostics: Diagnostics) -> Self {
        let system_space_id = system_space_id.into();
        Self {
            spaces: vec![Space::system(system_space_id.clone())],
            active_space_id: system_space_id.clone(),
            system_space_id,
            contents: HashMap::new(),
            loads: Generation::new(),
            diagnostics,
        }
    }

    /// Replace the list, keeping the system space present and first
    pub fn set_spaces(&mut self, mut spaces: Vec<Space>) {
        if let Some(system) = spaces.iter_mut().find(|s| s.id == self.system_space_id) {
            system.is_system = true;
        } else {
            spaces.push(Space::system(self.system_space_id.clone()));
        }
        spaces.sort_by_key(|s| (!s.is_system, s.sort_order));
        self.spaces = spaces;
    }

    /// All spaces, system first
    #[inline]
    #[must_use]
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Space by id
    #[must_use]
    pub fn space(&self, id: &str) -> Option<&Space> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// Active space id
    #[inline]
    #[must_use]
    pub fn active_space_id(&self) -> &str {
        &self.active_space_id
    }

    /// Active space record
    #[must_use]
    pub fn active_space(&self) -> Option<&Space> {
        self.space(&self.active_space_id)
    }

    /// System space id
    #[inline]
    #[must_use]
    pub fn system_space_id(&self) -> &str {
        &self.system_space_id
    }

    /// Whether `id` is the system space
    #[must_use]
    pub fn is_system(&self, id: &str) -> bool {
        id == self.system_space_id
    }

    /// Make a known space active
    ///
    /// Returns `false` for unknown ids. Any in-flight content load is
    /// superseded.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.space(id).is_none() {
            return false;
        }
        self.active_space_id = id.to_string();
        self.loads.invalidate();
        true
    }

    /// Add or replace a record
    pub fn upsert(&mut self, space: Space) {
        match self.spaces.iter_mut().find(|s| s.id == space.id) {
            Some(existing) => *existing = space,
            None => self.spaces.push(space),
        }
        self.spaces.sort_by_key(|s| (!s.is_system, s.sort_order));
    }

    /// Drop a record and its cached contents
    pub fn remove(&mut self, id: &str) -> Option<Space> {
        let idx = self.spaces.iter().position(|s| s.id == id)?;
        self.contents.remove(id);
        Some(self.spaces.remove(idx))
    }

    /// Cached sidebar contents
    #[must_use]
    pub fn contents(&self, id: &str) -> Option<&SpaceContents> {
        self.contents.get(id)
    }

    /// Start loading a space's contents
    pub fn begin_load(&self) -> Ticket {
        self.loads.begin()
    }

    /// Store loaded contents if the load is still current
    ///
    /// Returns `false` when the user switched away (or started a newer
    /// load) while this one was in flight.
    pub fn finish_load(&mut self, ticket: Ticket, space_id: &str, contents: SpaceContents) -> bool {
        if !self.loads.commit(ticket, space_id.to_string()) {
            self.diagnostics.emit(Diagnostic::StaleResponse {
                stream: format!("space_contents:{space_id}"),
            });
            return false;
        }
        self.contents.insert(space_id.to_string(), contents);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switcher() -> SpaceSwitcher {
        SpaceSwitcher::new("space_system", Diagnostics::new())
    }

    #[test]
    fn system_space_is_always_listed_first() {
        let mut s = switcher();
        s.set_spaces(vec![Space::new("space_work", "Work").with_sort_order(-5)]);

        let ids: Vec<_> = s.spaces().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["space_system", "space_work"]);
        assert!(s.space("space_system").unwrap().is_system);
    }

    #[test]
    fn unknown_space_cannot_become_active() {
        let mut s = switcher();
        assert!(!s.set_active("space_nope"));
        assert_eq!(s.active_space_id(), "space_system");
    }

    #[test]
    fn switching_away_discards_in_flight_load() {
        let mut s = switcher();
        s.upsert(Space::new("space_work", "Work"));
        s.upsert(Space::new("space_home", "Home"));

        s.set_active("space_work");
        let ticket = s.begin_load();
        s.set_active("space_home");

        assert!(!s.finish_load(ticket, "space_work", SpaceContents::default()));
        assert!(s.contents("space_work").is_none());

        let ticket = s.begin_load();
        assert!(s.finish_load(ticket, "space_home", SpaceContents::default()));
        assert!(s.contents("space_home").is_some());
    }

    #[test]
    fn update_request_applies_only_set_fields() {
        let mut space = Space::new("space_work", "Work").with_theme("ocean");
        UpdateSpace {
            name: Some("Deep Work".into()),
            ..UpdateSpace::default()
        }
        .apply(&mut space);
        assert_eq!(space.name, "Deep Work");
        assert_eq!(space.theme_id, "ocean");
    }

    #[tokio::test]
    async fn local_spaces_assign_fresh_ids() {
        let api = LocalSpaces::new("space_system").with_space(Space::new("space_1", "Taken"));
        let created = api.create_space(&CreateSpace::named("Research")).await.unwrap();
        assert_eq!(created.id, "space_2");
        assert_eq!(api.list_spaces().await.unwrap().len(), 3);

        api.delete_space("space_2").await.unwrap();
        assert_eq!(
            api.delete_space("space_2").await,
            Err(SpaceError::NotFound("space_2".into()))
        );
    }
}
