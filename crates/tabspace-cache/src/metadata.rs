//! Entity metadata registry
//!
//! Display metadata (name, icon, route) for entities referenced by tabs and
//! sidebars. Lookups never wait on the network: an unknown id gets a
//! placeholder derived from its prefix, which renderers later patch in place
//! when the real title arrives or the entity is renamed.

use crate::resolver::ViewEntity;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tabspace_route::EntityNamespace;

/// Display metadata for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    /// Entity id (`person_abc`) or route for non-entity items
    pub id: String,
    /// Display name
    pub name: String,
    /// Entity type (`person`, `day`, …, or `unknown`)
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Icon name
    pub icon: String,
    /// Route that opens the entity
    pub route: String,
    /// True until a real name has been supplied
    #[serde(default)]
    pub placeholder: bool,
}

impl EntityMetadata {
    /// Placeholder metadata synthesized from the id prefix
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        match EntityNamespace::from_entity_id(id) {
            Some(ns) => Self {
                id: id.to_string(),
                name: ns.display_name().to_string(),
                entity_type: ns.as_str().to_string(),
                icon: ns.icon().to_string(),
                route: ns.route_for(id),
                placeholder: true,
            },
            None => Self {
                id: id.to_string(),
                name: id.to_string(),
                entity_type: "unknown".to_string(),
                icon: "ri:file-line".to_string(),
                route: if id.starts_with('/') {
                    id.to_string()
                } else {
                    format!("/{id}")
                },
                placeholder: true,
            },
        }
    }

    fn apply(&mut self, patch: &MetadataPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
            self.placeholder = false;
        }
        if let Some(icon) = &patch.icon {
            self.icon.clone_from(icon);
        }
    }
}

/// Cosmetic update reported by a renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New display name
    pub name: Option<String>,
    /// New icon
    pub icon: Option<String>,
}

impl MetadataPatch {
    /// Rename patch
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            icon: None,
        }
    }

    /// With icon
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// True when the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none()
    }
}

/// Lazy metadata cache keyed by entity id
#[derive(Debug, Default)]
pub struct EntityMetadataRegistry {
    entries: DashMap<String, EntityMetadata>,
}

impl EntityMetadataRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for an id, creating a placeholder on first reference
    #[must_use]
    pub fn get_metadata(&self, id: &str) -> EntityMetadata {
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| EntityMetadata::placeholder(id))
            .clone()
    }

    /// Metadata for an id without creating a placeholder
    #[must_use]
    pub fn peek(&self, id: &str) -> Option<EntityMetadata> {
        self.entries.get(id).map(|m| m.clone())
    }

    /// Replace metadata wholesale
    pub fn set_metadata(&self, metadata: EntityMetadata) {
        self.entries.insert(metadata.id.clone(), metadata);
    }

    /// Merge a cosmetic patch in place
    ///
    /// Only the named entry changes; nothing else in the registry is
    /// invalidated.
    pub fn update_metadata(&self, id: &str, patch: &MetadataPatch) -> EntityMetadata {
        let mut entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| EntityMetadata::placeholder(id));
        entry.apply(patch);
        tracing::trace!(id, name = %entry.name, "entity metadata patched");
        entry.clone()
    }

    /// Seed metadata from resolved view entities
    ///
    /// Entity routes (`/person/person_abc`) are keyed by their entity id;
    /// everything else is keyed by route.
    pub fn ingest(&self, entities: &[ViewEntity]) {
        for entity in entities {
            let id = entity_id_from_route(&entity.id).unwrap_or(&entity.id);
            self.entries.insert(
                id.to_string(),
                EntityMetadata {
                    id: id.to_string(),
                    name: entity.name.clone(),
                    entity_type: entity.namespace.clone(),
                    icon: entity.icon.clone(),
                    route: entity.id.clone(),
                    placeholder: false,
                },
            );
        }
    }

    /// Forget an entity (after delete)
    pub fn remove(&self, id: &str) -> Option<EntityMetadata> {
        self.entries.remove(id).map(|(_, m)| m)
    }

    /// Number of known entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entity_id_from_route(route: &str) -> Option<&str> {
    let mut parts = route.trim_start_matches('/').split('/');
    let segment = parts.next()?;
    let id = parts.next()?;
    let ns = EntityNamespace::from_segment(segment)?;
    (EntityNamespace::from_entity_id(id) == Some(ns)).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placeholder_from_prefix() {
        let registry = EntityMetadataRegistry::new();
        let meta = registry.get_metadata("person_abc");

        assert_eq!(meta.name, "Person");
        assert_eq!(meta.entity_type, "person");
        assert_eq!(meta.route, "/person/person_abc");
        assert!(meta.placeholder);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_prefix_placeholder() {
        let meta = EntityMetadata::placeholder("mystery");
        assert_eq!(meta.entity_type, "unknown");
        assert_eq!(meta.name, "mystery");
        assert_eq!(meta.route, "/mystery");
    }

    #[test]
    fn rename_patches_in_place() {
        let registry = EntityMetadataRegistry::new();
        registry.get_metadata("page_1");
        registry.get_metadata("page_2");

        let updated = registry.update_metadata("page_1", &MetadataPatch::rename("Reading list"));

        assert_eq!(updated.name, "Reading list");
        assert!(!updated.placeholder);
        assert_eq!(updated.icon, "ri:file-text-line");
        assert_eq!(registry.peek("page_2").unwrap().name, "Page");
    }

    #[test]
    fn icon_only_patch_keeps_placeholder_name() {
        let registry = EntityMetadataRegistry::new();
        let updated = registry.update_metadata(
            "thing_1",
            &MetadataPatch::default().with_icon("ri:star-line"),
        );
        assert_eq!(updated.icon, "ri:star-line");
        assert!(updated.placeholder);
    }

    #[test]
    fn ingest_keys_entities_by_id() {
        let registry = EntityMetadataRegistry::new();
        registry.ingest(&[
            ViewEntity::new("/person/person_jane", "Jane", "person", "ri:user-line"),
            ViewEntity::new("/wiki", "Overview", "app", "ri:compass-line"),
        ]);

        assert_eq!(registry.peek("person_jane").unwrap().name, "Jane");
        assert_eq!(registry.peek("/wiki").unwrap().route, "/wiki");
    }

    #[test]
    fn remove_forgets_entity() {
        let registry = EntityMetadataRegistry::new();
        registry.get_metadata("org_1");
        assert!(registry.remove("org_1").is_some());
        assert!(registry.is_empty());
    }
}
