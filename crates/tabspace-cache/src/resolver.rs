//! View resolution collaborator
//!
//! The backend resolves a saved view (a named dynamic query) into a list of
//! entities. The cache only depends on the [`ViewResolver`] trait.

use crate::error::ResolveError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Entity returned from view resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntity {
    /// Route of the entity (`/person/person_abc`, `https://…`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Namespace (`person`, `page`, `chat`, …)
    pub namespace: String,
    /// Icon name
    pub icon: String,
    /// Last update timestamp, if the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ViewEntity {
    /// Create entity
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            namespace: namespace.into(),
            icon: icon.into(),
            updated_at: None,
        }
    }
}

/// Resolved view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResolution {
    /// View id
    pub view_id: String,
    /// Namespace the view queries; used for coarse invalidation
    pub namespace: String,
    /// Entities in display order
    pub entities: Vec<ViewEntity>,
}

/// Backend view resolution
#[async_trait]
pub trait ViewResolver: Send + Sync {
    /// Resolve a view into its current entities
    async fn resolve_view(&self, view_id: &str) -> Result<ViewResolution, ResolveError>;
}
