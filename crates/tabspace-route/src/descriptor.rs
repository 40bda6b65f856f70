//! Route descriptors and tab identity
//!
//! A [`RouteDescriptor`] is the typed result of parsing a path. Its
//! [`IdentityKey`] decides whether two navigations point at the same open
//! document.

use crate::content::ContentType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Type-dependent identity fields of a route
///
/// Only the field relevant to the content type is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityFields {
    /// Prefixed entity id (`person_…`, `day_…`, `year_…`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Chat conversation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Wiki article slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Data source id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Page id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    /// Saved view id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    /// External URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl IdentityFields {
    /// No identity fields
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Entity identity
    #[must_use]
    pub fn entity(id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Conversation identity
    #[must_use]
    pub fn conversation(id: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Wiki slug identity
    #[must_use]
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    /// Source identity
    #[must_use]
    pub fn source(id: impl Into<String>) -> Self {
        Self {
            source_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Page identity
    #[must_use]
    pub fn page(id: impl Into<String>) -> Self {
        Self {
            page_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// View identity
    #[must_use]
    pub fn view(id: impl Into<String>) -> Self {
        Self {
            view_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// External URL identity
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// True when no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parsed route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    /// What the route renders
    pub content_type: ContentType,
    /// Identity fields for duplicate detection
    pub identity: IdentityFields,
    /// Display label
    pub label: String,
    /// Display icon (`ri:` icon name)
    pub icon: String,
    /// Cleaned input route
    pub route: String,
    /// Canonical form when it differs from the input (e.g. `/day` → dated route)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_route: Option<String>,
}

impl RouteDescriptor {
    /// Route to store on a tab
    #[inline]
    #[must_use]
    pub fn canonical_route(&self) -> &str {
        self.normalized_route.as_deref().unwrap_or(&self.route)
    }

    /// Identity key, if this content type carries one
    #[inline]
    #[must_use]
    pub fn identity_key(&self) -> Option<IdentityKey> {
        identity_key(self.content_type, &self.identity, self.canonical_route())
    }
}

/// Stable identity of an open document
///
/// Two tabs with equal keys show the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Raw key string (`entity:day_2025-12-10`)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for an entity id
    #[must_use]
    pub fn entity(id: &str) -> Self {
        Self(format!("entity:{id}"))
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the identity key of a route
///
/// Detail routes key on their identity field; singleton app routes
/// (`/chat`, `/wiki`, `/virtues/sql`) key on the canonical route so they are
/// also opened at most once. `Unknown` routes have no identity.
#[must_use]
pub fn identity_key(
    content_type: ContentType,
    identity: &IdentityFields,
    canonical_route: &str,
) -> Option<IdentityKey> {
    let key = match content_type {
        ContentType::Chat => format!("chat:{}", identity.conversation_id.as_deref()?),
        ContentType::Page => format!("page:{}", identity.page_id.as_deref()?),
        ContentType::Wiki => format!("wiki:{}", identity.slug.as_deref()?),
        ContentType::Source => format!("source:{}", identity.source_id.as_deref()?),
        ContentType::View => format!("view:{}", identity.view_id.as_deref()?),
        ContentType::External => format!("url:{}", identity.url.as_deref()?),
        ContentType::Person
        | ContentType::Place
        | ContentType::Org
        | ContentType::Thing
        | ContentType::Day
        | ContentType::Year => format!("entity:{}", identity.entity_id.as_deref()?),
        ContentType::NewChat
        | ContentType::ChatHistory
        | ContentType::PageList
        | ContentType::WikiOverview
        | ContentType::EntityList
        | ContentType::SourceList
        | ContentType::Drive
        | ContentType::Sql
        | ContentType::Terminal
        | ContentType::Sitemap
        | ContentType::Settings => format!("route:{canonical_route}"),
        ContentType::Unknown => return None,
    };
    Some(IdentityKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_types_share_entity_keyspace() {
        let key = identity_key(
            ContentType::Day,
            &IdentityFields::entity("day_2025-12-10"),
            "/day/day_2025-12-10",
        );
        assert_eq!(key, Some(IdentityKey::entity("day_2025-12-10")));
    }

    #[test]
    fn app_routes_key_on_route() {
        let key = identity_key(ContentType::ChatHistory, &IdentityFields::none(), "/chat").unwrap();
        assert_eq!(key.as_str(), "route:/chat");
    }

    #[test]
    fn unknown_and_incomplete_have_no_identity() {
        assert!(identity_key(ContentType::Unknown, &IdentityFields::none(), "/x").is_none());
        assert!(identity_key(ContentType::Chat, &IdentityFields::none(), "/chat/x").is_none());
    }

    #[test]
    fn identity_fields_skip_empty_on_serialize() {
        let json = serde_json::to_string(&IdentityFields::page("page_1")).unwrap();
        assert_eq!(json, r#"{"pageId":"page_1"}"#);
    }
}
