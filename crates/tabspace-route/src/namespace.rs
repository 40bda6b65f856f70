//! Entity id namespaces
//!
//! Backend entity ids carry their type as a prefix (`person_…`, `day_…`).
//! [`EntityNamespace`] maps those prefixes to route segments, content types
//! and default icons so callers can build a placeholder for an entity they
//! have not fetched yet.

use crate::content::ContentType;
use serde::{Deserialize, Serialize};

/// Namespace of a prefixed entity id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityNamespace {
    /// `person_…`
    Person,
    /// `place_…`
    Place,
    /// `org_…`
    Org,
    /// `thing_…`
    Thing,
    /// `day_YYYY-MM-DD`
    Day,
    /// `year_YYYY`
    Year,
    /// `chat_…` / `conv_…`
    Chat,
    /// `page_…`
    Page,
    /// `source_…`
    Source,
    /// `view_…`
    View,
}

impl EntityNamespace {
    /// All namespaces
    pub const ALL: [Self; 10] = [
        Self::Person,
        Self::Place,
        Self::Org,
        Self::Thing,
        Self::Day,
        Self::Year,
        Self::Chat,
        Self::Page,
        Self::Source,
        Self::View,
    ];

    /// Namespace of an entity id, from its prefix
    #[must_use]
    pub fn from_entity_id(id: &str) -> Option<Self> {
        let (prefix, rest) = id.split_once('_')?;
        if rest.is_empty() {
            return None;
        }
        match prefix {
            "person" => Some(Self::Person),
            "place" => Some(Self::Place),
            "org" => Some(Self::Org),
            "thing" => Some(Self::Thing),
            "day" => Some(Self::Day),
            "year" => Some(Self::Year),
            "chat" | "conv" => Some(Self::Chat),
            "page" => Some(Self::Page),
            "source" => Some(Self::Source),
            "view" => Some(Self::View),
            _ => None,
        }
    }

    /// Namespace of a route's first segment (`/person/…` → `Person`)
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == segment)
    }

    /// Namespace name, also the first route segment
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Org => "org",
            Self::Thing => "thing",
            Self::Day => "day",
            Self::Year => "year",
            Self::Chat => "chat",
            Self::Page => "page",
            Self::Source => "source",
            Self::View => "view",
        }
    }

    /// Content type of a detail route in this namespace
    #[must_use]
    pub fn content_type(self) -> ContentType {
        match self {
            Self::Person => ContentType::Person,
            Self::Place => ContentType::Place,
            Self::Org => ContentType::Org,
            Self::Thing => ContentType::Thing,
            Self::Day => ContentType::Day,
            Self::Year => ContentType::Year,
            Self::Chat => ContentType::Chat,
            Self::Page => ContentType::Page,
            Self::Source => ContentType::Source,
            Self::View => ContentType::View,
        }
    }

    /// Default icon
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Person => "ri:user-line",
            Self::Place => "ri:map-pin-line",
            Self::Org => "ri:building-line",
            Self::Thing => "ri:box-3-line",
            Self::Day | Self::Year => "ri:calendar-line",
            Self::Chat => "ri:chat-1-line",
            Self::Page => "ri:file-text-line",
            Self::Source => "ri:database-2-line",
            Self::View => "ri:stack-line",
        }
    }

    /// Placeholder display name used before real metadata arrives
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Org => "Organization",
            Self::Thing => "Thing",
            Self::Day => "Day",
            Self::Year => "Year",
            Self::Chat => "Chat",
            Self::Page => "Page",
            Self::Source => "Source",
            Self::View => "View",
        }
    }

    /// Canonical detail route for an entity id
    #[must_use]
    pub fn route_for(self, id: &str) -> String {
        format!("/{}/{id}", self.as_str())
    }
}
