//! Content types and tab domains
//!
//! Provides [`ContentType`] (what a route renders) and [`TabDomain`] (which
//! content types may replace each other in place during navigation).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of content a tab shows
///
/// Serialized in `snake_case`; this is the `contentType` field of persisted
/// tabs, so variants must not be renamed without bumping the snapshot version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Blank chat composer (`/`)
    NewChat,
    /// Chat history list (`/chat`)
    ChatHistory,
    /// Single conversation (`/chat/{id}`)
    Chat,
    /// Page list (`/page`)
    PageList,
    /// Single page (`/page/{id}`)
    Page,
    /// Wiki landing page (`/wiki`)
    WikiOverview,
    /// Wiki article (`/wiki/{slug}`)
    Wiki,
    /// People/places/orgs/things list
    EntityList,
    /// Person entity
    Person,
    /// Place entity
    Place,
    /// Organization entity
    Org,
    /// Thing entity
    Thing,
    /// Day timeline
    Day,
    /// Year timeline
    Year,
    /// Data source list
    SourceList,
    /// Single data source
    Source,
    /// Drive browser
    Drive,
    /// Saved view
    View,
    /// SQL viewer
    Sql,
    /// Terminal
    Terminal,
    /// Sitemap
    Sitemap,
    /// Settings and other system pages
    Settings,
    /// External web link
    External,
    /// Anything the parser does not recognize
    Unknown,
}

impl ContentType {
    /// Stable string name (same as serialized form)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewChat => "new_chat",
            Self::ChatHistory => "chat_history",
            Self::Chat => "chat",
            Self::PageList => "page_list",
            Self::Page => "page",
            Self::WikiOverview => "wiki_overview",
            Self::Wiki => "wiki",
            Self::EntityList => "entity_list",
            Self::Person => "person",
            Self::Place => "place",
            Self::Org => "org",
            Self::Thing => "thing",
            Self::Day => "day",
            Self::Year => "year",
            Self::SourceList => "source_list",
            Self::Source => "source",
            Self::Drive => "drive",
            Self::View => "view",
            Self::Sql => "sql",
            Self::Terminal => "terminal",
            Self::Sitemap => "sitemap",
            Self::Settings => "settings",
            Self::External => "external",
            Self::Unknown => "unknown",
        }
    }

    /// Domain this content type belongs to, if any
    ///
    /// `External` and `Unknown` have no domain and are never rewritten in
    /// place.
    #[must_use]
    pub fn domain(self) -> Option<TabDomain> {
        match self {
            Self::NewChat | Self::ChatHistory | Self::Chat => Some(TabDomain::Chat),
            Self::WikiOverview
            | Self::Wiki
            | Self::EntityList
            | Self::Person
            | Self::Place
            | Self::Org
            | Self::Thing
            | Self::Day
            | Self::Year => Some(TabDomain::Wiki),
            Self::PageList | Self::Page => Some(TabDomain::Pages),
            Self::SourceList | Self::Source | Self::Drive => Some(TabDomain::Data),
            Self::Sql | Self::Terminal | Self::Sitemap | Self::Settings => {
                Some(TabDomain::System)
            }
            Self::View => Some(TabDomain::Views),
            Self::External | Self::Unknown => None,
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation domain
///
/// Two content types in the same domain are "the same context": the active
/// unpinned tab may be rewritten in place instead of opening a new tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabDomain {
    /// Conversations
    Chat,
    /// Wiki, entities and timelines
    Wiki,
    /// User pages
    Pages,
    /// Sources and drive
    Data,
    /// Developer/system tools
    System,
    /// Saved views
    Views,
}
