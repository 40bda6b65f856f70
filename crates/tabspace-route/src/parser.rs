//! Route parser
//!
//! [`RouteParser::parse`] is total: every input produces a descriptor, and
//! anything unrecognized degrades to [`ContentType::Unknown`].

use crate::content::ContentType;
use crate::descriptor::{IdentityFields, RouteDescriptor};
use crate::namespace::EntityNamespace;
use chrono::{Datelike, Local, NaiveDate};
use std::fmt::Debug;

/// Source of "today" for date-relative routes
pub trait Clock: Debug + Send + Sync {
    /// Current local date
    fn today(&self) -> NaiveDate;
}

/// Local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

const DAY_PREFIX: &str = "day_";
const YEAR_PREFIX: &str = "year_";

/// Path → [`RouteDescriptor`] parser
#[derive(Debug, Clone, Default)]
pub struct RouteParser<C = SystemClock> {
    clock: C,
}

impl RouteParser<SystemClock> {
    /// Parser using the local system date
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> RouteParser<C> {
    /// Parser with a custom clock
    #[inline]
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Parse a route
    #[must_use]
    pub fn parse(&self, input: &str) -> RouteDescriptor {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return external(trimmed);
        }

        let segments = path_segments(trimmed);
        let path = join_path(&segments);

        match segments.as_slice() {
            [] => app(ContentType::NewChat, path, "New Chat", "ri:add-line"),
            ["chat"] => app(ContentType::ChatHistory, path, "All Chats", "ri:chat-history-line"),
            ["chat", id] => detail(
                ContentType::Chat,
                path,
                IdentityFields::conversation(*id),
                "Chat",
                "ri:chat-1-line",
            ),
            ["page"] => app(ContentType::PageList, path, "All Pages", "ri:file-list-3-line"),
            ["page", id] => detail(
                ContentType::Page,
                path,
                IdentityFields::page(*id),
                "Page",
                "ri:file-text-line",
            ),
            ["wiki"] => app(ContentType::WikiOverview, path, "Overview", "ri:compass-line"),
            ["wiki", slug] => detail(
                ContentType::Wiki,
                path,
                IdentityFields::slug(*slug),
                &title_case(slug),
                "ri:book-open-line",
            ),
            [list @ ("person" | "place" | "org" | "thing")] => entity_list(list, path),
            [ns @ ("person" | "place" | "org" | "thing"), id] => entity_detail(ns, id, path),
            ["day"] => self.day_descriptor(path, &self.today_id()),
            ["day", id] => self.day_descriptor(path, id),
            ["year"] => year_descriptor(path, &format!("{YEAR_PREFIX}{}", self.clock.today().year())),
            ["year", id] => year_descriptor(path, id),
            ["source"] => app(ContentType::SourceList, path, "Sources", "ri:plug-line"),
            ["source", id] => detail(
                ContentType::Source,
                path,
                IdentityFields::source(*id),
                "Source",
                "ri:database-2-line",
            ),
            ["drive", rest @ ..] => {
                let label = rest.last().map_or_else(|| "Drive".to_string(), |s| (*s).to_string());
                app(ContentType::Drive, path, &label, "ri:folder-line")
            }
            ["view", id] => detail(
                ContentType::View,
                path,
                IdentityFields::view(*id),
                "View",
                "ri:stack-line",
            ),
            ["virtues", "sql"] => app(ContentType::Sql, path, "SQL Viewer", "ri:database-line"),
            ["virtues", "terminal"] => {
                app(ContentType::Terminal, path, "Terminal", "ri:terminal-box-line")
            }
            ["virtues", "sitemap"] => app(ContentType::Sitemap, path, "Sitemap", "ri:road-map-line"),
            ["virtues", .., last] => {
                app(ContentType::Settings, path, &title_case(last), "ri:settings-3-line")
            }
            _ => unknown(path),
        }
    }

    fn today_id(&self) -> String {
        format!("{DAY_PREFIX}{}", self.clock.today().format("%Y-%m-%d"))
    }

    fn day_descriptor(&self, input_path: String, id: &str) -> RouteDescriptor {
        // Accept bare dates (`/day/2025-12-10`) and converge on the prefixed id.
        let entity_id = if NaiveDate::parse_from_str(id, "%Y-%m-%d").is_ok() {
            format!("{DAY_PREFIX}{id}")
        } else {
            id.to_string()
        };
        let label = entity_id
            .strip_prefix(DAY_PREFIX)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map_or_else(
                || entity_id.clone(),
                |date| {
                    if date == self.clock.today() {
                        "Today".to_string()
                    } else {
                        date.format("%b %-d, %Y").to_string()
                    }
                },
            );
        let canonical = EntityNamespace::Day.route_for(&entity_id);
        RouteDescriptor {
            content_type: ContentType::Day,
            identity: IdentityFields::entity(entity_id),
            label,
            icon: EntityNamespace::Day.icon().to_string(),
            normalized_route: (canonical != input_path).then_some(canonical),
            route: input_path,
        }
    }
}

/// Parse with the system clock
#[must_use]
pub fn parse_route(input: &str) -> RouteDescriptor {
    RouteParser::new().parse(input)
}

fn year_descriptor(input_path: String, id: &str) -> RouteDescriptor {
    let entity_id = if id.len() == 4 && id.bytes().all(|b| b.is_ascii_digit()) {
        format!("{YEAR_PREFIX}{id}")
    } else {
        id.to_string()
    };
    let label = entity_id
        .strip_prefix(YEAR_PREFIX)
        .unwrap_or(&entity_id)
        .to_string();
    let canonical = EntityNamespace::Year.route_for(&entity_id);
    RouteDescriptor {
        content_type: ContentType::Year,
        identity: IdentityFields::entity(entity_id),
        label,
        icon: EntityNamespace::Year.icon().to_string(),
        normalized_route: (canonical != input_path).then_some(canonical),
        route: input_path,
    }
}

fn path_segments(input: &str) -> Vec<&str> {
    let end = input.find(['?', '#']).unwrap_or(input.len());
    input[..end]
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn app(content_type: ContentType, route: String, label: &str, icon: &str) -> RouteDescriptor {
    RouteDescriptor {
        content_type,
        identity: IdentityFields::none(),
        label: label.to_string(),
        icon: icon.to_string(),
        route,
        normalized_route: None,
    }
}

fn detail(
    content_type: ContentType,
    route: String,
    identity: IdentityFields,
    label: &str,
    icon: &str,
) -> RouteDescriptor {
    RouteDescriptor {
        content_type,
        identity,
        label: label.to_string(),
        icon: icon.to_string(),
        route,
        normalized_route: None,
    }
}

fn entity_list(segment: &str, route: String) -> RouteDescriptor {
    let (label, icon) = match segment {
        "person" => ("People", "ri:user-line"),
        "place" => ("Places", "ri:map-pin-line"),
        "org" => ("Organizations", "ri:building-line"),
        _ => ("Things", "ri:box-3-line"),
    };
    app(ContentType::EntityList, route, label, icon)
}

fn entity_detail(segment: &str, id: &str, route: String) -> RouteDescriptor {
    let Some(namespace) = EntityNamespace::from_segment(segment) else {
        return unknown(route);
    };
    // Placeholder until the renderer reports the real name.
    let label = id
        .strip_prefix(namespace.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| !rest.is_empty())
        .map_or_else(|| namespace.display_name().to_string(), title_case);
    detail(
        namespace.content_type(),
        route,
        IdentityFields::entity(id),
        &label,
        namespace.icon(),
    )
}

fn external(url: &str) -> RouteDescriptor {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let label = parsed.host_str().unwrap_or(url).to_string();
            RouteDescriptor {
                content_type: ContentType::External,
                identity: IdentityFields::url(url),
                label,
                icon: "ri:external-link-line".to_string(),
                route: url.to_string(),
                normalized_route: None,
            }
        }
        Err(_) => unknown(url.to_string()),
    }
}

fn unknown(route: String) -> RouteDescriptor {
    RouteDescriptor {
        content_type: ContentType::Unknown,
        identity: IdentityFields::none(),
        label: route.clone(),
        icon: "ri:file-line".to_string(),
        route,
        normalized_route: None,
    }
}

fn title_case(raw: &str) -> String {
    raw.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> RouteParser<FixedClock> {
        RouteParser::with_clock(FixedClock(
            NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        ))
    }

    #[test]
    fn root_is_new_chat() {
        let d = parser().parse("");
        assert_eq!(d.content_type, ContentType::NewChat);
        assert_eq!(d.canonical_route(), "/");
        assert_eq!(d.label, "New Chat");
    }

    #[test]
    fn bare_day_normalizes_to_today() {
        let d = parser().parse("/day");
        assert_eq!(d.content_type, ContentType::Day);
        assert_eq!(d.normalized_route.as_deref(), Some("/day/day_2025-12-10"));
        assert_eq!(d.identity.entity_id.as_deref(), Some("day_2025-12-10"));
        assert_eq!(d.label, "Today");
    }

    #[test]
    fn dated_day_has_formatted_label() {
        let d = parser().parse("/day/day_2025-01-03");
        assert_eq!(d.label, "Jan 3, 2025");
        assert!(d.normalized_route.is_none());
    }

    #[test]
    fn bare_date_converges_on_prefixed_route() {
        let a = parser().parse("/day/2025-01-03");
        let b = parser().parse("/day/day_2025-01-03");
        assert_eq!(a.canonical_route(), b.canonical_route());
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn malformed_day_degrades_without_panicking() {
        let d = parser().parse("/day/not-a-date");
        assert_eq!(d.content_type, ContentType::Day);
        assert_eq!(d.label, "not-a-date");
    }

    #[test]
    fn year_normalizes() {
        let d = parser().parse("/year");
        assert_eq!(d.normalized_route.as_deref(), Some("/year/year_2025"));
        assert_eq!(d.label, "2025");
    }

    #[test]
    fn trailing_slash_query_and_fragment_are_dropped() {
        let d = parser().parse("  /chat/conv_1/?tab=x#top ");
        assert_eq!(d.route, "/chat/conv_1");
        assert_eq!(d.identity.conversation_id.as_deref(), Some("conv_1"));
    }

    #[test]
    fn entity_placeholder_label_from_id() {
        let d = parser().parse("/person/person_jane-doe");
        assert_eq!(d.content_type, ContentType::Person);
        assert_eq!(d.label, "Jane Doe");
        assert_eq!(d.icon, "ri:user-line");
    }

    #[test]
    fn entity_list_labels() {
        assert_eq!(parser().parse("/org").label, "Organizations");
        assert_eq!(parser().parse("/person").content_type, ContentType::EntityList);
    }

    #[test]
    fn wiki_slug_title_cased() {
        let d = parser().parse("/wiki/getting-started");
        assert_eq!(d.label, "Getting Started");
        assert_eq!(d.identity.slug.as_deref(), Some("getting-started"));
    }

    #[test]
    fn external_links_use_domain() {
        let d = parser().parse("https://arxiv.org/abs/1234");
        assert_eq!(d.content_type, ContentType::External);
        assert_eq!(d.label, "arxiv.org");
        assert_eq!(d.route, "https://arxiv.org/abs/1234");
    }

    #[test]
    fn system_routes() {
        assert_eq!(parser().parse("/virtues/sql").content_type, ContentType::Sql);
        let settings = parser().parse("/virtues/account-settings");
        assert_eq!(settings.content_type, ContentType::Settings);
        assert_eq!(settings.label, "Account Settings");
    }

    #[test]
    fn unknown_keeps_path_as_label() {
        let d = parser().parse("/nowhere/to/be/found");
        assert_eq!(d.content_type, ContentType::Unknown);
        assert_eq!(d.label, "/nowhere/to/be/found");
        assert!(d.identity_key().is_none());
    }

    proptest::proptest! {
        #[test]
        fn parse_is_total_and_canonical_is_a_fixed_point(input in ".{0,64}") {
            let p = parser();
            let first = p.parse(&input);
            let again = p.parse(first.canonical_route());
            proptest::prop_assert_eq!(first.canonical_route(), again.canonical_route());
            proptest::prop_assert_eq!(first.content_type, again.content_type);
        }
    }
}
