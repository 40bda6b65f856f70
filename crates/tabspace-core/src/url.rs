//! Address-bar synchronization
//!
//! The URL is derived from state: the left pane's active route is the path
//! and, when split, the right pane's active route rides along as `?right=`.
//! Applying an incoming URL mutates state under a skip guard so the
//! resulting syncs do not write the address bar back.

use crate::types::{PaneId, WorkbenchState};
use url::Url;

const RIGHT_PARAM: &str = "right";
const BASE: &str = "http://tabspace.invalid/";

/// How the address bar should be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMode {
    /// New history entry
    Push,
    /// Overwrite the current entry
    Replace,
}

/// Address-bar write requested by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlUpdate {
    /// URL to show
    pub url: String,
    /// Push or replace
    pub mode: UrlMode,
}

/// Routes named by a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTarget {
    /// Left pane route
    pub path: String,
    /// Right pane route, when split
    pub right: Option<String>,
}

impl UrlTarget {
    /// Compose the URL naming these routes
    #[must_use]
    pub fn to_url(&self) -> String {
        compose(&self.path, self.right.as_deref())
    }
}

/// Canonical URL of a state
#[must_use]
pub fn derive_url(state: &WorkbenchState) -> String {
    let Some(left) = state
        .pane(PaneId::Left)
        .and_then(|p| p.active_tab())
        .map(|t| t.route.as_str())
    else {
        return "/".to_string();
    };
    let right = if state.is_split() {
        state
            .pane(PaneId::Right)
            .and_then(|p| p.active_tab())
            .map(|t| t.route.as_str())
    } else {
        None
    };
    compose(left, right)
}

fn compose(path: &str, right: Option<&str>) -> String {
    match right {
        Some(right) => format!("{path}?{RIGHT_PARAM}={}", encode_route(right)),
        None => path.to_string(),
    }
}

fn encode_route(route: &str) -> String {
    if route.contains(['&', '#', '%', '+', ' ', '?']) {
        url::form_urlencoded::byte_serialize(route.as_bytes()).collect()
    } else {
        route.to_string()
    }
}

/// Split a URL into its pane routes
///
/// Accepts app-relative URLs (`/chat/x?right=%2Fwiki`) and absolute ones.
/// The fragment and unrelated query parameters are ignored.
#[must_use]
pub fn parse_url(input: &str) -> UrlTarget {
    let input = input.trim();
    let (path, query) = if input.starts_with('/') || input.is_empty() {
        let without_fragment = input.split_once('#').map_or(input, |(before, _)| before);
        match without_fragment.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (without_fragment.to_string(), None),
        }
    } else {
        match Url::parse(input).or_else(|_| Url::parse(BASE).and_then(|b| b.join(input))) {
            Ok(url) => (url.path().to_string(), url.query().map(str::to_string)),
            Err(_) => (input.to_string(), None),
        }
    };

    let right = query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == RIGHT_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    });

    UrlTarget {
        path: if path.is_empty() { "/".to_string() } else { path },
        right,
    }
}

/// Tracks the address bar and decides when to write it
#[derive(Debug, Clone, Default)]
pub struct UrlSynchronizer {
    current: Option<String>,
    applying: bool,
}

impl UrlSynchronizer {
    /// Create synchronizer with no known URL
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URL last shown
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Record a URL without writing it
    pub fn reset(&mut self, url: impl Into<String>) {
        self.current = Some(url.into());
    }

    /// Re-derive after a mutation
    ///
    /// Returns a push when the URL changed, nothing while an incoming URL
    /// is being applied.
    pub fn sync(&mut self, state: &WorkbenchState) -> Option<UrlUpdate> {
        if self.applying {
            return None;
        }
        let url = derive_url(state);
        if self.current.as_deref() == Some(url.as_str()) {
            return None;
        }
        tracing::trace!(url = %url, "pushing url");
        self.current = Some(url.clone());
        Some(UrlUpdate {
            url,
            mode: UrlMode::Push,
        })
    }

    /// Start applying an incoming URL; syncs are skipped until finished
    #[inline]
    pub fn begin_apply(&mut self) {
        self.applying = true;
    }

    /// Check if an incoming URL is being applied
    #[inline]
    #[must_use]
    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Finish applying `requested`
    ///
    /// Records the derived URL and returns a replace when normalization
    /// changed it (e.g. `/day` became a dated route).
    pub fn finish_apply(&mut self, requested: &UrlTarget, state: &WorkbenchState) -> Option<UrlUpdate> {
        self.applying = false;
        let url = derive_url(state);
        let changed = url != requested.to_url();
        self.current = Some(url.clone());
        changed.then(|| {
            tracing::debug!(url = %url, "replacing normalized url");
            UrlUpdate {
                url,
                mode: UrlMode::Replace,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pane, Tab};
    use pretty_assertions::assert_eq;
    use tabspace_route::RouteParser;

    fn pane(id: PaneId, width: f64, routes: &[&str]) -> Pane {
        let parser = RouteParser::new();
        let mut pane = Pane::new(id, width);
        pane.tabs = routes.iter().map(|r| Tab::from_descriptor(&parser.parse(r))).collect();
        pane.repair_active();
        pane
    }

    fn split(left: &[&str], right: &[&str]) -> WorkbenchState {
        WorkbenchState {
            panes: vec![pane(PaneId::Left, 50.0, left), pane(PaneId::Right, 50.0, right)],
            active_pane_id: PaneId::Left,
            expanded_view_ids: vec![],
        }
    }

    #[test]
    fn split_url_appends_right_route() {
        let state = split(&["/chat/conv_1"], &["/wiki/alpha"]);
        assert_eq!(derive_url(&state), "/chat/conv_1?right=/wiki/alpha");
    }

    #[test]
    fn empty_left_derives_root() {
        assert_eq!(derive_url(&WorkbenchState::empty()), "/");
    }

    #[test]
    fn empty_right_is_omitted() {
        let state = split(&["/chat"], &[]);
        assert_eq!(derive_url(&state), "/chat");
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let state = split(&["/chat"], &["https://example.com/a?b=1&c=2"]);
        let url = derive_url(&state);
        assert_eq!(url, "/chat?right=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1%26c%3D2");
        assert_eq!(
            parse_url(&url),
            UrlTarget {
                path: "/chat".into(),
                right: Some("https://example.com/a?b=1&c=2".into())
            }
        );
    }

    #[test]
    fn parses_relative_and_absolute() {
        assert_eq!(
            parse_url("/day/day_2025-12-10?right=%2Fwiki&x=1#frag"),
            UrlTarget {
                path: "/day/day_2025-12-10".into(),
                right: Some("/wiki".into())
            }
        );
        assert_eq!(
            parse_url("https://app.example.com/page/page_1?right=/chat"),
            UrlTarget {
                path: "/page/page_1".into(),
                right: Some("/chat".into())
            }
        );
        assert_eq!(parse_url("").path, "/");
        assert_eq!(parse_url("/chat?right=").right, None);
    }

    #[test]
    fn sync_pushes_only_on_change() {
        let mut sync = UrlSynchronizer::new();
        let state = split(&["/chat"], &["/wiki"]);

        let update = sync.sync(&state).unwrap();
        assert_eq!(update.mode, UrlMode::Push);
        assert_eq!(sync.sync(&state), None);
    }

    #[test]
    fn apply_guard_suppresses_sync_and_replaces_on_normalization() {
        let mut sync = UrlSynchronizer::new();
        let state = split(&["/chat"], &["/wiki"]);
        let requested = parse_url("/chat/?right=/wiki");

        sync.begin_apply();
        assert_eq!(sync.sync(&state), None);
        let update = sync.finish_apply(&requested, &state).unwrap();

        assert_eq!(update.mode, UrlMode::Replace);
        assert_eq!(update.url, "/chat?right=/wiki");
        assert_eq!(sync.current(), Some("/chat?right=/wiki"));
        assert!(!sync.is_applying());
    }

    #[test]
    fn apply_without_normalization_writes_nothing() {
        let mut sync = UrlSynchronizer::new();
        let state = split(&["/chat"], &["/wiki"]);
        sync.begin_apply();
        assert_eq!(sync.finish_apply(&parse_url("/chat?right=/wiki"), &state), None);
    }
}
