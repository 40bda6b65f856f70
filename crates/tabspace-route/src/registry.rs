//! Route registry seam
//!
//! The engine depends on [`RouteRegistry`] rather than on the parser
//! directly, so embedders can add routes or pin the clock.

use crate::content::{ContentType, TabDomain};
use crate::descriptor::RouteDescriptor;
use crate::parser::{Clock, RouteParser, SystemClock};
use std::fmt::Debug;

/// Route parsing and domain classification
///
/// Implementations must be pure: the same input always yields the same
/// descriptor for a given date.
pub trait RouteRegistry: Debug + Send + Sync {
    /// Parse a route into a descriptor
    fn parse_route(&self, path: &str) -> RouteDescriptor;

    /// Navigation domain of a content type
    fn tab_domain(&self, content_type: ContentType) -> Option<TabDomain> {
        content_type.domain()
    }
}

/// Registry backed by the built-in route table
#[derive(Debug, Clone, Default)]
pub struct DefaultRouteRegistry<C = SystemClock> {
    parser: RouteParser<C>,
}

impl DefaultRouteRegistry<SystemClock> {
    /// Registry using the system clock
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: RouteParser::new(),
        }
    }
}

impl<C: Clock> DefaultRouteRegistry<C> {
    /// Registry using a custom clock
    #[inline]
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            parser: RouteParser::with_clock(clock),
        }
    }
}

impl<C: Clock> RouteRegistry for DefaultRouteRegistry<C> {
    fn parse_route(&self, path: &str) -> RouteDescriptor {
        self.parser.parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FixedClock;
    use chrono::NaiveDate;

    #[test]
    fn registry_delegates_to_parser() {
        let registry = DefaultRouteRegistry::with_clock(FixedClock(
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        ));
        let d = registry.parse_route("/day");
        assert_eq!(d.canonical_route(), "/day/day_2024-02-29");
        assert_eq!(registry.tab_domain(d.content_type), Some(TabDomain::Wiki));
    }
}
