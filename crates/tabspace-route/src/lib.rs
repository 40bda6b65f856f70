//! Tabspace Routes
//!
//! Typed routes for the tab engine.
//!
//! # Overview
//!
//! - **RouteParser**: total path → [`RouteDescriptor`] mapping with
//!   normalization (`/day` → `/day/day_2025-12-10`)
//! - **IdentityKey**: which routes denote the same open document
//! - **TabDomain**: which content types may replace each other in place
//! - **EntityNamespace**: entity id prefixes (`person_…`) → route, icon
//!
//! # Example
//!
//! ```rust
//! use tabspace_route::{ContentType, RouteParser};
//!
//! let parser = RouteParser::new();
//! let route = parser.parse("/chat/conv_42");
//!
//! assert_eq!(route.content_type, ContentType::Chat);
//! assert_eq!(route.identity_key().unwrap().as_str(), "chat:conv_42");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod content;
pub mod descriptor;
pub mod namespace;
pub mod parser;
pub mod registry;

// Re-exports
pub use content::{ContentType, TabDomain};
pub use descriptor::{identity_key, IdentityFields, IdentityKey, RouteDescriptor};
pub use namespace::EntityNamespace;
pub use parser::{parse_route, Clock, FixedClock, RouteParser, SystemClock};
pub use registry::{DefaultRouteRegistry, RouteRegistry};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for route handling
    pub use crate::{
        ContentType, DefaultRouteRegistry, IdentityFields, IdentityKey, RouteDescriptor,
        RouteParser, RouteRegistry, TabDomain,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
