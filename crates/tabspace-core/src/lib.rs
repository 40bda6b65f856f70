//! Tabspace Core - workspace, pane and tab orchestration
//!
//! Tracks which content is on screen across up to two side-by-side panes
//! and several isolated spaces:
//! - Opens, reuses and rewrites tabs from routes (hybrid navigation)
//! - Keeps back/forward history of tab activations
//! - Persists each space's tabs under a versioned snapshot
//! - Keeps the address bar in sync in both directions
//! - Caches resolved views and entity metadata
//!
//! # Example
//!
//! ```rust
//! use tabspace_core::{OpenOptions, WorkspaceEngine};
//!
//! let mut engine = WorkspaceEngine::builder().build().unwrap();
//! engine.open_tab_from_route("/chat/conv_1", OpenOptions::new());
//! engine.enable_split();
//! engine.open_tab_from_route("/wiki/alpha", OpenOptions::new().prefer_empty_pane());
//!
//! assert_eq!(engine.current_url(), "/chat/conv_1?right=/wiki/alpha");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod history;
pub mod manager;
pub mod persistence;
pub mod space;
pub mod types;
pub mod url;

// Re-exports
pub use config::WorkspaceConfig;
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsHook};
pub use engine::{WorkspaceEngine, WorkspaceEngineBuilder};
pub use error::{ConfigError, SpaceError, StorageError, WorkspaceError, WorkspaceResult};
pub use history::HistoryStack;
pub use manager::{Change, OpenOptions, PaneTabManager, TabInput, TabPatch};
pub use persistence::{
    FileStorage, LoadOutcome, MemoryStorage, PersistedSnapshot, PersistenceCodec, StorageBackend,
    CURRENT_VERSION,
};
pub use space::{
    CreateSpace, LocalSpaces, Space, SpaceContents, SpaceItem, SpaceSwitcher, SpaceView,
    SpacesApi, UpdateSpace,
};
pub use types::{
    InvariantViolation, Pane, PaneId, Tab, TabId, WorkbenchState, WorkspaceSnapshot,
};
pub use url::{derive_url, parse_url, UrlMode, UrlSynchronizer, UrlTarget, UrlUpdate};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a workspace
    pub use crate::{
        OpenOptions, PaneId, Space, TabId, TabInput, UrlMode, UrlUpdate, WorkbenchState,
        WorkspaceConfig, WorkspaceEngine, WorkspaceSnapshot,
    };
    pub use tabspace_route::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
