//! Diagnostics for silent no-ops
//!
//! Operations on missing tabs, panes or spaces return without effect. Each
//! such event is logged at `debug` and passed to an optional hook so
//! embedders can observe what was ignored.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Observable non-fatal event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Target id does not exist
    NotFound {
        /// Operation name
        operation: &'static str,
        /// Missing id
        target: String,
    },
    /// Operation does not apply to the current state
    Ignored {
        /// Operation name
        operation: &'static str,
        /// Why it was ignored
        reason: &'static str,
    },
    /// Storage write or delete failed
    StorageFailure {
        /// Storage key
        key: String,
        /// Error message
        error: String,
    },
    /// Persisted snapshot dropped on load
    SnapshotDiscarded {
        /// Space whose slot was dropped
        space_id: String,
        /// Why it was dropped
        reason: String,
    },
    /// Views or root items of a space failed to load
    SpaceLoadFailed {
        /// Space id
        space_id: String,
        /// Error message
        error: String,
    },
    /// An async result arrived after a newer request started
    StaleResponse {
        /// Stream name
        stream: String,
    },
}

/// Callback receiving diagnostics
pub type DiagnosticsHook = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Diagnostic sink shared by the engine's components
#[derive(Clone, Default)]
pub struct Diagnostics {
    hook: Option<DiagnosticsHook>,
}

impl Diagnostics {
    /// Sink that only logs
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink forwarding to a hook
    #[must_use]
    pub fn with_hook(hook: DiagnosticsHook) -> Self {
        Self { hook: Some(hook) }
    }

    /// Report a diagnostic
    pub fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NotFound { operation, target } => {
                tracing::debug!(operation, target = %target, "target not found, ignoring");
            }
            Diagnostic::Ignored { operation, reason } => {
                tracing::debug!(operation, reason, "operation ignored");
            }
            Diagnostic::StorageFailure { key, error } => {
                tracing::warn!(key = %key, error = %error, "storage failure");
            }
            Diagnostic::SnapshotDiscarded { space_id, reason } => {
                tracing::warn!(space_id = %space_id, reason = %reason, "discarding persisted tabs");
            }
            Diagnostic::SpaceLoadFailed { space_id, error } => {
                tracing::warn!(space_id = %space_id, error = %error, "space contents failed to load");
            }
            Diagnostic::StaleResponse { stream } => {
                tracing::debug!(stream = %stream, "discarding stale response");
            }
        }
        if let Some(hook) = &self.hook {
            hook(&diagnostic);
        }
    }

    /// Shorthand for [`Diagnostic::NotFound`]
    pub fn not_found(&self, operation: &'static str, target: impl ToString) {
        self.emit(Diagnostic::NotFound {
            operation,
            target: target.to_string(),
        });
    }

    /// Shorthand for [`Diagnostic::Ignored`]
    pub fn ignored(&self, operation: &'static str, reason: &'static str) {
        self.emit(Diagnostic::Ignored { operation, reason });
    }
}

impl Debug for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn hook_receives_diagnostics() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let diagnostics = Diagnostics::with_hook(Arc::new(move |d| sink.lock().push(d.clone())));

        diagnostics.not_found("close_tab", "tab-1");
        diagnostics.ignored("disable_split", "not split");

        assert_eq!(
            *seen.lock(),
            vec![
                Diagnostic::NotFound {
                    operation: "close_tab",
                    target: "tab-1".into()
                },
                Diagnostic::Ignored {
                    operation: "disable_split",
                    reason: "not split"
                },
            ]
        );
    }

    #[test]
    fn without_hook_only_logs() {
        Diagnostics::new().not_found("activate_tab", "missing");
    }
}
