//! Request generation guards
//!
//! Overlapping async fetches for the same logical stream are reconciled
//! with a monotonic counter: every request captures a [`Ticket`], and a
//! completion is only applied while its ticket is still the latest one.
//! This gives last-request-wins semantics without cancellation.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Captured request version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw counter value
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter paired with the last committed value
pub struct Generation<T> {
    counter: AtomicU64,
    latest: Mutex<Option<T>>,
}

impl<T> Generation<T> {
    /// Create guard with no requests issued
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Start a request, superseding every earlier ticket
    #[inline]
    pub fn begin(&self) -> Ticket {
        Ticket(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Latest issued ticket
    #[inline]
    #[must_use]
    pub fn current(&self) -> Ticket {
        Ticket(self.counter.load(Ordering::SeqCst))
    }

    /// Whether a ticket is still the latest
    #[inline]
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current() == ticket
    }

    /// Store a completed value if its ticket is current
    ///
    /// Returns `false` (and drops the value) for superseded tickets.
    pub fn commit(&self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            tracing::trace!(ticket = ticket.0, current = self.current().0, "discarding stale result");
            return false;
        }
        *self.latest.lock() = Some(value);
        true
    }

    /// Supersede all in-flight requests without issuing a new one
    #[inline]
    pub fn invalidate(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop the committed value
    #[inline]
    pub fn reset(&self) {
        self.invalidate();
        *self.latest.lock() = None;
    }
}

impl<T: Clone> Generation<T> {
    /// Last committed value
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.latest.lock().clone()
    }

    /// Run a request under a fresh ticket
    ///
    /// Returns `Some(value)` when the result was committed, `None` when a
    /// newer request started while this one was in flight.
    pub async fn run<F>(&self, request: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        let value = request.await;
        self.commit(ticket, value.clone()).then_some(value)
    }
}

impl<T> Default for Generation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Generation<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("current", &self.current().0)
            .field("latest", &*self.latest.lock())
            .finish()
    }
}

/// Independent generation counters keyed by stream
///
/// Used where the set of streams is open-ended (one per view id, one per
/// data stream of a day view).
#[derive(Debug)]
pub struct GenerationSet<K: Eq + Hash> {
    streams: DashMap<K, u64>,
}

impl<K: Eq + Hash + Clone> GenerationSet<K> {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// Start a request on a stream
    pub fn begin(&self, key: &K) -> Ticket {
        let mut entry = self.streams.entry(key.clone()).or_insert(0);
        *entry += 1;
        Ticket(*entry)
    }

    /// Whether a ticket is still the latest for its stream
    #[must_use]
    pub fn is_current(&self, key: &K, ticket: Ticket) -> bool {
        self.streams.get(key).is_some_and(|v| *v == ticket.0)
    }

    /// Supersede in-flight requests on one stream
    pub fn invalidate(&self, key: &K) {
        if let Some(mut entry) = self.streams.get_mut(key) {
            *entry += 1;
        }
    }

    /// Supersede in-flight requests on every stream
    pub fn invalidate_all(&self) {
        for mut entry in self.streams.iter_mut() {
            *entry.value_mut() += 1;
        }
    }
}

impl<K: Eq + Hash + Clone> Default for GenerationSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
