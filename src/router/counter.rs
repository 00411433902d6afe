use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-route hit counter, incremented once for every request the route wins.
///
/// Implementations must tolerate concurrent increments from any number of
/// connection coroutines.
pub trait RouteCounter: Send + Sync {
    fn increment(&self);
}

/// Lock-free counter on a relaxed `AtomicU64`.
#[derive(Default)]
pub struct AtomicRouteCounter {
    hits: AtomicU64,
}

impl AtomicRouteCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Reset to zero, returning the previous count.
    pub fn take(&self) -> u64 {
        self.hits.swap(0, Ordering::Relaxed)
    }
}

impl RouteCounter for AtomicRouteCounter {
    #[inline]
    fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicRouteCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicRouteCounter")
            .field("hits", &self.get())
            .finish()
    }
}
