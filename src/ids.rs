use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Strongly typed navigation identifier.
///
/// Ids are handed out by [`NavigationIdSource`] and increase monotonically
/// for the lifetime of a router. The scheduler compares a transition's id
/// against the latest issued id to detect superseded navigations.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct NavigationId(u64);

impl NavigationId {
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for NavigationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id dispenser shared between the caller side (which assigns
/// ids at schedule time) and the scheduler coroutine (which reads the
/// latest issued id at each pipeline step).
#[derive(Debug, Default)]
pub struct NavigationIdSource {
    counter: AtomicU64,
}

impl NavigationIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id. The first issued id is 1.
    pub fn next(&self) -> NavigationId {
        NavigationId(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued id, or `None` before the first navigation.
    pub fn latest(&self) -> Option<NavigationId> {
        match self.counter.load(Ordering::SeqCst) {
            0 => None,
            n => Some(NavigationId(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let source = NavigationIdSource::new();
        assert_eq!(source.latest(), None);
        let a = source.next();
        let b = source.next();
        assert!(a < b);
        assert_eq!(source.latest(), Some(b));
    }
}
