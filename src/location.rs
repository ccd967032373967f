//! Location collaborator: the seam to the browser history.
//!
//! The router reads and writes URLs through a [`LocationAdapter`] and
//! subscribes to externally triggered changes (back/forward buttons, hash
//! edits). [`MemoryLocation`] is the in-crate implementation: an in-memory
//! history stack for tests and headless hosts, with helpers to simulate
//! pop and hash events.

use std::sync::{Arc, RwLock};

/// How an external URL change was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChangeKind {
    Popstate,
    Hashchange,
}

/// An externally triggered URL change.
#[derive(Debug, Clone)]
pub struct LocationChange {
    pub url: String,
    pub kind: LocationChangeKind,
}

/// Callback invoked on external URL changes.
pub type LocationListener = Arc<dyn Fn(LocationChange) + Send + Sync>;

/// The browser-history seam.
pub trait LocationAdapter: Send + Sync {
    /// The current path. With `include_hash` the `#fragment` is included.
    fn path(&self, include_hash: bool) -> String;

    /// Push a new history entry.
    fn go(&self, url: &str);

    /// Replace the current history entry.
    fn replace_state(&self, url: &str);

    /// Whether the current path equals `url`.
    fn is_current_path_equal_to(&self, url: &str) -> bool {
        self.path(false) == url
    }

    /// Register a listener for externally triggered changes.
    fn subscribe(&self, listener: LocationListener);
}

struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

/// An in-memory history stack.
pub struct MemoryLocation {
    use_hash: bool,
    history: RwLock<MemoryHistory>,
    listeners: RwLock<Vec<LocationListener>>,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLocation {
    /// A path-style location starting at `/`.
    pub fn new() -> Self {
        MemoryLocation {
            use_hash: false,
            history: RwLock::new(MemoryHistory {
                entries: vec!["/".to_string()],
                index: 0,
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// A hash-style location: pop events report as hash changes.
    pub fn with_hash() -> Self {
        MemoryLocation {
            use_hash: true,
            ..Self::new()
        }
    }

    /// The full history stack, oldest first. Test helper.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .expect("location lock poisoned")
            .entries
            .clone()
    }

    /// The current entry.
    #[must_use]
    pub fn current(&self) -> String {
        let history = self.history.read().expect("location lock poisoned");
        history.entries[history.index].clone()
    }

    /// Simulate the user navigating the history to `url` (back/forward).
    /// Notifies subscribers with a popstate (or hashchange in hash mode).
    pub fn simulate_pop(&self, url: &str) {
        {
            let mut history = self.history.write().expect("location lock poisoned");
            let index = history.index;
            history.entries[index] = url.to_string();
        }
        let kind = if self.use_hash {
            LocationChangeKind::Hashchange
        } else {
            LocationChangeKind::Popstate
        };
        self.notify(LocationChange {
            url: url.to_string(),
            kind,
        });
    }

    /// Simulate a manual hash edit.
    pub fn simulate_hash_change(&self, url: &str) {
        {
            let mut history = self.history.write().expect("location lock poisoned");
            let index = history.index;
            history.entries[index] = url.to_string();
        }
        self.notify(LocationChange {
            url: url.to_string(),
            kind: LocationChangeKind::Hashchange,
        });
    }

    fn notify(&self, change: LocationChange) {
        let listeners: Vec<LocationListener> = self
            .listeners
            .read()
            .expect("location lock poisoned")
            .clone();
        for listener in listeners {
            listener(change.clone());
        }
    }
}

impl LocationAdapter for MemoryLocation {
    fn path(&self, include_hash: bool) -> String {
        let current = self.current();
        if include_hash {
            current
        } else {
            current
                .split_once('#')
                .map(|(path, _)| path.to_string())
                .unwrap_or(current)
        }
    }

    fn go(&self, url: &str) {
        let mut history = self.history.write().expect("location lock poisoned");
        let index = history.index;
        history.entries.truncate(index + 1);
        history.entries.push(url.to_string());
        history.index += 1;
    }

    fn replace_state(&self, url: &str) {
        let mut history = self.history.write().expect("location lock poisoned");
        let index = history.index;
        history.entries[index] = url.to_string();
    }

    fn subscribe(&self, listener: LocationListener) {
        self.listeners
            .write()
            .expect("location lock poisoned")
            .push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_pushes_and_replace_overwrites() {
        let location = MemoryLocation::new();
        location.go("/a");
        location.go("/b");
        location.replace_state("/c");
        assert_eq!(location.history(), vec!["/", "/a", "/c"]);
        assert_eq!(location.path(false), "/c");
    }

    #[test]
    fn test_path_strips_hash_unless_included() {
        let location = MemoryLocation::new();
        location.go("/a#frag");
        assert_eq!(location.path(false), "/a");
        assert_eq!(location.path(true), "/a#frag");
    }

    #[test]
    fn test_pop_notifies_listeners() {
        let location = MemoryLocation::new();
        let seen = Arc::new(RwLock::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        location.subscribe(Arc::new(move |change: LocationChange| {
            seen_clone.write().unwrap().push((change.url, change.kind));
        }));
        location.simulate_pop("/back");
        let seen = seen.read().unwrap();
        assert_eq!(
            *seen,
            vec![("/back".to_string(), LocationChangeKind::Popstate)]
        );
    }
}
