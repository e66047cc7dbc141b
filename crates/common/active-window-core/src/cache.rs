use std::collections::{HashMap, VecDeque};

/// Key/value store for encoded icon payloads.
///
/// Keys are path-like strings (an executable path, or a package install
/// directory); values are complete encoded-icon strings. Eviction is the
/// implementation's own concern; the engine only requires that a stored
/// value reads back intact until evicted.
pub trait IconCache: Send {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Fixed-capacity cache evicting the oldest inserted entry when full.
///
/// Setting an existing key refreshes the value without changing its
/// eviction position.
#[derive(Debug)]
pub struct FixedCapacityIconCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

impl FixedCapacityIconCache {
    /// `capacity` must be non-zero; an engine configured with capacity zero
    /// skips cache construction entirely instead.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IconCache for FixedCapacityIconCache {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        if self.entries.insert(key.to_owned(), value).is_some() {
            return;
        }
        self.order.push_back(key.to_owned());
        while self.entries.len() > self.capacity {
            let Some(evicted) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&evicted);
        }
    }
}
