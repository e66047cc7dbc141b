use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use active_window_core::WindowInfo;
use tracing::warn;

/// Identifier of a watch subscription.
///
/// Strictly increasing and never reused within a process lifetime, including
/// across unsubscribe/resubscribe cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) type WatchCallback = Box<dyn Fn(&WindowInfo) + Send>;

/// Thread-safe set of subscriber callbacks.
///
/// Shared between the caller's thread (subscribe/unsubscribe) and the watch
/// loop (notification fan-out); the map mutex is held only for the duration
/// of the map operation, or across the fan-out iteration.
pub(crate) struct WatchRegistry {
    next_id: AtomicU64,
    watches: Mutex<HashMap<WatchId, WatchCallback>>,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            watches: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn add(&self, callback: WatchCallback) -> WatchId {
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_watches().insert(id, callback);
        id
    }

    /// Removes a subscription; removing an unknown id is a no-op.
    pub(crate) fn remove(&self, id: WatchId) {
        self.lock_watches().remove(&id);
    }

    /// Delivers `info` to every registered callback.
    ///
    /// A panicking callback is isolated: its failure is reported and the
    /// remaining callbacks still run.
    pub(crate) fn notify_all(&self, info: &WindowInfo) {
        let watches = self.lock_watches();
        for (id, callback) in watches.iter() {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(info))).is_err() {
                warn!(%id, "watch callback panicked during notification");
            }
        }
    }

    fn lock_watches(&self) -> std::sync::MutexGuard<'_, HashMap<WatchId, WatchCallback>> {
        // a poisoned map is still structurally sound; callbacks themselves
        // run inside a panic boundary
        match self.watches.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn ids_are_unique_and_increasing() {
        let registry = WatchRegistry::new();
        let a = registry.add(Box::new(|_| {}));
        let b = registry.add(Box::new(|_| {}));
        registry.remove(a);
        registry.remove(b);
        let c = registry.add(Box::new(|_| {}));

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let registry = WatchRegistry::new();
        let id = registry.add(Box::new(|_| {}));
        registry.remove(id);
        registry.remove(id);
    }

    #[test]
    fn notify_reaches_all_callbacks() {
        let registry = WatchRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            registry.add(Box::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }

        registry.notify_all(&WindowInfo::default());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_callback_does_not_stop_delivery() {
        let registry = WatchRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        registry.add(Box::new(|_| panic!("subscriber bug")));
        let counter = Arc::clone(&delivered);
        registry.add(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        registry.add(Box::new(|_| panic!("another subscriber bug")));

        registry.notify_all(&WindowInfo::default());
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_callback_is_not_notified() {
        let registry = WatchRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = registry.add(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        registry.remove(id);

        registry.notify_all(&WindowInfo::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
