use crate::host::{GlobalKey, HostGlobalStore, Snapshot, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Keeps a widget in sync with one host global.
///
/// Every notification for the key bumps `revision` and calls `notify` (usually a
/// repaint request). Reads always go to the store, so the value is current at
/// call time. Dropping the watch deregisters it.
#[derive(Debug)]
pub struct GlobalWatch {
    key: GlobalKey,
    revision: Arc<AtomicU64>,
    _subscription: Subscription,
}

impl GlobalWatch {
    pub fn new(
        store: &dyn HostGlobalStore,
        key: GlobalKey,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let revision = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&revision);
        let subscription = store.subscribe(
            key,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                notify();
            }),
        );
        Self {
            key,
            revision,
            _subscription: subscription,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn read(&self, store: &dyn HostGlobalStore) -> Snapshot {
        store.snapshot(self.key)
    }
}
