use crate::host::{ChangeListener, GlobalKey, HostGlobalStore, SetGlobalsEvent, Snapshot, Subscription};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type SharedListener = Arc<dyn Fn() + Send + Sync>;

struct ListenerEntry {
    id: u64,
    key: GlobalKey,
    listener: SharedListener,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    fn insert(&mut self, key: GlobalKey, listener: SharedListener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ListenerEntry { id, key, listener });
        id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|entry| entry.id != id);
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn matching(&self, event: &SetGlobalsEvent) -> Vec<(u64, SharedListener)> {
        self.entries
            .iter()
            .filter(|entry| event.carries(entry.key))
            .map(|entry| (entry.id, Arc::clone(&entry.listener)))
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The host-owned global object plus its change channel.
///
/// `None` until the host injects it. Every subscription shares one listener list
/// and filters on its own key.
#[derive(Clone, Default)]
pub struct HostGlobals {
    globals: Arc<Mutex<Option<Map<String, Value>>>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl HostGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn injected(globals: Map<String, Value>) -> Self {
        let store = Self::new();
        store.inject(globals);
        store
    }

    pub fn is_injected(&self) -> bool {
        lock(&self.globals).is_some()
    }

    /// Creates the global object (if needed) and announces every provided key.
    pub fn inject(&self, globals: Map<String, Value>) {
        lock(&self.globals).get_or_insert_with(Map::new);
        self.set_globals(SetGlobalsEvent { globals });
    }

    /// Applies a host push, then notifies listeners in registration order.
    ///
    /// Listeners run after both locks are released so they can read snapshots.
    /// Each one is re-checked just before its call, so a subscription released
    /// mid-dispatch is not called afterwards.
    pub fn set_globals(&self, event: SetGlobalsEvent) {
        {
            let mut globals = lock(&self.globals);
            let target = globals.get_or_insert_with(Map::new);
            for (name, value) in &event.globals {
                target.insert(name.clone(), value.clone());
            }
        }

        let listeners = lock(&self.listeners).matching(&event);
        tracing::trace!(
            keys = ?event.keys().collect::<Vec<_>>(),
            listeners = listeners.len(),
            "set_globals"
        );
        for (id, listener) in listeners {
            if lock(&self.listeners).contains(id) {
                listener();
            }
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

impl HostGlobalStore for HostGlobals {
    fn subscribe(&self, key: GlobalKey, on_change: ChangeListener) -> Subscription {
        let id = lock(&self.listeners).insert(key, Arc::from(on_change));
        let registry: Weak<Mutex<ListenerRegistry>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).remove(id);
            }
        })
    }

    fn snapshot(&self, key: GlobalKey) -> Snapshot {
        let globals = lock(&self.globals);
        match globals.as_ref() {
            Some(globals) => Snapshot::from_value(globals.get(key.as_str())),
            None => Snapshot::Absent,
        }
    }
}
