use std::sync::{Arc, RwLock, Weak};

use tracing::trace;

use crate::value::model::ValueObserver;

/// Change listener with no payload, used by the widget-facing model
/// contracts ("state changed" style notification).
pub type ChangeListener = dyn Fn() + Send + Sync;

enum Entry<T: ?Sized> {
    Weak(Weak<T>),
    Strong(Arc<T>),
}

impl<T: ?Sized> Entry<T> {
    fn upgrade(&self) -> Option<Arc<T>> {
        match self {
            Entry::Weak(weak) => weak.upgrade(),
            Entry::Strong(strong) => Some(Arc::clone(strong)),
        }
    }

    fn is_stale(&self) -> bool {
        match self {
            Entry::Weak(weak) => weak.strong_count() == 0,
            Entry::Strong(_) => false,
        }
    }

    fn matches(&self, target: &Arc<T>) -> bool {
        match self.upgrade() {
            Some(held) => Arc::ptr_eq(&held, target),
            None => false,
        }
    }
}

/// A weakly-held listener list.
///
/// Listeners are registered through an `Arc` and stored as `Weak` entries;
/// dropping the registering side's `Arc` ends the observation. There is no
/// reference queue to drain: stale entries are detected by a failed upgrade
/// and swept opportunistically on every registration and every snapshot
/// taken for dispatch. Sweep cost is linear in the number of entries.
pub struct ListenerList<L: ?Sized> {
    entries: RwLock<Vec<Entry<L>>>,
}

impl<L: ?Sized> ListenerList<L> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: &Arc<L>) {
        let mut entries = self.entries.write().unwrap();
        Self::sweep(&mut entries);
        entries.push(Entry::Weak(Arc::downgrade(listener)));
    }

    pub fn add_strongly(&self, listener: Arc<L>) {
        let mut entries = self.entries.write().unwrap();
        Self::sweep(&mut entries);
        entries.push(Entry::Strong(listener));
    }

    pub fn remove(&self, listener: &Arc<L>) {
        let mut entries = self.entries.write().unwrap();
        Self::sweep(&mut entries);
        if let Some(pos) = entries.iter().position(|e| e.matches(listener)) {
            entries.remove(pos);
        }
    }

    /// Number of live listeners. Stale entries are swept first, so the
    /// count reflects only reachable listeners.
    pub fn count(&self) -> usize {
        let mut entries = self.entries.write().unwrap();
        Self::sweep(&mut entries);
        entries.len()
    }

    /// Sweeps stale entries and returns strong references to the live
    /// listeners, in registration order. Dispatch happens outside the
    /// internal lock so that listeners may re-enter this list.
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        let mut entries = self.entries.write().unwrap();
        Self::sweep(&mut entries);
        entries.iter().filter_map(Entry::upgrade).collect()
    }

    fn sweep(entries: &mut Vec<Entry<L>>) {
        let before = entries.len();
        entries.retain(|e| !e.is_stale());
        let dropped = before - entries.len();
        if dropped > 0 {
            trace!(dropped, "swept stale listeners");
        }
    }
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak observer registry used by every subject implementation.
///
/// Wraps a [`ListenerList`] of [`ValueObserver`]s and dispatches
/// old/new change notifications to the live entries.
pub struct ObserverRegistry<T> {
    observers: ListenerList<ValueObserver<T>>,
}

impl<T> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            observers: ListenerList::new(),
        }
    }

    pub fn add(&self, observer: &Arc<ValueObserver<T>>) {
        self.observers.add(observer);
    }

    pub fn add_strongly(&self, observer: Arc<ValueObserver<T>>) {
        self.observers.add_strongly(observer);
    }

    pub fn remove(&self, observer: &Arc<ValueObserver<T>>) {
        self.observers.remove(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.count()
    }

    /// Notifies all live observers with the given old and new value.
    /// Observers run outside the registry lock and may re-enter the
    /// subject; termination is the subject's concern (the not-equal gate
    /// on `set_value`).
    pub fn notify(&self, old: Option<&T>, new: Option<&T>) {
        for observer in self.observers.snapshot() {
            observer(old, new);
        }
    }
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
