use std::sync::{Arc, RwLock};

use crate::value::model::{ValueModel, ValueObserver};
use crate::value::registry::ObserverRegistry;

/// A simple [`ValueModel`] implementation that holds one generic value.
///
/// The authoritative value source in a binding: application code creates a
/// holder once and binds it to any number of adapters. Observers are
/// notified with the old and new value iff the two differ under
/// `PartialEq`.
///
/// # Examples
///
/// ```
/// use tether::value::{ValueHolder, ValueModel};
///
/// let holder = ValueHolder::new(3);
/// assert_eq!(holder.value(), Some(3));
///
/// holder.set_value(Some(7));
/// assert_eq!(holder.value(), Some(7));
/// ```
pub struct ValueHolder<T> {
    value: RwLock<Option<T>>,
    observers: ObserverRegistry<T>,
}

impl<T> ValueHolder<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    /// Creates a holder with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(Some(initial)),
            observers: ObserverRegistry::new(),
        }
    }

    /// Creates a holder whose value is absent.
    pub fn empty() -> Self {
        Self {
            value: RwLock::new(None),
            observers: ObserverRegistry::new(),
        }
    }

    /// Number of live observers. Intended for diagnostics and tests.
    pub fn observer_count(&self) -> usize {
        self.observers.observer_count()
    }
}

impl<T> ValueModel<T> for ValueHolder<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    fn value(&self) -> Option<T> {
        self.value.read().unwrap().clone()
    }

    fn set_value(&self, new_value: Option<T>) {
        let old = {
            let mut value = self.value.write().unwrap();
            if *value == new_value {
                return;
            }
            std::mem::replace(&mut *value, new_value.clone())
        };
        // The write lock is released before dispatch so observers may
        // re-enter set_value; the not-equal gate above terminates cycles.
        self.observers.notify(old.as_ref(), new_value.as_ref());
    }

    fn add_observer(&self, observer: &Arc<ValueObserver<T>>) {
        self.observers.add(observer);
    }

    fn add_observer_strongly(&self, observer: Arc<ValueObserver<T>>) {
        self.observers.add_strongly(observer);
    }

    fn remove_observer(&self, observer: &Arc<ValueObserver<T>>) {
        self.observers.remove(observer);
    }
}
