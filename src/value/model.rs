use std::sync::Arc;

/// Observer of value changes. Called with the old and new value after a
/// subject's value has actually changed.
pub type ValueObserver<T> = dyn Fn(Option<&T>, Option<&T>) + Send + Sync;

/// The observable value-holder contract.
///
/// This is the sole interface the binding core requires from, and exposes
/// to, application code and every adapter. A subject holds one nullable
/// value; `None` represents the absent value. Implementations fire their
/// observers only when the old and new value differ.
///
/// Observers are registered through an [`Arc`] and held weakly by default:
/// a subject never keeps its observers alive. The registering party owns
/// the `Arc` and the observation ends when it is dropped. The rare strong
/// registration is available for callers whose lifetime is guaranteed to
/// exceed the subject's.
pub trait ValueModel<T>: Send + Sync {
    /// Returns the current value, or `None` when absent.
    fn value(&self) -> Option<T>;

    /// Stores a new value and notifies observers iff it differs from the
    /// previous one.
    fn set_value(&self, new_value: Option<T>);

    /// Registers a weakly-held change observer.
    fn add_observer(&self, observer: &Arc<ValueObserver<T>>);

    /// Registers a strongly-held change observer. Use sparingly; the
    /// observer stays registered for the subject's whole lifetime unless
    /// removed explicitly.
    fn add_observer_strongly(&self, observer: Arc<ValueObserver<T>>);

    /// Removes a previously registered observer. Identity is by allocation,
    /// so pass the same `Arc` that was registered.
    fn remove_observer(&self, observer: &Arc<ValueObserver<T>>);
}
