use std::sync::{Arc, RwLock, Weak};

use crate::value::model::{ValueModel, ValueObserver};

/// Keeps two independent [`ValueModel`]s equal by listening to both sides
/// and writing silently, e.g. to link a numeric spinner model with a
/// subject.
///
/// Each write temporarily detaches the connector's own handler from the
/// side being written, so a change on one side triggers exactly one write
/// to the other and never echoes back. When the source side holds no
/// value, `default_value` is substituted so a foreign model that cannot
/// display "absent" always receives a concrete value.
///
/// Dropping the connector detaches both handlers; it doubles as the
/// binding's disposer handle.
pub struct Connector<T> {
    inner: Arc<ConnectorInner<T>>,
}

struct ConnectorInner<T> {
    left: Arc<dyn ValueModel<T>>,
    right: Arc<dyn ValueModel<T>>,
    default_value: Option<T>,
    // Set once during connect(); the indirection exists because each
    // handler must be detachable from the side it writes to.
    left_handler: RwLock<Option<Arc<ValueObserver<T>>>>,
    right_handler: RwLock<Option<Arc<ValueObserver<T>>>>,
}

impl<T> Connector<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Connects the two models. No initial synchronization happens; call
    /// [`update_right`](Self::update_right) or
    /// [`update_left`](Self::update_left) to choose the initial direction.
    pub fn connect(
        left: Arc<dyn ValueModel<T>>,
        right: Arc<dyn ValueModel<T>>,
        default_value: Option<T>,
    ) -> Self {
        let inner = Arc::new(ConnectorInner {
            left,
            right,
            default_value,
            left_handler: RwLock::new(None),
            right_handler: RwLock::new(None),
        });

        let left_handler: Arc<ValueObserver<T>> = {
            let inner: Weak<ConnectorInner<T>> = Arc::downgrade(&inner);
            Arc::new(move |_, _| {
                if let Some(inner) = inner.upgrade() {
                    inner.write_right();
                }
            })
        };
        let right_handler: Arc<ValueObserver<T>> = {
            let inner: Weak<ConnectorInner<T>> = Arc::downgrade(&inner);
            Arc::new(move |_, _| {
                if let Some(inner) = inner.upgrade() {
                    inner.write_left();
                }
            })
        };

        *inner.left_handler.write().unwrap() = Some(left_handler.clone());
        *inner.right_handler.write().unwrap() = Some(right_handler.clone());
        inner.left.add_observer(&left_handler);
        inner.right.add_observer(&right_handler);

        Self { inner }
    }

    /// Reads the left model and writes its value (or the default) into the
    /// right model silently.
    pub fn update_right(&self) {
        self.inner.write_right();
    }

    /// Reads the right model and writes its value (or the default) into
    /// the left model silently.
    pub fn update_left(&self) {
        self.inner.write_left();
    }
}

impl<T> ConnectorInner<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    fn write_right(&self) {
        let handler = self.right_handler.read().unwrap().clone();
        let value = self
            .left
            .value()
            .or_else(|| self.default_value.clone());
        if let Some(handler) = &handler {
            self.right.remove_observer(handler);
        }
        self.right.set_value(value);
        if let Some(handler) = &handler {
            self.right.add_observer(handler);
        }
    }

    fn write_left(&self) {
        let handler = self.left_handler.read().unwrap().clone();
        let value = self
            .right
            .value()
            .or_else(|| self.default_value.clone());
        if let Some(handler) = &handler {
            self.left.remove_observer(handler);
        }
        self.left.set_value(value);
        if let Some(handler) = &handler {
            self.left.add_observer(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::holder::ValueHolder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn holders() -> (Arc<ValueHolder<i32>>, Arc<ValueHolder<i32>>) {
        (Arc::new(ValueHolder::new(0)), Arc::new(ValueHolder::new(0)))
    }

    #[test]
    fn changes_propagate_both_ways() {
        let (left, right) = holders();
        let _connector = Connector::connect(
            left.clone() as Arc<dyn ValueModel<i32>>,
            right.clone() as Arc<dyn ValueModel<i32>>,
            None,
        );

        left.set_value(Some(5));
        assert_eq!(right.value(), Some(5));

        right.set_value(Some(9));
        assert_eq!(left.value(), Some(9));
    }

    #[test]
    fn exactly_one_echo_is_suppressed() {
        let (left, right) = holders();
        let _connector = Connector::connect(
            left.clone() as Arc<dyn ValueModel<i32>>,
            right.clone() as Arc<dyn ValueModel<i32>>,
            None,
        );

        let left_events = Arc::new(AtomicUsize::new(0));
        let observer: Arc<ValueObserver<i32>> = {
            let left_events = left_events.clone();
            Arc::new(move |_, _| {
                left_events.fetch_add(1, Ordering::SeqCst);
            })
        };
        left.add_observer(&observer);

        // One external change on the left: the left fires once, the right
        // is written silently, and nothing comes back.
        left.set_value(Some(3));
        assert_eq!(left_events.load(Ordering::SeqCst), 1);
        assert_eq!(right.value(), Some(3));
    }

    #[test]
    fn default_substituted_for_absent_value() {
        let left = Arc::new(ValueHolder::<i32>::empty());
        let right = Arc::new(ValueHolder::new(7));
        let connector = Connector::connect(
            left.clone() as Arc<dyn ValueModel<i32>>,
            right.clone() as Arc<dyn ValueModel<i32>>,
            Some(42),
        );

        connector.update_right();
        assert_eq!(right.value(), Some(42));
        assert_eq!(left.value(), None);
    }

    #[test]
    fn drop_detaches_both_sides() {
        let (left, right) = holders();
        let connector = Connector::connect(
            left.clone() as Arc<dyn ValueModel<i32>>,
            right.clone() as Arc<dyn ValueModel<i32>>,
            None,
        );
        drop(connector);

        left.set_value(Some(1));
        assert_eq!(right.value(), Some(0));
        assert_eq!(left.observer_count(), 0);
        assert_eq!(right.observer_count(), 0);
    }
}
