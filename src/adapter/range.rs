use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::error::BindingError;
use crate::value::{ChangeListener, ListenerList, ValueModel, ValueObserver};

/// The bounded-range state model contract used by sliders, scroll bars and
/// progress bars. The invariant `min <= value <= value + extent <= max`
/// holds after every mutator.
pub trait BoundedRangeModel: Send + Sync {
    fn value(&self) -> i32;
    fn extent(&self) -> i32;
    fn minimum(&self) -> i32;
    fn maximum(&self) -> i32;
    fn value_is_adjusting(&self) -> bool;
    fn set_value(&self, n: i32);
    fn set_extent(&self, n: i32);
    fn set_minimum(&self, n: i32);
    fn set_maximum(&self, n: i32);
    fn set_value_is_adjusting(&self, adjusting: bool);
    fn set_range_properties(&self, value: i32, extent: i32, min: i32, max: i32, adjusting: bool);
    fn add_change_listener(&self, listener: &Arc<ChangeListener>);
    fn remove_change_listener(&self, listener: &Arc<ChangeListener>);
}

struct RangeState {
    extent: i32,
    min: i32,
    max: i32,
    adjusting: bool,
}

/// Presents an integer-valued subject through the [`BoundedRangeModel`]
/// contract.
///
/// The subject only ever holds the `value`; extent, minimum and maximum
/// are adapter-local. An absent subject value reads as the minimum. Every
/// mutator funnels through one normalization routine and fires at most
/// one change notification.
pub struct RangeAdapter {
    inner: Arc<RangeInner>,
    _subject_observer: Arc<ValueObserver<i32>>,
}

struct RangeInner {
    subject: Arc<dyn ValueModel<i32>>,
    state: RwLock<RangeState>,
    // Suppresses the subject-change echo while a mutator writes the
    // subject itself, keeping it to one notification per mutator.
    self_writing: AtomicBool,
    change: ListenerList<ChangeListener>,
}

impl RangeAdapter {
    /// Creates an adapter over the subject with the given extent and
    /// bounds. The initial value is the subject's current value, or `min`
    /// when absent. Fails unless
    /// `min <= value <= value + extent <= max` holds.
    pub fn new(
        subject: Arc<dyn ValueModel<i32>>,
        extent: i32,
        min: i32,
        max: i32,
    ) -> Result<Self, BindingError> {
        let value = subject.value().unwrap_or(min);
        let valid = max >= min
            && value >= min
            && extent >= 0
            && (value as i64 + extent as i64) <= max as i64;
        if !valid {
            return Err(BindingError::InvalidRange {
                value,
                extent,
                min,
                max,
            });
        }

        let inner = Arc::new(RangeInner {
            subject,
            state: RwLock::new(RangeState {
                extent,
                min,
                max,
                adjusting: false,
            }),
            self_writing: AtomicBool::new(false),
            change: ListenerList::new(),
        });

        let subject_observer: Arc<ValueObserver<i32>> = {
            let inner: Weak<RangeInner> = Arc::downgrade(&inner);
            Arc::new(move |_, _| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                // An external value change leaves extent/min/max untouched;
                // re-fire the range model's own state-changed event.
                if !inner.self_writing.load(Ordering::SeqCst) {
                    inner.fire_state_changed();
                }
            })
        };
        inner.subject.add_observer(&subject_observer);

        Ok(Self {
            inner,
            _subject_observer: subject_observer,
        })
    }
}

impl RangeInner {
    fn current_value(&self) -> i32 {
        let min = self.state.read().unwrap().min;
        self.subject.value().unwrap_or(min)
    }

    fn fire_state_changed(&self) {
        for listener in self.change.snapshot() {
            listener();
        }
    }

    /// The single normalization routine. Clamp order: min below max, then
    /// the violated bound is moved to admit the value, then extent so that
    /// `value + extent <= max` (widened to i64 so a huge extent cannot
    /// overflow the sum), then extent at least zero.
    fn set_range_properties(
        &self,
        mut value: i32,
        mut extent: i32,
        mut min: i32,
        mut max: i32,
        adjusting: bool,
    ) {
        if min > max {
            min = max;
        }
        if value > max {
            max = value;
        }
        if value < min {
            min = value;
        }
        if (extent as i64 + value as i64) > max as i64 {
            extent = (max as i64 - value as i64).min(i32::MAX as i64) as i32;
        }
        if extent < 0 {
            extent = 0;
        }

        let changed = {
            let state = self.state.read().unwrap();
            value != self.subject.value().unwrap_or(state.min)
                || extent != state.extent
                || min != state.min
                || max != state.max
                || adjusting != state.adjusting
        };
        if !changed {
            return;
        }

        {
            let mut state = self.state.write().unwrap();
            state.extent = extent;
            state.min = min;
            state.max = max;
            state.adjusting = adjusting;
        }
        self.self_writing.store(true, Ordering::SeqCst);
        self.subject.set_value(Some(value));
        self.self_writing.store(false, Ordering::SeqCst);
        self.fire_state_changed();
    }
}

impl BoundedRangeModel for RangeAdapter {
    fn value(&self) -> i32 {
        self.inner.current_value()
    }

    fn extent(&self) -> i32 {
        self.inner.state.read().unwrap().extent
    }

    fn minimum(&self) -> i32 {
        self.inner.state.read().unwrap().min
    }

    fn maximum(&self) -> i32 {
        self.inner.state.read().unwrap().max
    }

    fn value_is_adjusting(&self) -> bool {
        self.inner.state.read().unwrap().adjusting
    }

    fn set_value(&self, n: i32) {
        let (extent, min, max, adjusting) = {
            let s = self.inner.state.read().unwrap();
            (s.extent, s.min, s.max, s.adjusting)
        };
        let mut new_value = n.max(min);
        if new_value as i64 + extent as i64 > max as i64 {
            new_value = (max as i64 - extent as i64) as i32;
        }
        self.inner
            .set_range_properties(new_value, extent, min, max, adjusting);
    }

    fn set_extent(&self, n: i32) {
        let (min, max, adjusting) = {
            let s = self.inner.state.read().unwrap();
            (s.min, s.max, s.adjusting)
        };
        let value = self.inner.current_value();
        let mut new_extent = n.max(0);
        if value as i64 + new_extent as i64 > max as i64 {
            new_extent = (max as i64 - value as i64).min(i32::MAX as i64) as i32;
        }
        self.inner
            .set_range_properties(value, new_extent, min, max, adjusting);
    }

    fn set_minimum(&self, n: i32) {
        let (extent, max, adjusting) = {
            let s = self.inner.state.read().unwrap();
            (s.extent, s.max, s.adjusting)
        };
        let new_max = n.max(max);
        let new_value = n.max(self.inner.current_value());
        let new_extent = extent.min(((new_max as i64) - (new_value as i64)).min(i32::MAX as i64) as i32);
        self.inner
            .set_range_properties(new_value, new_extent, n, new_max, adjusting);
    }

    fn set_maximum(&self, n: i32) {
        let (extent, min, adjusting) = {
            let s = self.inner.state.read().unwrap();
            (s.extent, s.min, s.adjusting)
        };
        let new_min = n.min(min);
        let new_value = n.min(self.inner.current_value());
        let new_extent = extent.min(((n as i64) - (new_value as i64)).min(i32::MAX as i64) as i32);
        self.inner
            .set_range_properties(new_value, new_extent, new_min, n, adjusting);
    }

    fn set_value_is_adjusting(&self, adjusting: bool) {
        let (extent, min, max) = {
            let s = self.inner.state.read().unwrap();
            (s.extent, s.min, s.max)
        };
        self.inner.set_range_properties(
            self.inner.current_value(),
            extent,
            min,
            max,
            adjusting,
        );
    }

    fn set_range_properties(&self, value: i32, extent: i32, min: i32, max: i32, adjusting: bool) {
        self.inner
            .set_range_properties(value, extent, min, max, adjusting);
    }

    fn add_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.add(listener);
    }

    fn remove_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.remove(listener);
    }
}
