use std::sync::{Arc, RwLock, Weak};

use crate::error::BindingError;
use crate::value::{ListenerList, ValueModel, ValueObserver};

const MIN: i32 = -1;
const MAX: i32 = i32::MAX;

/// Selection modes of the foreign list-selection contract. Only
/// [`SelectionMode::Single`] is supported by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    SingleInterval,
    MultipleInterval,
}

/// Notification payload for selection listeners: the interval of indices
/// whose selection state may have changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionEvent {
    pub first_index: i32,
    pub last_index: i32,
    pub value_is_adjusting: bool,
}

pub type SelectionListener = dyn Fn(&SelectionEvent) + Send + Sync;

/// The list-selection state model contract consumed by list and table
/// widgets.
pub trait ListSelectionModel: Send + Sync {
    fn set_selection_interval(&self, index0: i32, index1: i32);
    fn add_selection_interval(&self, index0: i32, index1: i32);
    fn remove_selection_interval(&self, index0: i32, index1: i32);
    fn min_selection_index(&self) -> i32;
    fn max_selection_index(&self) -> i32;
    fn is_selected_index(&self, index: i32) -> bool;
    fn anchor_selection_index(&self) -> i32;
    fn set_anchor_selection_index(&self, index: i32);
    fn lead_selection_index(&self) -> i32;
    fn set_lead_selection_index(&self, index: i32);
    fn clear_selection(&self);
    fn is_selection_empty(&self) -> bool;
    fn insert_index_interval(&self, index: i32, length: i32, before: bool);
    fn remove_index_interval(&self, index0: i32, index1: i32) -> Result<(), BindingError>;
    fn set_value_is_adjusting(&self, adjusting: bool);
    fn value_is_adjusting(&self) -> bool;
    fn selection_mode(&self) -> SelectionMode;
    fn set_selection_mode(&self, mode: SelectionMode) -> Result<(), BindingError>;
    fn add_selection_listener(&self, listener: &Arc<SelectionListener>);
    fn remove_selection_listener(&self, listener: &Arc<SelectionListener>);
}

struct DirtyState {
    first_adjusted: i32,
    last_adjusted: i32,
    first_changed: i32,
    last_changed: i32,
    adjusting: bool,
}

/// Presents an integer-valued subject (the selected row index, `-1` for no
/// selection) through the [`ListSelectionModel`] contract, with strict
/// single-selection semantics.
///
/// While `value_is_adjusting` is true, dirty-index bookkeeping accumulates
/// a changed interval and defers firing until adjusting returns to false,
/// so a drag selection produces one event, not N.
pub struct SingleSelectionAdapter {
    inner: Arc<SelectionInner>,
    _subject_observer: Arc<ValueObserver<i32>>,
}

struct SelectionInner {
    index_holder: Arc<dyn ValueModel<i32>>,
    dirty: RwLock<DirtyState>,
    listeners: ListenerList<SelectionListener>,
}

impl SingleSelectionAdapter {
    pub fn new(index_holder: Arc<dyn ValueModel<i32>>) -> Self {
        let inner = Arc::new(SelectionInner {
            index_holder,
            dirty: RwLock::new(DirtyState {
                first_adjusted: MAX,
                last_adjusted: MIN,
                first_changed: MAX,
                last_changed: MIN,
                adjusting: false,
            }),
            listeners: ListenerList::new(),
        });

        let subject_observer: Arc<ValueObserver<i32>> = {
            let inner: Weak<SelectionInner> = Arc::downgrade(&inner);
            Arc::new(move |old, new| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                let old_index = old.copied().unwrap_or(MIN);
                let new_index = new.copied().unwrap_or(MIN);
                inner.mark_as_dirty(old_index);
                inner.mark_as_dirty(new_index);
                inner.fire_value_changed();
            })
        };
        inner.index_holder.add_observer(&subject_observer);

        Self {
            inner,
            _subject_observer: subject_observer,
        }
    }
}

impl SelectionInner {
    fn selection_index(&self) -> i32 {
        self.index_holder.value().unwrap_or(MIN)
    }

    fn set_selection_index(&self, new_index: i32) {
        let old_index = self.selection_index();
        if old_index == new_index {
            return;
        }
        self.mark_as_dirty(old_index);
        self.mark_as_dirty(new_index);
        let stored = if new_index == MIN { None } else { Some(new_index) };
        self.index_holder.set_value(stored);
        // The holder's change notification has already fired (and reset)
        // the dirty interval; this call is a no-op in that case.
        self.fire_value_changed();
    }

    fn mark_as_dirty(&self, index: i32) {
        if index < 0 {
            return;
        }
        let mut dirty = self.dirty.write().unwrap();
        dirty.first_adjusted = dirty.first_adjusted.min(index);
        dirty.last_adjusted = dirty.last_adjusted.max(index);
    }

    /// Fires for the adjusted interval, or accumulates it into the changed
    /// interval while a drag is in progress.
    fn fire_value_changed(&self) {
        let (first, last, adjusting) = {
            let mut dirty = self.dirty.write().unwrap();
            if dirty.last_adjusted == MIN {
                return;
            }
            if dirty.adjusting {
                dirty.first_changed = dirty.first_changed.min(dirty.first_adjusted);
                dirty.last_changed = dirty.last_changed.max(dirty.last_adjusted);
            }
            let interval = (dirty.first_adjusted, dirty.last_adjusted, dirty.adjusting);
            dirty.first_adjusted = MAX;
            dirty.last_adjusted = MIN;
            interval
        };
        if adjusting {
            // Deferred: one event fires when adjusting flips back to false.
            return;
        }
        self.emit(first, last, false);
    }

    /// Fires the accumulated changed interval, if any.
    fn fire_changed_interval(&self, adjusting: bool) {
        let (first, last) = {
            let mut dirty = self.dirty.write().unwrap();
            if dirty.last_changed == MIN {
                return;
            }
            let interval = (dirty.first_changed, dirty.last_changed);
            dirty.first_changed = MAX;
            dirty.last_changed = MIN;
            interval
        };
        self.emit(first, last, adjusting);
    }

    fn emit(&self, first_index: i32, last_index: i32, value_is_adjusting: bool) {
        let event = SelectionEvent {
            first_index,
            last_index,
            value_is_adjusting,
        };
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

impl ListSelectionModel for SingleSelectionAdapter {
    fn set_selection_interval(&self, index0: i32, index1: i32) {
        if index0 == MIN || index1 == MIN {
            return;
        }
        // Single selection: the second index is the lead.
        self.inner.set_selection_index(index1);
    }

    fn add_selection_interval(&self, index0: i32, index1: i32) {
        self.set_selection_interval(index0, index1);
    }

    fn remove_selection_interval(&self, index0: i32, index1: i32) {
        if index0 == MIN || index1 == MIN {
            return;
        }
        let lower = index0.min(index1);
        let upper = index0.max(index1);
        let selection = self.inner.selection_index();
        if lower <= selection && selection <= upper {
            self.clear_selection();
        }
    }

    fn min_selection_index(&self) -> i32 {
        self.inner.selection_index()
    }

    fn max_selection_index(&self) -> i32 {
        self.inner.selection_index()
    }

    fn is_selected_index(&self, index: i32) -> bool {
        index >= 0 && index == self.inner.selection_index()
    }

    fn anchor_selection_index(&self) -> i32 {
        self.inner.selection_index()
    }

    fn set_anchor_selection_index(&self, index: i32) {
        self.inner.set_selection_index(index);
    }

    fn lead_selection_index(&self) -> i32 {
        self.inner.selection_index()
    }

    fn set_lead_selection_index(&self, index: i32) {
        self.inner.set_selection_index(index);
    }

    fn clear_selection(&self) {
        self.inner.set_selection_index(MIN);
    }

    fn is_selection_empty(&self) -> bool {
        self.inner.selection_index() == MIN
    }

    fn insert_index_interval(&self, index: i32, length: i32, before: bool) {
        if self.is_selection_empty() {
            return;
        }
        let insertion_min = if before { index } else { index + 1 };
        let selection = self.inner.selection_index();
        if selection >= insertion_min {
            self.inner.set_selection_index(selection + length);
        }
    }

    fn remove_index_interval(&self, index0: i32, index1: i32) -> Result<(), BindingError> {
        if index0 < MIN || index1 < MIN {
            return Err(BindingError::InvalidIndexInterval);
        }
        if self.is_selection_empty() {
            return Ok(());
        }
        let lower = index0.min(index1);
        let upper = index0.max(index1);
        let selection = self.inner.selection_index();
        if lower <= selection && selection <= upper {
            self.clear_selection();
        } else if upper < selection {
            let translated = selection - (upper - lower + 1);
            self.set_selection_interval(translated, translated);
        }
        Ok(())
    }

    fn set_value_is_adjusting(&self, adjusting: bool) {
        {
            let mut dirty = self.inner.dirty.write().unwrap();
            if dirty.adjusting == adjusting {
                return;
            }
            dirty.adjusting = adjusting;
        }
        self.inner.fire_changed_interval(adjusting);
    }

    fn value_is_adjusting(&self) -> bool {
        self.inner.dirty.read().unwrap().adjusting
    }

    fn selection_mode(&self) -> SelectionMode {
        SelectionMode::Single
    }

    fn set_selection_mode(&self, mode: SelectionMode) -> Result<(), BindingError> {
        if mode != SelectionMode::Single {
            return Err(BindingError::UnsupportedSelectionMode);
        }
        Ok(())
    }

    fn add_selection_listener(&self, listener: &Arc<SelectionListener>) {
        self.inner.listeners.add(listener);
    }

    fn remove_selection_listener(&self, listener: &Arc<SelectionListener>) {
        self.inner.listeners.remove(listener);
    }
}
