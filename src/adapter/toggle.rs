use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::error::BindingError;
use crate::value::{ChangeListener, ListenerList, ValueModel, ValueObserver};

/// The toggle-state model contract: checkbox, radio button, and menu-toggle
/// widgets install one of these as their backing model.
pub trait ToggleModel: Send + Sync {
    fn is_selected(&self) -> bool;
    fn set_selected(&self, selected: bool);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
    fn add_change_listener(&self, listener: &Arc<ChangeListener>);
    fn remove_change_listener(&self, listener: &Arc<ChangeListener>);
}

enum Representative<T> {
    /// Checkbox semantics: the subject holds one of two values.
    TwoValue { selected: T, deselected: T },
    /// Radio semantics: many adapters share one subject; this adapter is
    /// selected iff the subject holds its choice value.
    Choice(T),
}

/// Presents a subject through the [`ToggleModel`] contract.
///
/// Two construction forms exist. The two-value form maps selected and
/// deselected to two distinct representative values. The choice form is
/// used when several adapters share one subject to emulate a mutually
/// exclusive group without any toolkit-level group object.
///
/// The adapter's visible selected state is always re-derived from the
/// subject after a write, never taken from the caller's intent: the
/// subject may reject or transform the write, and the widget must reflect
/// reality.
pub struct ToggleAdapter<T> {
    inner: Arc<ToggleInner<T>>,
    _subject_observer: Arc<ValueObserver<T>>,
}

struct ToggleInner<T> {
    subject: Arc<dyn ValueModel<T>>,
    representative: Representative<T>,
    selected: AtomicBool,
    enabled: AtomicBool,
    change: ListenerList<ChangeListener>,
}

impl<T> ToggleAdapter<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Two-value form. Fails if the representative values are equal.
    pub fn new(
        subject: Arc<dyn ValueModel<T>>,
        selected_value: T,
        deselected_value: T,
    ) -> Result<Self, BindingError> {
        if selected_value == deselected_value {
            return Err(BindingError::IndistinctToggleValues);
        }
        Ok(Self::build(
            subject,
            Representative::TwoValue {
                selected: selected_value,
                deselected: deselected_value,
            },
        ))
    }

    /// Choice form, for shared-subject groups.
    pub fn choice(subject: Arc<dyn ValueModel<T>>, choice: T) -> Self {
        Self::build(subject, Representative::Choice(choice))
    }

    fn build(subject: Arc<dyn ValueModel<T>>, representative: Representative<T>) -> Self {
        let inner = Arc::new(ToggleInner {
            subject,
            representative,
            selected: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
            change: ListenerList::new(),
        });
        inner
            .selected
            .store(inner.derive_selected(), Ordering::SeqCst);

        let subject_observer: Arc<ValueObserver<T>> = {
            let inner: Weak<ToggleInner<T>> = Arc::downgrade(&inner);
            Arc::new(move |_, _| {
                if let Some(inner) = inner.upgrade() {
                    inner.refresh_selected();
                }
            })
        };
        inner.subject.add_observer(&subject_observer);

        Self {
            inner,
            _subject_observer: subject_observer,
        }
    }

    /// The subject this adapter presents.
    pub fn subject(&self) -> Arc<dyn ValueModel<T>> {
        Arc::clone(&self.inner.subject)
    }
}

impl ToggleAdapter<bool> {
    /// Boolean two-value form: selected iff the subject holds `true`.
    pub fn for_bool(subject: Arc<dyn ValueModel<bool>>) -> Self {
        Self::build(
            subject,
            Representative::TwoValue {
                selected: true,
                deselected: false,
            },
        )
    }
}

impl<T> ToggleInner<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    fn derive_selected(&self) -> bool {
        let value = self.subject.value();
        match &self.representative {
            Representative::TwoValue { selected, .. } => value.as_ref() == Some(selected),
            Representative::Choice(choice) => value.as_ref() == Some(choice),
        }
    }

    /// Recomputes the selected flag from the subject and notifies listeners
    /// when it actually changed.
    fn refresh_selected(&self) {
        let now = self.derive_selected();
        let before = self.selected.swap(now, Ordering::SeqCst);
        if before != now {
            self.fire_change();
        }
    }

    fn fire_change(&self) {
        for listener in self.change.snapshot() {
            listener();
        }
    }
}

impl<T> ToggleModel for ToggleAdapter<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn is_selected(&self) -> bool {
        self.inner.selected.load(Ordering::SeqCst)
    }

    fn set_selected(&self, selected: bool) {
        match &self.inner.representative {
            Representative::TwoValue {
                selected: on,
                deselected: off,
            } => {
                let value = if selected { on.clone() } else { off.clone() };
                self.inner.subject.set_value(Some(value));
            }
            Representative::Choice(choice) => {
                // Deselecting a choice adapter, or re-selecting an already
                // selected one, must not perturb the shared subject.
                if selected && !self.inner.derive_selected() {
                    self.inner.subject.set_value(Some(choice.clone()));
                }
            }
        }
        // Reflect reality, not intent: the subject may have rejected or
        // transformed the write.
        self.inner.refresh_selected();
    }

    fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        let before = self.inner.enabled.swap(enabled, Ordering::SeqCst);
        if before != enabled {
            self.inner.fire_change();
        }
    }

    fn add_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.add(listener);
    }

    fn remove_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.remove(listener);
    }
}
