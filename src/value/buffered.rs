use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use crate::value::model::{ValueModel, ValueObserver};
use crate::value::registry::ObserverRegistry;
use crate::value::trigger::Trigger;

enum Shadow<T> {
    /// No pending edit; reads pass through to the subject.
    Clean,
    /// A UI-side edit is pending; reads return it until commit or flush.
    Dirty(Option<T>),
}

/// Wraps a subject so that writes are held in a local shadow value and
/// only pushed to the real subject when the associated [`Trigger`] fires.
///
/// Reading before any edit returns the subject's value; after edits it
/// returns the shadow. The subject is only ever mutated on a commit.
/// A flush discards the shadow instead.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tether::value::{BufferedValue, Trigger, ValueHolder, ValueModel};
///
/// let subject = Arc::new(ValueHolder::new("saved".to_string()));
/// let trigger = Arc::new(Trigger::new());
/// let buffered = BufferedValue::new(subject.clone(), trigger.clone());
///
/// buffered.set_value(Some("edited".to_string()));
/// assert_eq!(subject.value(), Some("saved".to_string()));
///
/// trigger.trigger_commit();
/// assert_eq!(subject.value(), Some("edited".to_string()));
/// ```
pub struct BufferedValue<T> {
    inner: Arc<BufferedInner<T>>,
    _trigger_observer: Arc<ValueObserver<bool>>,
    _subject_observer: Arc<ValueObserver<T>>,
}

struct BufferedInner<T> {
    subject: Arc<dyn ValueModel<T>>,
    trigger: Arc<Trigger>,
    shadow: RwLock<Shadow<T>>,
    committing: AtomicBool,
    observers: ObserverRegistry<T>,
}

impl<T> BufferedValue<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(subject: Arc<dyn ValueModel<T>>, trigger: Arc<Trigger>) -> Self {
        let inner = Arc::new(BufferedInner {
            subject,
            trigger,
            shadow: RwLock::new(Shadow::Clean),
            committing: AtomicBool::new(false),
            observers: ObserverRegistry::new(),
        });

        let trigger_observer: Arc<ValueObserver<bool>> = {
            let inner: Weak<BufferedInner<T>> = Arc::downgrade(&inner);
            Arc::new(move |_, new| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                match new.copied() {
                    Some(true) => BufferedInner::commit(&inner),
                    Some(false) => BufferedInner::flush(&inner),
                    None => {}
                }
            })
        };
        inner.trigger.add_observer(&trigger_observer);

        let subject_observer: Arc<ValueObserver<T>> = {
            let inner: Weak<BufferedInner<T>> = Arc::downgrade(&inner);
            Arc::new(move |old, new| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                BufferedInner::subject_changed(&inner, old, new);
            })
        };
        inner.subject.add_observer(&subject_observer);

        Self {
            inner,
            _trigger_observer: trigger_observer,
            _subject_observer: subject_observer,
        }
    }

    /// True while a UI-side edit is pending.
    pub fn is_buffering(&self) -> bool {
        matches!(*self.inner.shadow.read().unwrap(), Shadow::Dirty(_))
    }

    /// The wrapped real subject.
    pub fn subject(&self) -> Arc<dyn ValueModel<T>> {
        Arc::clone(&self.inner.subject)
    }

    /// The trigger gating this value's commits.
    pub fn trigger(&self) -> Arc<Trigger> {
        Arc::clone(&self.inner.trigger)
    }
}

impl<T> BufferedInner<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    fn visible(&self) -> Option<T> {
        match &*self.shadow.read().unwrap() {
            Shadow::Dirty(v) => v.clone(),
            Shadow::Clean => self.subject.value(),
        }
    }

    fn commit(inner: &Arc<Self>) {
        let pending = {
            let mut shadow = inner.shadow.write().unwrap();
            match std::mem::replace(&mut *shadow, Shadow::Clean) {
                Shadow::Dirty(v) => Some(v),
                Shadow::Clean => None,
            }
        };
        let Some(value) = pending else {
            return;
        };
        debug!("committing buffered value");
        // The committing flag keeps the raw subject-change echo from being
        // re-forwarded while the shadow is pushed down.
        inner.committing.store(true, Ordering::SeqCst);
        inner.subject.set_value(value.clone());
        inner.committing.store(false, Ordering::SeqCst);
        // The subject may reject or transform the committed value; when the
        // visible value moved away from the shadow, observers must hear it.
        let now_visible = inner.subject.value();
        if value != now_visible {
            inner.observers.notify(value.as_ref(), now_visible.as_ref());
        }
    }

    fn flush(inner: &Arc<Self>) {
        let discarded = {
            let mut shadow = inner.shadow.write().unwrap();
            match std::mem::replace(&mut *shadow, Shadow::Clean) {
                Shadow::Dirty(v) => Some(v),
                Shadow::Clean => None,
            }
        };
        let Some(old_visible) = discarded else {
            return;
        };
        debug!("flushing buffered value");
        let new_visible = inner.subject.value();
        if old_visible != new_visible {
            inner
                .observers
                .notify(old_visible.as_ref(), new_visible.as_ref());
        }
    }

    fn subject_changed(inner: &Arc<Self>, old: Option<&T>, new: Option<&T>) {
        if inner.committing.load(Ordering::SeqCst) {
            return;
        }
        // While buffering, the shadow masks the subject; nothing visible
        // changed. Otherwise the subject change passes straight through.
        if matches!(*inner.shadow.read().unwrap(), Shadow::Dirty(_)) {
            return;
        }
        inner.observers.notify(old, new);
    }
}

impl<T> ValueModel<T> for BufferedValue<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn value(&self) -> Option<T> {
        self.inner.visible()
    }

    fn set_value(&self, new_value: Option<T>) {
        let old_visible = self.inner.visible();
        *self.inner.shadow.write().unwrap() = Shadow::Dirty(new_value.clone());
        if old_visible != new_value {
            self.inner
                .observers
                .notify(old_visible.as_ref(), new_value.as_ref());
        }
    }

    fn add_observer(&self, observer: &Arc<ValueObserver<T>>) {
        self.inner.observers.add(observer);
    }

    fn add_observer_strongly(&self, observer: Arc<ValueObserver<T>>) {
        self.inner.observers.add_strongly(observer);
    }

    fn remove_observer(&self, observer: &Arc<ValueObserver<T>>) {
        self.inner.observers.remove(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::holder::ValueHolder;

    fn setup() -> (Arc<ValueHolder<i32>>, Arc<Trigger>, BufferedValue<i32>) {
        let subject = Arc::new(ValueHolder::new(1));
        let trigger = Arc::new(Trigger::new());
        let buffered = BufferedValue::new(
            subject.clone() as Arc<dyn ValueModel<i32>>,
            trigger.clone(),
        );
        (subject, trigger, buffered)
    }

    #[test]
    fn edits_are_invisible_until_commit() {
        let (subject, trigger, buffered) = setup();

        buffered.set_value(Some(2));
        assert!(buffered.is_buffering());
        assert_eq!(buffered.value(), Some(2));
        assert_eq!(subject.value(), Some(1));

        trigger.trigger_commit();
        assert!(!buffered.is_buffering());
        assert_eq!(subject.value(), Some(2));
        assert_eq!(buffered.value(), Some(2));
    }

    #[test]
    fn commit_pushes_last_shadow_value() {
        let (subject, trigger, buffered) = setup();
        buffered.set_value(Some(10));
        buffered.set_value(Some(20));
        trigger.trigger_commit();
        assert_eq!(subject.value(), Some(20));
    }

    #[test]
    fn flush_discards_the_shadow() {
        let (subject, trigger, buffered) = setup();
        buffered.set_value(Some(99));
        trigger.trigger_flush();
        assert!(!buffered.is_buffering());
        assert_eq!(subject.value(), Some(1));
        assert_eq!(buffered.value(), Some(1));
    }

    #[test]
    fn commit_without_edit_is_a_no_op() {
        let (subject, trigger, _buffered) = setup();
        trigger.trigger_commit();
        assert_eq!(subject.value(), Some(1));
    }

    #[test]
    fn subject_change_masked_while_buffering() {
        let (subject, trigger, buffered) = setup();
        buffered.set_value(Some(5));
        subject.set_value(Some(42));
        assert_eq!(buffered.value(), Some(5));
        trigger.trigger_commit();
        assert_eq!(subject.value(), Some(5));
        let _ = trigger;
    }

    #[test]
    fn commit_notifies_when_subject_transforms_the_value() {
        // A subject that upper-cases whatever it receives.
        struct UpperCasing {
            value: RwLock<Option<String>>,
            observers: ObserverRegistry<String>,
        }
        impl ValueModel<String> for UpperCasing {
            fn value(&self) -> Option<String> {
                self.value.read().unwrap().clone()
            }
            fn set_value(&self, new_value: Option<String>) {
                let new_value = new_value.map(|s| s.to_uppercase());
                let old = {
                    let mut value = self.value.write().unwrap();
                    if *value == new_value {
                        return;
                    }
                    std::mem::replace(&mut *value, new_value.clone())
                };
                self.observers.notify(old.as_ref(), new_value.as_ref());
            }
            fn add_observer(&self, observer: &Arc<ValueObserver<String>>) {
                self.observers.add(observer);
            }
            fn add_observer_strongly(&self, observer: Arc<ValueObserver<String>>) {
                self.observers.add_strongly(observer);
            }
            fn remove_observer(&self, observer: &Arc<ValueObserver<String>>) {
                self.observers.remove(observer);
            }
        }

        let subject = Arc::new(UpperCasing {
            value: RwLock::new(Some("SAVED".to_string())),
            observers: ObserverRegistry::new(),
        });
        let trigger = Arc::new(Trigger::new());
        let buffered = BufferedValue::new(
            subject.clone() as Arc<dyn ValueModel<String>>,
            trigger.clone(),
        );

        let seen: Arc<std::sync::Mutex<Vec<(Option<String>, Option<String>)>>> =
            Arc::new(std::sync::Mutex::new(Vec::new()));
        let observer: Arc<ValueObserver<String>> = {
            let seen = seen.clone();
            Arc::new(move |old, new| {
                seen.lock().unwrap().push((old.cloned(), new.cloned()));
            })
        };
        buffered.add_observer(&observer);

        buffered.set_value(Some("edited".to_string()));
        trigger.trigger_commit();

        // The subject turned "edited" into "EDITED"; the visible value
        // moved on commit, so observers saw both transitions.
        assert_eq!(subject.value(), Some("EDITED".to_string()));
        assert_eq!(buffered.value(), Some("EDITED".to_string()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[1],
            (
                Some("edited".to_string()),
                Some("EDITED".to_string())
            )
        );
    }

    #[test]
    fn shared_trigger_commits_all_buffered_values() {
        let subject_a = Arc::new(ValueHolder::new(0));
        let subject_b = Arc::new(ValueHolder::new(0));
        let trigger = Arc::new(Trigger::new());
        let a = BufferedValue::new(
            subject_a.clone() as Arc<dyn ValueModel<i32>>,
            trigger.clone(),
        );
        let b = BufferedValue::new(
            subject_b.clone() as Arc<dyn ValueModel<i32>>,
            trigger.clone(),
        );

        a.set_value(Some(1));
        b.set_value(Some(2));
        trigger.trigger_commit();
        assert_eq!(subject_a.value(), Some(1));
        assert_eq!(subject_b.value(), Some(2));
    }

    #[test]
    fn dropped_buffered_value_is_swept_from_trigger() {
        let (_subject, trigger, buffered) = setup();
        assert_eq!(trigger.observer_count(), 1);
        drop(buffered);
        assert_eq!(trigger.observer_count(), 0);
    }
}
