use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::value::model::{ValueModel, ValueObserver};
use crate::value::registry::ObserverRegistry;

/// A restricted subject whose value is `true`, `false`, or absent, used to
/// gate deferred commits.
///
/// Many [`BufferedValue`](crate::value::BufferedValue)s may share one
/// trigger, e.g. all text fields that commit on permanent focus loss.
/// [`trigger_commit`](Trigger::trigger_commit) must notify its observers on
/// every discrete commit event, not only on value transitions, so it
/// transiently clears the value to absent when it is already at the commit
/// value. This is the one deliberate exception to the no-redundant-
/// notification rule.
pub struct Trigger {
    value: RwLock<Option<bool>>,
    observers: ObserverRegistry<bool>,
}

impl Trigger {
    /// Creates a trigger in the neutral (absent) state.
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            observers: ObserverRegistry::new(),
        }
    }

    /// Fires a commit event: every observer sees a change to `true`, even
    /// if the previous value was already `true`.
    pub fn trigger_commit(&self) {
        debug!("trigger commit");
        if self.value() == Some(true) {
            self.set_value(None);
        }
        self.set_value(Some(true));
    }

    /// Fires a flush event: every observer sees a change to `false`.
    /// Buffered values discard their pending edits in response.
    pub fn trigger_flush(&self) {
        debug!("trigger flush");
        if self.value() == Some(false) {
            self.set_value(None);
        }
        self.set_value(Some(false));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.observer_count()
    }
}

impl ValueModel<bool> for Trigger {
    fn value(&self) -> Option<bool> {
        *self.value.read().unwrap()
    }

    fn set_value(&self, new_value: Option<bool>) {
        let old = {
            let mut value = self.value.write().unwrap();
            if *value == new_value {
                return;
            }
            std::mem::replace(&mut *value, new_value)
        };
        self.observers.notify(old.as_ref(), new_value.as_ref());
    }

    fn add_observer(&self, observer: &Arc<ValueObserver<bool>>) {
        self.observers.add(observer);
    }

    fn add_observer_strongly(&self, observer: Arc<ValueObserver<bool>>) {
        self.observers.add_strongly(observer);
    }

    fn remove_observer(&self, observer: &Arc<ValueObserver<bool>>) {
        self.observers.remove(observer);
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn repeated_commits_each_notify() {
        let trigger = Trigger::new();
        let commits = Arc::new(AtomicUsize::new(0));

        let observer: Arc<ValueObserver<bool>> = {
            let commits = commits.clone();
            Arc::new(move |_, new| {
                if new == Some(&true) {
                    commits.fetch_add(1, Ordering::SeqCst);
                }
            })
        };
        trigger.add_observer(&observer);

        trigger.trigger_commit();
        trigger.trigger_commit();
        trigger.trigger_commit();
        assert_eq!(commits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn commit_and_flush_are_distinct() {
        let trigger = Trigger::new();
        trigger.trigger_commit();
        assert_eq!(trigger.value(), Some(true));
        trigger.trigger_flush();
        assert_eq!(trigger.value(), Some(false));
    }
}
