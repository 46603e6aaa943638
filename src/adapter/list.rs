use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::value::{ListenerList, ValueHolder, ValueModel};

/// Notification payload for list-content listeners. Indices are inclusive
/// and refer to positions after the mutation for insertions and changes,
/// and before the mutation for removals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListDataEvent {
    Inserted { index0: usize, index1: usize },
    Removed { index0: usize, index1: usize },
    Changed { index0: usize, index1: usize },
}

pub type ListDataListener = dyn Fn(&ListDataEvent) + Send + Sync;

/// Read side of a list content model, as consumed by list widgets.
pub trait ListModel<T>: Send + Sync {
    fn size(&self) -> usize;
    fn element_at(&self, index: usize) -> Option<T>;
    fn add_list_data_listener(&self, listener: &Arc<ListDataListener>);
    fn remove_list_data_listener(&self, listener: &Arc<ListDataListener>);
}

/// A list of items paired with a single-selection index that survives
/// content edits.
///
/// The selection index lives in an embedded [`ValueHolder`]; an absent
/// value means no selection. Content mutations keep the index pointing at
/// the same item: inserting at or above the selection shifts it, removing
/// above shifts it back, removing the selected item clears it. The holder
/// is exposed through [`selection_index_holder`](Self::selection_index_holder)
/// so a selection adapter can observe the very same subject.
pub struct SelectionInList<T> {
    inner: Arc<ListInner<T>>,
}

struct ListInner<T> {
    items: RwLock<Vec<T>>,
    selection_index: Arc<ValueHolder<i32>>,
    listeners: ListenerList<ListDataListener>,
}

impl<T> SelectionInList<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                items: RwLock::new(items),
                selection_index: Arc::new(ValueHolder::empty()),
                listeners: ListenerList::new(),
            }),
        }
    }

    /// The shared index subject, `None` meaning no selection. Hand this to
    /// a selection adapter to bind a widget's selection to this list.
    pub fn selection_index_holder(&self) -> Arc<dyn ValueModel<i32>> {
        Arc::clone(&self.inner.selection_index) as Arc<dyn ValueModel<i32>>
    }

    pub fn selection_index(&self) -> Option<usize> {
        self.inner
            .selection_index
            .value()
            .and_then(|i| usize::try_from(i).ok())
    }

    /// The selected item, if any. An index pointing past the end (only
    /// possible if the holder was written externally) reads as no
    /// selection.
    pub fn selection(&self) -> Option<T> {
        let index = self.selection_index()?;
        self.inner.items.read().unwrap().get(index).cloned()
    }

    pub fn has_selection(&self) -> bool {
        self.selection_index().is_some()
    }

    /// Selects the item at `index`, or clears the selection for `None`.
    /// Out-of-range indices clear the selection.
    pub fn set_selection_index(&self, index: Option<usize>) {
        let len = self.inner.items.read().unwrap().len();
        let stored = match index {
            Some(i) if i < len => Some(i as i32),
            _ => None,
        };
        self.inner.selection_index.set_value(stored);
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.items.read().unwrap().clone()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.read().unwrap().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().unwrap().is_empty()
    }

    /// Appends an item. Appending never disturbs the selection.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.write().unwrap();
            items.push(item);
            items.len() - 1
        };
        self.inner.fire(ListDataEvent::Inserted {
            index0: index,
            index1: index,
        });
    }

    /// Inserts an item; indices at or above the insertion point shift up,
    /// and so does a selection sitting there.
    pub fn insert(&self, index: usize, item: T) {
        let index = {
            let mut items = self.inner.items.write().unwrap();
            let index = index.min(items.len());
            items.insert(index, item);
            index
        };
        if let Some(selection) = self.selection_index() {
            if selection >= index {
                self.inner
                    .selection_index
                    .set_value(Some((selection + 1) as i32));
            }
        }
        self.inner.fire(ListDataEvent::Inserted {
            index0: index,
            index1: index,
        });
    }

    /// Removes and returns the item at `index`. Removing the selected item
    /// clears the selection; removing below it shifts it down.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.inner.items.write().unwrap();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        if let Some(selection) = self.selection_index() {
            if selection == index {
                debug!(index, "selected item removed, clearing selection");
                self.inner.selection_index.set_value(None);
            } else if selection > index {
                self.inner
                    .selection_index
                    .set_value(Some((selection - 1) as i32));
            }
        }
        self.inner.fire(ListDataEvent::Removed {
            index0: index,
            index1: index,
        });
        Some(removed)
    }

    /// Replaces the item at `index` in place. The selection is untouched.
    pub fn set(&self, index: usize, item: T) -> bool {
        {
            let mut items = self.inner.items.write().unwrap();
            let Some(slot) = items.get_mut(index) else {
                return false;
            };
            *slot = item;
        }
        self.inner.fire(ListDataEvent::Changed {
            index0: index,
            index1: index,
        });
        true
    }

    /// Replaces the whole content. The selection index is kept when it is
    /// still in range for the new content, otherwise cleared.
    pub fn set_items(&self, new_items: Vec<T>) {
        let (old_len, new_len) = {
            let mut items = self.inner.items.write().unwrap();
            let old_len = items.len();
            *items = new_items;
            (old_len, items.len())
        };
        if let Some(selection) = self.selection_index() {
            if selection >= new_len {
                self.inner.selection_index.set_value(None);
            }
        }
        if old_len > 0 {
            self.inner.fire(ListDataEvent::Removed {
                index0: 0,
                index1: old_len - 1,
            });
        }
        if new_len > 0 {
            self.inner.fire(ListDataEvent::Inserted {
                index0: 0,
                index1: new_len - 1,
            });
        }
    }

    pub fn clear(&self) {
        self.set_items(Vec::new());
    }
}

impl<T> ListInner<T> {
    fn fire(&self, event: ListDataEvent) {
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

impl<T> ListModel<T> for SelectionInList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn size(&self) -> usize {
        self.len()
    }

    fn element_at(&self, index: usize) -> Option<T> {
        self.get(index)
    }

    fn add_list_data_listener(&self, listener: &Arc<ListDataListener>) {
        self.inner.listeners.add(listener);
    }

    fn remove_list_data_listener(&self, listener: &Arc<ListDataListener>) {
        self.inner.listeners.remove(listener);
    }
}

impl<T> Clone for SelectionInList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SelectionInList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn list() -> SelectionInList<String> {
        SelectionInList::with_items(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string(),
        ])
    }

    #[test]
    fn selection_reads_through_to_items() {
        let list = list();
        assert!(!list.has_selection());

        list.set_selection_index(Some(1));
        assert_eq!(list.selection(), Some("beta".to_string()));

        list.set_selection_index(None);
        assert_eq!(list.selection(), None);
    }

    #[test]
    fn out_of_range_selection_clears() {
        let list = list();
        list.set_selection_index(Some(9));
        assert!(!list.has_selection());
    }

    #[test]
    fn insertion_above_selection_shifts_it() {
        let list = list();
        list.set_selection_index(Some(1));
        list.insert(0, "pre".to_string());
        assert_eq!(list.selection_index(), Some(2));
        assert_eq!(list.selection(), Some("beta".to_string()));
    }

    #[test]
    fn insertion_below_selection_leaves_it() {
        let list = list();
        list.set_selection_index(Some(1));
        list.insert(2, "post".to_string());
        assert_eq!(list.selection_index(), Some(1));
        assert_eq!(list.selection(), Some("beta".to_string()));
    }

    #[test]
    fn removing_selected_item_clears_selection() {
        let list = list();
        list.set_selection_index(Some(1));
        assert_eq!(list.remove(1), Some("beta".to_string()));
        assert!(!list.has_selection());
    }

    #[test]
    fn removing_below_selection_shifts_it_down() {
        let list = list();
        list.set_selection_index(Some(2));
        list.remove(0);
        assert_eq!(list.selection_index(), Some(1));
        assert_eq!(list.selection(), Some("gamma".to_string()));
    }

    #[test]
    fn set_items_clears_out_of_range_selection() {
        let list = list();
        list.set_selection_index(Some(2));
        list.set_items(vec!["only".to_string()]);
        assert!(!list.has_selection());

        list.set_selection_index(Some(0));
        list.set_items(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.selection_index(), Some(0));
    }

    #[test]
    fn content_listeners_see_mutations() {
        let list = list();
        let events: Arc<Mutex<Vec<ListDataEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let listener: Arc<ListDataListener> = {
            let events = events.clone();
            Arc::new(move |e: &ListDataEvent| {
                events.lock().unwrap().push(*e);
            })
        };
        list.add_list_data_listener(&listener);

        list.push("delta".to_string());
        list.remove(0);
        list.set(0, "BETA".to_string());

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ListDataEvent::Inserted { index0: 3, index1: 3 },
                ListDataEvent::Removed { index0: 0, index1: 0 },
                ListDataEvent::Changed { index0: 0, index1: 0 },
            ]
        );
    }

    #[test]
    fn shared_index_holder_is_observable() {
        let list = list();
        let holder = list.selection_index_holder();

        list.set_selection_index(Some(2));
        assert_eq!(holder.value(), Some(2));

        // Writes through the shared holder are visible to the list as well.
        holder.set_value(Some(0));
        assert_eq!(list.selection(), Some("alpha".to_string()));
    }
}
