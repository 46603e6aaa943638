//! Integration tests for Tether

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tether::adapter::{
    BoundedRangeModel, DocumentAdapter, PlainDocument, RangeAdapter, SelectionInList,
    TextDocument, ToggleAdapter, ToggleModel,
};
use tether::value::{ValueObserver, ValueHolder};
use tether::{BufferedValue, Connector, Trigger, ValueModel};

#[test]
fn connector_round_trip_terminates() {
    let left = Arc::new(ValueHolder::new(1));
    let right = Arc::new(ValueHolder::new(2));
    let writes = Arc::new(AtomicUsize::new(0));

    let observer: Arc<ValueObserver<i32>> = {
        let writes = writes.clone();
        Arc::new(move |_, _| {
            writes.fetch_add(1, Ordering::SeqCst);
        })
    };
    left.add_observer(&observer);
    right.add_observer(&observer);

    let connector = Connector::connect(
        left.clone() as Arc<dyn ValueModel<i32>>,
        right.clone() as Arc<dyn ValueModel<i32>>,
        None,
    );
    connector.update_right();
    assert_eq!(right.value(), Some(1));

    // One propagation per side per change, never a ping-pong.
    left.set_value(Some(7));
    assert_eq!(right.value(), Some(7));
    let after_first = writes.load(Ordering::SeqCst);

    right.set_value(Some(9));
    assert_eq!(left.value(), Some(9));
    let after_second = writes.load(Ordering::SeqCst);
    assert_eq!(after_second - after_first, 2);
}

#[test]
fn toggle_range_and_text_share_one_model_layer() {
    // A form backed by three independent subjects.
    let accepted = Arc::new(ValueHolder::new(false));
    let volume = Arc::new(ValueHolder::new(30));
    let name = Arc::new(ValueHolder::new("anon".to_string()));

    let toggle = ToggleAdapter::for_bool(accepted.clone() as Arc<dyn ValueModel<bool>>);
    let range = RangeAdapter::new(volume.clone() as Arc<dyn ValueModel<i32>>, 0, 0, 100)
        .expect("valid range");
    let text = DocumentAdapter::new(
        name.clone() as Arc<dyn ValueModel<String>>,
        Arc::new(PlainDocument::new()),
        true,
    );

    toggle.set_selected(true);
    range.set_value(55);
    text.replace(0, text.len(), "alice").expect("in bounds");

    assert_eq!(accepted.value(), Some(true));
    assert_eq!(volume.value(), Some(55));
    assert_eq!(name.value(), Some("alice".to_string()));

    // Model-side writes surface in every adapter without echoing back.
    accepted.set_value(Some(false));
    volume.set_value(Some(80));
    name.set_value(Some("bob".to_string()));
    assert!(!toggle.is_selected());
    assert_eq!(range.value(), 80);
    assert_eq!(text.text(), "bob");
}

#[test]
fn buffered_form_commits_and_cancels_as_a_unit() {
    let first = Arc::new(ValueHolder::new("Ada".to_string()));
    let last = Arc::new(ValueHolder::new("Lovelace".to_string()));
    let apply = Arc::new(Trigger::new());

    let first_buffer = BufferedValue::new(
        first.clone() as Arc<dyn ValueModel<String>>,
        apply.clone(),
    );
    let last_buffer = BufferedValue::new(
        last.clone() as Arc<dyn ValueModel<String>>,
        apply.clone(),
    );

    first_buffer.set_value(Some("Grace".to_string()));
    last_buffer.set_value(Some("Hopper".to_string()));
    assert_eq!(first.value(), Some("Ada".to_string()));

    apply.trigger_commit();
    assert_eq!(first.value(), Some("Grace".to_string()));
    assert_eq!(last.value(), Some("Hopper".to_string()));

    // A later cancel discards only what is pending.
    first_buffer.set_value(Some("X".to_string()));
    apply.trigger_flush();
    assert_eq!(first.value(), Some("Grace".to_string()));
    assert_eq!(first_buffer.value(), Some("Grace".to_string()));
}

#[test]
fn list_selection_survives_content_edits() {
    let list = SelectionInList::with_items(vec![10, 20, 30, 40]);
    let selected: Arc<Mutex<Vec<Option<i32>>>> = Arc::new(Mutex::new(Vec::new()));

    let observer: Arc<ValueObserver<i32>> = {
        let selected = selected.clone();
        Arc::new(move |_, new| {
            selected.lock().unwrap().push(new.copied());
        })
    };
    list.selection_index_holder().add_observer(&observer);

    list.set_selection_index(Some(2));
    list.insert(0, 5);
    assert_eq!(list.selection(), Some(30));

    list.remove(0);
    assert_eq!(list.selection(), Some(30));

    list.remove(2);
    assert_eq!(list.selection(), None);

    assert_eq!(
        *selected.lock().unwrap(),
        vec![Some(2), Some(3), Some(2), None]
    );
}

#[test]
fn dropped_adapters_leave_no_observers_behind() {
    let subject = Arc::new(ValueHolder::new(0));
    {
        let _toggle = ToggleAdapter::choice(subject.clone() as Arc<dyn ValueModel<i32>>, 1);
        let _range = RangeAdapter::new(subject.clone() as Arc<dyn ValueModel<i32>>, 0, 0, 10)
            .expect("valid range");
        assert_eq!(subject.observer_count(), 2);
    }
    assert_eq!(subject.observer_count(), 0);

    // The subject still works after its observers are gone.
    subject.set_value(Some(5));
    assert_eq!(subject.value(), Some(5));
}
