//! One-call wiring of widgets to subjects.
//!
//! The functions in this module construct the right adapter for a widget
//! family, install it, and hand back a [`Binding`] that keeps the adapter
//! alive. Dropping the binding (together with the widget's own reference)
//! ends the observation; the weak observer registry sweeps the rest.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::adapter::{
    BoundedRangeModel, ColorSelectionAdapter, ColorSelectionModel, DocumentAdapter,
    ListModel, ListSelectionModel, PlainDocument, RangeAdapter, Rgb, SelectionInList,
    SingleSelectionAdapter, TextDocument, ToggleAdapter, ToggleModel,
};
use crate::error::BindingError;
use crate::value::{BufferedValue, Trigger, ValueModel};

/// Focus-change callback: the argument is true for a temporary focus loss
/// (e.g. to a popup owned by the same window), which must not commit.
pub type FocusLostHandler = dyn Fn(bool) + Send + Sync;

/// A widget that displays and edits a toggle state.
pub trait ToggleWidget {
    fn model(&self) -> Option<Arc<dyn ToggleModel>>;
    fn set_model(&self, model: Arc<dyn ToggleModel>);
}

/// A widget over a bounded integer range (slider, scroll bar, progress bar).
pub trait RangeWidget {
    fn set_model(&self, model: Arc<dyn BoundedRangeModel>);
}

/// A widget that edits text through a document model.
pub trait TextWidget {
    fn set_document(&self, document: Arc<dyn TextDocument>);
    fn add_focus_lost_handler(&self, handler: Arc<FocusLostHandler>);
}

/// A widget that displays list content with a selection.
pub trait ListWidget<T> {
    fn set_model(&self, model: Arc<dyn ListModel<T>>);
    fn set_selection_model(&self, model: Arc<dyn ListSelectionModel>);
}

/// A widget that picks a color.
pub trait ColorWidget {
    fn set_model(&self, model: Arc<dyn ColorSelectionModel>);
}

/// When a bound text widget pushes its edits to the subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextCommit {
    /// Every insert and remove writes the subject immediately.
    OnEveryEdit,
    /// Edits buffer locally and commit on permanent focus loss.
    OnFocusLost,
}

/// The process-wide trigger shared by all text widgets bound with
/// [`TextCommit::OnFocusLost`]. A single commit gesture flushes every
/// pending field at once.
pub fn focus_lost_trigger() -> Arc<Trigger> {
    static TRIGGER: OnceLock<Arc<Trigger>> = OnceLock::new();
    Arc::clone(TRIGGER.get_or_init(|| Arc::new(Trigger::new())))
}

/// Keeps a binding's adapters and handlers alive. Dropping it releases
/// them; the subjects' weak registries sweep the dead observers on their
/// next dispatch.
pub struct Binding {
    retained: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Binding {
    fn retaining(retained: Vec<Arc<dyn Any + Send + Sync>>) -> Self {
        Self { retained }
    }

    /// Explicit teardown; equivalent to dropping the binding.
    pub fn dispose(self) {
        debug!(adapters = self.retained.len(), "disposing binding");
    }
}

/// Binds a check box to a boolean subject. An enablement set on the
/// widget's previous model carries over to the new adapter, so binding
/// does not silently re-enable a disabled widget.
pub fn bind_check_box(widget: &dyn ToggleWidget, subject: Arc<dyn ValueModel<bool>>) -> Binding {
    let adapter = Arc::new(ToggleAdapter::for_bool(subject));
    if let Some(previous) = widget.model() {
        adapter.set_enabled(previous.is_enabled());
    }
    widget.set_model(adapter.clone());
    Binding::retaining(vec![adapter])
}

/// Binds a radio button to a shared subject with the given choice value.
/// Bind one button per choice over the same subject to form a mutually
/// exclusive group.
pub fn bind_radio_button<T>(
    widget: &dyn ToggleWidget,
    subject: Arc<dyn ValueModel<T>>,
    choice: T,
) -> Binding
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let adapter = Arc::new(ToggleAdapter::choice(subject, choice));
    if let Some(previous) = widget.model() {
        adapter.set_enabled(previous.is_enabled());
    }
    widget.set_model(adapter.clone());
    Binding::retaining(vec![adapter])
}

/// Binds a slider or scroll bar to an integer subject. Fails when the
/// initial configuration violates the range invariant.
pub fn bind_range(
    widget: &dyn RangeWidget,
    subject: Arc<dyn ValueModel<i32>>,
    extent: i32,
    min: i32,
    max: i32,
) -> Result<Binding, BindingError> {
    let adapter = Arc::new(RangeAdapter::new(subject, extent, min, max)?);
    widget.set_model(adapter.clone());
    Ok(Binding::retaining(vec![adapter]))
}

/// Binds a single-line text field to a string subject. Newlines are
/// filtered to spaces. With [`TextCommit::OnFocusLost`] the field edits a
/// buffer that commits through the shared [`focus_lost_trigger`] when the
/// widget reports a permanent focus loss.
pub fn bind_text_field(
    widget: &dyn TextWidget,
    subject: Arc<dyn ValueModel<String>>,
    commit: TextCommit,
) -> Binding {
    bind_text(widget, subject, commit, true)
}

/// Binds a multi-line text area to a string subject. Newlines pass
/// through unfiltered.
pub fn bind_text_area(
    widget: &dyn TextWidget,
    subject: Arc<dyn ValueModel<String>>,
    commit: TextCommit,
) -> Binding {
    bind_text(widget, subject, commit, false)
}

fn bind_text(
    widget: &dyn TextWidget,
    subject: Arc<dyn ValueModel<String>>,
    commit: TextCommit,
    filter_newlines: bool,
) -> Binding {
    let document = Arc::new(PlainDocument::new());
    match commit {
        TextCommit::OnEveryEdit => {
            let adapter = Arc::new(DocumentAdapter::new(subject, document, filter_newlines));
            widget.set_document(adapter.clone());
            Binding::retaining(vec![adapter])
        }
        TextCommit::OnFocusLost => {
            let trigger = focus_lost_trigger();
            let buffered = Arc::new(BufferedValue::new(subject, trigger.clone()));
            let adapter = Arc::new(DocumentAdapter::new(
                buffered.clone() as Arc<dyn ValueModel<String>>,
                document,
                filter_newlines,
            ));
            widget.set_document(adapter.clone());

            let handler: Arc<FocusLostHandler> = Arc::new(move |temporary| {
                if !temporary {
                    trigger.trigger_commit();
                }
            });
            widget.add_focus_lost_handler(handler.clone());
            Binding::retaining(vec![adapter, buffered, Arc::new(handler)])
        }
    }
}

/// Binds a list widget to a [`SelectionInList`]: the widget shows the
/// list's content and its selection tracks the shared index holder.
pub fn bind_list<T>(widget: &dyn ListWidget<T>, list: &SelectionInList<T>) -> Binding
where
    T: Clone + Send + Sync + 'static,
{
    let model = Arc::new(list.clone());
    let selection = Arc::new(SingleSelectionAdapter::new(list.selection_index_holder()));
    widget.set_model(model.clone());
    widget.set_selection_model(selection.clone());
    Binding::retaining(vec![model, selection])
}

/// Binds a color chooser to a color subject.
pub fn bind_color_chooser(widget: &dyn ColorWidget, subject: Arc<dyn ValueModel<Rgb>>) -> Binding {
    let adapter = Arc::new(ColorSelectionAdapter::new(subject));
    widget.set_model(adapter.clone());
    Binding::retaining(vec![adapter])
}
