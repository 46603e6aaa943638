//! Widget-model adapters.
//!
//! Each submodule defines the toolkit-agnostic state-model contract of one
//! widget family (toggle, bounded range, list selection, text buffer, list
//! content, color selection) plus the adapter that presents an observable
//! subject through that contract. The adapters share one discipline: user
//! gestures write the subject, subject changes update the widget-facing
//! state, and no round trip ever echoes back to where it started.

mod color;
mod document;
mod list;
mod preferences;
mod range;
mod selection;
mod toggle;

pub use color::{ColorSelectionAdapter, ColorSelectionModel, Rgb};
pub use document::{
    DocumentAdapter, DocumentEdit, DocumentListener, PlainDocument, TextDocument,
};
pub use list::{ListDataEvent, ListDataListener, ListModel, SelectionInList};
pub use preferences::{MemoryStore, PrefValue, PreferenceStore, PreferencesAdapter};
pub use range::{BoundedRangeModel, RangeAdapter};
pub use selection::{
    ListSelectionModel, SelectionEvent, SelectionListener, SelectionMode,
    SingleSelectionAdapter,
};
pub use toggle::{ToggleAdapter, ToggleModel};
