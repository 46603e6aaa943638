//! # Tether
//!
//! A toolkit-agnostic two-way data-binding library for Rust.
//!
//! Tether keeps widget state and application state synchronized without
//! either side knowing about the other:
//!
//! ## Value layer (low-level primitives)
//!
//! - `ValueModel<T>` / `ValueHolder<T>` - Observable single-value subjects
//! - `Trigger` / `BufferedValue<T>` - Edits held back until an explicit
//!   commit (or discarded by a flush)
//! - `Connector<T>` - Bidirectional synchronization of two subjects
//!
//! Observation is weak by default: dropping an adapter ends its
//! observation, with no explicit unsubscription required.
//!
//! ## Adapter layer (widget-model contracts)
//!
//! Adapters present a subject through the state-model contract a widget
//! family expects: toggles, bounded ranges, list selections, text
//! buffers, list content, color choosers, and preference keys.
//!
//! ## Binding facade
//!
//! One-call functions that build the right adapter for a widget and hand
//! back a [`binding::Binding`] that keeps the wiring alive.

pub mod adapter;
pub mod binding;
pub mod error;
pub mod value;

// Re-export main types for convenience
pub use binding::{Binding, TextCommit};
pub use error::BindingError;
pub use value::{BufferedValue, Connector, Trigger, ValueHolder, ValueModel};
