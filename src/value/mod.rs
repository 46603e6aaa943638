//! The observable value layer.
//!
//! This module provides the core building blocks every adapter is built on:
//! - [`ValueModel`]: the observable value-holder contract
//! - [`ValueHolder`]: the plain subject implementation
//! - [`Trigger`] and [`BufferedValue`]: deferred commits
//! - [`Connector`]: generic bidirectional synchronization
//! - [`ObserverRegistry`] / [`ListenerList`]: leak-safe weak observation

mod buffered;
mod connector;
mod holder;
mod model;
mod registry;
mod trigger;

pub use buffered::BufferedValue;
pub use connector::Connector;
pub use holder::ValueHolder;
pub use model::{ValueModel, ValueObserver};
pub use registry::{ChangeListener, ListenerList, ObserverRegistry};
pub use trigger::Trigger;
