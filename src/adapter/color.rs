use std::sync::{Arc, Weak};

use crate::value::{ChangeListener, ListenerList, ValueModel, ValueObserver};

/// An sRGB color with 8-bit channels. The default is black.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The color-selection state model contract consumed by color choosers.
pub trait ColorSelectionModel: Send + Sync {
    fn selected_color(&self) -> Rgb;
    fn set_selected_color(&self, color: Rgb);
    fn add_change_listener(&self, listener: &Arc<ChangeListener>);
    fn remove_change_listener(&self, listener: &Arc<ChangeListener>);
}

/// Presents a color-valued subject through the [`ColorSelectionModel`]
/// contract. An absent subject value reads as the fallback color, so the
/// chooser always has something concrete to display.
pub struct ColorSelectionAdapter {
    inner: Arc<ColorInner>,
    _subject_observer: Arc<ValueObserver<Rgb>>,
}

struct ColorInner {
    subject: Arc<dyn ValueModel<Rgb>>,
    fallback: Rgb,
    change: ListenerList<ChangeListener>,
}

impl ColorSelectionAdapter {
    /// Fallback is black, matching [`Rgb::default`].
    pub fn new(subject: Arc<dyn ValueModel<Rgb>>) -> Self {
        Self::with_fallback(subject, Rgb::default())
    }

    pub fn with_fallback(subject: Arc<dyn ValueModel<Rgb>>, fallback: Rgb) -> Self {
        let inner = Arc::new(ColorInner {
            subject,
            fallback,
            change: ListenerList::new(),
        });

        let subject_observer: Arc<ValueObserver<Rgb>> = {
            let inner: Weak<ColorInner> = Arc::downgrade(&inner);
            Arc::new(move |_, _| {
                if let Some(inner) = inner.upgrade() {
                    for listener in inner.change.snapshot() {
                        listener();
                    }
                }
            })
        };
        inner.subject.add_observer(&subject_observer);

        Self {
            inner,
            _subject_observer: subject_observer,
        }
    }

    pub fn subject(&self) -> Arc<dyn ValueModel<Rgb>> {
        Arc::clone(&self.inner.subject)
    }
}

impl ColorSelectionModel for ColorSelectionAdapter {
    fn selected_color(&self) -> Rgb {
        self.inner.subject.value().unwrap_or(self.inner.fallback)
    }

    fn set_selected_color(&self, color: Rgb) {
        // The subject's own not-equal gate keeps a re-pick of the current
        // color from firing; only write when the displayed color changes.
        if self.selected_color() != color {
            self.inner.subject.set_value(Some(color));
        }
    }

    fn add_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.add(listener);
    }

    fn remove_change_listener(&self, listener: &Arc<ChangeListener>) {
        self.inner.change.remove(listener);
    }
}
