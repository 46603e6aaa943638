use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, error};

use crate::error::BindingError;
use crate::value::{ListenerList, ValueModel, ValueObserver};

/// Edit notification emitted by a text buffer after its content changed.
/// Offsets and lengths are in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentEdit {
    Inserted { offset: usize, len: usize },
    Removed { offset: usize, len: usize },
}

pub type DocumentListener = dyn Fn(&DocumentEdit) + Send + Sync;

/// The text-buffer state model contract consumed by text widgets.
///
/// A buffer must not be mutated from within its own change notification;
/// such an edit fails with [`BindingError::ReentrantEdit`]. Corrective
/// writes triggered by a notification have to be deferred until the
/// current mutation has fully completed.
pub trait TextDocument: Send + Sync {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn text(&self) -> String;
    fn insert(&self, offset: usize, text: &str) -> Result<(), BindingError>;
    fn remove(&self, offset: usize, len: usize) -> Result<(), BindingError>;
    /// Atomic remove-then-insert.
    fn replace(&self, offset: usize, len: usize, text: &str) -> Result<(), BindingError>;
    /// When enabled, inserted newlines are converted to spaces
    /// (single-line fields).
    fn set_filter_newlines(&self, filter: bool);
    fn add_edit_listener(&self, listener: &Arc<DocumentListener>);
    fn remove_edit_listener(&self, listener: &Arc<DocumentListener>);
}

/// Default in-memory [`TextDocument`] implementation.
pub struct PlainDocument {
    text: RwLock<String>,
    filter_newlines: AtomicBool,
    notifying: AtomicBool,
    listeners: ListenerList<DocumentListener>,
}

impl PlainDocument {
    pub fn new() -> Self {
        Self {
            text: RwLock::new(String::new()),
            filter_newlines: AtomicBool::new(false),
            notifying: AtomicBool::new(false),
            listeners: ListenerList::new(),
        }
    }

    pub fn with_text(text: &str) -> Self {
        let document = Self::new();
        *document.text.write().unwrap() = text.to_string();
        document
    }

    fn check_bounds(text: &str, offset: usize, len: usize) -> Result<(), BindingError> {
        let end = offset.checked_add(len);
        let in_bounds = end.is_some_and(|end| {
            end <= text.len() && text.is_char_boundary(offset) && text.is_char_boundary(end)
        });
        if in_bounds {
            Ok(())
        } else {
            Err(BindingError::EditOutOfBounds { offset, len })
        }
    }

    fn filtered(&self, text: &str) -> String {
        if self.filter_newlines.load(Ordering::SeqCst) {
            text.replace('\n', " ")
        } else {
            text.to_string()
        }
    }

    fn notify(&self, edits: &[DocumentEdit]) {
        self.notifying.store(true, Ordering::SeqCst);
        for listener in self.listeners.snapshot() {
            for edit in edits {
                listener(edit);
            }
        }
        self.notifying.store(false, Ordering::SeqCst);
    }

    fn guard_reentrancy(&self) -> Result<(), BindingError> {
        if self.notifying.load(Ordering::SeqCst) {
            Err(BindingError::ReentrantEdit)
        } else {
            Ok(())
        }
    }
}

impl TextDocument for PlainDocument {
    fn len(&self) -> usize {
        self.text.read().unwrap().len()
    }

    fn text(&self) -> String {
        self.text.read().unwrap().clone()
    }

    fn insert(&self, offset: usize, text: &str) -> Result<(), BindingError> {
        self.guard_reentrancy()?;
        let inserted = self.filtered(text);
        if inserted.is_empty() {
            return Ok(());
        }
        {
            let mut current = self.text.write().unwrap();
            Self::check_bounds(&current, offset, 0)?;
            current.insert_str(offset, &inserted);
        }
        self.notify(&[DocumentEdit::Inserted {
            offset,
            len: inserted.len(),
        }]);
        Ok(())
    }

    fn remove(&self, offset: usize, len: usize) -> Result<(), BindingError> {
        self.guard_reentrancy()?;
        if len == 0 {
            return Ok(());
        }
        {
            let mut current = self.text.write().unwrap();
            Self::check_bounds(&current, offset, len)?;
            current.drain(offset..offset + len);
        }
        self.notify(&[DocumentEdit::Removed { offset, len }]);
        Ok(())
    }

    fn replace(&self, offset: usize, len: usize, text: &str) -> Result<(), BindingError> {
        self.guard_reentrancy()?;
        let inserted = self.filtered(text);
        {
            let mut current = self.text.write().unwrap();
            Self::check_bounds(&current, offset, len)?;
            current.replace_range(offset..offset + len, &inserted);
        }
        let mut edits = Vec::with_capacity(2);
        if len > 0 {
            edits.push(DocumentEdit::Removed { offset, len });
        }
        if !inserted.is_empty() {
            edits.push(DocumentEdit::Inserted {
                offset,
                len: inserted.len(),
            });
        }
        if !edits.is_empty() {
            self.notify(&edits);
        }
        Ok(())
    }

    fn set_filter_newlines(&self, filter: bool) {
        self.filter_newlines.store(filter, Ordering::SeqCst);
    }

    fn add_edit_listener(&self, listener: &Arc<DocumentListener>) {
        self.listeners.add(listener);
    }

    fn remove_edit_listener(&self, listener: &Arc<DocumentListener>) {
        self.listeners.remove(listener);
    }
}

impl Default for PlainDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects a string-valued subject with a [`TextDocument`].
///
/// Buffer edits are pushed to the subject on every insert and remove;
/// subject changes rewrite the buffer silently. When a subject change is
/// the direct synchronous consequence of a buffer edit (for instance a
/// subject that upper-cases the text it receives), the buffer is still in
/// the middle of its own mutation and forbids being rewritten. The
/// corrective rewrite is therefore parked and applied as soon as the
/// current mutation completes: the adapter itself implements
/// [`TextDocument`] by forwarding to its delegate and flushes after each
/// forwarded mutation, and [`flush_pending`](DocumentAdapter::flush_pending)
/// is public for buffers edited behind the adapter's back. Only the last
/// parked text is kept, so several subject notifications per edit settle
/// on the final value.
pub struct DocumentAdapter {
    inner: Arc<DocumentInner>,
    _doc_listener: Arc<DocumentListener>,
    _subject_observer: Arc<ValueObserver<String>>,
}

struct DocumentInner {
    subject: Arc<dyn ValueModel<String>>,
    delegate: Arc<dyn TextDocument>,
    // True while a buffer edit is being propagated to the subject; any
    // synchronous subject echo must defer its buffer rewrite.
    update_later: AtomicBool,
    pending: Mutex<Option<String>>,
    doc_listener: RwLock<Option<Arc<DocumentListener>>>,
}

impl DocumentAdapter {
    /// Binds `subject` to `delegate`. `filter_newlines` is enabled for
    /// single-line fields. The buffer is initialized to the subject's
    /// current text (empty when absent).
    pub fn new(
        subject: Arc<dyn ValueModel<String>>,
        delegate: Arc<dyn TextDocument>,
        filter_newlines: bool,
    ) -> Self {
        delegate.set_filter_newlines(filter_newlines);
        let inner = Arc::new(DocumentInner {
            subject,
            delegate,
            update_later: AtomicBool::new(false),
            pending: Mutex::new(None),
            doc_listener: RwLock::new(None),
        });

        let doc_listener: Arc<DocumentListener> = {
            let inner: Weak<DocumentInner> = Arc::downgrade(&inner);
            Arc::new(move |_edit| {
                if let Some(inner) = inner.upgrade() {
                    inner.update_subject();
                }
            })
        };
        *inner.doc_listener.write().unwrap() = Some(doc_listener.clone());
        inner.delegate.add_edit_listener(&doc_listener);

        let subject_observer: Arc<ValueObserver<String>> = {
            let inner: Weak<DocumentInner> = Arc::downgrade(&inner);
            Arc::new(move |_, new| {
                if let Some(inner) = inner.upgrade() {
                    inner.subject_changed(new);
                }
            })
        };
        inner.subject.add_observer(&subject_observer);

        let subject_text = inner.subject_text();
        inner.set_document_text_silently(&subject_text);

        Self {
            inner,
            _doc_listener: doc_listener,
            _subject_observer: subject_observer,
        }
    }

    /// Applies a parked buffer rewrite, if one exists. Called internally
    /// after every forwarded mutation; embedding applications that mutate
    /// the delegate directly call this at a safe point instead.
    pub fn flush_pending(&self) {
        self.inner.flush_pending();
    }

    /// The subject this adapter synchronizes with.
    pub fn subject(&self) -> Arc<dyn ValueModel<String>> {
        Arc::clone(&self.inner.subject)
    }
}

impl DocumentInner {
    fn subject_text(&self) -> String {
        self.subject.value().unwrap_or_default()
    }

    /// Buffer -> subject, with the echo-suppression flag raised so a
    /// synchronous subject echo defers its rewrite.
    fn update_subject(&self) {
        let text = self.delegate.text();
        self.update_later.store(true, Ordering::SeqCst);
        self.subject.set_value(Some(text));
        self.update_later.store(false, Ordering::SeqCst);
    }

    /// Subject -> buffer.
    fn subject_changed(&self, new: Option<&String>) {
        let new_text = match new {
            Some(text) => text.clone(),
            None => String::new(),
        };
        if self.delegate.text() == new_text {
            return;
        }
        if self.update_later.load(Ordering::SeqCst) {
            debug!("deferring buffer rewrite until the current edit completes");
            *self.pending.lock().unwrap() = Some(new_text);
        } else {
            self.set_document_text_silently(&new_text);
        }
    }

    fn flush_pending(&self) {
        let pending = self.pending.lock().unwrap().take();
        if let Some(text) = pending {
            if self.delegate.text() != text {
                self.set_document_text_silently(&text);
            }
        }
    }

    /// Rewrites the whole buffer while this adapter's own listener is
    /// detached, so the rewrite does not bounce back into the subject.
    fn set_document_text_silently(&self, new_text: &str) {
        let listener = self.doc_listener.read().unwrap().clone();
        if let Some(listener) = &listener {
            self.delegate.remove_edit_listener(listener);
        }
        if let Err(e) = self.delegate.replace(0, self.delegate.len(), new_text) {
            // Full-range replace on a quiescent buffer cannot be out of
            // bounds; a failure here means the buffer is mid-notification.
            error!(error = %e, "buffer rewrite failed");
        }
        if let Some(listener) = &listener {
            self.delegate.add_edit_listener(listener);
        }
    }
}

impl TextDocument for DocumentAdapter {
    fn len(&self) -> usize {
        self.inner.delegate.len()
    }

    fn text(&self) -> String {
        self.inner.delegate.text()
    }

    fn insert(&self, offset: usize, text: &str) -> Result<(), BindingError> {
        let result = self.inner.delegate.insert(offset, text);
        self.inner.flush_pending();
        result
    }

    fn remove(&self, offset: usize, len: usize) -> Result<(), BindingError> {
        let result = self.inner.delegate.remove(offset, len);
        self.inner.flush_pending();
        result
    }

    fn replace(&self, offset: usize, len: usize, text: &str) -> Result<(), BindingError> {
        let result = self.inner.delegate.replace(offset, len, text);
        self.inner.flush_pending();
        result
    }

    fn set_filter_newlines(&self, filter: bool) {
        self.inner.delegate.set_filter_newlines(filter);
    }

    fn add_edit_listener(&self, listener: &Arc<DocumentListener>) {
        self.inner.delegate.add_edit_listener(listener);
    }

    fn remove_edit_listener(&self, listener: &Arc<DocumentListener>) {
        self.inner.delegate.remove_edit_listener(listener);
    }
}
