use thiserror::Error;

/// Errors raised by adapter construction and document edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A toggle adapter was given equal selected/deselected representative
    /// values, which would make its state ambiguous.
    #[error("selected and deselected representative values must differ")]
    IndistinctToggleValues,

    /// A range adapter was configured so that
    /// `min <= value <= value + extent <= max` does not hold.
    #[error("invalid range properties: value={value}, extent={extent}, min={min}, max={max}")]
    InvalidRange {
        value: i32,
        extent: i32,
        min: i32,
        max: i32,
    },

    /// A selection mode other than single selection was requested.
    #[error("only single selection mode is supported")]
    UnsupportedSelectionMode,

    /// A structural index interval contained an index below -1.
    #[error("both interval indices must be greater than or equal to -1")]
    InvalidIndexInterval,

    /// A document edit addressed a position outside the buffer, or one
    /// that splits a multi-byte character.
    #[error("edit at offset {offset} with length {len} is out of bounds or splits a character")]
    EditOutOfBounds { offset: usize, len: usize },

    /// A document was mutated from within its own change notification.
    /// Corrective writes must be deferred until the current edit completes.
    #[error("document mutated from within its own change notification")]
    ReentrantEdit,
}
