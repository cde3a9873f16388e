//! Error type shared by every component of the document engine.

use thiserror::Error;

/// Convenience alias used throughout `textdoc-core`.
pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the buffer, line index, highlighting, marker and folding layers.
pub enum DocumentError {
    #[error("offset {offset} is outside the document (length {text_length})")]
    /// A character offset outside `[0, N]`.
    OffsetOutOfRange {
        /// Requested offset.
        offset: usize,
        /// Document length in characters.
        text_length: usize,
    },

    #[error("range {offset}+{length} is outside the document (length {text_length})")]
    /// A character range whose end lies past the end of the document.
    RangeOutOfRange {
        /// Range start.
        offset: usize,
        /// Range length.
        length: usize,
        /// Document length in characters.
        text_length: usize,
    },

    #[error("line {line} is outside the document ({line_count} lines)")]
    /// A line number outside `[0, line_count)`.
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Number of lines in the document.
        line_count: usize,
    },

    #[error("column {column} is outside line {line} (max column {max_column})")]
    /// A column past the end of its line.
    ColumnOutOfRange {
        /// Line of the position.
        line: usize,
        /// Requested column.
        column: usize,
        /// Largest valid column on that line.
        max_column: usize,
    },

    #[error("read-only violation at {offset}+{length}")]
    /// Mutation of a read-only document or of a range covered by a read-only marker.
    ReadOnlyViolation {
        /// Start of the rejected edit.
        offset: usize,
        /// Length of the rejected removal (0 for insertions).
        length: usize,
    },

    #[error("invalid highlighting definition: {0}")]
    /// A grammar could not be loaded or resolved.
    HighlightingDefinitionInvalid(String),

    #[error("span stack is empty")]
    /// `pop` on an empty span stack.
    EmptyStack,

    #[error("nothing to undo")]
    /// Undo requested with an empty undo history.
    NothingToUndo,

    #[error("nothing to redo")]
    /// Redo requested with an empty redo history.
    NothingToRedo,

    #[error("unknown text marker {0}")]
    /// A marker handle that is not (or no longer) registered.
    UnknownMarker(u64),

    #[error("unknown fold marker {0}")]
    /// A fold handle that is not (or no longer) registered.
    UnknownFold(u64),
}

impl DocumentError {
    /// Returns `true` for the out-of-range family (offset, range, line or column).
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::OffsetOutOfRange { .. }
                | Self::RangeOutOfRange { .. }
                | Self::LineOutOfRange { .. }
                | Self::ColumnOutOfRange { .. }
        )
    }
}
