//! Change notifications delivered to document subscribers.

use crate::folding::FoldId;
use crate::markers::MarkerId;
use std::ops::RangeInclusive;

/// A document notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// An edit passed validation and is about to be applied.
    DocumentChanging {
        /// Edit offset.
        offset: usize,
        /// Number of characters to be removed.
        length: usize,
        /// Text to be inserted.
        text: String,
    },
    /// An edit was applied and all derived state (markers, folds, tokens) is consistent.
    DocumentChanged {
        /// Edit offset.
        offset: usize,
        /// Removed text.
        removed_text: String,
        /// Inserted text.
        inserted_text: String,
    },
    /// The outermost update bracket closed (or an edit completed outside any bracket).
    UpdateCommitted {
        /// Lines edited or re-tokenized since the previous commit, in current line numbers.
        lines: Option<RangeInclusive<usize>>,
    },
    /// The fold set or a fold's state changed.
    FoldingsChanged,
    /// Folds were expanded because a position inside them was revealed.
    FoldsExpanded(Vec<FoldId>),
    /// A marker was added.
    MarkerAdded(MarkerId),
    /// A marker was removed, explicitly or because an edit consumed its range.
    MarkerRemoved(MarkerId),
    /// A new highlighting strategy was attached and the document re-tokenized.
    HighlightingChanged {
        /// Name of the new strategy.
        name: String,
    },
}

/// Subscriber callback.
pub type DocumentEventCallback = Box<dyn FnMut(&DocumentEvent) + Send>;
