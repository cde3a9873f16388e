#![warn(missing_docs)]
//! Textdoc Core - Headless Document Engine for Code Editors
//!
//! # Overview
//!
//! `textdoc-core` keeps a text document and every structure an editor derives from it
//! consistent under edits: the line index, per-line syntax highlighting, text markers,
//! code folds and the undo history. It does no rendering; views query lines, colored words,
//! markers and fold visibility and subscribe to change notifications.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document (edit pipeline, events, undo)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Markers & Folding                          │  ← Offset / line ranges
//! ├─────────────────────────────────────────────┤
//! │  Highlighting (span stack, token cache)     │  ← Incremental tokenizer
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line access
//! ├─────────────────────────────────────────────┤
//! │  Text Buffer                                │  ← Characters, read-only, brackets
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use textdoc_core::{Document, MarkerKind, TextLocation, TextMarker};
//!
//! let mut document = Document::new("fn main() {\n    /* hello */\n}\n");
//! assert_eq!(document.line_count(), 4);
//!
//! let marker = document
//!     .add_marker(TextMarker::new(16, 11, MarkerKind::Underlined))
//!     .unwrap();
//! document.insert(0, "// entry point\n").unwrap();
//! assert_eq!(document.get_text_of_marker(marker).unwrap(), "/* hello */");
//!
//! assert_eq!(
//!     document.offset_to_position(15).unwrap(),
//!     TextLocation::new(1, 0)
//! );
//! document.undo().unwrap();
//! assert_eq!(document.line_count(), 4);
//! ```
//!
//! # Module Description
//!
//! - [`text_buffer`] - character storage, read-only flag, update brackets
//! - [`line_index`] - Rope based line index and offset/position conversion
//! - [`change`] - edit descriptions and the range translation shared by markers and folds
//! - [`highlighting`] - grammar model, span stack, line tokenizer and token cache
//! - [`markers`] - offset ranges that follow edits
//! - [`folding`] - line ranges that collapse, and visible-line mapping
//! - [`undo`] - grouped undo/redo history
//! - [`document`] - the edit pipeline tying everything together
//! - [`processing`] - fold producers

pub mod change;
pub mod document;
pub mod error;
pub mod events;
pub mod folding;
pub mod highlighting;
pub mod line_ending;
pub mod line_index;
pub mod markers;
pub mod options;
pub mod processing;
pub mod text_buffer;
pub mod undo;

pub use change::{DocumentChange, LineChange};
pub use document::Document;
pub use error::{DocumentError, Result};
pub use events::{DocumentEvent, DocumentEventCallback};
pub use folding::{FoldId, FoldMarker, FoldType, FoldingManager};
pub use highlighting::{
    Color, DEFAULT_STRATEGY_NAME, HighlightColor, HighlightRuleSet, HighlightingStrategy,
    HighlightingStrategyBuilder, MarkWord, Span, SpanStack, TextWord, WordKind,
};
pub use line_ending::LineEnding;
pub use line_index::{Line, LineIndex, TextLocation};
pub use markers::{MarkerId, MarkerKind, MarkerStrategy, TextMarker};
pub use options::DocumentOptions;
pub use processing::{FoldingStrategy, IndentFoldingStrategy};
pub use text_buffer::TextBuffer;
pub use undo::{UndoEdit, UndoGroup, UndoStack};
