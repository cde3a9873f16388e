//! The mutable character buffer.
//!
//! [`TextBuffer`] exclusively owns the document text (inside its [`LineIndex`] rope), validates
//! every edit against `[0, N]`, applies it and reports the replaced line run as a
//! [`DocumentChange`]. Notification and derived-state maintenance live one level up in
//! [`crate::Document`].

use crate::change::{DocumentChange, LineChange};
use crate::error::{DocumentError, Result};
use crate::line_index::LineIndex;

/// Character buffer with a line index, a read-only flag and an update bracket counter.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    index: LineIndex,
    read_only: bool,
    update_depth: usize,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            index: LineIndex::from_text(text),
            ..Self::default()
        }
    }

    /// The line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Document length in characters.
    pub fn len(&self) -> usize {
        self.index.char_count()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.index.rope().to_string()
    }

    /// `length` characters starting at `offset`.
    pub fn text_range(&self, offset: usize, length: usize) -> Result<String> {
        self.check_range(offset, length)?;
        Ok(self
            .index
            .rope()
            .slice(offset..offset + length)
            .to_string())
    }

    /// The character at `offset`.
    pub fn char_at(&self, offset: usize) -> Result<char> {
        if offset >= self.len() {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                text_length: self.len(),
            });
        }
        Ok(self.index.rope().char(offset))
    }

    /// Whether mutations are rejected.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Enable or disable read-only mode.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Validate a range against the current length.
    pub fn check_range(&self, offset: usize, length: usize) -> Result<()> {
        let text_length = self.len();
        if offset > text_length {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                text_length,
            });
        }
        if length > text_length - offset {
            return Err(DocumentError::RangeOutOfRange {
                offset,
                length,
                text_length,
            });
        }
        Ok(())
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<DocumentChange> {
        self.edit(offset, 0, text)
    }

    /// Remove `length` characters at `offset`.
    pub fn remove(&mut self, offset: usize, length: usize) -> Result<DocumentChange> {
        self.edit(offset, length, "")
    }

    /// Replace `length` characters at `offset` with `text`; returns the removed text.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<String> {
        self.edit(offset, length, text).map(|change| change.removed_text)
    }

    /// Remove `length` characters at `offset`, then insert `text` there.
    ///
    /// Fails with `OffsetOutOfRange` / `RangeOutOfRange` outside `[0, N]` and with
    /// `ReadOnlyViolation` in read-only mode; a failed edit changes nothing.
    pub fn edit(&mut self, offset: usize, length: usize, text: &str) -> Result<DocumentChange> {
        self.check_range(offset, length)?;
        if self.read_only {
            return Err(DocumentError::ReadOnlyViolation { offset, length });
        }

        let old_line_count = self.index.line_count();
        let (start_line, old_end_line) = self.index.edit_lines(offset, length)?;
        let removed_text = self
            .index
            .rope()
            .slice(offset..offset + length)
            .to_string();

        self.index.remove(offset, length);
        self.index.insert(offset, text);

        let inserted_len = text.chars().count();
        let new_end_line = self.index.line_number_for_offset(offset + inserted_len)?;
        let lines = LineChange {
            start_line,
            old_end_line,
            new_end_line,
        };
        debug_assert_eq!(
            self.index.line_count() as isize - old_line_count as isize,
            lines.line_delta(),
            "line table out of sync after edit at {offset}"
        );

        Ok(DocumentChange {
            offset,
            removed_text,
            inserted_text: text.to_string(),
            lines,
        })
    }

    /// Open an update bracket. Brackets nest.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    /// Close an update bracket; returns `true` when the outermost bracket closed.
    pub fn end_update(&mut self) -> bool {
        debug_assert!(self.update_depth > 0, "end_update without begin_update");
        if self.update_depth == 0 {
            return false;
        }
        self.update_depth -= 1;
        self.update_depth == 0
    }

    /// Current bracket nesting depth.
    pub fn update_depth(&self) -> usize {
        self.update_depth
    }

    /// Whether an update bracket is open.
    pub fn is_in_update(&self) -> bool {
        self.update_depth > 0
    }
}
