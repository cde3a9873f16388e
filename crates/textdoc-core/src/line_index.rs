//! Logical line index.
//!
//! Backed by a [`ropey::Rope`], which keeps per-leaf line-break counts, so line access, offset
//! lookups and edits are all O(log N). The rope is built with ropey's `cr_lines` feature only:
//! `\n`, `\r` and `\r\n` are the recognised terminators.
//!
//! All offsets are character offsets (Unicode scalar values).

use crate::error::{DocumentError, Result};
use crate::line_ending::LineEnding;
use ropey::Rope;

/// A `(line, column)` position in the document. `(0, 0)` is the document start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextLocation {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column (character offset from the line start).
    pub column: usize,
}

impl TextLocation {
    /// Create a location.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One physical line of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Line number.
    pub line_number: usize,
    /// Char offset of the first character.
    pub offset: usize,
    /// Length in characters, terminator excluded.
    pub length: usize,
    /// Length of the terminator: 0 (last line), 1 (`\n` / `\r`) or 2 (`\r\n`).
    pub delimiter_length: usize,
}

impl Line {
    /// `length + delimiter_length`.
    pub fn total_length(&self) -> usize {
        self.length + self.delimiter_length
    }

    /// Offset just past the line content (terminator excluded).
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }

    /// Largest valid column on this line.
    ///
    /// On a `\r\n` line the position between `\r` and `\n` is addressable as `length + 1`.
    pub fn max_column(&self) -> usize {
        self.length + self.delimiter_length.saturating_sub(1)
    }
}

/// Line index over the document rope.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index (one empty line).
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build an index from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// The underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines (an empty document has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Document length in characters.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    fn check_line(&self, line_number: usize) -> Result<()> {
        if line_number >= self.line_count() {
            return Err(DocumentError::LineOutOfRange {
                line: line_number,
                line_count: self.line_count(),
            });
        }
        Ok(())
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.char_count() {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                text_length: self.char_count(),
            });
        }
        Ok(())
    }

    /// The line record for `line_number`.
    pub fn get_line(&self, line_number: usize) -> Result<Line> {
        self.check_line(line_number)?;
        let offset = self.rope.line_to_char(line_number);
        let slice = self.rope.line(line_number);
        let total = slice.len_chars();
        let delimiter_length = match (
            total.checked_sub(2).map(|i| slice.char(i)),
            total.checked_sub(1).map(|i| slice.char(i)),
        ) {
            (Some('\r'), Some('\n')) => 2,
            (_, Some('\n' | '\r')) => 1,
            _ => 0,
        };
        Ok(Line {
            line_number,
            offset,
            length: total - delimiter_length,
            delimiter_length,
        })
    }

    /// The terminator of a line, `None` for the last line.
    pub fn line_ending(&self, line_number: usize) -> Result<Option<LineEnding>> {
        let line = self.get_line(line_number)?;
        let start = line.end_offset();
        let terminator = self.rope.slice(start..start + line.delimiter_length).to_string();
        Ok(LineEnding::of_line_end(&terminator))
    }

    /// The line containing `offset`. `offset == N` resolves to the last line, and the offset
    /// between the two characters of a `\r\n` terminator belongs to the line it terminates.
    pub fn line_number_for_offset(&self, offset: usize) -> Result<usize> {
        self.check_offset(offset)?;
        if self.is_crlf_seam(offset) {
            return Ok(self.rope.char_to_line(offset - 1));
        }
        Ok(self.rope.char_to_line(offset))
    }

    /// Whether `offset` sits between the `\r` and the `\n` of a CRLF pair.
    pub(crate) fn is_crlf_seam(&self, offset: usize) -> bool {
        offset > 0
            && offset < self.char_count()
            && self.rope.char(offset - 1) == '\r'
            && self.rope.char(offset) == '\n'
    }

    /// Char offset of a location.
    pub fn position_to_offset(&self, location: TextLocation) -> Result<usize> {
        let line = self.get_line(location.line)?;
        if location.column > line.max_column() {
            return Err(DocumentError::ColumnOutOfRange {
                line: location.line,
                column: location.column,
                max_column: line.max_column(),
            });
        }
        Ok(line.offset + location.column)
    }

    /// Location of a char offset.
    pub fn offset_to_position(&self, offset: usize) -> Result<TextLocation> {
        let line = self.line_number_for_offset(offset)?;
        Ok(TextLocation::new(line, offset - self.rope.line_to_char(line)))
    }

    /// Text of a line, terminator excluded.
    pub fn line_text(&self, line_number: usize) -> Result<String> {
        let line = self.get_line(line_number)?;
        Ok(self
            .rope
            .slice(line.offset..line.end_offset())
            .to_string())
    }

    /// Iterate over all line records.
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        (0..self.line_count()).filter_map(move |n| self.get_line(n).ok())
    }

    /// The first and last line touched by removing `removed_len` chars at `offset`, measured
    /// before the edit is applied. A preceding `\r` joins the run, since an inserted or removed
    /// `\n` next to it changes that line's terminator.
    pub(crate) fn edit_lines(&self, offset: usize, removed_len: usize) -> Result<(usize, usize)> {
        let start_line = if offset > 0 && self.rope.char(offset - 1) == '\r' {
            self.line_number_for_offset(offset - 1)?
        } else {
            self.line_number_for_offset(offset)?
        };
        let old_end_line = self.line_number_for_offset(offset + removed_len)?;
        Ok((start_line, old_end_line))
    }

    /// Insert text at a char offset.
    pub(crate) fn insert(&mut self, offset: usize, text: &str) {
        self.rope.insert(offset, text);
    }

    /// Remove `len` chars at a char offset.
    pub(crate) fn remove(&mut self, offset: usize, len: usize) {
        if len > 0 {
            self.rope.remove(offset..offset + len);
        }
    }

    /// Check the contiguity of the line table; used by debug assertions and tests.
    pub fn is_consistent(&self) -> bool {
        let mut expected = 0;
        let mut lines = self.lines().peekable();
        while let Some(line) = lines.next() {
            if line.offset != expected {
                return false;
            }
            if lines.peek().is_none() && line.delimiter_length != 0 {
                return false;
            }
            expected += line.total_length();
        }
        expected == self.char_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_line_index() {
        let index = LineIndex::new();
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.char_count(), 0);
        assert_eq!(
            index.get_line(0).unwrap(),
            Line {
                line_number: 0,
                offset: 0,
                length: 0,
                delimiter_length: 0
            }
        );
    }

    #[test]
    fn test_mixed_terminators() {
        let index = LineIndex::from_text("ab\r\ncd\ref\ng");
        assert_eq!(index.line_count(), 4);
        let lines: Vec<_> = index
            .lines()
            .map(|l| (l.offset, l.length, l.delimiter_length))
            .collect();
        assert_eq!(lines, vec![(0, 2, 2), (4, 2, 1), (7, 2, 1), (10, 1, 0)]);
        assert_eq!(index.line_ending(0).unwrap(), Some(LineEnding::Crlf));
        assert_eq!(index.line_ending(1).unwrap(), Some(LineEnding::Cr));
        assert_eq!(index.line_ending(2).unwrap(), Some(LineEnding::Lf));
        assert_eq!(index.line_ending(3).unwrap(), None);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_trailing_newline_has_empty_last_line() {
        let index = LineIndex::from_text("abc\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_number_for_offset(4).unwrap(), 1);
        assert_eq!(index.line_text(1).unwrap(), "");
    }

    #[test]
    fn test_line_number_for_offset() {
        let index = LineIndex::from_text("First line\nSecond line\nThird line");
        assert_eq!(index.line_number_for_offset(0).unwrap(), 0);
        assert_eq!(index.line_number_for_offset(10).unwrap(), 0);
        assert_eq!(index.line_number_for_offset(11).unwrap(), 1);
        assert_eq!(index.line_number_for_offset(33).unwrap(), 2);
        assert!(index.line_number_for_offset(34).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_crlf_seam_column() {
        let index = LineIndex::from_text("ab\r\ncd");
        assert_eq!(index.offset_to_position(3).unwrap(), TextLocation::new(0, 3));
        assert_eq!(index.position_to_offset(TextLocation::new(0, 3)).unwrap(), 3);
        assert_eq!(index.offset_to_position(4).unwrap(), TextLocation::new(1, 0));
        assert!(matches!(
            index.position_to_offset(TextLocation::new(0, 4)),
            Err(DocumentError::ColumnOutOfRange { max_column: 3, .. })
        ));
    }

    #[test]
    fn test_position_round_trip() {
        let index = LineIndex::from_text("你好\r\n世界\rx\n\n");
        for offset in 0..=index.char_count() {
            let pos = index.offset_to_position(offset).unwrap();
            assert_eq!(index.position_to_offset(pos).unwrap(), offset);
        }
        for line in index.lines() {
            for column in 0..=line.max_column() {
                let pos = TextLocation::new(line.line_number, column);
                let offset = index.position_to_offset(pos).unwrap();
                assert_eq!(index.offset_to_position(offset).unwrap(), pos);
            }
        }
    }

    #[test]
    fn test_get_line_out_of_range() {
        let index = LineIndex::from_text("Line 1\nLine 2");
        assert_eq!(
            index.get_line(2),
            Err(DocumentError::LineOutOfRange {
                line: 2,
                line_count: 2
            })
        );
    }

    #[test]
    fn test_edit_lines_includes_cr_seam() {
        let index = LineIndex::from_text("a\rb\nc");
        assert_eq!(index.edit_lines(2, 0).unwrap(), (0, 1));
        assert_eq!(index.edit_lines(3, 2).unwrap(), (1, 2));
    }

    #[test]
    fn test_line_ending_follows_edits() {
        let mut index = LineIndex::from_text("a\rb");
        assert_eq!(index.line_ending(0).unwrap(), Some(LineEnding::Cr));
        index.insert(2, "\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_ending(0).unwrap(), Some(LineEnding::Crlf));
        index.remove(1, 1);
        assert_eq!(index.line_ending(0).unwrap(), Some(LineEnding::Lf));
        assert_eq!(index.line_ending(1).unwrap(), None);
        assert!(index.line_ending(2).is_err());
    }

    #[test]
    fn test_large_document() {
        let text: Vec<String> = (0..10000).map(|i| format!("Line {i}")).collect();
        let index = LineIndex::from_text(&text.join("\n"));
        assert_eq!(index.line_count(), 10000);
        assert_eq!(index.line_text(5000).unwrap(), "Line 5000");
    }
}
