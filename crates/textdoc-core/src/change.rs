//! Structured change records.
//!
//! Every mutation of the buffer produces a [`DocumentChange`] expressed in **character offsets**
//! (Unicode scalar values). Derived layers (markers, folds, the token cache, undo) consume it
//! instead of diffing old and new text.

/// The run of lines replaced by an edit.
///
/// Lines `start_line..=old_end_line` of the old document were replaced by lines
/// `start_line..=new_end_line` of the new document. Lines before `start_line` are untouched and
/// lines after the run are unchanged in text, shifted by [`LineChange::line_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChange {
    /// First line touched by the edit (same in old and new document).
    pub start_line: usize,
    /// Last line of the replaced run, in the old document.
    pub old_end_line: usize,
    /// Last line of the replacement run, in the new document.
    pub new_end_line: usize,
}

impl LineChange {
    /// Number of old lines replaced.
    pub fn old_line_count(&self) -> usize {
        self.old_end_line - self.start_line + 1
    }

    /// Number of new lines in the replacement run.
    pub fn new_line_count(&self) -> usize {
        self.new_end_line - self.start_line + 1
    }

    /// Change in the document line count.
    pub fn line_delta(&self) -> isize {
        self.new_end_line as isize - self.old_end_line as isize
    }
}

/// A single applied edit.
///
/// Semantics: `removed_text` was removed at `offset`, then `inserted_text` was inserted at
/// `offset`. `offset` is a character offset in the document at the time the edit was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Start character offset of the edit.
    pub offset: usize,
    /// Exact removed text (may be empty).
    pub removed_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
    /// Lines replaced by the edit.
    pub lines: LineChange,
}

impl DocumentChange {
    /// Length of `removed_text` in characters.
    pub fn removed_len(&self) -> usize {
        self.removed_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end of the removed range in the pre-edit document.
    pub fn removed_end(&self) -> usize {
        self.offset + self.removed_len()
    }

    /// Translate a half-open range `[start, end)` through this edit.
    ///
    /// Removal is applied first, then insertion:
    /// - a range before the edit is unchanged and a range after it shifts;
    /// - a range consumed by a non-empty removal is dropped (`None`);
    /// - a range straddling the removal keeps its surviving part;
    /// - insertion strictly inside grows the range; insertion at `start` grows it only with
    ///   `grows_at_start` (otherwise the range shifts) and insertion at `end` grows it only with
    ///   `grows_at_end` (otherwise it is unchanged).
    pub fn translate_range(
        &self,
        start: usize,
        end: usize,
        grows_at_start: bool,
        grows_at_end: bool,
    ) -> Option<(usize, usize)> {
        let o = self.offset;
        let r = self.removed_len();
        let i = self.inserted_len();
        let (mut s, mut e) = (start, end);

        if e <= o {
            // before the removed range
        } else if s >= o + r {
            s -= r;
            e -= r;
        } else if s >= o && e <= o + r && r > 0 {
            return None;
        } else if s < o && e > o + r {
            e -= r;
        } else if s < o {
            e = o;
        } else {
            s = o;
            e -= r;
        }

        if i == 0 {
            return Some((s, e));
        }
        let grows = if s == e && s == o {
            grows_at_start || grows_at_end
        } else if o == s {
            grows_at_start
        } else if o == e {
            grows_at_end
        } else {
            s < o && o < e
        };
        if grows {
            e += i;
        } else if o <= s {
            s += i;
            e += i;
        }
        Some((s, e))
    }

    /// Translate a single offset (a zero-length range that never grows). Offsets inside a
    /// removed range collapse to the edit offset.
    pub fn translate_offset(&self, offset: usize) -> usize {
        self.translate_range(offset, offset, false, false)
            .map(|(s, _)| s)
            .unwrap_or(self.offset)
    }
}
