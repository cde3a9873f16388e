//! The document: buffer plus every layer derived from it, kept consistent by one edit pipeline.
//!
//! # Edit pipeline
//!
//! Every mutation (including undo/redo replay) runs the same ordered steps:
//!
//! 1. validation: range, read-only document, read-only markers;
//! 2. [`DocumentEvent::DocumentChanging`];
//! 3. buffer and line index update;
//! 4. marker translation;
//! 5. fold translation;
//! 6. token cache splice and re-tokenization cascade;
//! 7. undo record;
//! 8. [`DocumentEvent::DocumentChanged`], then `MarkerRemoved` / `FoldingsChanged` as needed;
//! 9. [`DocumentEvent::UpdateCommitted`] unless an update bracket is open.
//!
//! Derived layers never observe a half-applied edit: each step reads only state that earlier
//! steps already brought up to date.

use crate::change::{DocumentChange, LineChange};
use crate::error::{DocumentError, Result};
use crate::events::{DocumentEvent, DocumentEventCallback};
use crate::folding::{FoldId, FoldMarker, FoldingManager};
use crate::highlighting::{HighlightingStrategy, SpanStack, TextWord, TokenCache};
use crate::line_ending::LineEnding;
use crate::line_index::{Line, LineIndex, TextLocation};
use crate::markers::{MarkerId, MarkerStrategy, TextMarker};
use crate::options::DocumentOptions;
use crate::processing::FoldingStrategy;
use crate::text_buffer::TextBuffer;
use crate::undo::{UndoEdit, UndoStack};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, trace};

/// A text document with line index, highlighting, markers, folds and undo history.
pub struct Document {
    buffer: TextBuffer,
    tokens: TokenCache,
    markers: MarkerStrategy,
    folding: FoldingManager,
    undo: UndoStack,
    highlighting: Arc<HighlightingStrategy>,
    options: DocumentOptions,
    line_ending: LineEnding,
    callbacks: Vec<DocumentEventCallback>,
    dirty_lines: Option<(usize, usize)>,
    replaying: bool,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("length", &self.buffer.len())
            .field("line_count", &self.line_count())
            .field("highlighting", &self.highlighting.name())
            .field("markers", &self.markers.len())
            .field("folds", &self.folding.len())
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    /// A document holding `text`, highlighted with the built-in `Default` strategy.
    pub fn new(text: &str) -> Self {
        Self::with_options(text, DocumentOptions::default())
    }

    /// A document with explicit options.
    pub fn with_options(text: &str, options: DocumentOptions) -> Self {
        let mut buffer = TextBuffer::from_text(text);
        buffer.set_read_only(options.read_only);
        let mut folding = FoldingManager::new();
        folding.set_folding_enabled(options.enable_folding);
        let highlighting = Arc::new(HighlightingStrategy::default_strategy());
        let mut tokens = TokenCache::new();
        tokens.tokenize_all(&highlighting, buffer.line_index());

        Self {
            line_ending: options
                .line_terminator
                .unwrap_or_else(|| LineEnding::detect_in_text(text)),
            undo: UndoStack::new(options.max_undo_steps),
            buffer,
            tokens,
            markers: MarkerStrategy::new(),
            folding,
            highlighting,
            options,
            callbacks: Vec::new(),
            dirty_lines: None,
            replaying: false,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify(&mut self, event: DocumentEvent) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }

    // ---- text and line queries -------------------------------------------------------------

    /// The options the document was created with.
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Preferred line terminator.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Change the preferred line terminator (existing text is not rewritten).
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// The character buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// The line index.
    pub fn line_index(&self) -> &LineIndex {
        self.buffer.line_index()
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// `length` characters at `offset`.
    pub fn text_range(&self, offset: usize, length: usize) -> Result<String> {
        self.buffer.text_range(offset, length)
    }

    /// The character at `offset`.
    pub fn char_at(&self, offset: usize) -> Result<char> {
        self.buffer.char_at(offset)
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    /// A line record.
    pub fn get_line(&self, line_number: usize) -> Result<Line> {
        self.line_index().get_line(line_number)
    }

    /// Text of a line without its terminator.
    pub fn line_text(&self, line_number: usize) -> Result<String> {
        self.line_index().line_text(line_number)
    }

    /// The line containing `offset`.
    pub fn line_number_for_offset(&self, offset: usize) -> Result<usize> {
        self.line_index().line_number_for_offset(offset)
    }

    /// Offset of a location.
    pub fn position_to_offset(&self, location: TextLocation) -> Result<usize> {
        self.line_index().position_to_offset(location)
    }

    /// Location of an offset.
    pub fn offset_to_position(&self, offset: usize) -> Result<TextLocation> {
        self.line_index().offset_to_position(offset)
    }

    // ---- read-only -------------------------------------------------------------------------

    /// Whether the whole document rejects edits.
    pub fn is_read_only(&self) -> bool {
        self.buffer.is_read_only()
    }

    /// Make the whole document read-only or writable.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.buffer.set_read_only(read_only);
    }

    /// Whether inserting at `offset` would be rejected.
    pub fn is_read_only_at(&self, offset: usize) -> bool {
        self.is_read_only() || self.markers.is_read_only_at(offset)
    }

    /// Whether replacing `[offset, offset + length)` would be rejected.
    pub fn is_read_only_range(&self, offset: usize, length: usize) -> bool {
        self.is_read_only() || self.markers.is_read_only_range(offset, length)
    }

    // ---- editing ---------------------------------------------------------------------------

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.apply_edit(offset, 0, text, true).map(|_| ())
    }

    /// Remove `length` characters at `offset`; returns the removed text.
    pub fn remove(&mut self, offset: usize, length: usize) -> Result<String> {
        self.apply_edit(offset, length, "", true)
            .map(|change| change.removed_text)
    }

    /// Replace `length` characters at `offset` with `text`; returns the removed text.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<String> {
        self.apply_edit(offset, length, text, true)
            .map(|change| change.removed_text)
    }

    /// Replace the whole text. Clears the undo history.
    pub fn set_text_content(&mut self, text: &str) -> Result<()> {
        if self.is_read_only() {
            return Err(DocumentError::ReadOnlyViolation {
                offset: 0,
                length: self.len(),
            });
        }
        self.begin_update();
        let replaying = std::mem::replace(&mut self.replaying, true);
        let length = self.len();
        let result = self.apply_edit(0, length, text, false);
        self.replaying = replaying;
        if result.is_ok() {
            self.undo.clear();
            if self.options.line_terminator.is_none() {
                self.line_ending = LineEnding::detect_in_text(text);
            }
        }
        self.end_update();
        result.map(|_| ())
    }

    fn apply_edit(
        &mut self,
        offset: usize,
        length: usize,
        text: &str,
        check_markers: bool,
    ) -> Result<DocumentChange> {
        self.buffer.check_range(offset, length)?;
        if self.buffer.is_read_only()
            || (check_markers && self.markers.is_read_only_range(offset, length))
        {
            return Err(DocumentError::ReadOnlyViolation { offset, length });
        }

        self.notify(DocumentEvent::DocumentChanging {
            offset,
            length,
            text: text.to_string(),
        });

        let change = self.buffer.edit(offset, length, text)?;
        let removed_markers = self.markers.apply_change(&change);
        let folds_dropped = self
            .folding
            .apply_change(&change, self.buffer.line_index());

        self.tokens.splice(&change.lines);
        let retokenized = self.tokens.retokenize(
            &self.highlighting,
            self.buffer.line_index(),
            change.lines.start_line,
            change.lines.new_end_line,
        );
        self.mark_dirty(&change.lines, retokenized);

        if !self.replaying && !(change.removed_text.is_empty() && change.inserted_text.is_empty())
        {
            self.undo.record(UndoEdit::from(&change));
        }
        trace!(
            offset,
            removed = change.removed_len(),
            inserted = change.inserted_len(),
            start_line = change.lines.start_line,
            old_end_line = change.lines.old_end_line,
            new_end_line = change.lines.new_end_line,
            "applied edit"
        );

        self.notify(DocumentEvent::DocumentChanged {
            offset,
            removed_text: change.removed_text.clone(),
            inserted_text: change.inserted_text.clone(),
        });
        for id in removed_markers {
            self.notify(DocumentEvent::MarkerRemoved(id));
        }
        if folds_dropped {
            self.notify(DocumentEvent::FoldingsChanged);
        }
        if !self.buffer.is_in_update() {
            self.commit();
        }
        Ok(change)
    }

    /// Extend the pending dirty line range by an edit, shifting what was already pending.
    fn mark_dirty(&mut self, lines: &LineChange, retokenized: RangeInclusive<usize>) {
        let shift = |line: usize| {
            if line < lines.start_line {
                line
            } else if line <= lines.old_end_line {
                line.min(lines.new_end_line)
            } else {
                line.saturating_add_signed(lines.line_delta())
            }
        };
        let (mut first, mut last) = (*retokenized.start(), *retokenized.end());
        if let Some((old_first, old_last)) = self.dirty_lines {
            first = first.min(shift(old_first));
            last = last.max(shift(old_last));
        }
        self.dirty_lines = Some((first, last));
    }

    fn commit(&mut self) {
        let last_line = self.line_count() - 1;
        let lines = self
            .dirty_lines
            .take()
            .map(|(first, last)| first.min(last_line)..=last.min(last_line));
        self.notify(DocumentEvent::UpdateCommitted { lines });
    }

    /// Open an update bracket; notifications other than `UpdateCommitted` still fire
    /// immediately.
    pub fn begin_update(&mut self) {
        self.buffer.begin_update();
    }

    /// Close an update bracket; the outermost close emits `UpdateCommitted`.
    pub fn end_update(&mut self) {
        if self.buffer.end_update() {
            self.commit();
        }
    }

    /// Whether an update bracket is open.
    pub fn is_in_update(&self) -> bool {
        self.buffer.is_in_update()
    }

    // ---- highlighting ----------------------------------------------------------------------

    /// The active highlighting strategy.
    pub fn highlighting_strategy(&self) -> &Arc<HighlightingStrategy> {
        &self.highlighting
    }

    /// Attach a strategy and re-tokenize the whole document.
    pub fn set_highlighting_strategy(&mut self, strategy: Arc<HighlightingStrategy>) {
        debug!(
            from = self.highlighting.name(),
            to = strategy.name(),
            "switching highlighting strategy"
        );
        self.highlighting = strategy;
        let all = self
            .tokens
            .tokenize_all(&self.highlighting, self.buffer.line_index());
        self.dirty_lines = Some((*all.start(), *all.end()));
        let name = self.highlighting.name().to_string();
        self.notify(DocumentEvent::HighlightingChanged { name });
        if !self.is_in_update() {
            self.commit();
        }
    }

    /// Colored words of a line.
    pub fn line_words(&self, line_number: usize) -> Option<&[TextWord]> {
        self.tokens.words(line_number)
    }

    /// Span stack active at the end of a line.
    pub fn line_exit_state(&self, line_number: usize) -> Option<&SpanStack> {
        self.tokens.exit_state(line_number)
    }

    // ---- markers ---------------------------------------------------------------------------

    /// The marker collection.
    pub fn markers(&self) -> &MarkerStrategy {
        &self.markers
    }

    /// Add a marker; its range must lie inside the document.
    pub fn add_marker(&mut self, marker: TextMarker) -> Result<MarkerId> {
        self.buffer.check_range(marker.offset, marker.length)?;
        let id = self.markers.add_marker(marker);
        self.notify(DocumentEvent::MarkerAdded(id));
        Ok(id)
    }

    /// Remove a marker.
    pub fn remove_marker(&mut self, id: MarkerId) -> Result<TextMarker> {
        let marker = self.markers.remove_marker(id)?;
        self.notify(DocumentEvent::MarkerRemoved(id));
        Ok(marker)
    }

    /// Remove every marker matching `predicate`.
    pub fn remove_markers(&mut self, predicate: impl FnMut(&TextMarker) -> bool) -> Vec<MarkerId> {
        let removed = self.markers.remove_markers(predicate);
        for id in &removed {
            self.notify(DocumentEvent::MarkerRemoved(*id));
        }
        removed
    }

    /// The text currently covered by a marker.
    pub fn get_text_of_marker(&self, id: MarkerId) -> Result<String> {
        let marker = self
            .markers
            .get(id)
            .ok_or(DocumentError::UnknownMarker(id.0))?;
        self.text_range(marker.offset, marker.length)
    }

    // ---- folding ---------------------------------------------------------------------------

    /// The fold collection.
    pub fn folding(&self) -> &FoldingManager {
        &self.folding
    }

    /// Replace the fold set, keeping the state of folds whose range is unchanged.
    pub fn update_foldings(&mut self, markers: Vec<FoldMarker>) -> Result<Vec<FoldId>> {
        let (ids, changed) = self
            .folding
            .update_foldings(markers, self.buffer.line_index())?;
        if changed {
            self.notify(DocumentEvent::FoldingsChanged);
        }
        Ok(ids)
    }

    /// Recompute folds with a folding strategy.
    pub fn update_folding_from<S>(&mut self, strategy: &mut S) -> Result<Vec<FoldId>>
    where
        S: FoldingStrategy + ?Sized,
    {
        let markers = strategy.generate_fold_markers(self);
        self.update_foldings(markers)
    }

    /// Collapse or expand a fold.
    pub fn set_folded(&mut self, id: FoldId, folded: bool) -> Result<()> {
        if self.folding.set_folded(id, folded)? {
            self.notify(DocumentEvent::FoldingsChanged);
        }
        Ok(())
    }

    /// Flip a fold; returns its new state.
    pub fn toggle_fold(&mut self, id: FoldId) -> Result<bool> {
        let folded = self.folding.toggle(id)?;
        self.notify(DocumentEvent::FoldingsChanged);
        Ok(folded)
    }

    /// Collapse every fold.
    pub fn fold_all(&mut self) {
        if self.folding.fold_all() {
            self.notify(DocumentEvent::FoldingsChanged);
        }
    }

    /// Expand every fold.
    pub fn unfold_all(&mut self) {
        if self.folding.unfold_all() {
            self.notify(DocumentEvent::FoldingsChanged);
        }
    }

    /// Expand the folds hiding a position (caret moved into a folded region).
    pub fn unfold_at(&mut self, location: TextLocation) -> Vec<FoldId> {
        let ids = self.folding.unfold_at(location.line, location.column);
        if !ids.is_empty() {
            self.notify(DocumentEvent::FoldsExpanded(ids.clone()));
            self.notify(DocumentEvent::FoldingsChanged);
        }
        ids
    }

    // ---- undo ------------------------------------------------------------------------------

    /// Open an undo group; nested groups collapse into the outermost one.
    pub fn start_undo_group(&mut self) {
        self.undo.start_group();
    }

    /// Close an undo group.
    pub fn end_undo_group(&mut self) {
        self.undo.end_group();
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Forget the undo history.
    pub fn clear_undo(&mut self) {
        self.undo.clear();
    }

    /// Revert the most recent undo group.
    pub fn undo(&mut self) -> Result<()> {
        if self.is_read_only() {
            return Err(DocumentError::ReadOnlyViolation {
                offset: 0,
                length: 0,
            });
        }
        let group = self.undo.pop_undo().ok_or(DocumentError::NothingToUndo)?;
        let result = self.replay(group.edits.iter().rev().map(|edit| {
            (
                edit.offset,
                edit.inserted_text.chars().count(),
                edit.removed_text.as_str(),
            )
        }));
        self.undo.push_redo(group);
        result
    }

    /// Re-apply the most recently undone group.
    pub fn redo(&mut self) -> Result<()> {
        if self.is_read_only() {
            return Err(DocumentError::ReadOnlyViolation {
                offset: 0,
                length: 0,
            });
        }
        let group = self.undo.pop_redo().ok_or(DocumentError::NothingToRedo)?;
        let result = self.replay(group.edits.iter().map(|edit| {
            (
                edit.offset,
                edit.removed_text.chars().count(),
                edit.inserted_text.as_str(),
            )
        }));
        self.undo.push_undo(group);
        result
    }

    fn replay<'a>(&mut self, edits: impl Iterator<Item = (usize, usize, &'a str)>) -> Result<()> {
        self.begin_update();
        let replaying = std::mem::replace(&mut self.replaying, true);
        let mut result = Ok(());
        for (offset, length, text) in edits {
            if let Err(err) = self.apply_edit(offset, length, text, false) {
                result = Err(err);
                break;
            }
        }
        self.replaying = replaying;
        self.end_update();
        result
    }
}
