//! Code folding.
//!
//! Fold markers may nest or overlap arbitrarily. The manager keeps them in a vector sorted by
//! `(start_line, start_column)`; queries binary-search the start line and scan from there, which
//! is plenty for the tens to hundreds of folds a document carries.
//!
//! Each fold also remembers its char-offset range so it survives edits the same way text markers
//! do; its line/column pair is recomputed from the line index after every edit.

use crate::change::DocumentChange;
use crate::error::{DocumentError, Result};
use crate::line_index::{LineIndex, TextLocation};
use std::fmt;
use tracing::trace;

/// Handle of a fold marker. Identity is by handle, not by range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoldId(pub u64);

impl fmt::Display for FoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a fold covers; hosts use it for "fold all methods" style commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FoldType {
    /// No particular kind.
    #[default]
    Unspecified,
    /// Body of a method or property.
    MemberBody,
    /// A `#region`-style user region.
    Region,
    /// Body of a type.
    TypeBody,
}

/// A collapsible region from `(start_line, start_column)` to `(end_line, end_column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldMarker {
    /// Start line.
    pub start_line: usize,
    /// Start column.
    pub start_column: usize,
    /// End line.
    pub end_line: usize,
    /// End column.
    pub end_column: usize,
    /// Whether the region is collapsed.
    pub is_folded: bool,
    /// Placeholder text shown when collapsed.
    pub fold_text: String,
    /// Kind of region.
    pub fold_type: FoldType,
}

impl FoldMarker {
    /// An unfolded marker with the `...` placeholder.
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            is_folded: false,
            fold_text: "...".to_string(),
            fold_type: FoldType::Unspecified,
        }
    }

    /// Same marker, collapsed.
    pub fn folded(mut self) -> Self {
        self.is_folded = true;
        self
    }

    /// Start position.
    pub fn start(&self) -> TextLocation {
        TextLocation::new(self.start_line, self.start_column)
    }

    /// End position.
    pub fn end(&self) -> TextLocation {
        TextLocation::new(self.end_line, self.end_column)
    }

    fn same_range(&self, other: &FoldMarker) -> bool {
        self.start() == other.start() && self.end() == other.end()
    }
}

#[derive(Debug, Clone)]
struct FoldEntry {
    id: FoldId,
    marker: FoldMarker,
    start: usize,
    end: usize,
}

/// The fold collection of a document.
#[derive(Debug, Clone)]
pub struct FoldingManager {
    entries: Vec<FoldEntry>,
    next_id: u64,
    enabled: bool,
}

impl Default for FoldingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldingManager {
    /// An empty manager with folding enabled.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            enabled: true,
        }
    }

    /// Whether folding is enabled. A disabled manager hides nothing.
    pub fn is_folding_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable folding.
    pub fn set_folding_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn sort(&mut self) {
        self.entries
            .sort_by_key(|e| (e.marker.start(), e.marker.end(), e.id));
    }

    /// Replace the whole fold set.
    ///
    /// A new marker whose full range equals an existing one takes over that fold's handle and
    /// `is_folded` flag. Returns the handles in input order and whether the set changed.
    pub fn update_foldings(
        &mut self,
        new_markers: Vec<FoldMarker>,
        index: &LineIndex,
    ) -> Result<(Vec<FoldId>, bool)> {
        let mut resolved = Vec::with_capacity(new_markers.len());
        for marker in new_markers {
            let start = index.position_to_offset(marker.start())?;
            let end = index.position_to_offset(marker.end())?;
            resolved.push((marker, start, end));
        }

        let mut old = std::mem::take(&mut self.entries);
        let before: Vec<(TextLocation, TextLocation, bool)> = old
            .iter()
            .map(|e| (e.marker.start(), e.marker.end(), e.marker.is_folded))
            .collect();

        let mut ids = Vec::with_capacity(resolved.len());
        let mut entries = Vec::with_capacity(resolved.len());
        for (mut marker, start, end) in resolved {
            let id = match old.iter().position(|e| e.marker.same_range(&marker)) {
                Some(pos) => {
                    let existing = old.swap_remove(pos);
                    marker.is_folded = existing.marker.is_folded;
                    existing.id
                }
                None => {
                    let id = FoldId(self.next_id);
                    self.next_id += 1;
                    id
                }
            };
            ids.push(id);
            entries.push(FoldEntry {
                id,
                marker,
                start,
                end,
            });
        }
        self.entries = entries;
        self.sort();

        let mut before = before;
        before.sort();
        let mut after: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.marker.start(), e.marker.end(), e.marker.is_folded))
            .collect();
        after.sort();
        let changed = before != after;
        trace!(count = ids.len(), changed, "updated foldings");
        Ok((ids, changed))
    }

    /// Translate every fold through an applied edit and recompute line/column pairs from the
    /// post-edit `index`. Returns `true` if a fold was dropped.
    pub fn apply_change(&mut self, change: &DocumentChange, index: &LineIndex) -> bool {
        let count = self.entries.len();
        self.entries.retain_mut(|entry| {
            let Some((start, end)) = change.translate_range(entry.start, entry.end, false, false)
            else {
                return false;
            };
            let (Ok(start_pos), Ok(end_pos)) =
                (index.offset_to_position(start), index.offset_to_position(end))
            else {
                return false;
            };
            entry.start = start;
            entry.end = end;
            entry.marker.start_line = start_pos.line;
            entry.marker.start_column = start_pos.column;
            entry.marker.end_line = end_pos.line;
            entry.marker.end_column = end_pos.column;
            true
        });
        self.sort();
        self.entries.len() != count
    }

    /// Remove every fold.
    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Look up a fold.
    pub fn get(&self, id: FoldId) -> Option<&FoldMarker> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.marker)
    }

    /// All folds in `(start_line, start_column)` order.
    pub fn iter(&self) -> impl Iterator<Item = (FoldId, &FoldMarker)> {
        self.entries.iter().map(|e| (e.id, &e.marker))
    }

    /// Number of folds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no folds.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse or expand a fold; returns whether its state changed.
    pub fn set_folded(&mut self, id: FoldId, folded: bool) -> Result<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DocumentError::UnknownFold(id.0))?;
        let changed = entry.marker.is_folded != folded;
        entry.marker.is_folded = folded;
        Ok(changed)
    }

    /// Flip a fold's state; returns the new state.
    pub fn toggle(&mut self, id: FoldId) -> Result<bool> {
        let folded = !self
            .get(id)
            .ok_or(DocumentError::UnknownFold(id.0))?
            .is_folded;
        self.set_folded(id, folded)?;
        Ok(folded)
    }

    fn set_all(&mut self, folded: bool) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            changed |= entry.marker.is_folded != folded;
            entry.marker.is_folded = folded;
        }
        changed
    }

    /// Collapse every fold.
    pub fn fold_all(&mut self) -> bool {
        self.set_all(true)
    }

    /// Expand every fold.
    pub fn unfold_all(&mut self) -> bool {
        self.set_all(false)
    }

    /// Expand the folded regions containing a position (caret entering a fold). Returns the
    /// handles that were expanded.
    pub fn unfold_at(&mut self, line: usize, column: usize) -> Vec<FoldId> {
        let ids: Vec<FoldId> = self
            .foldings_from_position(line, column)
            .into_iter()
            .filter(|(_, m)| m.is_folded)
            .map(|(id, _)| id)
            .collect();
        for entry in &mut self.entries {
            if ids.contains(&entry.id) {
                entry.marker.is_folded = false;
            }
        }
        ids
    }

    fn start_line_window(&self, line: usize) -> &[FoldEntry] {
        let from = self.entries.partition_point(|e| e.marker.start_line < line);
        let to = self.entries.partition_point(|e| e.marker.start_line <= line);
        &self.entries[from..to]
    }

    /// Folds starting on `line`.
    pub fn foldings_with_start(&self, line: usize) -> Vec<(FoldId, &FoldMarker)> {
        self.start_line_window(line)
            .iter()
            .map(|e| (e.id, &e.marker))
            .collect()
    }

    /// Folded folds starting on `line` at a column strictly greater than `column`.
    pub fn folded_foldings_with_start_after_column(
        &self,
        line: usize,
        column: usize,
    ) -> Vec<(FoldId, &FoldMarker)> {
        self.start_line_window(line)
            .iter()
            .filter(|e| e.marker.is_folded && e.marker.start_column > column)
            .map(|e| (e.id, &e.marker))
            .collect()
    }

    /// Folds strictly spanning `line` (`start_line < line < end_line`).
    pub fn foldings_containing_line(&self, line: usize) -> Vec<(FoldId, &FoldMarker)> {
        let candidates = self.entries.partition_point(|e| e.marker.start_line < line);
        self.entries[..candidates]
            .iter()
            .filter(|e| e.marker.end_line > line)
            .map(|e| (e.id, &e.marker))
            .collect()
    }

    /// Folds containing the position strictly after their start and strictly before their end.
    pub fn foldings_from_position(&self, line: usize, column: usize) -> Vec<(FoldId, &FoldMarker)> {
        let position = TextLocation::new(line, column);
        let candidates = self.entries.partition_point(|e| e.marker.start_line <= line);
        self.entries[..candidates]
            .iter()
            .filter(|e| e.marker.start() < position && position < e.marker.end())
            .map(|e| (e.id, &e.marker))
            .collect()
    }

    /// Whether `line` is shown: false iff a folded fold strictly spans it.
    pub fn is_line_visible(&self, line: usize) -> bool {
        !self.enabled
            || !self
                .foldings_containing_line(line)
                .iter()
                .any(|(_, m)| m.is_folded)
    }

    /// Folded folds not nested in an earlier folded fold, in start order.
    pub fn top_level_folded_foldings(&self) -> Vec<(FoldId, &FoldMarker)> {
        let mut end = TextLocation::new(0, 0);
        let mut result = Vec::new();
        for entry in self.entries.iter().filter(|e| e.marker.is_folded) {
            if entry.marker.start() >= end {
                result.push((entry.id, &entry.marker));
                end = entry.marker.end();
            }
        }
        result
    }

    /// Screen row of a logical line. Lines hidden by a fold map to the fold's start row; the end
    /// line of a fold shares the row of its start line.
    pub fn visible_line(&self, logical_line: usize) -> usize {
        if !self.enabled {
            return logical_line;
        }
        let mut visible = 0;
        let mut fold_end = 0;
        for (_, fold) in self.top_level_folded_foldings() {
            if fold.start_line >= logical_line {
                break;
            }
            if fold.start_line >= fold_end {
                visible += fold.start_line - fold_end;
                if fold.end_line > logical_line {
                    return visible;
                }
                fold_end = fold.end_line;
            }
        }
        visible + logical_line - fold_end
    }

    /// First logical line shown on a screen row.
    pub fn first_logical_line(&self, visible_line: usize) -> usize {
        if !self.enabled {
            return visible_line;
        }
        let mut visible = 0;
        let mut fold_end = 0;
        for (_, fold) in self.top_level_folded_foldings() {
            if fold.start_line >= fold_end {
                if visible + fold.start_line - fold_end >= visible_line {
                    break;
                }
                visible += fold.start_line - fold_end;
                fold_end = fold.end_line;
            }
        }
        visible_line - visible + fold_end
    }

    /// Number of screen rows for a document of `total_lines` logical lines.
    pub fn visible_line_count(&self, total_lines: usize) -> usize {
        match total_lines {
            0 => 0,
            n => self.visible_line(n - 1) + 1,
        }
    }
}
