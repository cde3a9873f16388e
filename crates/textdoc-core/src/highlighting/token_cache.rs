//! Per-line token cache with incremental re-tokenization.
//!
//! Line `k` stores its words and its exit span stack; the entry stack of line `k` is the exit
//! stack of line `k - 1`. After an edit the replaced line run is re-tokenized, and re-tokenization
//! continues past the run for as long as a line's exit stack differs from what was cached.

use super::span_stack::SpanStack;
use super::strategy::HighlightingStrategy;
use super::word::TextWord;
use crate::change::LineChange;
use crate::line_index::LineIndex;
use std::ops::RangeInclusive;
use tracing::trace;

/// Cached tokenizer output of one line.
#[derive(Debug, Clone)]
pub struct LineTokens {
    /// Colored words.
    pub words: Vec<TextWord>,
    /// Span stack active after the line.
    pub exit: SpanStack,
}

/// Token cache of a whole document.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    lines: Vec<Option<LineTokens>>,
}

impl TokenCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of line slots.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cache has no slots.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cached words of a line.
    pub fn words(&self, line: usize) -> Option<&[TextWord]> {
        self.lines.get(line)?.as_ref().map(|t| t.words.as_slice())
    }

    /// Cached exit stack of a line.
    pub fn exit_state(&self, line: usize) -> Option<&SpanStack> {
        self.lines.get(line)?.as_ref().map(|t| &t.exit)
    }

    /// Entry stack of a line (the exit stack of the previous line).
    pub fn entry_state(&self, line: usize) -> SpanStack {
        line.checked_sub(1)
            .and_then(|previous| self.exit_state(previous))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the slots of the old line run with slots for the new run.
    ///
    /// The last new slot keeps the old run's last entry, so the cascade can tell whether the
    /// exit state flowing into the following line changed.
    pub fn splice(&mut self, change: &LineChange) {
        let old_end = change.old_end_line.min(self.lines.len().saturating_sub(1));
        if change.start_line >= self.lines.len() {
            self.lines
                .resize(change.start_line + change.new_line_count(), None);
            return;
        }
        let last = self.lines[old_end].take();
        let mut replacement = vec![None; change.new_line_count() - 1];
        replacement.push(last);
        self.lines.splice(change.start_line..=old_end, replacement);
    }

    /// Drop everything and tokenize the whole document.
    pub fn tokenize_all(
        &mut self,
        strategy: &HighlightingStrategy,
        index: &LineIndex,
    ) -> RangeInclusive<usize> {
        self.lines = vec![None; index.line_count()];
        self.retokenize(strategy, index, 0, index.line_count() - 1)
    }

    /// Re-tokenize lines `first..=last`, then continue while exit states change.
    ///
    /// Returns the range of lines that were re-tokenized.
    pub fn retokenize(
        &mut self,
        strategy: &HighlightingStrategy,
        index: &LineIndex,
        first: usize,
        last: usize,
    ) -> RangeInclusive<usize> {
        let line_count = index.line_count();
        debug_assert_eq!(self.lines.len(), line_count, "token cache out of sync");
        self.lines.resize(line_count, None);

        let mut entry = self.entry_state(first);
        let mut line = first;
        while line < line_count {
            let Ok(text) = index.line_text(line) else {
                break;
            };
            let (words, mut exit) = strategy.tokenize_line(&entry, &text);
            let changed = match &self.lines[line] {
                Some(old) if old.exit.same_state(&exit) => false,
                Some(old) if old.exit.spans_eq(&exit) => {
                    exit = old.exit.clone();
                    false
                }
                _ => true,
            };
            self.lines[line] = Some(LineTokens {
                words,
                exit: exit.clone(),
            });
            entry = exit;
            if line >= last && !changed {
                break;
            }
            line += 1;
        }

        let done = line.min(line_count - 1);
        trace!(
            first,
            last = done,
            cascade = done.saturating_sub(last),
            "re-tokenized lines"
        );
        first..=done
    }
}
