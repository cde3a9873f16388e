//! Fold producers.
//!
//! A [`FoldingStrategy`] inspects a document and proposes its complete fold set. The document
//! merges the proposal through [`Document::update_folding_from`], which keeps the collapsed
//! state of folds whose range did not change.

use crate::document::Document;
use crate::folding::FoldMarker;

/// Produces fold markers for a document.
pub trait FoldingStrategy {
    /// Compute the complete fold set for `document`.
    ///
    /// Implementations read the document and return markers; they must not assume any
    /// particular order, the folding manager sorts them.
    fn generate_fold_markers(&mut self, document: &Document) -> Vec<FoldMarker>;
}

/// Folds every block of lines indented deeper than the line introducing it.
///
/// A fold runs from the end of the introducing line to the end of the last deeper line; blank
/// lines never open or close a block.
#[derive(Debug, Clone)]
pub struct IndentFoldingStrategy {
    /// Width of a tab when measuring indentation.
    pub tab_size: usize,
}

impl Default for IndentFoldingStrategy {
    fn default() -> Self {
        Self { tab_size: 4 }
    }
}

impl IndentFoldingStrategy {
    fn indentation(&self, line: &str) -> usize {
        line.chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { self.tab_size } else { 1 })
            .sum()
    }
}

impl FoldingStrategy for IndentFoldingStrategy {
    fn generate_fold_markers(&mut self, document: &Document) -> Vec<FoldMarker> {
        // (indentation, line, length) of the lines that may still open a block
        let mut open: Vec<(usize, usize, usize)> = Vec::new();
        let mut last: Option<(usize, usize)> = None;
        let mut folds = Vec::new();

        let mut close = |open_line: (usize, usize, usize), last: Option<(usize, usize)>| {
            let (_, start_line, start_column) = open_line;
            if let Some((end_line, end_column)) = last
                && end_line > start_line
            {
                folds.push(FoldMarker::new(start_line, start_column, end_line, end_column));
            }
        };

        for line in document.line_index().lines() {
            let Ok(text) = document.line_text(line.line_number) else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }
            let indent = self.indentation(&text);
            while let Some(&top) = open.last() {
                if indent > top.0 {
                    break;
                }
                open.pop();
                close(top, last);
            }
            open.push((indent, line.line_number, line.length));
            last = Some((line.line_number, line.length));
        }
        while let Some(top) = open.pop() {
            close(top, last);
        }

        folds.sort_by_key(|f: &FoldMarker| (f.start(), f.end()));
        folds
    }
}
