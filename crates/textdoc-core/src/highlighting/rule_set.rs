//! Keyword tables, delimiters and nested spans.

use super::color::HighlightColor;
use super::span::Span;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A word that recolors its neighbour: the previous word (`MarkPrevious`, e.g. `(` marks a
/// method name) or the following word (`MarkFollowing`, e.g. `class` marks a type name).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkWord {
    /// The trigger word.
    pub word: String,
    /// Color applied to the marked word.
    pub color: HighlightColor,
    /// Also color the trigger word itself.
    pub mark_marker: bool,
}

impl MarkWord {
    /// A trigger word.
    pub fn new(word: impl Into<String>, color: HighlightColor) -> Self {
        Self {
            word: word.into(),
            color,
            mark_marker: false,
        }
    }
}

/// One rule set of a grammar. The unnamed rule set is the default; named rule sets are entered
/// through spans whose `rule` names them.
#[derive(Debug, Clone, Default)]
pub struct HighlightRuleSet {
    /// Rule set name; `None` for the default rule set.
    pub name: Option<String>,
    /// Case-insensitive keyword lookup.
    pub ignore_case: bool,
    /// Default escape character for spans that do not declare one.
    pub escape_character: Option<char>,
    delimiters: HashSet<char>,
    keywords: HashMap<String, HighlightColor>,
    pub(crate) spans: Vec<Arc<Span>>,
    pub(crate) mark_previous: Vec<MarkWord>,
    pub(crate) mark_following: Vec<MarkWord>,
}

impl HighlightRuleSet {
    /// An empty rule set.
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Replace the delimiter characters.
    pub fn set_delimiters(&mut self, delimiters: impl IntoIterator<Item = char>) {
        self.delimiters = delimiters.into_iter().collect();
    }

    /// Whether `ch` separates words.
    pub fn is_delimiter(&self, ch: char) -> bool {
        self.delimiters.contains(&ch)
    }

    /// Add a keyword with its color. Respects `ignore_case` as set at the time of the call.
    pub fn add_keyword(&mut self, word: &str, color: HighlightColor) {
        let key = if self.ignore_case {
            word.to_lowercase()
        } else {
            word.to_string()
        };
        self.keywords.insert(key, color);
    }

    /// Color of a keyword.
    pub fn keyword_color(&self, word: &str) -> Option<HighlightColor> {
        if self.ignore_case {
            self.keywords.get(&word.to_lowercase()).copied()
        } else {
            self.keywords.get(word).copied()
        }
    }

    /// Number of keywords.
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Add a nested span.
    pub fn add_span(&mut self, span: Span) {
        self.spans.push(Arc::new(span));
    }

    /// Spans that may begin inside this rule set.
    pub fn spans(&self) -> &[Arc<Span>] {
        &self.spans
    }

    /// Add a mark-previous rule.
    pub fn add_mark_previous(&mut self, mark: MarkWord) {
        self.mark_previous.push(mark);
    }

    /// Add a mark-following rule.
    pub fn add_mark_following(&mut self, mark: MarkWord) {
        self.mark_following.push(mark);
    }
}
