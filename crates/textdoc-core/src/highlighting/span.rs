//! Multi-line lexical regions.

use super::color::HighlightColor;

/// A grammar rule for a region delimited by begin/end sequences (block comment, string, embedded
/// script). Spans are immutable once their strategy is built and are shared as `Arc<Span>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    /// Span name (for diagnostics and hosts).
    pub name: String,
    /// Begin sequence.
    pub begin: String,
    /// End sequence; an empty end closes the span at end of line.
    pub end: String,
    /// Color of the span interior.
    pub color: HighlightColor,
    /// Color of the begin sequence (defaults to `color`).
    pub begin_color: Option<HighlightColor>,
    /// Color of the end sequence (defaults to `color`).
    pub end_color: Option<HighlightColor>,
    /// Escape character inside the span.
    pub escape_character: Option<char>,
    /// Case-insensitive begin/end matching.
    pub ignore_case: bool,
    /// The begin sequence must stand as a separate word.
    pub begin_single_word: bool,
    /// The begin sequence must be preceded only by whitespace on its line.
    pub begin_start_of_line: bool,
    /// The end sequence must stand as a separate word.
    pub end_single_word: bool,
    /// The span closes at end of line even if its end sequence was not found.
    pub stop_at_eol: bool,
    /// Name of the rule set active inside the span; `None` means only the end is searched.
    pub rule: Option<String>,
    pub(crate) rule_set: Option<usize>,
}

impl Span {
    /// A span with the given begin/end sequences and interior color.
    pub fn new(
        name: impl Into<String>,
        begin: impl Into<String>,
        end: impl Into<String>,
        color: HighlightColor,
    ) -> Self {
        let end = end.into();
        Self {
            name: name.into(),
            begin: begin.into(),
            stop_at_eol: end.is_empty(),
            end,
            color,
            ..Self::default()
        }
    }

    /// Close the span at end of line.
    pub fn stop_at_eol(mut self) -> Self {
        self.stop_at_eol = true;
        self
    }

    /// Use `rule` as the rule set inside the span.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Set the escape character.
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape_character = Some(escape);
        self
    }

    /// Index of the resolved inner rule set.
    pub fn rule_set_index(&self) -> Option<usize> {
        self.rule_set
    }

    pub(crate) fn begin_color(&self) -> HighlightColor {
        self.begin_color.unwrap_or(self.color)
    }

    pub(crate) fn end_color(&self) -> HighlightColor {
        self.end_color.unwrap_or(self.color)
    }

    /// Whether the end sequence begins with the escape character (`""` inside `@"..."`).
    pub(crate) fn end_starts_with_escape(&self) -> bool {
        match (self.escape_character, self.end.chars().next()) {
            (Some(escape), Some(first)) => escape == first,
            _ => false,
        }
    }
}
