//! Highlighting strategies and the line tokenizer.
//!
//! A [`HighlightingStrategy`] is an immutable, fully resolved grammar. It is shared between
//! documents as `Arc<HighlightingStrategy>` and turns `(entry span stack, line text)` into colored
//! words plus the exit span stack (see [`HighlightingStrategy::tokenize_line`]).

use super::color::{Color, HighlightColor};
use super::rule_set::HighlightRuleSet;
use super::span::Span;
use super::span_stack::SpanStack;
use super::word::{TextWord, WordKind};
use crate::error::{DocumentError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Name of the built-in fallback strategy.
pub const DEFAULT_STRATEGY_NAME: &str = "Default";

const DEFAULT_DELIMITERS: &str = "&<>~!%^*()-+=|\\#/{}[]:;\"' ,\t.?";

/// A resolved grammar.
#[derive(Debug, Clone)]
pub struct HighlightingStrategy {
    name: String,
    extensions: Vec<String>,
    properties: HashMap<String, String>,
    rule_sets: Vec<HighlightRuleSet>,
    default_color: HighlightColor,
    digit_color: Option<HighlightColor>,
    environment: HashMap<String, HighlightColor>,
}

impl HighlightingStrategy {
    /// The built-in `Default` strategy: one rule set, common delimiters, no keywords or spans.
    pub fn default_strategy() -> Self {
        let mut rule_set = HighlightRuleSet::new(None);
        rule_set.set_delimiters(DEFAULT_DELIMITERS.chars());
        Self {
            name: DEFAULT_STRATEGY_NAME.to_string(),
            extensions: Vec::new(),
            properties: HashMap::new(),
            rule_sets: vec![rule_set],
            default_color: HighlightColor::new(Color::BLACK),
            digit_color: None,
            environment: HashMap::new(),
        }
    }

    /// Grammar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File extensions (with leading dot) the grammar claims.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Free-form grammar properties (e.g. `LineComment`).
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// All rule sets; index 0 is the default rule set.
    pub fn rule_sets(&self) -> &[HighlightRuleSet] {
        &self.rule_sets
    }

    /// Look up a rule set by name.
    pub fn find_rule_set(&self, name: &str) -> Option<&HighlightRuleSet> {
        self.rule_sets
            .iter()
            .find(|set| set.name.as_deref() == Some(name))
    }

    /// Color of plain text.
    pub fn default_color(&self) -> HighlightColor {
        self.default_color
    }

    /// Color of numeric literals, if the grammar defines one.
    pub fn digit_color(&self) -> Option<HighlightColor> {
        self.digit_color
    }

    /// Environment color for host rendering (`Default`, `Selection`, `FoldLine`, ...).
    pub fn get_color_for(&self, name: &str) -> Option<HighlightColor> {
        match self.environment.get(name) {
            Some(color) => Some(*color),
            None if name == DEFAULT_STRATEGY_NAME => Some(self.default_color),
            None => None,
        }
    }

    fn active_rule_set(&self, stack: &SpanStack) -> Option<&HighlightRuleSet> {
        match stack.peek() {
            None => self.rule_sets.first(),
            Some(span) => span.rule_set.and_then(|index| self.rule_sets.get(index)),
        }
    }

    fn word_color(&self, stack: &SpanStack, word: &str) -> HighlightColor {
        let rule_set = self.active_rule_set(stack);
        if let Some(color) = rule_set.and_then(|set| set.keyword_color(word)) {
            return color;
        }
        let top = stack.peek();
        if let Some(span) = top.filter(|span| span.rule_set.is_none()) {
            return span.color;
        }
        if let Some(digit) = self.digit_color.filter(|_| is_number(word)) {
            return digit;
        }
        top.map_or(self.default_color, |span| span.color)
    }

    /// Tokenize one line.
    ///
    /// `entry` is the span stack active at the start of the line (the exit stack of the previous
    /// line). Returns the line's words and the stack active after its last character, with
    /// spans that stop at end of line already closed.
    pub fn tokenize_line(&self, entry: &SpanStack, line: &str) -> (Vec<TextWord>, SpanStack) {
        let mut scanner = LineScanner {
            strategy: self,
            chars: line.chars().collect(),
            stack: entry.clone(),
            words: Vec::new(),
            word_start: 0,
            pending_following: None,
            at_line_start: true,
        };
        scanner.run();
        (scanner.words, scanner.stack)
    }
}

/// Builder that collects rule sets and resolves span references on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct HighlightingStrategyBuilder {
    name: String,
    extensions: Vec<String>,
    properties: HashMap<String, String>,
    rule_sets: Vec<HighlightRuleSet>,
    default_color: HighlightColor,
    digit_color: Option<HighlightColor>,
    environment: HashMap<String, HighlightColor>,
}

impl HighlightingStrategyBuilder {
    /// Start a grammar named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the claimed file extensions.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Add a grammar property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the color of plain text.
    pub fn default_color(mut self, color: HighlightColor) -> Self {
        self.default_color = color;
        self
    }

    /// Set the color of numeric literals.
    pub fn digit_color(mut self, color: HighlightColor) -> Self {
        self.digit_color = Some(color);
        self
    }

    /// Add an environment color.
    pub fn environment_color(mut self, name: impl Into<String>, color: HighlightColor) -> Self {
        self.environment.insert(name.into(), color);
        self
    }

    /// Add a rule set. Rule sets may reference each other in any order.
    pub fn add_rule_set(mut self, rule_set: HighlightRuleSet) -> Self {
        self.rule_sets.push(rule_set);
        self
    }

    /// Resolve references and produce the strategy.
    ///
    /// Fails with `HighlightingDefinitionInvalid` on a missing or duplicated default rule set, a
    /// duplicated rule-set name, or a span whose `rule` names no rule set.
    pub fn build(self) -> Result<HighlightingStrategy> {
        let invalid = |message: String| DocumentError::HighlightingDefinitionInvalid(message);

        let mut defaults = self.rule_sets.iter().filter(|set| set.name.is_none());
        let default_index = match (defaults.next(), defaults.next()) {
            (Some(_), None) => self
                .rule_sets
                .iter()
                .position(|set| set.name.is_none())
                .unwrap_or_default(),
            (None, _) => {
                return Err(invalid(format!("{}: no default rule set", self.name)));
            }
            (Some(_), Some(_)) => {
                return Err(invalid(format!(
                    "{}: more than one default rule set",
                    self.name
                )));
            }
        };

        let mut rule_sets = self.rule_sets;
        let default = rule_sets.remove(default_index);
        rule_sets.insert(0, default);

        let mut indices = HashMap::new();
        for (index, set) in rule_sets.iter().enumerate() {
            if let Some(name) = &set.name
                && indices.insert(name.clone(), index).is_some()
            {
                return Err(invalid(format!(
                    "{}: duplicate rule set '{name}'",
                    self.name
                )));
            }
        }

        for set in &mut rule_sets {
            let escape = set.escape_character;
            let mut resolved = Vec::with_capacity(set.spans.len());
            for span in &set.spans {
                let rule_set = match &span.rule {
                    None => None,
                    Some(rule) => Some(*indices.get(rule).ok_or_else(|| {
                        invalid(format!(
                            "{}: span '{}' references unknown rule set '{rule}'",
                            self.name, span.name
                        ))
                    })?),
                };
                resolved.push(Arc::new(Span {
                    rule_set,
                    escape_character: span.escape_character.or(escape),
                    ..Span::clone(span)
                }));
            }
            set.spans = resolved;
        }

        Ok(HighlightingStrategy {
            name: self.name,
            extensions: self.extensions,
            properties: self.properties,
            rule_sets,
            default_color: self.default_color,
            digit_color: self.digit_color,
            environment: self.environment,
        })
    }
}

struct LineScanner<'a> {
    strategy: &'a HighlightingStrategy,
    chars: Vec<char>,
    stack: SpanStack,
    words: Vec<TextWord>,
    word_start: usize,
    pending_following: Option<HighlightColor>,
    /// Only whitespace has been consumed so far.
    at_line_start: bool,
}

impl LineScanner<'_> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.chars.len() {
            let next = self.step(i);
            if self.at_line_start && !self.chars[i..next].iter().all(|c| c.is_whitespace()) {
                self.at_line_start = false;
            }
            i = next;
        }
        self.flush(self.chars.len());

        while self.stack.peek().is_some_and(|span| span.stop_at_eol) {
            self.pop_span();
        }
    }

    /// Scan at `i`; returns the next position.
    fn step(&mut self, i: usize) -> usize {
        let ch = self.chars[i];
        if ch == ' ' || ch == '\t' {
            self.flush(i);
            let kind = if ch == ' ' {
                WordKind::Space
            } else {
                WordKind::Tab
            };
            self.words.push(TextWord {
                offset: i,
                length: 1,
                color: self.strategy.default_color,
                kind,
            });
            self.word_start = i + 1;
            return i + 1;
        }

        if let Some(span) = self.stack.peek().cloned() {
            if span.escape_character == Some(ch) {
                let doubled = self.chars.get(i + 1) == Some(&ch);
                if !span.end_starts_with_escape() {
                    return (i + 2).min(self.chars.len());
                }
                if doubled {
                    return i + 2;
                }
            }
            if !span.end.is_empty()
                && self.matches_at(i, &span.end, span.ignore_case)
                && (!span.end_single_word || self.is_single_word(i, span.end.chars().count()))
            {
                let len = span.end.chars().count();
                self.flush(i);
                self.emit(i, len, span.end_color());
                self.pop_span();
                self.word_start = i + len;
                return i + len;
            }
        }

        let strategy = self.strategy;
        let Some(rule_set) = strategy.active_rule_set(&self.stack) else {
            return i + 1;
        };

        let begin = rule_set.spans.iter().find(|span| {
            let len = span.begin.chars().count();
            len > 0
                && self.matches_at(i, &span.begin, span.ignore_case)
                && (!span.begin_single_word || self.is_single_word(i, len))
                && (!span.begin_start_of_line || self.at_line_start)
        });
        if let Some(span) = begin.cloned() {
            let len = span.begin.chars().count();
            self.flush(i);
            self.emit(i, len, span.begin_color());
            self.stack.push(span);
            self.word_start = i + len;
            return i + len;
        }

        if rule_set.is_delimiter(ch) {
            self.flush(i);
            let color = self.colorize(i, i + 1);
            self.emit(i, 1, color);
            self.word_start = i + 1;
        }
        i + 1
    }

    fn matches_at(&self, i: usize, pattern: &str, ignore_case: bool) -> bool {
        let mut pos = i;
        for expected in pattern.chars() {
            let Some(&actual) = self.chars.get(pos) else {
                return false;
            };
            let equal = if ignore_case {
                actual.to_lowercase().eq(expected.to_lowercase())
            } else {
                actual == expected
            };
            if !equal {
                return false;
            }
            pos += 1;
        }
        true
    }

    fn is_single_word(&self, i: usize, len: usize) -> bool {
        let is_word_char = |c: &char| c.is_alphanumeric() || *c == '_';
        let before = i.checked_sub(1).and_then(|p| self.chars.get(p));
        let after = self.chars.get(i + len);
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    fn pop_span(&mut self) {
        if let Err(err) = self.stack.pop() {
            error!(error = %err, "span stack underflow while tokenizing, resetting");
            self.stack = SpanStack::new();
        }
    }

    fn emit(&mut self, offset: usize, length: usize, color: HighlightColor) {
        self.words.push(TextWord {
            offset,
            length,
            color,
            kind: WordKind::Word,
        });
    }

    fn flush(&mut self, end: usize) {
        if end > self.word_start {
            let start = self.word_start;
            let color = self.colorize(start, end);
            self.emit(start, end - start, color);
        }
        self.word_start = end;
    }

    /// Color the word `start..end`, applying mark-previous/following rules of the active set.
    fn colorize(&mut self, start: usize, end: usize) -> HighlightColor {
        let strategy = self.strategy;
        let text: String = self.chars[start..end].iter().collect();
        let mut color = strategy.word_color(&self.stack, &text);
        let default = strategy.default_color;

        let Some(rule_set) = strategy.active_rule_set(&self.stack) else {
            self.pending_following = None;
            return color;
        };

        if color == default
            && let Some(marked) = self.pending_following.take()
        {
            color = marked;
        } else {
            self.pending_following = None;
        }

        if let Some(mark) = rule_set.mark_previous.iter().find(|m| m.word == text) {
            if let Some(previous) = self.words.iter_mut().rev().find(|w| !w.is_whitespace())
                && previous.color == default
            {
                previous.color = mark.color;
            }
            if mark.mark_marker {
                color = mark.color;
            }
        }
        if let Some(mark) = rule_set.mark_following.iter().find(|m| m.word == text) {
            self.pending_following = Some(mark.color);
            if mark.mark_marker {
                color = mark.color;
            }
        }
        color
    }
}

/// Decimal (optionally with one `.` and a type suffix) or `0x` hexadecimal literal.
fn is_number(word: &str) -> bool {
    if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        let digits = hex.trim_end_matches(['l', 'L', 'u', 'U']);
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit());
    }
    let body = word.trim_end_matches(['f', 'F', 'd', 'D', 'm', 'M', 'l', 'L', 'u', 'U']);
    body.starts_with(|c: char| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.matches('.').count() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlighting::MarkWord;
    use pretty_assertions::assert_eq;

    const COMMENT: HighlightColor = HighlightColor::new(Color::rgb(0, 0x80, 0));
    const KEYWORD: HighlightColor = HighlightColor::new(Color::rgb(0, 0, 0xFF)).bold();
    const STRING: HighlightColor = HighlightColor::new(Color::rgb(0x80, 0, 0));
    const DIGIT: HighlightColor = HighlightColor::new(Color::rgb(0x80, 0, 0x80));
    const METHOD: HighlightColor = HighlightColor::new(Color::rgb(0x19, 0x19, 0x70));

    fn c_like() -> HighlightingStrategy {
        let mut main = HighlightRuleSet::new(None);
        main.set_delimiters("(){};,.= ".chars());
        main.add_keyword("int", KEYWORD);
        main.add_keyword("class", KEYWORD);
        main.add_span(Span::new("BlockComment", "/*", "*/", COMMENT));
        main.add_span(Span::new("LineComment", "//", "", COMMENT));
        main.add_span(Span::new("String", "\"", "\"", STRING).with_escape('\\'));
        main.add_span(Span::new("Verbatim", "@\"", "\"", STRING).with_escape('"'));
        main.add_mark_previous(MarkWord::new("(", METHOD));
        main.add_mark_following(MarkWord::new("class", METHOD));
        HighlightingStrategyBuilder::new("C")
            .digit_color(DIGIT)
            .add_rule_set(main)
            .build()
            .unwrap()
    }

    fn colored(strategy: &HighlightingStrategy, line: &str) -> Vec<(String, HighlightColor)> {
        let (words, _) = strategy.tokenize_line(&SpanStack::new(), line);
        words
            .iter()
            .filter(|w| !w.is_whitespace())
            .map(|w| (w.text(line).to_string(), w.color))
            .collect()
    }

    #[test]
    fn test_keywords_digits_and_delimiters() {
        let strategy = c_like();
        let default = strategy.default_color();
        assert_eq!(
            colored(&strategy, "int x = 42;"),
            vec![
                ("int".to_string(), KEYWORD),
                ("x".to_string(), default),
                ("=".to_string(), default),
                ("42".to_string(), DIGIT),
                (";".to_string(), default),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_stays_open() {
        let strategy = c_like();
        let (words, exit) = strategy.tokenize_line(&SpanStack::new(), "a /* b");
        assert_eq!(exit.len(), 1);
        assert_eq!(exit.peek().unwrap().name, "BlockComment");
        assert_eq!(words.last().unwrap().color, COMMENT);

        let (words, exit2) = strategy.tokenize_line(&exit, "c */ d");
        assert!(exit2.is_empty());
        let line = "c */ d";
        let texts: Vec<_> = words
            .iter()
            .filter(|w| !w.is_whitespace())
            .map(|w| (w.text(line), w.color))
            .collect();
        assert_eq!(
            texts,
            vec![("c", COMMENT), ("*/", COMMENT), ("d", strategy.default_color())]
        );
    }

    #[test]
    fn test_line_comment_closes_at_eol() {
        let strategy = c_like();
        let (_, exit) = strategy.tokenize_line(&SpanStack::new(), "x // comment /* not a block");
        assert!(exit.is_empty());
    }

    #[test]
    fn test_escape_skips_end() {
        let strategy = c_like();
        let (_, exit) = strategy.tokenize_line(&SpanStack::new(), r#"s = "a\"b"; t"#);
        assert!(exit.is_empty());
        let (_, exit) = strategy.tokenize_line(&SpanStack::new(), r#"s = "a\"#);
        assert_eq!(exit.len(), 1);
    }

    #[test]
    fn test_doubled_escape_in_verbatim_string() {
        let strategy = c_like();
        let (_, exit) = strategy.tokenize_line(&SpanStack::new(), r#"@"say ""hi"" now" x"#);
        assert!(exit.is_empty());
        let (_, exit) = strategy.tokenize_line(&SpanStack::new(), r#"@"say ""hi"#);
        assert_eq!(exit.len(), 1);
    }

    #[test]
    fn test_mark_previous_and_following() {
        let strategy = c_like();
        let colors = colored(&strategy, "class Foo { run(); }");
        assert_eq!(colors[0], ("class".to_string(), KEYWORD));
        assert_eq!(colors[1], ("Foo".to_string(), METHOD));
        assert_eq!(colors[3], ("run".to_string(), METHOD));
    }

    #[test]
    fn test_begin_start_of_line() {
        let mut main = HighlightRuleSet::new(None);
        main.set_delimiters("# ".chars());
        let mut directive = Span::new("Directive", "#", "", COMMENT);
        directive.begin_start_of_line = true;
        main.add_span(directive);
        let strategy = HighlightingStrategyBuilder::new("Pre")
            .add_rule_set(main)
            .build()
            .unwrap();

        let directive_words = |line: &str| -> Vec<String> {
            let (words, _) = strategy.tokenize_line(&SpanStack::new(), line);
            words
                .iter()
                .filter(|w| w.color == COMMENT)
                .map(|w| w.text(line).to_string())
                .collect()
        };
        assert_eq!(directive_words("#if DEBUG"), vec!["#", "if", "DEBUG"]);
        assert_eq!(directive_words(" \t #if"), vec!["#", "if"]);
        assert_eq!(directive_words("x #if"), Vec::<String>::new());
        assert_eq!(directive_words("##"), vec!["#", "#"]);
    }

    #[test]
    fn test_nested_rule_set() {
        let mut main = HighlightRuleSet::new(None);
        main.set_delimiters("<>".chars());
        main.add_span(Span::new("Script", "<script>", "</script>", STRING).with_rule("Script"));
        let mut script = HighlightRuleSet::new(Some("Script".to_string()));
        script.set_delimiters("();".chars());
        script.add_keyword("var", KEYWORD);
        let strategy = HighlightingStrategyBuilder::new("Markup")
            .add_rule_set(script)
            .add_rule_set(main)
            .build()
            .unwrap();
        assert_eq!(strategy.rule_sets()[0].name, None);

        let (words, exit) = strategy.tokenize_line(&SpanStack::new(), "<script>var x");
        assert_eq!(exit.len(), 1);
        let line = "<script>var x";
        let var = words.iter().find(|w| w.text(line) == "var").unwrap();
        assert_eq!(var.color, KEYWORD);
        let x = words.iter().find(|w| w.text(line) == "x").unwrap();
        assert_eq!(x.color, STRING);
    }

    #[test]
    fn test_build_rejects_invalid_definitions() {
        let mut dangling = HighlightRuleSet::new(None);
        dangling.add_span(Span::new("S", "<", ">", COMMENT).with_rule("Missing"));
        let err = HighlightingStrategyBuilder::new("X")
            .add_rule_set(dangling)
            .build()
            .unwrap_err();
        assert!(matches!(err, DocumentError::HighlightingDefinitionInvalid(_)));

        let err = HighlightingStrategyBuilder::new("X")
            .add_rule_set(HighlightRuleSet::new(Some("A".into())))
            .build()
            .unwrap_err();
        assert!(matches!(err, DocumentError::HighlightingDefinitionInvalid(_)));

        let err = HighlightingStrategyBuilder::new("X")
            .add_rule_set(HighlightRuleSet::new(None))
            .add_rule_set(HighlightRuleSet::new(Some("A".into())))
            .add_rule_set(HighlightRuleSet::new(Some("A".into())))
            .build()
            .unwrap_err();
        assert!(matches!(err, DocumentError::HighlightingDefinitionInvalid(_)));
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("42"));
        assert!(is_number("0x1F"));
        assert!(is_number("3f"));
        assert!(is_number("1.5"));
        assert!(!is_number("x1"));
        assert!(!is_number("0x"));
        assert!(!is_number("1.2.3"));
    }

    #[test]
    fn test_environment_colors() {
        let strategy = HighlightingStrategyBuilder::new("E")
            .environment_color("Selection", COMMENT)
            .add_rule_set(HighlightRuleSet::new(None))
            .build()
            .unwrap();
        assert_eq!(strategy.get_color_for("Selection"), Some(COMMENT));
        assert_eq!(
            strategy.get_color_for("Default"),
            Some(strategy.default_color())
        );
        assert_eq!(strategy.get_color_for("Nope"), None);
    }
}
