//! YAML grammar definitions.
//!
//! A definition is deserialized into the raw model below, cross-mode references are flattened by
//! the registry, and [`ModeDefinition::into_strategy`] produces the immutable
//! [`HighlightingStrategy`] documents share.

use crate::error::SyntaxModeError;
use serde::Deserialize;
use std::collections::HashMap;
use textdoc_core::{
    Color, HighlightColor, HighlightRuleSet, HighlightingStrategy, HighlightingStrategyBuilder,
    MarkWord, Span,
};

/// Separator between a referenced mode name and its rule-set names after import.
pub const REFERENCE_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
/// `{ color, bgcolor, bold, italic }`.
pub struct ColorDefinition {
    #[serde(default)]
    /// Foreground color (`#RRGGBB`, `#AARRGGBB` or a name).
    pub color: Option<String>,

    #[serde(default)]
    /// Background color.
    pub bgcolor: Option<String>,

    #[serde(default)]
    /// Bold font.
    pub bold: bool,

    #[serde(default)]
    /// Italic font.
    pub italic: bool,
}

impl ColorDefinition {
    /// Resolve to a [`HighlightColor`]; a missing foreground uses `fallback`.
    pub fn resolve(&self, fallback: Color) -> Result<HighlightColor, SyntaxModeError> {
        let color = match &self.color {
            Some(text) => parse_color(text)?,
            None => fallback,
        };
        let mut resolved = HighlightColor::new(color);
        if let Some(background) = &self.bgcolor {
            resolved = resolved.with_background(parse_color(background)?);
        }
        if self.bold {
            resolved = resolved.bold();
        }
        if self.italic {
            resolved = resolved.italic();
        }
        Ok(resolved)
    }
}

fn parse_color(text: &str) -> Result<Color, SyntaxModeError> {
    Color::parse(text).ok_or_else(|| SyntaxModeError::InvalidColor(text.to_string()))
}

fn parse_escape(text: Option<&str>) -> Result<Option<char>, SyntaxModeError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(Some(ch)),
        _ => Err(SyntaxModeError::InvalidEscape(text.to_string())),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
/// Raw YAML grammar definition.
pub struct ModeDefinition {
    /// Mode name; must match the name the mode is indexed under.
    pub name: String,

    #[serde(default)]
    /// File extensions, with leading dot.
    pub extensions: Vec<String>,

    #[serde(default)]
    /// Free-form properties (`LineComment`, `BlockCommentBegin`, ...).
    pub properties: HashMap<String, String>,

    #[serde(default)]
    /// Color of plain text.
    pub default: Option<ColorDefinition>,

    #[serde(default)]
    /// Color of numeric literals.
    pub digits: Option<ColorDefinition>,

    #[serde(default)]
    /// Named environment colors (selection, line numbers, ...).
    pub environment: HashMap<String, ColorDefinition>,

    /// Rule sets; exactly one must be unnamed.
    pub rule_sets: Vec<RuleSetDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// A rule set: keyword tables, delimiters, spans and mark rules.
pub struct RuleSetDefinition {
    #[serde(default)]
    /// Name; `None` for the default rule set.
    pub name: Option<String>,

    #[serde(default)]
    /// Case-insensitive keywords and spans.
    pub ignore_case: bool,

    #[serde(default)]
    /// Word delimiter characters.
    pub delimiters: String,

    #[serde(default)]
    /// Escape character inherited by this set's spans.
    pub escape_character: Option<String>,

    #[serde(default)]
    /// Name of another mode whose rule sets replace this one.
    pub reference: Option<String>,

    #[serde(default)]
    /// Spans.
    pub spans: Vec<SpanDefinition>,

    #[serde(default)]
    /// Keyword groups.
    pub keywords: Vec<KeywordsDefinition>,

    #[serde(default)]
    /// Words that recolor the previous word.
    pub mark_previous: Vec<MarkDefinition>,

    #[serde(default)]
    /// Words that recolor the following word.
    pub mark_following: Vec<MarkDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
/// A span rule.
pub struct SpanDefinition {
    /// Span name.
    pub name: String,

    /// Begin sequence.
    pub begin: String,

    #[serde(default)]
    /// End sequence; empty closes the span at end of line.
    pub end: String,

    /// Interior color.
    pub color: ColorDefinition,

    #[serde(default)]
    /// Color of the begin sequence.
    pub begin_color: Option<ColorDefinition>,

    #[serde(default)]
    /// Color of the end sequence.
    pub end_color: Option<ColorDefinition>,

    #[serde(default)]
    /// Escape character (defaults to the rule set's).
    pub escape_character: Option<String>,

    #[serde(default)]
    /// Case-insensitive matching (defaults to the rule set's).
    pub ignore_case: Option<bool>,

    #[serde(default)]
    /// Begin must stand as a separate word.
    pub begin_single_word: bool,

    #[serde(default)]
    /// Begin must be the first non-blank text of its line.
    pub begin_start_of_line: bool,

    #[serde(default)]
    /// End must stand as a separate word.
    pub end_single_word: bool,

    #[serde(default)]
    /// Close at end of line.
    pub stop_at_eol: bool,

    #[serde(default)]
    /// Rule set active inside the span.
    pub rule: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
/// A group of keywords sharing one color.
pub struct KeywordsDefinition {
    #[serde(default)]
    /// Group name (informational).
    pub name: Option<String>,

    /// Keyword color.
    pub color: ColorDefinition,

    /// Keywords.
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
/// A mark-previous / mark-following rule.
pub struct MarkDefinition {
    /// Trigger word.
    pub word: String,

    /// Color of the marked word.
    pub color: ColorDefinition,

    #[serde(default)]
    /// Also color the trigger word.
    pub mark_marker: bool,
}

impl ModeDefinition {
    /// Parse a definition from YAML.
    pub fn from_yaml(text: &str) -> Result<Self, SyntaxModeError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Names of the modes referenced by this definition's rule sets.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.rule_sets
            .iter()
            .filter_map(|set| set.reference.as_deref())
    }

    /// Replace every rule set referencing `referenced.name` with the referenced mode's rule
    /// sets.
    ///
    /// The referenced default rule set takes the referencing set's name; its named rule sets
    /// are imported as `Mode::name`, and span rules inside them are renamed to match.
    /// `referenced` must already be flattened.
    pub fn import_reference(&mut self, referenced: &ModeDefinition) {
        let prefix = format!("{}{REFERENCE_SEPARATOR}", referenced.name);
        let rename = |name: &str| format!("{prefix}{name}");

        let mut imported_named = Vec::new();
        let mut rule_sets = Vec::with_capacity(self.rule_sets.len());
        let mut imported = false;
        for set in std::mem::take(&mut self.rule_sets) {
            if set.reference.as_deref() != Some(referenced.name.as_str()) {
                rule_sets.push(set);
                continue;
            }
            for source in &referenced.rule_sets {
                let mut copy = source.clone();
                for span in &mut copy.spans {
                    if let Some(rule) = &span.rule {
                        span.rule = Some(rename(rule));
                    }
                }
                match &source.name {
                    None => {
                        copy.name = set.name.clone();
                        rule_sets.push(copy);
                    }
                    Some(name) if !imported => {
                        copy.name = Some(rename(name));
                        imported_named.push(copy);
                    }
                    Some(_) => {}
                }
            }
            imported = true;
        }
        rule_sets.extend(imported_named);
        self.rule_sets = rule_sets;
    }

    /// Build the immutable strategy. Every reference must have been imported.
    pub fn into_strategy(self) -> Result<HighlightingStrategy, SyntaxModeError> {
        if let Some(reference) = self.references().next() {
            return Err(SyntaxModeError::UnknownMode(reference.to_string()));
        }

        let default_color = match &self.default {
            Some(color) => color.resolve(Color::BLACK)?,
            None => HighlightColor::new(Color::BLACK),
        };
        let mut builder = HighlightingStrategyBuilder::new(self.name)
            .extensions(self.extensions)
            .default_color(default_color);
        for (key, value) in self.properties {
            builder = builder.property(key, value);
        }
        if let Some(digits) = &self.digits {
            builder = builder.digit_color(digits.resolve(default_color.color)?);
        }
        for (name, color) in &self.environment {
            builder = builder.environment_color(name.clone(), color.resolve(Color::BLACK)?);
        }
        for set in self.rule_sets {
            builder = builder.add_rule_set(set.into_rule_set(default_color.color)?);
        }
        Ok(builder.build()?)
    }
}

impl RuleSetDefinition {
    fn into_rule_set(self, fallback: Color) -> Result<HighlightRuleSet, SyntaxModeError> {
        let mut set = HighlightRuleSet::new(self.name);
        set.ignore_case = self.ignore_case;
        set.escape_character = parse_escape(self.escape_character.as_deref())?;
        set.set_delimiters(self.delimiters.chars());

        for group in &self.keywords {
            let color = group.color.resolve(fallback)?;
            for word in &group.words {
                set.add_keyword(word, color);
            }
        }
        for span in self.spans {
            set.add_span(span.into_span(self.ignore_case, fallback)?);
        }
        for mark in &self.mark_previous {
            set.add_mark_previous(mark.to_mark_word(fallback)?);
        }
        for mark in &self.mark_following {
            set.add_mark_following(mark.to_mark_word(fallback)?);
        }
        Ok(set)
    }
}

impl SpanDefinition {
    fn into_span(self, ignore_case: bool, fallback: Color) -> Result<Span, SyntaxModeError> {
        let color = self.color.resolve(fallback)?;
        let mut span = Span::new(self.name, self.begin, self.end, color);
        span.begin_color = self
            .begin_color
            .as_ref()
            .map(|c| c.resolve(color.color))
            .transpose()?;
        span.end_color = self
            .end_color
            .as_ref()
            .map(|c| c.resolve(color.color))
            .transpose()?;
        span.escape_character = parse_escape(self.escape_character.as_deref())?;
        span.ignore_case = self.ignore_case.unwrap_or(ignore_case);
        span.begin_single_word = self.begin_single_word;
        span.begin_start_of_line = self.begin_start_of_line;
        span.end_single_word = self.end_single_word;
        span.stop_at_eol |= self.stop_at_eol;
        span.rule = self.rule;
        Ok(span)
    }
}

impl MarkDefinition {
    fn to_mark_word(&self, fallback: Color) -> Result<MarkWord, SyntaxModeError> {
        let mut mark = MarkWord::new(self.word.clone(), self.color.resolve(fallback)?);
        mark.mark_marker = self.mark_marker;
        Ok(mark)
    }
}
