//! Tokenizer output.

use super::color::HighlightColor;

/// Kind of a tokenized word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// Text (keyword, identifier, delimiter, span text).
    Word,
    /// A single space.
    Space,
    /// A single tab.
    Tab,
}

/// A colored run of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextWord {
    /// Column of the first character.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// Color and font style.
    pub color: HighlightColor,
    /// Word kind.
    pub kind: WordKind,
}

impl TextWord {
    /// Bold font.
    pub fn bold(&self) -> bool {
        self.color.bold
    }

    /// Italic font.
    pub fn italic(&self) -> bool {
        self.color.italic
    }

    /// Whether this is a whitespace word.
    pub fn is_whitespace(&self) -> bool {
        self.kind != WordKind::Word
    }

    /// Column just past the word.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The word's text within its line.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        let start = line
            .char_indices()
            .nth(self.offset)
            .map_or(line.len(), |(i, _)| i);
        let end = line
            .char_indices()
            .nth(self.end())
            .map_or(line.len(), |(i, _)| i);
        &line[start..end]
    }
}
