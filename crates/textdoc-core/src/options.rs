//! Document configuration.

use crate::line_ending::LineEnding;
use serde::Deserialize;

/// Per-document options. Hosts typically deserialize them from their settings file; every field
/// has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Whether folded regions hide lines.
    pub enable_folding: bool,
    /// Maximum number of undo groups kept.
    pub max_undo_steps: usize,
    /// Reject every edit.
    pub read_only: bool,
    /// Preferred line terminator; detected from the initial text when absent.
    pub line_terminator: Option<LineEnding>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            enable_folding: true,
            max_undo_steps: 1000,
            read_only: false,
            line_terminator: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let options: DocumentOptions =
            serde_yaml::from_str("read_only: true\nline_terminator: crlf\n").unwrap();
        assert_eq!(
            options,
            DocumentOptions {
                read_only: true,
                line_terminator: Some(LineEnding::Crlf),
                ..DocumentOptions::default()
            }
        );
    }

    #[test]
    fn test_empty_mapping() {
        let options: DocumentOptions = serde_yaml::from_str("{}").unwrap();
        assert_eq!(options, DocumentOptions::default());
    }
}
