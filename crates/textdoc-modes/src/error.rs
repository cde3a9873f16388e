use textdoc_core::DocumentError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while indexing, loading or resolving syntax modes.
pub enum SyntaxModeError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("unknown syntax mode index version '{0}'")]
    /// A `SyntaxModes.yaml` index declared a version other than `1.0`.
    UnsupportedVersion(String),

    #[error("unknown syntax mode '{0}'")]
    /// No provider offers a mode with this name.
    UnknownMode(String),

    #[error("definition file for '{0}' could not be found")]
    /// A provider lists a mode whose definition file is missing.
    MissingDefinition(String),

    #[error("definition is named '{found}' but the syntax mode is '{expected}'")]
    /// The name inside a definition differs from the name it is indexed under.
    NameMismatch {
        /// Name in the mode index.
        expected: String,
        /// Name in the definition file.
        found: String,
    },

    #[error("reference cycle detected involving '{0}'")]
    /// Modes reference each other's rule sets in a loop.
    ReferenceCycle(String),

    #[error("invalid color '{0}'")]
    /// A color could not be parsed.
    InvalidColor(String),

    #[error("invalid escape character '{0}': expected exactly one character")]
    /// An escape character was empty or longer than one character.
    InvalidEscape(String),

    #[error(transparent)]
    /// The definition parsed but does not form a valid grammar.
    Definition(#[from] DocumentError),
}

impl From<SyntaxModeError> for DocumentError {
    fn from(err: SyntaxModeError) -> Self {
        match err {
            SyntaxModeError::Definition(err) => err,
            other => DocumentError::HighlightingDefinitionInvalid(other.to_string()),
        }
    }
}
