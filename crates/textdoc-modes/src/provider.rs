//! Syntax mode providers: where mode definitions come from.

use crate::error::SyntaxModeError;
use serde::Deserialize;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of a mode index.
pub const MODE_INDEX_FILE: &str = "SyntaxModes.yaml";

const SUPPORTED_INDEX_VERSION: &str = "1.0";

/// One entry of a mode index: the definition file, the mode name and the extensions it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxMode {
    /// Definition file, relative to its provider.
    pub file: String,
    /// Mode name.
    pub name: String,
    /// Claimed extensions, with leading dot.
    pub extensions: Vec<String>,
}

impl SyntaxMode {
    /// An entry whose `extensions` are separated by `;`, `|` or `,`.
    pub fn new(file: impl Into<String>, name: impl Into<String>, extensions: &str) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            extensions: extensions
                .split([';', '|', ','])
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModeIndex {
    version: String,
    #[serde(default)]
    modes: Vec<RawModeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModeEntry {
    file: String,
    name: String,
    #[serde(default)]
    extensions: String,
}

/// Parse a `SyntaxModes.yaml` index.
pub fn parse_mode_index(text: &str) -> Result<Vec<SyntaxMode>, SyntaxModeError> {
    let index: RawModeIndex = serde_yaml::from_str(text)?;
    if index.version != SUPPORTED_INDEX_VERSION {
        return Err(SyntaxModeError::UnsupportedVersion(index.version));
    }
    Ok(index
        .modes
        .into_iter()
        .map(|entry| SyntaxMode::new(entry.file, entry.name, &entry.extensions))
        .collect())
}

/// A source of syntax mode definitions.
pub trait SyntaxModeProvider: Debug + Send + Sync {
    /// The modes this provider offers.
    fn syntax_modes(&self) -> &[SyntaxMode];

    /// The YAML text of a mode's definition.
    fn read_definition(&self, mode: &SyntaxMode) -> Result<String, SyntaxModeError>;

    /// Re-read the list of offered modes.
    fn update_syntax_mode_list(&mut self) -> Result<(), SyntaxModeError>;
}

const BUNDLED_INDEX: &str = include_str!("../modes/SyntaxModes.yaml");

const BUNDLED_DEFINITIONS: &[(&str, &str)] = &[
    ("XML-Mode.yaml", include_str!("../modes/XML-Mode.yaml")),
    ("HTML-Mode.yaml", include_str!("../modes/HTML-Mode.yaml")),
    (
        "JavaScript-Mode.yaml",
        include_str!("../modes/JavaScript-Mode.yaml"),
    ),
    ("CSharp-Mode.yaml", include_str!("../modes/CSharp-Mode.yaml")),
];

/// The modes compiled into this crate: XML, HTML, JavaScript and C#.
#[derive(Debug, Clone)]
pub struct BundledModeProvider {
    modes: Vec<SyntaxMode>,
}

impl BundledModeProvider {
    /// Read the bundled index.
    pub fn new() -> Result<Self, SyntaxModeError> {
        Ok(Self {
            modes: parse_mode_index(BUNDLED_INDEX)?,
        })
    }
}

impl SyntaxModeProvider for BundledModeProvider {
    fn syntax_modes(&self) -> &[SyntaxMode] {
        &self.modes
    }

    fn read_definition(&self, mode: &SyntaxMode) -> Result<String, SyntaxModeError> {
        BUNDLED_DEFINITIONS
            .iter()
            .find(|(file, _)| *file == mode.file)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| SyntaxModeError::MissingDefinition(mode.name.clone()))
    }

    fn update_syntax_mode_list(&mut self) -> Result<(), SyntaxModeError> {
        Ok(())
    }
}

/// Just the header fields of a definition, used when a directory has no index.
#[derive(Debug, Deserialize)]
struct DefinitionHeader {
    name: String,
    #[serde(default)]
    extensions: Vec<String>,
}

/// Modes read from a directory.
///
/// If the directory contains a `SyntaxModes.yaml` index it is used as is; otherwise every
/// `*.yaml` file is offered under the `name` and `extensions` found in its header.
#[derive(Debug, Clone)]
pub struct DirectoryModeProvider {
    directory: PathBuf,
    modes: Vec<SyntaxMode>,
}

impl DirectoryModeProvider {
    /// Scan `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, SyntaxModeError> {
        let mut provider = Self {
            directory: directory.into(),
            modes: Vec::new(),
        };
        provider.update_syntax_mode_list()?;
        Ok(provider)
    }

    /// The scanned directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn scan_definitions(&self) -> Result<Vec<SyntaxMode>, SyntaxModeError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                files.push(path);
            }
        }
        files.sort();

        let mut modes = Vec::new();
        for path in files {
            let Some(file) = path.file_name().map(|name| name.to_string_lossy().to_string())
            else {
                continue;
            };
            let header = std::fs::read_to_string(&path)
                .map_err(SyntaxModeError::from)
                .and_then(|text| Ok(serde_yaml::from_str::<DefinitionHeader>(&text)?));
            match header {
                Ok(header) => modes.push(SyntaxMode {
                    file,
                    name: header.name,
                    extensions: header.extensions,
                }),
                Err(err) => warn!(file = %path.display(), error = %err, "skipping syntax mode file"),
            }
        }
        Ok(modes)
    }
}

impl SyntaxModeProvider for DirectoryModeProvider {
    fn syntax_modes(&self) -> &[SyntaxMode] {
        &self.modes
    }

    fn read_definition(&self, mode: &SyntaxMode) -> Result<String, SyntaxModeError> {
        match std::fs::read_to_string(self.directory.join(&mode.file)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(SyntaxModeError::MissingDefinition(mode.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_syntax_mode_list(&mut self) -> Result<(), SyntaxModeError> {
        let index = self.directory.join(MODE_INDEX_FILE);
        self.modes = if index.is_file() {
            parse_mode_index(&std::fs::read_to_string(&index)?)?
        } else {
            self.scan_definitions()?
        };
        debug!(
            directory = %self.directory.display(),
            modes = self.modes.len(),
            "scanned syntax mode directory"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extension_separators() {
        let mode = SyntaxMode::new("x.yaml", "X", ".a;.b|.c, .d;");
        assert_eq!(mode.extensions, vec![".a", ".b", ".c", ".d"]);
    }

    #[test]
    fn test_index_version_is_checked() {
        let err = parse_mode_index("version: \"2.0\"\nmodes: []\n").unwrap_err();
        assert!(matches!(err, SyntaxModeError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_unknown_index_node_is_rejected() {
        let err = parse_mode_index("version: \"1.0\"\nmode: []\n").unwrap_err();
        assert!(matches!(err, SyntaxModeError::Yaml(_)));
    }

    #[test]
    fn test_bundled_definitions_exist_for_every_mode() {
        let provider = BundledModeProvider::new().unwrap();
        let names: Vec<_> = provider
            .syntax_modes()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["XML", "HTML", "JavaScript", "C#"]);
        for mode in provider.syntax_modes() {
            assert!(provider.read_definition(mode).is_ok(), "{}", mode.name);
        }
    }
}
