//! Line terminator helpers.
//!
//! The buffer keeps text exactly as inserted; lines may end in LF (`'\n'`), CRLF (`"\r\n"`) or a
//! lone CR (`'\r'`). [`LineEnding`] names those terminators, classifies the delimiter of a line and
//! tracks the preferred terminator a host should use when it inserts new lines or saves.

use serde::Deserialize;

/// A line terminator sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
    /// Classic Mac CR (`'\r'`).
    Cr,
}

impl LineEnding {
    /// Detect the dominant line ending of a text.
    ///
    /// Policy: any CRLF wins, then any lone CR, otherwise LF.
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else if text.contains('\r') {
            Self::Cr
        } else {
            Self::Lf
        }
    }

    /// Classify the terminator at the end of a raw line (as returned by the rope, terminator
    /// included). Returns `None` for the last line, which has no terminator.
    pub fn of_line_end(raw_line: &str) -> Option<Self> {
        if raw_line.ends_with("\r\n") {
            Some(Self::Crlf)
        } else if raw_line.ends_with('\n') {
            Some(Self::Lf)
        } else if raw_line.ends_with('\r') {
            Some(Self::Cr)
        } else {
            None
        }
    }

    /// The terminator text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Length of the terminator in characters (1 or 2).
    pub fn len(self) -> usize {
        match self {
            Self::Crlf => 2,
            Self::Lf | Self::Cr => 1,
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::Lf
    }
}
