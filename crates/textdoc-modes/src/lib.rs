#![warn(missing_docs)]
//! `textdoc-modes` - syntax mode definitions for `textdoc-core`.
//!
//! Grammars are written in YAML (see [`ModeDefinition`]), offered by [`SyntaxModeProvider`]s
//! (the bundled set or a directory) and built on demand by a [`SyntaxModeRegistry`], which
//! resolves cross-mode references, caches each strategy once and hands out `Arc`s that any
//! number of documents can share.
//!
//! ```rust
//! use textdoc_core::Document;
//! use textdoc_modes::SyntaxModeRegistry;
//!
//! let mut registry = SyntaxModeRegistry::with_bundled_modes().unwrap();
//! let mut document = Document::new("<root><!-- note --></root>");
//! registry.attach_for_file(&mut document, "settings.XML");
//! assert_eq!(document.highlighting_strategy().name(), "XML");
//! ```

pub mod definition;
mod error;
pub mod provider;
mod registry;

pub use definition::{
    ColorDefinition, KeywordsDefinition, MarkDefinition, ModeDefinition, RuleSetDefinition,
    SpanDefinition,
};
pub use error::SyntaxModeError;
pub use provider::{
    BundledModeProvider, DirectoryModeProvider, MODE_INDEX_FILE, SyntaxMode, SyntaxModeProvider,
    parse_mode_index,
};
pub use registry::SyntaxModeRegistry;
