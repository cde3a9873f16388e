//! Syntax highlighting: grammar model, span stack and the incremental line tokenizer.

mod color;
mod rule_set;
mod span;
mod span_stack;
mod strategy;
mod token_cache;
mod word;

pub use color::{Color, HighlightColor};
pub use rule_set::{HighlightRuleSet, MarkWord};
pub use span::Span;
pub use span_stack::SpanStack;
pub use strategy::{DEFAULT_STRATEGY_NAME, HighlightingStrategy, HighlightingStrategyBuilder};
pub use token_cache::{LineTokens, TokenCache};
pub use word::{TextWord, WordKind};
