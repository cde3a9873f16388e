//! Persistent stack of open spans.
//!
//! Every cached line stores the stack that was active at its end, so cloning must be O(1). The
//! stack is an immutable cons list: `push` allocates one node pointing at the shared tail and
//! never touches the nodes it shares with other clones.

use super::span::Span;
use crate::error::{DocumentError, Result};
use std::sync::Arc;

#[derive(Debug)]
struct StackNode {
    span: Arc<Span>,
    previous: Option<Arc<StackNode>>,
}

/// An immutable, structurally shared LIFO stack of spans.
#[derive(Debug, Clone, Default)]
pub struct SpanStack {
    top: Option<Arc<StackNode>>,
    len: usize,
}

impl SpanStack {
    /// The empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a span. Clones taken earlier are unaffected.
    pub fn push(&mut self, span: Arc<Span>) {
        let previous = self.top.take();
        self.top = Some(Arc::new(StackNode { span, previous }));
        self.len += 1;
    }

    /// Pop the top span.
    pub fn pop(&mut self) -> Result<Arc<Span>> {
        let node = self.top.take().ok_or(DocumentError::EmptyStack)?;
        self.top = node.previous.clone();
        self.len -= 1;
        Ok(node.span.clone())
    }

    /// The top span.
    pub fn peek(&self) -> Option<&Arc<Span>> {
        self.top.as_ref().map(|node| &node.span)
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of open spans.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Spans from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Span>> {
        std::iter::successors(self.top.as_ref(), |node| node.previous.as_ref())
            .map(|node| &node.span)
    }

    /// Whether both stacks share the same top node (both empty counts as the same state).
    pub fn same_state(&self, other: &SpanStack) -> bool {
        match (&self.top, &other.top) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether both stacks hold the same spans (by identity) at every level.
    pub fn spans_eq(&self, other: &SpanStack) -> bool {
        self.len == other.len
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}
