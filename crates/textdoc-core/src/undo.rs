//! Undo/redo history.
//!
//! The history is a linear stack of groups. Every edit outside an explicit group forms its own
//! group; `start_group`/`end_group` brackets nest and everything recorded inside the outermost
//! bracket collapses into one group. The document replays groups through its edit pipeline.

use crate::change::DocumentChange;
use std::collections::VecDeque;

/// One recorded edit: `removed_text` was replaced by `inserted_text` at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEdit {
    /// Offset at which the edit was applied.
    pub offset: usize,
    /// Text removed by the edit.
    pub removed_text: String,
    /// Text inserted by the edit.
    pub inserted_text: String,
}

impl From<&DocumentChange> for UndoEdit {
    fn from(change: &DocumentChange) -> Self {
        Self {
            offset: change.offset,
            removed_text: change.removed_text.clone(),
            inserted_text: change.inserted_text.clone(),
        }
    }
}

/// Edits undone or redone together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoGroup {
    /// Group id (unique within one history).
    pub group_id: usize,
    /// Edits in the order they were applied.
    pub edits: Vec<UndoEdit>,
}

/// Linear undo/redo history with nested grouping and a bounded depth.
#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Oldest group at the front.
    undo_stack: VecDeque<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    max_undo: usize,
    next_group_id: usize,
    open_group_id: Option<usize>,
    group_depth: usize,
}

impl UndoStack {
    /// An empty history holding at most `max_undo` groups.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            next_group_id: 0,
            open_group_id: None,
            group_depth: 0,
        }
    }

    /// Whether an undo group is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo group is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable groups.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable groups.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Open a group bracket.
    pub fn start_group(&mut self) {
        self.group_depth += 1;
        if self.group_depth == 1 {
            self.open_group_id = Some(self.allocate_group_id());
        }
    }

    /// Close a group bracket; returns `true` when the outermost bracket closed.
    pub fn end_group(&mut self) -> bool {
        debug_assert!(self.group_depth > 0, "end_undo_group without start_undo_group");
        if self.group_depth == 0 {
            return false;
        }
        self.group_depth -= 1;
        if self.group_depth == 0 {
            self.open_group_id = None;
            return true;
        }
        false
    }

    /// Current bracket nesting depth.
    pub fn group_depth(&self) -> usize {
        self.group_depth
    }

    fn allocate_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        id
    }

    /// Record an applied edit. Clears the redo history.
    pub fn record(&mut self, edit: UndoEdit) {
        self.redo_stack.clear();

        if let Some(group_id) = self.open_group_id
            && let Some(last) = self.undo_stack.back_mut()
            && last.group_id == group_id
        {
            last.edits.push(edit);
            return;
        }

        let group_id = match self.open_group_id {
            Some(id) => id,
            None => self.allocate_group_id(),
        };
        self.undo_stack.push_back(UndoGroup {
            group_id,
            edits: vec![edit],
        });
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
    }

    /// Take the most recent undo group.
    pub(crate) fn pop_undo(&mut self) -> Option<UndoGroup> {
        self.undo_stack.pop_back()
    }

    /// Take the most recent redo group.
    pub(crate) fn pop_redo(&mut self) -> Option<UndoGroup> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_redo(&mut self, group: UndoGroup) {
        self.redo_stack.push(group);
    }

    pub(crate) fn push_undo(&mut self, group: UndoGroup) {
        self.undo_stack.push_back(group);
    }

    /// Forget all history. Open brackets stay open.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if self.group_depth > 0 {
            self.open_group_id = Some(self.allocate_group_id());
        }
    }
}
