//! Undo/redo for board edits.
//!
//! Every editor operation records the action needed to reverse it; applying an
//! action returns its own inverse so the same code path serves both undo and
//! redo.

use crate::board::{AnchorRef, BoardState};
use crate::constants::MAX_UNDO_HISTORY;
use crate::types::Point;

/// Represents the board edits that can be undone.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// An anchor was dragged from one position to another
    AnchorMoved {
        anchor: AnchorRef,
        old_position: Point,
        new_position: Point,
    },
    /// An anchor was added
    AnchorAdded { anchor: AnchorRef, position: Point },
    /// An anchor was deleted
    AnchorDeleted { anchor: AnchorRef, position: Point },
    /// The row count was changed
    RowsChanged { old_rows: u32, new_rows: u32 },
}

/// Manages undo/redo history for the board editor.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    /// Stack of actions that can be undone
    undo_stack: Vec<UndoAction>,
    /// Stack of actions that can be redone
    redo_stack: Vec<UndoAction>,
}

impl UndoHistory {
    /// Creates a new empty undo history.
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Records a new edit.
    ///
    /// This clears the redo stack since a new edit invalidates anything previously undone.
    pub fn push_action(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the most recent action from the undo stack.
    pub fn pop_undo(&mut self) -> Option<UndoAction> {
        self.undo_stack.pop()
    }

    /// Pops the most recent action from the redo stack.
    pub fn pop_redo(&mut self) -> Option<UndoAction> {
        self.redo_stack.pop()
    }

    /// Pushes an undone action onto the redo stack.
    pub fn push_redo(&mut self, action: UndoAction) {
        self.redo_stack.push(action);
    }

    /// Pushes a redone action back onto the undo stack without touching redo.
    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Extension methods for reversing recorded edits on a board.
pub trait UndoableBoard {
    /// Reverses `action` and returns the action that re-applies it.
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction>;

    /// Re-applies an undone action.
    fn apply_redo(&mut self, action: &UndoAction) -> Option<UndoAction>;
}

impl UndoableBoard for BoardState {
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction> {
        match action {
            UndoAction::AnchorMoved { anchor, old_position, new_position } => {
                if self.set_anchor_position(*anchor, *old_position) {
                    Some(UndoAction::AnchorMoved {
                        anchor: *anchor,
                        old_position: *new_position,
                        new_position: *old_position,
                    })
                } else {
                    None
                }
            }
            UndoAction::AnchorAdded { anchor, .. } => self
                .remove_anchor(*anchor)
                .map(|position| UndoAction::AnchorDeleted { anchor: *anchor, position }),
            UndoAction::AnchorDeleted { anchor, position } => {
                self.insert_anchor(*anchor, *position);
                Some(UndoAction::AnchorAdded {
                    anchor: *anchor,
                    position: *position,
                })
            }
            UndoAction::RowsChanged { old_rows, new_rows } => {
                self.num_rows = *old_rows;
                Some(UndoAction::RowsChanged {
                    old_rows: *new_rows,
                    new_rows: *old_rows,
                })
            }
        }
    }

    fn apply_redo(&mut self, action: &UndoAction) -> Option<UndoAction> {
        // Redo is just applying the reverse of an undo
        self.apply_undo(action)
    }
}
