//! Undo log.
//!
//! Every logged mutation pushes one [`Operation`] carrying a full snapshot
//! of what it changed. `undo` inverts the newest record through the
//! unlogged commit/uncommit primitives, so undoing never pushes records of
//! its own.

use crate::grid::{Grid, Placement};
use std::collections::VecDeque;

/// A reversible mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// An item was placed. `replaced` is its previous spot if it was moved.
    Add {
        placement: Placement,
        replaced: Option<Placement>,
    },
    /// An item was taken off the grid.
    Remove { placement: Placement },
    /// The whole grid was rebuilt (atomic arrange or clear). `before` is
    /// every placement prior to the rebuild.
    Arrange { before: Vec<Placement> },
}

/// Bounded LIFO of operations; the oldest record falls off past the limit.
#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<Operation>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, op: Operation) {
        self.records.push_back(op);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<Operation> {
        self.records.pop_back()
    }

    pub fn last(&self) -> Option<&Operation> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Grid {
    /// Revert the most recent logged operation. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.history.pop() else {
            return false;
        };

        match op {
            Operation::Add {
                placement,
                replaced,
            } => {
                match self.uncommit(placement.item_id.as_str()) {
                    Some(current) if current == placement => {}
                    Some(current) => {
                        log::warn!(
                            "undo add: {} had moved to {}, removed anyway",
                            current.item_id,
                            current.anchor
                        );
                    }
                    None => {
                        log::warn!("undo add: {} is no longer placed", placement.item_id);
                    }
                }
                if let Some(previous) = replaced {
                    self.restore_placement(previous);
                }
            }
            Operation::Remove { placement } => {
                self.restore_placement(placement);
            }
            Operation::Arrange { before } => {
                self.take_all();
                for placement in before {
                    self.commit(placement);
                }
            }
        }

        debug_assert!(self.check_invariants().is_empty());
        true
    }

    /// Whether [`Grid::undo`] has anything to revert.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of undoable operations.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// The record the next `undo` would revert.
    pub fn last_operation(&self) -> Option<&Operation> {
        self.history.last()
    }

    /// Forget all undo records.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Put a recorded placement back exactly as it was. Skips it, with a
    /// warning, if something else has since taken the space; that can only
    /// happen when per-item arrange records are undone out of context.
    fn restore_placement(&mut self, placement: Placement) {
        if let Some(current) = self.uncommit(placement.item_id.as_str()) {
            log::warn!(
                "undo: {} was at {}, moving back to {}",
                current.item_id,
                current.anchor,
                placement.anchor
            );
        }
        match self.check_placement(&placement.shape, placement.anchor) {
            Ok(()) => self.commit(placement),
            Err(err) => log::warn!("undo: cannot restore {}: {}", placement.item_id, err),
        }
    }
}
