//! Auto-arrange: re-pack every held item with a bottom-left greedy search.
//!
//! # Search order
//!
//! For each rotation in `0°, 90°, 180°, 270°`, anchors are scanned from the
//! bottom-most row that keeps the shape in bounds up to row 0, and left to
//! right within a row. The first anchor that fits wins. Items are packed
//! one at a time in placement order, or heaviest first when requested
//! (ties keep placement order).
//!
//! An item that fits nowhere is dropped from the grid and returned in the
//! [`ArrangeReport`]; the rest of the arrange carries on.

use crate::grid::{Grid, ItemId, Placement, Position};
use crate::history::Operation;
use crate::shape::{Rotation, Shape};

/// Outcome of [`Grid::auto_arrange`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrangeReport {
    /// Items re-placed, in commit order.
    pub placed: Vec<ItemId>,
    /// Items that no longer fit, as they were placed before the arrange.
    pub dropped: Vec<Placement>,
}

impl ArrangeReport {
    /// True when every item found a spot.
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

impl Grid {
    /// First fitting `(anchor, rotation)` for `shape` on the current grid,
    /// using the arrange search order.
    pub fn find_first_fit(&self, shape: &Shape) -> Option<(Position, Rotation)> {
        self.find_fit_for(None, shape)
    }

    fn find_fit_for(&self, mover: Option<&str>, shape: &Shape) -> Option<(Position, Rotation)> {
        Rotation::ALL.into_iter().find_map(|rotation| {
            let rotated = shape.rotated(rotation);
            self.scan_bottom_left(mover, &rotated).map(|pos| (pos, rotation))
        })
    }

    fn scan_bottom_left(&self, mover: Option<&str>, rotated: &Shape) -> Option<Position> {
        if rotated.width() > self.width || rotated.height() > self.height {
            return None;
        }
        let max_x = self.width - rotated.width();
        let max_y = self.height - rotated.height();
        for y in (0..=max_y).rev() {
            for x in 0..=max_x {
                let pos = Position::new(x as i32, y as i32);
                if self.check_placement_for(mover, rotated, pos).is_ok() {
                    return Some(pos);
                }
            }
        }
        None
    }

    /// Find a spot for `shape` and place it there as a logged Add.
    ///
    /// An item already on the grid may move into space it currently holds.
    pub fn try_auto_place(
        &mut self,
        item_id: impl Into<ItemId>,
        shape: &Shape,
        weight: f32,
    ) -> bool {
        let item_id = item_id.into();
        match self.find_fit_for(Some(item_id.as_str()), shape) {
            Some((pos, rotation)) => {
                self.try_place_item_weighted(item_id, shape, pos, rotation, weight)
            }
            None => {
                log::debug!("no room for {}", item_id);
                false
            }
        }
    }

    /// Clear the grid and re-pack every item.
    ///
    /// With `order_by_weight`, heavier items are packed first. Undo
    /// granularity follows [`crate::config::GridConfig::atomic_arrange`]:
    /// one Add record per re-placed item, or a single record restoring the
    /// whole previous layout.
    pub fn auto_arrange(&mut self, order_by_weight: bool) -> ArrangeReport {
        let before = self.take_all();
        let mut queue = before.clone();
        if order_by_weight {
            queue.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        }

        let mut report = ArrangeReport::default();
        for item in queue {
            let base = item.base_shape();
            let Some((pos, rotation)) = self.find_first_fit(&base) else {
                log::warn!(
                    "auto-arrange: {} ({}×{}) fits nowhere, dropping it",
                    item.item_id,
                    base.width(),
                    base.height()
                );
                report.dropped.push(item);
                continue;
            };

            if self.atomic_arrange {
                let placement = Placement {
                    item_id: item.item_id.clone(),
                    anchor: pos,
                    shape: base.rotated(rotation),
                    rotation,
                    weight: item.weight,
                    seq: self.next_seq(),
                };
                self.commit(placement);
            } else {
                let placed = self.try_place_item_weighted(
                    item.item_id.clone(),
                    &base,
                    pos,
                    rotation,
                    item.weight,
                );
                debug_assert!(placed, "first fit must be placeable");
            }
            report.placed.push(item.item_id);
        }

        if self.atomic_arrange && !before.is_empty() {
            self.history.push(Operation::Arrange { before });
        }

        log::info!(
            "auto-arrange packed {} items, dropped {}, fill {:.0}%",
            report.placed.len(),
            report.dropped.len(),
            self.get_fill_percentage() * 100.0
        );
        debug_assert!(self.check_invariants().is_empty());
        report
    }

    /// Remove every item as one undoable step.
    pub fn clear(&mut self) {
        let before = self.take_all();
        if !before.is_empty() {
            self.history.push(Operation::Arrange { before });
        }
    }
}
