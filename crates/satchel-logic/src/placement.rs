//! Placement engine: validate, place and remove single items.
//!
//! Validation never mutates. A rejected `try_place_item` leaves the cells,
//! the placement table and the undo history exactly as they were, so the
//! arrange search can probe freely before committing.

use crate::grid::{Grid, ItemId, Placement, Position};
use crate::history::Operation;
use crate::shape::{Rotation, Shape};
use std::fmt;

/// Why a shape cannot go at a position.
///
/// The public placement calls only report `bool`; the variant is logged at
/// `debug` level for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceError {
    /// The shape would extend past the grid edge.
    OutOfBounds {
        anchor: Position,
        width: usize,
        height: usize,
    },
    /// A filled cell lands on another item.
    Collision { with: ItemId, at: Position },
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceError::OutOfBounds {
                anchor,
                width,
                height,
            } => write!(f, "{}×{} shape at {} is out of bounds", width, height, anchor),
            PlaceError::Collision { with, at } => write!(f, "collides with {} at {}", with, at),
        }
    }
}

impl std::error::Error for PlaceError {}

impl Grid {
    /// Check whether `shape` fits at `position` without touching any item.
    pub fn check_placement(&self, shape: &Shape, position: Position) -> Result<(), PlaceError> {
        self.check_placement_for(None, shape, position)
    }

    /// Like [`Grid::check_placement`], but cells owned by `mover` count as
    /// free, so an item can be checked against its own current spot.
    pub(crate) fn check_placement_for(
        &self,
        mover: Option<&str>,
        shape: &Shape,
        position: Position,
    ) -> Result<(), PlaceError> {
        let right = position.x as i64 + shape.width() as i64;
        let bottom = position.y as i64 + shape.height() as i64;
        if position.x < 0
            || position.y < 0
            || right > self.width as i64
            || bottom > self.height as i64
        {
            return Err(PlaceError::OutOfBounds {
                anchor: position,
                width: shape.width(),
                height: shape.height(),
            });
        }

        let (ax, ay) = (position.x as usize, position.y as usize);
        for (x, y) in shape.filled_cells() {
            let (gx, gy) = (ax + x, ay + y);
            if let Some(other) = &self.cells[self.index(gx, gy)] {
                if mover != Some(other.as_str()) {
                    return Err(PlaceError::Collision {
                        with: other.clone(),
                        at: Position::new(gx as i32, gy as i32),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `shape` (as given, unrotated) fits at `position`.
    pub fn can_place_at(&self, shape: &Shape, position: Position) -> bool {
        self.check_placement(shape, position).is_ok()
    }

    /// Place `item_id` with default weight. See [`Grid::try_place_item_weighted`].
    pub fn try_place_item(
        &mut self,
        item_id: impl Into<ItemId>,
        shape: &Shape,
        position: Position,
        rotation: Rotation,
    ) -> bool {
        self.try_place_item_weighted(item_id, shape, position, rotation, 1.0)
    }

    /// Rotate `shape` and place it with its top-left at `position`.
    ///
    /// Returns `false`, changing nothing, when the rotated shape is out of
    /// bounds or overlaps another item. Re-placing an item that is already
    /// on the grid moves it: its own cells do not block the new spot, and
    /// the undo record remembers where it was.
    pub fn try_place_item_weighted(
        &mut self,
        item_id: impl Into<ItemId>,
        shape: &Shape,
        position: Position,
        rotation: Rotation,
        weight: f32,
    ) -> bool {
        let item_id = item_id.into();
        let rotated = shape.rotated(rotation);
        if let Err(err) = self.check_placement_for(Some(item_id.as_str()), &rotated, position) {
            log::debug!("cannot place {}: {}", item_id, err);
            return false;
        }

        let replaced = self.uncommit(item_id.as_str());
        let placement = Placement {
            item_id,
            anchor: position,
            shape: rotated,
            rotation,
            weight,
            seq: self.next_seq(),
        };
        self.commit(placement.clone());
        self.history.push(Operation::Add {
            placement,
            replaced,
        });
        true
    }

    /// Take `item_id` off the grid. Returns `false` if it is not placed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        match self.uncommit(item_id) {
            Some(placement) => {
                self.history.push(Operation::Remove { placement });
                true
            }
            None => {
                log::debug!("cannot remove {}: not placed", item_id);
                false
            }
        }
    }
}
