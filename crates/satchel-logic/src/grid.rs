//! The inventory grid store.
//!
//! `Grid` owns the W×H occupancy array, the table of active placements and
//! the undo history. Every occupied cell belongs to exactly one entry in the
//! placement table; the placement, arrange and history modules are the only
//! code that writes cells, always through [`Grid::commit`] and
//! [`Grid::uncommit`].

use crate::config::{validate_config, ConfigError, GridConfig};
use crate::history::History;
use crate::shape::{Rotation, Shape};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Opaque item identifier chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Glyph used by the debug view.
    pub fn glyph(&self) -> char {
        self.0.chars().next().unwrap_or('?')
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A grid coordinate. Signed so callers can ask about off-grid anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// An item's current spot on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub item_id: ItemId,
    /// Top-left cell of `shape` in grid space.
    pub anchor: Position,
    /// The shape as placed, already rotated.
    pub shape: Shape,
    pub rotation: Rotation,
    /// Only used to order items during auto-arrange.
    pub weight: f32,
    /// Placement order; earlier placements sort first.
    pub(crate) seq: u64,
}

impl Placement {
    /// The unrotated shape this placement was made from.
    pub fn base_shape(&self) -> Shape {
        self.shape.rotated(self.rotation.inverse())
    }

    /// Grid coordinates covered by this placement.
    ///
    /// Only meaningful for committed placements, whose anchors are never
    /// negative.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let ax = self.anchor.x.max(0) as usize;
        let ay = self.anchor.y.max(0) as usize;
        self.shape.filled_cells().map(move |(x, y)| (ax + x, ay + y))
    }
}

/// A broken storage invariant. Any of these is a bug in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A cell names an item with no placement covering it.
    OrphanCell { x: usize, y: usize, item: ItemId },
    /// A placement covers a cell that holds something else.
    MissingCell { x: usize, y: usize, item: ItemId },
    /// A placement extends past the grid edge.
    OutOfBounds { item: ItemId },
    /// The occupied-cell counter disagrees with the cells.
    OccupiedCountDrift { cached: usize, actual: usize },
}

/// Fixed-size spatial inventory.
#[derive(Debug, Clone)]
pub struct Grid {
    pub(crate) width: usize,
    pub(crate) height: usize,
    /// Row-major, `None` = empty.
    pub(crate) cells: Vec<Option<ItemId>>,
    pub(crate) placements: HashMap<ItemId, Placement>,
    pub(crate) occupied: usize,
    pub(crate) history: History,
    pub(crate) atomic_arrange: bool,
    next_seq: u64,
}

impl Grid {
    /// Create an empty `width × height` grid with default settings.
    pub fn new(width: usize, height: usize) -> Result<Self, Vec<ConfigError>> {
        Self::with_config(&GridConfig {
            width,
            height,
            ..GridConfig::default()
        })
    }

    /// Create an empty grid from a validated configuration.
    pub fn with_config(config: &GridConfig) -> Result<Self, Vec<ConfigError>> {
        let errors = validate_config(config);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            width: config.width,
            height: config.height,
            cells: vec![None; config.width * config.height],
            placements: HashMap::new(),
            occupied: 0,
            history: History::new(config.history_limit),
            atomic_arrange: config.atomic_arrange,
            next_seq: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.placements.contains_key(item_id)
    }

    pub fn placement(&self, item_id: &str) -> Option<&Placement> {
        self.placements.get(item_id)
    }

    /// All placements, in the order they were made.
    pub fn placements(&self) -> Vec<&Placement> {
        let mut all: Vec<&Placement> = self.placements.values().collect();
        all.sort_by_key(|p| p.seq);
        all
    }

    /// The item occupying `pos`, if any. Off-grid positions are empty.
    pub fn item_at(&self, pos: Position) -> Option<&ItemId> {
        let (x, y) = self.in_bounds(pos)?;
        self.cells[self.index(x, y)].as_ref()
    }

    pub fn occupied_cells(&self) -> usize {
        self.occupied
    }

    pub fn free_cells(&self) -> usize {
        self.cells.len() - self.occupied
    }

    /// Occupied cells over total cells, in `[0, 1]`.
    pub fn get_fill_percentage(&self) -> f32 {
        self.occupied as f32 / self.cells.len() as f32
    }

    /// One line per row, `.` for empty, else the first character of the
    /// occupying item's id.
    pub fn get_debug_view(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map_or('.', ItemId::glyph))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Audit the cell array against the placement table.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let mut expected: Vec<Option<&ItemId>> = vec![None; self.cells.len()];
        for p in self.placements.values() {
            let fits = p.anchor.x >= 0
                && p.anchor.y >= 0
                && p.anchor.x as usize + p.shape.width() <= self.width
                && p.anchor.y as usize + p.shape.height() <= self.height;
            if !fits {
                violations.push(InvariantViolation::OutOfBounds {
                    item: p.item_id.clone(),
                });
                continue;
            }
            for (x, y) in p.cells() {
                let i = self.index(x, y);
                if self.cells[i].as_ref() != Some(&p.item_id) {
                    violations.push(InvariantViolation::MissingCell {
                        x,
                        y,
                        item: p.item_id.clone(),
                    });
                }
                expected[i] = Some(&p.item_id);
            }
        }

        let mut actual = 0;
        for (i, cell) in self.cells.iter().enumerate() {
            let Some(item) = cell else { continue };
            actual += 1;
            if expected[i] != Some(item) {
                violations.push(InvariantViolation::OrphanCell {
                    x: i % self.width,
                    y: i / self.width,
                    item: item.clone(),
                });
            }
        }

        if actual != self.occupied {
            violations.push(InvariantViolation::OccupiedCountDrift {
                cached: self.occupied,
                actual,
            });
        }

        violations
    }

    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub(crate) fn in_bounds(&self, pos: Position) -> Option<(usize, usize)> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    pub(crate) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Write a validated placement into the cells and the table. Unlogged.
    pub(crate) fn commit(&mut self, placement: Placement) {
        let indices: Vec<usize> = placement
            .cells()
            .map(|(x, y)| self.index(x, y))
            .collect();
        for i in indices {
            debug_assert!(self.cells[i].is_none(), "commit over occupied cell");
            self.cells[i] = Some(placement.item_id.clone());
            self.occupied += 1;
        }
        log::trace!(
            "committed {} at {} ({}°)",
            placement.item_id,
            placement.anchor,
            placement.rotation.degrees()
        );
        self.next_seq = self.next_seq.max(placement.seq + 1);
        self.placements.insert(placement.item_id.clone(), placement);
    }

    /// Clear an item's cells and drop its table entry. Unlogged.
    pub(crate) fn uncommit(&mut self, item_id: &str) -> Option<Placement> {
        let placement = self.placements.remove(item_id)?;
        let indices: Vec<usize> = placement
            .cells()
            .map(|(x, y)| self.index(x, y))
            .collect();
        for i in indices {
            if self.cells[i].take().is_some() {
                self.occupied -= 1;
            }
        }
        log::trace!("uncommitted {} from {}", placement.item_id, placement.anchor);
        Some(placement)
    }

    /// Empty every cell and the placement table, returning what was placed
    /// in placement order. Unlogged.
    pub(crate) fn take_all(&mut self) -> Vec<Placement> {
        let mut all: Vec<Placement> = self.placements.drain().map(|(_, p)| p).collect();
        all.sort_by_key(|p| p.seq);
        self.cells.iter_mut().for_each(|c| *c = None);
        self.occupied = 0;
        all
    }
}
