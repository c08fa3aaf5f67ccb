//! Save/load support for grid contents.
//!
//! A snapshot lists each placed item with its anchor, rotation, weight and
//! unrotated shape. It is a plain serde value; the save system picks the
//! encoding. Restoring validates every entry and then writes the grid
//! directly, without touching the undo history.

use crate::config::{ConfigError, GridConfig};
use crate::grid::{Grid, ItemId, Placement, Position};
use crate::placement::PlaceError;
use crate::shape::{Rotation, Shape};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Version number for the snapshot layout (increment when it changes).
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable contents of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    /// In placement order.
    pub items: Vec<SavedPlacement>,
}

/// One saved item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlacement {
    pub item_id: ItemId,
    pub anchor_x: i32,
    pub anchor_y: i32,
    /// Degrees clockwise: 0, 90, 180 or 270.
    pub rotation: u16,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Unrotated shape.
    pub shape: Shape,
}

fn default_weight() -> f32 {
    1.0
}

impl From<&Placement> for SavedPlacement {
    fn from(p: &Placement) -> Self {
        Self {
            item_id: p.item_id.clone(),
            anchor_x: p.anchor.x,
            anchor_y: p.anchor.y,
            rotation: p.rotation.degrees(),
            weight: p.weight,
            shape: p.base_shape(),
        }
    }
}

/// Why a snapshot could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreError {
    UnsupportedVersion(u32),
    InvalidConfig(Vec<ConfigError>),
    UnknownRotation { item: ItemId, degrees: u16 },
    DuplicateItem(ItemId),
    Placement { item: ItemId, error: PlaceError },
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::UnsupportedVersion(v) => write!(f, "unsupported snapshot version {}", v),
            RestoreError::InvalidConfig(errors) => {
                let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "invalid grid: {}", msgs.join(", "))
            }
            RestoreError::UnknownRotation { item, degrees } => {
                write!(f, "{} has rotation {}°", item, degrees)
            }
            RestoreError::DuplicateItem(item) => write!(f, "{} appears twice", item),
            RestoreError::Placement { item, error } => write!(f, "{}: {}", item, error),
        }
    }
}

impl std::error::Error for RestoreError {}

impl Grid {
    /// Capture the current contents.
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            version: SNAPSHOT_VERSION,
            width: self.width,
            height: self.height,
            items: self
                .placements()
                .into_iter()
                .map(SavedPlacement::from)
                .collect(),
        }
    }

    /// Rebuild a grid from a snapshot with default settings.
    pub fn restore(snapshot: &InventorySnapshot) -> Result<Grid, RestoreError> {
        Self::restore_with_config(snapshot, &GridConfig::default())
    }

    /// Rebuild a grid from a snapshot. Size comes from the snapshot; the
    /// rest of `config` applies as given. The new grid has no undo history.
    pub fn restore_with_config(
        snapshot: &InventorySnapshot,
        config: &GridConfig,
    ) -> Result<Grid, RestoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RestoreError::UnsupportedVersion(snapshot.version));
        }
        let config = GridConfig {
            width: snapshot.width,
            height: snapshot.height,
            ..config.clone()
        };
        let mut grid = Grid::with_config(&config).map_err(RestoreError::InvalidConfig)?;

        let mut seen = HashSet::new();
        for saved in &snapshot.items {
            if !seen.insert(saved.item_id.clone()) {
                return Err(RestoreError::DuplicateItem(saved.item_id.clone()));
            }
            let rotation = Rotation::from_degrees(saved.rotation).ok_or_else(|| {
                RestoreError::UnknownRotation {
                    item: saved.item_id.clone(),
                    degrees: saved.rotation,
                }
            })?;
            let shape = saved.shape.rotated(rotation);
            let anchor = Position::new(saved.anchor_x, saved.anchor_y);
            grid.check_placement(&shape, anchor)
                .map_err(|error| RestoreError::Placement {
                    item: saved.item_id.clone(),
                    error,
                })?;
            let seq = grid.next_seq();
            grid.commit(Placement {
                item_id: saved.item_id.clone(),
                anchor,
                shape,
                rotation,
                weight: saved.weight,
                seq,
            });
        }

        log::info!(
            "restored {} items into {}×{} grid",
            grid.len(),
            grid.width,
            grid.height
        );
        debug_assert!(grid.check_invariants().is_empty());
        Ok(grid)
    }
}
