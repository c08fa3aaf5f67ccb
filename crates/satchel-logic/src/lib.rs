//! Spatial inventory packing for Satchel.
//!
//! This crate holds the grid inventory engine, independent of any game
//! engine, renderer or input layer. Items are polyomino shapes placed on a
//! fixed W×H grid with quarter-turn rotation; the grid never lets two items
//! share a cell, can re-pack itself, and keeps an undo log.
//!
//! The engine is single-threaded and synchronous. Callers that share one
//! grid between threads must serialize access themselves, and must re-query
//! placements after mutating calls: the engine raises no notifications.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`shape`] | Occupancy masks and pure 90° rotation |
//! | [`grid`] | Cell array, placement table, fill and debug view |
//! | [`placement`] | Bounds/collision checks, place and remove |
//! | [`arrange`] | Bottom-left greedy re-pack with rotation search |
//! | [`history`] | Undo log of Add / Remove / Arrange records |
//! | [`config`] | Grid size and history settings |
//! | [`snapshot`] | Serializable grid contents and validated reload |
//!
//! ```
//! use satchel_logic::grid::{Grid, Position};
//! use satchel_logic::shape::{Rotation, Shape};
//!
//! let mut grid = Grid::new(5, 5).unwrap();
//! let square = Shape::filled(2, 2).unwrap();
//!
//! assert!(grid.try_place_item("A", &square, Position::new(0, 0), Rotation::Deg0));
//! assert!(!grid.try_place_item("B", &square, Position::new(0, 0), Rotation::Deg0));
//! assert!(grid.try_place_item("B", &square, Position::new(3, 3), Rotation::Deg0));
//! assert_eq!(grid.get_fill_percentage(), 8.0 / 25.0);
//!
//! assert!(grid.remove_item("A"));
//! assert!(grid.undo());
//! assert_eq!(grid.placement("A").unwrap().anchor, Position::new(0, 0));
//! ```

pub mod arrange;
pub mod config;
pub mod grid;
pub mod history;
pub mod placement;
pub mod shape;
pub mod snapshot;

pub use arrange::ArrangeReport;
pub use config::{ConfigError, GridConfig};
pub use grid::{Grid, InvariantViolation, ItemId, Placement, Position};
pub use history::Operation;
pub use placement::PlaceError;
pub use shape::{Rotation, Shape, ShapeError};
pub use snapshot::{InventorySnapshot, RestoreError, SavedPlacement};
