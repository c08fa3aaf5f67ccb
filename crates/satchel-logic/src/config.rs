//! Grid configuration and validation.
//!
//! The owning inventory decides the grid size once, when the grid is
//! created. History depth and arrange-undo granularity are tunable here too.
//!
//! ```
//! use satchel_logic::config::{validate_config, GridConfig};
//!
//! let config = GridConfig {
//!     width: 8,
//!     height: 4,
//!     ..GridConfig::default()
//! };
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest grid accepted, in cells.
pub const MAX_GRID_CELLS: usize = 65_536;

/// Default number of undo records kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Settings for a [`crate::grid::Grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Maximum undo records; the oldest is discarded past this.
    pub history_limit: usize,
    /// Record `auto_arrange` as one undo step instead of one per item.
    pub atomic_arrange: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 6,
            history_limit: DEFAULT_HISTORY_LIMIT,
            atomic_arrange: false,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWidth,
    ZeroHeight,
    /// Width × height exceeds [`MAX_GRID_CELLS`].
    GridTooLarge(usize),
    ZeroHistoryLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWidth => write!(f, "grid width must be at least 1"),
            ConfigError::ZeroHeight => write!(f, "grid height must be at least 1"),
            ConfigError::GridTooLarge(cells) => write!(
                f,
                "grid has {} cells, limit is {}",
                cells, MAX_GRID_CELLS
            ),
            ConfigError::ZeroHistoryLimit => write!(f, "history limit must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a grid configuration, returning all errors found.
pub fn validate_config(config: &GridConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.width == 0 {
        errors.push(ConfigError::ZeroWidth);
    }
    if config.height == 0 {
        errors.push(ConfigError::ZeroHeight);
    }
    let cells = config.width.saturating_mul(config.height);
    if cells > MAX_GRID_CELLS {
        errors.push(ConfigError::GridTooLarge(cells));
    }
    if config.history_limit == 0 {
        errors.push(ConfigError::ZeroHistoryLimit);
    }

    errors
}
