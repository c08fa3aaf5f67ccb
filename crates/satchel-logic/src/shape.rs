//! Item shapes and quarter-turn rotation.
//!
//! A `Shape` is an immutable occupancy mask relative to its own top-left
//! origin. Rotation is a pure transform that produces a new mask; callers
//! compose quarter turns through [`Shape::rotated`] when they need a
//! specific orientation.

use crate::config::MAX_GRID_CELLS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A polyomino occupancy mask, stored row-major.
///
/// Serializes as text rows (see [`Shape::from_rows`]) so saved shapes are
/// validated again on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

/// Why a shape could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Width or height is zero.
    ZeroDimension,
    /// More cells than any grid can hold.
    TooLarge { width: usize, height: usize },
    /// Cell vector length does not equal width × height.
    CellCountMismatch { expected: usize, actual: usize },
    /// Text rows have different lengths.
    RaggedRows { row: usize },
    /// Text row contains something other than `#` or `.`.
    UnknownGlyph(char),
    /// No cell is filled.
    Empty,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::ZeroDimension => write!(f, "shape has a zero dimension"),
            ShapeError::TooLarge { width, height } => {
                write!(f, "{}×{} shape exceeds {} cells", width, height, MAX_GRID_CELLS)
            }
            ShapeError::CellCountMismatch { expected, actual } => {
                write!(f, "expected {} cells, got {}", expected, actual)
            }
            ShapeError::RaggedRows { row } => write!(f, "row {} has a different length", row),
            ShapeError::UnknownGlyph(c) => write!(f, "unknown shape glyph {:?}", c),
            ShapeError::Empty => write!(f, "shape has no filled cells"),
        }
    }
}

impl std::error::Error for ShapeError {}

impl Shape {
    /// Build a shape from a row-major cell vector.
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, ShapeError> {
        if width == 0 || height == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        let area = Self::checked_area(width, height)?;
        if cells.len() != area {
            return Err(ShapeError::CellCountMismatch {
                expected: area,
                actual: cells.len(),
            });
        }
        if !cells.iter().any(|&c| c) {
            return Err(ShapeError::Empty);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A solid `width × height` rectangle.
    pub fn filled(width: usize, height: usize) -> Result<Self, ShapeError> {
        if width == 0 || height == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        let area = Self::checked_area(width, height)?;
        Self::new(width, height, vec![true; area])
    }

    fn checked_area(width: usize, height: usize) -> Result<usize, ShapeError> {
        width
            .checked_mul(height)
            .filter(|&area| area <= MAX_GRID_CELLS)
            .ok_or(ShapeError::TooLarge { width, height })
    }

    /// Parse a shape from text rows, `#` for filled and `.` for empty.
    ///
    /// ```
    /// use satchel_logic::shape::Shape;
    ///
    /// let l = Shape::from_rows(&["#.", "#.", "##"]).unwrap();
    /// assert_eq!((l.width(), l.height()), (2, 3));
    /// assert_eq!(l.cell_count(), 4);
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ShapeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let mut cells = Vec::with_capacity(width * height);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(ShapeError::RaggedRows { row: i });
            }
            for c in row.chars() {
                match c {
                    '#' => cells.push(true),
                    '.' => cells.push(false),
                    other => return Err(ShapeError::UnknownGlyph(other)),
                }
            }
        }
        Self::new(width, height, cells)
    }

    /// Inverse of [`Shape::from_rows`].
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|&c| if c { '#' } else { '.' }).collect())
            .collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at shape-local `(x, y)` is filled. Out of range is `false`.
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Number of filled cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Shape-local coordinates of every filled cell, row by row.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(move |(i, _)| (i % self.width, i / self.width))
    }

    /// Rotate 90° clockwise.
    ///
    /// Column `x` of the input becomes row `x` of the output, read bottom
    /// to top. The input is left untouched.
    pub fn rotate90(&self) -> Shape {
        let (w, h) = (self.height, self.width);
        let mut cells = vec![false; w * h];
        for ny in 0..h {
            for nx in 0..w {
                cells[ny * w + nx] = self.cells[(self.height - 1 - nx) * self.width + ny];
            }
        }
        Shape {
            width: w,
            height: h,
            cells,
        }
    }

    /// This shape turned to `rotation`.
    pub fn rotated(&self, rotation: Rotation) -> Shape {
        let mut shape = self.clone();
        for _ in 0..rotation.quarter_turns() {
            shape = shape.rotate90();
        }
        shape
    }
}

impl TryFrom<Vec<String>> for Shape {
    type Error = ShapeError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Shape::from_rows(&rows)
    }
}

impl From<Shape> for Vec<String> {
    fn from(shape: Shape) -> Self {
        shape.to_rows()
    }
}

/// One of the four clockwise orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Search order used by auto-placement.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// `None` unless `degrees` is one of 0, 90, 180, 270.
    pub fn from_degrees(degrees: u16) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_piece() -> Shape {
        Shape::from_rows(&["#.", "#.", "##"]).unwrap()
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let r = l_piece().rotate90();
        assert_eq!(r.width(), 3);
        assert_eq!(r.height(), 2);
    }

    #[test]
    fn test_rotate_is_clockwise() {
        // #.      ###
        // #.  ->  #..
        // ##
        let r = l_piece().rotate90();
        assert_eq!(r, Shape::from_rows(&["###", "#.."]).unwrap());
    }

    #[test]
    fn test_four_rotations_identity() {
        let shapes = [
            l_piece(),
            Shape::from_rows(&[".#.", "###"]).unwrap(),
            Shape::from_rows(&["##..", ".###", "...#"]).unwrap(),
            Shape::filled(1, 4).unwrap(),
        ];
        for s in shapes {
            let back = s.rotate90().rotate90().rotate90().rotate90();
            assert_eq!(back, s);
        }
    }

    #[test]
    fn test_half_turn_point_reflects() {
        let s = l_piece();
        let r = s.rotate90().rotate90();
        assert_eq!((r.width(), r.height()), (s.width(), s.height()));
        for y in 0..s.height() {
            for x in 0..s.width() {
                assert_eq!(
                    r.is_filled(x, y),
                    s.is_filled(s.width() - 1 - x, s.height() - 1 - y)
                );
            }
        }
    }

    #[test]
    fn test_rotate_leaves_input_untouched() {
        let s = l_piece();
        let copy = s.clone();
        let _ = s.rotate90();
        assert_eq!(s, copy);
    }

    #[test]
    fn test_rotated_matches_repeated_rotate90() {
        let s = l_piece();
        assert_eq!(s.rotated(Rotation::Deg0), s);
        assert_eq!(s.rotated(Rotation::Deg270), s.rotate90().rotate90().rotate90());
        assert_eq!(s.rotated(Rotation::Deg90).rotated(Rotation::Deg90.inverse()), s);
    }

    #[test]
    fn test_filled_cells_order() {
        let cells: Vec<_> = l_piece().filled_cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(Shape::filled(0, 2), Err(ShapeError::ZeroDimension));
        assert_eq!(
            Shape::new(2, 2, vec![true; 3]),
            Err(ShapeError::CellCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            Shape::from_rows(&["##", "#"]),
            Err(ShapeError::RaggedRows { row: 1 })
        );
        assert_eq!(Shape::from_rows(&["#x"]), Err(ShapeError::UnknownGlyph('x')));
        assert_eq!(Shape::from_rows(&["..", ".."]), Err(ShapeError::Empty));
        let empty: [&str; 0] = [];
        assert_eq!(Shape::from_rows(&empty), Err(ShapeError::ZeroDimension));
    }

    #[test]
    fn test_oversized_shape_is_rejected() {
        assert_eq!(
            Shape::new(usize::MAX, 2, vec![true]),
            Err(ShapeError::TooLarge {
                width: usize::MAX,
                height: 2
            })
        );
        assert_eq!(
            Shape::filled(1 << 20, 1 << 20),
            Err(ShapeError::TooLarge {
                width: 1 << 20,
                height: 1 << 20
            })
        );
        assert_eq!(Shape::filled(256, 256).map(|s| s.cell_count()), Ok(65_536));
    }

    #[test]
    fn test_text_rows_roundtrip() {
        let s = l_piece();
        assert_eq!(s.to_rows(), vec!["#.", "#.", "##"]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r###"["#.","#.","##"]"###);
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(serde_json::from_str::<Shape>(r#"["..",".."]"#).is_err());
    }

    #[test]
    fn test_rotation_degrees() {
        for r in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(r.degrees()), Some(r));
        }
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Deg90.degrees(), 90);
    }
}
