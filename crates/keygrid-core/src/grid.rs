#![forbid(unsafe_code)]

//! Main-grid geometry.
//!
//! [`GridMap::build`] tiles a rectangle into `rows x cols` cells. Each cell is
//! addressed by a two-letter [`Label`]: the row key followed by the column
//! key. Because keys are distinct within an axis, every `(row, col)` pair
//! maps to exactly one label and vice versa.
//!
//! # Example
//!
//! ```
//! use keygrid_core::alphabet::Alphabet;
//! use keygrid_core::error::Axis;
//! use keygrid_core::geometry::{Point, Rect};
//! use keygrid_core::grid::{GridMap, Label};
//!
//! let rows = Alphabet::new(Axis::Rows, "QWE").unwrap();
//! let cols = Alphabet::new(Axis::Cols, "ASD").unwrap();
//! let grid = GridMap::build(Rect::from_size(1200, 900), rows, cols).unwrap();
//!
//! let cell = grid.get(Label::new('E', 'D')).unwrap();
//! assert_eq!(cell.center, Point::new(1000, 750));
//! assert_eq!(cell.bounds, Rect::new(800, 600, 400, 300));
//! ```

use rustc_hash::FxHashMap;

use crate::alphabet::Alphabet;
use crate::error::{GeometryError, Result};
use crate::geometry::{Point, Rect};

/// Two-letter address of a main-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub row: char,
    pub col: char,
}

impl Label {
    /// Build a label, normalizing both keys to uppercase.
    #[inline]
    pub fn new(row: char, col: char) -> Self {
        Self {
            row: row.to_ascii_uppercase(),
            col: col.to_ascii_uppercase(),
        }
    }

    /// Parse a two-character label such as `"qa"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(row), Some(col), None) => Some(Self::new(row, col)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.row, self.col)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One main-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    pub label: Label,
    pub row: usize,
    pub col: usize,
    pub center: Point,
    pub bounds: Rect,
}

/// Label -> cell mapping for one overlay rectangle.
#[derive(Debug, Clone)]
pub struct GridMap {
    area: Rect,
    rows: Alphabet,
    cols: Alphabet,
    /// Row-major.
    cells: Vec<Cell>,
    index: FxHashMap<Label, usize>,
}

impl GridMap {
    /// Tile `area` into one cell per `(row key, column key)` pair.
    ///
    /// # Errors
    ///
    /// [`GeometryError::DegenerateRect`] when `area` has no positive width or
    /// height, and [`GeometryError::RectTooSmall`] when a slice would be
    /// narrower than one pixel.
    pub fn build(area: Rect, rows: Alphabet, cols: Alphabet) -> Result<Self> {
        if area.is_empty() {
            return Err(GeometryError::DegenerateRect { rect: area });
        }
        let (n_rows, n_cols) = (rows.len(), cols.len());
        if (area.width as usize) < n_cols || (area.height as usize) < n_rows {
            return Err(GeometryError::RectTooSmall {
                rect: area,
                rows: n_rows,
                cols: n_cols,
            });
        }

        let mut cells = Vec::with_capacity(n_rows * n_cols);
        let mut index = FxHashMap::default();
        index.reserve(n_rows * n_cols);
        for (r, row_key) in rows.iter().enumerate() {
            for (c, col_key) in cols.iter().enumerate() {
                let (bounds, center) = area.tile(r, c, n_rows, n_cols);
                let label = Label::new(row_key, col_key);
                index.insert(label, cells.len());
                cells.push(Cell {
                    label,
                    row: r,
                    col: c,
                    center,
                    bounds,
                });
            }
        }

        tracing::trace!(
            target: "keygrid.grid",
            area = %area,
            rows = n_rows,
            cols = n_cols,
            "grid built"
        );

        Ok(Self {
            area,
            rows,
            cols,
            cells,
            index,
        })
    }

    /// The rectangle this grid tiles.
    #[inline]
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Row alphabet.
    #[inline]
    pub fn rows(&self) -> &Alphabet {
        &self.rows
    }

    /// Column alphabet.
    #[inline]
    pub fn cols(&self) -> &Alphabet {
        &self.cols
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Label of the cell at `(row, col)`, or `None` when out of range.
    pub fn label_for(&self, row: usize, col: usize) -> Option<Label> {
        Some(Label::new(self.rows.get(row)?, self.cols.get(col)?))
    }

    /// Look up a cell by label.
    pub fn get(&self, label: Label) -> Option<&Cell> {
        self.index.get(&label).map(|&i| &self.cells[i])
    }

    /// Look up a cell by position.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.rows.len() || col >= self.cols.len() {
            return None;
        }
        self.cells.get(row * self.cols.len() + col)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Vertical boundary x-coordinates, left edge first, right edge last.
    pub fn col_edges(&self) -> Vec<i32> {
        let mut edges: Vec<i32> = self
            .cells
            .iter()
            .take(self.cols.len())
            .map(|cell| cell.bounds.x_min())
            .collect();
        edges.push(self.area.x_max());
        edges
    }

    /// Horizontal boundary y-coordinates, top edge first, bottom edge last.
    pub fn row_edges(&self) -> Vec<i32> {
        let mut edges: Vec<i32> = self
            .cells
            .iter()
            .step_by(self.cols.len())
            .map(|cell| cell.bounds.y_min())
            .collect();
        edges.push(self.area.y_max());
        edges
    }
}
