#![forbid(unsafe_code)]

//! Second-level refinement inside one main-grid cell.
//!
//! A [`SubGridLayout`] is fixed for a session; [`SubGridMap::build`] applies
//! it to whichever cell the user picked. Sub-cells are labeled row-major from
//! a flat alphabet. If the alphabet is shorter than `rows * cols`, the
//! trailing positions stay unlabeled and cannot be selected; extra letters
//! are ignored.

use crate::alphabet::Alphabet;
use crate::error::{GeometryError, Result};
use crate::geometry::{Point, Rect};

/// Largest sub-grid dimension. Alphabets hold at most 26 letters, so a
/// longer axis could never be fully labeled.
pub const MAX_SUB_DIMENSION: usize = 26;

/// Sub-grid dimensions and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGridLayout {
    rows: usize,
    cols: usize,
    alphabet: Alphabet,
}

impl SubGridLayout {
    /// # Errors
    ///
    /// [`GeometryError::EmptySubGrid`] when either dimension is zero,
    /// [`GeometryError::SubGridTooLarge`] when either exceeds
    /// [`MAX_SUB_DIMENSION`].
    pub fn new(rows: usize, cols: usize, alphabet: Alphabet) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GeometryError::EmptySubGrid { rows, cols });
        }
        if rows > MAX_SUB_DIMENSION || cols > MAX_SUB_DIMENSION {
            return Err(GeometryError::SubGridTooLarge {
                rows,
                cols,
                max: MAX_SUB_DIMENSION,
            });
        }
        Ok(Self {
            rows,
            cols,
            alphabet,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of positions in the layout.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Positions that will never get a label.
    #[inline]
    pub fn unassigned(&self) -> usize {
        self.capacity().saturating_sub(self.alphabet.len())
    }

    /// Letters beyond the layout's capacity.
    #[inline]
    pub fn unused_letters(&self) -> usize {
        self.alphabet.len().saturating_sub(self.capacity())
    }
}

/// Labeled sub-cell centers for one parent box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGridMap {
    parent: Rect,
    rows: usize,
    cols: usize,
    /// `(label, center)` in row-major order; shorter than `rows * cols`
    /// when the alphabet ran out.
    centers: Vec<(char, Point)>,
}

impl SubGridMap {
    /// Partition `parent` according to `layout`.
    ///
    /// # Errors
    ///
    /// [`GeometryError::DegenerateRect`] when `parent` has no area.
    pub fn build(parent: Rect, layout: &SubGridLayout) -> Result<Self> {
        if parent.is_empty() {
            return Err(GeometryError::DegenerateRect { rect: parent });
        }
        let (rows, cols) = (layout.rows, layout.cols);
        let centers: Vec<(char, Point)> = layout
            .alphabet
            .iter()
            .take(layout.capacity())
            .enumerate()
            .map(|(i, key)| (key, parent.tile(i / cols, i % cols, rows, cols).1))
            .collect();

        if centers.len() < layout.capacity() {
            tracing::debug!(
                target: "keygrid.grid",
                parent = %parent,
                assigned = centers.len(),
                capacity = layout.capacity(),
                "sub-grid alphabet exhausted before layout was filled"
            );
        }

        Ok(Self {
            parent,
            rows,
            cols,
            centers,
        })
    }

    /// The cell this sub-grid refines.
    #[inline]
    pub fn parent(&self) -> Rect {
        self.parent
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of labeled positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Center for `key` (case-insensitive), if it labels a position.
    pub fn get(&self, key: char) -> Option<Point> {
        let key = key.to_ascii_uppercase();
        self.centers
            .iter()
            .find_map(|&(k, p)| (k == key).then_some(p))
    }

    /// Labeled centers in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (char, Point)> + '_ {
        self.centers.iter().copied()
    }
}
