use thiserror::Error;

use crate::geometry::Rect;

/// Which alphabet a configuration problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
    Sub,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Axis::Rows => "row",
            Axis::Cols => "column",
            Axis::Sub => "sub-grid",
        })
    }
}

/// Geometry could not be built from the supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("{axis} alphabet is empty")]
    EmptyAlphabet { axis: Axis },

    #[error("{axis} alphabet contains non-letter {ch:?}")]
    NonAlphabetic { axis: Axis, ch: char },

    #[error("{axis} alphabet repeats key {ch:?}")]
    DuplicateKey { axis: Axis, ch: char },

    #[error("rectangle {rect} has no area")]
    DegenerateRect { rect: Rect },

    #[error("rectangle {rect} is too small for a {rows}x{cols} grid")]
    RectTooSmall { rect: Rect, rows: usize, cols: usize },

    #[error("sub-grid needs at least one row and one column, got {rows}x{cols}")]
    EmptySubGrid { rows: usize, cols: usize },

    #[error("sub-grid {rows}x{cols} exceeds {max} per side")]
    SubGridTooLarge { rows: usize, cols: usize, max: usize },
}

/// A label the alphabet invariants guarantee to exist was missing from its
/// mapping. Reaching this means geometry construction is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("label {label} has no cell in the current grid")]
pub struct LookupInconsistency {
    pub label: String,
}

pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_axis() {
        let err = GeometryError::DuplicateKey {
            axis: Axis::Cols,
            ch: 'A',
        };
        assert_eq!(err.to_string(), "column alphabet repeats key 'A'");
    }

    #[test]
    fn degenerate_rect_message() {
        let err = GeometryError::DegenerateRect {
            rect: Rect::from_size(0, 900),
        };
        assert_eq!(err.to_string(), "rectangle (0,0)-(0,900) has no area");
    }
}
