#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Coordinates are signed screen pixels with the origin at the top-left.
//! Rectangles are half-open: `x_min`/`y_min` are inclusive, `x_max`/`y_max`
//! exclusive, so two neighbouring tiles share exactly their boundary
//! coordinate.

/// An integer point on the addressable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle used for the overlay area and cell bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Create a rectangle from its corner coordinates.
    ///
    /// `x_max`/`y_max` are exclusive.
    #[inline]
    pub const fn from_bounds(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self::new(x_min, y_min, x_max - x_min, y_max - y_min)
    }

    /// Left edge (inclusive).
    #[inline]
    pub const fn x_min(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive).
    #[inline]
    pub const fn y_min(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn x_max(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn y_max(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels. Degenerate rectangles report zero.
    #[inline]
    pub const fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Check if the rectangle has no positive area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.x_max() && point.y >= self.y && point.y < self.y_max()
    }

    /// Center of the rectangle, rounded toward the top-left.
    #[inline]
    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Bounds and center of slice `(row, col)` when this rectangle is split
    /// into `rows x cols` equal tiles.
    ///
    /// Edges are computed as `origin + extent * i / n`, so the slices of one
    /// axis always sum to the full extent. The center is
    /// `origin + extent * (2i + 1) / (2n)`, which lies in `[edge_i, edge_i+1)`
    /// whenever the extent is positive.
    pub fn tile(&self, row: usize, col: usize, rows: usize, cols: usize) -> (Rect, Point) {
        let (x_min, x_max, cx) = axis_slice(self.x, self.width, col, cols);
        let (y_min, y_max, cy) = axis_slice(self.y, self.height, row, rows);
        (
            Rect::from_bounds(x_min, y_min, x_max, y_max),
            Point::new(cx, cy),
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.x_min(),
            self.y_min(),
            self.x_max(),
            self.y_max()
        )
    }
}

/// Split `[origin, origin + extent)` into `n` slices and return the edges
/// and center of slice `i`. Arithmetic runs in i128 so any `usize` count is
/// safe.
fn axis_slice(origin: i32, extent: i32, i: usize, n: usize) -> (i32, i32, i32) {
    let extent = i128::from(extent);
    let n = n.max(1) as i128;
    let i = i as i128;
    let lo = extent * i / n;
    let hi = extent * (i + 1) / n;
    let mid = extent * (2 * i + 1) / (2 * n);
    let origin = i128::from(origin);
    let clamp = |v: i128| v.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32;
    (clamp(origin + lo), clamp(origin + hi), clamp(origin + mid))
}
