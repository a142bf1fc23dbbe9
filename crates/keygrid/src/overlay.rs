#![forbid(unsafe_code)]

//! Terminal overlay: the addressed screen drawn as a scaled mini-map.
//!
//! The main grid is projected onto the whole terminal minus a status line.
//! When a cell is chosen the view zooms so that cell fills the terminal and
//! its sub-grid labels are readable. Frames are composed on a [`Canvas`]
//! first, then written in one pass.
//!
//! Write errors are logged and remembered; the pick loop checks
//! [`TerminalRenderer::take_error`] after each step.

use std::io::{self, Write};

use crossterm::style::Stylize;
use crossterm::{cursor, queue, style, terminal};
use keygrid_core::geometry::{Point, Rect};
use keygrid_core::grid::{GridMap, Label};
use keygrid_core::subgrid::SubGridMap;
use keygrid_runtime::effects::OverlayRenderer;

const MAIN_HINT: &str = "type a row key then a column key, Esc to cancel";

/// Character frame for one overlay view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<char>,
}

impl Canvas {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![' '; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, col: u16, row: u16) -> Option<char> {
        (col < self.cols && row < self.rows)
            .then(|| self.cells[row as usize * self.cols as usize + col as usize])
    }

    pub fn put(&mut self, col: u16, row: u16, ch: char) {
        if col < self.cols && row < self.rows {
            self.cells[row as usize * self.cols as usize + col as usize] = ch;
        }
    }

    /// Write `text` centered on `col`, shifted to stay inside the frame.
    pub fn put_centered(&mut self, col: u16, row: u16, text: &str) {
        let len = text.chars().count() as u16;
        if len == 0 || len > self.cols {
            return;
        }
        let start = col.saturating_sub(len / 2).min(self.cols - len);
        for (i, ch) in text.chars().enumerate() {
            self.put(start + i as u16, row, ch);
        }
    }

    fn vline(&mut self, col: u16) {
        for row in 0..self.rows {
            let ch = if self.get(col, row) == Some('─') { '┼' } else { '│' };
            self.put(col, row, ch);
        }
    }

    fn hline(&mut self, row: u16) {
        for col in 0..self.cols {
            let ch = if self.get(col, row) == Some('│') { '┼' } else { '─' };
            self.put(col, row, ch);
        }
    }

    /// One string per terminal row.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.cols.max(1) as usize)
            .map(|row| row.iter().collect())
    }
}

/// Maps screen pixels within `view` onto a `cols x rows` canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    view: Rect,
    cols: u16,
    rows: u16,
}

impl Projection {
    #[must_use]
    pub fn new(view: Rect, cols: u16, rows: u16) -> Self {
        Self { view, cols, rows }
    }

    pub fn col(&self, x: i32) -> u16 {
        scale(x, self.view.x, self.view.width, self.cols)
    }

    pub fn row(&self, y: i32) -> u16 {
        scale(y, self.view.y, self.view.height, self.rows)
    }

    pub fn point(&self, p: Point) -> (u16, u16) {
        (self.col(p.x), self.row(p.y))
    }
}

fn scale(value: i32, origin: i32, extent: i32, cells: u16) -> u16 {
    if extent <= 0 || cells == 0 {
        return 0;
    }
    let offset = i64::from(value) - i64::from(origin);
    let cell = offset * i64::from(cells) / i64::from(extent);
    cell.clamp(0, i64::from(cells) - 1) as u16
}

/// Grid lines for the interior edges plus one label per cell center.
#[must_use]
pub fn main_grid_canvas(grid: &GridMap, cols: u16, rows: u16) -> Canvas {
    let mut canvas = Canvas::new(cols, rows);
    let proj = Projection::new(grid.area(), cols, rows);
    let row_edges = grid.row_edges();
    let col_edges = grid.col_edges();
    for &y in &row_edges[1..row_edges.len() - 1] {
        canvas.hline(proj.row(y));
    }
    for &x in &col_edges[1..col_edges.len() - 1] {
        canvas.vline(proj.col(x));
    }
    for cell in grid.cells() {
        let (col, row) = proj.point(cell.center);
        canvas.put_centered(col, row, &cell.label.to_string());
    }
    canvas
}

/// The chosen cell zoomed to the full frame with its sub-cell labels.
#[must_use]
pub fn sub_grid_canvas(map: &SubGridMap, cols: u16, rows: u16) -> Canvas {
    let mut canvas = Canvas::new(cols, rows);
    let parent = map.parent();
    let proj = Projection::new(parent, cols, rows);
    for r in 1..map.rows() {
        let (bounds, _) = parent.tile(r, 0, map.rows(), map.cols());
        canvas.hline(proj.row(bounds.y_min()));
    }
    for c in 1..map.cols() {
        let (bounds, _) = parent.tile(0, c, map.rows(), map.cols());
        canvas.vline(proj.col(bounds.x_min()));
    }
    for (key, center) in map.iter() {
        let (col, row) = proj.point(center);
        canvas.put_centered(col, row, &key.to_string());
    }
    canvas
}

#[derive(Debug, Clone)]
enum View {
    Hidden,
    Main,
    Sub(SubGridMap),
}

/// [`OverlayRenderer`] drawing into a crossterm-capable writer.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    grid: Option<GridMap>,
    view: View,
    error: Option<io::Error>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        Self {
            out,
            cols,
            rows,
            grid: None,
            view: View::Hidden,
            error: None,
        }
    }

    /// Adopt a new terminal size. The caller redraws.
    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// First write error since the last call.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn body_rows(&self) -> u16 {
        self.rows.saturating_sub(1)
    }

    fn present(&mut self, canvas: &Canvas, status: &str) {
        let result = write_frame(&mut self.out, canvas, status);
        self.record(result);
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            tracing::error!(target: "keygrid.terminal", error = %err, "overlay write failed");
            self.error.get_or_insert(err);
        }
    }
}

fn write_frame<W: Write>(out: &mut W, canvas: &Canvas, status: &str) -> io::Result<()> {
    queue!(out, terminal::Clear(terminal::ClearType::All))?;
    for (row, line) in canvas.lines().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16), style::Print(line))?;
    }
    queue!(
        out,
        cursor::MoveTo(0, canvas.rows()),
        style::PrintStyledContent(style::style(status).reverse())
    )?;
    out.flush()
}

impl<W: Write> OverlayRenderer for TerminalRenderer<W> {
    fn draw_main_grid(&mut self, grid: &GridMap) {
        let canvas = main_grid_canvas(grid, self.cols, self.body_rows());
        self.grid = Some(grid.clone());
        self.view = View::Main;
        self.present(&canvas, MAIN_HINT);
    }

    fn draw_sub_grid(&mut self, cell: Label, map: &SubGridMap) {
        let canvas = sub_grid_canvas(map, self.cols, self.body_rows());
        self.view = View::Sub(map.clone());
        let status = format!("{cell}: type a sub-cell key, Esc to cancel");
        self.present(&canvas, &status);
    }

    fn highlight(&mut self, point: Point) {
        let (mut canvas, view) = match (&self.view, &self.grid) {
            (View::Sub(map), _) => (
                sub_grid_canvas(map, self.cols, self.body_rows()),
                map.parent(),
            ),
            (View::Main, Some(grid)) => (
                main_grid_canvas(grid, self.cols, self.body_rows()),
                grid.area(),
            ),
            _ => return,
        };
        let (col, row) = Projection::new(view, self.cols, self.body_rows()).point(point);
        canvas.put(col, row, '◆');
        self.present(&canvas, &format!("target {point}"));
    }

    fn clear_overlay(&mut self) {
        self.view = View::Hidden;
        let result = queue!(self.out, terminal::Clear(terminal::ClearType::All))
            .and_then(|()| self.out.flush());
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygrid_core::alphabet::Alphabet;
    use keygrid_core::error::Axis;
    use keygrid_core::subgrid::SubGridLayout;

    fn grid() -> GridMap {
        GridMap::build(
            Rect::from_size(1200, 900),
            Alphabet::new(Axis::Rows, "QWE").unwrap(),
            Alphabet::new(Axis::Cols, "ASD").unwrap(),
        )
        .unwrap()
    }

    fn text(canvas: &Canvas) -> Vec<String> {
        canvas.lines().collect()
    }

    #[test]
    fn projection_scales_and_clamps() {
        let proj = Projection::new(Rect::from_size(1200, 900), 60, 30);
        assert_eq!(proj.point(Point::new(0, 0)), (0, 0));
        assert_eq!(proj.point(Point::new(600, 450)), (30, 15));
        assert_eq!(proj.point(Point::new(5000, -10)), (59, 0));
    }

    #[test]
    fn main_grid_labels_at_scaled_centers() {
        let canvas = main_grid_canvas(&grid(), 60, 30);
        let lines = text(&canvas);
        // QA center (200,150) -> col 10, row 5.
        assert_eq!(lines[5].chars().skip(9).take(2).collect::<String>(), "QA");
        // ED center (1000,750) -> col 50, row 25.
        assert_eq!(lines[25].chars().skip(49).take(2).collect::<String>(), "ED");
    }

    #[test]
    fn main_grid_draws_interior_lines() {
        let canvas = main_grid_canvas(&grid(), 60, 30);
        assert_eq!(canvas.get(20, 0), Some('│'));
        assert_eq!(canvas.get(0, 10), Some('─'));
        assert_eq!(canvas.get(20, 10), Some('┼'));
        assert_eq!(canvas.get(0, 0), Some(' '));
    }

    #[test]
    fn sub_grid_fills_frame() {
        let layout = SubGridLayout::new(2, 2, Alphabet::new(Axis::Sub, "ABCD").unwrap()).unwrap();
        let map = SubGridMap::build(Rect::from_bounds(0, 0, 400, 300), &layout).unwrap();
        let canvas = sub_grid_canvas(&map, 40, 20);
        assert_eq!(canvas.get(10, 5), Some('A'));
        assert_eq!(canvas.get(30, 15), Some('D'));
        assert_eq!(canvas.get(20, 10), Some('┼'));
    }

    #[test]
    fn labels_stay_inside_narrow_frame() {
        let mut canvas = Canvas::new(4, 1);
        canvas.put_centered(3, 0, "QA");
        assert_eq!(text(&canvas), vec!["  QA".to_string()]);
        canvas.put_centered(0, 0, "WS");
        assert_eq!(text(&canvas), vec!["WSQA".to_string()]);
    }

    #[test]
    fn renderer_writes_frames() {
        let mut renderer = TerminalRenderer::new(Vec::new(), 60, 31);
        renderer.draw_main_grid(&grid());
        renderer.highlight(Point::new(200, 150));
        renderer.clear_overlay();
        assert!(renderer.take_error().is_none());
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("QA"));
        assert!(out.contains('◆'));
        assert!(out.contains("target (200, 150)"));
    }

    #[test]
    fn highlight_without_view_is_noop() {
        let mut renderer = TerminalRenderer::new(Vec::new(), 60, 31);
        renderer.highlight(Point::new(1, 1));
        assert!(renderer.into_inner().is_empty());
    }
}
