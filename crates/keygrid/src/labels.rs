#![forbid(unsafe_code)]

//! `keygrid labels`: dump the main-grid table.

use std::io::{self, Write};

use clap::Args;
use keygrid_core::grid::GridMap;

use crate::cli::GlobalArgs;
use crate::error::Result;

#[derive(Debug, Clone, Default, Args)]
pub struct LabelsArgs {
    /// Print a JSON array of cells.
    #[arg(long)]
    pub json: bool,
}

pub fn run_labels(global: &GlobalArgs, args: LabelsArgs) -> Result<()> {
    let config = global.load_config()?;
    let screen = global.screen(&config, || None)?;
    let grid = GridMap::build(screen, config.row_alphabet()?, config.col_alphabet()?)
        .map_err(keygrid_runtime::config::ConfigError::from)?;
    write_labels(&mut io::stdout().lock(), &grid, args.json)
}

/// One `LABEL X Y` line per cell in row-major order, or the cells as JSON.
pub fn write_labels<W: Write>(out: &mut W, grid: &GridMap, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, grid.cells())?;
        writeln!(out)?;
        return Ok(());
    }
    for cell in grid.cells() {
        writeln!(out, "{} {} {}", cell.label, cell.center.x, cell.center.y)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygrid_core::alphabet::Alphabet;
    use keygrid_core::error::Axis;
    use keygrid_core::geometry::Rect;

    fn grid() -> GridMap {
        GridMap::build(
            Rect::from_size(1200, 900),
            Alphabet::new(Axis::Rows, "QWE").unwrap(),
            Alphabet::new(Axis::Cols, "ASD").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn text_table_is_row_major() {
        let mut out = Vec::new();
        write_labels(&mut out, &grid(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "QA 200 150");
        assert_eq!(lines[1], "QS 600 150");
        assert_eq!(lines[8], "ED 1000 750");
    }

    #[test]
    fn json_cells_carry_bounds() {
        let mut out = Vec::new();
        write_labels(&mut out, &grid(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let cells = value.as_array().unwrap();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0]["label"], "QA");
        assert_eq!(cells[0]["center"]["x"], 200);
        assert_eq!(cells[8]["bounds"]["width"], 400);
    }
}
