#![forbid(unsafe_code)]

//! Pointer backends.
//!
//! - [`PrintDispatcher`] writes `move X Y` / `click X Y` lines for another
//!   program to act on.
//! - [`XdotoolDispatcher`] drives the X11 pointer through the `xdotool`
//!   command.

use std::io::Write;
use std::process::Command;

use clap::ValueEnum;
use keygrid_core::geometry::{Point, Rect};
use keygrid_core::selection::PointerAction;
use keygrid_runtime::effects::{DispatchError, PointerDispatcher};

use crate::error::{CliError, Result};

pub const XDOTOOL: &str = "xdotool";

/// Selectable backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Print the action and coordinates.
    #[default]
    Print,
    /// Move the X11 pointer with xdotool.
    Xdotool,
}

/// Writes one line per action.
#[derive(Debug)]
pub struct PrintDispatcher<W: Write> {
    out: W,
}

impl<W: Write> PrintDispatcher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, action: PointerAction, target: Point) -> std::result::Result<(), DispatchError> {
        writeln!(self.out, "{action} {} {}", target.x, target.y)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> PointerDispatcher for PrintDispatcher<W> {
    fn move_to(&mut self, target: Point) -> std::result::Result<(), DispatchError> {
        self.emit(PointerAction::Move, target)
    }

    fn click(&mut self, target: Point) -> std::result::Result<(), DispatchError> {
        self.emit(PointerAction::Click, target)
    }
}

/// Runs `xdotool mousemove` (and `click 1`).
#[derive(Debug, Clone)]
pub struct XdotoolDispatcher {
    program: String,
    screen: Rect,
}

impl XdotoolDispatcher {
    /// Locate `xdotool` on `PATH`.
    pub fn locate(screen: Rect) -> Result<Self> {
        let program = which::which(XDOTOOL).map_err(|_| CliError::MissingCommand {
            command: XDOTOOL.to_string(),
        })?;
        Ok(Self {
            program: program.to_string_lossy().into_owned(),
            screen,
        })
    }

    /// Argument list for one action.
    #[must_use]
    pub fn args(action: PointerAction, target: Point) -> Vec<String> {
        let mut args = vec![
            "mousemove".to_string(),
            target.x.to_string(),
            target.y.to_string(),
        ];
        if action == PointerAction::Click {
            args.extend(["click".to_string(), "1".to_string()]);
        }
        args
    }

    fn run(&self, action: PointerAction, target: Point) -> std::result::Result<(), DispatchError> {
        if !self.screen.contains(target) {
            return Err(DispatchError::OutOfBounds {
                target,
                screen: self.screen,
            });
        }
        let status = Command::new(&self.program)
            .args(Self::args(action, target))
            .status()
            .map_err(|source| DispatchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(DispatchError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

impl PointerDispatcher for XdotoolDispatcher {
    fn move_to(&mut self, target: Point) -> std::result::Result<(), DispatchError> {
        self.run(PointerAction::Move, target)
    }

    fn click(&mut self, target: Point) -> std::result::Result<(), DispatchError> {
        self.run(PointerAction::Click, target)
    }
}

/// Ask xdotool for the display size.
pub fn probe_display_size() -> Option<Rect> {
    let program = which::which(XDOTOOL).ok()?;
    let output = Command::new(program)
        .arg("getdisplaygeometry")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rect = parse_display_geometry(&String::from_utf8_lossy(&output.stdout));
    tracing::debug!(target: "keygrid.pointer", ?rect, "display geometry probed");
    rect
}

fn parse_display_geometry(text: &str) -> Option<Rect> {
    let mut parts = text.split_whitespace().map(str::parse::<i32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(width)), Some(Ok(height))) if width > 0 && height > 0 => {
            Some(Rect::from_size(width, height))
        }
        _ => None,
    }
}
