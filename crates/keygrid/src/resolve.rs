#![forbid(unsafe_code)]

//! `keygrid resolve`: run a key string through a headless session.
//!
//! Prints the line the `print` backend would have written, or a JSON object
//! with `--json`. Useful for scripting and for checking a layout without
//! opening the overlay.

use std::io::{self, Write};

use clap::Args;
use keygrid_core::event::{Event, KeyEvent};
use keygrid_core::geometry::{Point, Rect};
use keygrid_core::grid::Label;
use keygrid_core::selection::PointerAction;
use keygrid_runtime::config::KeygridConfig;
use keygrid_runtime::recording::{RecordingDispatcher, RecordingRenderer};
use keygrid_runtime::session::{Control, Session, SessionEnd};
use serde::Serialize;
use web_time::Instant;

use crate::cli::GlobalArgs;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Keys as typed, e.g. `qaa`.
    pub keys: String,

    /// Print a JSON object instead of `ACTION X Y`.
    #[arg(long)]
    pub json: bool,
}

/// Where a key string leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub action: PointerAction,
    pub x: i32,
    pub y: i32,
    /// Main-grid cell containing the target.
    pub cell: Option<Label>,
}

impl Resolution {
    pub fn target(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub fn run_resolve(global: &GlobalArgs, args: ResolveArgs) -> Result<()> {
    let config = global.load_config()?;
    let screen = global.screen(&config, || None)?;
    let resolution = resolve_keys(&config, screen, &args.keys)?;
    write_resolution(&mut io::stdout().lock(), &resolution, args.json)
}

/// Feed `keys` one character at a time and report the dispatched target.
pub fn resolve_keys(config: &KeygridConfig, screen: Rect, keys: &str) -> Result<Resolution> {
    let mut config = config.clone();
    config.session.single_shot = true;

    let mut session = Session::start(
        &config,
        screen,
        RecordingRenderer::default(),
        RecordingDispatcher::default(),
    )?;
    let now = Instant::now();
    for ch in keys.chars() {
        if session.handle_event(&Event::Key(KeyEvent::char(ch)), now)? == Control::Exit {
            break;
        }
    }
    if let Some(deadline) = session.next_deadline() {
        session.tick(deadline);
    }

    match session.end() {
        Some(SessionEnd::Dispatched { action, target, .. }) => Ok(Resolution {
            action,
            x: target.x,
            y: target.y,
            cell: session
                .selector()
                .grid()
                .cells()
                .iter()
                .find(|cell| cell.bounds.contains(target))
                .map(|cell| cell.label),
        }),
        Some(SessionEnd::Cancelled) => Err(CliError::Cancelled),
        Some(SessionEnd::Aborted) | None => Err(CliError::Unresolved {
            keys: keys.to_string(),
        }),
    }
}

pub fn write_resolution<W: Write>(out: &mut W, resolution: &Resolution, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, resolution)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{} {} {}", resolution.action, resolution.x, resolution.y)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KeygridConfig {
        KeygridConfig::from_toml_str(
            "[grid]\nrows = \"QWE\"\ncols = \"ASD\"\n[subgrid]\nrows = 2\ncols = 2\nalphabet = \"ABCD\"\n",
        )
        .unwrap()
    }

    #[test]
    fn resolves_three_keys() {
        let resolution = resolve_keys(&config(), Rect::from_size(1200, 900), "qaa").unwrap();
        assert_eq!(resolution.target(), Point::new(100, 75));
        assert_eq!(resolution.cell, Some(Label::new('Q', 'A')));
        assert_eq!(resolution.action, PointerAction::Click);
    }

    #[test]
    fn invalid_keys_are_skipped() {
        let resolution = resolve_keys(&config(), Rect::from_size(1200, 900), "z1eDd").unwrap();
        assert_eq!(resolution.target(), Point::new(1100, 825));
        assert_eq!(resolution.cell, Some(Label::new('E', 'D')));
    }

    #[test]
    fn incomplete_sequence_is_unresolved() {
        let err = resolve_keys(&config(), Rect::from_size(1200, 900), "qa").unwrap_err();
        assert!(matches!(err, CliError::Unresolved { ref keys } if keys == "qa"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn letter_cancel_key_cancels() {
        let mut config = config();
        config.session.cancel_key = "x".into();
        let err = resolve_keys(&config, Rect::from_size(1200, 900), "qx").unwrap_err();
        assert!(matches!(err, CliError::Cancelled));
    }

    #[test]
    fn output_formats() {
        let resolution = Resolution {
            action: PointerAction::Move,
            x: 100,
            y: 75,
            cell: Some(Label::new('Q', 'A')),
        };
        let mut text = Vec::new();
        write_resolution(&mut text, &resolution, false).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "move 100 75\n");

        let mut json = Vec::new();
        write_resolution(&mut json, &resolution, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["action"], "move");
        assert_eq!(value["cell"], "QA");
        assert_eq!(value["x"], 100);
    }
}
