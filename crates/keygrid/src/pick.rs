#![forbid(unsafe_code)]

//! `keygrid pick`: the interactive overlay.
//!
//! The terminal shows a scaled mini-map of the addressed screen. The event
//! loop never sleeps: it polls for input until the session's next deadline,
//! then lets the session fire due dispatches.

use std::io::{self, Write};
use std::time::Duration;

use clap::Args;
use keygrid_core::event::Event;
use keygrid_core::geometry::Rect;
use keygrid_runtime::config::KeygridConfig;
use keygrid_runtime::effects::PointerDispatcher;
use keygrid_runtime::session::{Control, Session, SessionEnd};
use web_time::Instant;

use crate::cli::GlobalArgs;
use crate::error::{CliError, Result};
use crate::overlay::TerminalRenderer;
use crate::pointer::{Backend, PrintDispatcher, XdotoolDispatcher, probe_display_size};
use crate::terminal::{Input, TerminalSession};

/// Poll timeout while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, Args)]
pub struct PickArgs {
    /// Pointer backend.
    #[arg(long, value_enum, default_value_t = Backend::Print)]
    pub backend: Backend,
}

pub fn run_pick(global: &GlobalArgs, args: PickArgs) -> Result<()> {
    let config = global.load_config()?;
    match args.backend {
        Backend::Print => {
            let screen = global.screen(&config, || None)?;
            let (end, dispatcher) = pick_with(&config, screen, PrintDispatcher::new(Vec::new()))?;
            // The terminal is restored by now; stdout belongs to the caller again.
            let mut stdout = io::stdout().lock();
            stdout.write_all(&dispatcher.into_inner())?;
            stdout.flush()?;
            finish(end)
        }
        Backend::Xdotool => {
            let screen = global.screen(&config, probe_display_size)?;
            let dispatcher = XdotoolDispatcher::locate(screen)?;
            let (end, _) = pick_with(&config, screen, dispatcher)?;
            finish(end)
        }
    }
}

fn finish(end: Option<SessionEnd>) -> Result<()> {
    match end {
        Some(SessionEnd::Dispatched { ok: true, .. }) | None => Ok(()),
        Some(SessionEnd::Dispatched { ok: false, .. }) => Err(CliError::DispatchFailed),
        Some(SessionEnd::Cancelled) | Some(SessionEnd::Aborted) => Err(CliError::Cancelled),
    }
}

fn pick_with<P: PointerDispatcher>(
    config: &KeygridConfig,
    screen: Rect,
    dispatcher: P,
) -> Result<(Option<SessionEnd>, P)> {
    let terminal = TerminalSession::new()?;
    let (cols, rows) = terminal.size()?;
    let renderer = TerminalRenderer::new(io::stdout(), cols, rows);
    let mut session = Session::start(config, screen, renderer, dispatcher)?;
    tracing::info!(
        target: "keygrid.session",
        screen = %screen,
        cols,
        rows,
        "overlay shown"
    );

    loop {
        if let Some(err) = session.renderer_mut().take_error() {
            return Err(err.into());
        }

        let now = Instant::now();
        let timeout = session
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| deadline.saturating_duration_since(now));

        if terminal.poll(timeout)? {
            match terminal.read()? {
                Some(Input::Key(key)) => {
                    if session.handle_event(&Event::Key(key), Instant::now())? == Control::Exit {
                        break;
                    }
                }
                Some(Input::Resized { cols, rows }) => {
                    session.renderer_mut().set_size(cols, rows);
                    session.redraw();
                }
                None => {}
            }
        }

        if session.tick(Instant::now()) == Control::Exit {
            break;
        }
    }

    let end = session.end();
    let (_, dispatcher) = session.into_parts();
    drop(terminal);
    Ok((end, dispatcher))
}
