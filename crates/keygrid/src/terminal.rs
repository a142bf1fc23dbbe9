#![forbid(unsafe_code)]

//! Terminal lifecycle and input translation for the interactive overlay.
//!
//! [`TerminalSession`] enters raw mode and the alternate screen and restores
//! both on drop, including on panic through a process-wide hook. Native
//! crossterm events are translated into keygrid events by [`translate`].

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event as ct;
use keygrid_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};

/// Input the pick loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// The terminal (not the addressed screen) changed size.
    Resized { cols: u16, rows: u16 },
}

/// Raw mode plus alternate screen, restored on drop.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
}

impl TerminalSession {
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::debug!(target: "keygrid.terminal", "raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
        };

        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
            crossterm::cursor::Hide
        )?;
        session.alternate_screen_enabled = true;
        tracing::debug!(target: "keygrid.terminal", "alternate screen enabled");

        Ok(session)
    }

    /// Terminal size in cells.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input.
    pub fn poll(&self, timeout: Duration) -> io::Result<bool> {
        ct::poll(timeout)
    }

    /// Read one event; `None` for events the overlay ignores.
    pub fn read(&self) -> io::Result<Option<Input>> {
        Ok(translate(ct::read()?))
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::debug!(target: "keygrid.terminal", "terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(
        stdout,
        crossterm::cursor::Show,
        crossterm::terminal::LeaveAlternateScreen
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Translate a crossterm event.
#[must_use]
pub fn translate(event: ct::Event) -> Option<Input> {
    match event {
        ct::Event::Key(key) => translate_key(key).map(Input::Key),
        ct::Event::Resize(cols, rows) => Some(Input::Resized { cols, rows }),
        _ => None,
    }
}

fn translate_key(key: ct::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        ct::KeyCode::Char(c) => KeyCode::Char(c),
        ct::KeyCode::Enter => KeyCode::Enter,
        ct::KeyCode::Esc => KeyCode::Escape,
        ct::KeyCode::Backspace => KeyCode::Backspace,
        ct::KeyCode::Tab => KeyCode::Tab,
        ct::KeyCode::Delete => KeyCode::Delete,
        ct::KeyCode::Up => KeyCode::Up,
        ct::KeyCode::Down => KeyCode::Down,
        ct::KeyCode::Left => KeyCode::Left,
        ct::KeyCode::Right => KeyCode::Right,
        ct::KeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };
    let kind = match key.kind {
        ct::KeyEventKind::Press => KeyEventKind::Press,
        ct::KeyEventKind::Repeat => KeyEventKind::Repeat,
        ct::KeyEventKind::Release => KeyEventKind::Release,
    };
    Some(
        KeyEvent::new(code)
            .with_modifiers(translate_modifiers(key.modifiers))
            .with_kind(kind),
    )
}

fn translate_modifiers(modifiers: ct::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if modifiers.contains(ct::KeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if modifiers.contains(ct::KeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    if modifiers.contains(ct::KeyModifiers::CONTROL) {
        out |= Modifiers::CTRL;
    }
    if modifiers.contains(ct::KeyModifiers::SUPER) || modifiers.contains(ct::KeyModifiers::META) {
        out |= Modifiers::SUPER;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct_key(code: ct::KeyCode, modifiers: ct::KeyModifiers, kind: ct::KeyEventKind) -> ct::Event {
        ct::Event::Key(ct::KeyEvent {
            code,
            modifiers,
            kind,
            state: ct::KeyEventState::NONE,
        })
    }

    #[test]
    fn letter_press_maps_to_letter() {
        let input = translate(ct_key(
            ct::KeyCode::Char('q'),
            ct::KeyModifiers::NONE,
            ct::KeyEventKind::Press,
        ));
        let Some(Input::Key(key)) = input else {
            panic!("expected key, got {input:?}");
        };
        assert_eq!(key.letter(), Some('Q'));
    }

    #[test]
    fn shifted_letter_still_selects() {
        let input = translate(ct_key(
            ct::KeyCode::Char('Q'),
            ct::KeyModifiers::SHIFT,
            ct::KeyEventKind::Press,
        ));
        let Some(Input::Key(key)) = input else {
            panic!("expected key");
        };
        assert!(key.modifiers.contains(Modifiers::SHIFT));
        assert!(!key.is_chord());
        assert_eq!(key.letter(), Some('Q'));
    }

    #[test]
    fn ctrl_chord_is_not_a_letter() {
        let input = translate(ct_key(
            ct::KeyCode::Char('c'),
            ct::KeyModifiers::CONTROL,
            ct::KeyEventKind::Press,
        ));
        let Some(Input::Key(key)) = input else {
            panic!("expected key");
        };
        assert_eq!(key.letter(), None);
    }

    #[test]
    fn escape_and_release() {
        let Some(Input::Key(esc)) = translate(ct_key(
            ct::KeyCode::Esc,
            ct::KeyModifiers::NONE,
            ct::KeyEventKind::Press,
        )) else {
            panic!("expected key");
        };
        assert!(esc.is_cancel(KeyCode::Escape));

        let Some(Input::Key(release)) = translate(ct_key(
            ct::KeyCode::Esc,
            ct::KeyModifiers::NONE,
            ct::KeyEventKind::Release,
        )) else {
            panic!("expected key");
        };
        assert!(!release.is_cancel(KeyCode::Escape));
    }

    #[test]
    fn resize_and_unsupported_events() {
        assert_eq!(
            translate(ct::Event::Resize(80, 24)),
            Some(Input::Resized { cols: 80, rows: 24 })
        );
        assert_eq!(translate(ct::Event::FocusGained), None);
        assert_eq!(
            translate(ct_key(
                ct::KeyCode::Home,
                ct::KeyModifiers::NONE,
                ct::KeyEventKind::Press
            )),
            None
        );
    }
}
