#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Front ends translate their native events into these types before handing
//! them to the selection machinery. Only key events and overlay resizes
//! matter to keygrid; everything else is dropped at the adapter.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the source cannot tell
//! - `Modifiers` use bitflags for easy combination
//! - Letters are matched case-insensitively; [`KeyEvent::letter`] returns
//!   the uppercase form

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// The overlay area changed size.
    Resize {
        /// New width of the addressable area.
        width: i32,
        /// New height of the addressable area.
        height: i32,
    },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Shorthand for a plain character press.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether a Ctrl, Alt or Super modifier turns this press into a chord.
    /// Shift alone does not.
    #[must_use]
    pub const fn is_chord(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SUPER))
    }

    /// The uppercase letter this event types, if any.
    ///
    /// Releases, chords with Ctrl/Alt/Super and non-alphabetic keys yield
    /// `None`. Shift is allowed since it only changes letter case.
    #[must_use]
    pub fn letter(&self) -> Option<char> {
        if self.kind == KeyEventKind::Release {
            return None;
        }
        if self.is_chord() {
            return None;
        }
        match self.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
            _ => None,
        }
    }

    /// Whether this event presses `cancel`.
    ///
    /// Letter cancel keys compare case-insensitively.
    #[must_use]
    pub fn is_cancel(&self, cancel: KeyCode) -> bool {
        if self.kind == KeyEventKind::Release {
            return false;
        }
        match (self.code, cancel) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

impl std::str::FromStr for KeyCode {
    type Err = String;

    /// Parse a key name as written in configuration files.
    ///
    /// Accepts `escape`/`esc`, `enter`, `tab`, `backspace`, `delete`,
    /// `space`, `f1`..`f24`, or a single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let code = match lower.as_str() {
            "escape" | "esc" => KeyCode::Escape,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "space" => KeyCode::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c.to_ascii_uppercase()),
                    (Some('f'), Some(_)) => match other[1..].parse::<u8>() {
                        Ok(n) if (1..=24).contains(&n) => KeyCode::F(n),
                        _ => return Err(format!("unknown key name: {s}")),
                    },
                    _ => return Err(format!("unknown key name: {s}")),
                }
            }
        };
        Ok(code)
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Escape => f.write_str("escape"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
