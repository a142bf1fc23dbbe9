#![forbid(unsafe_code)]

//! Session configuration loaded from TOML.
//!
//! Captures every tunable of a keygrid session as a single
//! [`KeygridConfig`]. Each section is `serde(default)`, so a file only needs
//! the keys it changes.
//!
//! # Loading
//!
//! ```toml
//! # keygrid.toml
//! [grid]
//! rows = "QWE"
//! cols = "ASD"
//!
//! [subgrid]
//! rows = 2
//! cols = 2
//! alphabet = "ABCD"
//!
//! [pointer]
//! action = "move"
//! ```
//!
//! ```rust,ignore
//! let config = KeygridConfig::from_toml_file("keygrid.toml")?;
//! for warning in config.validate()? {
//!     tracing::warn!(%warning);
//! }
//! ```
//!
//! # Defaults
//!
//! Rows `QWERASDFZX`, columns `HJKLUIOPNM`, a 3x3 sub-grid labeled
//! `QWEASDZXC`, click after 50 ms, Escape cancels, one pick per session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use keygrid_core::alphabet::Alphabet;
use keygrid_core::error::{Axis, GeometryError};
use keygrid_core::event::KeyCode;
use keygrid_core::geometry::Rect;
use keygrid_core::grid::GridMap;
use keygrid_core::selection::{PointerAction, Selector};
use keygrid_core::subgrid::SubGridLayout;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default row keys.
pub const DEFAULT_ROWS: &str = "QWERASDFZX";

/// Default column keys.
pub const DEFAULT_COLS: &str = "HJKLUIOPNM";

/// Default sub-grid labels, row-major over a 3x3 layout.
pub const DEFAULT_SUB_ALPHABET: &str = "QWEASDZXC";

/// Default pause between hiding the overlay and dispatching.
pub const DEFAULT_DISPATCH_DELAY_MS: u64 = 50;

/// Upper bound accepted for the dispatch delay.
pub const MAX_DISPATCH_DELAY_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything a session needs besides the overlay size.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygridConfig {
    /// Main-grid alphabets.
    pub grid: GridSection,

    /// Sub-grid refinement.
    pub subgrid: SubGridSection,

    /// What happens to the pointer.
    pub pointer: PointerSection,

    /// Session behavior.
    pub session: SessionSection,

    /// Fixed screen size; when absent the front end supplies it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenSection>,
}

/// Main-grid alphabets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    /// Row keys, top to bottom.
    pub rows: String,
    /// Column keys, left to right.
    pub cols: String,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS.into(),
            cols: DEFAULT_COLS.into(),
        }
    }
}

/// Sub-grid refinement. Zero rows or columns disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubGridSection {
    pub rows: usize,
    pub cols: usize,
    /// Labels assigned row-major. Should hold exactly `rows * cols` keys.
    pub alphabet: String,
}

impl Default for SubGridSection {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            alphabet: DEFAULT_SUB_ALPHABET.into(),
        }
    }
}

impl SubGridSection {
    /// Whether refinement is turned on.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }
}

/// Pointer behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerSection {
    /// `move` or `click`.
    pub action: PointerAction,
    /// Pause between hiding the overlay and dispatching, in milliseconds.
    pub dispatch_delay_ms: u64,
}

impl Default for PointerSection {
    fn default() -> Self {
        Self {
            action: PointerAction::Click,
            dispatch_delay_ms: DEFAULT_DISPATCH_DELAY_MS,
        }
    }
}

/// Session behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Key name that aborts the session (`escape`, `tab`, a letter, ...).
    pub cancel_key: String,
    /// End after the first dispatch instead of starting over.
    pub single_shot: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cancel_key: "escape".into(),
            single_shot: true,
        }
    }
}

/// Fixed size of the addressable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSection {
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl KeygridConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field.
    ///
    /// Problems that make a session impossible are collected into
    /// [`ConfigError::Validation`]. Problems a session can live with come
    /// back as warnings; callers should log them once at startup.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let rows = Alphabet::new(Axis::Rows, &self.grid.rows)
            .map_err(|e| errors.push(e.to_string()))
            .ok();
        let cols = Alphabet::new(Axis::Cols, &self.grid.cols)
            .map_err(|e| errors.push(e.to_string()))
            .ok();

        if self.subgrid.enabled() {
            match self.sub_layout() {
                Ok(Some(layout)) => {
                    if layout.unassigned() > 0 {
                        warnings.push(ConfigWarning::SubAlphabetShort {
                            capacity: layout.capacity(),
                            provided: layout.alphabet().len(),
                        });
                    } else if layout.unused_letters() > 0 {
                        warnings.push(ConfigWarning::SubAlphabetLong {
                            capacity: layout.capacity(),
                            provided: layout.alphabet().len(),
                        });
                    }
                }
                Ok(None) => {}
                Err(e) => errors.push(e.to_string()),
            }
        }

        match self.cancel_key() {
            Ok(KeyCode::Char(c)) if c.is_ascii_alphabetic() => {
                let shadows = rows.as_ref().is_some_and(|a| a.contains(c))
                    || cols.as_ref().is_some_and(|a| a.contains(c))
                    || (self.subgrid.enabled() && self.subgrid.alphabet.to_ascii_uppercase().contains(c));
                if shadows {
                    warnings.push(ConfigWarning::CancelKeyShadowsGrid { key: c });
                }
            }
            Ok(_) => {}
            Err(e) => errors.push(e.to_string()),
        }

        if self.pointer.dispatch_delay_ms > MAX_DISPATCH_DELAY_MS {
            errors.push(format!(
                "pointer.dispatch_delay_ms must be <= {MAX_DISPATCH_DELAY_MS}, got {}",
                self.pointer.dispatch_delay_ms
            ));
        }

        if let Some(screen) = self.screen {
            if screen.width <= 0 || screen.height <= 0 {
                errors.push(format!(
                    "screen must have positive size, got {}x{}",
                    screen.width, screen.height
                ));
            }
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Row alphabet.
    pub fn row_alphabet(&self) -> Result<Alphabet, ConfigError> {
        Ok(Alphabet::new(Axis::Rows, &self.grid.rows)?)
    }

    /// Column alphabet.
    pub fn col_alphabet(&self) -> Result<Alphabet, ConfigError> {
        Ok(Alphabet::new(Axis::Cols, &self.grid.cols)?)
    }

    /// Sub-grid layout, or `None` when refinement is disabled.
    pub fn sub_layout(&self) -> Result<Option<SubGridLayout>, ConfigError> {
        if !self.subgrid.enabled() {
            return Ok(None);
        }
        let alphabet = Alphabet::new(Axis::Sub, &self.subgrid.alphabet)?;
        Ok(Some(SubGridLayout::new(
            self.subgrid.rows,
            self.subgrid.cols,
            alphabet,
        )?))
    }

    /// Parsed cancel key.
    pub fn cancel_key(&self) -> Result<KeyCode, ConfigError> {
        self.session
            .cancel_key
            .parse()
            .map_err(|_| ConfigError::UnknownKey {
                name: self.session.cancel_key.clone(),
            })
    }

    /// Pause between hiding the overlay and dispatching.
    #[must_use]
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.pointer.dispatch_delay_ms)
    }

    /// Configured screen rectangle, if any.
    #[must_use]
    pub fn screen_rect(&self) -> Option<Rect> {
        self.screen.map(|s| Rect::from_size(s.width, s.height))
    }

    /// Build the selector for an overlay covering `area`.
    pub fn build_selector(&self, area: Rect) -> Result<Selector, ConfigError> {
        let grid = GridMap::build(area, self.row_alphabet()?, self.col_alphabet()?)?;
        Ok(Selector::new(
            grid,
            self.sub_layout()?,
            self.cancel_key()?,
            self.pointer.action,
        ))
    }
}

// ---------------------------------------------------------------------------
// Errors and warnings
// ---------------------------------------------------------------------------

/// Errors that can occur when loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("unknown key name: {name}")]
    UnknownKey { name: String },

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Non-fatal configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Some sub-grid positions get no label and cannot be selected.
    SubAlphabetShort { capacity: usize, provided: usize },
    /// Letters past the sub-grid capacity are never used.
    SubAlphabetLong { capacity: usize, provided: usize },
    /// The cancel key is also a grid key; it will always cancel.
    CancelKeyShadowsGrid { key: char },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubAlphabetShort { capacity, provided } => write!(
                f,
                "sub-grid has {capacity} positions but only {provided} labels; {} position(s) cannot be selected",
                capacity - provided
            ),
            Self::SubAlphabetLong { capacity, provided } => write!(
                f,
                "sub-grid has {capacity} positions but {provided} labels; {} label(s) unused",
                provided - capacity
            ),
            Self::CancelKeyShadowsGrid { key } => {
                write!(f, "cancel key {key:?} is also a grid key and will always cancel")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
