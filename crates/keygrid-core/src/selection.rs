#![forbid(unsafe_code)]

//! Key-sequence interpreter.
//!
//! [`Selector::handle`] is a pure step function: it takes the current
//! [`SelectionState`] and one key event and returns the next state, an
//! [`Outcome`], and the ordered [`Effect`]s the caller must apply. The
//! selector never touches a renderer or pointer itself.
//!
//! # State Machine
//!
//! ```text
//!               row key               col key
//! ┌───────────┐ ─────▶ ┌───────────┐ ─────▶ ┌─────────┐
//! │ MainGrid  │        │ MainGrid  │        │ SubGrid │
//! │ (empty)   │ ◀───── │ (1 key)   │        │         │
//! └───────────┘  other └───────────┘        └─────────┘
//!      ▲  ▲                                   │    │
//!      │  └──────── sub key: dispatch ────────┘    │ unknown key:
//!      │                                           │ stay
//!      └───────── cancel key (from any state) ─────┘
//! ```
//!
//! With no sub-grid layout configured, the column key resolves directly to
//! the main cell's center.
//!
//! # Example
//!
//! ```
//! use keygrid_core::alphabet::Alphabet;
//! use keygrid_core::error::Axis;
//! use keygrid_core::event::{KeyCode, KeyEvent};
//! use keygrid_core::geometry::{Point, Rect};
//! use keygrid_core::grid::GridMap;
//! use keygrid_core::selection::{Outcome, PointerAction, SelectionState, Selector};
//! use keygrid_core::subgrid::SubGridLayout;
//!
//! let grid = GridMap::build(
//!     Rect::from_size(1200, 900),
//!     Alphabet::new(Axis::Rows, "QWE").unwrap(),
//!     Alphabet::new(Axis::Cols, "ASD").unwrap(),
//! )
//! .unwrap();
//! let sub = SubGridLayout::new(2, 2, Alphabet::new(Axis::Sub, "ABCD").unwrap()).unwrap();
//! let selector = Selector::new(grid, Some(sub), KeyCode::Escape, PointerAction::Move);
//!
//! let mut state = SelectionState::new();
//! let mut last = Outcome::Ignored;
//! for key in ['q', 'a', 'a'] {
//!     let step = selector.handle(&state, &KeyEvent::char(key)).unwrap();
//!     state = step.state;
//!     last = step.outcome;
//! }
//! assert_eq!(last, Outcome::Resolved(Point::new(100, 75)));
//! assert!(state.is_initial());
//! ```

use thiserror::Error;

use crate::error::{GeometryError, LookupInconsistency};
use crate::event::{KeyCode, KeyEvent};
use crate::geometry::{Point, Rect};
use crate::grid::{GridMap, Label};
use crate::subgrid::{SubGridLayout, SubGridMap};

/// What the pointer should do with a resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PointerAction {
    Move,
    #[default]
    Click,
}

impl std::fmt::Display for PointerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PointerAction::Move => "move",
            PointerAction::Click => "click",
        })
    }
}

/// Interaction mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for a two-letter main-grid label.
    MainGrid {
        /// Row key typed so far.
        pending: Option<char>,
    },
    /// A main cell is chosen; waiting for one sub-grid key.
    SubGrid {
        cell: Label,
        bounds: Rect,
        map: SubGridMap,
    },
}

/// The selector's only mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    mode: Mode,
}

impl SelectionState {
    /// Initial state: main grid, nothing buffered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: Mode::MainGrid { pending: None },
        }
    }

    #[inline]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Buffered row key, if any.
    pub fn pending(&self) -> Option<char> {
        match self.mode {
            Mode::MainGrid { pending } => pending,
            Mode::SubGrid { .. } => None,
        }
    }

    /// Bounds of the chosen main cell while refining inside it.
    pub fn active_cell_bounds(&self) -> Option<Rect> {
        match self.mode {
            Mode::SubGrid { bounds, .. } => Some(bounds),
            Mode::MainGrid { .. } => None,
        }
    }

    /// Whether this is the state a fresh session starts in.
    pub fn is_initial(&self) -> bool {
        matches!(self.mode, Mode::MainGrid { pending: None })
    }

    fn buffered(key: char) -> Self {
        Self {
            mode: Mode::MainGrid { pending: Some(key) },
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// A request for one of the external collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Draw the full main grid.
    DrawMainGrid,
    /// Draw the sub-grid for the chosen cell.
    DrawSubGrid { cell: Label, map: SubGridMap },
    /// Mark the resolved target before the overlay goes away.
    Highlight(Point),
    /// Hide everything.
    ClearOverlay,
    /// Perform the pointer action. Always preceded by `ClearOverlay`.
    Dispatch { action: PointerAction, target: Point },
}

impl Effect {
    /// Short name for logs and spans.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Effect::DrawMainGrid => "draw_main_grid",
            Effect::DrawSubGrid { .. } => "draw_sub_grid",
            Effect::Highlight(_) => "highlight",
            Effect::ClearOverlay => "clear_overlay",
            Effect::Dispatch { .. } => "dispatch",
        }
    }
}

/// What a key event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted; the sequence is not complete yet.
    NeedMoreInput,
    /// Not meaningful here; the state may have been reset.
    Ignored,
    /// A target was resolved and dispatch requested.
    Resolved(Point),
    /// The cancel key ended the session.
    Cancelled,
}

/// Result of one [`Selector::handle`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SelectionState,
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: SelectionState, outcome: Outcome) -> Self {
        Self {
            state,
            outcome,
            effects: Vec::new(),
        }
    }

    fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }
}

/// Internal-consistency faults. Valid input can never produce these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Lookup(#[from] LookupInconsistency),

    #[error("sub-grid for {cell} could not be built: {source}")]
    SubGrid {
        cell: Label,
        #[source]
        source: GeometryError,
    },
}

/// Interprets key events against one grid.
#[derive(Debug, Clone)]
pub struct Selector {
    grid: GridMap,
    sub: Option<SubGridLayout>,
    cancel: KeyCode,
    action: PointerAction,
}

impl Selector {
    /// `sub = None` selects two-key mode: the column key resolves directly.
    #[must_use]
    pub fn new(
        grid: GridMap,
        sub: Option<SubGridLayout>,
        cancel: KeyCode,
        action: PointerAction,
    ) -> Self {
        Self {
            grid,
            sub,
            cancel,
            action,
        }
    }

    #[inline]
    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    #[inline]
    pub fn sub_layout(&self) -> Option<&SubGridLayout> {
        self.sub.as_ref()
    }

    #[inline]
    pub fn cancel_key(&self) -> KeyCode {
        self.cancel
    }

    #[inline]
    pub fn action(&self) -> PointerAction {
        self.action
    }

    /// Rebuild the main grid for a new overlay rectangle.
    ///
    /// # Errors
    ///
    /// Propagates [`GridMap::build`] errors; the old grid is kept on failure.
    pub fn resize(&mut self, area: Rect) -> Result<(), GeometryError> {
        let grid = GridMap::build(area, self.grid.rows().clone(), self.grid.cols().clone())?;
        self.grid = grid;
        Ok(())
    }

    /// Start an interaction: fresh state and a main-grid draw.
    #[must_use]
    pub fn begin(&self) -> Transition {
        Transition::new(SelectionState::new(), Outcome::NeedMoreInput)
            .with_effects(vec![Effect::DrawMainGrid])
    }

    /// Consume one key event.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistencies (see [`SelectionError`]); invalid
    /// input is reported as [`Outcome::Ignored`].
    pub fn handle(
        &self,
        state: &SelectionState,
        key: &KeyEvent,
    ) -> Result<Transition, SelectionError> {
        if key.is_cancel(self.cancel) {
            tracing::debug!(target: "keygrid.select", "selection cancelled");
            return Ok(Transition::new(SelectionState::new(), Outcome::Cancelled)
                .with_effects(vec![Effect::ClearOverlay]));
        }

        let Some(ch) = key.letter() else {
            return Ok(Transition::new(state.clone(), Outcome::Ignored));
        };

        match &state.mode {
            Mode::MainGrid { pending: None } => Ok(self.first_key(state, ch)),
            Mode::MainGrid { pending: Some(row) } => self.second_key(*row, ch),
            Mode::SubGrid { cell, map, .. } => Ok(self.sub_key(state, *cell, map, ch)),
        }
    }

    fn first_key(&self, state: &SelectionState, ch: char) -> Transition {
        if self.grid.rows().contains(ch) {
            tracing::debug!(target: "keygrid.select", key = %ch, "row key buffered");
            Transition::new(SelectionState::buffered(ch), Outcome::NeedMoreInput)
        } else {
            tracing::debug!(target: "keygrid.select", key = %ch, "not a row key, ignored");
            Transition::new(state.clone(), Outcome::Ignored)
        }
    }

    fn second_key(&self, row: char, ch: char) -> Result<Transition, SelectionError> {
        if !self.grid.cols().contains(ch) {
            tracing::debug!(
                target: "keygrid.select",
                row = %row,
                key = %ch,
                "not a column key, pair aborted"
            );
            return Ok(Transition::new(SelectionState::new(), Outcome::Ignored));
        }

        let label = Label::new(row, ch);
        let cell = *self.grid.get(label).ok_or_else(|| LookupInconsistency {
            label: label.to_string(),
        })?;

        let Some(layout) = &self.sub else {
            tracing::debug!(target: "keygrid.select", label = %label, point = %cell.center, "main cell resolved");
            return Ok(self.resolve(cell.center));
        };

        let map = SubGridMap::build(cell.bounds, layout)
            .map_err(|source| SelectionError::SubGrid { cell: label, source })?;
        tracing::debug!(
            target: "keygrid.select",
            label = %label,
            bounds = %cell.bounds,
            "main cell chosen, refining"
        );
        let effects = vec![Effect::DrawSubGrid {
            cell: label,
            map: map.clone(),
        }];
        let state = SelectionState {
            mode: Mode::SubGrid {
                cell: label,
                bounds: cell.bounds,
                map,
            },
        };
        Ok(Transition::new(state, Outcome::NeedMoreInput).with_effects(effects))
    }

    fn sub_key(&self, state: &SelectionState, cell: Label, map: &SubGridMap, ch: char) -> Transition {
        match map.get(ch) {
            Some(target) => {
                tracing::debug!(
                    target: "keygrid.select",
                    cell = %cell,
                    key = %ch,
                    point = %target,
                    "sub cell resolved"
                );
                self.resolve(target)
            }
            None => {
                tracing::debug!(target: "keygrid.select", cell = %cell, key = %ch, "no sub cell for key, ignored");
                Transition::new(state.clone(), Outcome::Ignored)
            }
        }
    }

    fn resolve(&self, target: Point) -> Transition {
        Transition::new(SelectionState::new(), Outcome::Resolved(target)).with_effects(vec![
            Effect::Highlight(target),
            Effect::ClearOverlay,
            Effect::Dispatch {
                action: self.action,
                target,
            },
        ])
    }
}
