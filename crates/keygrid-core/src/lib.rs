#![forbid(unsafe_code)]

//! Core: grid geometry, key events, and the selection state machine.
//!
//! # Role in keygrid
//! `keygrid-core` is the addressing layer. It turns a rectangle and two key
//! alphabets into labeled cells, refines a chosen cell into a sub-grid, and
//! interprets key events one at a time until a target point is resolved.
//! Nothing here draws or moves a pointer; the runtime applies the
//! [`selection::Effect`]s the selector emits.
//!
//! # Primary responsibilities
//! - **GridMap**: label -> (center, bounds) for the main grid.
//! - **SubGridMap**: label -> center inside one main cell.
//! - **Selector**: pure `(state, key) -> (state, outcome, effects)` step.
//! - **Event**: normalized key and resize events.

pub mod alphabet;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod selection;
pub mod subgrid;

pub use error::{Axis, GeometryError, LookupInconsistency};
