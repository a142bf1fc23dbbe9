#![forbid(unsafe_code)]

//! Headless collaborators that record every call.
//!
//! Used by tests and by front ends that resolve keys without drawing
//! anything (`keygrid resolve`).

use keygrid_core::geometry::{Point, Rect};
use keygrid_core::grid::{GridMap, Label};
use keygrid_core::selection::PointerAction;
use keygrid_core::subgrid::SubGridMap;

use crate::effects::{DispatchError, OverlayRenderer, PointerDispatcher};

/// One renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    MainGrid { area: Rect, labels: usize },
    SubGrid { cell: Label, parent: Rect, labels: usize },
    Highlight(Point),
    Clear,
}

/// Renderer that only remembers what it was asked to draw.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Forget recorded calls.
    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn draw_main_grid(&mut self, grid: &GridMap) {
        self.calls.push(RenderCall::MainGrid {
            area: grid.area(),
            labels: grid.len(),
        });
    }

    fn draw_sub_grid(&mut self, cell: Label, map: &SubGridMap) {
        self.calls.push(RenderCall::SubGrid {
            cell,
            parent: map.parent(),
            labels: map.len(),
        });
    }

    fn highlight(&mut self, point: Point) {
        self.calls.push(RenderCall::Highlight(point));
    }

    fn clear_overlay(&mut self) {
        self.calls.push(RenderCall::Clear);
    }
}

/// One successful pointer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCall {
    pub action: PointerAction,
    pub target: Point,
}

/// Dispatcher that records targets instead of moving anything.
#[derive(Debug, Default, Clone)]
pub struct RecordingDispatcher {
    calls: Vec<PointerCall>,
    fail: bool,
}

impl RecordingDispatcher {
    /// A dispatcher whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            calls: Vec::new(),
            fail: true,
        }
    }

    pub fn calls(&self) -> &[PointerCall] {
        &self.calls
    }

    /// Most recent successful action.
    pub fn last(&self) -> Option<PointerCall> {
        self.calls.last().copied()
    }

    fn record(&mut self, action: PointerAction, target: Point) -> Result<(), DispatchError> {
        if self.fail {
            return Err(DispatchError::Backend("recording dispatcher set to fail".into()));
        }
        self.calls.push(PointerCall { action, target });
        Ok(())
    }
}

impl PointerDispatcher for RecordingDispatcher {
    fn move_to(&mut self, target: Point) -> Result<(), DispatchError> {
        self.record(PointerAction::Move, target)
    }

    fn click(&mut self, target: Point) -> Result<(), DispatchError> {
        self.record(PointerAction::Click, target)
    }
}
