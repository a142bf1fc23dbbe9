#![forbid(unsafe_code)]

//! External collaborators and effect application.
//!
//! The selector only describes what should happen. This module defines the
//! two seams the runtime calls through, [`OverlayRenderer`] and
//! [`PointerDispatcher`], and applies [`Effect`]s to them inside an
//! `effect.apply` tracing span recording the effect kind and its duration.
//!
//! Dispatch failures are logged at `error` under `keygrid.effect` and never
//! propagate; a failed click must not take the session down with it.

use keygrid_core::geometry::{Point, Rect};
use keygrid_core::grid::{GridMap, Label};
use keygrid_core::selection::{Effect, PointerAction};
use keygrid_core::subgrid::SubGridMap;
use thiserror::Error;
use web_time::Instant;

/// Draws the overlay.
///
/// Implementations own their error reporting; a renderer that cannot draw
/// should log and keep going so the user can still cancel.
pub trait OverlayRenderer {
    /// Show every main-grid label.
    fn draw_main_grid(&mut self, grid: &GridMap);

    /// Replace the overlay with the sub-grid of one main cell.
    fn draw_sub_grid(&mut self, cell: Label, map: &SubGridMap);

    /// Mark the resolved target.
    fn highlight(&mut self, point: Point);

    /// Hide the overlay.
    fn clear_overlay(&mut self);
}

/// Moves and clicks the system pointer.
pub trait PointerDispatcher {
    fn move_to(&mut self, target: Point) -> Result<(), DispatchError>;

    fn click(&mut self, target: Point) -> Result<(), DispatchError>;

    /// Route `action` to [`move_to`](Self::move_to) or [`click`](Self::click).
    fn dispatch(&mut self, action: PointerAction, target: Point) -> Result<(), DispatchError> {
        match action {
            PointerAction::Move => self.move_to(target),
            PointerAction::Click => self.click(target),
        }
    }
}

/// Why a pointer action did not happen.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },

    #[error("target {target} is outside the screen {screen}")]
    OutOfBounds { target: Point, screen: Rect },

    #[error("pointer backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Apply one overlay effect.
///
/// `Dispatch` is not an overlay effect; the session schedules it and later
/// calls [`apply_dispatch`]. Passing it here is a no-op.
pub fn apply_overlay<R: OverlayRenderer + ?Sized>(renderer: &mut R, grid: &GridMap, effect: &Effect) {
    trace_effect(effect.kind(), || match effect {
        Effect::DrawMainGrid => renderer.draw_main_grid(grid),
        Effect::DrawSubGrid { cell, map } => renderer.draw_sub_grid(*cell, map),
        Effect::Highlight(point) => renderer.highlight(*point),
        Effect::ClearOverlay => renderer.clear_overlay(),
        Effect::Dispatch { .. } => {}
    });
}

/// Perform a pointer action, logging failures.
///
/// Returns whether the dispatcher reported success.
pub fn apply_dispatch<P: PointerDispatcher + ?Sized>(
    dispatcher: &mut P,
    action: PointerAction,
    target: Point,
) -> bool {
    trace_effect("dispatch", || match dispatcher.dispatch(action, target) {
        Ok(()) => {
            tracing::info!(
                target: "keygrid.effect",
                action = %action,
                point = %target,
                "pointer dispatched"
            );
            true
        }
        Err(err) => {
            tracing::error!(
                target: "keygrid.effect",
                action = %action,
                point = %target,
                error = %err,
                "pointer dispatch failed"
            );
            false
        }
    })
}

fn trace_effect<F, T>(kind: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let span = tracing::debug_span!(
        "effect.apply",
        effect = kind,
        duration_us = tracing::field::Empty,
    );
    let _guard = span.enter();

    let result = f();

    let duration_us = start.elapsed().as_micros() as u64;
    span.record("duration_us", duration_us);
    tracing::trace!(target: "keygrid.effect", effect = kind, duration_us, "effect applied");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{PointerCall, RecordingDispatcher, RecordingRenderer, RenderCall};
    use keygrid_core::alphabet::Alphabet;
    use keygrid_core::error::Axis;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    fn grid() -> GridMap {
        GridMap::build(
            Rect::from_size(1200, 900),
            Alphabet::new(Axis::Rows, "QWE").unwrap(),
            Alphabet::new(Axis::Cols, "ASD").unwrap(),
        )
        .unwrap()
    }

    // ── Tracing capture ─────────────────────────────────────────────────

    #[derive(Debug, Clone)]
    struct CapturedSpan {
        name: String,
        fields: HashMap<String, String>,
    }

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: tracing::Level,
        fields: HashMap<String, String>,
    }

    #[derive(Default, Clone)]
    struct Capture {
        spans: Arc<Mutex<Vec<CapturedSpan>>>,
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for Capture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            attrs.record(&mut visitor);
            self.spans.lock().unwrap().push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
        }

        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                fields: visitor.0.into_iter().collect(),
            });
        }
    }

    fn with_captured_tracing<F: FnOnce()>(f: F) -> Capture {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, f);
        capture
    }

    // ── Tests ───────────────────────────────────────────────────────────

    #[test]
    fn overlay_effects_reach_renderer() {
        let grid = grid();
        let mut renderer = RecordingRenderer::default();
        for effect in [
            Effect::DrawMainGrid,
            Effect::Highlight(Point::new(5, 6)),
            Effect::ClearOverlay,
            Effect::Dispatch {
                action: PointerAction::Click,
                target: Point::new(5, 6),
            },
        ] {
            apply_overlay(&mut renderer, &grid, &effect);
        }
        assert_eq!(
            renderer.calls(),
            &[
                RenderCall::MainGrid {
                    area: grid.area(),
                    labels: 9
                },
                RenderCall::Highlight(Point::new(5, 6)),
                RenderCall::Clear,
            ]
        );
    }

    #[test]
    fn dispatch_routes_by_action() {
        let mut dispatcher = RecordingDispatcher::default();
        assert!(apply_dispatch(&mut dispatcher, PointerAction::Move, Point::new(1, 2)));
        assert!(apply_dispatch(&mut dispatcher, PointerAction::Click, Point::new(3, 4)));
        assert_eq!(
            dispatcher.calls(),
            &[
                PointerCall {
                    action: PointerAction::Move,
                    target: Point::new(1, 2)
                },
                PointerCall {
                    action: PointerAction::Click,
                    target: Point::new(3, 4)
                },
            ]
        );
    }

    #[test]
    fn effect_span_records_kind() {
        let grid = grid();
        let capture = with_captured_tracing(|| {
            let mut renderer = RecordingRenderer::default();
            apply_overlay(&mut renderer, &grid, &Effect::ClearOverlay);
        });
        let spans = capture.spans.lock().unwrap().clone();
        let span = spans
            .iter()
            .find(|s| s.name == "effect.apply")
            .expect("effect.apply span");
        assert_eq!(span.fields.get("effect").map(String::as_str), Some("clear_overlay"));
    }

    #[test]
    fn dispatch_failure_is_logged_not_raised() {
        let capture = with_captured_tracing(|| {
            let mut dispatcher = RecordingDispatcher::failing();
            assert!(!apply_dispatch(&mut dispatcher, PointerAction::Click, Point::new(1, 1)));
            assert!(dispatcher.calls().is_empty());
        });
        let events = capture.events.lock().unwrap().clone();
        assert!(
            events
                .iter()
                .any(|e| e.level == tracing::Level::ERROR && e.fields.contains_key("error")),
            "expected an error event, got {events:?}"
        );
    }
}
