#![forbid(unsafe_code)]

//! One interactive pick, from first draw to pointer dispatch.
//!
//! A [`Session`] owns the selector, the current [`SelectionState`], both
//! collaborators and a [`TimerQueue`] for the delayed dispatch. Front ends
//! feed it [`Event`]s and wake it up for deadlines:
//!
//! ```text
//! loop {
//!     let timeout = session.next_deadline().map(|d| d - now);
//!     if let Some(event) = poll(timeout) {
//!         if session.handle_event(&event, now)? == Control::Exit { break }
//!     }
//!     if session.tick(now) == Control::Exit { break }
//! }
//! ```
//!
//! # Dispatch ordering
//!
//! A resolved target is highlighted, the overlay is cleared, and the pointer
//! action is queued for `dispatch_delay` later so the overlay is gone before
//! the click lands. While the action is queued only the cancel key is
//! honored; it drops the queued action and ends the session.

use keygrid_core::event::{Event, KeyEvent};
use keygrid_core::geometry::{Point, Rect};
use keygrid_core::selection::{
    Effect, Mode, Outcome, PointerAction, SelectionError, SelectionState, Selector,
};
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::config::{ConfigError, ConfigWarning, KeygridConfig};
use crate::effects::{OverlayRenderer, PointerDispatcher, apply_dispatch, apply_overlay};
use crate::timer::{TaskHandle, TimerQueue};

/// What the event loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The pointer action ran; `ok` is false when the dispatcher failed.
    Dispatched {
        action: PointerAction,
        target: Point,
        ok: bool,
    },
    /// The cancel key was pressed.
    Cancelled,
    /// An internal fault stopped the session.
    Aborted,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("selection aborted: {0}")]
    Selection(#[from] SelectionError),
}

#[derive(Debug, Clone, Copy)]
struct QueuedDispatch {
    action: PointerAction,
    target: Point,
}

/// A running pick.
#[derive(Debug)]
pub struct Session<R, P> {
    selector: Selector,
    state: SelectionState,
    renderer: R,
    dispatcher: P,
    timers: TimerQueue<QueuedDispatch>,
    pending: Option<TaskHandle>,
    delay: Duration,
    single_shot: bool,
    warnings: Vec<ConfigWarning>,
    dispatches: usize,
    end: Option<SessionEnd>,
}

impl<R: OverlayRenderer, P: PointerDispatcher> Session<R, P> {
    /// Validate `config`, build the grid for `area` and draw it.
    ///
    /// Configuration warnings are logged here, once.
    pub fn start(
        config: &KeygridConfig,
        area: Rect,
        renderer: R,
        dispatcher: P,
    ) -> Result<Self, SessionError> {
        let warnings = config.validate()?;
        for warning in &warnings {
            tracing::warn!(target: "keygrid.config", warning = %warning, "configuration warning");
        }
        let selector = config.build_selector(area)?;

        let mut session = Self {
            state: SelectionState::new(),
            selector,
            renderer,
            dispatcher,
            timers: TimerQueue::new(),
            pending: None,
            delay: config.dispatch_delay(),
            single_shot: config.session.single_shot,
            warnings,
            dispatches: 0,
            end: None,
        };
        tracing::info!(
            target: "keygrid.session",
            area = %area,
            rows = %session.selector.grid().rows(),
            cols = %session.selector.grid().cols(),
            action = %session.selector.action(),
            "session started"
        );
        session.begin();
        Ok(session)
    }

    /// Feed one input event.
    ///
    /// # Errors
    ///
    /// [`SessionError::Selection`] on an internal lookup fault. The overlay
    /// is cleared and the session is over.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Result<Control, SessionError> {
        if self.is_finished() {
            return Ok(Control::Exit);
        }
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Resize { width, height } => {
                let area = self.selector.grid().area();
                self.resize(Rect::new(area.x, area.y, *width, *height));
                Ok(Control::Continue)
            }
        }
    }

    /// Run the queued dispatch if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Control {
        for queued in self.timers.fire_due(now) {
            self.pending = None;
            let ok = apply_dispatch(&mut self.dispatcher, queued.action, queued.target);
            self.dispatches += 1;
            if self.single_shot {
                self.end = Some(SessionEnd::Dispatched {
                    action: queued.action,
                    target: queued.target,
                    ok,
                });
            } else {
                self.begin();
            }
        }
        if self.is_finished() {
            Control::Exit
        } else {
            Control::Continue
        }
    }

    /// When the next [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Rebuild the geometry for a new overlay rectangle.
    ///
    /// An unusable rectangle is logged and the previous grid is kept. Any
    /// partial selection is discarded since its cell may no longer exist.
    pub fn resize(&mut self, area: Rect) {
        if let Err(err) = self.selector.resize(area) {
            tracing::warn!(
                target: "keygrid.session",
                area = %area,
                error = %err,
                "resize rejected, keeping previous grid"
            );
            return;
        }
        tracing::debug!(target: "keygrid.session", area = %area, "grid rebuilt");
        if !self.is_dispatch_pending() && !self.is_finished() {
            self.begin();
        }
    }

    /// Draw the current mode again, e.g. after the output surface was lost.
    pub fn redraw(&mut self) {
        if self.is_dispatch_pending() || self.is_finished() {
            return;
        }
        let effect = match self.state.mode() {
            Mode::MainGrid { .. } => Effect::DrawMainGrid,
            Mode::SubGrid { cell, map, .. } => Effect::DrawSubGrid {
                cell: *cell,
                map: map.clone(),
            },
        };
        apply_overlay(&mut self.renderer, self.selector.grid(), &effect);
    }

    fn begin(&mut self) {
        let step = self.selector.begin();
        self.state = step.state;
        for effect in &step.effects {
            apply_overlay(&mut self.renderer, self.selector.grid(), effect);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Result<Control, SessionError> {
        if let Some(handle) = self.pending {
            if key.is_cancel(self.selector.cancel_key()) {
                self.timers.cancel(handle);
                self.pending = None;
                self.end = Some(SessionEnd::Cancelled);
                tracing::info!(target: "keygrid.session", "queued dispatch cancelled");
                return Ok(Control::Exit);
            }
            tracing::debug!(target: "keygrid.session", "key ignored while dispatch is queued");
            return Ok(Control::Continue);
        }

        let step = match self.selector.handle(&self.state, key) {
            Ok(step) => step,
            Err(err) => {
                tracing::error!(target: "keygrid.session", error = %err, "selection fault, aborting");
                apply_overlay(&mut self.renderer, self.selector.grid(), &Effect::ClearOverlay);
                self.end = Some(SessionEnd::Aborted);
                return Err(err.into());
            }
        };

        self.state = step.state;
        for effect in &step.effects {
            match *effect {
                Effect::Dispatch { action, target } => self.queue_dispatch(action, target, now),
                ref other => apply_overlay(&mut self.renderer, self.selector.grid(), other),
            }
        }

        if step.outcome == Outcome::Cancelled {
            self.end = Some(SessionEnd::Cancelled);
            tracing::info!(target: "keygrid.session", "session cancelled");
            return Ok(Control::Exit);
        }
        Ok(Control::Continue)
    }

    fn queue_dispatch(&mut self, action: PointerAction, target: Point, now: Instant) {
        let handle = self
            .timers
            .schedule(now + self.delay, QueuedDispatch { action, target });
        self.pending = Some(handle);
        tracing::debug!(
            target: "keygrid.session",
            action = %action,
            point = %target,
            delay_ms = self.delay.as_millis() as u64,
            "dispatch queued"
        );
    }
}

impl<R, P> Session<R, P> {
    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    #[inline]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[inline]
    pub fn dispatcher(&self) -> &P {
        &self.dispatcher
    }

    /// Warnings found when the session started.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Whether a pointer action is queued.
    #[inline]
    pub fn is_dispatch_pending(&self) -> bool {
        self.pending.is_some_and(|handle| self.timers.is_pending(handle))
    }

    /// Pointer actions performed so far, failed ones included.
    #[inline]
    pub fn dispatch_count(&self) -> usize {
        self.dispatches
    }

    /// How the session ended, once it has.
    #[inline]
    pub fn end(&self) -> Option<SessionEnd> {
        self.end
    }

    /// Whether the session has ended and ignores further input.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Give the collaborators back.
    pub fn into_parts(self) -> (R, P) {
        (self.renderer, self.dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingDispatcher, RecordingRenderer, RenderCall};
    use keygrid_core::event::KeyCode;

    fn config() -> KeygridConfig {
        KeygridConfig::from_toml_str(
            r#"
            [grid]
            rows = "QWE"
            cols = "ASD"

            [subgrid]
            rows = 2
            cols = 2
            alphabet = "ABCD"
            "#,
        )
        .unwrap()
    }

    fn session() -> Session<RecordingRenderer, RecordingDispatcher> {
        Session::start(
            &config(),
            Rect::from_size(1200, 900),
            RecordingRenderer::default(),
            RecordingDispatcher::default(),
        )
        .unwrap()
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::char(c))
    }

    #[test]
    fn start_draws_main_grid() {
        let s = session();
        assert_eq!(
            s.renderer().calls(),
            &[RenderCall::MainGrid {
                area: Rect::from_size(1200, 900),
                labels: 9
            }]
        );
        assert!(s.warnings().is_empty());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let mut config = config();
        config.grid.rows = "Q1".into();
        let err = Session::start(
            &config,
            Rect::from_size(100, 100),
            RecordingRenderer::default(),
            RecordingDispatcher::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn dispatch_waits_for_deadline() {
        let t0 = Instant::now();
        let mut s = session();
        for c in ['q', 'a', 'b'] {
            assert_eq!(s.handle_event(&key(c), t0).unwrap(), Control::Continue);
        }
        assert!(s.is_dispatch_pending());
        assert_eq!(s.next_deadline(), Some(t0 + Duration::from_millis(50)));
        assert_eq!(s.tick(t0 + Duration::from_millis(49)), Control::Continue);
        assert!(s.dispatcher().calls().is_empty());
        assert_eq!(s.tick(t0 + Duration::from_millis(50)), Control::Exit);
        assert_eq!(
            s.end(),
            Some(SessionEnd::Dispatched {
                action: PointerAction::Click,
                target: Point::new(300, 75),
                ok: true
            })
        );
    }

    #[test]
    fn keys_other_than_cancel_ignored_while_pending() {
        let t0 = Instant::now();
        let mut s = session();
        for c in ['q', 'a', 'a', 'w', 's'] {
            s.handle_event(&key(c), t0).unwrap();
        }
        assert!(s.is_dispatch_pending());
        assert!(s.state().is_initial());
        let before = s.renderer().calls().len();
        s.handle_event(&Event::Resize { width: 600, height: 300 }, t0).unwrap();
        assert_eq!(s.renderer().calls().len(), before);
    }

    #[test]
    fn events_after_end_exit() {
        let t0 = Instant::now();
        let mut s = session();
        assert!(!s.is_finished());
        s.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)), t0).unwrap();
        assert!(s.is_finished());
        assert_eq!(s.handle_event(&key('q'), t0).unwrap(), Control::Exit);
        assert_eq!(s.tick(t0), Control::Exit);
    }

    #[test]
    fn redraw_repeats_current_mode() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle_event(&key('q'), t0).unwrap();
        s.handle_event(&key('a'), t0).unwrap();
        s.renderer_mut().reset();
        s.redraw();
        assert_eq!(
            s.renderer().calls(),
            &[RenderCall::SubGrid {
                cell: keygrid_core::grid::Label::new('Q', 'A'),
                parent: Rect::from_bounds(0, 0, 400, 300),
                labels: 4
            }]
        );
    }
}
