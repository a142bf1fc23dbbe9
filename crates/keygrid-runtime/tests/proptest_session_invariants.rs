//! Property-based invariant tests for the session loop.
//!
//! 1. A single-shot session dispatches at most once
//! 2. Every dispatched target lies inside the overlay
//! 3. The overlay is cleared before any dispatch runs
//! 4. Nothing dispatches after the cancel key

use keygrid_core::event::{Event, KeyCode, KeyEvent};
use keygrid_core::geometry::Rect;
use keygrid_runtime::config::KeygridConfig;
use keygrid_runtime::recording::{RecordingDispatcher, RecordingRenderer, RenderCall};
use keygrid_runtime::session::{Control, Session};
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Input {
    Key(char),
    Cancel,
    Wait(u64),
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        8 => proptest::char::range('a', 'z').prop_map(Input::Key),
        1 => Just(Input::Cancel),
        2 => (0u64..120).prop_map(Input::Wait),
    ]
}

fn area_strategy() -> impl Strategy<Value = Rect> {
    (0i32..500, 0i32..500, 40i32..3000, 40i32..3000)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

struct Run {
    session: Session<RecordingRenderer, RecordingDispatcher>,
    cleared_before_each_dispatch: bool,
    dispatched_after_cancel: bool,
}

fn drive(area: Rect, single_shot: bool, inputs: &[Input]) -> Run {
    let mut config = KeygridConfig::default();
    config.session.single_shot = single_shot;
    let mut session = Session::start(
        &config,
        area,
        RecordingRenderer::default(),
        RecordingDispatcher::default(),
    )
    .unwrap();

    let mut now = Instant::now();
    let mut cleared_before_each_dispatch = true;
    let mut cancelled = false;
    let mut dispatched_after_cancel = false;

    for input in inputs {
        let before = session.dispatcher().calls().len();
        let last_render = session.renderer().calls().last().cloned();
        let control = match input {
            Input::Key(c) => session
                .handle_event(&Event::Key(KeyEvent::char(*c)), now)
                .unwrap(),
            Input::Cancel => {
                let control = session
                    .handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)), now)
                    .unwrap();
                cancelled = true;
                control
            }
            Input::Wait(ms) => {
                now += Duration::from_millis(*ms);
                session.tick(now)
            }
        };
        if session.dispatcher().calls().len() > before {
            if last_render != Some(RenderCall::Clear) {
                cleared_before_each_dispatch = false;
            }
            if cancelled {
                dispatched_after_cancel = true;
            }
        }
        if control == Control::Exit {
            break;
        }
    }

    Run {
        session,
        cleared_before_each_dispatch,
        dispatched_after_cancel,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Invariants
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_shot_dispatches_at_most_once(
        area in area_strategy(),
        inputs in proptest::collection::vec(input_strategy(), 0..40),
    ) {
        let run = drive(area, true, &inputs);
        prop_assert!(run.session.dispatcher().calls().len() <= 1);
    }

    #[test]
    fn dispatched_targets_inside_overlay(
        area in area_strategy(),
        inputs in proptest::collection::vec(input_strategy(), 0..60),
    ) {
        let run = drive(area, false, &inputs);
        for call in run.session.dispatcher().calls() {
            prop_assert!(area.contains(call.target), "{} outside {}", call.target, area);
        }
    }

    #[test]
    fn overlay_cleared_before_dispatch(
        area in area_strategy(),
        inputs in proptest::collection::vec(input_strategy(), 0..60),
    ) {
        let run = drive(area, false, &inputs);
        prop_assert!(run.cleared_before_each_dispatch);
    }

    #[test]
    fn nothing_dispatches_after_cancel(
        area in area_strategy(),
        inputs in proptest::collection::vec(input_strategy(), 0..60),
    ) {
        let run = drive(area, false, &inputs);
        prop_assert!(!run.dispatched_after_cancel);
    }
}
