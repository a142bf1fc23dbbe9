#![no_main]

use arbitrary::Arbitrary;
use keygrid_core::alphabet::Alphabet;
use keygrid_core::error::Axis;
use keygrid_core::event::{KeyCode, KeyEvent};
use keygrid_core::geometry::Rect;
use keygrid_core::grid::GridMap;
use keygrid_core::selection::{Effect, Outcome, PointerAction, SelectionState, Selector};
use keygrid_core::subgrid::SubGridLayout;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    x: i16,
    y: i16,
    width: u16,
    height: u16,
    sub_rows: u8,
    sub_cols: u8,
    keys: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let area = Rect::new(
        i32::from(input.x),
        i32::from(input.y),
        i32::from(input.width),
        i32::from(input.height),
    );
    let Ok(grid) = GridMap::build(
        area,
        Alphabet::new(Axis::Rows, "QWERASDFZX").unwrap(),
        Alphabet::new(Axis::Cols, "HJKLUIOPNM").unwrap(),
    ) else {
        return;
    };
    let sub = SubGridLayout::new(
        usize::from(input.sub_rows % 6),
        usize::from(input.sub_cols % 6),
        Alphabet::new(Axis::Sub, "QWEASDZXC").unwrap(),
    )
    .ok();
    let selector = Selector::new(grid, sub, KeyCode::Escape, PointerAction::Click);

    let mut state = SelectionState::new();
    for byte in input.keys {
        let key = if byte == 0x1b {
            KeyEvent::new(KeyCode::Escape)
        } else {
            KeyEvent::char(char::from(byte))
        };
        let step = selector
            .handle(&state, &key)
            .expect("valid geometry never faults");
        if let Outcome::Resolved(target) = step.outcome {
            assert!(area.contains(target), "{target} outside {area}");
            assert!(step.state.is_initial());
            assert!(matches!(
                step.effects.as_slice(),
                [Effect::Highlight(_), Effect::ClearOverlay, Effect::Dispatch { .. }]
            ));
        }
        state = step.state;
    }
});
