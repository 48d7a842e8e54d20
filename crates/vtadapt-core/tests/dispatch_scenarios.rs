//! End-to-end scenario tests, placed under `tests/` rather than inline
//! `#[cfg(test)]` since each of these drives the full `VtDispatch` +
//! `MockConsole` pair rather than one module in isolation.

use vtadapt_common::actions::{EraseMode, PrivateMode, VtAction};
use vtadapt_common::types::{Position, Size};
use vtadapt_core::mock::MockConsole;
use vtadapt_core::{ConsoleApi, DispatchConfig, VtDispatch};

fn dispatch_on(size: Size) -> VtDispatch<MockConsole> {
    VtDispatch::new(MockConsole::new(size), DispatchConfig::default())
}

/// Scenario 1: `ESC [ 2 J` clears every cell in an 80x24 viewport at the
/// default attribute and leaves the cursor untouched.
#[test]
fn scenario_ed2_clears_viewport_leaves_cursor() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(0, 0));
    assert!(d.dispatch(VtAction::EraseDisplay(EraseMode::All)));

    for y in 0..24 {
        for x in 0..80 {
            let cell = d.console().cell_at(Position::new(x, y));
            assert_eq!(cell.ch, ' ');
        }
    }
    assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(0, 0));
}

/// Scenario 2: cursor at (10, 5), `ESC [ H` (CUP with omitted params,
/// defaulting to 1;1) homes it to (0, 0).
#[test]
fn scenario_cup_homes_cursor() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(10, 5));
    assert!(d.dispatch(VtAction::CursorPosition { row: Some(1), col: Some(1) }));
    assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(0, 0));
}

/// Scenario 3: line "HELLO" at row 0, `ESC [ 4 @` (ICH 4) shifts it right
/// so the row reads four spaces then "HELLO".
#[test]
fn scenario_ich_four_shifts_hello_right() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(0, 0));
    for ch in "HELLO".chars() {
        assert!(d.dispatch(VtAction::Print(ch)));
    }
    d.console_mut().set_cursor_position(Position::new(0, 0));
    assert!(d.dispatch(VtAction::InsertCharacter(4)));

    let row: String = (0..9).map(|x| d.console().cell_at(Position::new(x, 0)).ch).collect();
    assert_eq!(row, "    HELLO");
}

/// Scenario 4: `ESC 7` (DECSC) at (7, 3), move to (0, 0) via `ESC [ H`,
/// then `ESC 8` (DECRC) returns the cursor to (7, 3).
#[test]
fn scenario_decsc_decrc_round_trip() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(7, 3));
    assert!(d.dispatch(VtAction::SaveCursor));
    assert!(d.dispatch(VtAction::CursorPosition { row: Some(1), col: Some(1) }));
    assert!(d.dispatch(VtAction::RestoreCursor));
    assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(7, 3));
}

/// Scenario 5: `ESC [ ? 25 l` (DECRST DECTCEM) only flips cursor
/// visibility — no other façade state changes.
#[test]
fn scenario_decrst_25_hides_cursor_only() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(12, 4));
    let before = d.console().get_screen_info_ex();

    assert!(d.dispatch(VtAction::ResetPrivateModes(vec![PrivateMode::CursorVisible])));

    assert!(!d.console().get_cursor_info().visible);
    let after = d.console().get_screen_info_ex();
    assert_eq!(before.cursor, after.cursor);
    assert_eq!(before.viewport, after.viewport);
}

/// Scenario 6: `ESC [ 6 n` (DSR/CPR) at cursor (col 12, row 4), viewport
/// top=0/left=0, prepends 8 key events encoding `ESC [ 5 ; 1 3 R`.
#[test]
fn scenario_dsr_cpr_prepends_expected_reply() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(12, 4));
    assert!(d.dispatch(VtAction::DeviceStatusReport));

    let events = d.console_mut().take_input_queue();
    let expected = "\x1b[5;13R";
    assert_eq!(events.len(), 8);
    assert_eq!(events.len(), expected.len() * 2);

    let replayed: String = events.iter().step_by(2).map(|e| e.code_unit as u8 as char).collect();
    assert_eq!(replayed, expected);
    for pair in events.chunks(2) {
        assert!(pair[0].key_down);
        assert!(!pair[1].key_down);
    }
}

/// Boundary test: CUP with a 0 parameter is rejected and leaves the
/// cursor untouched.
#[test]
fn boundary_cup_zero_parameter_rejected_and_cursor_unchanged() {
    let mut d = dispatch_on(Size::new(80, 24));
    d.console_mut().set_cursor_position(Position::new(5, 5));
    assert!(!d.dispatch(VtAction::CursorPosition { row: Some(0), col: Some(1) }));
    assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(5, 5));
}

/// Boundary test: a column index past `viewport.right` clamps to
/// `viewport.right - 1` rather than wrapping or erroring.
#[test]
fn boundary_cup_column_past_viewport_clamps() {
    let mut d = dispatch_on(Size::new(80, 24));
    assert!(d.dispatch(VtAction::CursorPosition { row: Some(1), col: Some(500) }));
    assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(79, 0));
}

/// Boundary test: `SetColorTableEntry(16, ...)` is rejected —
/// only indices 0..16 are legal.
#[test]
fn boundary_set_color_table_entry_16_rejected() {
    use vtadapt_common::types::Color;
    let mut d = dispatch_on(Size::new(80, 24));
    assert!(!d.dispatch(VtAction::SetColorTableEntry { index: 16, color: Color::Rgb(1, 2, 3) }));
}
