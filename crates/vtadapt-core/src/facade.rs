//! The Console API façade. Purely abstract: production code binds this to
//! a real screen-buffer engine; tests bind it to the `MockConsole` in
//! `crate::mock`.
//!
//! Every call returns success/failure; the façade never throws.

use vtadapt_common::types::{
    CellAttributes, CursorInfo, CursorStyle, FillCell, InputKeyEvent, Position, Rect,
    ScreenInfoSnapshot, Size,
};

pub trait ConsoleApi {
    fn get_screen_info_ex(&self) -> ScreenInfoSnapshot;
    fn set_screen_info_ex(&mut self, snapshot: ScreenInfoSnapshot) -> bool;

    /// Forwards one already-translated code point to the engine's Print
    /// path (cursor advance/autowrap is the engine's responsibility).
    fn print(&mut self, ch: char) -> bool;
    fn print_str(&mut self, s: &str) -> bool;

    fn set_cursor_position(&mut self, pos: Position) -> bool;
    fn get_cursor_info(&self) -> CursorInfo;
    fn set_cursor_info(&mut self, info: CursorInfo) -> bool;
    fn set_cursor_style(&mut self, style: CursorStyle) -> bool;

    fn fill_char(&mut self, ch: char, count: i32, pos: Position) -> i32;
    fn fill_attr(&mut self, attr: CellAttributes, count: i32, pos: Position) -> i32;

    /// Atomic region move: cells in `source_rect` move to `dest_origin`;
    /// cells vacated by the move (and cells in `source_rect` outside
    /// `clip_rect`, when given) are filled with `fill`.
    fn scroll(
        &mut self,
        source_rect: Rect,
        clip_rect: Option<Rect>,
        dest_origin: Position,
        fill: FillCell,
    ) -> bool;

    /// `rect` is right/bottom-exclusive, same as every other `Rect` in this
    /// crate — not the inclusive coordinates the underlying console API
    /// itself uses.
    fn set_window_info(&mut self, absolute: bool, rect: Rect) -> bool;
    fn set_title(&mut self, title: &str) -> bool;
    fn prepend_input(&mut self, events: &[InputKeyEvent]) -> usize;

    fn set_keypad_mode(&mut self, application: bool) -> bool;
    fn set_cursor_keys_mode(&mut self, application: bool) -> bool;
    fn set_cursor_blink(&mut self, enabled: bool) -> bool;
    fn set_scrolling_region(&mut self, top: i16, bottom: i16) -> bool;
    fn reverse_line_feed(&mut self) -> bool;

    fn set_tab_stop(&mut self) -> bool;
    fn clear_tab_stop(&mut self) -> bool;
    fn clear_all_tab_stops(&mut self) -> bool;
    fn tab_forward(&mut self, count: u32) -> bool;
    fn tab_backward(&mut self, count: u32) -> bool;

    fn set_mouse_mode(&mut self, mode: MouseMode, enabled: bool) -> bool;
    fn set_alternate_scroll(&mut self, enabled: bool) -> bool;

    fn use_alt_screen_buffer(&mut self) -> bool;
    fn use_main_screen_buffer(&mut self) -> bool;

    fn erase_all(&mut self) -> bool;

    fn set_color_table_entry(&mut self, engine_index: u8, rgb: u32) -> bool;

    fn resize_buffer(&mut self, size: Size) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Vt200,
    ButtonEvent,
    AnyEvent,
    Utf8,
    Sgr,
}
