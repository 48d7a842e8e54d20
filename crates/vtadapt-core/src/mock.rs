//! Test-only `ConsoleApi` implementation, backed by
//! `terminal::buffer::ScreenBuffer` and `terminal::cursor::Cursor`.

use crate::facade::{ConsoleApi, MouseMode};
use crate::terminal::buffer::{Cell, ScreenBuffer, ScrollbackBuffer};
use crate::terminal::cursor::Cursor;
use vtadapt_common::types::{
    CellAttributes, CursorInfo, CursorStyle, FillCell, InputKeyEvent, Position, Rect,
    ScreenInfoSnapshot, Size,
};

pub struct MockConsole {
    buffer: ScreenBuffer,
    scrollback: ScrollbackBuffer,
    cursor: Cursor,
    viewport: Rect,
    attributes: CellAttributes,
    color_table: [u32; 16],
    title: String,
    input_queue: Vec<InputKeyEvent>,
    tab_stops: Vec<bool>,
    using_alt_screen: bool,
    main_buffer_snapshot: Option<ScreenBuffer>,
}

impl MockConsole {
    pub fn new(size: Size) -> Self {
        let viewport = Rect::new(0, 0, size.cols, size.rows);
        let cols = size.cols.max(0) as usize;
        Self {
            buffer: ScreenBuffer::new(size),
            scrollback: ScrollbackBuffer::new(10_000),
            cursor: Cursor::new(),
            viewport,
            attributes: CellAttributes::default(),
            color_table: default_color_table(),
            title: String::new(),
            input_queue: Vec::new(),
            tab_stops: vec![false; cols],
            using_alt_screen: false,
            main_buffer_snapshot: None,
        }
    }

    pub fn print(&mut self, ch: char) {
        let pos = self.cursor.position();
        self.buffer.set_cell(pos, Cell { ch, attrs: self.attributes });
    }

    pub fn take_input_queue(&mut self) -> Vec<InputKeyEvent> {
        std::mem::take(&mut self.input_queue)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cell_at(&self, pos: Position) -> Cell {
        self.buffer.get_cell(pos)
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    fn for_each_linear_cell(
        &mut self,
        count: i32,
        pos: Position,
        mut apply: impl FnMut(&mut Cell),
    ) -> i32 {
        let cols = self.buffer.size().cols.max(0) as i32;
        if cols == 0 {
            return 0;
        }
        let start = pos.y as i32 * cols + pos.x as i32;
        let mut written = 0;
        for i in 0..count.max(0) {
            let linear = start + i;
            if linear < 0 {
                continue;
            }
            let y = (linear / cols) as i16;
            let x = (linear % cols) as i16;
            let cell_pos = Position::new(x, y);
            if y < 0 || y >= self.buffer.size().rows {
                break;
            }
            let mut cell = self.buffer.get_cell(cell_pos);
            apply(&mut cell);
            self.buffer.set_cell(cell_pos, cell);
            written += 1;
        }
        written
    }
}

impl ConsoleApi for MockConsole {
    fn get_screen_info_ex(&self) -> ScreenInfoSnapshot {
        ScreenInfoSnapshot {
            buffer_size: self.buffer.size(),
            viewport: self.viewport,
            cursor: self.cursor.position(),
            attributes: self.attributes,
            color_table: self.color_table,
        }
    }

    fn set_screen_info_ex(&mut self, snapshot: ScreenInfoSnapshot) -> bool {
        self.viewport = snapshot.viewport;
        self.cursor.set_position(snapshot.cursor);
        self.attributes = snapshot.attributes;
        self.color_table = snapshot.color_table;
        true
    }

    fn print(&mut self, ch: char) -> bool {
        self.print(ch);
        let mut pos = self.cursor.position();
        pos.x += 1;
        self.cursor.set_position(pos);
        true
    }

    fn print_str(&mut self, s: &str) -> bool {
        for ch in s.chars() {
            ConsoleApi::print(self, ch);
        }
        true
    }

    fn set_cursor_position(&mut self, pos: Position) -> bool {
        let clamped = crate::geometry::clamp_to_viewport(pos, self.viewport);
        self.cursor.set_position(clamped);
        true
    }

    fn get_cursor_info(&self) -> CursorInfo {
        self.cursor.info()
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> bool {
        self.cursor.set_info(info);
        true
    }

    fn set_cursor_style(&mut self, style: CursorStyle) -> bool {
        let mut info = self.cursor.info();
        info.style = style;
        self.cursor.set_info(info);
        true
    }

    /// Walks `count` cells in row-major order starting at `pos`, wrapping
    /// across row boundaries the way a contiguous cell buffer would.
    fn fill_char(&mut self, ch: char, count: i32, pos: Position) -> i32 {
        self.for_each_linear_cell(count, pos, |cell| cell.ch = ch)
    }

    fn fill_attr(&mut self, attr: CellAttributes, count: i32, pos: Position) -> i32 {
        self.for_each_linear_cell(count, pos, |cell| cell.attrs = attr)
    }

    fn scroll(
        &mut self,
        source_rect: Rect,
        clip_rect: Option<Rect>,
        dest_origin: Position,
        fill: FillCell,
    ) -> bool {
        if source_rect.width() <= 0 || source_rect.height() <= 0 {
            return true;
        }
        let clip = clip_rect.unwrap_or(self.viewport);
        let dx = dest_origin.x - source_rect.left;
        let dy = dest_origin.y - source_rect.top;
        let dest_rect = Rect::new(
            source_rect.left + dx,
            source_rect.top + dy,
            source_rect.right + dx,
            source_rect.bottom + dy,
        );

        let mut moved = vec![
            vec![None; source_rect.width() as usize];
            source_rect.height() as usize
        ];
        for ry in 0..source_rect.height() {
            for rx in 0..source_rect.width() {
                let src = Position::new(source_rect.left + rx, source_rect.top + ry);
                if in_rect(src, clip) {
                    moved[ry as usize][rx as usize] = Some(self.buffer.get_cell(src));
                }
            }
        }

        for ry in 0..source_rect.height() {
            for rx in 0..source_rect.width() {
                if let Some(cell) = moved[ry as usize][rx as usize] {
                    let dst = Position::new(dest_rect.left + rx, dest_rect.top + ry);
                    if in_rect(dst, clip) {
                        self.buffer.set_cell(dst, cell);
                    }
                }
            }
        }

        let fill_cell = Cell { ch: fill.ch, attrs: fill.attrs };
        for y in source_rect.top..source_rect.bottom {
            for x in source_rect.left..source_rect.right {
                let pos = Position::new(x, y);
                if in_rect(pos, clip) && !in_rect(pos, dest_rect) {
                    self.buffer.set_cell(pos, fill_cell);
                }
            }
        }
        true
    }

    fn set_window_info(&mut self, _absolute: bool, rect: Rect) -> bool {
        self.viewport = rect;
        true
    }

    fn set_title(&mut self, title: &str) -> bool {
        self.title = title.to_string();
        true
    }

    fn prepend_input(&mut self, events: &[InputKeyEvent]) -> usize {
        let mut new_queue = events.to_vec();
        new_queue.extend(std::mem::take(&mut self.input_queue));
        self.input_queue = new_queue;
        events.len()
    }

    fn set_keypad_mode(&mut self, _application: bool) -> bool {
        true
    }

    fn set_cursor_keys_mode(&mut self, _application: bool) -> bool {
        true
    }

    fn set_cursor_blink(&mut self, _enabled: bool) -> bool {
        true
    }

    fn set_scrolling_region(&mut self, _top: i16, _bottom: i16) -> bool {
        true
    }

    fn reverse_line_feed(&mut self) -> bool {
        true
    }

    fn set_tab_stop(&mut self) -> bool {
        let col = self.cursor.position().x;
        if let Some(stop) = self.tab_stops.get_mut(col.max(0) as usize) {
            *stop = true;
        }
        true
    }

    fn clear_tab_stop(&mut self) -> bool {
        let col = self.cursor.position().x;
        if let Some(stop) = self.tab_stops.get_mut(col.max(0) as usize) {
            *stop = false;
        }
        true
    }

    fn clear_all_tab_stops(&mut self) -> bool {
        self.tab_stops.iter_mut().for_each(|s| *s = false);
        true
    }

    fn tab_forward(&mut self, _count: u32) -> bool {
        true
    }

    fn tab_backward(&mut self, _count: u32) -> bool {
        true
    }

    fn set_mouse_mode(&mut self, _mode: MouseMode, _enabled: bool) -> bool {
        true
    }

    fn set_alternate_scroll(&mut self, _enabled: bool) -> bool {
        true
    }

    fn use_alt_screen_buffer(&mut self) -> bool {
        if !self.using_alt_screen {
            self.main_buffer_snapshot = Some(std::mem::replace(
                &mut self.buffer,
                ScreenBuffer::new(self.buffer.size()),
            ));
            self.using_alt_screen = true;
        }
        true
    }

    fn use_main_screen_buffer(&mut self) -> bool {
        if let Some(main) = self.main_buffer_snapshot.take() {
            self.buffer = main;
        }
        self.using_alt_screen = false;
        true
    }

    /// Erase All: every viewport row is scrolled into scrollback and
    /// replaced with a blank row, one row at a time, rather than cloning
    /// the whole buffer and wiping it in a separate pass.
    fn erase_all(&mut self) -> bool {
        for _ in 0..self.buffer.size().rows.max(0) {
            if let Some(row) = self.buffer.remove_top_row() {
                self.scrollback.push(row);
            }
            self.buffer.push_blank_row(self.attributes);
        }
        true
    }

    fn set_color_table_entry(&mut self, engine_index: u8, rgb: u32) -> bool {
        if let Some(slot) = self.color_table.get_mut(engine_index as usize) {
            *slot = rgb;
            true
        } else {
            false
        }
    }

    fn resize_buffer(&mut self, size: Size) -> bool {
        self.buffer.resize(size, self.attributes);
        true
    }
}

fn in_rect(pos: Position, rect: Rect) -> bool {
    pos.x >= rect.left && pos.x < rect.right && pos.y >= rect.top && pos.y < rect.bottom
}

fn default_color_table() -> [u32; 16] {
    [
        0x000000, 0x0000_80, 0x008000, 0x808000, 0x000080, 0x800080, 0x008080, 0xc0c0c0,
        0x808080, 0x0000ff, 0x00ff00, 0xffff00, 0x0000ff, 0xff00ff, 0x00ffff, 0xffffff,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_char_writes_count_cells_from_pos() {
        let mut console = MockConsole::new(Size::new(10, 5));
        let written = console.fill_char('x', 3, Position::new(0, 0));
        assert_eq!(written, 3);
        assert_eq!(console.cell_at(Position::new(0, 0)).ch, 'x');
        assert_eq!(console.cell_at(Position::new(2, 0)).ch, 'x');
        assert_eq!(console.cell_at(Position::new(3, 0)).ch, ' ');
    }

    #[test]
    fn set_cursor_position_clamps_to_viewport() {
        let mut console = MockConsole::new(Size::new(10, 5));
        console.set_cursor_position(Position::new(100, 100));
        assert_eq!(console.get_screen_info_ex().cursor, Position::new(9, 4));
    }

    #[test]
    fn alt_screen_round_trips_main_buffer_content() {
        let mut console = MockConsole::new(Size::new(10, 5));
        console.fill_char('m', 1, Position::new(0, 0));
        console.use_alt_screen_buffer();
        console.fill_char('a', 1, Position::new(0, 0));
        assert_eq!(console.cell_at(Position::new(0, 0)).ch, 'a');
        console.use_main_screen_buffer();
        assert_eq!(console.cell_at(Position::new(0, 0)).ch, 'm');
    }

    #[test]
    fn prepend_input_preserves_order() {
        let mut console = MockConsole::new(Size::new(10, 5));
        let events = InputKeyEvent::pair_for(b'R' as u16);
        console.prepend_input(&events);
        let queue = console.take_input_queue();
        assert_eq!(queue.len(), 2);
        assert!(queue[0].key_down);
        assert!(!queue[1].key_down);
    }
}
