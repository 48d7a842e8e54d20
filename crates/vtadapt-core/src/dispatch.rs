//! The Dispatcher: receives already-parsed VT actions and invokes the
//! right command handler against the `ConsoleApi` façade. Stateless with
//! respect to parsing; stateful with respect to VT modes.
//!
//! Every public method returns `handled: bool` — no exception-equivalent
//! ever crosses this boundary. Internal helpers that need a real `Result`
//! use `vtadapt_common::error::DispatchError` and get collapsed to `bool`
//! here, propagating `Result` internally while the outward mutators stay
//! infallible.

use tracing::{debug, instrument, trace};

use vtadapt_common::actions::{
    CursorDirection, EraseMode, GSet, PrivateMode, SgrParam, TabClearMode, VtAction, WindowOp,
};
use vtadapt_common::error::{DispatchError, Result as DispatchResult};
use vtadapt_common::types::{
    CellAttributes, Color, CursorShape, CursorStyle, CursorStyleCode, FillCell, InputKeyEvent,
    ModeFlags, Position, Rect, SavedCursor, ScrollMargins, Size,
};

use crate::charset::CharsetTranslator;
use crate::facade::{ConsoleApi, MouseMode};
use crate::geometry;
use crate::state::DispatcherState;

/// Recognized dispatcher configuration options.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub allow_set_columns: bool,
    pub default_attributes: CellAttributes,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { allow_set_columns: false, default_attributes: CellAttributes::default() }
    }
}

pub struct VtDispatch<C: ConsoleApi> {
    console: C,
    state: DispatcherState,
    charset: CharsetTranslator,
}

impl<C: ConsoleApi> VtDispatch<C> {
    pub fn new(console: C, config: DispatchConfig) -> Self {
        Self {
            console,
            state: DispatcherState::new(config.default_attributes, config.allow_set_columns),
            charset: CharsetTranslator::new(),
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Single entry point a caller can use instead of the per-operation
    /// methods below; exists for callers that just hold a `VtAction` and
    /// want to route it, not a separate code path (every arm below just
    /// forwards to the matching named method).
    pub fn dispatch(&mut self, action: VtAction) -> bool {
        match action {
            VtAction::Print(cp) => self.print(cp),
            VtAction::PrintString(s) => self.print_string(&s),
            VtAction::CursorMove { direction, distance } => self.cursor_move(direction, distance),
            VtAction::CursorColumnAbsolute(col) => self.cursor_position(None, Some(col)),
            VtAction::CursorRowAbsolute(row) => self.cursor_position(Some(row), None),
            VtAction::CursorPosition { row, col } => self.cursor_position(row, col),
            VtAction::SaveCursor => self.save_cursor(),
            VtAction::RestoreCursor => self.restore_cursor(),
            VtAction::SetCursorVisible(visible) => self.set_cursor_visible(visible),
            VtAction::SetCursorStyle(code) => self.set_cursor_style(code),
            VtAction::SetKeypadMode(application) => self.set_keypad_mode(application),
            VtAction::InsertCharacter(n) => self.insert_character(n),
            VtAction::DeleteCharacter(n) => self.delete_character(n),
            VtAction::EraseCharacter(n) => self.erase_character(n),
            VtAction::EraseLine(mode) => self.erase_line(mode),
            VtAction::EraseDisplay(mode) => self.erase_display(mode),
            VtAction::InsertLine(n) => self.insert_line(n),
            VtAction::DeleteLine(n) => self.delete_line(n),
            VtAction::ScrollUp(n) => self.scroll_up(n),
            VtAction::ScrollDown(n) => self.scroll_down(n),
            VtAction::SetScrollMargins { top, bottom } => self.set_scroll_margins(top, bottom),
            VtAction::SetColumns(cols) => self.set_columns(cols),
            VtAction::SetPrivateModes(modes) => self.set_private_modes(&modes),
            VtAction::ResetPrivateModes(modes) => self.reset_private_modes(&modes),
            VtAction::SelectGraphicRendition(params) => self.select_graphic_rendition(&params),
            VtAction::SetTabStop => self.set_tab_stop(),
            VtAction::TabForward(n) => self.tab_forward(n),
            VtAction::TabBackward(n) => self.tab_backward(n),
            VtAction::ClearTabStop(mode) => self.clear_tab_stop(mode),
            VtAction::DeviceStatusReport => self.device_status_report(),
            VtAction::DeviceAttributes => self.device_attributes(),
            VtAction::SetTitle(title) => self.set_title(&title),
            VtAction::SoftReset => self.soft_reset(),
            VtAction::HardReset => self.hard_reset(),
            VtAction::SetColorTableEntry { index, color } => {
                self.set_color_table_entry(index, color)
            }
            VtAction::WindowManipulation(op) => self.window_manipulation(op),
            VtAction::ReverseLineFeed => self.reverse_line_feed(),
            VtAction::DesignateCharset { slot, designator } => {
                self.designate_charset(slot, designator)
            }
        }
    }

    // ---- Printable and string output -------------------------------

    pub fn print(&mut self, codepoint: char) -> bool {
        trace!(?codepoint, "print");
        let translated = self.translate(codepoint);
        self.console.print(translated)
    }

    pub fn print_string(&mut self, buffer: &str) -> bool {
        trace!(len = buffer.len(), "print_string");
        if self.charset.needs_translation() {
            let translated: String = buffer.chars().map(|c| self.translate(c)).collect();
            self.console.print_str(&translated)
        } else {
            self.console.print_str(buffer)
        }
    }

    fn translate(&self, cp: char) -> char {
        if self.charset.needs_translation() {
            self.charset.translate(cp)
        } else {
            cp
        }
    }

    // ---- Cursor motion ----------------------------------------------

    #[instrument(skip(self))]
    pub fn cursor_move(&mut self, direction: CursorDirection, distance: u32) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(target) =
            geometry::resolve_cursor_motion(snapshot.cursor, snapshot.viewport, direction, distance)
        else {
            debug!("cursor motion distance overflowed i16 range");
            return false;
        };
        self.console.set_cursor_position(target)
    }

    // ---- Absolute positioning ----------------------------------------

    #[instrument(skip(self))]
    pub fn cursor_position(&mut self, row: Option<u32>, col: Option<u32>) -> bool {
        if row == Some(0) || col == Some(0) {
            debug!("zero parameter to absolute positioning is illegal");
            return false;
        }
        let snapshot = self.console.get_screen_info_ex();
        let Some(target) =
            geometry::resolve_absolute_position(snapshot.cursor, snapshot.viewport, row, col)
        else {
            return false;
        };
        self.console.set_cursor_position(target)
    }

    // ---- Save/restore cursor ------------------------------------------

    pub fn save_cursor(&mut self) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let col = (snapshot.cursor.x - snapshot.viewport.left + 1).max(1) as u32;
        let row = (snapshot.cursor.y - snapshot.viewport.top + 1).max(1) as u32;
        self.state.saved_cursor = SavedCursor { col, row };
        true
    }

    pub fn restore_cursor(&mut self) -> bool {
        let saved = self.state.saved_cursor;
        self.cursor_position(Some(saved.row), Some(saved.col))
    }

    // ---- Cursor visibility and style ----------------------------------

    pub fn set_cursor_visible(&mut self, visible: bool) -> bool {
        let mut info = self.console.get_cursor_info();
        info.visible = visible;
        self.console.set_cursor_info(info)
    }

    pub fn set_cursor_style(&mut self, code: CursorStyleCode) -> bool {
        let style = cursor_style_for(code);
        self.console.set_cursor_style(style)
    }

    /// DECKPAM/DECKPNM — a bare `ESC =`/`ESC >`, not a DECSET private
    /// mode, see `VtAction::SetKeypadMode`.
    pub fn set_keypad_mode(&mut self, application: bool) -> bool {
        self.state.modes.set(ModeFlags::KEYPAD_APP, application);
        self.console.set_keypad_mode(application)
    }

    // ---- Insert/Delete Character (ICH/DCH) --------------------------------------

    #[instrument(skip(self))]
    pub fn insert_character(&mut self, distance: u32) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(signed) = geometry::unsigned_to_signed(distance) else {
            return false;
        };
        let source = geometry::ich_dch_source_rect(snapshot.cursor, snapshot.viewport);
        let Some(dest) = geometry::checked_translate(
            Position::new(source.left, source.top),
            signed,
            0,
        ) else {
            return false;
        };

        let fill = FillCell::space(self.state.current_attributes);
        if dest.x >= snapshot.viewport.right {
            let (start_x, length) =
                (snapshot.cursor.x, snapshot.viewport.right - snapshot.cursor.x);
            return self.fill_run(start_x, snapshot.cursor.y, length, fill);
        }
        self.console.scroll(source, Some(source), dest, fill)
    }

    #[instrument(skip(self))]
    pub fn delete_character(&mut self, distance: u32) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(signed) = geometry::unsigned_to_signed(distance) else {
            return false;
        };
        let Some(scroll_left) =
            snapshot.cursor.x.checked_add(signed)
        else {
            return false;
        };

        let fill = FillCell::space(self.state.current_attributes);
        if scroll_left >= snapshot.viewport.right {
            let length = snapshot.viewport.right - snapshot.cursor.x;
            return self.fill_run(snapshot.cursor.x, snapshot.cursor.y, length, fill);
        }
        let source = Rect::new(scroll_left, snapshot.cursor.y, snapshot.viewport.right, snapshot.cursor.y + 1);
        let clip = Rect::new(snapshot.cursor.x, snapshot.cursor.y, snapshot.viewport.right, snapshot.cursor.y + 1);
        self.console.scroll(source, Some(clip), snapshot.cursor, fill)
    }

    fn fill_run(&mut self, start_x: i16, y: i16, length: i16, fill: FillCell) -> bool {
        if length <= 0 {
            return true;
        }
        let pos = Position::new(start_x, y);
        let c1 = self.console.fill_char(fill.ch, length as i32, pos);
        let c2 = self.console.fill_attr(fill.attrs, length as i32, pos);
        c1 == length as i32 && c2 == length as i32
    }

    // ---- Erase Character (ECH) -----------------------------------------------

    pub fn erase_character(&mut self, count: u32) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(signed) = geometry::unsigned_to_signed(count) else {
            return false;
        };
        let max_len = snapshot.viewport.right - snapshot.cursor.x;
        let length = signed.min(max_len);
        let fill = FillCell::space(self.state.current_attributes);
        self.fill_run(snapshot.cursor.x, snapshot.cursor.y, length, fill)
    }

    // ---- Erase In Line / Erase In Display (EL/ED) ------------------------------

    pub fn erase_line(&mut self, mode: EraseMode) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        self.erase_row(snapshot.cursor.y, snapshot.cursor.x, snapshot.viewport, mode)
    }

    fn erase_row(&mut self, row: i16, cursor_x: i16, viewport: Rect, mode: EraseMode) -> bool {
        let (start_x, length) = geometry::erase_line_span(cursor_x, viewport, mode);
        let fill = FillCell::space(self.state.current_attributes);
        self.fill_run(start_x, row, length, fill)
    }

    #[instrument(skip(self))]
    pub fn erase_display(&mut self, mode: EraseMode) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        match mode {
            EraseMode::FromBeginning => {
                let mut ok = true;
                for row in snapshot.viewport.top..snapshot.cursor.y {
                    ok &= self.erase_row(row, snapshot.cursor.x, snapshot.viewport, EraseMode::All);
                }
                ok && self.erase_row(
                    snapshot.cursor.y,
                    snapshot.cursor.x,
                    snapshot.viewport,
                    EraseMode::FromBeginning,
                )
            }
            EraseMode::ToEnd => {
                let mut ok = self.erase_row(
                    snapshot.cursor.y,
                    snapshot.cursor.x,
                    snapshot.viewport,
                    EraseMode::ToEnd,
                );
                for row in (snapshot.cursor.y + 1)..snapshot.viewport.bottom {
                    ok &= self.erase_row(row, snapshot.cursor.x, snapshot.viewport, EraseMode::All);
                }
                ok
            }
            // "Erase All" (ED 2) delegates to the engine's own
            // scroll-into-scrollback primitive, distinct from the per-row
            // composition used above for the other modes.
            EraseMode::All => self.console.erase_all(),
            EraseMode::Scrollback => self.erase_scrollback(),
        }
    }

    /// Erase-scrollback (ED 3).
    fn erase_scrollback(&mut self) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let viewport = snapshot.viewport;
        if viewport.width() <= 0 || viewport.height() <= 0 {
            return false;
        }

        let fill = FillCell::space(self.state.current_attributes);
        let origin = Position::new(0, 0);
        let mut ok = self.console.scroll(viewport, None, origin, fill);

        let buffer_size = snapshot.buffer_size;
        let below_rows = buffer_size.rows - viewport.height();
        if below_rows > 0 {
            let count = i32::from(buffer_size.cols.max(0)) * i32::from(below_rows);
            ok &= self.console.fill_char(fill.ch, count, Position::new(0, viewport.height())) == count;
            ok &= self.console.fill_attr(fill.attrs, count, Position::new(0, viewport.height())) == count;
        }

        let right_width = buffer_size.cols - viewport.width();
        if right_width > 0 {
            for row in 0..viewport.height() {
                let pos = Position::new(viewport.width(), row);
                let count = i32::from(right_width);
                ok &= self.console.fill_char(fill.ch, count, pos) == count;
                ok &= self.console.fill_attr(fill.attrs, count, pos) == count;
            }
        }

        let new_window = Rect::new(0, 0, buffer_size.cols, buffer_size.rows);
        ok &= self.console.set_window_info(true, new_window);

        let new_cursor = Position::new(
            snapshot.cursor.x - viewport.left,
            snapshot.cursor.y - viewport.top,
        );
        ok &= self.console.set_cursor_position(new_cursor);
        ok
    }

    // ---- Insert/Delete Line (IL/DL) --------------------------------------------

    pub fn insert_line(&mut self, distance: u32) -> bool {
        self.shift_lines(distance, true)
    }

    pub fn delete_line(&mut self, distance: u32) -> bool {
        self.shift_lines(distance, false)
    }

    fn shift_lines(&mut self, distance: u32, insert: bool) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(signed) = geometry::unsigned_to_signed(distance) else {
            return false;
        };
        let region = self.effective_scroll_region(snapshot.viewport);
        let clip = Rect::new(region.left, snapshot.cursor.y, region.right, region.bottom);
        let source = geometry::il_dl_source_rect(snapshot.cursor, region);
        let dest_y = if insert {
            snapshot.cursor.y.saturating_add(signed)
        } else {
            snapshot.cursor.y.saturating_sub(signed)
        };
        let fill = FillCell::space(self.state.current_attributes);
        self.console.scroll(source, Some(clip), Position::new(region.left, dest_y), fill)
    }

    fn effective_scroll_region(&self, viewport: Rect) -> Rect {
        if self.state.scroll_margins.is_disabled() {
            viewport
        } else {
            Rect::new(
                viewport.left,
                viewport.top + self.state.scroll_margins.top,
                viewport.right,
                viewport.top + self.state.scroll_margins.bottom + 1,
            )
        }
    }

    // ---- Pan / scroll (SU/SD) --------------------------------------------------

    pub fn scroll_up(&mut self, distance: u32) -> bool {
        self.pan(distance, true)
    }

    pub fn scroll_down(&mut self, distance: u32) -> bool {
        self.pan(distance, false)
    }

    fn pan(&mut self, distance: u32, up: bool) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let Some(signed) = geometry::unsigned_to_signed(distance) else {
            return false;
        };
        let region = self.effective_scroll_region(snapshot.viewport);
        let fill = FillCell::space(self.state.current_attributes);
        let (source, dest) = if up {
            (
                Rect::new(region.left, region.top + signed, region.right, region.bottom),
                Position::new(region.left, region.top),
            )
        } else {
            (
                Rect::new(region.left, region.top, region.right, region.bottom - signed),
                Position::new(region.left, region.top + signed),
            )
        };
        self.console.scroll(source, Some(region), dest, fill)
    }

    // ---- Scroll margins (DECSTBM) ---------------------------------------

    #[instrument(skip(self))]
    pub fn set_scroll_margins(&mut self, top: u32, bottom: u32) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let height = u32::try_from(snapshot.viewport.height()).unwrap_or(0);

        let margins = match resolve_scroll_margins(top, bottom, height) {
            Ok(margins) => margins,
            Err(err) => {
                debug!(%err, "DECSTBM rejected");
                return false;
            }
        };
        self.state.scroll_margins = margins.unwrap_or_else(ScrollMargins::disabled);
        self.push_margins_and_home(snapshot.viewport)
    }

    fn push_margins_and_home(&mut self, viewport: Rect) -> bool {
        let margins = self.state.scroll_margins;
        let pushed = self.console.set_scrolling_region(margins.top, margins.bottom);
        let homed = self.console.set_cursor_position(Position::new(viewport.left, viewport.top));
        pushed && homed
    }

    // ---- DECCOLM / DECSCPP -----------------------------------------------

    #[instrument(skip(self))]
    pub fn set_columns(&mut self, columns: u32) -> bool {
        if !self.state.allow_set_columns {
            return true;
        }
        let Some(cols) = i16::try_from(columns).ok() else {
            return false;
        };
        let snapshot = self.console.get_screen_info_ex();
        let resized = self.console.resize_buffer(Size::new(cols, snapshot.buffer_size.rows));
        let homed = self.cursor_position(Some(1), Some(1));
        let erased = self.erase_display(EraseMode::All);
        let cleared_margins = self.set_scroll_margins(0, 0);
        resized && homed && erased && cleared_margins
    }

    // ---- DECSET/DECRST (private modes) -----------------------------------

    pub fn set_private_modes(&mut self, modes: &[PrivateMode]) -> bool {
        modes.iter().map(|m| self.apply_private_mode(*m, true)).fold(true, |acc, ok| acc & ok)
    }

    pub fn reset_private_modes(&mut self, modes: &[PrivateMode]) -> bool {
        modes.iter().map(|m| self.apply_private_mode(*m, false)).fold(true, |acc, ok| acc & ok)
    }

    fn apply_private_mode(&mut self, mode: PrivateMode, enable: bool) -> bool {
        match mode {
            PrivateMode::CursorKeysApplication => {
                self.state.modes.set(ModeFlags::CURSOR_KEYS_APP, enable);
                self.console.set_cursor_keys_mode(enable)
            }
            PrivateMode::ColumnMode132 => {
                self.state.modes.set(ModeFlags::DECCOLM_ENABLED, enable);
                self.set_columns(if enable { 132 } else { 80 })
            }
            PrivateMode::CursorBlink => {
                self.state.modes.set(ModeFlags::CURSOR_BLINK, enable);
                self.console.set_cursor_blink(enable)
            }
            PrivateMode::CursorVisible => self.set_cursor_visible(enable),
            PrivateMode::MouseVt200 => {
                self.state.modes.set(ModeFlags::MOUSE_DEFAULT, enable);
                self.console.set_mouse_mode(MouseMode::Vt200, enable)
            }
            PrivateMode::MouseButtonEvent => {
                self.state.modes.set(ModeFlags::MOUSE_BUTTON_EVENT, enable);
                self.console.set_mouse_mode(MouseMode::ButtonEvent, enable)
            }
            PrivateMode::MouseAnyEvent => {
                self.state.modes.set(ModeFlags::MOUSE_ANY_EVENT, enable);
                self.console.set_mouse_mode(MouseMode::AnyEvent, enable)
            }
            PrivateMode::MouseUtf8 => {
                self.state.modes.set(ModeFlags::MOUSE_UTF8, enable);
                self.console.set_mouse_mode(MouseMode::Utf8, enable)
            }
            PrivateMode::MouseSgr => {
                self.state.modes.set(ModeFlags::MOUSE_SGR, enable);
                self.console.set_mouse_mode(MouseMode::Sgr, enable)
            }
            PrivateMode::AlternateScroll => {
                self.state.modes.set(ModeFlags::ALTERNATE_SCROLL, enable);
                self.console.set_alternate_scroll(enable)
            }
            PrivateMode::AlternateScreenBuffer => {
                if enable {
                    self.console.use_alt_screen_buffer()
                } else {
                    self.console.use_main_screen_buffer()
                }
            }
            PrivateMode::Unknown(code) => {
                let err = DispatchError::Unsupported(format!("private mode {code}"));
                debug!(%err, "slot failed, siblings still run");
                false
            }
        }
    }

    // ---- SGR (Select Graphic Rendition) ----------------------------------------------------------

    pub fn select_graphic_rendition(&mut self, params: &[SgrParam]) -> bool {
        for param in params {
            self.apply_sgr_param(*param);
        }
        true
    }

    fn apply_sgr_param(&mut self, param: SgrParam) {
        use vtadapt_common::types::AttributeFlags as F;
        match param {
            SgrParam::Reset => {
                self.state.current_attributes = self.state.default_attributes;
                self.state.brightness.reset();
            }
            SgrParam::Bold => {
                self.state.brightness.bold = true;
                self.reapply_brightness();
            }
            SgrParam::Dim => {
                self.state.brightness.dim = true;
                self.reapply_brightness();
            }
            SgrParam::NormalIntensity => {
                self.state.brightness.bold = false;
                self.state.brightness.dim = false;
                self.reapply_brightness();
            }
            SgrParam::Italic => self.state.current_attributes.flags.insert(F::ITALIC),
            SgrParam::NoItalic => self.state.current_attributes.flags.remove(F::ITALIC),
            SgrParam::Underline => self.state.current_attributes.flags.insert(F::UNDERLINE),
            SgrParam::NoUnderline => self.state.current_attributes.flags.remove(F::UNDERLINE),
            SgrParam::BlinkSlow => self.state.current_attributes.flags.insert(F::BLINK_SLOW),
            SgrParam::BlinkFast => self.state.current_attributes.flags.insert(F::BLINK_FAST),
            SgrParam::NoBlink => {
                self.state.current_attributes.flags.remove(F::BLINK_SLOW | F::BLINK_FAST)
            }
            SgrParam::Reverse => self.state.current_attributes.flags.insert(F::REVERSE),
            SgrParam::NoReverse => self.state.current_attributes.flags.remove(F::REVERSE),
            SgrParam::Hidden => self.state.current_attributes.flags.insert(F::HIDDEN),
            SgrParam::NoHidden => self.state.current_attributes.flags.remove(F::HIDDEN),
            SgrParam::Strikethrough => {
                self.state.current_attributes.flags.insert(F::STRIKETHROUGH)
            }
            SgrParam::NoStrikethrough => {
                self.state.current_attributes.flags.remove(F::STRIKETHROUGH)
            }
            SgrParam::Foreground(color) => self.set_foreground(color),
            SgrParam::Background(color) => {
                self.state.current_attributes.bg = color;
            }
            SgrParam::UnderlineColor(color) => {
                self.state.current_attributes.underline_color = Some(color);
            }
            SgrParam::DefaultForeground => self.set_foreground(Color::Default),
            SgrParam::DefaultBackground => self.state.current_attributes.bg = Color::Default,
            SgrParam::DefaultUnderlineColor => {
                self.state.current_attributes.underline_color = None;
            }
        }
    }

    /// Stores a freshly requested foreground color (SGR 30-37/39/90-97 or
    /// the 38/48 extended forms). A dark index (0..8) is intensified to its
    /// bright counterpart when bold is currently on, and marked as derived
    /// so a later `NormalIntensity` can fold it back down. A color already
    /// in the bright range (8..16, i.e. explicitly requested via 90-97) is
    /// stored untouched and never marked derived, so normal-intensity can't
    /// darken it. 256-color and 24-bit colors are untouched, matching xterm.
    fn set_foreground(&mut self, color: Color) {
        match color {
            Color::Indexed16(i) if i < 8 && self.state.brightness.bold => {
                self.state.current_attributes.fg = Color::Indexed16(i + 8);
                self.state.brightness.fg_derived_bright = true;
            }
            other => {
                self.state.current_attributes.fg = other;
                self.state.brightness.fg_derived_bright = false;
            }
        }
    }

    /// Reapplies the bold bit to the already-stored foreground after a
    /// Bold/Dim/NormalIntensity transition. Only intensifies a currently
    /// dark index, and only de-intensifies a bright index this module
    /// itself derived — an explicitly requested bright color (90-97) is
    /// never touched here.
    fn reapply_brightness(&mut self) {
        match self.state.current_attributes.fg {
            Color::Indexed16(i) if i < 8 && self.state.brightness.bold => {
                self.state.current_attributes.fg = Color::Indexed16(i + 8);
                self.state.brightness.fg_derived_bright = true;
            }
            Color::Indexed16(i)
                if i >= 8 && self.state.brightness.fg_derived_bright && !self.state.brightness.bold =>
            {
                self.state.current_attributes.fg = Color::Indexed16(i - 8);
                self.state.brightness.fg_derived_bright = false;
            }
            _ => {}
        }
    }

    // ---- Tabs -----------------------------------------------------------

    pub fn set_tab_stop(&mut self) -> bool {
        self.console.set_tab_stop()
    }

    pub fn tab_forward(&mut self, count: u32) -> bool {
        self.console.tab_forward(count)
    }

    pub fn tab_backward(&mut self, count: u32) -> bool {
        self.console.tab_backward(count)
    }

    pub fn clear_tab_stop(&mut self, mode: TabClearMode) -> bool {
        match mode {
            TabClearMode::CurrentColumn => self.console.clear_tab_stop(),
            TabClearMode::All => self.console.clear_all_tab_stops(),
        }
    }

    // ---- DSR, DA, response channel ------------------------------

    pub fn device_status_report(&mut self) -> bool {
        let snapshot = self.console.get_screen_info_ex();
        let row = snapshot.cursor.y - snapshot.viewport.top + 1;
        let col = snapshot.cursor.x - snapshot.viewport.left + 1;
        let reply = format!("\x1b[{};{}R", row, col);
        self.send_reply(&reply)
    }

    pub fn device_attributes(&mut self) -> bool {
        self.send_reply("\x1b[?1;0c")
    }

    fn send_reply(&mut self, reply: &str) -> bool {
        let events: Vec<InputKeyEvent> = reply
            .chars()
            .flat_map(|c| InputKeyEvent::pair_for(c as u16))
            .collect();
        let written = self.console.prepend_input(&events);
        if written != events.len() {
            let err = DispatchError::Facade(format!(
                "prepend_input wrote {written} of {} events",
                events.len()
            ));
            debug!(%err, "response reply dropped");
            return false;
        }
        true
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.console.set_title(title)
    }

    // ---- Reset (DECSTR soft, RIS hard) -----------------------------------

    #[instrument(skip(self))]
    pub fn soft_reset(&mut self) -> bool {
        if !self.set_cursor_visible(true) {
            return false;
        }
        if !self.console.set_cursor_keys_mode(false) {
            return false;
        }
        if !self.set_keypad_mode(false) {
            return false;
        }
        if !self.set_scroll_margins(0, 0) {
            return false;
        }
        self.charset.reset();
        self.state.soft_reset();
        self.save_cursor()
    }

    #[instrument(skip(self))]
    pub fn hard_reset(&mut self) -> bool {
        if !self.erase_display(EraseMode::Scrollback) {
            return false;
        }
        if !self.erase_display(EraseMode::All) {
            return false;
        }
        if !self.cursor_position(Some(1), Some(1)) {
            return false;
        }
        self.state.hard_reset();
        self.charset.reset();
        true
    }

    // ---- Color table (OSC 4) ---------------------------------------------

    pub fn set_color_table_entry(&mut self, xterm_index: u32, color: Color) -> bool {
        if xterm_index > 15 {
            return false;
        }
        let engine_index = xterm_to_engine_index(xterm_index as u8);
        let rgb = color_to_bgr_u32(color);
        self.console.set_color_table_entry(engine_index, rgb)
    }

    // ---- Window manipulation (XTWINOPS) ----------------------------------

    pub fn window_manipulation(&mut self, op: WindowOp) -> bool {
        match op {
            WindowOp::ResizeInCharacters { rows, cols } => {
                let (Ok(rows), Ok(cols)) = (i16::try_from(rows), i16::try_from(cols)) else {
                    return false;
                };
                self.console.resize_buffer(Size::new(cols, rows))
            }
            WindowOp::Other(code) => {
                let err = DispatchError::Unsupported(format!("XTWINOPS function code {code}"));
                debug!(%err, "window manipulation not supported");
                false
            }
        }
    }

    // ---- Reverse line feed -------------------------------------------------

    pub fn reverse_line_feed(&mut self) -> bool {
        self.console.reverse_line_feed()
    }

    // ---- Designate charset (SCS) --------------------------------------------

    pub fn designate_charset(&mut self, slot: GSet, designator: char) -> bool {
        self.charset.designate(slot, designator);
        true
    }
}

/// DECSTBM's rewrite rules, as a real `Result` an internal caller can
/// propagate with `?` before `set_scroll_margins` collapses it to
/// `handled=false`. `Ok(None)` means "disable margins"; `Ok(Some(_))`
/// carries the 0-based stored pair.
fn resolve_scroll_margins(top: u32, bottom: u32, height: u32) -> DispatchResult<Option<ScrollMargins>> {
    if top == 0 && bottom == 0 {
        return Ok(None);
    }
    let bottom = if bottom == 0 { height } else { bottom };
    if bottom < top {
        return Err(DispatchError::Parameter(format!(
            "DECSTBM bottom {bottom} < top {top}"
        )));
    }
    if (top == 0 || top == 1) && bottom == height {
        return Ok(None);
    }
    let top0 = i16::try_from(top.saturating_sub(1))
        .map_err(|_| DispatchError::Parameter("DECSTBM top overflowed i16 range".into()))?;
    let bottom0 = i16::try_from(bottom.saturating_sub(1))
        .map_err(|_| DispatchError::Parameter("DECSTBM bottom overflowed i16 range".into()))?;
    Ok(Some(ScrollMargins { top: top0, bottom: bottom0 }))
}

fn cursor_style_for(code: CursorStyleCode) -> CursorStyle {
    use CursorStyleCode::*;
    match code {
        BlinkingBlockDefault | BlinkingBlock => {
            CursorStyle { shape: CursorShape::Block, blinking: true }
        }
        SteadyBlock => CursorStyle { shape: CursorShape::Block, blinking: false },
        BlinkingUnderline => CursorStyle { shape: CursorShape::Underline, blinking: true },
        SteadyUnderline => CursorStyle { shape: CursorShape::Underline, blinking: false },
        BlinkingBar => CursorStyle { shape: CursorShape::Bar, blinking: true },
        SteadyBar => CursorStyle { shape: CursorShape::Bar, blinking: false },
    }
}

/// xterm and the engine disagree on the ordering of the bright palette
/// half; swap bit 0 and bit 2 of the low 3 bits within each 8-color half.
fn xterm_to_engine_index(index: u8) -> u8 {
    let low3 = index & 0b111;
    let swapped = ((low3 & 0b001) << 2) | (low3 & 0b010) | ((low3 & 0b100) >> 2);
    (index & 0b1000) | swapped
}

fn color_to_bgr_u32(color: Color) -> u32 {
    match color {
        Color::Rgb(r, g, b) => (u32::from(b) << 16) | (u32::from(g) << 8) | u32::from(r),
        Color::Indexed16(_) | Color::Indexed256(_) | Color::Default => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConsole;

    fn dispatch() -> VtDispatch<MockConsole> {
        VtDispatch::new(MockConsole::new(Size::new(80, 24)), DispatchConfig::default())
    }

    #[test]
    fn ed2_clears_viewport_and_preserves_cursor() {
        let mut d = dispatch();
        d.console_mut().set_cursor_position(Position::new(0, 0));
        assert!(d.erase_display(EraseMode::All));
        assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(0, 0));
    }

    #[test]
    fn erase_scrollback_resizes_window_to_the_exclusive_full_buffer() {
        let mut d = dispatch();
        let buffer_size = d.console().get_screen_info_ex().buffer_size;
        assert!(d.erase_display(EraseMode::Scrollback));
        assert_eq!(
            d.console().get_screen_info_ex().viewport,
            Rect::new(0, 0, buffer_size.cols, buffer_size.rows),
        );
    }

    #[test]
    fn cup_homes_cursor() {
        let mut d = dispatch();
        d.console_mut().set_cursor_position(Position::new(10, 5));
        assert!(d.cursor_position(Some(1), Some(1)));
        assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(0, 0));
    }

    #[test]
    fn ich_shifts_row_right() {
        let mut d = dispatch();
        for ch in "HELLO".chars() {
            d.print(ch);
        }
        d.console_mut().set_cursor_position(Position::new(0, 0));
        assert!(d.insert_character(4));
        let row: String = (0..9)
            .map(|x| d.console().cell_at(Position::new(x, 0)).ch)
            .collect();
        assert_eq!(row, "    HELLO");
    }

    #[test]
    fn save_then_restore_returns_to_same_cursor() {
        let mut d = dispatch();
        d.console_mut().set_cursor_position(Position::new(7, 3));
        assert!(d.save_cursor());
        d.cursor_position(Some(1), Some(1));
        assert!(d.restore_cursor());
        assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(7, 3));
    }

    #[test]
    fn decset_25l_hides_cursor_only() {
        let mut d = dispatch();
        assert!(d.reset_private_modes(&[PrivateMode::CursorVisible]));
        assert!(!d.console().get_cursor_info().visible);
    }

    #[test]
    fn dsr_cpr_reply_matches_expected_code_units() {
        let mut d = dispatch();
        d.console_mut().set_cursor_position(Position::new(12, 4));
        assert!(d.device_status_report());
        let events = d.console_mut().take_input_queue();
        let expected = "\x1b[5;13R";
        assert_eq!(events.len(), expected.len() * 2);
        let replayed: String = events
            .iter()
            .step_by(2)
            .map(|e| e.code_unit as u8 as char)
            .collect();
        assert_eq!(replayed, expected);
    }

    #[test]
    fn cup_zero_parameter_is_rejected() {
        let mut d = dispatch();
        assert!(!d.cursor_position(Some(0), Some(1)));
    }

    #[test]
    fn decstbm_reversed_margins_rejected() {
        let mut d = dispatch();
        assert!(!d.set_scroll_margins(3, 2));
        assert!(d.state.scroll_margins.is_disabled());
    }

    #[test]
    fn decstbm_valid_margins_convert_to_zero_based_and_home_cursor() {
        let mut d = dispatch();
        assert!(d.set_scroll_margins(2, 10));
        assert_eq!(d.state.scroll_margins, ScrollMargins { top: 1, bottom: 9 });
        assert_eq!(d.console().get_screen_info_ex().cursor, Position::new(0, 0));
    }

    #[test]
    fn sgr_off_restores_default_attributes() {
        let mut d = dispatch();
        d.select_graphic_rendition(&[SgrParam::Bold, SgrParam::Foreground(Color::Indexed16(1))]);
        assert!(d.select_graphic_rendition(&[SgrParam::Reset]));
        assert_eq!(d.state.current_attributes, d.state.default_attributes);
    }

    #[test]
    fn bold_intensifies_a_dark_foreground() {
        let mut d = dispatch();
        d.select_graphic_rendition(&[SgrParam::Bold, SgrParam::Foreground(Color::Indexed16(1))]);
        assert_eq!(d.state.current_attributes.fg, Color::Indexed16(9));
    }

    #[test]
    fn normal_intensity_folds_a_derived_bright_foreground_back_to_dark() {
        let mut d = dispatch();
        d.select_graphic_rendition(&[SgrParam::Bold, SgrParam::Foreground(Color::Indexed16(1))]);
        d.select_graphic_rendition(&[SgrParam::NormalIntensity]);
        assert_eq!(d.state.current_attributes.fg, Color::Indexed16(1));
    }

    #[test]
    fn normal_intensity_never_darkens_an_explicitly_requested_bright_foreground() {
        let mut d = dispatch();
        d.select_graphic_rendition(&[SgrParam::Foreground(Color::Indexed16(9))]);
        d.select_graphic_rendition(&[SgrParam::NormalIntensity]);
        assert_eq!(d.state.current_attributes.fg, Color::Indexed16(9));
    }

    #[test]
    fn keypad_mode_flag_tracks_deckpam() {
        let mut d = dispatch();
        assert!(d.set_keypad_mode(true));
        assert!(d.state.modes.contains(ModeFlags::KEYPAD_APP));
        assert!(d.soft_reset());
        assert!(!d.state.modes.contains(ModeFlags::KEYPAD_APP));
    }

    #[test]
    fn color_table_index_above_15_rejected() {
        let mut d = dispatch();
        assert!(!d.set_color_table_entry(16, Color::Rgb(1, 2, 3)));
    }

    #[test]
    fn ich_then_dch_round_trips_row() {
        let mut d = dispatch();
        for ch in "HELLO".chars() {
            d.print(ch);
        }
        d.console_mut().set_cursor_position(Position::new(0, 0));
        let before: Vec<char> = (0..10).map(|x| d.console().cell_at(Position::new(x, 0)).ch).collect();
        assert!(d.insert_character(3));
        assert!(d.delete_character(3));
        let after: Vec<char> = (0..10).map(|x| d.console().cell_at(Position::new(x, 0)).ch).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn deccolm_homes_cursor_through_viewport_not_buffer_origin() {
        let mut d = VtDispatch::new(
            MockConsole::new(Size::new(132, 50)),
            DispatchConfig { allow_set_columns: true, ..DispatchConfig::default() },
        );
        d.console_mut().set_window_info(false, Rect::new(10, 20, 89, 43));
        assert!(d.set_columns(80));
        assert_eq!(
            d.console().get_screen_info_ex().cursor,
            Position::new(10, 20),
            "DECCOLM must home through the viewport-relative positioner, not a hardcoded (0, 0)"
        );
    }
}
