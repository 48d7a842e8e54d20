//! Saved/mode state: the adapter's own state, as opposed to anything the
//! engine tracks. Constructed once per terminal session and owned
//! exclusively by the Dispatcher.

use vtadapt_common::types::{CellAttributes, ModeFlags, SavedCursor, ScrollMargins};

/// SGR bold/dim tracked independently from color, so a later color change
/// can reapply intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrightnessState {
    pub bold: bool,
    pub dim: bool,
    /// Set when the current foreground's bright index (8..16) was derived
    /// from a dark (0..8) request because bold was on at the time, as
    /// opposed to an explicitly requested bright color (SGR 90-97). Only a
    /// derived color is safe to fold back to dark when bold turns off.
    pub fg_derived_bright: bool,
}

impl BrightnessState {
    pub fn reset(&mut self) {
        self.bold = false;
        self.dim = false;
        self.fg_derived_bright = false;
    }
}

/// Everything the Dispatcher carries between calls: mode flags, scroll
/// margins, the saved cursor, the brightness bits, and the default text
/// attribute snapshot taken at construction. The designated charset is
/// owned separately by `CharsetTranslator`.
#[derive(Debug, Clone)]
pub struct DispatcherState {
    pub modes: ModeFlags,
    pub scroll_margins: ScrollMargins,
    pub saved_cursor: SavedCursor,
    pub brightness: BrightnessState,
    pub current_attributes: CellAttributes,
    pub default_attributes: CellAttributes,
    pub allow_set_columns: bool,
}

impl DispatcherState {
    pub fn new(default_attributes: CellAttributes, allow_set_columns: bool) -> Self {
        Self {
            modes: ModeFlags::empty(),
            scroll_margins: ScrollMargins::disabled(),
            saved_cursor: SavedCursor::default(),
            brightness: BrightnessState::default(),
            current_attributes: default_attributes,
            default_attributes,
            allow_set_columns,
        }
    }

    /// The subset of state DECSTR (soft reset) touches: cursor-keys
    /// normal, keypad numeric, scroll margins cleared, SGR off. Cursor
    /// visibility, charset reset, and the final save-to-home are the
    /// caller's responsibility since they involve the façade and the
    /// translator.
    pub fn soft_reset(&mut self) {
        self.modes.remove(ModeFlags::CURSOR_KEYS_APP);
        self.modes.remove(ModeFlags::KEYPAD_APP);
        self.scroll_margins = ScrollMargins::disabled();
        self.brightness.reset();
        self.current_attributes = self.default_attributes;
        self.saved_cursor = SavedCursor::default();
    }

    /// The subset of state RIS (hard reset) touches directly; erase calls
    /// and cursor repositioning go through the façade in `VtDispatch`.
    pub fn hard_reset(&mut self) {
        self.modes = ModeFlags::empty();
        self.scroll_margins = ScrollMargins::disabled();
        self.brightness.reset();
        self.current_attributes = self.default_attributes;
        self.saved_cursor = SavedCursor::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_reset_clears_margins_and_brightness() {
        let mut state = DispatcherState::new(CellAttributes::default(), false);
        state.scroll_margins = ScrollMargins { top: 2, bottom: 10 };
        state.brightness.bold = true;
        state.soft_reset();
        assert!(state.scroll_margins.is_disabled());
        assert!(!state.brightness.bold);
    }

    #[test]
    fn hard_reset_clears_all_mode_flags() {
        let mut state = DispatcherState::new(CellAttributes::default(), false);
        state.modes.insert(ModeFlags::MOUSE_SGR);
        state.hard_reset();
        assert!(state.modes.is_empty());
    }
}
