//! Character-set translator.
//!
//! Maps incoming code points through the currently designated G-set before
//! they reach the engine's print path. USASCII is the identity mapping;
//! DEC Special Graphics (line drawing) remaps the `0x60..=0x7e` range.

use vtadapt_common::actions::GSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    UsAscii,
    DecSpecialGraphics,
}

/// DEC Special Graphics table, indexed by `ch as u8 - 0x60` for
/// `'\x60'..='\x7e'`. Unmapped entries fall back to the input character.
const DEC_LINE_DRAWING: [char; 31] = [
    '\u{25c6}', '\u{2592}', '\u{2409}', '\u{240c}', '\u{240d}', '\u{240a}', '\u{00b0}',
    '\u{00b1}', '\u{2424}', '\u{240b}', '\u{2518}', '\u{2510}', '\u{250c}', '\u{2514}',
    '\u{253c}', '\u{23ba}', '\u{23bb}', '\u{2500}', '\u{23bc}', '\u{23bd}', '\u{251c}',
    '\u{2524}', '\u{2534}', '\u{252c}', '\u{2502}', '\u{2264}', '\u{2265}', '\u{03c0}',
    '\u{2260}', '\u{00a3}', '\u{00b7}',
];

#[derive(Debug, Clone)]
pub struct CharsetTranslator {
    active: [Charset; 4],
    current_slot: GSet,
}

impl CharsetTranslator {
    pub fn new() -> Self {
        Self {
            active: [Charset::UsAscii; 4],
            current_slot: GSet::G0,
        }
    }

    /// Designates a G-set table (SCS). An unrecognized designator leaves
    /// the current mapping untouched but is still reported `handled=true`
    /// by the caller.
    pub fn designate(&mut self, slot: GSet, designator: char) {
        let charset = match designator {
            '0' => Charset::DecSpecialGraphics,
            'B' | 'A' => Charset::UsAscii,
            _ => return,
        };
        self.active[slot_index(slot)] = charset;
    }

    pub fn reset(&mut self) {
        self.active = [Charset::UsAscii; 4];
        self.current_slot = GSet::G0;
    }

    pub fn needs_translation(&self) -> bool {
        self.active[slot_index(self.current_slot)] != Charset::UsAscii
    }

    /// Total: every code point has a defined translation, identity unless
    /// the active G-set remaps it.
    pub fn translate(&self, cp: char) -> char {
        match self.active[slot_index(self.current_slot)] {
            Charset::UsAscii => cp,
            Charset::DecSpecialGraphics => {
                if ('\u{60}'..='\u{7e}').contains(&cp) {
                    DEC_LINE_DRAWING[cp as usize - 0x60]
                } else {
                    cp
                }
            }
        }
    }
}

impl Default for CharsetTranslator {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_index(slot: GSet) -> usize {
    match slot {
        GSet::G0 => 0,
        GSet::G1 => 1,
        GSet::G2 => 2,
        GSet::G3 => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usascii_is_identity() {
        let t = CharsetTranslator::new();
        assert!(!t.needs_translation());
        assert_eq!(t.translate('q'), 'q');
    }

    #[test]
    fn dec_line_drawing_remaps_q_to_horizontal_line() {
        let mut t = CharsetTranslator::new();
        t.designate(GSet::G0, '0');
        assert!(t.needs_translation());
        assert_eq!(t.translate('q'), '\u{2500}');
        assert_eq!(t.translate('a'), '\u{2592}');
    }

    #[test]
    fn unsupported_designator_is_ignored() {
        let mut t = CharsetTranslator::new();
        t.designate(GSet::G0, 'Z');
        assert!(!t.needs_translation());
    }

    #[test]
    fn reset_restores_usascii() {
        let mut t = CharsetTranslator::new();
        t.designate(GSet::G0, '0');
        t.reset();
        assert!(!t.needs_translation());
    }
}
