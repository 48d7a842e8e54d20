use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A cell position in *engine-absolute* coordinates (0-based), signed so
/// that region math can go negative mid-computation before being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// A rectangle with an inclusive top-left and an *exclusive* bottom-right.
/// Used uniformly for the viewport and for scroll/fill rectangles; engines
/// that prefer an inclusive rect convert at the façade edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl Rect {
    pub fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i16 {
        self.right - self.left
    }

    pub fn height(&self) -> i16 {
        self.bottom - self.top
    }
}

/// Buffer/viewport dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub cols: i16,
    pub rows: i16,
}

impl Size {
    pub fn new(cols: i16, rows: i16) -> Self {
        Self { cols, rows }
    }
}

/// A color as it would be carried on a cell or in an SGR parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// One of the 16 standard indices (0..16), subject to SGR bold/dim
    /// reapplication.
    Indexed16(u8),
    /// 256-color palette index, not affected by SGR bold/dim.
    Indexed256(u8),
    Rgb(u8, u8, u8),
    Default,
}

bitflags! {
    /// Non-color text rendition bits. Bold/Dim are intentionally *not*
    /// authoritative here — `BrightnessState` (vtadapt-core) tracks them
    /// independently so a later color change can reapply intensity. These
    /// flags mirror that state for convenience when a caller just wants
    /// "is bold currently on".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct AttributeFlags: u16 {
        const BOLD            = 0b0000_0000_0001;
        const DIM             = 0b0000_0000_0010;
        const ITALIC          = 0b0000_0000_0100;
        const UNDERLINE        = 0b0000_0000_1000;
        const BLINK_SLOW        = 0b0000_0001_0000;
        const BLINK_FAST        = 0b0000_0010_0000;
        const REVERSE          = 0b0000_0100_0000;
        const HIDDEN          = 0b0000_1000_0000;
        const STRIKETHROUGH      = 0b0001_0000_0000;
    }
}

/// The full current text attribute as applied by SGR and stamped on cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAttributes {
    pub fg: Color,
    pub bg: Color,
    pub underline_color: Option<Color>,
    pub flags: AttributeFlags,
}

impl Default for CellAttributes {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            underline_color: None,
            flags: AttributeFlags::empty(),
        }
    }
}

/// A single fill operation's payload: the code point and attribute to stamp
/// across a run of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillCell {
    pub ch: char,
    pub attrs: CellAttributes,
}

impl FillCell {
    pub fn space(attrs: CellAttributes) -> Self {
        Self { ch: ' ', attrs }
    }
}

bitflags! {
    /// The Dispatcher's own mode flags, distinct from anything the engine
    /// tracks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct ModeFlags: u16 {
        const CURSOR_KEYS_APP     = 0b0000_0000_0001;
        const KEYPAD_APP        = 0b0000_0000_0010;
        const DECCOLM_ENABLED     = 0b0000_0000_0100;
        const MOUSE_DEFAULT      = 0b0000_0000_1000;
        const MOUSE_BUTTON_EVENT   = 0b0000_0001_0000;
        const MOUSE_ANY_EVENT     = 0b0000_0010_0000;
        const MOUSE_UTF8        = 0b0000_0100_0000;
        const MOUSE_SGR         = 0b0000_1000_0000;
        const ALTERNATE_SCROLL     = 0b0001_0000_0000;
        const CURSOR_BLINK       = 0b0010_0000_0000;
    }
}

/// DECSCUSR cursor style codes. Two inputs collapse to "blinking block"
/// (the explicit code, and the power-on default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorStyleCode {
    BlinkingBlockDefault,
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorShape {
    Block,
    Underline,
    Bar,
}

/// The engine-facing cursor shape/blink pair a style code resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorStyle {
    pub shape: CursorShape,
    pub blinking: bool,
}

/// Top/bottom scroll margins, 0-based inclusive-inclusive when enabled.
/// `(0, 0)` is the explicit disabled sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollMargins {
    pub top: i16,
    pub bottom: i16,
}

impl ScrollMargins {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.top == 0 && self.bottom == 0
    }
}

/// Cursor save state in VT 1-based, viewport-relative coordinates. Always
/// a valid pair >= (1,1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: u32,
    pub row: u32,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self { col: 1, row: 1 }
    }
}

/// A read-only-per-command snapshot of the screen the Dispatcher reads
/// before every operation; never cached across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenInfoSnapshot {
    pub buffer_size: Size,
    pub viewport: Rect,
    pub cursor: Position,
    pub attributes: CellAttributes,
    pub color_table: [u32; 16],
}

/// A synthetic key event used to feed DSR/DA replies back into the input
/// queue. Key/scan codes are left at zero since these were never
/// generated by a real keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputKeyEvent {
    pub key_down: bool,
    pub code_unit: u16,
}

impl InputKeyEvent {
    pub fn pair_for(code_unit: u16) -> [InputKeyEvent; 2] {
        [
            InputKeyEvent { key_down: true, code_unit },
            InputKeyEvent { key_down: false, code_unit },
        ]
    }
}

/// Visibility + style pairing read/written as one façade call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorInfo {
    pub visible: bool,
    pub style: CursorStyle,
}

impl Default for CursorInfo {
    fn default() -> Self {
        Self {
            visible: true,
            style: CursorStyle { shape: CursorShape::Block, blinking: true },
        }
    }
}
