//! The parsed-action input surface a tokenizer hands to the dispatcher.
//!
//! A separately implemented escape-sequence tokenizer produces these
//! variants. Only the shape is defined here — turning bytes into these
//! variants is not this crate's job.

use crate::types::Color;

/// One fully-parsed VT/ANSI/DEC operation, ready for `VtDispatch` to act on.
/// Parameter defaults (typically 1, documented per-variant where it
/// differs) are the tokenizer's responsibility to fill in before handing
/// the action over — the Dispatcher never guesses a missing parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum VtAction {
    /// A single printable code point.
    Print(char),
    /// A contiguous run of printable code points.
    PrintString(String),

    /// Unified cursor motion: CUU/CUD/CUF/CUB/CNL/CPL.
    CursorMove { direction: CursorDirection, distance: u32 },
    /// CHA — cursor horizontal absolute.
    CursorColumnAbsolute(u32),
    /// VPA — cursor vertical absolute.
    CursorRowAbsolute(u32),
    /// CUP/HVP — cursor position. `None` means the parameter was
    /// omitted and the current row/column is preserved.
    CursorPosition { row: Option<u32>, col: Option<u32> },

    /// DECSC — save cursor.
    SaveCursor,
    /// DECRC — restore cursor.
    RestoreCursor,

    /// DECTCEM — cursor visibility.
    SetCursorVisible(bool),
    /// DECSCUSR — cursor style.
    SetCursorStyle(crate::types::CursorStyleCode),

    /// DECKPAM/DECKPNM — keypad application/numeric mode. A bare
    /// `ESC =` / `ESC >`, not a CSI private mode, so it gets its own
    /// variant rather than living in the `PrivateMode` set.
    SetKeypadMode(bool),

    /// ICH — insert character.
    InsertCharacter(u32),
    /// DCH — delete character.
    DeleteCharacter(u32),
    /// ECH — erase character.
    EraseCharacter(u32),

    /// EL — erase in line.
    EraseLine(EraseMode),
    /// ED — erase in display.
    EraseDisplay(EraseMode),

    /// IL — insert line.
    InsertLine(u32),
    /// DL — delete line.
    DeleteLine(u32),

    /// SU — scroll up, positive distance scrolls content up.
    ScrollUp(u32),
    /// SD — scroll down, positive distance scrolls content down.
    ScrollDown(u32),

    /// DECSTBM — set top/bottom scroll margins. Parameters are 1-based as
    /// received; `0` means omitted (top defaults to 1, bottom defaults to
    /// viewport height).
    SetScrollMargins { top: u32, bottom: u32 },

    /// DECCOLM / DECSCPP — set columns.
    SetColumns(u32),

    /// DECSET, batched — a caller hands over all parameters from one
    /// sequence at once so every slot is attempted independently of
    /// whether its siblings succeeded.
    SetPrivateModes(Vec<PrivateMode>),
    /// DECRST, batched the same way.
    ResetPrivateModes(Vec<PrivateMode>),

    /// SGR — select graphic rendition, batched in parameter order.
    SelectGraphicRendition(Vec<SgrParam>),

    /// HTS — horizontal tab set.
    SetTabStop,
    /// CHT — cursor tab forward.
    TabForward(u32),
    /// CBT — cursor tab backward.
    TabBackward(u32),
    /// TBC — tab clear.
    ClearTabStop(TabClearMode),

    /// DSR, ANSI CPR form.
    DeviceStatusReport,
    /// DA — device attributes.
    DeviceAttributes,
    /// OSC 0/2 — set window title.
    SetTitle(String),

    /// DECSTR — soft reset.
    SoftReset,
    /// RIS — hard reset.
    HardReset,

    /// OSC 4 — set a color table entry. Color is pre-decoded from
    /// `0x00BBGGRR`.
    SetColorTableEntry { index: u32, color: Color },

    /// XTWINOPS. Only `ResizeInCharacters` is handled; any other function
    /// code the tokenizer still forwards (e.g. to log) is out of this
    /// enum's scope — the Dispatcher only needs to say no to it.
    WindowManipulation(WindowOp),

    /// RI — reverse line feed.
    ReverseLineFeed,

    /// SCS — designate character set. `slot` is the G-set register
    /// (G0/G1/...); `designator` is the final byte identifying which
    /// table to load.
    DesignateCharset { slot: GSet, designator: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Up,
    Down,
    Forward,
    Back,
    NextLine,
    PrevLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// ToEnd — from cursor to end of line/display.
    ToEnd,
    /// FromBeginning — from beginning of line/display to cursor.
    FromBeginning,
    /// All — entire line/display.
    All,
    /// Scrollback — ED 3, xterm extension.
    Scrollback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabClearMode {
    CurrentColumn,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GSet {
    G0,
    G1,
    G2,
    G3,
}

/// DECSET/DECRST private mode codes this dispatcher recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateMode {
    CursorKeysApplication,
    ColumnMode132,
    CursorBlink,
    CursorVisible,
    MouseVt200,
    MouseButtonEvent,
    MouseAnyEvent,
    MouseUtf8,
    MouseSgr,
    AlternateScroll,
    AlternateScreenBuffer,
    /// Any code this dispatcher does not recognize; carries the raw
    /// numeric code so a batch can still fail just that slot and let its
    /// siblings run.
    Unknown(u32),
}

/// SGR parameter forms, including the 256-color and 24-bit extended forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrParam {
    Reset,
    Bold,
    Dim,
    Italic,
    Underline,
    BlinkSlow,
    BlinkFast,
    Reverse,
    Hidden,
    Strikethrough,

    NormalIntensity,
    NoItalic,
    NoUnderline,
    NoBlink,
    NoReverse,
    NoHidden,
    NoStrikethrough,

    Foreground(Color),
    Background(Color),
    UnderlineColor(Color),
    DefaultForeground,
    DefaultBackground,
    DefaultUnderlineColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOp {
    ResizeInCharacters { rows: u32, cols: u32 },
    Other(u32),
}
