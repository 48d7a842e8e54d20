//! Pure coordinate/region math.
//!
//! Nothing here touches the façade or any mutable state; every function is
//! a total or checked transform so the Dispatcher can treat overflow as an
//! ordinary `handled=false` rather than a panic.

use vtadapt_common::types::{Position, Rect};

/// Converts an unsigned VT distance into a signed delta, failing on
/// overflow of the 16-bit signed range.
pub fn unsigned_to_signed(distance: u32) -> Option<i16> {
    i16::try_from(distance).ok()
}

/// Clamps a position so it lies within `rect`'s interior (right/bottom are
/// exclusive, so the clamped bound is `right - 1` / `bottom - 1`).
/// An empty rect (zero width or height) clamps everything to its
/// top-left corner — treated as a no-op success, not a fault.
pub fn clamp_to_viewport(pos: Position, rect: Rect) -> Position {
    let x = if rect.width() <= 0 {
        rect.left
    } else {
        pos.x.clamp(rect.left, rect.right - 1)
    };
    let y = if rect.height() <= 0 {
        rect.top
    } else {
        pos.y.clamp(rect.top, rect.bottom - 1)
    };
    Position::new(x, y)
}

/// Applies a checked signed delta to one axis of a position, returning
/// `None` on overflow.
pub fn checked_translate(pos: Position, dx: i16, dy: i16) -> Option<Position> {
    let x = pos.x.checked_add(dx)?;
    let y = pos.y.checked_add(dy)?;
    Some(Position::new(x, y))
}

/// Resolves unified cursor-motion (CUU/CUD/CUF/CUB/CNL/CPL): applies
/// `distance` along the chosen axis, snaps the column to `viewport.left`
/// for NextLine/PrevLine, then clamps to the viewport. Returns `None` on
/// distance overflow.
pub fn resolve_cursor_motion(
    cursor: Position,
    viewport: Rect,
    direction: vtadapt_common::actions::CursorDirection,
    distance: u32,
) -> Option<Position> {
    use vtadapt_common::actions::CursorDirection::*;

    let signed = unsigned_to_signed(distance)?;
    let (dx, dy) = match direction {
        Up => (0, -signed),
        Down => (0, signed),
        Forward => (signed, 0),
        Back => (-signed, 0),
        NextLine => (0, signed),
        PrevLine => (0, -signed),
    };

    let mut target = checked_translate(cursor, dx, dy)?;
    if matches!(direction, NextLine | PrevLine) {
        target.x = viewport.left;
    }
    Some(clamp_to_viewport(target, viewport))
}

/// Resolves CHA/VPA/CUP absolute positioning. A `None` parameter preserves
/// the corresponding current viewport-relative coordinate. A `Some(0)`
/// parameter is illegal and must be rejected by the caller before this is
/// invoked; this function assumes 1-based inputs already validated as
/// nonzero.
pub fn resolve_absolute_position(
    cursor: Position,
    viewport: Rect,
    row_1based: Option<u32>,
    col_1based: Option<u32>,
) -> Option<Position> {
    let row_offset = match row_1based {
        Some(r) => i16::try_from(r.checked_sub(1)?).ok()?,
        None => cursor.y.checked_sub(viewport.top)?,
    };
    let col_offset = match col_1based {
        Some(c) => i16::try_from(c.checked_sub(1)?).ok()?,
        None => cursor.x.checked_sub(viewport.left)?,
    };

    let y = viewport.top.checked_add(row_offset)?;
    let x = viewport.left.checked_add(col_offset)?;
    Some(clamp_to_viewport(Position::new(x, y), viewport))
}

/// The row/erase-region helper shared by EL and ED: given a row index,
/// erase mode, and the viewport/cursor, returns the `(start_x, length)`
/// run to fill on that row.
pub fn erase_line_span(
    cursor_x: i16,
    viewport: Rect,
    mode: vtadapt_common::actions::EraseMode,
) -> (i16, i16) {
    use vtadapt_common::actions::EraseMode::*;
    match mode {
        FromBeginning => (viewport.left, cursor_x - viewport.left + 1),
        ToEnd => (cursor_x, viewport.right - cursor_x),
        All | Scrollback => (viewport.left, viewport.right - viewport.left),
    }
}

/// Source rectangle for ICH/DCH: the remainder of the cursor's row, from
/// the cursor to the right edge of the viewport.
pub fn ich_dch_source_rect(cursor: Position, viewport: Rect) -> Rect {
    Rect::new(cursor.x, cursor.y, viewport.right, cursor.y + 1)
}

/// Source rectangle for IL/DL: full viewport width, from the cursor's row
/// to the bottom of the viewport.
pub fn il_dl_source_rect(cursor: Position, viewport: Rect) -> Rect {
    Rect::new(viewport.left, cursor.y, viewport.right, viewport.bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vp() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    #[test]
    fn clamp_handles_empty_rect() {
        let empty = Rect::new(5, 5, 5, 5);
        let clamped = clamp_to_viewport(Position::new(100, 100), empty);
        assert_eq!(clamped, Position::new(5, 5));
    }

    #[test]
    fn absolute_position_preserves_omitted_axis() {
        let cursor = Position::new(10, 5);
        let resolved = resolve_absolute_position(cursor, vp(), None, Some(1)).unwrap();
        assert_eq!(resolved, Position::new(0, 5));
    }

    #[test]
    fn cursor_motion_overflow_is_none() {
        let cursor = Position::new(0, 0);
        let distance = u32::from(u16::MAX) + 10;
        let result = resolve_cursor_motion(
            cursor,
            vp(),
            vtadapt_common::actions::CursorDirection::Forward,
            distance,
        );
        assert!(result.is_none());
    }

    proptest! {
        #[test]
        fn clamp_always_lands_inside_viewport(x in -1000i16..1000, y in -1000i16..1000) {
            let rect = vp();
            let clamped = clamp_to_viewport(Position::new(x, y), rect);
            prop_assert!(clamped.x >= rect.left && clamped.x < rect.right);
            prop_assert!(clamped.y >= rect.top && clamped.y < rect.bottom);
        }

        #[test]
        fn checked_translate_never_panics(x in -1000i16..1000, y in -1000i16..1000, dx in -1000i16..1000, dy in -1000i16..1000) {
            let _ = checked_translate(Position::new(x, y), dx, dy);
        }
    }
}
