use vtadapt_common::types::{CursorInfo, Position};

/// Cursor state backing `MockConsole` (test-only engine stand-in).
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Position,
    info: CursorInfo,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            position: Position::new(0, 0),
            info: CursorInfo::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    pub fn info(&self) -> CursorInfo {
        self.info
    }

    pub fn set_info(&mut self, info: CursorInfo) {
        self.info = info;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_defaults_to_origin_and_visible() {
        let cursor = Cursor::new();
        assert_eq!(cursor.position(), Position::new(0, 0));
        assert!(cursor.info().visible);
    }

    #[test]
    fn set_position_and_info_round_trip() {
        let mut cursor = Cursor::new();
        cursor.set_position(Position::new(5, 10));
        assert_eq!(cursor.position(), Position::new(5, 10));

        let mut info = cursor.info();
        info.visible = false;
        cursor.set_info(info);
        assert!(!cursor.info().visible);
    }
}
