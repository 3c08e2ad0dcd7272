//! Keyboard chord resolution.
//!
//! Undo/redo chords are matched before nudges so a single keypress never
//! does both.

/// Keys the placement surface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

/// Modifier keys held during a keypress. `primary` is Ctrl, or Cmd on macOS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub primary: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { primary: false, shift: false, alt: false };
    pub const PRIMARY: Modifiers = Modifiers { primary: true, shift: false, alt: false };
    pub const SHIFT: Modifiers = Modifiers { primary: false, shift: true, alt: false };
    pub const PRIMARY_SHIFT: Modifiers = Modifiers { primary: true, shift: true, alt: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in canvas space (y grows downward).
    pub fn unit(&self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Undo,
    Redo,
    Nudge { direction: Direction, large: bool },
}

/// Map a keypress to an action.
pub fn resolve_key(key: Key, modifiers: Modifiers) -> Option<KeyAction> {
    if modifiers.primary {
        match key {
            Key::Char(c) if c.eq_ignore_ascii_case(&'z') => {
                return Some(if modifiers.shift { KeyAction::Redo } else { KeyAction::Undo });
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'y') && !modifiers.shift => {
                return Some(KeyAction::Redo);
            }
            _ => {}
        }
    }

    let direction = match key {
        Key::ArrowUp => Direction::Up,
        Key::ArrowDown => Direction::Down,
        Key::ArrowLeft => Direction::Left,
        Key::ArrowRight => Direction::Right,
        Key::Char(_) => return None,
    };
    Some(KeyAction::Nudge {
        direction,
        large: modifiers.shift,
    })
}
