//! Unit tests for key chord resolution.

use printfit::input::{Direction, Key, KeyAction, Modifiers, resolve_key};

#[test]
fn test_undo_redo_chords() {
    assert_eq!(resolve_key(Key::Char('z'), Modifiers::PRIMARY), Some(KeyAction::Undo));
    assert_eq!(resolve_key(Key::Char('Z'), Modifiers::PRIMARY_SHIFT), Some(KeyAction::Redo));
    assert_eq!(resolve_key(Key::Char('y'), Modifiers::PRIMARY), Some(KeyAction::Redo));
}

#[test]
fn test_plain_letters_do_nothing() {
    assert_eq!(resolve_key(Key::Char('z'), Modifiers::NONE), None);
    assert_eq!(resolve_key(Key::Char('y'), Modifiers::PRIMARY_SHIFT), None);
}

#[test]
fn test_arrows_nudge() {
    assert_eq!(
        resolve_key(Key::ArrowLeft, Modifiers::NONE),
        Some(KeyAction::Nudge { direction: Direction::Left, large: false })
    );
    assert_eq!(
        resolve_key(Key::ArrowDown, Modifiers::SHIFT),
        Some(KeyAction::Nudge { direction: Direction::Down, large: true })
    );
}

#[test]
fn test_direction_units_follow_canvas_axes() {
    assert_eq!(Direction::Up.unit(), (0.0, -1.0));
    assert_eq!(Direction::Right.unit(), (1.0, 0.0));
}
