//! Undo/Redo Integration Tests

use crate::helpers::{RED, TestSessionBuilder, solid};
use printfit::input::{Direction, Key, Modifiers, ResizeHandle};
use printfit::session::EditingSession;
use printfit::settings::EngineSettings;
use printfit::types::PrintLocation;

fn session() -> EditingSession {
    TestSessionBuilder::new()
        .with_artwork(PrintLocation::Front, solid(100, 100, RED))
        .build()
}

#[test]
fn test_mixed_edits_undo_and_redo() {
    let mut session = session();
    let initial = session.active_context().transform().unwrap();

    session.with_active_surface(|ctx| ctx.nudge(Direction::Right, false)).unwrap();
    session.with_active_surface(|ctx| ctx.rotate_step(true)).unwrap();
    session
        .with_active_surface(|ctx| {
            ctx.begin_drag((200.0, 200.0))?;
            ctx.pointer_move((230.0, 210.0))?;
            ctx.pointer_move((260.0, 220.0))?;
            ctx.end_gesture()
        })
        .unwrap();
    session.with_active_surface(|ctx| ctx.fit_to_print_area()).unwrap();
    let last = session.active_context().transform().unwrap();
    assert_eq!(session.active_context().history().len(), 5);

    for _ in 0..4 {
        assert!(session.with_active_surface(|ctx| ctx.undo()).is_some());
    }
    assert_eq!(session.active_context().transform(), Some(initial));
    assert_eq!(session.with_active_surface(|ctx| ctx.undo()), None);
    assert_eq!(session.active_context().transform(), Some(initial));

    for _ in 0..4 {
        assert!(session.with_active_surface(|ctx| ctx.redo()).is_some());
    }
    assert_eq!(session.active_context().transform(), Some(last));
    assert_eq!(session.with_active_surface(|ctx| ctx.redo()), None);
}

#[test]
fn test_new_edit_after_undo_drops_redo() {
    let mut session = session();
    session.with_active_surface(|ctx| ctx.nudge(Direction::Up, false)).unwrap();
    session.with_active_surface(|ctx| ctx.nudge(Direction::Up, false)).unwrap();
    session.with_active_surface(|ctx| ctx.undo());

    session.with_active_surface(|ctx| ctx.rotate(90.0)).unwrap();
    assert!(!session.active_context().history().can_redo());
    assert_eq!(session.with_active_surface(|ctx| ctx.redo()), None);
    assert_eq!(session.active_context().history().len(), 3);
}

#[test]
fn test_keyboard_undo_redo() {
    let mut session = session();
    let initial = session.active_context().transform().unwrap();
    session.with_active_surface(|ctx| ctx.handle_key(Key::ArrowRight, Modifiers::SHIFT));
    let moved = session.active_context().transform().unwrap();
    assert_eq!(moved.x, initial.x + 10.0);

    session.with_active_surface(|ctx| ctx.handle_key(Key::Char('z'), Modifiers::PRIMARY));
    assert_eq!(session.active_context().transform(), Some(initial));
    session.with_active_surface(|ctx| ctx.handle_key(Key::Char('y'), Modifiers::PRIMARY));
    assert_eq!(session.active_context().transform(), Some(moved));
}

#[test]
fn test_rejected_resize_records_nothing() {
    let mut session = session();
    let initial = session.active_context().transform().unwrap();
    let committed = session
        .with_active_surface(|ctx| {
            ctx.begin_resize(ResizeHandle::BottomRight, (0.0, 0.0))?;
            // 132px box shrunk by 120px per axis
            ctx.pointer_move((-120.0, -120.0))?;
            ctx.end_gesture()
        })
        .unwrap();
    assert_eq!(committed, None);
    assert_eq!(session.active_context().transform(), Some(initial));
    assert_eq!(session.active_context().history().len(), 1);
}

#[test]
fn test_undo_notifies_listeners() {
    let mut session = session();
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let seen = std::rc::Rc::clone(&count);
    session.subscribe(move |_, _| seen.set(seen.get() + 1));

    session.with_active_surface(|ctx| ctx.rotate(90.0)).unwrap();
    session.with_active_surface(|ctx| ctx.undo());
    session.with_active_surface(|ctx| ctx.redo());
    assert_eq!(count.get(), 3);
}

#[test]
fn test_history_limit_from_settings() {
    let mut settings = EngineSettings::default();
    settings.placement.history_limit = 3;
    let mut session = TestSessionBuilder::new()
        .with_settings(settings)
        .with_artwork(PrintLocation::Front, solid(100, 100, RED))
        .build();

    for _ in 0..5 {
        session.with_active_surface(|ctx| ctx.nudge(Direction::Down, false)).unwrap();
    }
    assert_eq!(session.active_context().history().len(), 3);

    let mut undone = 0;
    while session.with_active_surface(|ctx| ctx.undo()).is_some() {
        undone += 1;
    }
    assert_eq!(undone, 2);
}
