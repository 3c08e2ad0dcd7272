//! Placement Workflow Integration Tests
//!
//! Upload -> decode -> crop -> initial placement -> edits, through the session.

use crate::helpers::{RED, TestSessionBuilder, assert_close, solid, transparent_with_square, upload};
use printfit::error::EngineError;
use printfit::session::{ArtworkSource, EditingSession};
use printfit::transform::Phase;
use printfit::types::{ArtworkTransform, ContentBounds, PrintLocation};
use std::cell::RefCell;
use std::rc::Rc;

type Events = Rc<RefCell<Vec<(PrintLocation, ArtworkTransform)>>>;

fn record_events(session: &mut EditingSession) -> Events {
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    session.subscribe(move |location, transform| sink.borrow_mut().push((location, *transform)));
    events
}

#[test]
fn test_tall_upload_on_front() {
    let mut session = EditingSession::default();
    let events = record_events(&mut session);

    let t = session
        .load_artwork(PrintLocation::Front, &upload("tall.png", &solid(1000, 2000, RED)))
        .unwrap()
        .transform
        .unwrap();

    assert_close(t.scale, 0.102);
    assert_close(t.x, 199.0);
    assert_close(t.y, 160.5);
    assert_eq!(t.rotation, 0.0);
    assert_eq!(events.borrow().as_slice(), &[(PrintLocation::Front, t)]);

    let ctx = session.context(PrintLocation::Front);
    assert_eq!(ctx.phase(), Phase::Loaded);
    // Full-bleed: bounds cover the image, no crop
    assert_eq!(ctx.content_bounds(), Some(ContentBounds::new(0, 0, 1000, 2000)));
    assert_eq!(ctx.displayed_size().map(|s| s.height), Some(2000));
}

#[test]
fn test_margins_are_cropped_before_placement() {
    let mut session = EditingSession::default();
    let t = session
        .load_artwork(
            PrintLocation::Front,
            &upload("square.png", &transparent_with_square(2000, 2000, 400)),
        )
        .unwrap()
        .transform
        .unwrap();

    let ctx = session.context(PrintLocation::Front);
    let size = ctx.displayed_size().unwrap();
    assert_eq!((size.width, size.height), (408, 408));
    assert!(ctx.image().unwrap().cropped);
    assert_eq!(ctx.content_bounds(), Some(ContentBounds::new(796, 796, 408, 408)));

    // Scale is computed against the cropped size
    assert_close(t.scale, 165.0 / 408.0 * 0.8);
    let (cx, cy) = t.visual_center(size);
    assert_close(cx, 250.0);
    assert_close(cy, 262.5);
}

#[test]
fn test_decode_failure_empties_the_slot() {
    let mut session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::Back, solid(100, 100, RED))
        .build();
    let events = record_events(&mut session);

    let broken = ArtworkSource::Upload {
        file_name: "broken.png".into(),
        bytes: b"not an image".to_vec(),
    };
    let err = session.load_artwork(PrintLocation::Back, &broken).unwrap_err();
    assert!(matches!(err, EngineError::Decode(_)));

    let ctx = session.context(PrintLocation::Back);
    assert!(!ctx.has_artwork());
    assert_eq!(ctx.phase(), Phase::Empty);
    assert_eq!(ctx.token(), None);
    assert!(events.borrow().is_empty());
    assert_eq!(session.dimensions(PrintLocation::Back), None);
}

#[test]
fn test_surface_edits_notify_listeners() {
    let mut session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::Front, solid(100, 100, RED))
        .build();
    let events = record_events(&mut session);

    let rotated = session
        .with_surface(PrintLocation::Front, |ctx| ctx.rotate(90.0))
        .unwrap();
    session.with_active_surface(|ctx| ctx.flip_horizontal()).unwrap();
    let centered = session.with_active_surface(|ctx| ctx.center()).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], (PrintLocation::Front, rotated));
    assert_eq!(events[1], (PrintLocation::Front, centered));
    assert_eq!(session.context(PrintLocation::Front).phase(), Phase::Edited);
}

#[test]
fn test_locations_are_independent() {
    let mut session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::Front, solid(100, 100, RED))
        .with_artwork(PrintLocation::FullBack, solid(300, 100, RED))
        .build();

    session
        .with_surface(PrintLocation::Front, |ctx| ctx.rotate(90.0))
        .unwrap();
    session.set_active_location(PrintLocation::FullBack);
    session.with_active_surface(|ctx| ctx.rotate(-90.0)).unwrap();
    session.set_active_location(PrintLocation::Front);

    let front = session.context(PrintLocation::Front);
    let back = session.context(PrintLocation::FullBack);
    assert_eq!(front.transform().unwrap().rotation, 90.0);
    assert_eq!(back.transform().unwrap().rotation, 270.0);
    assert_eq!(front.history().len(), 2);
    assert_eq!(back.history().len(), 2);

    // Undo on one location leaves the other alone
    session.with_active_surface(|ctx| ctx.undo());
    assert_eq!(session.context(PrintLocation::Front).transform().unwrap().rotation, 0.0);
    assert_eq!(session.context(PrintLocation::FullBack).transform().unwrap().rotation, 270.0);
}

#[test]
fn test_dimension_report_and_oversize_warning() {
    let mut session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::RightChest, solid(60, 30, RED))
        .active(PrintLocation::RightChest)
        .build();

    let report = session.active_dimensions().unwrap();
    // 60px * 0.8 / 15ppi
    assert_close(report.width_inches, 3.2);
    assert_close(report.height_inches, 1.6);
    assert!(!report.oversize);

    // Oversize is only a warning: the edit still goes through
    session.with_active_surface(|ctx| ctx.fit_to_print_area()).unwrap();
    session
        .with_active_surface(|ctx| {
            let t = ctx.transform().unwrap();
            ctx.set_transform(ArtworkTransform { scale: t.scale * 1.5, ..t })
        })
        .unwrap();
    let report = session.active_dimensions().unwrap();
    assert!(report.oversize);
    assert_close(report.width_inches, 6.0);
}

#[test]
fn test_identical_artwork_is_scanned_once() {
    let image = transparent_with_square(400, 400, 100);
    let session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::Front, image.clone())
        .with_artwork(PrintLocation::Back, image)
        .build();
    assert_eq!(session.bounds_cache().len(), 1);
    assert_eq!(
        session.context(PrintLocation::Front).displayed_size(),
        session.context(PrintLocation::Back).displayed_size()
    );
}
