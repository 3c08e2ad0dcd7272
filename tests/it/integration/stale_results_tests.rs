//! Stale Async Result Integration Tests
//!
//! Results dispatched for artwork that has since been replaced must be
//! dropped on arrival.

use crate::helpers::{BLACK, RED, png_bytes, solid, upload};
use printfit::session::{
    DecodedArtwork, EditingSession, VectorizationResult, VectorizationStatus, decode_artwork,
};
use printfit::transform::Phase;
use printfit::types::{PrintLocation, View};

const FRONT: PrintLocation = PrintLocation::Front;

#[test]
fn test_tokens_are_monotonic() {
    let mut session = EditingSession::default();
    let first = session.begin_artwork(FRONT, &upload("a.png", &solid(10, 10, RED)));
    let second = session.begin_artwork(PrintLocation::Back, &upload("b.png", &solid(10, 10, RED)));
    let third = session.begin_artwork(FRONT, &upload("c.png", &solid(10, 10, RED)));
    assert!(first < second && second < third);
    assert!(!session.is_current(FRONT, first));
    assert!(session.is_current(FRONT, third));
    assert!(session.is_current(PrintLocation::Back, second));
}

#[test]
fn test_stale_decode_is_discarded() {
    let mut session = EditingSession::default();
    let first = session.begin_artwork(FRONT, &upload("first.png", &solid(100, 100, RED)));
    let second = session.begin_artwork(FRONT, &upload("second.png", &solid(300, 100, BLACK)));

    // The first decode arrives late
    let late = decode_artwork(&png_bytes(&solid(100, 100, RED)), Some("first.png"));
    assert_eq!(session.complete_decode(first, FRONT, late).unwrap(), None);
    let ctx = session.context(FRONT);
    assert_eq!(ctx.phase(), Phase::Empty);
    assert!(ctx.transform().is_none());

    let current = decode_artwork(&png_bytes(&solid(300, 100, BLACK)), Some("second.png"));
    let t = session.complete_decode(second, FRONT, current).unwrap().unwrap();
    assert_eq!(session.context(FRONT).displayed_size().map(|s| s.width), Some(300));
    assert_eq!(session.context(FRONT).transform(), Some(t));
}

#[test]
fn test_stale_decode_error_does_not_clear_current_artwork() {
    let mut session = EditingSession::default();
    let first = session.begin_artwork(FRONT, &upload("first.png", &solid(10, 10, RED)));
    let load = session
        .load_artwork(FRONT, &upload("second.png", &solid(50, 50, RED)))
        .unwrap();
    assert!(load.transform.is_some());

    let failed = decode_artwork(b"broken", Some("first.png"));
    assert_eq!(session.complete_decode(first, FRONT, failed).unwrap(), None);
    assert!(session.context(FRONT).has_artwork());
}

#[test]
fn test_stale_vectorization_is_discarded() {
    let mut session = EditingSession::default();
    let old = session
        .load_artwork(FRONT, &upload("old.png", &solid(100, 100, RED)))
        .unwrap()
        .token;
    let current = session
        .load_artwork(FRONT, &upload("new.png", &solid(200, 100, RED)))
        .unwrap()
        .token;
    let before = session.context(FRONT).transform();

    let result = VectorizationResult {
        status: VectorizationStatus::Completed,
        vectorized_url: Some("https://cdn.example.com/old.svg".into()),
    };
    assert_eq!(session.vectorization_finished(old, FRONT, &result), None);

    let pixels = DecodedArtwork { image: solid(400, 400, RED), document: None };
    assert_eq!(
        session.complete_vectorized_decode(old, FRONT, Ok(pixels), None).unwrap(),
        None
    );

    let ctx = session.context(FRONT);
    assert_eq!(ctx.active_view(), View::Original);
    assert_eq!(ctx.transform(), before);
    assert!(ctx.image_for(View::Vectorized).is_none());
    assert!(session.vectorization_finished(current, FRONT, &result).is_some());
}

#[test]
fn test_removed_artwork_invalidates_token() {
    let mut session = EditingSession::default();
    let token = session.begin_artwork(FRONT, &upload("a.png", &solid(10, 10, RED)));
    session.remove_artwork(FRONT);
    assert!(!session.is_current(FRONT, token));

    let decoded = decode_artwork(&png_bytes(&solid(10, 10, RED)), None);
    assert_eq!(session.complete_decode(token, FRONT, decoded).unwrap(), None);
    assert!(!session.context(FRONT).has_artwork());
}

#[test]
fn test_results_for_another_location_are_ignored() {
    let mut session = EditingSession::default();
    let token = session.begin_artwork(FRONT, &upload("a.png", &solid(10, 10, RED)));
    let decoded = decode_artwork(&png_bytes(&solid(10, 10, RED)), None);
    assert_eq!(
        session.complete_decode(token, PrintLocation::Back, decoded).unwrap(),
        None
    );
    assert!(!session.context(PrintLocation::Back).has_artwork());
}
