//! Canvas Capture Integration Tests

use crate::helpers::{BLACK, RED, TestSessionBuilder, solid, with_rect};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{Rgba, RgbaImage};
use printfit::constants::GUIDE_COLOR;
use printfit::session::{DecodedArtwork, EditingSession};
use printfit::types::{PrintLocation, View};

const WHITE_PIXEL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// On the first dash of the front guide's top edge, which starts at (168, 135)
const GUIDE_EDGE: (u32, u32) = (170, 135);

fn decode_capture(url: &str) -> RgbaImage {
    let payload = url
        .strip_prefix("data:image/png;base64,")
        .expect("png data url");
    let bytes = BASE64.decode(payload).expect("base64");
    image::load_from_memory(&bytes).expect("png").to_rgba8()
}

fn settled(mut session: EditingSession) -> EditingSession {
    session.set_backdrop(Some(solid(500, 500, WHITE_PIXEL)));
    session.frame_rendered();
    session
}

/// Left half red, right half black.
fn split_artwork() -> RgbaImage {
    with_rect(100, 100, BLACK, (0, 0, 50, 100), RED)
}

#[test]
fn test_capture_waits_for_backdrop_and_artwork() {
    let mut session = TestSessionBuilder::new()
        .with_artwork(PrintLocation::Front, solid(100, 100, RED))
        .build();
    assert_eq!(session.capture_canvas(), None);

    session.set_backdrop(Some(solid(500, 500, WHITE_PIXEL)));
    // Loaded, but no frame presented yet
    assert_eq!(session.capture_canvas(), None);

    session.frame_rendered();
    assert!(session.capture_ready());
    assert!(session.capture_canvas().is_some());
}

#[test]
fn test_capture_without_artwork_is_unavailable() {
    let mut session = settled(EditingSession::default());
    session.frame_rendered();
    assert!(!session.capture_ready());
    assert_eq!(session.capture_canvas(), None);
}

#[test]
fn test_capture_contains_artwork_without_guides() {
    let mut session = settled(
        TestSessionBuilder::new()
            .with_artwork(PrintLocation::Front, solid(100, 100, RED))
            .build(),
    );

    let live = session.render_canvas();
    assert_eq!(*live.get_pixel(GUIDE_EDGE.0, GUIDE_EDGE.1), Rgba(GUIDE_COLOR));

    let captured = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(captured.dimensions(), (500, 500));
    // 132px box centered on (250, 262.5)
    assert_eq!(*captured.get_pixel(250, 262), RED);
    assert_eq!(*captured.get_pixel(250, 190), WHITE_PIXEL);
    assert_eq!(*captured.get_pixel(GUIDE_EDGE.0, GUIDE_EDGE.1), WHITE_PIXEL);

    // Guides come back after the capture
    assert!(session.guides_visible());
    let live = session.render_canvas();
    assert_eq!(*live.get_pixel(GUIDE_EDGE.0, GUIDE_EDGE.1), Rgba(GUIDE_COLOR));
}

#[test]
fn test_capture_applies_flip_and_rotation() {
    let mut session = settled(
        TestSessionBuilder::new()
            .with_artwork(PrintLocation::Front, split_artwork())
            .build(),
    );
    let plain = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(*plain.get_pixel(200, 262), RED);
    assert_eq!(*plain.get_pixel(300, 262), BLACK);

    session.with_active_surface(|ctx| ctx.flip_horizontal()).unwrap();
    let flipped = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(*flipped.get_pixel(200, 262), BLACK);
    assert_eq!(*flipped.get_pixel(300, 262), RED);

    session.with_active_surface(|ctx| ctx.flip_horizontal()).unwrap();
    session.with_active_surface(|ctx| ctx.rotate(180.0)).unwrap();
    let rotated = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(*rotated.get_pixel(200, 262), BLACK);
    assert_eq!(*rotated.get_pixel(300, 262), RED);
}

#[test]
fn test_switching_to_empty_location_blocks_capture() {
    let mut session = settled(
        TestSessionBuilder::new()
            .with_artwork(PrintLocation::Front, solid(100, 100, RED))
            .build(),
    );
    assert!(session.capture_ready());

    session.set_active_location(PrintLocation::Back);
    session.frame_rendered();
    assert!(!session.capture_ready());

    session.set_active_location(PrintLocation::Front);
    assert!(!session.capture_ready());
    session.frame_rendered();
    assert!(session.capture_ready());
}

#[test]
fn test_removed_backdrop_blocks_capture() {
    let mut session = settled(
        TestSessionBuilder::new()
            .with_artwork(PrintLocation::Front, solid(100, 100, RED))
            .build(),
    );
    session.set_backdrop(None);
    session.frame_rendered();
    assert_eq!(session.capture_canvas(), None);
}

#[test]
fn test_view_swap_waits_for_new_frame() {
    let mut session = settled(
        TestSessionBuilder::new()
            .with_artwork(PrintLocation::Front, solid(100, 100, RED))
            .build(),
    );
    let token = session.active_context().token().unwrap();
    assert!(session.capture_ready());

    let vectorized = DecodedArtwork { image: solid(100, 100, BLACK), document: None };
    session
        .complete_vectorized_decode(token, PrintLocation::Front, Ok(vectorized), None)
        .unwrap();
    assert!(!session.capture_ready());
    assert_eq!(session.capture_canvas(), None);
    session.frame_rendered();
    let captured = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(*captured.get_pixel(250, 262), BLACK);

    session.toggle_view(PrintLocation::Front, View::Original).unwrap();
    assert!(!session.capture_ready());
    session.frame_rendered();
    let captured = decode_capture(&session.capture_canvas().unwrap());
    assert_eq!(*captured.get_pixel(250, 262), RED);

    // Re-selecting the displayed view changes nothing on screen
    session.toggle_view(PrintLocation::Front, View::Original).unwrap();
    assert!(session.capture_ready());
}
