//! Canvas capture.
//!
//! A snapshot of the placement canvas (garment backdrop plus placed artwork)
//! encoded as a PNG data URL. Capture is only offered once both the backdrop
//! and the artwork have rendered at least one frame past their load, so a
//! blank or stale frame is never returned.

use crate::analysis::{pixmap_to_rgba, rgba_to_pixmap};
use crate::constants::{GUIDE_COLOR, GUIDE_DASH};
use crate::error::AnalysisResult;
use crate::profile_scope;
use crate::transform::geometry::placement_affine;
use crate::types::{ArtworkTransform, Flip, ImageSize, Rect};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{
    self, Color, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};
use std::io::Cursor;

/// Load progress of one image on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Pending,
    /// Loaded; `frames` rendered since the load event
    Loaded { frames: u32 },
}

impl LoadState {
    fn frames(&self) -> Option<u32> {
        match self {
            LoadState::Pending => None,
            LoadState::Loaded { frames } => Some(*frames),
        }
    }
}

/// Tracks whether the canvas is safe to capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureGate {
    backdrop: LoadState,
    artwork: LoadState,
    settle_frames: u32,
}

impl CaptureGate {
    pub fn new(settle_frames: u32) -> Self {
        Self {
            backdrop: LoadState::Pending,
            artwork: LoadState::Pending,
            settle_frames,
        }
    }

    pub fn backdrop_loaded(&mut self) {
        self.backdrop = LoadState::Loaded { frames: 0 };
    }

    pub fn artwork_loaded(&mut self) {
        self.artwork = LoadState::Loaded { frames: 0 };
    }

    pub fn backdrop_unloaded(&mut self) {
        self.backdrop = LoadState::Pending;
    }

    pub fn artwork_unloaded(&mut self) {
        self.artwork = LoadState::Pending;
    }

    /// An animation frame was rendered.
    pub fn frame_rendered(&mut self) {
        for state in [&mut self.backdrop, &mut self.artwork] {
            if let LoadState::Loaded { frames } = state {
                *frames = frames.saturating_add(1);
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        let settled = |state: LoadState| state.frames().is_some_and(|f| f >= self.settle_frames);
        settled(self.backdrop) && settled(self.artwork)
    }

    pub fn backdrop(&self) -> LoadState {
        self.backdrop
    }

    pub fn artwork(&self) -> LoadState {
        self.artwork
    }
}

/// Artwork as it is drawn on the canvas.
#[derive(Clone, Copy, Debug)]
pub struct PlacedArtwork<'a> {
    pub pixels: &'a RgbaImage,
    pub transform: ArtworkTransform,
    pub flip: Flip,
}

/// Composite the canvas: white, then the backdrop stretched to the canvas,
/// then the artwork, then (if given) the print-area guide.
pub fn render_canvas(
    width: u32,
    height: u32,
    backdrop: Option<&RgbaImage>,
    artwork: Option<PlacedArtwork<'_>>,
    guide: Option<Rect>,
) -> RgbaImage {
    profile_scope!("render_canvas");

    let Some(mut canvas) = Pixmap::new(width, height) else {
        return RgbaImage::new(width, height);
    };
    canvas.fill(Color::WHITE);
    if let Some(backdrop) = backdrop.and_then(rgba_to_pixmap) {
        let stretch = Transform::from_scale(
            width as f32 / backdrop.width() as f32,
            height as f32 / backdrop.height() as f32,
        );
        let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
        canvas.draw_pixmap(0, 0, backdrop.as_ref(), &paint, stretch, None);
    }
    if let Some(artwork) = artwork {
        draw_artwork(&mut canvas, &artwork);
    }
    if let Some(rect) = guide {
        draw_guide(&mut canvas, rect);
    }
    pixmap_to_rgba(&canvas)
}

/// Encode as `data:image/png;base64,...`.
pub fn to_data_url(image: &RgbaImage) -> AnalysisResult<String> {
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(image.clone()).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

fn draw_artwork(canvas: &mut Pixmap, artwork: &PlacedArtwork<'_>) {
    let Some(pixmap) = rgba_to_pixmap(artwork.pixels) else {
        return;
    };
    let size = ImageSize::new(pixmap.width(), pixmap.height());
    let [a, b, c, d, e, f] = placement_affine(&artwork.transform, size, artwork.flip).as_coeffs();
    let transform = Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32);
    let paint = PixmapPaint { quality: FilterQuality::Nearest, ..PixmapPaint::default() };
    canvas.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
}

/// Dashed 1px outline of the print area, snapped to whole pixels.
fn draw_guide(canvas: &mut Pixmap, rect: Rect) {
    let left = rect.x.round() as f32 + 0.5;
    let top = rect.y.round() as f32 + 0.5;
    let right = (rect.x + rect.width).round() as f32 - 0.5;
    let bottom = (rect.y + rect.height).round() as f32 - 0.5;
    let Some(outline) = tiny_skia::Rect::from_ltrb(left, top, right, bottom).map(PathBuilder::from_rect) else {
        return;
    };

    let [r, g, b, a] = GUIDE_COLOR;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;
    let dash = GUIDE_DASH as f32;
    let stroke = Stroke {
        width: 1.0,
        dash: StrokeDash::new(vec![dash, dash], 0.0),
        ..Stroke::default()
    };
    canvas.stroke_path(&outline, &paint, &stroke, Transform::identity(), None);
}
