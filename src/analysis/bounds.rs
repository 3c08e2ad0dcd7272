//! Content bounds detection.
//!
//! Finds the tight rectangle of visible pixels in an artwork: anything that
//! is neither near-transparent nor near-white once composited over white.
//! The scan runs on a downscaled working copy so its cost does not grow
//! with the upload's resolution, then the rectangle is mapped back to
//! source pixels (floor on the near edge, ceil on the far edge so content is
//! never clipped).

use crate::error::{AnalysisError, AnalysisResult};
use crate::profile_scope;
use crate::settings::BoundsSettings;
use crate::types::{ContentBounds, ImageSize};
use image::{Rgba, RgbaImage, imageops};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Detects [`ContentBounds`] with a fixed background policy.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsDetector {
    pub max_working_dimension: u32,
    pub padding_ratio: f64,
    pub alpha_threshold: u8,
    pub white_threshold: u8,
}

impl Default for BoundsDetector {
    fn default() -> Self {
        Self::from(&BoundsSettings::default())
    }
}

impl From<&BoundsSettings> for BoundsDetector {
    fn from(settings: &BoundsSettings) -> Self {
        Self {
            max_working_dimension: settings.max_working_dimension.max(1),
            padding_ratio: settings.padding_ratio,
            alpha_threshold: settings.alpha_threshold,
            white_threshold: settings.white_threshold,
        }
    }
}

/// Inclusive pixel extent found by the scan, in working-canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Extent {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl BoundsDetector {
    /// Detect the content rectangle of `image`.
    ///
    /// Returns `Ok(None)` when no pixel qualifies as content (fully blank or
    /// fully transparent). A full-bleed design yields the full image.
    pub fn detect(&self, image: &RgbaImage) -> AnalysisResult<Option<ContentBounds>> {
        profile_scope!("detect_content_bounds");

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::EmptyImage { width, height });
        }

        let working = self.working_canvas(image);
        let (working_w, working_h) = working.dimensions();
        let scale_x = f64::from(working_w) / f64::from(width);
        let scale_y = f64::from(working_h) / f64::from(height);

        let Some(extent) = self.scan(&working) else {
            debug!(width, height, "No content pixels found");
            return Ok(None);
        };
        trace!(?extent, working_w, working_h, "Raw content extent");

        let padded = self.pad(extent, working_w, working_h);

        let x = (f64::from(padded.min_x) / scale_x).floor() as u32;
        let y = (f64::from(padded.min_y) / scale_y).floor() as u32;
        let right = ((f64::from(padded.max_x + 1) / scale_x).ceil() as u32).min(width);
        let bottom = ((f64::from(padded.max_y + 1) / scale_y).ceil() as u32).min(height);
        let x = x.min(right.saturating_sub(1));
        let y = y.min(bottom.saturating_sub(1));

        let bounds = ContentBounds::new(x, y, right - x, bottom - y);
        debug!(?bounds, width, height, "Detected content bounds");
        Ok(Some(bounds))
    }

    /// Downscale (aspect preserved) so the longest side is at most
    /// `max_working_dimension`. Small images are scanned as-is.
    fn working_canvas<'a>(&self, image: &'a RgbaImage) -> Cow<'a, RgbaImage> {
        let (width, height) = image.dimensions();
        let longest = width.max(height);
        if longest <= self.max_working_dimension {
            return Cow::Borrowed(image);
        }
        let factor = f64::from(self.max_working_dimension) / f64::from(longest);
        let working_w = ((f64::from(width) * factor).round() as u32).max(1);
        let working_h = ((f64::from(height) * factor).round() as u32).max(1);
        Cow::Owned(imageops::thumbnail(image, working_w, working_h))
    }

    /// True when the pixel reads as background once composited over white.
    fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        if a < self.alpha_threshold {
            return true;
        }
        let over_white = |c: u8| -> u8 {
            let alpha = u32::from(a);
            ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        let threshold = self.white_threshold;
        over_white(r) > threshold && over_white(g) > threshold && over_white(b) > threshold
    }

    fn scan(&self, working: &RgbaImage) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        for (x, y, pixel) in working.enumerate_pixels() {
            if self.is_background(pixel) {
                continue;
            }
            extent = Some(match extent {
                None => Extent { min_x: x, min_y: y, max_x: x, max_y: y },
                Some(e) => Extent {
                    min_x: e.min_x.min(x),
                    min_y: e.min_y.min(y),
                    max_x: e.max_x.max(x),
                    max_y: e.max_y.max(y),
                },
            });
        }
        extent
    }

    /// Grow the extent by `padding_ratio` of its own size, half on each side,
    /// clamped to the working canvas.
    fn pad(&self, extent: Extent, working_w: u32, working_h: u32) -> Extent {
        let content_w = extent.max_x - extent.min_x + 1;
        let content_h = extent.max_y - extent.min_y + 1;
        let pad_x = (f64::from(content_w) * self.padding_ratio / 2.0).ceil() as u32;
        let pad_y = (f64::from(content_h) * self.padding_ratio / 2.0).ceil() as u32;
        Extent {
            min_x: extent.min_x.saturating_sub(pad_x),
            min_y: extent.min_y.saturating_sub(pad_y),
            max_x: (extent.max_x + pad_x).min(working_w - 1),
            max_y: (extent.max_y + pad_y).min(working_h - 1),
        }
    }
}

/// Detect bounds with the default policy.
pub fn detect_content_bounds(image: &RgbaImage) -> AnalysisResult<Option<ContentBounds>> {
    BoundsDetector::default().detect(image)
}

/// A crop is worth applying only when it removes a meaningful margin.
pub fn is_significant_crop(bounds: &ContentBounds, original: ImageSize, ratio: f64) -> bool {
    if original.is_empty() {
        return false;
    }
    (bounds.area() as f64) < (original.area() as f64) * ratio
}
