//! Image cropping.
//!
//! Produces a new image limited to detected content bounds. The output size
//! equals the (possibly rescaled) bounds exactly and becomes the artwork's
//! native size: scale 1 means the cropped size from here on.

use super::vector::{VectorDocument, VectorRender};
use crate::error::{AnalysisError, AnalysisResult};
use crate::profile_scope;
use crate::settings::VectorSettings;
use crate::types::{ArtworkImage, ContentBounds, ImageSize};
use image::{RgbaImage, imageops};
use tracing::{debug, warn};

/// Crop `source` to `bounds`.
///
/// When `source_url` is an inline SVG whose viewBox exceeds the decoded
/// bitmap by the proxy factor, the crop is taken from a full-resolution
/// re-render instead, with `bounds` rescaled to match.
pub fn crop(
    source: &ArtworkImage,
    bounds: ContentBounds,
    source_url: Option<&str>,
    settings: &VectorSettings,
) -> AnalysisResult<ArtworkImage> {
    let document = match source_url.and_then(VectorDocument::from_data_url) {
        Some(Ok(doc)) => Some(doc),
        Some(Err(e)) => {
            warn!(error = %e, "Source URL is not a usable vector document, cropping bitmap");
            None
        }
        None => None,
    };
    crop_with_document(source, bounds, document.as_ref(), settings)
}

/// Crop `source` to `bounds`, re-rendering `document` first when the decoded
/// bitmap is only a low-fidelity proxy for it.
pub fn crop_with_document(
    source: &ArtworkImage,
    bounds: ContentBounds,
    document: Option<&VectorDocument>,
    settings: &VectorSettings,
) -> AnalysisResult<ArtworkImage> {
    profile_scope!("crop_artwork");

    let decoded = source.size();
    if let Some(doc) = document.filter(|d| d.is_low_fidelity_proxy(decoded, settings.proxy_factor)) {
        let render = doc.render_full_resolution(settings.max_render_dimension)?;
        let scaled = rescale_bounds(bounds, decoded, &render);
        debug!(?bounds, ?scaled, scale = render.scale, "Cropping full-resolution render");
        let pixels = crop_pixels(&render.image, scaled)?;
        return Ok(cropped_image(pixels, source));
    }

    let pixels = crop_pixels(&source.pixels, bounds)?;
    Ok(cropped_image(pixels, source))
}

/// Copy the `bounds` sub-rectangle of `image` into a new buffer.
pub fn crop_pixels(image: &RgbaImage, bounds: ContentBounds) -> AnalysisResult<RgbaImage> {
    let size = ImageSize::new(image.width(), image.height());
    if bounds.width == 0 || bounds.height == 0 || !bounds.fits_within(size) {
        return Err(AnalysisError::BoundsOutsideImage {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            image_width: size.width,
            image_height: size.height,
        });
    }
    Ok(imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
}

/// Map bounds measured on the decoded proxy onto the high-resolution render.
fn rescale_bounds(bounds: ContentBounds, decoded: ImageSize, render: &VectorRender) -> ContentBounds {
    let ratio_x = f64::from(render.image.width()) / f64::from(decoded.width.max(1));
    let ratio_y = f64::from(render.image.height()) / f64::from(decoded.height.max(1));

    let x = (f64::from(bounds.x) * ratio_x).floor() as u32;
    let y = (f64::from(bounds.y) * ratio_y).floor() as u32;
    let right = ((f64::from(bounds.x + bounds.width) * ratio_x).ceil() as u32).min(render.image.width());
    let bottom = ((f64::from(bounds.y + bounds.height) * ratio_y).ceil() as u32).min(render.image.height());
    let x = x.min(right.saturating_sub(1));
    let y = y.min(bottom.saturating_sub(1));

    ContentBounds::new(x, y, right - x, bottom - y)
}

fn cropped_image(pixels: RgbaImage, source: &ArtworkImage) -> ArtworkImage {
    let mut image = ArtworkImage::new(pixels, source.provenance);
    image.cropped = true;
    image
}
