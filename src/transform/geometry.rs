//! Placement geometry.
//!
//! Pure functions over print areas, image sizes and transforms. Scale is
//! always uniform; flips only change the sign of the rendered size.

use crate::settings::PlacementSettings;
use crate::types::{
    ArtworkTransform, DimensionReport, Flip, ImageSize, MaxPrintDimensions, PixelsPerInch,
    PrintArea, Rect,
};
use kurbo::{Affine, Vec2};

/// Largest uniform scale at which `size` fits `area`, optionally capped.
pub fn contain_scale(area: &PrintArea, size: ImageSize, cap: Option<f64>) -> f64 {
    let sx = area.width / f64::from(size.width.max(1));
    let sy = area.height / f64::from(size.height.max(1));
    let scale = sx.min(sy);
    match cap {
        Some(cap) => scale.min(cap),
        None => scale,
    }
}

/// Top-left that centers an image of `size` at `scale` in `area`.
pub fn centered_position(area: &PrintArea, size: ImageSize, scale: f64) -> (f64, f64) {
    let w = f64::from(size.width) * scale;
    let h = f64::from(size.height) * scale;
    (area.x + (area.width - w) / 2.0, area.y + (area.height - h) / 2.0)
}

/// Initial placement: `min(area/size, cap) × fit_ratio`, centered.
pub fn default_placement(
    area: &PrintArea,
    size: ImageSize,
    policy: &PlacementSettings,
    rotation: f64,
) -> ArtworkTransform {
    let scale = contain_scale(area, size, Some(policy.max_initial_scale)) * policy.fit_ratio;
    let (x, y) = centered_position(area, size, scale);
    ArtworkTransform::new(x, y, scale, rotation)
}

/// Fill the print area edge to edge (no upscale cap), centered.
pub fn fit_to_area(area: &PrintArea, size: ImageSize, rotation: f64) -> ArtworkTransform {
    let scale = contain_scale(area, size, None);
    let (x, y) = centered_position(area, size, scale);
    ArtworkTransform::new(x, y, scale, rotation)
}

/// Move `transform` so its box is centered in `area`, keeping scale and rotation.
pub fn center_in_area(area: &PrintArea, size: ImageSize, transform: &ArtworkTransform) -> ArtworkTransform {
    let (x, y) = centered_position(area, size, transform.scale);
    ArtworkTransform { x, y, ..*transform }
}

/// Re-place artwork whose pixels were just cropped so its visual center
/// stays put, rescaled to the initial-placement policy for the new size.
pub fn recenter_for_new_crop(
    old: &ArtworkTransform,
    old_size: ImageSize,
    new_size: ImageSize,
    area: &PrintArea,
    policy: &PlacementSettings,
) -> ArtworkTransform {
    let (cx, cy) = old.visual_center(old_size);
    let scale = contain_scale(area, new_size, Some(policy.max_initial_scale)) * policy.fit_ratio;
    let x = cx - f64::from(new_size.width) * scale / 2.0;
    let y = cy - f64::from(new_size.height) * scale / 2.0;
    ArtworkTransform::new(x, y, scale, old.rotation)
}

/// The unrotated on-canvas box.
pub fn artwork_box(transform: &ArtworkTransform, size: ImageSize) -> Rect {
    let (w, h) = transform.box_size(size);
    Rect::new(transform.x, transform.y, w, h)
}

/// Physical width/height in inches.
pub fn physical_size(
    size: ImageSize,
    transform: &ArtworkTransform,
    flip: Flip,
    ppi: PixelsPerInch,
) -> (f64, f64) {
    let width = f64::from(size.width) * transform.scale * flip.x().abs() / ppi.x;
    let height = f64::from(size.height) * transform.scale * flip.y().abs() / ppi.y;
    (width, height)
}

pub fn dimension_report(
    size: ImageSize,
    transform: &ArtworkTransform,
    flip: Flip,
    ppi: PixelsPerInch,
    max: MaxPrintDimensions,
) -> DimensionReport {
    let (width_inches, height_inches) = physical_size(size, transform, flip, ppi);
    DimensionReport {
        width_inches,
        height_inches,
        oversize: width_inches > max.width || height_inches > max.height,
    }
}

/// Rotation about the origin (canvas y points down, so positive is clockwise on screen).
pub fn rotation(degrees: f64) -> Affine {
    Affine::rotate(degrees.to_radians())
}

pub fn rotate_vector(v: Vec2, degrees: f64) -> Vec2 {
    (rotation(degrees) * v.to_point()).to_vec2()
}

/// Maps artwork pixel coordinates onto the canvas: the image is scaled
/// (mirrored per `flip`) about its own center, rotated, then moved to the
/// visual center of the transform.
pub fn placement_affine(transform: &ArtworkTransform, size: ImageSize, flip: Flip) -> Affine {
    let center = Vec2::from(transform.visual_center(size));
    let mirror = |flipped: bool| if flipped { -transform.scale } else { transform.scale };
    let half = Vec2::new(f64::from(size.width), f64::from(size.height)) / 2.0;

    Affine::translate(center)
        * rotation(transform.rotation)
        * Affine::scale_non_uniform(mirror(flip.horizontal), mirror(flip.vertical))
        * Affine::translate(-half)
}
