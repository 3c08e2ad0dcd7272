//! Full-resolution vector rendering.
//!
//! SVG artwork is often decoded at its declared `width`/`height`, which can
//! be far below the native `viewBox`. Bounds measured on that proxy are
//! coarse, so before cropping we re-render the document at a resolution
//! matching its viewBox (capped) by scaling the parsed tree onto a larger
//! pixmap.

use crate::error::{AnalysisError, AnalysisResult};
use crate::profile_scope;
use crate::settings::VectorSettings;
use crate::types::ImageSize;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::RgbaImage;
use resvg::tiny_skia::{ColorU8, IntSize, Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use roxmltree::{Document, ParsingOptions};
use tracing::debug;

const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml";

/// Declared viewBox size of a vector document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBoxSize {
    pub width: f64,
    pub height: f64,
}

/// A vector artwork with its parsed root dimensions.
#[derive(Clone, Debug)]
pub struct VectorDocument {
    markup: String,
    view_box: ViewBoxSize,
}

/// A full-resolution render and the scale it was produced at.
#[derive(Clone, Debug)]
pub struct VectorRender {
    pub image: RgbaImage,
    pub scale: f64,
}

impl VectorDocument {
    pub fn parse(markup: impl Into<String>) -> AnalysisResult<Self> {
        let markup = markup.into();
        let view_box = root_view_box(&markup)?;
        Ok(Self { markup, view_box })
    }

    /// Decode a `data:image/svg+xml` URL (percent-encoded or base64).
    /// Returns `None` for any other URL.
    pub fn from_data_url(url: &str) -> Option<AnalysisResult<Self>> {
        let rest = url.strip_prefix(SVG_DATA_URL_PREFIX)?;
        let (meta, payload) = rest.split_once(',')?;
        let markup = if meta.split(';').any(|part| part == "base64") {
            match BASE64.decode(payload.trim()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => return Some(Err(AnalysisError::InvalidVector(e.to_string()))),
            }
        } else {
            match urlencoding::decode(payload) {
                Ok(text) => text.into_owned(),
                Err(e) => return Some(Err(AnalysisError::InvalidVector(e.to_string()))),
            }
        };
        Some(Self::parse(markup))
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn view_box(&self) -> ViewBoxSize {
        self.view_box
    }

    /// True when `decoded` is clearly a low-resolution stand-in for this
    /// document: the viewBox exceeds it by more than `factor` on either axis.
    pub fn is_low_fidelity_proxy(&self, decoded: ImageSize, factor: f64) -> bool {
        self.view_box.width > f64::from(decoded.width) * factor
            || self.view_box.height > f64::from(decoded.height) * factor
    }

    /// Render scale for a longest side of at most `max_dimension`, never upscaling.
    pub fn render_scale(&self, max_dimension: u32) -> f64 {
        let longest = self.view_box.width.max(self.view_box.height);
        (f64::from(max_dimension) / longest).min(1.0)
    }

    /// Rasterize at the document's declared size, the way a browser would
    /// decode it for display.
    pub fn rasterize(&self) -> AnalysisResult<RgbaImage> {
        let tree = self.tree()?;
        let size = tree.size();
        render_tree(&tree, size.width().ceil() as u32, size.height().ceil() as u32)
    }

    /// Re-render at `min(1, max_dimension / longest viewBox side)` of the viewBox.
    pub fn render_full_resolution(&self, max_dimension: u32) -> AnalysisResult<VectorRender> {
        profile_scope!("render_full_resolution");

        let scale = self.render_scale(max_dimension);
        let width = ((self.view_box.width * scale).round() as u32).max(1);
        let height = ((self.view_box.height * scale).round() as u32).max(1);
        debug!(width, height, scale, "Re-rendering vector at full resolution");

        let image = render_tree(&self.tree()?, width, height)?;
        Ok(VectorRender { image, scale })
    }

    fn tree(&self) -> AnalysisResult<Tree> {
        Ok(Tree::from_str(&self.markup, &Options::default())?)
    }
}

/// Re-render `url`'s document when the decoded bitmap is a low-fidelity
/// proxy for it. `None` when the URL is not an inline SVG or no re-render is
/// needed.
pub fn full_resolution_for(
    url: &str,
    decoded: ImageSize,
    settings: &VectorSettings,
) -> Option<AnalysisResult<VectorRender>> {
    let document = match VectorDocument::from_data_url(url)? {
        Ok(doc) => doc,
        Err(e) => return Some(Err(e)),
    };
    if !document.is_low_fidelity_proxy(decoded, settings.proxy_factor) {
        return None;
    }
    Some(document.render_full_resolution(settings.max_render_dimension))
}

/// True if `url` points at SVG content.
pub fn is_vector_url(url: &str) -> bool {
    if url.starts_with(SVG_DATA_URL_PREFIX) {
        return true;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".svg")
}

/// Render `tree` stretched so its whole declared size fills `width`x`height`.
fn render_tree(tree: &Tree, width: u32, height: u32) -> AnalysisResult<RgbaImage> {
    let mut pixmap =
        Pixmap::new(width, height).ok_or(AnalysisError::RenderTarget { width, height })?;
    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba(&pixmap))
}

/// tiny-skia stores premultiplied alpha; the image crate expects straight alpha.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut pixels = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixels)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

/// Premultiply straight-alpha pixels into a pixmap. `None` for an empty image.
pub fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let c = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

/// Size of the `<svg>` root's viewBox, falling back to its width/height.
fn root_view_box(markup: &str) -> AnalysisResult<ViewBoxSize> {
    // Exported SVGs commonly carry a DOCTYPE
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(markup, options)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(AnalysisError::InvalidVector(format!(
            "expected <svg> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    root.attribute("viewBox")
        .and_then(parse_view_box)
        .or_else(|| {
            let width = root.attribute("width").and_then(parse_length)?;
            let height = root.attribute("height").and_then(parse_length)?;
            Some(ViewBoxSize { width, height })
        })
        .ok_or_else(|| AnalysisError::InvalidVector("no viewBox or width/height".into()))
}

fn parse_view_box(value: &str) -> Option<ViewBoxSize> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some(ViewBoxSize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

/// Parse an absolute length (`120`, `120px`). Relative units are rejected.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.parse::<f64>().ok().filter(|v| *v > 0.0)
}
