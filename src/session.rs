//! Editing session - one placement context per print location, the artwork
//! pipeline, change listeners and canvas capture.
//!
//! ## Async results
//!
//! Decoding and vectorization finish outside the engine. Every load is
//! assigned an [`ArtworkToken`] when it starts; results are handed back with
//! the token they were dispatched under and dropped if the slot has since
//! moved on to other artwork.
//!
//! ```text
//! begin_artwork ──► decode (caller) ──► complete_decode ──► pipeline ──► initialize
//!                                                           │
//! vectorization_finished ──► fetch (caller) ──► complete_vectorized_decode ──► toggle
//! ```

use crate::analysis::{ArtworkPipeline, BoundsCache, VectorDocument, is_vector_url};
use crate::capture::{CaptureGate, PlacedArtwork, render_canvas, to_data_url};
use crate::error::{EngineError, EngineResult};
use crate::settings::EngineSettings;
use crate::transform::PlacementContext;
use crate::types::{
    ArtworkImage, ArtworkToken, ArtworkTransform, DimensionReport, PrintLocation, View,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// Artwork Sources
// ============================================================================

/// Status reported by the vectorization service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorizationStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

/// Result of one vectorization call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizationResult {
    pub status: VectorizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectorized_url: Option<String>,
}

impl VectorizationResult {
    /// URL to fetch the vectorized artwork from. Only a completed result
    /// carrying a URL yields one.
    pub fn ready_url(&self) -> Option<&str> {
        match self.status {
            VectorizationStatus::Completed => self.vectorized_url.as_deref(),
            _ => None,
        }
    }
}

/// Artwork as stored by the persistence layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRecord {
    pub id: Uuid,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectorized_url: Option<String>,
    #[serde(default)]
    pub vectorization_status: VectorizationStatus,
    #[serde(default)]
    pub is_vector: bool,
    pub file_name: String,
    pub file_size: u64,
}

impl ArtworkRecord {
    pub fn new(file_url: impl Into<String>, file_name: impl Into<String>, file_size: u64) -> Self {
        let file_url = file_url.into();
        Self {
            id: Uuid::new_v4(),
            is_vector: is_vector_url(&file_url),
            file_url,
            vectorized_url: None,
            vectorization_status: VectorizationStatus::Processing,
            file_name: file_name.into(),
            file_size,
        }
    }

    pub fn vectorization(&self) -> VectorizationResult {
        VectorizationResult {
            status: self.vectorization_status,
            vectorized_url: self.vectorized_url.clone(),
        }
    }
}

/// Where a slot's artwork comes from. Both kinds end up as the same decoded
/// bitmap; they differ only in whether bytes are local or must be fetched.
#[derive(Clone)]
pub enum ArtworkSource {
    /// Fresh in-memory file
    Upload { file_name: String, bytes: Vec<u8> },
    /// Previously saved artwork
    Persisted(ArtworkRecord),
}

impl fmt::Debug for ArtworkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload { file_name, bytes } => f
                .debug_struct("Upload")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
            Self::Persisted(record) => f.debug_tuple("Persisted").field(&record.id).finish(),
        }
    }
}

impl ArtworkSource {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Upload { file_name, .. } => file_name,
            Self::Persisted(record) => &record.file_name,
        }
    }

    /// Decode without a network fetch. `None` when the source is a remote
    /// URL the caller has to fetch first.
    pub fn decode_local(&self) -> Option<EngineResult<DecodedArtwork>> {
        match self {
            Self::Upload { file_name, bytes } => Some(decode_artwork(bytes, Some(file_name))),
            Self::Persisted(record) if record.file_url.starts_with("data:") => {
                Some(decode_data_url(&record.file_url))
            }
            Self::Persisted(_) => None,
        }
    }

    /// A persisted record that already finished vectorizing.
    pub fn vectorized_url(&self) -> Option<&str> {
        match self {
            Self::Upload { .. } => None,
            Self::Persisted(record) => match record.vectorization_status {
                VectorizationStatus::Completed => record.vectorized_url.as_deref(),
                _ => None,
            },
        }
    }
}

/// Outcome of [`EditingSession::load_artwork`].
#[derive(Clone, Debug, PartialEq)]
pub struct ArtworkLoad {
    pub token: ArtworkToken,
    /// Initial placement, once the pixels were available locally
    pub transform: Option<ArtworkTransform>,
    /// Vectorized version to fetch next, for records that already have one
    pub vectorized_url: Option<String>,
}

// ============================================================================
// Decoding
// ============================================================================

/// Decoded pixels, plus the parsed document when the source was SVG.
#[derive(Clone, Debug)]
pub struct DecodedArtwork {
    pub image: RgbaImage,
    pub document: Option<VectorDocument>,
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Decode artwork bytes. `hint` is a file name or URL; SVG is also sniffed
/// from the content.
pub fn decode_artwork(bytes: &[u8], hint: Option<&str>) -> EngineResult<DecodedArtwork> {
    let decoded = if hint.is_some_and(is_vector_url) || looks_like_svg(bytes) {
        let markup = String::from_utf8(bytes.to_vec())
            .map_err(|e| EngineError::Decode(format!("SVG is not UTF-8: {e}")))?;
        let document = VectorDocument::parse(markup).map_err(|e| EngineError::Decode(e.to_string()))?;
        let image = document.rasterize().map_err(|e| EngineError::Decode(e.to_string()))?;
        DecodedArtwork { image, document: Some(document) }
    } else {
        let image = image::load_from_memory(bytes)
            .map_err(|e| EngineError::Decode(e.to_string()))?
            .to_rgba8();
        DecodedArtwork { image, document: None }
    };

    if decoded.image.width() == 0 || decoded.image.height() == 0 {
        return Err(EngineError::Decode(format!(
            "empty image {}x{}",
            decoded.image.width(),
            decoded.image.height()
        )));
    }
    Ok(decoded)
}

/// Decode an inline `data:` URL.
pub fn decode_data_url(url: &str) -> EngineResult<DecodedArtwork> {
    if let Some(parsed) = VectorDocument::from_data_url(url) {
        let document = parsed.map_err(|e| EngineError::Decode(e.to_string()))?;
        let image = document.rasterize().map_err(|e| EngineError::Decode(e.to_string()))?;
        return Ok(DecodedArtwork { image, document: Some(document) });
    }

    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| EngineError::Decode("not a data URL".into()))?;
    if !header.ends_with(";base64") {
        return Err(EngineError::Decode(format!("unsupported data URL encoding: {header}")));
    }
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    decode_artwork(&bytes, None)
}

// ============================================================================
// Session
// ============================================================================

type Listener = Box<dyn FnMut(PrintLocation, &ArtworkTransform)>;

pub struct EditingSession {
    settings: EngineSettings,
    next_token: u64,
    contexts: HashMap<PrintLocation, PlacementContext>,
    /// Parsed SVG behind each slot's views, for full-resolution crops
    documents: HashMap<(PrintLocation, View), VectorDocument>,
    active_location: PrintLocation,
    pipeline: ArtworkPipeline,
    bounds_cache: BoundsCache,
    listeners: Vec<Listener>,

    backdrop: Option<RgbaImage>,
    gate: CaptureGate,
    guides_visible: bool,
}

impl fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingSession")
            .field("active_location", &self.active_location)
            .field("next_token", &self.next_token)
            .field("listeners", &self.listeners.len())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl EditingSession {
    pub fn new(settings: EngineSettings) -> Self {
        let contexts = PrintLocation::ALL
            .iter()
            .map(|&location| (location, PlacementContext::new(location, &settings)))
            .collect();
        Self {
            pipeline: ArtworkPipeline::new(&settings),
            gate: CaptureGate::new(settings.canvas.settle_frames),
            settings,
            next_token: 0,
            contexts,
            documents: HashMap::new(),
            active_location: PrintLocation::default(),
            bounds_cache: BoundsCache::default(),
            listeners: Vec::new(),
            backdrop: None,
            guides_visible: true,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn bounds_cache(&self) -> &BoundsCache {
        &self.bounds_cache
    }

    // ========================================================================
    // Contexts
    // ========================================================================

    pub fn context(&self, location: PrintLocation) -> &PlacementContext {
        // Every location gets a context in `new`
        &self.contexts[&location]
    }

    fn context_mut(&mut self, location: PrintLocation) -> &mut PlacementContext {
        self.contexts
            .entry(location)
            .or_insert_with(|| PlacementContext::new(location, &self.settings))
    }

    pub fn active_location(&self) -> PrintLocation {
        self.active_location
    }

    pub fn active_context(&self) -> &PlacementContext {
        self.context(self.active_location)
    }

    /// Focus another location. History and transforms of every location are
    /// kept.
    pub fn set_active_location(&mut self, location: PrintLocation) {
        if location == self.active_location {
            return;
        }
        self.active_location = location;
        if self.context(location).has_artwork() {
            self.gate.artwork_loaded();
        } else {
            self.gate.artwork_unloaded();
        }
        debug!(%location, "Active location changed");
    }

    /// Run `f` against a location's context (toolbar, keys, gestures) and
    /// deliver any committed changes to listeners.
    pub fn with_surface<R>(&mut self, location: PrintLocation, f: impl FnOnce(&mut PlacementContext) -> R) -> R {
        let result = f(self.context_mut(location));
        self.flush(location);
        result
    }

    pub fn with_active_surface<R>(&mut self, f: impl FnOnce(&mut PlacementContext) -> R) -> R {
        self.with_surface(self.active_location, f)
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a callback fired for every committed transform.
    pub fn subscribe(&mut self, listener: impl FnMut(PrintLocation, &ArtworkTransform) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn flush(&mut self, location: PrintLocation) {
        let changes = self.context_mut(location).take_changes();
        for transform in &changes {
            for listener in &mut self.listeners {
                listener(location, transform);
            }
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Start loading new artwork into a slot. Whatever was there is dropped
    /// and results still in flight for it will be discarded.
    pub fn begin_artwork(&mut self, location: PrintLocation, source: &ArtworkSource) -> ArtworkToken {
        self.next_token += 1;
        let token = ArtworkToken(self.next_token);
        self.context_mut(location).begin_artwork(token, View::Original);
        self.documents.remove(&(location, View::Original));
        self.documents.remove(&(location, View::Vectorized));
        if location == self.active_location {
            self.gate.artwork_unloaded();
        }
        info!(%location, ?token, file = source.file_name(), "Loading artwork");
        token
    }

    /// Whether `token` still identifies the artwork in `location`.
    pub fn is_current(&self, location: PrintLocation, token: ArtworkToken) -> bool {
        self.context(location).token() == Some(token)
    }

    /// Decoding finished. Runs the crop pipeline to completion and only then
    /// computes the initial placement against the final pixels.
    ///
    /// Returns `Ok(None)` for a stale token. A decode error empties the slot
    /// and is returned.
    pub fn complete_decode(
        &mut self,
        token: ArtworkToken,
        location: PrintLocation,
        decoded: EngineResult<DecodedArtwork>,
    ) -> EngineResult<Option<ArtworkTransform>> {
        if !self.is_current(location, token) {
            debug!(%location, ?token, "Discarding stale decode result");
            return Ok(None);
        }
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(%location, error = %e, "Artwork failed to decode");
                self.context_mut(location).clear();
                return Err(e);
            }
        };

        let image = ArtworkImage::new(decoded.image, View::Original);
        let prepared = self
            .pipeline
            .run(image, decoded.document.as_ref(), &mut self.bounds_cache);
        if let Some(document) = decoded.document {
            self.documents.insert((location, View::Original), document);
        }

        let ctx = self.context_mut(location);
        let transform = ctx.initialize(prepared.image);
        if let Some(bounds) = prepared.bounds {
            ctx.apply_content_bounds(View::Original, bounds, None);
        }
        if location == self.active_location {
            self.gate.artwork_loaded();
        }
        self.flush(location);
        Ok(Some(transform))
    }

    /// Decode `source` locally and place it. The returned transform is
    /// `None` when the source needs a fetch; complete it with
    /// [`Self::complete_decode`] afterwards. A persisted record that already
    /// finished vectorizing hands back its vectorized URL so the caller can
    /// fetch it and finish with [`Self::complete_vectorized_decode`].
    pub fn load_artwork(&mut self, location: PrintLocation, source: &ArtworkSource) -> EngineResult<ArtworkLoad> {
        let token = self.begin_artwork(location, source);
        let transform = match source.decode_local() {
            Some(decoded) => self.complete_decode(token, location, decoded)?,
            None => None,
        };
        let vectorized_url = source.vectorized_url().map(str::to_string);
        if let Some(url) = &vectorized_url {
            debug!(%location, url, "Persisted artwork has a vectorized version");
        }
        Ok(ArtworkLoad { token, transform, vectorized_url })
    }

    /// Empty a slot.
    pub fn remove_artwork(&mut self, location: PrintLocation) {
        self.context_mut(location).clear();
        self.documents.remove(&(location, View::Original));
        self.documents.remove(&(location, View::Vectorized));
        if location == self.active_location {
            self.gate.artwork_unloaded();
        }
    }

    // ========================================================================
    // Vectorization
    // ========================================================================

    /// The vectorization service answered. Returns the URL the caller should
    /// fetch, or `None` when the result is stale, still processing or failed.
    pub fn vectorization_finished(
        &mut self,
        token: ArtworkToken,
        location: PrintLocation,
        result: &VectorizationResult,
    ) -> Option<String> {
        if !self.is_current(location, token) {
            debug!(%location, ?token, "Discarding stale vectorization result");
            return None;
        }
        match result.ready_url() {
            Some(url) => {
                info!(%location, url, "Vectorized artwork ready");
                Some(url.to_string())
            }
            None => {
                if result.status == VectorizationStatus::Failed {
                    warn!(%location, "Vectorization failed, staying on original");
                }
                None
            }
        }
    }

    /// Vectorized pixels arrived. They go through the same pipeline as the
    /// original, then the slot swaps to the vectorized view.
    pub fn complete_vectorized_decode(
        &mut self,
        token: ArtworkToken,
        location: PrintLocation,
        decoded: EngineResult<DecodedArtwork>,
        source_url: Option<&str>,
    ) -> EngineResult<Option<ArtworkTransform>> {
        if !self.is_current(location, token) {
            debug!(%location, ?token, "Discarding stale vectorized image");
            return Ok(None);
        }
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(%location, error = %e, "Vectorized artwork failed to decode, staying on original");
                return Err(e);
            }
        };

        let document = match decoded.document {
            Some(doc) => Some(doc),
            None => match source_url.and_then(VectorDocument::from_data_url) {
                Some(Ok(doc)) => Some(doc),
                Some(Err(e)) => {
                    warn!(error = %e, "Ignoring unusable vector source URL");
                    None
                }
                None => None,
            },
        };

        let image = ArtworkImage::new(decoded.image, View::Vectorized);
        let prepared = self.pipeline.run(image, document.as_ref(), &mut self.bounds_cache);
        if let Some(document) = document {
            self.documents.insert((location, View::Vectorized), document);
        }

        let ctx = self.context_mut(location);
        let result = ctx.toggle_view(View::Vectorized, Some(prepared.image));
        if result.is_ok() {
            if let Some(bounds) = prepared.bounds {
                ctx.apply_content_bounds(View::Vectorized, bounds, None);
            }
            self.displayed_image_changed(location);
        }
        self.flush(location);
        result.map(Some)
    }

    /// Swap the displayed view of a slot.
    pub fn toggle_view(&mut self, location: PrintLocation, target: View) -> EngineResult<ArtworkTransform> {
        let before = self.context(location).active_view();
        let result = self.context_mut(location).toggle_view(target, None);
        if result.is_ok() && before != target {
            self.displayed_image_changed(location);
        }
        self.flush(location);
        result
    }

    /// New pixels are on screen for `location`; capture waits for them to
    /// settle again.
    fn displayed_image_changed(&mut self, location: PrintLocation) {
        if location == self.active_location {
            self.gate.artwork_loaded();
        }
    }

    pub fn vector_document(&self, location: PrintLocation, view: View) -> Option<&VectorDocument> {
        self.documents.get(&(location, view))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn dimensions(&self, location: PrintLocation) -> Option<DimensionReport> {
        self.context(location).dimensions()
    }

    pub fn active_dimensions(&self) -> Option<DimensionReport> {
        self.dimensions(self.active_location)
    }

    // ========================================================================
    // Canvas
    // ========================================================================

    /// Garment backdrop for the canvas. Purely decorative.
    pub fn set_backdrop(&mut self, backdrop: Option<RgbaImage>) {
        match backdrop {
            Some(_) => self.gate.backdrop_loaded(),
            None => self.gate.backdrop_unloaded(),
        }
        self.backdrop = backdrop;
    }

    /// An animation frame was presented.
    pub fn frame_rendered(&mut self) {
        self.gate.frame_rendered();
    }

    pub fn capture_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn guides_visible(&self) -> bool {
        self.guides_visible
    }

    pub fn set_guides_visible(&mut self, visible: bool) {
        self.guides_visible = visible;
    }

    /// Current canvas, guides included if visible.
    pub fn render_canvas(&self) -> RgbaImage {
        let ctx = self.active_context();
        let artwork = match (ctx.image(), ctx.transform()) {
            (Some(image), Some(transform)) => Some(PlacedArtwork {
                pixels: &image.pixels,
                transform,
                flip: ctx.flip(),
            }),
            _ => None,
        };
        let guide = self.guides_visible.then(|| ctx.print_area());
        render_canvas(
            self.settings.canvas.width,
            self.settings.canvas.height,
            self.backdrop.as_ref(),
            artwork,
            guide,
        )
    }

    /// Snapshot of the printable canvas as a PNG data URL. `None` until both
    /// the backdrop and the artwork have settled on screen.
    pub fn capture_canvas(&mut self) -> Option<String> {
        if !self.gate.is_ready() {
            debug!(gate = ?self.gate, "Capture requested before canvas settled");
            return None;
        }
        let restore = self.guides_visible;
        self.guides_visible = false;
        let canvas = self.render_canvas();
        self.guides_visible = restore;

        match to_data_url(&canvas) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Canvas capture failed");
                None
            }
        }
    }
}
