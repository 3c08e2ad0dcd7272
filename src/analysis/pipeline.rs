//! Artwork preparation pipeline: detect bounds, re-render vectors at full
//! resolution when needed, crop.
//!
//! Nothing in here fails outward. Any analysis error is logged and the
//! unmodified image is used, so placement is never blocked by image analysis.

use super::bounds::{BoundsDetector, is_significant_crop};
use super::crop::crop_with_document;
use super::vector::VectorDocument;
use crate::settings::{EngineSettings, VectorSettings};
use crate::types::{ArtworkImage, ContentBounds};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// SHA-256 of an image's dimensions and pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(image: &ArtworkImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.pixels.as_raw());
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Content bounds keyed by pixel fingerprint, so identical artwork is
/// scanned once no matter how many slots it is placed in.
#[derive(Debug, Default)]
pub struct BoundsCache {
    entries: HashMap<Fingerprint, Option<ContentBounds>>,
}

impl BoundsCache {
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Option<ContentBounds>> {
        self.entries.get(fingerprint).copied()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, bounds: Option<ContentBounds>) {
        self.entries.insert(fingerprint, bounds);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of the pipeline: the image to place and the bounds found on the
/// uncropped input.
#[derive(Clone, Debug)]
pub struct PreparedArtwork {
    pub image: ArtworkImage,
    pub bounds: Option<ContentBounds>,
}

#[derive(Clone, Debug)]
pub struct ArtworkPipeline {
    detector: BoundsDetector,
    vector: VectorSettings,
    significant_crop_ratio: f64,
}

impl Default for ArtworkPipeline {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl ArtworkPipeline {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            detector: BoundsDetector::from(&settings.bounds),
            vector: settings.vector.clone(),
            significant_crop_ratio: settings.bounds.significant_crop_ratio,
        }
    }

    /// Detect bounds, treating any failure as "no bounds".
    pub fn detect(&self, image: &ArtworkImage) -> Option<ContentBounds> {
        match self.detector.detect(&image.pixels) {
            Ok(bounds) => bounds,
            Err(e) => {
                warn!(error = %e, "Bounds detection failed, using full image");
                None
            }
        }
    }

    /// Detect (through `cache`) and crop.
    pub fn run(
        &self,
        image: ArtworkImage,
        document: Option<&VectorDocument>,
        cache: &mut BoundsCache,
    ) -> PreparedArtwork {
        let fingerprint = Fingerprint::of(&image);
        let bounds = match cache.get(&fingerprint) {
            Some(cached) => {
                debug!(?fingerprint, "Content bounds cache hit");
                cached
            }
            None => {
                let detected = self.detect(&image);
                cache.insert(fingerprint, detected);
                detected
            }
        };
        self.apply(image, bounds, document)
    }

    /// Crop `image` to `bounds` if that removes a meaningful margin.
    pub fn apply(
        &self,
        image: ArtworkImage,
        bounds: Option<ContentBounds>,
        document: Option<&VectorDocument>,
    ) -> PreparedArtwork {
        let Some(found) = bounds else {
            return PreparedArtwork { image, bounds };
        };
        if image.cropped {
            return PreparedArtwork { image, bounds };
        }
        if !is_significant_crop(&found, image.size(), self.significant_crop_ratio) {
            debug!(?found, size = ?image.size(), "Crop not significant, keeping full image");
            return PreparedArtwork { image, bounds };
        }

        match crop_with_document(&image, found, document, &self.vector) {
            Ok(cropped) => {
                info!(
                    from = ?image.size(),
                    to = ?cropped.size(),
                    provenance = ?image.provenance,
                    "Cropped artwork to content"
                );
                PreparedArtwork { image: cropped, bounds }
            }
            Err(e) => {
                warn!(error = %e, "Crop failed, using full image");
                PreparedArtwork { image, bounds }
            }
        }
    }
}
