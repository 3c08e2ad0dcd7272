//! Per-(artwork, print location) placement context.
//!
//! Owns both artwork images (original and vectorized) and, for each view,
//! its content bounds, cached transform and undo history. The active
//! transform, flip state and gesture sit alongside. Everything that used to
//! live in ambient mutable cells is a field here and is passed around
//! explicitly.

use super::geometry;
use super::state::{Phase, ViewState};
use crate::error::{EngineError, EngineResult};
use crate::history::History;
use crate::input::GestureState;
use crate::settings::{EngineSettings, InteractionSettings, PlacementSettings};
use crate::types::{
    ArtworkImage, ArtworkToken, ArtworkTransform, ContentBounds, DimensionReport, Flip, ImageSize,
    PrintArea, PrintLocation, View,
};
use crate::units::PrintSpec;
use tracing::{debug, info, trace};

/// State kept separately for each view. Undo in one view never yields a
/// transform sized for the other view's image.
#[derive(Clone, Debug)]
struct ViewSlot {
    image: Option<ArtworkImage>,
    bounds: Option<ContentBounds>,
    /// Last transform used in this view
    cached: Option<ArtworkTransform>,
    history: History,
}

impl ViewSlot {
    fn new(history_limit: usize) -> Self {
        Self {
            image: None,
            bounds: None,
            cached: None,
            history: History::new(history_limit),
        }
    }

    fn clear(&mut self) {
        self.image = None;
        self.bounds = None;
        self.cached = None;
        self.history.clear();
    }
}

#[derive(Debug)]
pub struct PlacementContext {
    location: PrintLocation,
    spec: PrintSpec,
    pub(crate) policy: PlacementSettings,
    pub(crate) interaction: InteractionSettings,

    token: Option<ArtworkToken>,
    /// Indexed by `View::index`
    views: [ViewSlot; 2],

    active: Option<ArtworkTransform>,
    pub(crate) flip: Flip,
    state: ViewState,
    phase: Phase,
    pub(crate) gesture: GestureState,

    /// Committed transforms not yet delivered to listeners
    pending: Vec<ArtworkTransform>,
}

impl PlacementContext {
    pub fn new(location: PrintLocation, settings: &EngineSettings) -> Self {
        let limit = settings.placement.history_limit;
        Self {
            location,
            spec: *settings.print_table.get(location),
            policy: settings.placement.clone(),
            interaction: settings.interaction.clone(),
            token: None,
            views: [ViewSlot::new(limit), ViewSlot::new(limit)],
            active: None,
            flip: Flip::default(),
            state: ViewState::default(),
            phase: Phase::Empty,
            gesture: GestureState::default(),
            pending: Vec::new(),
        }
    }

    fn slot(&self, view: View) -> &ViewSlot {
        &self.views[view.index()]
    }

    fn slot_mut(&mut self, view: View) -> &mut ViewSlot {
        &mut self.views[view.index()]
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn location(&self) -> PrintLocation {
        self.location
    }

    pub fn print_area(&self) -> PrintArea {
        self.spec.area
    }

    pub fn spec(&self) -> &PrintSpec {
        &self.spec
    }

    pub fn token(&self) -> Option<ArtworkToken> {
        self.token
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view_state(&self) -> ViewState {
        self.state
    }

    pub fn active_view(&self) -> View {
        self.state.displayed()
    }

    pub fn transform(&self) -> Option<ArtworkTransform> {
        self.active
    }

    pub fn flip(&self) -> Flip {
        self.flip
    }

    pub fn cached(&self, view: View) -> Option<ArtworkTransform> {
        self.slot(view).cached
    }

    /// Content bounds of the displayed view's image.
    pub fn content_bounds(&self) -> Option<ContentBounds> {
        self.content_bounds_for(self.active_view())
    }

    pub fn content_bounds_for(&self, view: View) -> Option<ContentBounds> {
        self.slot(view).bounds
    }

    /// Undo history of the displayed view.
    pub fn history(&self) -> &History {
        self.history_for(self.active_view())
    }

    pub fn history_for(&self, view: View) -> &History {
        &self.slot(view).history
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn image_for(&self, view: View) -> Option<&ArtworkImage> {
        self.slot(view).image.as_ref()
    }

    /// The image currently displayed.
    pub fn image(&self) -> Option<&ArtworkImage> {
        self.image_for(self.active_view())
    }

    pub fn displayed_size(&self) -> Option<ImageSize> {
        self.image().map(ArtworkImage::size)
    }

    pub fn has_artwork(&self) -> bool {
        self.phase != Phase::Empty && self.active.is_some()
    }

    /// Physical size and oversize flag. `None` without artwork.
    pub fn dimensions(&self) -> Option<DimensionReport> {
        let size = self.displayed_size()?;
        let transform = self.active?;
        Some(geometry::dimension_report(
            size,
            &transform,
            self.flip,
            self.spec.pixels_per_inch(),
            self.spec.max,
        ))
    }

    pub fn is_oversize(&self) -> bool {
        self.dimensions().is_some_and(|d| d.oversize)
    }

    /// Default placement for the displayed image, keeping `rotation`.
    pub fn default_transform(&self, rotation: f64) -> Option<ArtworkTransform> {
        let size = self.displayed_size()?;
        Some(geometry::default_placement(&self.spec.area, size, &self.policy, rotation))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Bind a new artwork identity, discarding everything tied to the old one.
    pub fn begin_artwork(&mut self, token: ArtworkToken, view: View) {
        self.reset();
        self.token = Some(token);
        self.state = ViewState::Loading(view);
        debug!(location = %self.location, ?token, "Artwork load started");
    }

    /// First pixels for a view are available. Restores that view's cached
    /// transform, or computes the default placement if there is none.
    pub fn initialize(&mut self, image: ArtworkImage) -> ArtworkTransform {
        let view = image.provenance;
        let size = image.size();
        let default = geometry::default_placement(&self.spec.area, size, &self.policy, 0.0);

        let slot = self.slot_mut(view);
        slot.image = Some(image);
        let transform = *slot.cached.get_or_insert(default);
        slot.history.record(transform);

        self.active = Some(transform);
        self.pending.push(transform);
        self.state = ViewState::Idle(view);
        if self.phase == Phase::Empty {
            self.phase = Phase::Loaded;
        }
        info!(location = %self.location, ?view, ?size, ?transform, "Artwork initialized");
        transform
    }

    /// Record bounds discovered for `view`'s image. When a transform already
    /// exists against the uncropped image and `cropped` is provided, the
    /// artwork is swapped for the cropped pixels and re-placed around its old
    /// visual center. Only the first discovery per view does this.
    pub fn apply_content_bounds(
        &mut self,
        view: View,
        bounds: ContentBounds,
        cropped: Option<ArtworkImage>,
    ) -> Option<ArtworkTransform> {
        if self.slot(view).bounds.is_some() {
            return None;
        }
        self.slot_mut(view).bounds = Some(bounds);

        let mut cropped = cropped?;
        cropped.provenance = view;
        let old_size = self.image_for(view)?.size();
        let old_transform = self.cached(view)?;
        let new_size = cropped.size();

        let recentered = geometry::recenter_for_new_crop(
            &old_transform,
            old_size,
            new_size,
            &self.spec.area,
            &self.policy,
        );
        let slot = self.slot_mut(view);
        slot.image = Some(cropped);
        slot.cached = Some(recentered);
        // Entries before this point refer to the uncropped size
        slot.history.clear();
        slot.history.record(recentered);

        if self.active_view() == view {
            self.active = Some(recentered);
            self.pending.push(recentered);
        }
        debug!(?view, ?old_size, ?new_size, ?recentered, "Recentered for new crop");
        Some(recentered)
    }

    /// Remove the artwork; the next load starts from a fresh default.
    pub fn clear(&mut self) {
        self.reset();
        debug!(location = %self.location, "Artwork removed");
    }

    fn reset(&mut self) {
        self.token = None;
        for slot in &mut self.views {
            slot.clear();
        }
        self.active = None;
        self.flip = Flip::default();
        self.state = ViewState::default();
        self.phase = Phase::Empty;
        self.gesture.reset();
        self.pending.clear();
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn check_writable(&self, next: &ArtworkTransform) -> EngineResult<()> {
        if let ViewState::Transitioning { from, to } = self.state {
            return Err(EngineError::Transitioning { from, to });
        }
        if self.active.is_none() {
            return Err(EngineError::NoArtwork(self.location));
        }
        if !next.has_valid_scale() {
            return Err(EngineError::InvalidScale(next.scale));
        }
        Ok(())
    }

    /// Commit a transform: replaces the active one, records it in the
    /// displayed view's history and notifies listeners. Refused during a
    /// view transition.
    pub fn set_transform(&mut self, next: ArtworkTransform) -> EngineResult<()> {
        self.check_writable(&next)?;
        let next = ArtworkTransform::new(next.x, next.y, next.scale, next.rotation);
        let view = self.state.displayed();
        let cache_writes = self.state.accepts_cache_writes();

        let slot = self.slot_mut(view);
        slot.history.record(next);
        if cache_writes {
            slot.cached = Some(next);
        }
        self.active = Some(next);
        self.pending.push(next);
        self.phase = Phase::Edited;
        trace!(?view, ?next, "Transform committed");
        Ok(())
    }

    /// Show an in-progress gesture value without recording it.
    pub fn preview_transform(&mut self, next: ArtworkTransform) -> EngineResult<()> {
        self.check_writable(&next)?;
        self.active = Some(ArtworkTransform::new(next.x, next.y, next.scale, next.rotation));
        Ok(())
    }

    /// Put back a committed transform after a cancelled gesture.
    pub(crate) fn restore_preview(&mut self, transform: ArtworkTransform) {
        if self.active.is_some() {
            self.active = Some(transform);
        }
    }

    /// Step the displayed view's history, backwards or forwards.
    fn step_history(&mut self, forward: bool) -> Option<ArtworkTransform> {
        if self.state.is_transitioning() || self.active.is_none() {
            return None;
        }
        let view = self.state.displayed();
        let cache_writes = self.state.accepts_cache_writes();

        let slot = self.slot_mut(view);
        let transform = if forward { slot.history.redo() } else { slot.history.undo() }?;
        if cache_writes {
            slot.cached = Some(transform);
        }
        self.active = Some(transform);
        self.pending.push(transform);
        Some(transform)
    }

    pub fn undo(&mut self) -> Option<ArtworkTransform> {
        self.step_history(false)
    }

    pub fn redo(&mut self) -> Option<ArtworkTransform> {
        self.step_history(true)
    }

    // ========================================================================
    // View Toggling
    // ========================================================================

    /// Start swapping to `target`. The current transform is saved into the
    /// source view's cache; until the toggle completes, writes are refused.
    pub fn begin_toggle(&mut self, target: View) -> EngineResult<()> {
        if let ViewState::Transitioning { from, to } = self.state {
            return Err(EngineError::Transitioning { from, to });
        }
        let Some(active) = self.active else {
            return Err(EngineError::NoArtwork(self.location));
        };
        let from = self.state.displayed();
        self.slot_mut(from).cached = Some(active);
        self.state = ViewState::Transitioning { from, to: target };
        debug!(?from, to = ?target, "View toggle started");
        Ok(())
    }

    /// Finish the toggle, optionally supplying the target view's image.
    ///
    /// Restores the target's cached transform verbatim, or centers a fresh
    /// default against the target image, keeping the prior rotation. A fresh
    /// default becomes the first entry of the target's history. If the
    /// target has no image the toggle is cancelled.
    pub fn complete_toggle(&mut self, image: Option<ArtworkImage>) -> EngineResult<ArtworkTransform> {
        let ViewState::Transitioning { from, to } = self.state else {
            return Err(EngineError::ViewUnavailable(self.active_view()));
        };
        if let Some(mut image) = image {
            image.provenance = to;
            self.slot_mut(to).image = Some(image);
        }
        let Some(size) = self.image_for(to).map(ArtworkImage::size) else {
            self.state = ViewState::Idle(from);
            return Err(EngineError::ViewUnavailable(to));
        };

        let rotation = self.active.map_or(0.0, |t| t.rotation);
        let default = geometry::default_placement(&self.spec.area, size, &self.policy, rotation);
        let slot = self.slot_mut(to);
        let transform = *slot.cached.get_or_insert(default);
        if slot.history.is_empty() {
            slot.history.record(transform);
        }

        self.active = Some(transform);
        self.pending.push(transform);
        self.state = ViewState::Idle(to);
        info!(?from, ?to, ?transform, "View toggled");
        Ok(transform)
    }

    /// Swap to `target` in one step.
    pub fn toggle_view(&mut self, target: View, image: Option<ArtworkImage>) -> EngineResult<ArtworkTransform> {
        if self.state == ViewState::Idle(target) {
            return self.active.ok_or(EngineError::NoArtwork(self.location));
        }
        self.begin_toggle(target)?;
        self.complete_toggle(image)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Drain committed transforms queued for listeners.
    pub fn take_changes(&mut self) -> Vec<ArtworkTransform> {
        std::mem::take(&mut self.pending)
    }
}
