//! Interaction surface - toolbar actions, keyboard nudges and pointer
//! gestures translated into transform updates.
//!
//! Toolbar actions and nudges commit immediately (one history entry each).
//! Pointer gestures preview every move and commit once, on release.

use super::keyboard::{Direction, Key, KeyAction, Modifiers, resolve_key};
use super::state::{GestureState, ResizeHandle};
use crate::error::{EngineError, EngineResult};
use crate::transform::PlacementContext;
use crate::transform::geometry::{self, rotate_vector};
use crate::types::{ArtworkTransform, Flip, ImageSize};
use kurbo::Vec2;
use tracing::{debug, trace};

impl PlacementContext {
    /// Committed transform and displayed image size, or `NoArtwork`.
    fn placement(&self) -> EngineResult<(ArtworkTransform, ImageSize)> {
        match (self.transform(), self.displayed_size()) {
            (Some(t), Some(size)) => Ok((t, size)),
            _ => Err(EngineError::NoArtwork(self.location())),
        }
    }

    // ========================================================================
    // Toolbar
    // ========================================================================

    /// Center in the print area, keeping scale and rotation.
    pub fn center(&mut self) -> EngineResult<ArtworkTransform> {
        let (t, size) = self.placement()?;
        let next = geometry::center_in_area(&self.print_area(), size, &t);
        self.set_transform(next)?;
        Ok(next)
    }

    /// Scale to fill the print area edge to edge, centered.
    pub fn fit_to_print_area(&mut self) -> EngineResult<ArtworkTransform> {
        let (t, size) = self.placement()?;
        let next = geometry::fit_to_area(&self.print_area(), size, t.rotation);
        self.set_transform(next)?;
        Ok(next)
    }

    /// Back to the initial placement: default scale, centered, unrotated, unflipped.
    pub fn reset_to_default(&mut self) -> EngineResult<ArtworkTransform> {
        let (_, size) = self.placement()?;
        let next = geometry::default_placement(&self.print_area(), size, &self.policy, 0.0);
        self.set_transform(next)?;
        self.flip = Flip::default();
        Ok(next)
    }

    /// Rotate by `degrees` (positive is clockwise on screen).
    pub fn rotate(&mut self, degrees: f64) -> EngineResult<ArtworkTransform> {
        let (t, _) = self.placement()?;
        let next = t.rotated_by(degrees);
        self.set_transform(next)?;
        Ok(next)
    }

    /// Rotate by one toolbar step.
    pub fn rotate_step(&mut self, clockwise: bool) -> EngineResult<ArtworkTransform> {
        let step = self.interaction.rotation_step;
        self.rotate(if clockwise { step } else { -step })
    }

    /// Flips live beside the transform: no history entry, no change event.
    pub fn flip_horizontal(&mut self) -> EngineResult<Flip> {
        self.placement()?;
        self.flip.horizontal = !self.flip.horizontal;
        Ok(self.flip)
    }

    pub fn flip_vertical(&mut self) -> EngineResult<Flip> {
        self.placement()?;
        self.flip.vertical = !self.flip.vertical;
        Ok(self.flip)
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    pub fn nudge(&mut self, direction: Direction, large: bool) -> EngineResult<ArtworkTransform> {
        let (t, _) = self.placement()?;
        let step = if large {
            self.interaction.nudge_step_large
        } else {
            self.interaction.nudge_step
        };
        let (ux, uy) = direction.unit();
        let next = t.translated(ux * step, uy * step);
        self.set_transform(next)?;
        Ok(next)
    }

    /// Handle a keypress. Returns the action taken, if any.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> Option<KeyAction> {
        if !self.gesture.is_idle() {
            return None;
        }
        let action = resolve_key(key, modifiers)?;
        let applied = match action {
            KeyAction::Undo => self.undo().is_some(),
            KeyAction::Redo => self.redo().is_some(),
            KeyAction::Nudge { direction, large } => self.nudge(direction, large).is_ok(),
        };
        applied.then_some(action)
    }

    // ========================================================================
    // Pointer Gestures
    // ========================================================================

    pub fn begin_drag(&mut self, pointer: (f64, f64)) -> EngineResult<()> {
        let (start, _) = self.placement()?;
        self.gesture = GestureState::Dragging { start_pointer: pointer, start };
        Ok(())
    }

    pub fn begin_resize(&mut self, handle: ResizeHandle, pointer: (f64, f64)) -> EngineResult<()> {
        let (start, _) = self.placement()?;
        self.gesture = GestureState::Resizing {
            handle,
            start_pointer: pointer,
            start,
            last_valid: start,
        };
        Ok(())
    }

    pub fn begin_rotate(&mut self, pointer: (f64, f64)) -> EngineResult<()> {
        let (start, size) = self.placement()?;
        let center = start.visual_center(size);
        self.gesture = GestureState::Rotating {
            center,
            start_angle: pointer_angle(center, pointer),
            start,
        };
        Ok(())
    }

    /// Pointer moved during a gesture. Returns `false` when the move was
    /// rejected (resize below the minimum box) and the prior box kept.
    pub fn pointer_move(&mut self, pointer: (f64, f64)) -> EngineResult<bool> {
        let (_, size) = self.placement()?;
        match self.gesture.clone() {
            GestureState::Idle => Ok(false),
            GestureState::Dragging { start_pointer, start } => {
                let next = start.translated(pointer.0 - start_pointer.0, pointer.1 - start_pointer.1);
                self.preview_transform(next)?;
                Ok(true)
            }
            GestureState::Resizing { handle, start_pointer, start, last_valid } => {
                let delta = (pointer.0 - start_pointer.0, pointer.1 - start_pointer.1);
                match self.resized(&start, size, handle, delta) {
                    Some(next) => {
                        self.preview_transform(next)?;
                        self.gesture = GestureState::Resizing {
                            handle,
                            start_pointer,
                            start,
                            last_valid: next,
                        };
                        Ok(true)
                    }
                    None => {
                        trace!(?delta, "Resize below minimum rejected");
                        self.preview_transform(last_valid)?;
                        Ok(false)
                    }
                }
            }
            GestureState::Rotating { center, start_angle, start } => {
                let next = start.rotated_by(pointer_angle(center, pointer) - start_angle);
                self.preview_transform(next)?;
                Ok(true)
            }
        }
    }

    /// Pointer released: commit the gesture's final transform as one history
    /// entry. Returns `None` if nothing changed.
    pub fn end_gesture(&mut self) -> EngineResult<Option<ArtworkTransform>> {
        let gesture = std::mem::take(&mut self.gesture);
        let Some(start) = gesture.start_transform() else {
            return Ok(None);
        };
        let final_transform = match gesture {
            GestureState::Resizing { last_valid, .. } => last_valid,
            _ => self.transform().unwrap_or(start),
        };
        if final_transform == start {
            self.restore_preview(start);
            return Ok(None);
        }
        self.set_transform(final_transform)?;
        debug!(?final_transform, "Gesture committed");
        Ok(Some(final_transform))
    }

    /// Abort the gesture and show the transform it started from.
    pub fn cancel_gesture(&mut self) {
        if let Some(start) = self.gesture.start_transform() {
            self.restore_preview(start);
        }
        self.gesture.reset();
    }

    /// Uniform resize from `handle`, keeping the opposite corner fixed.
    /// `None` when the result would be smaller than the minimum box.
    fn resized(
        &self,
        start: &ArtworkTransform,
        size: ImageSize,
        handle: ResizeHandle,
        delta: (f64, f64),
    ) -> Option<ArtworkTransform> {
        let (w, h) = start.box_size(size);
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let (sx, sy) = handle.signs();
        // Pointer delta in the box's own (rotated) frame
        let local = rotate_vector(Vec2::from(delta), -start.rotation);
        let factor = ((w + sx * local.x) / w + (h + sy * local.y) / h) / 2.0;
        let scale = start.scale * factor;

        let new_w = f64::from(size.width) * scale;
        let new_h = f64::from(size.height) * scale;
        let min = self.interaction.min_box_size;
        if !(scale.is_finite() && scale > 0.0) || new_w < min || new_h < min {
            return None;
        }

        // The corner opposite the handle stays put
        let center = Vec2::from(start.visual_center(size));
        let anchor = center + rotate_vector(Vec2::new(-sx * w, -sy * h) / 2.0, start.rotation);
        let new_center = anchor - rotate_vector(Vec2::new(-sx * new_w, -sy * new_h) / 2.0, start.rotation);

        Some(ArtworkTransform::new(
            new_center.x - new_w / 2.0,
            new_center.y - new_h / 2.0,
            scale,
            start.rotation,
        ))
    }
}

fn pointer_angle(center: (f64, f64), pointer: (f64, f64)) -> f64 {
    (Vec2::from(pointer) - Vec2::from(center)).atan2().to_degrees()
}
