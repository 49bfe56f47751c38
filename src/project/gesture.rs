use kurbo::{Point, Rect};

use crate::project::model::{PctPoint, SegmentId};
use crate::project::settings::{DRAG_PCT_RANGE, IMAGE_SCALE_RANGE};
use crate::project::state::{Action, ProjectState};

/// Overlay element a pointer gesture acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTarget {
    /// Thumbnail title.
    ThumbnailText,
    /// Thumbnail cover image.
    ThumbnailImage,
    /// Subtitle of a segment.
    SegmentSubtitle(SegmentId),
    /// Image of a segment.
    SegmentImage(SegmentId),
}

/// Pointer drag state machine over the preview surface.
///
/// `surface` is the preview rectangle in pointer coordinates at the time the drag began.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragGesture {
    /// No drag in progress.
    #[default]
    Idle,
    /// Pointer is held down on `target`.
    Dragging {
        /// Element being moved.
        target: DragTarget,
        /// Preview surface bounds.
        surface: Rect,
    },
}

impl DragGesture {
    /// Start dragging `target` across `surface`.
    pub fn begin(target: DragTarget, surface: Rect) -> Self {
        Self::Dragging { target, surface }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Release the pointer.
    pub fn end(self) -> Self {
        Self::Idle
    }

    /// Translate a pointer move into the action that repositions the dragged element.
    ///
    /// Returns `None` when idle, when the surface is degenerate, or when the target no longer
    /// exists in `state`. Image drags keep the current scale.
    pub fn pointer_moved(&self, pointer: Point, state: &ProjectState) -> Option<Action> {
        let Self::Dragging { target, surface } = *self else {
            return None;
        };
        let pct = pointer_to_pct(pointer, surface)?;
        match target {
            DragTarget::ThumbnailText => Some(Action::SetThumbnailPosition(pct)),
            DragTarget::ThumbnailImage => Some(Action::SetThumbnailImagePlacement(
                state.thumbnail.image_placement.with_anchor(pct),
            )),
            DragTarget::SegmentSubtitle(id) => {
                state.segment(id)?;
                Some(Action::SetSubtitlePosition { id, position: pct })
            }
            DragTarget::SegmentImage(id) => {
                let seg = state.segment(id)?;
                Some(Action::SetImagePlacement {
                    id,
                    placement: seg.image_placement.with_anchor(pct),
                })
            }
        }
    }
}

/// Pointer position as percent of `surface`, clamped to the drag band.
pub fn pointer_to_pct(pointer: Point, surface: Rect) -> Option<PctPoint> {
    if surface.width() <= 0.0 || surface.height() <= 0.0 {
        return None;
    }
    let x = (pointer.x - surface.x0) / surface.width() * 100.0;
    let y = (pointer.y - surface.y0) / surface.height() * 100.0;
    let (lo, hi) = (*DRAG_PCT_RANGE.start(), *DRAG_PCT_RANGE.end());
    Some(PctPoint::new(x.clamp(lo, hi), y.clamp(lo, hi)))
}

/// Action that rescales an image target, with `scale` clamped to the allowed range.
///
/// Text targets have no scale and yield `None`.
pub fn scale_action(target: DragTarget, scale: f64, state: &ProjectState) -> Option<Action> {
    if !scale.is_finite() {
        return None;
    }
    let scale = scale.clamp(*IMAGE_SCALE_RANGE.start(), *IMAGE_SCALE_RANGE.end());
    match target {
        DragTarget::ThumbnailImage => {
            let mut placement = state.thumbnail.image_placement;
            placement.scale = scale;
            Some(Action::SetThumbnailImagePlacement(placement))
        }
        DragTarget::SegmentImage(id) => {
            let mut placement = state.segment(id)?.image_placement;
            placement.scale = scale;
            Some(Action::SetImagePlacement { id, placement })
        }
        DragTarget::ThumbnailText | DragTarget::SegmentSubtitle(_) => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/gesture.rs"]
mod tests;
