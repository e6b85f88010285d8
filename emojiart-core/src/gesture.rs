//! # Gesture Reconciliation
//!
//! Turns raw gesture events into view-transform updates, selection changes
//! and document intents.
//!
//! ```text
//!                      selection empty?
//!  Drag  ── Began ──┬── yes ─▶ PanningCanvas     (live pan offset)
//!                   └── no ──▶ DraggingSelection (live offset, document units)
//!  Pinch ── Began ──┬── yes ─▶ ZoomingCanvas     (live zoom scale)
//!                   └── no ──▶ ScalingSelection  (live size factor)
//!
//!  Ended:     canvas tracks fold live into steady state,
//!             selection tracks emit one MoveItem/ScaleItem per selected item.
//!  Cancelled: live values are discarded.
//! ```
//!
//! Drag and pinch are tracked independently, so a simultaneous pan and zoom
//! both apply. The branch is chosen when a gesture begins and holds until it
//! ends, even if the selection changes in between.

use crate::document::{Document, Intent};
use crate::event::{Gesture, GesturePhase};
use crate::item::ItemId;
use crate::selection::Selection;
use crate::transform::{clamp_zoom, zoom_to_fit, Point, Size, Vector, ViewTransform};

/// What a gesture track is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    /// No gesture in progress.
    Idle,
    /// Dragging the whole canvas.
    PanningCanvas,
    /// Pinching the whole canvas.
    ZoomingCanvas,
    /// Dragging the selected items.
    DraggingSelection,
    /// Pinching the selected items.
    ScalingSelection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragTrack {
    Idle,
    /// Live pan in view pixels.
    Canvas(Vector),
    /// Live offset in document units.
    Selection(Vector),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PinchTrack {
    Idle,
    Canvas(f64),
    Selection(f64),
}

/// What handling a gesture produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureOutcome {
    /// Document intents to apply as one undoable action.
    pub intents: Vec<Intent>,
    /// Undo description for `intents`.
    pub description: Option<String>,
    /// Whether the selection changed.
    pub selection_changed: bool,
    /// Whether the effective view transform changed.
    pub transform_changed: bool,
    /// Whether the live offset or scale of the selected items changed.
    pub preview_changed: bool,
}

/// Gesture state machine for one canvas.
///
/// Owns the view transform: the committed steady state plus whatever live
/// pan/zoom the in-flight gestures contribute. The transform is never
/// written into the document.
#[derive(Debug, Clone)]
pub struct GestureReconciler {
    viewport: Size,
    steady: ViewTransform,
    drag: DragTrack,
    pinch: PinchTrack,
}

impl GestureReconciler {
    /// Create a reconciler for a viewport of the given size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            steady: ViewTransform::IDENTITY,
            drag: DragTrack::Idle,
            pinch: PinchTrack::Idle,
        }
    }

    /// Viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Centre of the viewport in view space.
    #[must_use]
    pub fn view_center(&self) -> Point {
        self.viewport.center()
    }

    /// Committed transform, excluding in-flight gestures.
    #[must_use]
    pub const fn steady_transform(&self) -> ViewTransform {
        self.steady
    }

    /// In-flight canvas pan/zoom only.
    #[must_use]
    pub fn live_transform(&self) -> ViewTransform {
        let pan = match self.drag {
            DragTrack::Canvas(pan) => pan,
            _ => Vector::ZERO,
        };
        let zoom = match self.pinch {
            PinchTrack::Canvas(scale) => scale,
            _ => 1.0,
        };
        ViewTransform::new(pan, zoom)
    }

    /// Effective transform: steady state composed with live.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.steady.compose(self.live_transform())
    }

    /// State of the drag track.
    #[must_use]
    pub const fn drag_state(&self) -> GestureState {
        match self.drag {
            DragTrack::Idle => GestureState::Idle,
            DragTrack::Canvas(_) => GestureState::PanningCanvas,
            DragTrack::Selection(_) => GestureState::DraggingSelection,
        }
    }

    /// State of the pinch track.
    #[must_use]
    pub const fn pinch_state(&self) -> GestureState {
        match self.pinch {
            PinchTrack::Idle => GestureState::Idle,
            PinchTrack::Canvas(_) => GestureState::ZoomingCanvas,
            PinchTrack::Selection(_) => GestureState::ScalingSelection,
        }
    }

    /// Whether no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.drag == DragTrack::Idle && self.pinch == PinchTrack::Idle
    }

    /// Live document-space offset applied to selected items while they are
    /// being dragged.
    #[must_use]
    pub fn live_selection_offset(&self) -> Vector {
        match self.drag {
            DragTrack::Selection(offset) => offset,
            _ => Vector::ZERO,
        }
    }

    /// Live size factor applied to selected items while they are being
    /// pinched.
    #[must_use]
    pub fn live_selection_scale(&self) -> f64 {
        match self.pinch {
            PinchTrack::Selection(scale) => scale,
            _ => 1.0,
        }
    }

    /// Convert a view point to document space with the effective transform.
    #[must_use]
    pub fn to_document(&self, p: Point) -> Point {
        self.transform().to_document(p, self.view_center())
    }

    /// Convert a document point to view space with the effective transform.
    #[must_use]
    pub fn to_view(&self, p: Point) -> Point {
        self.transform().to_view(p, self.view_center())
    }

    /// Drop in-flight gestures and reset the transform to identity.
    pub fn reset(&mut self) {
        self.steady = ViewTransform::IDENTITY;
        self.drag = DragTrack::Idle;
        self.pinch = PinchTrack::Idle;
    }

    /// Handle one gesture event.
    ///
    /// Taps update `selection` directly. Document changes come back as
    /// intents for the caller to apply; intents are only produced for ids
    /// that exist in `document`. `background_size` is the natural size of
    /// the decoded background image, if any, and drives zoom-to-fit.
    pub fn handle(
        &mut self,
        gesture: &Gesture,
        selection: &mut Selection,
        document: &Document,
        background_size: Option<Size>,
    ) -> GestureOutcome {
        match *gesture {
            Gesture::Tap { x, y } => self.tap(Point::new(x, y), selection, document),
            Gesture::DoubleTap { x, y } => {
                self.double_tap(Point::new(x, y), document, background_size)
            }
            Gesture::Drag {
                phase,
                translation_x,
                translation_y,
            } => self.drag(
                phase,
                Vector::new(translation_x, translation_y),
                selection,
                document,
            ),
            Gesture::Pinch { phase, scale } => self.pinch(phase, scale, selection, document),
        }
    }

    fn tap(&self, at: Point, selection: &mut Selection, document: &Document) -> GestureOutcome {
        let target = document.item_at(self.to_document(at));
        match target {
            Some(id) => {
                let selected = selection.toggle(id);
                tracing::debug!(%id, selected, "tap toggled item");
                GestureOutcome {
                    selection_changed: true,
                    ..GestureOutcome::default()
                }
            }
            None => {
                let had_selection = !selection.is_empty();
                selection.clear();
                tracing::debug!("tap on background cleared selection");
                GestureOutcome {
                    selection_changed: had_selection,
                    ..GestureOutcome::default()
                }
            }
        }
    }

    fn double_tap(
        &mut self,
        at: Point,
        document: &Document,
        background_size: Option<Size>,
    ) -> GestureOutcome {
        if document.item_at(self.to_document(at)).is_some() {
            return GestureOutcome::default();
        }
        let Some(scale) = background_size.and_then(|image| zoom_to_fit(image, self.viewport))
        else {
            tracing::debug!("zoom to fit skipped, no sized background or viewport");
            return GestureOutcome::default();
        };
        self.steady = ViewTransform::new(Vector::ZERO, scale);
        tracing::debug!(scale, "zoomed to fit background");
        GestureOutcome {
            transform_changed: true,
            ..GestureOutcome::default()
        }
    }

    fn drag(
        &mut self,
        phase: GesturePhase,
        translation: Vector,
        selection: &Selection,
        document: &Document,
    ) -> GestureOutcome {
        if phase == GesturePhase::Began
            || (self.drag == DragTrack::Idle && phase != GesturePhase::Cancelled)
        {
            self.drag = if selection.is_empty() {
                DragTrack::Canvas(Vector::ZERO)
            } else {
                DragTrack::Selection(Vector::ZERO)
            };
        }

        // Document-space offset uses the zoom in effect before this drag
        // contributes anything.
        let zoom = self.transform();
        match (phase, self.drag) {
            (GesturePhase::Began | GesturePhase::Changed, DragTrack::Canvas(_)) => {
                self.drag = DragTrack::Canvas(translation);
                GestureOutcome {
                    transform_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Began | GesturePhase::Changed, DragTrack::Selection(_)) => {
                self.drag = DragTrack::Selection(zoom.delta_to_document(translation));
                GestureOutcome {
                    preview_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Ended, DragTrack::Canvas(_)) => {
                self.drag = DragTrack::Idle;
                self.steady = self.steady.compose(ViewTransform::new(translation, 1.0));
                tracing::debug!(dx = translation.dx, dy = translation.dy, "pan committed");
                GestureOutcome {
                    transform_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Ended, DragTrack::Selection(_)) => {
                self.drag = DragTrack::Idle;
                let offset = zoom.delta_to_document(translation);
                let intents: Vec<_> = existing_selected(selection, document)
                    .map(|id| Intent::MoveItem { id, by: offset })
                    .collect();
                tracing::debug!(count = intents.len(), "selection drag committed");
                with_intents(intents, "Move")
            }
            (GesturePhase::Cancelled, track) => {
                self.drag = DragTrack::Idle;
                GestureOutcome {
                    transform_changed: matches!(track, DragTrack::Canvas(_)),
                    preview_changed: matches!(track, DragTrack::Selection(_)),
                    ..GestureOutcome::default()
                }
            }
            (_, DragTrack::Idle) => GestureOutcome::default(),
        }
    }

    fn pinch(
        &mut self,
        phase: GesturePhase,
        scale: f64,
        selection: &Selection,
        document: &Document,
    ) -> GestureOutcome {
        if phase == GesturePhase::Began
            || (self.pinch == PinchTrack::Idle && phase != GesturePhase::Cancelled)
        {
            self.pinch = if selection.is_empty() {
                PinchTrack::Canvas(1.0)
            } else {
                PinchTrack::Selection(1.0)
            };
        }

        let scale = clamp_zoom(scale);
        match (phase, self.pinch) {
            (GesturePhase::Began | GesturePhase::Changed, PinchTrack::Canvas(_)) => {
                self.pinch = PinchTrack::Canvas(scale);
                GestureOutcome {
                    transform_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Began | GesturePhase::Changed, PinchTrack::Selection(_)) => {
                self.pinch = PinchTrack::Selection(scale);
                GestureOutcome {
                    preview_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Ended, PinchTrack::Canvas(_)) => {
                self.pinch = PinchTrack::Idle;
                self.steady = self.steady.compose(ViewTransform::new(Vector::ZERO, scale));
                tracing::debug!(scale, zoom = self.steady.zoom_scale, "zoom committed");
                GestureOutcome {
                    transform_changed: true,
                    ..GestureOutcome::default()
                }
            }
            (GesturePhase::Ended, PinchTrack::Selection(_)) => {
                self.pinch = PinchTrack::Idle;
                let intents: Vec<_> = existing_selected(selection, document)
                    .map(|id| Intent::ScaleItem { id, by: scale })
                    .collect();
                tracing::debug!(count = intents.len(), scale, "selection scale committed");
                with_intents(intents, "Scale")
            }
            (GesturePhase::Cancelled, track) => {
                self.pinch = PinchTrack::Idle;
                GestureOutcome {
                    transform_changed: matches!(track, PinchTrack::Canvas(_)),
                    preview_changed: matches!(track, PinchTrack::Selection(_)),
                    ..GestureOutcome::default()
                }
            }
            (_, PinchTrack::Idle) => GestureOutcome::default(),
        }
    }
}

fn existing_selected<'a>(
    selection: &'a Selection,
    document: &'a Document,
) -> impl Iterator<Item = ItemId> + 'a {
    selection
        .sorted()
        .into_iter()
        .filter(move |id| document.contains(*id))
}

fn with_intents(intents: Vec<Intent>, description: &str) -> GestureOutcome {
    let description = (!intents.is_empty()).then(|| description.to_string());
    GestureOutcome {
        intents,
        description,
        preview_changed: true,
        ..GestureOutcome::default()
    }
}
