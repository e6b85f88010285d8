//! Coordinate conversion between document space and view space.
//!
//! Document space is centred on a logical origin and independent of how the
//! canvas is currently panned or zoomed. View space is the pixel space of the
//! canvas viewport, with its origin at the top-left corner.
//!
//! ```text
//! view = view_center + document * zoom_scale + pan_offset
//! document = (view - view_center - pan_offset) / zoom_scale
//! ```

use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Smallest zoom scale a transform may hold.
pub const MIN_ZOOM_SCALE: f64 = 0.01;

/// A point in either document or view space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add<Vector> for Point {
    type Output = Self;

    fn add(self, rhs: Vector) -> Self {
        Self::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A displacement, such as a pan offset or a drag translation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Vector {
    /// The zero displacement.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Create a vector.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Multiply both components by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }

    /// Whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of a rectangle of this size anchored at the origin.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether both dimensions are strictly positive (and finite).
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Pan offset plus zoom scale applied when drawing the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Offset in view-space pixels.
    pub pan_offset: Vector,
    /// Zoom scale, always at least [`MIN_ZOOM_SCALE`].
    pub zoom_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    /// No pan, no zoom.
    pub const IDENTITY: Self = Self {
        pan_offset: Vector::ZERO,
        zoom_scale: 1.0,
    };

    /// Create a transform; the zoom scale is clamped to a positive minimum.
    #[must_use]
    pub fn new(pan_offset: Vector, zoom_scale: f64) -> Self {
        Self {
            pan_offset,
            zoom_scale: clamp_zoom(zoom_scale),
        }
    }

    /// Fold a live (in-gesture) transform into this one.
    ///
    /// Pan offsets add; zoom scales multiply.
    #[must_use]
    pub fn compose(self, live: Self) -> Self {
        Self::new(
            self.pan_offset + live.pan_offset,
            self.zoom_scale * live.zoom_scale,
        )
    }

    /// Whether this transform is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.pan_offset.is_zero() && (self.zoom_scale - 1.0).abs() < f64::EPSILON
    }

    /// Convert a document-space point to view space.
    #[must_use]
    pub fn to_view(&self, p: Point, view_center: Point) -> Point {
        Point::new(
            view_center.x + p.x * self.zoom_scale + self.pan_offset.dx,
            view_center.y + p.y * self.zoom_scale + self.pan_offset.dy,
        )
    }

    /// Convert a view-space point to document space.
    #[must_use]
    pub fn to_document(&self, p: Point, view_center: Point) -> Point {
        Point::new(
            (p.x - view_center.x - self.pan_offset.dx) / self.zoom_scale,
            (p.y - view_center.y - self.pan_offset.dy) / self.zoom_scale,
        )
    }

    /// Convert a view-space displacement (e.g. a drag translation) to
    /// document units.
    #[must_use]
    pub fn delta_to_document(&self, delta: Vector) -> Vector {
        delta.scaled(1.0 / self.zoom_scale)
    }
}

/// Clamp a zoom scale to a finite value of at least [`MIN_ZOOM_SCALE`].
///
/// Non-finite input falls back to `1.0`.
#[must_use]
pub fn clamp_zoom(scale: f64) -> f64 {
    if !scale.is_finite() {
        1.0
    } else if scale < MIN_ZOOM_SCALE {
        MIN_ZOOM_SCALE
    } else {
        scale
    }
}

/// Zoom scale that fits an image of `image` size entirely inside `viewport`.
///
/// Returns `None` unless both sizes have strictly positive dimensions.
#[must_use]
pub fn zoom_to_fit(image: Size, viewport: Size) -> Option<f64> {
    if !image.is_positive() || !viewport.is_positive() {
        return None;
    }
    let horizontal = viewport.width / image.width;
    let vertical = viewport.height / image.height;
    Some(horizontal.min(vertical))
}
