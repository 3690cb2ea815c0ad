#![forbid(unsafe_code)]

//! Geometric primitives for the canvas.
//!
//! Canvas coordinates are `f64`, y grows downward. Every node lives in its
//! own local frame; a [`Transform`] maps that frame into the parent's (or the
//! world's) coordinates with a uniform scale and a translation. The tree
//! never rotates, so nothing more general is needed.

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a vector.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Uniform scale followed by translation: `world = origin + scale * local`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Where the local origin lands.
    pub origin: Point,
    /// Length of one local unit.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new(Point::ORIGIN, 1.0);

    /// Create a new transform.
    #[inline]
    pub const fn new(origin: Point, scale: f64) -> Self {
        Self { origin, scale }
    }

    /// Map a local point into the outer frame.
    #[inline]
    #[must_use]
    pub fn apply(&self, local: Point) -> Point {
        Point::new(
            self.origin.x + self.scale * local.x,
            self.origin.y + self.scale * local.y,
        )
    }

    /// Compose with a transform expressed in this transform's local frame.
    #[inline]
    #[must_use]
    pub fn then(&self, inner: &Transform) -> Transform {
        Transform::new(self.apply(inner.origin), self.scale * inner.scale)
    }

    /// Scale about the local origin.
    #[inline]
    #[must_use]
    pub fn scale_by(&self, factor: f64) -> Transform {
        Transform::new(self.origin, self.scale * factor)
    }

    /// Translate by a vector measured in local units.
    #[inline]
    #[must_use]
    pub fn offset_local(&self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.apply(Point::new(dx, dy)), self.scale)
    }

    /// Whether the scale is usable for rendering and hit testing.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.origin.x.is_finite() && self.origin.y.is_finite()
    }
}

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Create new bounds.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centered on `center`.
    #[inline]
    #[must_use]
    pub fn centered(center: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether two rectangles overlap with positive area.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Distance from the rectangle to a point; zero when inside.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.x - p.x).max(0.0).max(p.x - self.right());
        let dy = (self.y - p.y).max(0.0).max(p.y - self.bottom());
        dx.hypot(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_scales_then_translates() {
        let t = Transform::new(Point::new(10.0, -4.0), 0.5);
        assert_eq!(t.apply(Point::new(3.0, 8.0)), Point::new(11.5, 0.0));
    }

    #[test]
    fn composition_multiplies_scales() {
        let outer = Transform::new(Point::new(100.0, 0.0), 2.0);
        let inner = Transform::new(Point::new(5.0, 5.0), 0.25);
        let both = outer.then(&inner);
        assert_eq!(both.origin, Point::new(110.0, 10.0));
        assert_eq!(both.scale, 0.5);
        assert_eq!(both.apply(Point::new(4.0, 0.0)), outer.apply(inner.apply(Point::new(4.0, 0.0))));
    }

    #[test]
    fn offset_local_is_measured_in_local_units() {
        let t = Transform::new(Point::ORIGIN, 0.5).offset_local(10.0, 20.0);
        assert_eq!(t.origin, Point::new(5.0, 10.0));
    }

    #[test]
    fn distance_is_zero_inside() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.distance_to(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(b.distance_to(Point::new(13.0, 14.0)), 5.0);
        assert_eq!(b.distance_to(Point::new(10.0, 5.0)), 0.0);
    }

    #[test]
    fn touching_bounds_do_not_intersect() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Bounds::new(9.0, 9.0, 1.0, 1.0)));
        assert_eq!(Bounds::centered(Point::new(5.0, 5.0), 10.0), a);
    }
}
