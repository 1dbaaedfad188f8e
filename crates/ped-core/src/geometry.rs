//! Line-segment utilities on the ground plane.
//!
//! Obstacles are walls of infinite height, so every query here ignores `z`
//! and works with the horizontal projection of the endpoints.

use crate::Vector3;

/// A line segment between two ground-plane points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start: Vector3,
    pub end: Vector3,
}

impl Segment {
    #[inline]
    pub fn new(start: Vector3, end: Vector3) -> Self {
        Self { start: start.horizontal(), end: end.horizontal() }
    }

    #[inline]
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Vector3::planar(x1, y1), Vector3::planar(x2, y2))
    }

    #[inline]
    pub fn direction(&self) -> Vector3 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// `true` if both endpoints coincide (a point obstacle).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction().length_squared() == 0.0
    }

    /// Unit normal, rotated 90° counter-clockwise from the direction.
    ///
    /// Zero for a degenerate segment.
    pub fn normal(&self) -> Vector3 {
        let d = self.direction().normalized();
        Vector3::planar(-d.y, d.x)
    }

    /// The point on the segment nearest to `p` (horizontal projection).
    pub fn closest_point(&self, p: Vector3) -> Vector3 {
        let d = self.direction();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return self.start;
        }
        let t = ((p.horizontal() - self.start).dot(d) / len2).clamp(0.0, 1.0);
        self.start + d * t
    }

    /// Horizontal distance from `p` to the segment.
    #[inline]
    pub fn distance_to(&self, p: Vector3) -> f64 {
        self.closest_point(p).horizontal_distance(p)
    }

    /// `true` if this segment and `other` cross or touch.
    ///
    /// Collinear overlapping segments count as intersecting.
    pub fn intersects(&self, other: &Segment) -> bool {
        let (p1, p2, p3, p4) = (self.start, self.end, other.start, other.end);
        let d1 = orient(p3, p4, p1);
        let d2 = orient(p3, p4, p2);
        let d3 = orient(p1, p2, p3);
        let d4 = orient(p1, p2, p4);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && on_segment(p3, p4, p1))
            || (d2 == 0.0 && on_segment(p3, p4, p2))
            || (d3 == 0.0 && on_segment(p1, p2, p3))
            || (d4 == 0.0 && on_segment(p1, p2, p4))
    }

    /// `true` if moving in a straight line `from → to` would cross this
    /// segment or land on it.
    ///
    /// Moves that start on the segment's line never count, so an agent
    /// touching a wall can always slide along it or step away.  Degenerate
    /// segments never block.
    pub fn blocks(&self, from: Vector3, to: Vector3) -> bool {
        let d_from = orient(self.start, self.end, from);
        let d_to = orient(self.start, self.end, to);
        if d_from == 0.0 || (d_to != 0.0 && d_from.signum() == d_to.signum()) {
            return false;
        }
        let e1 = orient(from, to, self.start);
        let e2 = orient(from, to, self.end);
        e1 * e2 <= 0.0
    }

    /// Axis-aligned bounds `([min_x, min_y], [max_x, max_y])`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        (
            [self.start.x.min(self.end.x), self.start.y.min(self.end.y)],
            [self.start.x.max(self.end.x), self.start.y.max(self.end.y)],
        )
    }
}

/// Signed area of the triangle `(a, b, c)` (twice the area).
#[inline]
fn orient(a: Vector3, b: Vector3, c: Vector3) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `p` is collinear with `a-b`; check it lies within the bounding box.
#[inline]
fn on_segment(a: Vector3, b: Vector3, p: Vector3) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
