use glam::Vec2;

/// Tolerance for "equal" and "parallel" tests.
pub const EPSILON: f32 = 1.0e-4;

/// Component-wise tolerant equality for points and vectors.
#[inline]
pub fn approx_eq(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

/// Right-hand perpendicular `(v, -u)`. In y-down space this turns a
/// left-to-right direction into an upward one.
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// 2D cross product.
#[inline]
pub fn perp_dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Result of a segment/segment test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Intersection {
    Disjoint,
    /// Skew segments crossing, or a degenerate point segment lying on the other.
    Point(Vec2),
    /// Collinear segments meeting in exactly one point.
    CollinearPoint(Vec2),
    /// Collinear overlap, expressed along the second segment: `.0` is nearest its `p0`.
    Segment(Vec2, Vec2),
}

/// Directed segment with an outward unit normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub p0: Vec2,
    pub p1: Vec2,
    pub normal: Vec2,
}

impl Segment {
    pub fn new(p0: Vec2, p1: Vec2) -> Self {
        Self { p0, p1, normal: perp(p1 - p0).normalize_or_zero() }
    }

    pub fn length(&self) -> f32 {
        (self.p1 - self.p0).length()
    }

    /// Same points, opposite direction and normal.
    pub fn flipped(&self) -> Self {
        Self { p0: self.p1, p1: self.p0, normal: -self.normal }
    }

    pub fn translated(&self, by: Vec2) -> Self {
        Self { p0: self.p0 + by, p1: self.p1 + by, normal: self.normal }
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let v = self.p1 - self.p0;
        let w = p - self.p0;

        let c1 = w.dot(v);
        if c1 <= 0.0 {
            return self.p0;
        }
        let c2 = v.dot(v);
        if c2 <= c1 {
            return self.p1;
        }
        self.p0 + v * (c1 / c2)
    }

    pub fn dist(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    pub fn intersects_circle(&self, c: &Circle) -> bool {
        self.dist(c.center) <= c.radius
    }

    /// True when `p` is strictly on the normal side.
    pub fn faces(&self, p: Vec2) -> bool {
        (p - self.p0).dot(self.normal) > 0.0
    }

    /// Classify how `self` meets `other`.
    pub fn intersect(&self, other: &Segment) -> Intersection {
        let u = self.p1 - self.p0;
        let v = other.p1 - other.p0;
        let w = self.p0 - other.p0;
        let d = perp_dot(u, v);

        if d.abs() < EPSILON {
            // parallel, or one of them is a point
            if perp_dot(u, w).abs() > EPSILON || perp_dot(v, w).abs() > EPSILON {
                return Intersection::Disjoint;
            }

            let du = u.dot(u);
            let dv = v.dot(v);
            if du == 0.0 && dv == 0.0 {
                return if approx_eq(self.p0, other.p0) {
                    Intersection::Point(self.p0)
                } else {
                    Intersection::Disjoint
                };
            }
            if du == 0.0 {
                return if other.spans(self.p0) { Intersection::Point(self.p0) } else { Intersection::Disjoint };
            }
            if dv == 0.0 {
                return if self.spans(other.p0) { Intersection::Point(other.p0) } else { Intersection::Disjoint };
            }

            // collinear: parametrize self's endpoints along other
            let w2 = self.p1 - other.p0;
            let (mut t0, mut t1) = if v.x != 0.0 { (w.x / v.x, w2.x / v.x) } else { (w.y / v.y, w2.y / v.y) };
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            if t0 > 1.0 || t1 < 0.0 {
                return Intersection::Disjoint;
            }
            let t0 = t0.max(0.0);
            let t1 = t1.min(1.0);

            let a = other.p0 + v * t0;
            if (t1 - t0).abs() * v.length() < EPSILON {
                return Intersection::CollinearPoint(a);
            }
            return Intersection::Segment(a, other.p0 + v * t1);
        }

        // skew
        let si = perp_dot(v, w) / d;
        if !(0.0..=1.0).contains(&si) {
            return Intersection::Disjoint;
        }
        let ti = perp_dot(u, w) / d;
        if !(0.0..=1.0).contains(&ti) {
            return Intersection::Disjoint;
        }
        Intersection::Point(self.p0 + u * si)
    }

    /// Bounding-box test for a point already known to be collinear.
    fn spans(&self, p: Vec2) -> bool {
        if self.p0.x != self.p1.x {
            (self.p0.x <= p.x && p.x <= self.p1.x) || (self.p0.x >= p.x && p.x >= self.p1.x)
        } else {
            (self.p0.y <= p.y && p.y <= self.p1.y) || (self.p0.y >= p.y && p.y >= self.p1.y)
        }
    }

    /// `other` lies entirely on `self`.
    pub fn contains_segment(&self, other: &Segment) -> bool {
        match self.intersect(other) {
            Intersection::Segment(a, b) => approx_eq(a, other.p0) && approx_eq(b, other.p1),
            _ => false,
        }
    }

    /// Collinear overlap of positive length.
    pub fn overlaps(&self, other: &Segment) -> bool {
        matches!(self.intersect(other), Intersection::Segment(..))
    }

    pub fn same_geometry(&self, other: &Segment) -> bool {
        approx_eq(self.p0, other.p0) && approx_eq(self.p1, other.p1)
    }
}
