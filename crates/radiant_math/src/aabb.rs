use crate::{Axis, Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box used by the kd-tree.
///
/// Stored as its two corner points. Boxes built from real geometry satisfy
/// `min <= max` on every axis; flat boxes (zero extent on an axis) are
/// valid and are not padded, since the tree builder treats them as planar
/// events.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box. Merging anything into it yields that thing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point of the iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, p| Self { min: acc.min.min(p), max: acc.max.max(p) })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Get the extent along one axis.
    pub fn axis_interval(&self, axis: Axis) -> Interval {
        Interval::new(self.min[axis.index()], self.max[axis.index()])
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// True when `p` lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Two boxes overlap iff their intervals overlap on every axis.
    /// Touching faces count as overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d1 = other.min - self.max;
        let d2 = self.min - other.max;
        !(d1.cmpgt(Vec3::ZERO).any() || d2.cmpgt(Vec3::ZERO).any())
    }

    /// Slab test. Returns the `[t_enter, t_exit]` span of the ray inside the
    /// box, with `t_enter` clamped to zero when the origin is inside.
    ///
    /// The near corner on each axis is picked from the sign bit of the
    /// direction, so negative zero behaves like a negative direction.
    pub fn intersect(&self, ray: &Ray) -> Option<Interval> {
        let bounds = [self.min, self.max];
        let o = ray.origin;
        let inv = ray.inv_direction;
        let sign = |v: f32| v.is_sign_negative() as usize;

        let sx = sign(ray.direction.x);
        let mut t_min = (bounds[sx].x - o.x) * inv.x;
        let mut t_max = (bounds[1 - sx].x - o.x) * inv.x;

        let sy = sign(ray.direction.y);
        let ty_min = (bounds[sy].y - o.y) * inv.y;
        let ty_max = (bounds[1 - sy].y - o.y) * inv.y;
        if t_min > ty_max || ty_min > t_max {
            return None;
        }
        if ty_min > t_min {
            t_min = ty_min;
        }
        if ty_max < t_max {
            t_max = ty_max;
        }

        let sz = sign(ray.direction.z);
        let tz_min = (bounds[sz].z - o.z) * inv.z;
        let tz_max = (bounds[1 - sz].z - o.z) * inv.z;
        if t_min > tz_max || tz_min > t_max {
            return None;
        }
        if tz_min > t_min {
            t_min = tz_min;
        }
        if tz_max < t_max {
            t_max = tz_max;
        }

        if t_max.is_sign_negative() {
            return None;
        }
        if t_min.is_sign_negative() {
            t_min = 0.0;
        }
        Some(Interval::new(t_min, t_max))
    }

    /// `2(xy + xz + yz)`. Only used as a relative cost metric.
    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Cut the box with the plane `axis = position`.
    pub fn split(&self, axis: Axis, position: f32) -> (Aabb, Aabb) {
        let mut left = *self;
        let mut right = *self;
        left.max[axis.index()] = position;
        right.min[axis.index()] = position;
        (left, right)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}
