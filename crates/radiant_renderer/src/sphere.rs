//! Sphere primitive for ray tracing.

use crate::primitive::SurfaceHit;
use radiant_math::{Aabb, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }

    /// Both roots of the ray/sphere quadratic, smaller first, or `None` when
    /// the discriminant is negative. A tangent ray yields a double root.
    pub fn roots(&self, ray: &Ray) -> Option<(f32, f32)> {
        let v = ray.origin - self.center;
        let b = 2.0 * ray.direction.dot(v);
        let c = v.dot(v) - self.radius * self.radius;
        let d = b * b - 4.0 * c;
        if d.is_sign_negative() {
            return None;
        }
        let s = d.sqrt();
        Some(((-b - s) / 2.0, (-b + s) / 2.0))
    }

    /// Nearest non-negative root.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let (near, far) = self.roots(ray)?;
        let t = if !near.is_sign_negative() {
            near
        } else if !far.is_sign_negative() {
            far
        } else {
            return None;
        };

        let p = ray.at(t) - self.center;
        Some(SurfaceHit {
            t,
            normal: p.normalize(),
            uv: self.uv(p),
            barycentric: Vec2::ZERO,
        })
    }

    /// Spherical texture coordinates of `p`, given relative to the center.
    /// `u` is longitude from `atan2(x, z)`, `v` latitude from `asin(y / r)`.
    pub fn uv(&self, p: Vec3) -> Vec2 {
        let mut u = p.x.atan2(p.z) / PI;
        if u.is_sign_negative() {
            u += 2.0;
        }
        let v = (p.y / self.radius).clamp(-1.0, 1.0).asin() / PI + 0.5;
        Vec2::new(u / 2.0, v)
    }

    /// Point on the surface at texture coordinates `(u, v)`. Inverse of
    /// [`Sphere::uv`].
    pub fn surface_point(&self, u: f32, v: f32) -> Vec3 {
        let theta = 2.0 * PI * u;
        let phi = PI * (v - 0.5);
        self.center
            + Vec3::new(
                self.radius * theta.sin() * phi.cos(),
                self.radius * phi.sin(),
                self.radius * theta.cos() * phi.cos(),
            )
    }
}
