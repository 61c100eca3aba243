//! Scene primitives: the unit the kd-tree partitions.

use crate::sphere::Sphere;
use crate::triangle::Triangle;
use radiant_core::Material;
use radiant_math::{Aabb, Ray, Vec2, Vec3};

/// Index of an object in `Scene::objects`.
pub type ObjectId = usize;
/// Index of a primitive in `Scene::primitives`.
pub type PrimitiveId = usize;

/// Result of a ray/primitive test, before the owning object is consulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: f32,
    pub normal: Vec3,
    pub uv: Vec2,
    /// `(alpha, beta)` on triangles, zero on spheres.
    pub barycentric: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
}

/// A sphere or triangle together with the object that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub object: ObjectId,
    pub shape: Shape,
    /// Cached at construction for tree building.
    pub bounds: Aabb,
}

impl Primitive {
    pub fn new(object: ObjectId, shape: Shape) -> Self {
        let bounds = match &shape {
            Shape::Sphere(s) => s.bounds(),
            Shape::Triangle(t) => t.bounds(),
        };
        Self { object, shape, bounds }
    }

    pub fn sphere(object: ObjectId, sphere: Sphere) -> Self {
        Self::new(object, Shape::Sphere(sphere))
    }

    pub fn triangle(object: ObjectId, triangle: Triangle) -> Self {
        Self::new(object, Shape::Triangle(triangle))
    }

    #[inline]
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        match &self.shape {
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Triangle(t) => t.intersect(ray),
        }
    }

    /// Material at `hit`, resolved against the owning object's materials.
    pub fn material(&self, materials: &[Material], hit: &SurfaceHit) -> Material {
        match &self.shape {
            Shape::Sphere(_) => materials[0],
            Shape::Triangle(t) => t.materials.at(materials, hit.barycentric.x, hit.barycentric.y),
        }
    }
}
