//! Triangle primitive for ray tracing.
//!
//! Intersection projects the triangle onto the plane spanned by the two
//! axes other than its normal's dominant axis and solves the 2D barycentric
//! system there.

use crate::primitive::SurfaceHit;
use radiant_core::Material;
use radiant_math::{Aabb, Axis, Ray, Vec2, Vec3};

/// How shading normals are produced across a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleNormals {
    /// Same geometric normal everywhere.
    Face(Vec3),
    /// Interpolated from unit vertex normals.
    Vertex([Vec3; 3]),
}

impl TriangleNormals {
    /// Normal at barycentric `(alpha, beta)`.
    pub fn at(&self, alpha: f32, beta: f32) -> Vec3 {
        match self {
            TriangleNormals::Face(n) => *n,
            TriangleNormals::Vertex(n) => {
                let [w0, w1, w2] = weights(alpha, beta);
                (n[0] * w0 + n[1] * w1 + n[2] * w2).normalize_or(n[0])
            }
        }
    }

    /// Normal at vertex `i`.
    pub fn vertex(&self, i: usize) -> Vec3 {
        match self {
            TriangleNormals::Face(n) => *n,
            TriangleNormals::Vertex(n) => n[i],
        }
    }
}

/// How materials are resolved across a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleMaterials {
    /// The owning object's first material.
    Object,
    /// Indices into the owning object's material list, one per vertex.
    Vertex([usize; 3]),
}

impl TriangleMaterials {
    /// Material at barycentric `(alpha, beta)`, resolved against the
    /// owning object's material list.
    pub fn at(&self, materials: &[Material], alpha: f32, beta: f32) -> Material {
        match self {
            TriangleMaterials::Object => materials[0],
            TriangleMaterials::Vertex(ids) => {
                let [w0, w1, w2] = weights(alpha, beta);
                Material::interpolate([
                    (&materials[ids[0]], w0),
                    (&materials[ids[1]], w1),
                    (&materials[ids[2]], w2),
                ])
            }
        }
    }

    /// Material at vertex `i`.
    pub fn vertex(&self, materials: &[Material], i: usize) -> Material {
        match self {
            TriangleMaterials::Object => materials[0],
            TriangleMaterials::Vertex(ids) => materials[ids[i]],
        }
    }
}

/// Vertex weights for barycentric `(alpha, beta)`.
#[inline]
fn weights(alpha: f32, beta: f32) -> [f32; 3] {
    [1.0 - alpha - beta, alpha, beta]
}

/// A triangle primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    /// Unit geometric normal from the winding `(b - a) x (c - a)`.
    pub face_normal: Vec3,
    /// Plane offset so that `dot(n, p) + d == 0` on the triangle.
    d: f32,
    /// Axis dropped when projecting to 2D.
    dominant: Axis,
    pub normals: TriangleNormals,
    pub materials: TriangleMaterials,
    pub uvs: Option<[Vec2; 3]>,
}

impl Triangle {
    /// Create a triangle with a face normal and the object's material.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let face_normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            vertices: [a, b, c],
            face_normal,
            d: (-a).dot(face_normal),
            dominant: Axis::dominant(face_normal),
            normals: TriangleNormals::Face(face_normal),
            materials: TriangleMaterials::Object,
            uvs: None,
        }
    }

    pub fn with_normals(mut self, normals: TriangleNormals) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_materials(mut self, materials: TriangleMaterials) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_uvs(mut self, uvs: Option<[Vec2; 3]>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.vertices)
    }

    /// Texture coordinates at barycentric `(alpha, beta)`, zero when the
    /// triangle has none.
    pub fn uv_at(&self, alpha: f32, beta: f32) -> Vec2 {
        match self.uvs {
            Some(uv) => {
                let [w0, w1, w2] = weights(alpha, beta);
                uv[0] * w0 + uv[1] * w1 + uv[2] * w2
            }
            None => Vec2::ZERO,
        }
    }

    /// Point at barycentric `(alpha, beta)`.
    pub fn point_at(&self, alpha: f32, beta: f32) -> Vec3 {
        let [w0, w1, w2] = weights(alpha, beta);
        self.vertices[0] * w0 + self.vertices[1] * w1 + self.vertices[2] * w2
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let n = self.face_normal;
        let denom = n.dot(ray.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = -(self.d + n.dot(ray.origin)) / denom;
        if t.is_sign_negative() || !t.is_finite() {
            return None;
        }

        let (i1, i2) = self.dominant.others();
        let (i1, i2) = (i1.index(), i2.index());
        let p = ray.at(t);
        let [a, b, c] = self.vertices;

        let u0 = p[i1] - a[i1];
        let v0 = p[i2] - a[i2];
        let u1 = b[i1] - a[i1];
        let u2 = c[i1] - a[i1];
        let v1 = b[i2] - a[i2];
        let v2 = c[i2] - a[i2];

        let (alpha, beta);
        if u1.abs() < f32::EPSILON {
            beta = u0 / u2;
            if !(0.0..=1.0).contains(&beta) {
                return None;
            }
            alpha = (v0 - beta * v2) / v1;
        } else {
            beta = (v0 * u1 - u0 * v1) / (v2 * u1 - u2 * v1);
            if !(0.0..=1.0).contains(&beta) {
                return None;
            }
            alpha = (u0 - beta * u2) / u1;
        }

        if !(alpha >= 0.0 && alpha + beta <= 1.0) {
            return None;
        }

        Some(SurfaceHit {
            t,
            normal: self.normals.at(alpha, beta),
            uv: self.uv_at(alpha, beta),
            barycentric: Vec2::new(alpha, beta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiant_math::Color;

    #[test]
    fn test_triangle_hit_and_miss() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);

        let hit = tri.intersect(&Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Z);

        // Outside the simplex
        assert!(tri.intersect(&Ray::new(Vec3::new(0.8, 0.8, 1.0), Vec3::NEG_Z)).is_none());
        // Parallel to the plane
        assert!(tri.intersect(&Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::X)).is_none());
        // Plane behind the origin
        assert!(tri.intersect(&Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::Z)).is_none());
    }

    #[test]
    fn test_triangle_barycentric_reconstructs_point() {
        let tri = Triangle::new(
            Vec3::new(-1.0, 0.5, 2.0),
            Vec3::new(3.0, 1.0, -1.0),
            Vec3::new(0.5, 4.0, 0.0),
        );
        let target = tri.point_at(0.3, 0.2);
        let origin = Vec3::new(5.0, -3.0, 7.0);
        let hit = tri.intersect(&Ray::new(origin, target - origin)).unwrap();

        let (alpha, beta) = (hit.barycentric.x, hit.barycentric.y);
        assert!((alpha - 0.3).abs() < 1e-4);
        assert!((beta - 0.2).abs() < 1e-4);
        let w = weights(alpha, beta);
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_edge_inclusive() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));

        // On the a-b edge
        let hit = tri.intersect(&Ray::new(Vec3::new(1.0, 0.0, 1.0), Vec3::NEG_Z));
        assert!(hit.is_some());
        // On the hypotenuse
        let hit = tri.intersect(&Ray::new(Vec3::new(1.0, 1.0, 1.0), Vec3::NEG_Z));
        assert!(hit.is_some());
    }

    #[test]
    fn test_triangle_vertex_normals_and_uvs() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)
            .with_normals(TriangleNormals::Vertex([Vec3::Z, Vec3::Z, Vec3::X]))
            .with_uvs(Some([Vec2::ZERO, Vec2::X, Vec2::Y]));

        assert_eq!(tri.normals.vertex(2), Vec3::X);
        let n = tri.normals.at(0.0, 0.5);
        assert!((n - Vec3::new(1.0, 0.0, 1.0).normalize()).length() < 1e-6);
        assert_eq!(tri.uv_at(0.25, 0.5), Vec2::new(0.25, 0.5));
    }

    #[test]
    fn test_triangle_vertex_materials() {
        let materials = vec![
            Material::diffuse(Color::X),
            Material::diffuse(Color::Y),
            Material::diffuse(Color::Z),
        ];
        let by_vertex = TriangleMaterials::Vertex([2, 1, 0]);

        assert_eq!(by_vertex.vertex(&materials, 0).diffuse, Color::Z);
        let m = by_vertex.at(&materials, 0.5, 0.25);
        assert!((m.diffuse - Color::new(0.25, 0.5, 0.25)).length() < 1e-6);
        assert_eq!(TriangleMaterials::Object.at(&materials, 0.3, 0.3).diffuse, Color::X);
    }

    #[test]
    fn test_triangle_offset_ray_does_not_rehit() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::new(0.1, 0.0, -1.0));
        let hit = tri.intersect(&ray).unwrap();
        let next = Ray::offset(ray.at(hit.t), ray.direction);
        assert!(tri.intersect(&next).is_none());
    }
}
