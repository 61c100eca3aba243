//! Radiant math - vectors, rays and bounding volumes.
//!
//! Vector types come straight from glam; this crate adds the small set of
//! geometric value types shared by the scene description and the tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod axis;
mod interval;
mod plane;
mod ray;

pub use aabb::Aabb;
pub use axis::Axis;
pub use interval::Interval;
pub use plane::Plane;
pub use ray::Ray;

/// Offset applied to secondary ray origins and to every traversal
/// boundary comparison.
pub const RT_RAY_EPSILON: f32 = 10e-4;

/// Linear RGB color.
pub type Color = Vec3;

/// Area of the triangle spanned by three points.
#[inline]
pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a * b, Vec3::new(4.0, 10.0, 18.0));
    }

    #[test]
    fn test_triangle_area() {
        let area = triangle_area(Vec3::ZERO, Vec3::X * 2.0, Vec3::Y * 2.0);
        assert!((area - 2.0).abs() < 1e-6);

        // Collinear points span nothing
        assert_eq!(triangle_area(Vec3::ZERO, Vec3::X, Vec3::X * 2.0), 0.0);
    }
}
