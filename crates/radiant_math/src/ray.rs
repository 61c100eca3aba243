use crate::Vec3;

/// A ray in 3D space with origin, unit direction, and reciprocal direction.
///
/// The reciprocal is computed once so slab tests and split-plane crossings
/// become multiplications. Components of the direction that are exactly zero
/// produce infinite reciprocals, which the slab test relies on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Ray starting `RT_RAY_EPSILON` along `direction` from `point`.
    ///
    /// Every secondary ray is created this way so it does not report the
    /// surface it leaves.
    pub fn offset(point: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self::new(point + direction * crate::RT_RAY_EPSILON, direction)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 4.0, 0.0));

        assert_eq!(ray.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ray.direction, Vec3::Y);
        assert_eq!(ray.inv_direction.y, 1.0);
        assert!(ray.inv_direction.x.is_infinite());
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_offset() {
        let ray = Ray::offset(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0));

        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert!((ray.origin.z + crate::RT_RAY_EPSILON).abs() < 1e-9);
    }
}
