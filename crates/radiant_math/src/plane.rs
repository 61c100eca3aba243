use crate::{Ray, Vec3};

/// An infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
    d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            point,
            d: normal.dot(point),
        }
    }

    /// Distance along the ray to the plane. Parallel rays and planes behind
    /// the origin report no hit.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let t = (self.d - self.normal.dot(ray.origin)) / self.normal.dot(ray.direction);
        if t.is_infinite() || t.is_nan() || t.is_sign_negative() {
            None
        } else {
            Some(t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_intersect() {
        let plane = Plane::new(Vec3::Z, Vec3::new(0.0, 0.0, 3.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(plane.intersect(&ray), Some(3.0));

        // Behind the origin
        let away = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(plane.intersect(&away), None);

        // Parallel
        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(plane.intersect(&parallel), None);
    }
}
