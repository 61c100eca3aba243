//! Tracer interface and the reflection/refraction vector helpers shared
//! by the tracers.

use radiant_math::{Color, Ray, Vec3};

/// Computes the radiance arriving along a camera ray.
pub trait Tracer {
    fn trace(&mut self, ray: &Ray) -> Color;
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - normal * (2.0 * direction.dot(normal))
}

/// Refract `direction` through a surface with unit `normal` facing against
/// it, where `eta` is the ratio of the incident to the transmitted index.
/// Returns `None` on total internal reflection.
pub fn refract(direction: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let i = -direction;
    let ndi = normal.dot(i);
    let det = eta * eta * (1.0 - ndi * ndi);
    if det > 1.0 {
        return None;
    }
    Some(((normal * ndi - i) * eta - normal * (1.0 - det).sqrt()).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_head_on_is_straight() {
        let t = refract(Vec3::NEG_Y, Vec3::Y, 1.0 / 1.5).unwrap();
        assert!((t - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_refract_snell() {
        let theta_i: f32 = 0.5;
        let d = Vec3::new(theta_i.sin(), -theta_i.cos(), 0.0);
        let eta = 1.0 / 1.5;
        let t = refract(d, Vec3::Y, eta).unwrap();

        let sin_t = t.x;
        assert!((sin_t - eta * theta_i.sin()).abs() < 1e-5);
        assert!(t.y < 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at a grazing angle
        let d = Vec3::new(0.9, -0.1, 0.0).normalize();
        assert!(refract(d, Vec3::Y, 1.5).is_none());
    }
}
