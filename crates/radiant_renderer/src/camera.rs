//! Ray computers: map a point on the image to a primary ray.

use radiant_core::{CameraDesc, LensParams};
use radiant_math::{Plane, Ray, Vec3};
use rand::{Rng, RngCore};

/// Generates the primary ray for image coordinates `(sx, sy)` in `[0, 1]`,
/// with `(0, 0)` at the bottom-left corner.
pub trait RayComputer: Send + Sync {
    fn compute_ray(&self, sx: f32, sy: f32, rng: &mut dyn RngCore) -> Ray;
}

/// Orthonormal camera frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// View direction.
    view: Vec3,
    /// Image right.
    right: Vec3,
    /// Image up.
    up: Vec3,
}

impl Frame {
    fn new(desc: &CameraDesc) -> Self {
        let view = desc.direction.normalize();
        let up = (desc.up - view * view.dot(desc.up)).normalize();
        let right = view.cross(up);
        Self {
            view,
            right,
            up: right.cross(view),
        }
    }

    /// Half extents of the image plane at `distance` from the eye.
    fn half_extents(&self, desc: &CameraDesc, distance: f32, aspect: f32) -> (Vec3, Vec3) {
        let x = self.right * distance * (desc.vertical_fov * aspect / 2.0).tan();
        let y = self.up * distance * (desc.vertical_fov / 2.0).tan();
        (x, y)
    }
}

/// Ideal pinhole camera.
#[derive(Debug, Clone, Copy)]
pub struct PinholeCamera {
    eye: Vec3,
    /// Center of the image plane.
    center: Vec3,
    half_x: Vec3,
    half_y: Vec3,
}

impl PinholeCamera {
    pub fn new(desc: &CameraDesc, aspect: f32) -> Self {
        let frame = Frame::new(desc);
        let (half_x, half_y) = frame.half_extents(desc, desc.focal_distance, aspect);
        Self {
            eye: desc.position,
            center: desc.position + frame.view * desc.focal_distance,
            half_x,
            half_y,
        }
    }
}

impl RayComputer for PinholeCamera {
    fn compute_ray(&self, sx: f32, sy: f32, _rng: &mut dyn RngCore) -> Ray {
        let p = self.center + self.half_x * (2.0 * sx - 1.0) + self.half_y * (2.0 * sy - 1.0);
        Ray::new(self.eye, p - self.eye)
    }
}

/// Thin lens with a round aperture. Points on the focal plane are sharp;
/// everything else blurs as the ray origin moves across the aperture.
#[derive(Debug, Clone, Copy)]
pub struct LensCamera {
    lens_center: Vec3,
    /// Center of the image plane, behind the lens.
    image_center: Vec3,
    half_x: Vec3,
    half_y: Vec3,
    right: Vec3,
    up: Vec3,
    focal_plane: Plane,
    radius: f32,
}

impl LensCamera {
    pub fn new(desc: &CameraDesc, lens: &LensParams, aspect: f32) -> Self {
        let frame = Frame::new(desc);
        let (half_x, half_y) = frame.half_extents(desc, lens.image_distance, aspect);
        let focus = desc.position + frame.view * (desc.focal_distance + lens.focal_offset);
        Self {
            lens_center: desc.position,
            image_center: desc.position - frame.view * lens.image_distance,
            half_x,
            half_y,
            right: frame.right,
            up: frame.up,
            focal_plane: Plane::new(frame.view, focus),
            radius: lens.radius.abs(),
        }
    }
}

impl RayComputer for LensCamera {
    fn compute_ray(&self, sx: f32, sy: f32, rng: &mut dyn RngCore) -> Ray {
        // The image behind the lens is upside down.
        let p = self.image_center
            + self.half_x * (2.0 * (1.0 - sx) - 1.0)
            + self.half_y * (2.0 * (1.0 - sy) - 1.0);
        let chief = Ray::new(self.lens_center, self.lens_center - p);
        let Some(t) = self.focal_plane.intersect(&chief) else {
            return chief;
        };
        let focus = chief.at(t);

        if self.radius <= 0.0 {
            return chief;
        }
        // Uniform point on the aperture disk.
        let r = self.radius * rng.gen::<f32>().sqrt();
        let theta = 2.0 * std::f32::consts::PI * rng.gen::<f32>();
        let origin = self.lens_center + self.right * (r * theta.cos()) + self.up * (r * theta.sin());
        Ray::new(origin, focus - origin)
    }
}

/// Ray computer for a scene camera: a lens camera when lens settings are
/// present, a pinhole otherwise.
pub fn ray_computer(desc: &CameraDesc, aspect: f32) -> Box<dyn RayComputer> {
    match &desc.lens {
        Some(lens) => Box::new(LensCamera::new(desc, lens, aspect)),
        None => Box::new(PinholeCamera::new(desc, aspect)),
    }
}
