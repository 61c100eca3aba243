//! Camera description as handed over by a scene file.

use radiant_math::Vec3;
use serde::{Deserialize, Serialize};

/// Thin-lens settings. Without them the camera is a pinhole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensParams {
    /// Aperture radius.
    pub radius: f32,
    /// Distance from the image plane to the lens.
    pub image_distance: f32,
    /// Added to the camera's focal distance to place the plane in focus.
    pub focal_offset: f32,
}

impl Default for LensParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            image_distance: 1.0,
            focal_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    pub position: Vec3,
    /// View direction.
    pub direction: Vec3,
    /// Up vector, orthogonal to `direction`.
    pub up: Vec3,
    pub focal_distance: f32,
    /// Vertical field of view in radians.
    pub vertical_fov: f32,
    #[serde(default)]
    pub lens: Option<LensParams>,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            focal_distance: 1.0,
            vertical_fov: std::f32::consts::FRAC_PI_4,
            lens: None,
        }
    }
}

impl CameraDesc {
    /// Returns a copy with unit `direction` and `up`, or `None` when the
    /// basis is degenerate.
    pub fn normalized(&self) -> Option<Self> {
        let direction = self.direction.try_normalize()?;
        let up = self.up.try_normalize()?;
        if direction.cross(up).length_squared() < f32::EPSILON {
            return None;
        }
        Some(Self {
            direction,
            up,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_normalized() {
        let cam = CameraDesc {
            direction: Vec3::new(0.0, 0.0, -4.0),
            up: Vec3::new(0.0, 2.0, 0.0),
            ..Default::default()
        };
        let n = cam.normalized().unwrap();
        assert_eq!(n.direction, Vec3::NEG_Z);
        assert_eq!(n.up, Vec3::Y);
    }

    #[test]
    fn test_camera_degenerate_basis() {
        let cam = CameraDesc {
            up: Vec3::NEG_Z,
            ..Default::default()
        };
        assert!(cam.normalized().is_none());

        let zero = CameraDesc {
            direction: Vec3::ZERO,
            ..Default::default()
        };
        assert!(zero.normalized().is_none());
    }
}
