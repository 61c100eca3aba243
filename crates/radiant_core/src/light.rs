//! Point and directional lights.

use radiant_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

/// Constant, linear and quadratic falloff coefficients for point lights.
const ATTENUATION: (f32, f32, f32) = (0.25, 0.1, 0.01);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightKind {
    Point { position: Vec3 },
    /// Direction the light travels, normalized on construction.
    Directional { direction: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(flatten)]
    pub kind: LightKind,
    pub color: Color,
}

impl Light {
    pub fn point(position: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Point { position },
            color,
        }
    }

    pub fn directional(direction: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Directional {
                direction: direction.normalize(),
            },
            color,
        }
    }

    /// Unit vector from `p` toward the light.
    pub fn direction_from(&self, p: Vec3) -> Vec3 {
        match self.kind {
            LightKind::Point { position } => (position - p).normalize(),
            LightKind::Directional { direction } => -direction,
        }
    }

    /// Distance a shadow ray from `p` may travel before reaching the light.
    pub fn distance_from(&self, p: Vec3) -> f32 {
        match self.kind {
            LightKind::Point { position } => position.distance(p),
            LightKind::Directional { .. } => f32::INFINITY,
        }
    }

    /// Falloff factor at `distance`, `min(1, 1/(c1 + c2*d + c3*d^2))` for
    /// point lights and 1 for directional ones.
    pub fn attenuation(&self, distance: f32) -> f32 {
        match self.kind {
            LightKind::Point { .. } => {
                let (c1, c2, c3) = ATTENUATION;
                (1.0 / (c1 + c2 * distance + c3 * distance * distance)).min(1.0)
            }
            LightKind::Directional { .. } => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light() {
        let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Color::ONE);

        assert_eq!(light.direction_from(Vec3::ZERO), Vec3::Y);
        assert_eq!(light.distance_from(Vec3::new(0.0, 1.0, 0.0)), 9.0);
        // Close lights saturate at 1
        assert_eq!(light.attenuation(0.5), 1.0);
        let expected = 1.0 / (0.25 + 0.9 + 0.81);
        assert!((light.attenuation(9.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_directional_light() {
        let light = Light::directional(Vec3::new(0.0, -2.0, 0.0), Color::ONE);

        assert_eq!(light.direction_from(Vec3::ZERO), Vec3::Y);
        assert_eq!(light.distance_from(Vec3::ZERO), f32::INFINITY);
        assert_eq!(light.attenuation(1000.0), 1.0);
    }

    #[test]
    fn test_light_json() {
        let light: Light =
            serde_json::from_str(r#"{ "type": "point", "position": [1.0, 2.0, 3.0], "color": [1.0, 1.0, 1.0] }"#)
                .unwrap();
        assert_eq!(light.kind, LightKind::Point { position: Vec3::new(1.0, 2.0, 3.0) });
    }
}
