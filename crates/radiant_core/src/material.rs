//! Phong-style surface material.

use radiant_math::Color;
use serde::{Deserialize, Serialize};

/// Surface response used by both the Whitted tracer and the radiosity solver.
///
/// `ktran` is the transmission coefficient: 0 is opaque, 1 lets all light
/// through. `emissive` is only read by radiosity, where a patch's initial
/// energy is `diffuse * emissive`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse: Color,
    pub ambient: Color,
    pub specular: Color,
    pub emissive: Color,
    pub shininess: f32,
    pub ktran: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::splat(0.5),
            ambient: Color::ZERO,
            specular: Color::ZERO,
            emissive: Color::ZERO,
            shininess: 0.0,
            ktran: 0.0,
        }
    }
}

impl Material {
    /// Create an opaque, purely diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    /// Weighted sum of materials. Weights are expected to sum to one.
    pub fn interpolate<'a>(weighted: impl IntoIterator<Item = (&'a Material, f32)>) -> Material {
        weighted.into_iter().fold(Material::zero(), |acc, (m, w)| Material {
            diffuse: acc.diffuse + m.diffuse * w,
            ambient: acc.ambient + m.ambient * w,
            specular: acc.specular + m.specular * w,
            emissive: acc.emissive + m.emissive * w,
            shininess: acc.shininess + m.shininess * w,
            ktran: acc.ktran + m.ktran * w,
        })
    }

    fn zero() -> Self {
        Self {
            diffuse: Color::ZERO,
            ambient: Color::ZERO,
            specular: Color::ZERO,
            emissive: Color::ZERO,
            shininess: 0.0,
            ktran: 0.0,
        }
    }
}
