//! Render and radiosity settings.

use serde::{Deserialize, Serialize};

/// Which tracer shades camera rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracerKind {
    /// Direct lighting, shadows, reflection and refraction.
    #[default]
    Whitted,
    /// Diffuse light read back from radiosity patch energies.
    Radiosity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Supersampling grid is `samples x samples` per pixel.
    pub samples: u32,
    /// Recursion limit for reflection and refraction rays.
    pub max_depth: usize,
    pub tracer: TracerKind,
    pub bucket_size: u32,
    /// Render buckets on the rayon pool. Each worker gets its own tracer.
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples: 1,
            max_depth: 5,
            tracer: TracerKind::Whitted,
            bucket_size: 64,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiosityParams {
    /// Target area of a single patch; quads and spheres are subdivided
    /// until their patches are about this size.
    pub patch_area: f32,
    /// Cells along one edge of the hemicube's top face.
    pub hemicube_resolution: usize,
    /// Number of shooting steps run before rendering.
    pub steps: usize,
    /// Blend between neighbouring patches when shading instead of picking
    /// the nearest one.
    pub interpolate: bool,
}

impl Default for RadiosityParams {
    fn default() -> Self {
        Self {
            patch_area: 0.05,
            hemicube_resolution: 512,
            steps: 0,
            interpolate: true,
        }
    }
}
