//! Hemicube form factors by ray casting.
//!
//! A hemicube of half-width 1 sits on the shooting patch: the top face at
//! distance 1 along the normal and four half-height side faces. Each cell
//! is sampled with one ray through its center and contributes its
//! delta form factor to whichever patch the ray hits.

use std::f32::consts::PI;

use super::{FormFactorOracle, PatchId, RadiosityScene, NULL_PATCH};
use crate::kd_tree::TraversalStack;
use radiant_math::{Ray, Vec3};

/// One hemicube cell: in-face coordinates of its center and its delta form
/// factor.
#[derive(Debug, Clone, Copy)]
struct Cell {
    x: f32,
    y: f32,
    weight: f32,
}

pub struct RayCastHemicube {
    resolution: usize,
    top: Vec<Cell>,
    /// Upper half of a side face; `y` is the elevation above the patch.
    side: Vec<Cell>,
    stack: TraversalStack,
}

impl RayCastHemicube {
    /// Hemicube with `resolution x resolution` cells on the top face.
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution.max(2);
        let res = resolution as f32;
        let da = 4.0 / (res * res);
        let coord = |i: usize| (i as f32 + 0.5) / res * 2.0 - 1.0;

        let mut top = Vec::with_capacity(resolution * resolution);
        let mut side = Vec::with_capacity(resolution * resolution / 2);
        for j in 0..resolution {
            for i in 0..resolution {
                let (x, y) = (coord(i), coord(j));
                let r = x * x + y * y + 1.0;
                top.push(Cell {
                    x,
                    y,
                    weight: da / (PI * r * r),
                });
                if j >= resolution / 2 && y > 0.0 {
                    side.push(Cell {
                        x,
                        y,
                        weight: da * y / (PI * r * r),
                    });
                }
            }
        }
        Self {
            resolution,
            top,
            side,
            stack: TraversalStack::new(),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Sum of all cell weights. Approaches one as the resolution grows.
    pub fn kernel_sum(&self) -> f32 {
        self.top.iter().map(|c| c.weight).sum::<f32>() + 4.0 * self.side.iter().map(|c| c.weight).sum::<f32>()
    }
}

impl FormFactorOracle for RayCastHemicube {
    fn form_factors(&mut self, radiosity: &RadiosityScene<'_>, shooter: PatchId, out: &mut [f32]) {
        let patch = radiosity.patch(shooter);
        let center = patch.center();
        let n = patch.normal;
        let dir = patch.surface_dir();
        let t = (dir - n * n.dot(dir))
            .try_normalize()
            .unwrap_or_else(|| n.any_orthonormal_vector());
        let b = n.cross(t);

        let scene = radiosity.scene();
        let stack = &mut self.stack;
        let mut cast = |direction: Vec3, weight: f32| {
            let ray = Ray::offset(center, direction);
            let target = scene
                .intersect(&ray, stack)
                .map_or(NULL_PATCH, |hit| radiosity.patch_at(hit.primitive, hit.uv));
            out[target] += weight;
        };

        for cell in &self.top {
            cast(n + t * cell.x + b * cell.y, cell.weight);
        }
        for (face, across) in [(t, b), (-t, b), (b, t), (-b, t)] {
            for cell in &self.side {
                cast(face + across * cell.x + n * cell.y, cell.weight);
            }
        }
    }
}
