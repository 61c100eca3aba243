//! Displays radiosity results: each hit shows the energy of the patch
//! under it, plus mirror reflections.

use super::RadiosityScene;
use crate::kd_tree::TraversalStack;
use crate::tracer::{reflect, Tracer};
use radiant_math::{Color, Ray};

pub struct RadiosityTracer<'a> {
    radiosity: &'a RadiosityScene<'a>,
    stack: TraversalStack,
    max_depth: usize,
    interpolate: bool,
}

impl<'a> RadiosityTracer<'a> {
    pub fn new(radiosity: &'a RadiosityScene<'a>, max_depth: usize) -> Self {
        Self {
            radiosity,
            stack: TraversalStack::new(),
            max_depth,
            interpolate: radiosity.params().interpolate,
        }
    }

    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn trace_depth(&mut self, ray: &Ray, depth: usize) -> Color {
        let scene = self.radiosity.scene();
        let mut ray = *ray;
        let (hit, object) = loop {
            let Some(hit) = scene.intersect(&ray, &mut self.stack) else {
                return Color::ZERO;
            };
            let object = scene.object(hit.object);
            if object.accepts(&hit.shader_params()) {
                break (hit, object);
            }
            ray = Ray::offset(hit.position, ray.direction);
        };

        // Primitives without patches show no diffuse light.
        let (mut color, material, normal) =
            match self.radiosity.energy_at(hit.primitive, hit.uv, self.interpolate) {
                Some(energy) => {
                    let patch = self.radiosity.patch(self.radiosity.patch_at(hit.primitive, hit.uv));
                    (energy, patch.material, patch.normal)
                }
                None => (
                    Color::ZERO,
                    object.mutate(hit.material, &hit.shader_params()),
                    hit.normal,
                ),
            };

        if depth + 1 < self.max_depth && material.specular.length_squared() > f32::EPSILON {
            let mirrored = Ray::offset(hit.position, reflect(ray.direction, normal));
            color += material.specular * self.trace_depth(&mirrored, depth + 1);
        }
        color.min(Color::ONE)
    }
}

impl Tracer for RadiosityTracer<'_> {
    fn trace(&mut self, ray: &Ray) -> Color {
        self.trace_depth(ray, 0)
    }
}
