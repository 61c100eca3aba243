//! Shadow rays with transmissive occluders.

use crate::kd_tree::TraversalStack;
use crate::scene::Scene;
use radiant_core::Light;
use radiant_math::{Color, Ray, Vec3, RT_RAY_EPSILON};

/// Walks from a surface point toward a light, filtering the light's color
/// through every transmissive surface on the way.
#[derive(Clone, Copy)]
pub struct ShadowTracer<'a> {
    scene: &'a Scene,
}

impl<'a> ShadowTracer<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// Light arriving at `point` from `light`. Zero as soon as an opaque
    /// surface is found between the two.
    pub fn trace(&self, point: Vec3, light: &Light, stack: &mut TraversalStack) -> Color {
        let direction = light.direction_from(point);
        let distance = light.distance_from(point);

        let mut shadow = light.color * light.attenuation(distance);
        let mut ray = Ray::offset(point, direction);
        let mut remaining = distance - RT_RAY_EPSILON;

        while let Some(hit) = self.scene.intersect(&ray, stack) {
            if hit.t > remaining {
                break;
            }

            let object = self.scene.object(hit.object);
            let params = hit.shader_params();
            if object.accepts(&params) {
                let material = object.mutate(hit.material, &params);
                if material.ktran < f32::EPSILON {
                    return Color::ZERO;
                }
                shadow *= material.diffuse * material.ktran;
            }

            ray = Ray::offset(hit.position, direction);
            remaining -= hit.t + RT_RAY_EPSILON;
        }
        shadow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderBindings;
    use radiant_core::{Material, ObjectDesc, SceneDescription};

    fn scene_with(objects: Vec<ObjectDesc>) -> Scene {
        let desc = SceneDescription {
            objects,
            ..Default::default()
        };
        Scene::build(&desc, &ShaderBindings::new()).unwrap()
    }

    fn glass(diffuse: Color, ktran: f32) -> Material {
        Material {
            diffuse,
            ktran,
            ..Default::default()
        }
    }

    #[test]
    fn test_unoccluded_point_light_is_attenuated() {
        let scene = scene_with(vec![]);
        let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Color::ONE);
        let mut stack = TraversalStack::new();

        let shadow = ShadowTracer::new(&scene).trace(Vec3::new(0.0, 1.0, 0.0), &light, &mut stack);
        let expected = 1.0 / (0.25 + 0.9 + 0.81);
        assert!((shadow - Color::splat(expected)).length() < 1e-5);
    }

    #[test]
    fn test_opaque_occluder_blocks() {
        let scene = scene_with(vec![ObjectDesc::sphere(
            Vec3::new(0.0, 5.0, 0.0),
            1.0,
            Material::default(),
        )]);
        let light = Light::directional(Vec3::NEG_Y, Color::ONE);
        let mut stack = TraversalStack::new();

        let shadow = ShadowTracer::new(&scene).trace(Vec3::ZERO, &light, &mut stack);
        assert_eq!(shadow, Color::ZERO);
    }

    #[test]
    fn test_transmissive_occluder_filters_twice() {
        // The shadow ray enters and leaves the sphere: two filters.
        let scene = scene_with(vec![ObjectDesc::sphere(
            Vec3::new(0.0, 5.0, 0.0),
            1.0,
            glass(Color::new(1.0, 0.5, 1.0), 0.5),
        )]);
        let light = Light::directional(Vec3::NEG_Y, Color::ONE);
        let mut stack = TraversalStack::new();

        let shadow = ShadowTracer::new(&scene).trace(Vec3::ZERO, &light, &mut stack);
        assert!((shadow - Color::new(0.25, 0.0625, 0.25)).length() < 1e-5);
    }

    #[test]
    fn test_occluder_beyond_point_light_ignored() {
        let scene = scene_with(vec![ObjectDesc::sphere(
            Vec3::new(0.0, 8.0, 0.0),
            1.0,
            Material::default(),
        )]);
        let light = Light::point(Vec3::new(0.0, 4.0, 0.0), Color::ONE);
        let mut stack = TraversalStack::new();

        let shadow = ShadowTracer::new(&scene).trace(Vec3::ZERO, &light, &mut stack);
        assert!(shadow.x > 0.0);
    }
}
