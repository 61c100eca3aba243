//! Whitted-style recursive shading: direct light with shadows, mirror
//! reflection and refraction through nested transmissive objects.

use crate::kd_tree::TraversalStack;
use crate::primitive::ObjectId;
use crate::scene::{Intersection, Object, Scene};
use crate::shadow_tracer::ShadowTracer;
use crate::tracer::{reflect, refract, Tracer};
use radiant_math::{Color, Ray};

/// Refractive index outside every object.
pub const AIR_INDEX: f32 = 1.0;
/// Refractive index inside any transmissive object.
pub const GLASS_INDEX: f32 = 1.5;

/// Transmissive objects the ray is currently inside, innermost last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediumStack(Vec<ObjectId>);

impl MediumStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<ObjectId> {
        self.0.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Stack after entering `object`.
    pub fn entered(&self, object: ObjectId) -> Self {
        let mut next = self.clone();
        next.0.push(object);
        next
    }

    /// Stack after leaving the innermost object.
    pub fn exited(&self) -> Self {
        let mut next = self.clone();
        next.0.pop();
        next
    }

    /// Refractive index of the medium the ray travels in.
    pub fn index(&self) -> f32 {
        if self.0.is_empty() {
            AIR_INDEX
        } else {
            GLASS_INDEX
        }
    }
}

pub struct ObjectTracer<'a> {
    scene: &'a Scene,
    shadows: ShadowTracer<'a>,
    max_depth: usize,
    stack: TraversalStack,
    rays_cast: u64,
}

impl<'a> ObjectTracer<'a> {
    pub fn new(scene: &'a Scene, max_depth: usize) -> Self {
        Self {
            scene,
            shadows: ShadowTracer::new(scene),
            max_depth,
            stack: TraversalStack::new(),
            rays_cast: 0,
        }
    }

    /// Primary and secondary rays traced so far. Shadow rays not included.
    pub fn rays_cast(&self) -> u64 {
        self.rays_cast
    }

    /// Nearest hit the owning object accepts. Rejected hits are stepped
    /// over along the same direction.
    fn accepted_hit(&mut self, ray: &Ray) -> Option<(Intersection, &'a Object)> {
        let scene = self.scene;
        let mut ray = *ray;
        loop {
            let hit = scene.intersect(&ray, &mut self.stack)?;
            let object = scene.object(hit.object);
            if object.accepts(&hit.shader_params()) {
                return Some((hit, object));
            }
            ray = Ray::offset(hit.position, ray.direction);
        }
    }

    pub fn trace_depth(&mut self, ray: &Ray, depth: usize, media: &MediumStack) -> Color {
        self.rays_cast += 1;
        let Some((hit, object)) = self.accepted_hit(ray) else {
            return Color::ZERO;
        };

        let base = hit.material;
        let mut color = base.ambient * base.diffuse * (1.0 - base.ktran);

        let material = object.mutate(base, &hit.shader_params());
        let inside = media.top() == Some(hit.object);
        let normal = if inside { -hit.normal } else { hit.normal };
        let position = hit.position;

        let scene = self.scene;
        for light in &scene.lights {
            let to_light = light.direction_from(position);
            let n_dot_l = normal.dot(to_light);
            if n_dot_l <= 0.0 {
                continue;
            }
            let shadow = self.shadows.trace(position, light, &mut self.stack);
            if shadow == Color::ZERO {
                continue;
            }

            // Transmitted light replaces the diffuse response.
            let diffuse = material.diffuse * n_dot_l * (1.0 - material.ktran);
            let highlight = reflect(-to_light, normal).dot(-ray.direction).max(0.0);
            let specular = material.specular * highlight.powf(material.shininess * 32.0);
            color += (diffuse + specular) * shadow;
        }

        if depth + 1 < self.max_depth {
            if material.specular.length_squared() > f32::EPSILON {
                let mirrored = Ray::offset(position, reflect(ray.direction, normal));
                color += material.specular * self.trace_depth(&mirrored, depth + 1, media);
            }

            if material.ktran > f32::EPSILON {
                let next = if inside {
                    media.exited()
                } else {
                    media.entered(hit.object)
                };
                let eta = media.index() / next.index();
                if let Some(direction) = refract(ray.direction, normal, eta) {
                    let refracted = Ray::offset(position, direction);
                    color += material.ktran * self.trace_depth(&refracted, depth + 1, &next);
                }
            }
        }

        color.min(Color::ONE)
    }
}

impl Tracer for ObjectTracer<'_> {
    fn trace(&mut self, ray: &Ray) -> Color {
        self.trace_depth(ray, 0, &MediumStack::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::inward_box;
    use crate::shader::{Cutout, ObjectShader, Procedural, ShaderBindings, ShaderParams};
    use radiant_core::{Light, Material, ObjectDesc, SceneDescription};
    use radiant_math::Vec3;
    use std::sync::Arc;

    fn build(objects: Vec<ObjectDesc>, lights: Vec<Light>, shaders: &ShaderBindings) -> Scene {
        let desc = SceneDescription {
            objects,
            lights,
            ..Default::default()
        };
        Scene::build(&desc, shaders).unwrap()
    }

    #[test]
    fn test_lit_opaque_sphere_is_lambertian() {
        let scene = build(
            vec![ObjectDesc::sphere(Vec3::ZERO, 1.0, Material::diffuse(Color::splat(0.5)))],
            vec![Light::point(Vec3::new(0.0, 10.0, 0.0), Color::ONE)],
            &ShaderBindings::new(),
        );
        let mut tracer = ObjectTracer::new(&scene, 5);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y));
        let expected = 0.5 / (0.25 + 0.9 + 0.81);
        assert!((color - Color::splat(expected)).length() < 1e-5);
        assert_eq!(tracer.rays_cast(), 1);
    }

    #[test]
    fn test_miss_is_black() {
        let scene = build(vec![], vec![], &ShaderBindings::new());
        let mut tracer = ObjectTracer::new(&scene, 5);
        assert_eq!(tracer.trace(&Ray::new(Vec3::ZERO, Vec3::X)), Color::ZERO);
    }

    #[test]
    fn test_mirror_box_stops_at_max_depth() {
        let mirror = Material {
            diffuse: Color::ZERO,
            specular: Color::ONE,
            ..Default::default()
        };
        let scene = build(inward_box(1.0, mirror), vec![], &ShaderBindings::new());
        let mut tracer = ObjectTracer::new(&scene, 5);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 0.1, 0.3), Vec3::X));
        assert_eq!(color, Color::ZERO);
        assert_eq!(tracer.rays_cast(), 5);
    }

    #[test]
    fn test_refraction_through_glass_sphere() {
        let glass = Material {
            diffuse: Color::ONE,
            ktran: 1.0,
            ..Default::default()
        };
        let wall = Material {
            diffuse: Color::splat(0.5),
            ambient: Color::ONE,
            ..Default::default()
        };
        let scene = build(
            vec![
                ObjectDesc::sphere(Vec3::ZERO, 1.0, glass),
                ObjectDesc::sphere(Vec3::new(0.0, 0.0, -20.0), 10.0, wall),
            ],
            vec![],
            &ShaderBindings::new(),
        );
        let mut tracer = ObjectTracer::new(&scene, 5);

        // Straight through the center: front face, back face, wall.
        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z));
        assert!((color - Color::splat(0.5)).length() < 1e-4);
        assert_eq!(tracer.rays_cast(), 3);
    }

    #[test]
    fn test_cutout_lets_rays_through() {
        let mut shaders = ShaderBindings::new();
        shaders.insert(0, Arc::new(Cutout(|_: &ShaderParams| false)) as Arc<dyn ObjectShader>);
        let lit = Material {
            diffuse: Color::ONE,
            ambient: Color::splat(0.25),
            ..Default::default()
        };
        let scene = build(
            vec![
                ObjectDesc::sphere(Vec3::ZERO, 1.0, Material::diffuse(Color::X)),
                ObjectDesc::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, lit),
            ],
            vec![],
            &shaders,
        );
        let mut tracer = ObjectTracer::new(&scene, 5);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z));
        assert!((color - Color::splat(0.25)).length() < 1e-5);
    }

    #[test]
    fn test_material_mutation_used_for_lighting() {
        let mut shaders = ShaderBindings::new();
        let paint = Procedural(|mut m: Material, _: &ShaderParams| {
            m.diffuse = Color::new(1.0, 0.0, 0.0);
            m
        });
        shaders.insert(0, Arc::new(paint) as Arc<dyn ObjectShader>);
        let scene = build(
            vec![ObjectDesc::sphere(Vec3::ZERO, 1.0, Material::diffuse(Color::ONE))],
            vec![Light::directional(Vec3::NEG_Y, Color::ONE)],
            &shaders,
        );
        let mut tracer = ObjectTracer::new(&scene, 5);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y));
        assert!((color - Color::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_transparent_surface_has_no_direct_diffuse() {
        let glass = Material {
            diffuse: Color::splat(0.5),
            ktran: 1.0,
            ..Default::default()
        };
        let scene = build(
            vec![ObjectDesc::sphere(Vec3::ZERO, 1.0, glass)],
            vec![Light::directional(Vec3::NEG_Y, Color::ONE)],
            &ShaderBindings::new(),
        );
        // Depth 1: no refracted ray, only direct light.
        let mut tracer = ObjectTracer::new(&scene, 1);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y));
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_half_transparent_diffuse_is_scaled() {
        let tinted = Material {
            diffuse: Color::ONE,
            ktran: 0.25,
            ..Default::default()
        };
        let scene = build(
            vec![ObjectDesc::sphere(Vec3::ZERO, 1.0, tinted)],
            vec![Light::directional(Vec3::NEG_Y, Color::ONE)],
            &ShaderBindings::new(),
        );
        let mut tracer = ObjectTracer::new(&scene, 1);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y));
        assert!((color - Color::splat(0.75)).length() < 1e-5);
    }

    #[test]
    fn test_light_behind_surface_adds_nothing() {
        let shiny = Material {
            diffuse: Color::splat(0.5),
            specular: Color::ONE,
            shininess: 1.0,
            ktran: 0.5,
            ..Default::default()
        };
        let scene = build(
            vec![ObjectDesc::sphere(Vec3::ZERO, 1.0, shiny)],
            // Shines upward onto the underside only.
            vec![Light::directional(Vec3::Y, Color::ONE)],
            &ShaderBindings::new(),
        );
        let mut tracer = ObjectTracer::new(&scene, 1);

        // Top of the sphere faces away from the light: neither diffuse nor
        // highlight.
        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y));
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_medium_stack() {
        let air = MediumStack::new();
        assert_eq!(air.index(), AIR_INDEX);

        let inner = air.entered(3).entered(5);
        assert_eq!(inner.top(), Some(5));
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.index(), GLASS_INDEX);
        assert_eq!(inner.exited().top(), Some(3));
        assert_eq!(air.top(), None);
    }
}
