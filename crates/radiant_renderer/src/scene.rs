//! Renderable scene: primitives, objects, lights and the kd-tree over them.

use std::ops::Range;
use std::sync::Arc;

use crate::kd_tree::{KdTree, TraversalStack};
use crate::primitive::{ObjectId, Primitive, PrimitiveId};
use crate::shader::{DefaultShader, ObjectShader, ShaderBindings, ShaderParams};
use crate::sphere::Sphere;
use crate::triangle::{Triangle, TriangleMaterials, TriangleNormals};
use radiant_core::{
    CameraDesc, Geometry, Light, MaterialBinding, Material, NormalBinding, SceneDescription, SceneResult,
    TriangleMesh,
};
use radiant_math::{Ray, Vec2, Vec3};

/// An object: its materials, its shading hooks and the primitives it owns.
pub struct Object {
    pub id: ObjectId,
    pub name: Option<String>,
    pub materials: Vec<Material>,
    pub shader: Arc<dyn ObjectShader>,
    /// Primitives of an object are stored contiguously in the scene.
    pub primitives: Range<PrimitiveId>,
}

impl Object {
    pub fn accepts(&self, params: &ShaderParams) -> bool {
        self.shader.accept_intersection(params)
    }

    pub fn mutate(&self, material: Material, params: &ShaderParams) -> Material {
        self.shader.mutate_material(material, params)
    }
}

/// Nearest hit of a ray against the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Material at the hit before any shader mutation.
    pub material: Material,
    pub primitive: PrimitiveId,
    pub object: ObjectId,
}

impl Intersection {
    pub fn shader_params(&self) -> ShaderParams {
        ShaderParams {
            position: self.position,
            normal: self.normal,
            uv: self.uv,
        }
    }
}

pub struct Scene {
    pub camera: CameraDesc,
    pub lights: Vec<Light>,
    pub objects: Vec<Object>,
    pub primitives: Vec<Primitive>,
    tree: KdTree,
}

impl Scene {
    /// Validate `desc`, create primitives for every object and build the
    /// kd-tree. Objects without an entry in `shaders` get [`DefaultShader`].
    pub fn build(desc: &SceneDescription, shaders: &ShaderBindings) -> SceneResult<Self> {
        let desc = desc.clone().validated()?;

        let mut objects = Vec::with_capacity(desc.objects.len());
        let mut primitives = Vec::with_capacity(desc.primitive_count());

        for (id, object) in desc.objects.iter().enumerate() {
            let start = primitives.len();
            match &object.geometry {
                Geometry::Sphere { center, radius } => {
                    primitives.push(Primitive::sphere(id, Sphere::new(*center, *radius)));
                }
                Geometry::Mesh(mesh) => {
                    if mesh.len() % 2 == 1 {
                        log::warn!(
                            "Object {}: odd triangle count {}, last triangle has no quad partner",
                            id,
                            mesh.len()
                        );
                    }
                    primitives.extend(mesh_triangles(mesh).map(|t| Primitive::triangle(id, t)));
                }
            }

            let shader = shaders
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Arc::new(DefaultShader));
            objects.push(Object {
                id,
                name: object.name.clone(),
                materials: object.materials.clone(),
                shader,
                primitives: start..primitives.len(),
            });
        }

        let tree = KdTree::build(&primitives);
        log::info!(
            "Scene built: {} objects, {} primitives, {} lights",
            objects.len(),
            primitives.len(),
            desc.lights.len()
        );

        Ok(Self {
            camera: desc.camera,
            lights: desc.lights,
            objects,
            primitives,
            tree,
        })
    }

    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id]
    }

    /// Nearest hit along `ray`. Shader hooks are not consulted.
    pub fn intersect(&self, ray: &Ray, stack: &mut TraversalStack) -> Option<Intersection> {
        let (primitive, hit) = self.tree.intersect(&self.primitives, ray, stack)?;
        let prim = &self.primitives[primitive];
        let object = &self.objects[prim.object];
        Some(Intersection {
            t: hit.t,
            position: ray.at(hit.t),
            normal: hit.normal,
            uv: hit.uv,
            material: prim.material(&object.materials, &hit),
            primitive,
            object: prim.object,
        })
    }
}

fn mesh_triangles(mesh: &TriangleMesh) -> impl Iterator<Item = Triangle> + '_ {
    mesh.triangles.iter().enumerate().map(move |(i, verts)| {
        let [a, b, c] = verts.map(|v| v.position);
        let mut triangle = Triangle::new(a, b, c).with_uvs(mesh.triangle_uvs(i));
        if mesh.normals == NormalBinding::PerVertex {
            let normals = verts.map(|v| v.normal.unwrap_or(triangle.face_normal));
            triangle = triangle.with_normals(TriangleNormals::Vertex(normals));
        }
        if mesh.materials == MaterialBinding::PerVertex {
            triangle = triangle.with_materials(TriangleMaterials::Vertex(verts.map(|v| v.material)));
        }
        triangle
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shader::Cutout;
    use radiant_core::{ObjectDesc, SceneError, Vertex};
    use radiant_math::Color;

    /// Box with normals pointing inward, one object per face, so form
    /// factors and mirror bounces stay inside. Triangles come in quad pairs.
    pub(crate) fn inward_box(half: f32, material: Material) -> Vec<ObjectDesc> {
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        faces
            .iter()
            .map(|&(n, u, v)| {
                // Inward normal n sits on the face at -n; u x v == n.
                let c = -n * half;
                let (u, v) = (u * half, v * half);
                let (a, b, cc, d) = (c - u - v, c + u - v, c + u + v, c - u + v);
                let mesh = TriangleMesh::new(vec![
                    [Vertex::new(a), Vertex::new(b), Vertex::new(cc)],
                    [Vertex::new(a), Vertex::new(cc), Vertex::new(d)],
                ]);
                ObjectDesc::mesh(mesh, vec![material])
            })
            .collect()
    }

    fn two_spheres() -> SceneDescription {
        SceneDescription {
            objects: vec![
                ObjectDesc::sphere(Vec3::ZERO, 1.0, Material::diffuse(Color::X)).with_name("red"),
                ObjectDesc::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::diffuse(Color::Y)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_scene_build_and_intersect() {
        let scene = Scene::build(&two_spheres(), &ShaderBindings::new()).unwrap();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.primitives.len(), 2);
        assert_eq!(scene.objects[1].primitives, 1..2);

        let mut stack = TraversalStack::new();
        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z), &mut stack)
            .unwrap();
        assert_eq!(hit.object, 0);
        assert!((hit.position - Vec3::Z).length() < 1e-5);
        assert_eq!(hit.material.diffuse, Color::X);

        assert!(scene.intersect(&Ray::new(Vec3::new(0.0, 5.0, 5.0), Vec3::Z), &mut stack).is_none());
    }

    #[test]
    fn test_scene_shader_bindings() {
        let mut shaders = ShaderBindings::new();
        shaders.insert(0, Arc::new(Cutout(|_: &ShaderParams| false)) as Arc<dyn ObjectShader>);
        let scene = Scene::build(&two_spheres(), &shaders).unwrap();

        let params = ShaderParams {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            uv: Vec2::ZERO,
        };
        assert!(!scene.object(0).accepts(&params));
        assert!(scene.object(1).accepts(&params));
    }

    #[test]
    fn test_scene_build_reports_configuration_errors() {
        let mut desc = two_spheres();
        desc.objects[1].materials.clear();
        assert!(matches!(
            Scene::build(&desc, &ShaderBindings::new()),
            Err(SceneError::NoMaterials(1))
        ));
    }

    #[test]
    fn test_mesh_triangles_get_quad_uvs() {
        let desc = SceneDescription {
            objects: inward_box(1.0, Material::default()),
            ..Default::default()
        };
        let scene = Scene::build(&desc, &ShaderBindings::new()).unwrap();
        assert_eq!(scene.primitives.len(), 12);

        // Every hit on a face quad carries UVs inside the unit square.
        let mut stack = TraversalStack::new();
        let hit = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.2, 1.0)), &mut stack).unwrap();
        assert!((hit.position.z - 1.0).abs() < 1e-4);
        assert!((0.0..=1.0).contains(&hit.uv.x) && (0.0..=1.0).contains(&hit.uv.y));
        assert!(hit.normal.dot(Vec3::NEG_Z) > 0.99);
    }
}
