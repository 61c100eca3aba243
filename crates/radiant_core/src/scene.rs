//! Scene description types and JSON scene loading.
//!
//! A `SceneDescription` is the renderer-agnostic form of a scene: camera,
//! lights and objects with their materials and geometry. The renderer turns
//! it into primitives and an acceleration structure.

use std::path::Path;

use radiant_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraDesc;
use crate::config::{RadiosityParams, RenderSettings};
use crate::light::{Light, LightKind};
use crate::material::Material;
use crate::mesh::{MaterialBinding, NormalBinding, TriangleMesh};

/// Errors that can occur while loading or validating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object {0} has no materials")]
    NoMaterials(usize),

    #[error("Object {object}: material index {index} out of range ({count} materials)")]
    MaterialIndex {
        object: usize,
        index: usize,
        count: usize,
    },

    #[error("Object {object}: triangle {triangle} is missing a per-vertex normal")]
    MissingNormal { object: usize, triangle: usize },

    #[error("Object {0}: sphere radius must be positive")]
    InvalidRadius(usize),

    #[error("Light {0} has a zero-length direction")]
    InvalidLight(usize),

    #[error("Camera direction and up vector do not form a basis")]
    InvalidCamera,
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Shape of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Sphere { center: Vec3, radius: f32 },
    Mesh(TriangleMesh),
}

/// One object: materials plus geometry. Its id is its position in the
/// scene's object list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(default)]
    pub name: Option<String>,
    pub materials: Vec<Material>,
    pub geometry: Geometry,
}

impl ObjectDesc {
    pub fn sphere(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            name: None,
            materials: vec![material],
            geometry: Geometry::Sphere { center, radius },
        }
    }

    pub fn mesh(mesh: TriangleMesh, materials: Vec<Material>) -> Self {
        Self {
            name: None,
            materials,
            geometry: Geometry::Mesh(mesh),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraDesc,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    #[serde(default)]
    pub settings: RenderSettings,
    #[serde(default)]
    pub radiosity: RadiosityParams,
}

impl SceneDescription {
    /// Check the description for configuration errors and normalize its
    /// direction vectors.
    pub fn validated(mut self) -> SceneResult<Self> {
        self.camera = self.camera.normalized().ok_or(SceneError::InvalidCamera)?;

        for (i, light) in self.lights.iter_mut().enumerate() {
            if let LightKind::Directional { direction } = &mut light.kind {
                *direction = direction.try_normalize().ok_or(SceneError::InvalidLight(i))?;
            }
        }

        for (id, object) in self.objects.iter_mut().enumerate() {
            if object.materials.is_empty() {
                return Err(SceneError::NoMaterials(id));
            }
            match &mut object.geometry {
                Geometry::Sphere { radius, .. } => {
                    if !(*radius > 0.0) {
                        return Err(SceneError::InvalidRadius(id));
                    }
                }
                Geometry::Mesh(mesh) => validate_mesh(id, mesh, object.materials.len())?,
            }
        }
        Ok(self)
    }

    pub fn primitive_count(&self) -> usize {
        self.objects
            .iter()
            .map(|o| match &o.geometry {
                Geometry::Sphere { .. } => 1,
                Geometry::Mesh(mesh) => mesh.len(),
            })
            .sum()
    }
}

fn validate_mesh(object: usize, mesh: &mut TriangleMesh, count: usize) -> SceneResult<()> {
    for (triangle, verts) in mesh.triangles.iter_mut().enumerate() {
        for v in verts.iter_mut() {
            if mesh.materials == MaterialBinding::PerVertex && v.material >= count {
                return Err(SceneError::MaterialIndex {
                    object,
                    index: v.material,
                    count,
                });
            }
            if mesh.normals == NormalBinding::PerVertex {
                let normal = v
                    .normal
                    .and_then(|n| n.try_normalize())
                    .ok_or(SceneError::MissingNormal { object, triangle })?;
                v.normal = Some(normal);
            }
        }
    }
    Ok(())
}

/// Parse and validate a scene from a JSON string.
pub fn load_scene_from_str(json: &str) -> SceneResult<SceneDescription> {
    let desc: SceneDescription = serde_json::from_str(json)?;
    let desc = desc.validated()?;
    log::info!(
        "Loaded scene: {} objects, {} primitives, {} lights",
        desc.objects.len(),
        desc.primitive_count(),
        desc.lights.len()
    );
    Ok(desc)
}

/// Load and validate a JSON scene file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<SceneDescription> {
    let path = path.as_ref();
    log::info!("Loading scene from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    load_scene_from_str(&json)
}
