//! Per-object shading hooks.
//!
//! A shader can reject intersections (cut-outs) and rewrite the material
//! at a hit point (procedural textures). Objects without a binding use
//! [`DefaultShader`], which accepts everything and leaves materials alone.

use std::collections::HashMap;
use std::sync::Arc;

use crate::primitive::ObjectId;
use radiant_core::Material;
use radiant_math::{Vec2, Vec3};

/// Surface sample handed to shader hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderParams {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

pub trait ObjectShader: Send + Sync {
    /// Return false to let the ray pass through this hit.
    fn accept_intersection(&self, _params: &ShaderParams) -> bool {
        true
    }

    /// Material used for shading at this hit.
    fn mutate_material(&self, material: Material, _params: &ShaderParams) -> Material {
        material
    }
}

/// Accepts every hit and keeps the primitive's material.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShader;

impl ObjectShader for DefaultShader {}

/// Shader built from an acceptance predicate.
pub struct Cutout<F>(pub F);

impl<F> ObjectShader for Cutout<F>
where
    F: Fn(&ShaderParams) -> bool + Send + Sync,
{
    fn accept_intersection(&self, params: &ShaderParams) -> bool {
        (self.0)(params)
    }
}

/// Shader built from a material rewrite.
pub struct Procedural<F>(pub F);

impl<F> ObjectShader for Procedural<F>
where
    F: Fn(Material, &ShaderParams) -> Material + Send + Sync,
{
    fn mutate_material(&self, material: Material, params: &ShaderParams) -> Material {
        (self.0)(material, params)
    }
}

/// Shaders keyed by object id.
pub type ShaderBindings = HashMap<ObjectId, Arc<dyn ObjectShader>>;
