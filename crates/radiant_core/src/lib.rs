//! Radiant Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Scene types**: `Material`, `Light`, `CameraDesc`, `ObjectDesc`, `TriangleMesh`
//! - **Settings**: `RenderSettings` and `RadiosityParams`
//! - **Loading**: JSON scene files via serde, validated into `SceneDescription`
//!
//! # Example
//!
//! ```ignore
//! use radiant_core::load_scene;
//!
//! let scene = load_scene("cornell.json")?;
//! println!("{} objects, {} lights", scene.objects.len(), scene.lights.len());
//! ```

pub mod camera;
pub mod config;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use camera::{CameraDesc, LensParams};
pub use config::{RadiosityParams, RenderSettings, TracerKind};
pub use light::{Light, LightKind};
pub use material::Material;
pub use mesh::{quad_uvs, MaterialBinding, NormalBinding, TriangleMesh, Vertex};
pub use scene::{load_scene, load_scene_from_str, Geometry, ObjectDesc, SceneDescription, SceneError, SceneResult};
