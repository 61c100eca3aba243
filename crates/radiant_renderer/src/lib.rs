//! Radiant Renderer - kd-tree ray tracing and progressive radiosity.
//!
//! Scenes from `radiant_core` are turned into spheres and triangles, indexed
//! by a surface area heuristic kd-tree and shaded by one of two tracers:
//!
//! - [`ObjectTracer`]: Whitted-style direct lighting with shadows,
//!   reflection and refraction through nested media
//! - [`RadiosityTracer`]: diffuse light read back from a
//!   [`RadiosityScene`] after progressive refinement steps
//!
//! The image is rendered in spiral-ordered buckets, optionally on the rayon
//! pool with one tracer per worker.

pub mod bucket;
pub mod camera;
pub mod kd_tree;
pub mod object_tracer;
pub mod primitive;
pub mod radiosity;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod shadow_tracer;
pub mod sphere;
pub mod tracer;
pub mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketContext, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{ray_computer, LensCamera, PinholeCamera, RayComputer};
pub use kd_tree::{KdTree, KdTreeStats, TraversalStack};
pub use object_tracer::{MediumStack, ObjectTracer};
pub use primitive::{ObjectId, Primitive, PrimitiveId, Shape, SurfaceHit};
pub use radiosity::{FormFactorOracle, Patch, PatchId, PatchState, RadiosityScene, RadiosityTracer, RayCastHemicube};
pub use renderer::{color_to_rgba, render, render_pixel, ImageBuffer};
pub use scene::{Intersection, Object, Scene};
pub use shader::{Cutout, DefaultShader, ObjectShader, Procedural, ShaderBindings, ShaderParams};
pub use shadow_tracer::ShadowTracer;
pub use sphere::Sphere;
pub use tracer::Tracer;
pub use triangle::Triangle;

/// Re-export common math types from radiant_math
pub use radiant_math::{Color, Ray, Vec3};
