//! Radiosity patches, their energy state and the UV grids that map
//! surface hits back to patches.

use std::f32::consts::PI;

use crate::primitive::ObjectId;
use crate::sphere::Sphere;
use radiant_core::Material;
use radiant_math::{triangle_area, Color, Vec2, Vec3};

/// Index into the patch list.
pub type PatchId = usize;

/// Slot 0 of every patch list. Collects form factor for directions that
/// leave the scene and is never shot from or into.
pub const NULL_PATCH: PatchId = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchShape {
    Null,
    /// Corners at UV (0,0), (1,0), (1,1) and (0,1) of the patch cell.
    Quad { corners: [Vec3; 4] },
    /// Longitude/latitude cell of a sphere.
    Sphere {
        sphere: Sphere,
        u: (f32, f32),
        v: (f32, f32),
    },
}

impl PatchShape {
    pub fn center(&self) -> Vec3 {
        match self {
            PatchShape::Null => Vec3::ZERO,
            PatchShape::Quad { corners } => corners.iter().sum::<Vec3>() * 0.25,
            PatchShape::Sphere { sphere, u, v } => {
                sphere.surface_point((u.0 + u.1) * 0.5, (v.0 + v.1) * 0.5)
            }
        }
    }

    /// Unit direction across the patch toward increasing `v`.
    pub fn surface_dir(&self) -> Vec3 {
        match self {
            PatchShape::Null => Vec3::ZERO,
            PatchShape::Quad { corners } => {
                let low = (corners[0] + corners[1]) * 0.5;
                let high = (corners[2] + corners[3]) * 0.5;
                (high - low).normalize_or_zero()
            }
            PatchShape::Sphere { sphere, u, v } => {
                let um = (u.0 + u.1) * 0.5;
                (sphere.surface_point(um, v.1) - sphere.surface_point(um, v.0)).normalize_or_zero()
            }
        }
    }

    /// Area of the two triangles spanned by the corners.
    pub fn area(&self) -> f32 {
        let [a, b, c, d] = match self {
            PatchShape::Null => return 0.0,
            PatchShape::Quad { corners } => *corners,
            PatchShape::Sphere { sphere, u, v } => [
                sphere.surface_point(u.0, v.0),
                sphere.surface_point(u.1, v.0),
                sphere.surface_point(u.1, v.1),
                sphere.surface_point(u.0, v.1),
            ],
        };
        triangle_area(a, b, c) + triangle_area(a, c, d)
    }
}

/// A piece of surface that exchanges energy with the others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub object: ObjectId,
    /// Material sampled at the patch, after the object's shader.
    pub material: Material,
    pub normal: Vec3,
    pub shape: PatchShape,
    pub area: f32,
}

impl Patch {
    pub fn new(object: ObjectId, material: Material, normal: Vec3, shape: PatchShape) -> Self {
        Self {
            object,
            material,
            normal,
            area: shape.area(),
            shape,
        }
    }

    pub fn null() -> Self {
        Self {
            object: 0,
            material: Material::default(),
            normal: Vec3::ZERO,
            shape: PatchShape::Null,
            area: 0.0,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.shape.center()
    }

    pub fn surface_dir(&self) -> Vec3 {
        self.shape.surface_dir()
    }
}

/// Energy accumulators of one patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchState {
    pub energy: Color,
    /// Received but not yet shot.
    pub unshot: Color,
    /// Channel sum of `unshot`.
    pub unshot_total: f32,
}

impl PatchState {
    /// Initial state: the patch has emitted nothing yet.
    pub fn new(material: &Material) -> Self {
        let emitted = material.diffuse * material.emissive;
        Self {
            energy: emitted,
            unshot: emitted,
            unshot_total: emitted.element_sum(),
        }
    }

    pub fn receive(&mut self, delta: Color) {
        self.energy += delta;
        self.unshot += delta;
        self.unshot_total += delta.element_sum();
    }
}

/// Cells per side of a quad of `area` so each patch is about `desired`.
pub fn quad_divisions(area: f32, desired: f32) -> usize {
    if !(area > 0.0 && desired > 0.0) {
        return 1;
    }
    let du = (desired / area).sqrt();
    ((1.0 / du).floor() as usize).max(1)
}

/// Longitude and latitude cell counts for a sphere so each patch spans a
/// chord of about `sqrt(desired)`.
pub fn sphere_divisions(radius: f32, desired: f32) -> (usize, usize) {
    if !(radius > 0.0 && desired > 0.0) {
        return (1, 1);
    }
    let k = (desired.sqrt() / (2.0 * radius)).min(1.0).asin();
    let du = k / PI;
    let dv = 2.0 * k / PI;
    let cells = |d: f32| ((1.0 / d).floor() as usize).max(1);
    (cells(du), cells(dv))
}

/// Row-major block of patches covering a primitive's `[0,1]^2` UV square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    pub first: PatchId,
    pub cols: usize,
    pub rows: usize,
    /// Whether `u` wraps around, as on a sphere's longitude.
    pub wrap_u: bool,
}

impl PatchGrid {
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn id(&self, col: usize, row: usize) -> PatchId {
        self.first + row * self.cols + col
    }

    /// Cell bounds `(u0, u1), (v0, v1)` of `(col, row)`.
    pub fn cell(&self, col: usize, row: usize) -> ((f32, f32), (f32, f32)) {
        let (c, r) = (self.cols as f32, self.rows as f32);
        (
            (col as f32 / c, (col + 1) as f32 / c),
            (row as f32 / r, (row + 1) as f32 / r),
        )
    }

    /// Patch containing `uv`.
    pub fn nearest(&self, uv: Vec2) -> PatchId {
        let cell = |x: f32, n: usize| ((x * n as f32).floor().max(0.0) as usize).min(n - 1);
        self.id(cell(uv.x, self.cols), cell(uv.y, self.rows))
    }

    /// The four patches around `uv` with bilinear weights between their
    /// centers. Off the edge the border patch is reused, unless `u` wraps.
    pub fn bilinear(&self, uv: Vec2) -> [(PatchId, f32); 4] {
        let axis = |x: f32, n: usize, wrap: bool| {
            let p = x * n as f32 - 0.5;
            let base = p.floor();
            let frac = p - base;
            let n = n as i64;
            let fix = |i: i64| {
                if wrap {
                    i.rem_euclid(n) as usize
                } else {
                    i.clamp(0, n - 1) as usize
                }
            };
            let i = base as i64;
            (fix(i), fix(i + 1), frac)
        };
        let (c0, c1, fu) = axis(uv.x, self.cols, self.wrap_u);
        let (r0, r1, fv) = axis(uv.y, self.rows, false);
        [
            (self.id(c0, r0), (1.0 - fu) * (1.0 - fv)),
            (self.id(c1, r0), fu * (1.0 - fv)),
            (self.id(c0, r1), (1.0 - fu) * fv),
            (self.id(c1, r1), fu * fv),
        ]
    }
}
