//! Progressive refinement radiosity.
//!
//! Surfaces are cut into patches at setup. Every [`RadiosityScene::step`]
//! picks the patch with the most unshot energy (weighted by area), asks a
//! [`FormFactorOracle`] what fraction of its light reaches every other
//! patch, and distributes the energy accordingly.
//!
//! Patch 0 is the null patch ([`NULL_PATCH`]): form factor that escapes
//! the scene lands there and is discarded.

mod hemicube;
mod patch;
mod tracer;

pub use hemicube::RayCastHemicube;
pub use patch::{
    quad_divisions, sphere_divisions, Patch, PatchGrid, PatchId, PatchShape, PatchState, NULL_PATCH,
};
pub use tracer::RadiosityTracer;

use crate::primitive::{PrimitiveId, Shape};
use crate::scene::{Object, Scene};
use crate::shader::ShaderParams;
use crate::triangle::Triangle;
use radiant_core::{Material, RadiosityParams};
use radiant_math::{Color, Vec2, Vec3};

/// Source of form factors for a shooting patch.
pub trait FormFactorOracle {
    /// Fill `out[j]` with the form factor from `shooter` to patch `j`.
    /// `out` has one zeroed slot per patch, null patch included.
    fn form_factors(&mut self, scene: &RadiosityScene<'_>, shooter: PatchId, out: &mut [f32]);
}

/// Patches and their energy over a built [`Scene`].
pub struct RadiosityScene<'a> {
    scene: &'a Scene,
    params: RadiosityParams,
    patches: Vec<Patch>,
    states: Vec<PatchState>,
    grids: Vec<PatchGrid>,
    /// Grid covering each primitive, if it has patches.
    primitive_grids: Vec<Option<usize>>,
    /// Reused between steps.
    form_factors: Vec<f32>,
    steps: usize,
}

impl<'a> RadiosityScene<'a> {
    /// Cut every sphere and every UV-paired triangle quad into patches of
    /// roughly `params.patch_area`.
    pub fn new(scene: &'a Scene, params: RadiosityParams) -> Self {
        let mut radiosity = Self {
            scene,
            params,
            patches: vec![Patch::null()],
            states: Vec::new(),
            grids: Vec::new(),
            primitive_grids: vec![None; scene.primitives.len()],
            form_factors: Vec::new(),
            steps: 0,
        };

        for object in &scene.objects {
            let mut i = object.primitives.start;
            while i < object.primitives.end {
                match &scene.primitives[i].shape {
                    Shape::Sphere(_) => {
                        radiosity.add_sphere(object, i);
                        i += 1;
                    }
                    Shape::Triangle(_) if i + 1 < object.primitives.end => {
                        radiosity.add_quad(object, i, i + 1);
                        i += 2;
                    }
                    Shape::Triangle(_) => i += 1,
                }
            }
        }

        radiosity.states = radiosity.patches.iter().map(|p| PatchState::new(&p.material)).collect();
        radiosity.states[NULL_PATCH] = PatchState {
            energy: Color::ZERO,
            unshot: Color::ZERO,
            unshot_total: 0.0,
        };

        log::info!(
            "Radiosity: {} patches in {} grids, target patch area {}",
            radiosity.patches.len() - 1,
            radiosity.grids.len(),
            radiosity.params.patch_area
        );
        radiosity
    }

    fn push_grid(&mut self, cols: usize, rows: usize, wrap_u: bool, primitives: &[PrimitiveId]) -> PatchGrid {
        let grid = PatchGrid {
            first: self.patches.len(),
            cols,
            rows,
            wrap_u,
        };
        for &p in primitives {
            self.primitive_grids[p] = Some(self.grids.len());
        }
        self.grids.push(grid);
        grid
    }

    fn add_sphere(&mut self, object: &Object, primitive: PrimitiveId) {
        let Shape::Sphere(sphere) = self.scene.primitives[primitive].shape else {
            return;
        };
        let (cols, rows) = sphere_divisions(sphere.radius, self.params.patch_area);
        let grid = self.push_grid(cols, rows, true, &[primitive]);

        for row in 0..rows {
            for col in 0..cols {
                let (u, v) = grid.cell(col, row);
                let shape = PatchShape::Sphere { sphere, u, v };
                let position = shape.center();
                let params = ShaderParams {
                    position,
                    normal: (position - sphere.center).normalize(),
                    uv: Vec2::new((u.0 + u.1) * 0.5, (v.0 + v.1) * 0.5),
                };
                let material = object.mutate(object.materials[0], &params);
                self.patches.push(Patch::new(object.id, material, params.normal, shape));
            }
        }
    }

    fn add_quad(&mut self, object: &Object, first: PrimitiveId, second: PrimitiveId) {
        let scene = self.scene;
        let (Shape::Triangle(t0), Shape::Triangle(t1)) =
            (&scene.primitives[first].shape, &scene.primitives[second].shape)
        else {
            return;
        };
        let Some(quad) = Quad::new(t0, t1) else {
            log::debug!("Object {}: triangles {} and {} do not form a quad", object.id, first, second);
            return;
        };

        let n = quad_divisions(quad.area(), self.params.patch_area);
        let grid = self.push_grid(n, n, false, &[first, second]);

        for row in 0..n {
            for col in 0..n {
                let ((u0, u1), (v0, v1)) = grid.cell(col, row);
                let corners = [
                    quad.point(u0, v0),
                    quad.point(u1, v0),
                    quad.point(u1, v1),
                    quad.point(u0, v1),
                ];
                let corner_materials = [
                    quad.material(&object.materials, u0, v0),
                    quad.material(&object.materials, u1, v0),
                    quad.material(&object.materials, u1, v1),
                    quad.material(&object.materials, u0, v1),
                ];
                let material = Material::interpolate(corner_materials.iter().map(|m| (m, 0.25)));

                let uv = Vec2::new((u0 + u1) * 0.5, (v0 + v1) * 0.5);
                let shape = PatchShape::Quad { corners };
                let params = ShaderParams {
                    position: shape.center(),
                    normal: quad.normal(uv.x, uv.y),
                    uv,
                };
                let material = object.mutate(material, &params);
                self.patches.push(Patch::new(object.id, material, params.normal, shape));
            }
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn params(&self) -> &RadiosityParams {
        &self.params
    }

    /// All patches, null patch first.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, id: PatchId) -> &Patch {
        &self.patches[id]
    }

    pub fn state(&self, id: PatchId) -> &PatchState {
        &self.states[id]
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn grid(&self, primitive: PrimitiveId) -> Option<&PatchGrid> {
        self.primitive_grids[primitive].map(|g| &self.grids[g])
    }

    /// Patch under `uv` on `primitive`, or the null patch when the
    /// primitive has none.
    pub fn patch_at(&self, primitive: PrimitiveId, uv: Vec2) -> PatchId {
        self.grid(primitive).map_or(NULL_PATCH, |g| g.nearest(uv))
    }

    /// Energy leaving `primitive` at `uv`, blended between patch centers
    /// when `interpolate` is set.
    pub fn energy_at(&self, primitive: PrimitiveId, uv: Vec2, interpolate: bool) -> Option<Color> {
        let grid = self.grid(primitive)?;
        if interpolate {
            Some(grid.bilinear(uv).iter().map(|&(id, w)| self.states[id].energy * w).sum())
        } else {
            Some(self.states[grid.nearest(uv)].energy)
        }
    }

    /// Sum of every patch's energy.
    pub fn total_energy(&self) -> Color {
        self.states.iter().map(|s| s.energy).sum()
    }

    /// Patch to shoot next: the largest unshot energy times area.
    fn shooter(&self) -> Option<(PatchId, f32)> {
        (1..self.patches.len())
            .map(|i| (i, self.states[i].unshot_total * self.patches[i].area))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Shoot the brightest patch's unshot energy into the scene. Returns
    /// the shooter, or `None` when there is nothing left to shoot.
    pub fn step(&mut self, oracle: &mut dyn FormFactorOracle) -> Option<PatchId> {
        let n = self.patches.len();
        if n < 2 {
            return None;
        }
        let (shooter, priority) = self.shooter()?;
        if !(priority > 0.0) {
            return None;
        }

        let mut ffs = std::mem::take(&mut self.form_factors);
        ffs.clear();
        ffs.resize(n, 0.0);
        oracle.form_factors(self, shooter, &mut ffs);

        let shooter_area = self.patches[shooter].area;
        let unshot = self.states[shooter].unshot;
        for j in (1..shooter).chain(shooter + 1..n) {
            let area = self.patches[j].area;
            if !(area > 0.0) || !(ffs[j] > 0.0) {
                continue;
            }
            let k = ffs[j] * shooter_area / area;
            let delta = unshot * self.patches[j].material.diffuse * k;
            self.states[j].receive(delta);
        }

        let state = &mut self.states[shooter];
        state.unshot *= ffs[shooter];
        state.unshot_total = state.unshot.element_sum();

        log::debug!(
            "Radiosity step {}: shot patch {} (priority {:.4}, escaped {:.4})",
            self.steps,
            shooter,
            priority,
            ffs[NULL_PATCH]
        );
        self.form_factors = ffs;
        self.steps += 1;
        Some(shooter)
    }

    /// Run up to `steps` shooting steps. Returns how many ran.
    pub fn run(&mut self, oracle: &mut dyn FormFactorOracle, steps: usize) -> usize {
        let mut done = 0;
        while done < steps && self.step(oracle).is_some() {
            done += 1;
        }
        log::info!("Radiosity: {} steps, total energy {:?}", done, self.total_energy());
        done
    }
}

/// Two triangles paired into a quad by their UVs.
struct Quad<'t> {
    triangles: [&'t Triangle; 2],
    /// Positions at UV (0,0), (1,0), (1,1) and (0,1).
    corners: [Vec3; 4],
}

impl<'t> Quad<'t> {
    fn new(t0: &'t Triangle, t1: &'t Triangle) -> Option<Self> {
        let uv0 = t0.uvs?;
        let uv1 = t1.uvs?;
        let find = |t: &Triangle, uvs: &[Vec2; 3], target: Vec2| {
            uvs.iter().position(|&uv| uv == target).map(|i| t.vertices[i])
        };
        let corners = [
            find(t0, &uv0, Vec2::ZERO)?,
            find(t0, &uv0, Vec2::X)?,
            find(t1, &uv1, Vec2::ONE)?,
            find(t0, &uv0, Vec2::Y)?,
        ];
        Some(Self {
            triangles: [t0, t1],
            corners,
        })
    }

    fn area(&self) -> f32 {
        PatchShape::Quad { corners: self.corners }.area()
    }

    /// Bilinear point at `(u, v)`.
    fn point(&self, u: f32, v: f32) -> Vec3 {
        let [a, b, c, d] = self.corners;
        a * ((1.0 - u) * (1.0 - v)) + b * (u * (1.0 - v)) + c * (u * v) + d * ((1.0 - u) * v)
    }

    /// Triangle covering `(u, v)` and the barycentric coordinates there.
    fn locate(&self, u: f32, v: f32) -> (&Triangle, f32, f32) {
        let triangle = if u < 1.0 - v {
            self.triangles[0]
        } else {
            self.triangles[1]
        };
        let (alpha, beta) = triangle
            .uvs
            .and_then(|uvs| barycentric_of_uv(&uvs, Vec2::new(u, v)))
            .unwrap_or((0.0, 0.0));
        (triangle, alpha, beta)
    }

    fn material(&self, materials: &[Material], u: f32, v: f32) -> Material {
        let (triangle, alpha, beta) = self.locate(u, v);
        triangle.materials.at(materials, alpha, beta)
    }

    fn normal(&self, u: f32, v: f32) -> Vec3 {
        let (triangle, alpha, beta) = self.locate(u, v);
        triangle.normals.at(alpha, beta)
    }
}

/// Barycentric `(alpha, beta)` of `uv` in the triangle with vertex UVs `uvs`.
fn barycentric_of_uv(uvs: &[Vec2; 3], uv: Vec2) -> Option<(f32, f32)> {
    let e1 = uvs[1] - uvs[0];
    let e2 = uvs[2] - uvs[0];
    let det = e1.perp_dot(e2);
    if det.abs() < f32::EPSILON {
        return None;
    }
    let p = uv - uvs[0];
    Some((p.perp_dot(e2) / det, e1.perp_dot(p) / det))
}
