//! Triangle mesh geometry for polygon-set objects.
//!
//! Meshes carry no texture coordinates of their own. Instead every pair of
//! consecutive triangles is assumed to form a quad, and UVs are derived from
//! the edge the two triangles share. Radiosity patch grids are laid out over
//! the same quads.

use radiant_math::{Aabb, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Where triangle normals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBinding {
    /// One geometric normal per triangle, from its winding.
    #[default]
    PerFace,
    /// Normals supplied per vertex and interpolated across the face.
    PerVertex,
}

/// Where triangle materials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialBinding {
    /// The object's first material everywhere.
    #[default]
    PerObject,
    /// Each vertex indexes the object's material list; interpolated across the face.
    PerVertex,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    #[serde(default)]
    pub normal: Option<Vec3>,
    #[serde(default)]
    pub material: usize,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: None,
            material: 0,
        }
    }
}

/// A list of triangles with their normal and material bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    #[serde(default)]
    pub normals: NormalBinding,
    #[serde(default)]
    pub materials: MaterialBinding,
    pub triangles: Vec<[Vertex; 3]>,
}

impl TriangleMesh {
    /// Create a per-face, per-object mesh from raw triangles.
    pub fn new(triangles: Vec<[Vertex; 3]>) -> Self {
        Self {
            normals: NormalBinding::PerFace,
            materials: MaterialBinding::PerObject,
            triangles,
        }
    }

    /// Create a mesh from positions and triangle indices (every 3 indices
    /// form a triangle). Trailing indices that do not complete a triangle
    /// are ignored.
    pub fn from_indexed(positions: &[Vec3], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .map(|face| {
                [
                    Vertex::new(positions[face[0] as usize]),
                    Vertex::new(positions[face[1] as usize]),
                    Vertex::new(positions[face[2] as usize]),
                ]
            })
            .collect();
        Self::new(triangles)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of triangle `i`.
    pub fn positions(&self, i: usize) -> [Vec3; 3] {
        self.triangles[i].map(|v| v.position)
    }

    /// Axis-aligned bounding box of all vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.triangles.iter().flatten().map(|v| v.position))
    }

    /// The quad pair triangle `i` belongs to, as `(first, second)`.
    ///
    /// Triangles pair up as (0, 1), (2, 3), ... When the count is odd the
    /// last triangle is paired with the one before it. A single triangle has
    /// no pair.
    pub fn quad_pair(&self, i: usize) -> Option<(usize, usize)> {
        let n = self.triangles.len();
        if n < 2 {
            return None;
        }
        let first = i - i % 2;
        let second = if first + 1 == n { first - 1 } else { first + 1 };
        Some((first, second))
    }

    /// Texture coordinates derived from triangle `i`'s quad pair.
    pub fn triangle_uvs(&self, i: usize) -> Option<[Vec2; 3]> {
        let (first, second) = self.quad_pair(i)?;
        Some(quad_uvs(i % 2, &self.positions(first), &self.positions(second)))
    }
}

/// UVs for one triangle of a pair assumed to form a quad.
///
/// `role` is 0 for the first triangle of the pair and 1 for the second. The
/// vertex of `t0` not on the shared edge maps to (0,0), the one of `t1` maps
/// to (1,1), and the shared vertices, in `t0` order, map to (1,0) and (0,1).
/// When the triangles do not share exactly two distinct vertices all UVs
/// are zero.
pub fn quad_uvs(role: usize, t0: &[Vec3; 3], t1: &[Vec3; 3]) -> [Vec2; 3] {
    let mut shared = [[0usize; 2]; 2];
    let mut k = 0;
    for (i, a) in t0.iter().enumerate() {
        if k == 2 {
            break;
        }
        if let Some(j) = t1.iter().position(|b| a == b) {
            shared[0][k] = i;
            shared[1][k] = j;
            k += 1;
        }
    }
    if k != 2 || shared[1][0] == shared[1][1] {
        return [Vec2::ZERO; 3];
    }

    let edge = shared[role];
    let Some(outer) = (0..3).find(|i| !edge.contains(i)) else {
        return [Vec2::ZERO; 3];
    };

    let mut uvs = [Vec2::ZERO; 3];
    uvs[outer] = if role == 0 { Vec2::ZERO } else { Vec2::ONE };
    uvs[edge[0]] = Vec2::new(1.0, 0.0);
    uvs[edge[1]] = Vec2::new(0.0, 1.0);
    uvs
}
