//! Surface-area-heuristic kd-tree.
//!
//! Built once per scene with the exact event sweep from Wald and Havran,
//! "On building fast kd-trees for ray tracing, and on doing that in
//! O(N log N)", and queried with an iterative front-to-back traversal.
//!
//! The tree stores primitive indices only. Every query takes the primitive
//! slice it was built from and a caller-owned [`TraversalStack`], so one
//! tree can be shared read-only between render workers.

use std::fmt;

use crate::primitive::{Primitive, PrimitiveId, SurfaceHit};
use radiant_math::{Aabb, Axis, Ray, RT_RAY_EPSILON};

/// Cost of stepping through an interior node.
const C_TRAVERSE: f32 = 0.5;
/// Cost of one primitive test.
const C_INTERSECT: f32 = 1.0;
/// Hard limit on tree depth. Heavily overlapping primitives can keep the
/// SAH splitting long after it stops paying off.
pub const MAX_DEPTH: usize = 64;

/// Node storage. Interior nodes refer to their children by index.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Interior {
        axis: Axis,
        position: f32,
        /// `[left, right]`: below and above `position`.
        children: [usize; 2],
    },
    Leaf {
        primitives: Vec<PrimitiveId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KdNode {
    pub bounds: Aabb,
    pub kind: NodeKind,
}

/// Kind of a sweep event. The derived order is the tie-break order at equal
/// positions: primitives ending there come first, then primitives lying in
/// the plane, then primitives starting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Minus,
    Cont,
    Plus,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    position: f32,
    kind: EventKind,
}

/// Which child primitives lying in the split plane go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    axis: Axis,
    position: f32,
    planar: Side,
    cost: f32,
}

/// One pending subtree during traversal, with the ray's parametric span
/// inside it.
#[derive(Debug, Clone, Copy)]
pub struct StackEntry {
    node: usize,
    t_enter: f32,
    t_exit: f32,
}

/// Scratch stack reused across traversals.
#[derive(Debug, Default, Clone)]
pub struct TraversalStack {
    entries: Vec<StackEntry>,
}

impl TraversalStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_DEPTH),
        }
    }
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KdTreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    /// Sum of leaf sizes. Exceeds the primitive count when primitives
    /// straddle split planes.
    pub references: usize,
}

impl KdTreeStats {
    pub fn average_leaf_size(&self) -> f32 {
        if self.leaves == 0 {
            0.0
        } else {
            self.references as f32 / self.leaves as f32
        }
    }
}

impl fmt::Display for KdTreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, depth {}, {:.2} primitives per leaf",
            self.nodes,
            self.leaves,
            self.depth,
            self.average_leaf_size()
        )
    }
}

/// Immutable kd-tree over a primitive slice. The root is `nodes[0]`; a tree
/// built from no primitives has no nodes and never reports a hit.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
}

impl KdTree {
    pub fn build(primitives: &[Primitive]) -> Self {
        let mut tree = KdTree { nodes: Vec::new() };
        if primitives.is_empty() {
            return tree;
        }

        let bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounds));
        let ids = (0..primitives.len()).collect();
        tree.build_node(primitives, ids, bounds, 0);

        log::info!("kd-tree over {} primitives: {}", primitives.len(), tree.stats());
        tree
    }

    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|n| n.bounds)
    }

    fn push_leaf(&mut self, bounds: Aabb, primitives: Vec<PrimitiveId>) -> usize {
        self.nodes.push(KdNode {
            bounds,
            kind: NodeKind::Leaf { primitives },
        });
        self.nodes.len() - 1
    }

    fn build_node(
        &mut self,
        primitives: &[Primitive],
        ids: Vec<PrimitiveId>,
        bounds: Aabb,
        depth: usize,
    ) -> usize {
        if ids.len() <= 1 || bounds.surface_area() < f32::EPSILON || depth >= MAX_DEPTH {
            return self.push_leaf(bounds, ids);
        }

        let split = match find_split(primitives, &ids, &bounds) {
            Some(split) if split.cost < C_INTERSECT * ids.len() as f32 => split,
            _ => return self.push_leaf(bounds, ids),
        };

        let (left_ids, right_ids) = partition(primitives, ids, &bounds, &split);
        let (left_bounds, right_bounds) = bounds.split(split.axis, split.position);

        // Reserve this node's slot before the children so parents precede them.
        let index = self.push_leaf(bounds, Vec::new());
        let left = self.build_node(primitives, left_ids, left_bounds, depth + 1);
        let right = self.build_node(primitives, right_ids, right_bounds, depth + 1);
        self.nodes[index].kind = NodeKind::Interior {
            axis: split.axis,
            position: split.position,
            children: [left, right],
        };
        index
    }

    /// Nearest intersection along `ray`, as the primitive's index and its
    /// surface hit. `primitives` must be the slice the tree was built from.
    pub fn intersect(
        &self,
        primitives: &[Primitive],
        ray: &Ray,
        stack: &mut TraversalStack,
    ) -> Option<(PrimitiveId, SurfaceHit)> {
        let root = self.nodes.first()?;
        let span = root.bounds.intersect(ray)?;

        let stack = &mut stack.entries;
        stack.clear();
        stack.push(StackEntry {
            node: 0,
            t_enter: span.min,
            t_exit: span.max,
        });

        let mut best: Option<(PrimitiveId, SurfaceHit)> = None;

        while let Some(StackEntry {
            mut node,
            t_enter,
            mut t_exit,
        }) = stack.pop()
        {
            if matches!(best, Some((_, hit)) if t_enter > hit.t) {
                continue;
            }

            loop {
                match &self.nodes[node].kind {
                    NodeKind::Interior {
                        axis,
                        position,
                        children,
                    } => {
                        let a = axis.index();
                        let o = ray.origin[a];
                        let t = (position - o) * ray.inv_direction[a];

                        let below = o < *position || (o == *position && ray.direction[a] <= 0.0);
                        let (near, far) = if below {
                            (children[0], children[1])
                        } else {
                            (children[1], children[0])
                        };

                        if t.is_nan() {
                            // Travelling inside the split plane: both sides touch the ray.
                            stack.push(StackEntry {
                                node: far,
                                t_enter,
                                t_exit,
                            });
                            node = near;
                        } else if t >= t_exit + RT_RAY_EPSILON || t <= 0.0 {
                            // Also taken when the origin lies on the plane: the
                            // ray only ever moves into the near side.
                            node = near;
                        } else if t <= t_enter - RT_RAY_EPSILON {
                            node = far;
                        } else {
                            stack.push(StackEntry {
                                node: far,
                                t_enter: t.max(t_enter),
                                t_exit,
                            });
                            node = near;
                            t_exit = t.min(t_exit);
                        }
                    }
                    NodeKind::Leaf { primitives: ids } => {
                        let lo = t_enter - RT_RAY_EPSILON;
                        let hi = t_exit + RT_RAY_EPSILON;
                        for &id in ids {
                            let Some(hit) = primitives[id].intersect(ray) else {
                                continue;
                            };
                            if hit.t < lo || hit.t > hi {
                                continue;
                            }
                            if best.map_or(true, |(_, b)| hit.t < b.t) {
                                best = Some((id, hit));
                            }
                        }
                        break;
                    }
                }
            }

            // Remaining entries are further along the ray.
            if let Some((_, hit)) = best {
                if stack.last().map_or(true, |e| e.t_enter > hit.t) {
                    return best;
                }
            }
        }

        best
    }

    /// Node and leaf counts, depth and leaf occupancy.
    pub fn stats(&self) -> KdTreeStats {
        let mut stats = KdTreeStats::default();
        if self.nodes.is_empty() {
            return stats;
        }
        let mut pending = vec![(0usize, 1usize)];
        while let Some((index, depth)) = pending.pop() {
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            match &self.nodes[index].kind {
                NodeKind::Interior { children, .. } => {
                    pending.push((children[0], depth + 1));
                    pending.push((children[1], depth + 1));
                }
                NodeKind::Leaf { primitives } => {
                    stats.leaves += 1;
                    stats.references += primitives.len();
                }
            }
        }
        stats
    }
}

/// Extent of a primitive's box inside `bounds` along `axis`.
#[inline]
fn clipped_extent(primitive: &Primitive, bounds: &Aabb, axis: Axis) -> (f32, f32) {
    let a = axis.index();
    let lo = primitive.bounds.min[a].max(bounds.min[a]);
    let hi = primitive.bounds.max[a].min(bounds.max[a]);
    (lo, hi)
}

/// Fold negative zero into positive zero so equal positions sort together.
#[inline]
fn canonical(x: f32) -> f32 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

fn sah_cost(bounds: &Aabb, axis: Axis, position: f32, n_left: usize, n_right: usize) -> f32 {
    let total = bounds.surface_area();
    let (left, right) = bounds.split(axis, position);
    C_TRAVERSE
        + C_INTERSECT
            * (left.surface_area() / total * n_left as f32
                + right.surface_area() / total * n_right as f32)
}

/// Cheapest split over all axes, sweeping the sorted events of each.
fn find_split(primitives: &[Primitive], ids: &[PrimitiveId], bounds: &Aabb) -> Option<Split> {
    let mut best: Option<Split> = None;
    let mut events = Vec::with_capacity(ids.len() * 2);

    for axis in Axis::ALL {
        events.clear();
        for &id in ids {
            let (lo, hi) = clipped_extent(&primitives[id], bounds, axis);
            let (lo, hi) = (canonical(lo), canonical(hi));
            if lo == hi {
                events.push(Event {
                    position: lo,
                    kind: EventKind::Cont,
                });
            } else {
                events.push(Event {
                    position: lo,
                    kind: EventKind::Plus,
                });
                events.push(Event {
                    position: hi,
                    kind: EventKind::Minus,
                });
            }
        }
        events.sort_by(|a, b| a.position.total_cmp(&b.position).then(a.kind.cmp(&b.kind)));

        let mut n_left = 0;
        let mut n_right = ids.len();
        let mut i = 0;
        while i < events.len() {
            let position = events[i].position;
            let (mut minus, mut cont, mut plus) = (0, 0, 0);
            while i < events.len() && events[i].position == position {
                match events[i].kind {
                    EventKind::Minus => minus += 1,
                    EventKind::Cont => cont += 1,
                    EventKind::Plus => plus += 1,
                }
                i += 1;
            }

            n_right -= minus + cont;
            let planar_left = sah_cost(bounds, axis, position, n_left + cont, n_right);
            let planar_right = sah_cost(bounds, axis, position, n_left, n_right + cont);
            let (cost, planar) = if planar_left <= planar_right {
                (planar_left, Side::Left)
            } else {
                (planar_right, Side::Right)
            };
            if best.map_or(true, |b| cost < b.cost) {
                best = Some(Split {
                    axis,
                    position,
                    planar,
                    cost,
                });
            }
            n_left += plus + cont;
        }
    }
    best
}

/// Distribute primitives to the children of `split`. Primitives crossing the
/// plane go to both sides; primitives lying in it go to the chosen side.
fn partition(
    primitives: &[Primitive],
    ids: Vec<PrimitiveId>,
    bounds: &Aabb,
    split: &Split,
) -> (Vec<PrimitiveId>, Vec<PrimitiveId>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for id in ids {
        let (lo, hi) = clipped_extent(&primitives[id], bounds, split.axis);
        if lo == split.position && hi == split.position {
            match split.planar {
                Side::Left => left.push(id),
                Side::Right => right.push(id),
            }
            continue;
        }
        if lo < split.position {
            left.push(id);
        }
        if hi > split.position {
            right.push(id);
        }
    }
    (left, right)
}
