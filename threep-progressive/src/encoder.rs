//! Greedy edge-collapse simplifier
//!
//! [`ProgressiveEncoder`] owns one mutable topology snapshot (cells, stars,
//! rings, live flags) and a queue of collapse candidates keyed by edge. Each
//! [`ProgressiveEncoder::pop`] performs the cheapest valid collapse and
//! reports what the decoder needs to undo it. Candidate costs are refreshed
//! lazily: a popped entry whose neighborhood changed since it was queued is
//! rescored and requeued instead of collapsed.

use crate::heap::{HeapHandle, IndexedHeap};
use crate::neighbors::{build_stars, compute_fan, corner, has_duplicates, Fan};
use crate::options::EncoderOptions;
use std::collections::HashMap;
use threep_core::{validate_cells, AttributedMesh, Error, Result};
use tracing::{debug, info, trace, warn};

/// Marker stored in every index of a removed cell
pub const INVALID: usize = usize::MAX;

/// One applied collapse: `t` was merged into `s`, removing the two cells
/// `left_face` and `right_face` that contained the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeCollapse {
    pub s: usize,
    pub t: usize,
    /// Apex of the removed left face
    pub left: usize,
    /// Apex of the removed right face
    pub right: usize,
    /// Position of `left` in `ring`
    pub left_index: usize,
    /// Position of `right` in `ring`
    pub right_index: usize,
    /// Whether `t` followed `s` in the winding of the left face
    pub left_orientation: bool,
    /// Whether `t` followed `s` in the winding of the right face
    pub right_orientation: bool,
    pub left_face: usize,
    pub right_face: usize,
    /// Canonical ring of `s` right after the collapse
    pub ring: Vec<usize>,
}

/// Edge-collapse state machine over a single mesh
#[derive(Debug, Clone)]
pub struct ProgressiveEncoder {
    options: EncoderOptions,
    vertex_count: usize,
    cells: Vec<[usize; 3]>,
    stars: Vec<Vec<usize>>,
    rings: Vec<Vec<usize>>,
    live: Vec<bool>,
    non_manifold: Vec<bool>,
    heap: IndexedHeap<(usize, usize)>,
    candidates: HashMap<(usize, usize), HeapHandle>,
    live_vertices: usize,
    live_cells: usize,
    collapses: usize,
}

impl ProgressiveEncoder {
    /// Build stars, rings and the initial candidate queue for `cells`
    pub fn new(vertex_count: usize, cells: Vec<[usize; 3]>, options: EncoderOptions) -> Result<Self> {
        validate_cells(&cells, vertex_count)?;

        let stars = build_stars(vertex_count, &cells);
        let live_cells = cells.len();
        let mut encoder = Self {
            options,
            vertex_count,
            cells,
            stars,
            rings: vec![Vec::new(); vertex_count],
            live: vec![true; vertex_count],
            non_manifold: vec![false; vertex_count],
            heap: IndexedHeap::with_capacity(live_cells * 3 / 2),
            candidates: HashMap::with_capacity(live_cells * 3 / 2),
            live_vertices: vertex_count,
            live_cells,
            collapses: 0,
        };

        for v in 0..vertex_count {
            encoder.refresh_fan(v);
        }

        for f in 0..encoder.cells.len() {
            let cell = encoder.cells[f];
            for k in 0..3 {
                let key = edge_key(cell[k], cell[(k + 1) % 3]);
                if !encoder.candidates.contains_key(&key) {
                    encoder.update_candidate(key.0, key.1);
                }
            }
        }

        info!(
            vertices = vertex_count,
            cells = live_cells,
            non_manifold = encoder.non_manifold.iter().filter(|&&flag| flag).count(),
            candidates = encoder.candidates.len(),
            "Initialized progressive encoder"
        );
        Ok(encoder)
    }

    /// Encoder over the connectivity of an attributed mesh
    pub fn from_mesh(mesh: &AttributedMesh, options: EncoderOptions) -> Result<Self> {
        Self::new(mesh.vertex_count, mesh.cells.clone(), options)
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Total number of vertices, live or not
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn live_vertex_count(&self) -> usize {
        self.live_vertices
    }

    pub fn live_cell_count(&self) -> usize {
        self.live_cells
    }

    pub fn collapse_count(&self) -> usize {
        self.collapses
    }

    /// Number of queued collapse candidates
    pub fn candidate_count(&self) -> usize {
        self.heap.len()
    }

    /// All cells; removed ones hold [`INVALID`]
    pub fn cells(&self) -> &[[usize; 3]] {
        &self.cells
    }

    pub fn ring(&self, vertex: usize) -> &[usize] {
        self.rings.get(vertex).map_or(&[], Vec::as_slice)
    }

    pub fn star(&self, vertex: usize) -> &[usize] {
        self.stars.get(vertex).map_or(&[], Vec::as_slice)
    }

    pub fn is_live(&self, vertex: usize) -> bool {
        self.live.get(vertex).copied().unwrap_or(false)
    }

    /// False once the fan of `vertex` could not be walked
    pub fn is_manifold(&self, vertex: usize) -> bool {
        !self.non_manifold.get(vertex).copied().unwrap_or(true)
    }

    /// Live vertex indices and valid cell indices, both ascending
    pub fn base(&self) -> (Vec<usize>, Vec<usize>) {
        let vertices = (0..self.vertex_count).filter(|&v| self.live[v]).collect();
        let cells = (0..self.cells.len())
            .filter(|&f| self.cells[f][0] != INVALID)
            .collect();
        (vertices, cells)
    }

    /// Cost of collapsing the edge `(i, j)`; infinite when the collapse is not allowed
    pub fn collapse_cost(&self, i: usize, j: usize) -> f64 {
        let (a, b) = edge_key(i, j);
        if a == b || !self.is_collapsible(a) || !self.is_collapsible(b) {
            return f64::INFINITY;
        }

        let (ring_a, ring_b) = (&self.rings[a], &self.rings[b]);
        let (na, nb) = (ring_a.len(), ring_b.len());
        let Some(position) = ring_a.iter().position(|&v| v == b) else {
            return f64::INFINITY;
        };
        if na + nb > self.options.max_combined_ring || (na == 3 && nb == 3) {
            return f64::INFINITY;
        }
        if ring_a.iter().filter(|v| ring_b.contains(v)).count() != 2 {
            return f64::INFINITY;
        }
        if ring_a.iter().chain(ring_b).any(|&v| self.non_manifold[v]) {
            return f64::INFINITY;
        }

        let left = ring_a[(position + na - 1) % na];
        let right = ring_a[(position + 1) % na];
        if self.rings[left].len() <= 3 || self.rings[right].len() <= 3 {
            return f64::INFINITY;
        }
        let Some(arc) = arc_between(ring_b, left, right) else {
            return f64::INFINITY;
        };

        // Post-collapse ring of `a` and of every vertex that gains `a` as a neighbor
        let mut merged: Vec<usize> = ring_a.iter().copied().filter(|&v| v != b).collect();
        merged.extend_from_slice(&arc);
        if has_duplicates(&merged) || arc.iter().any(|&x| self.rings[x].contains(&a)) {
            return f64::INFINITY;
        }

        1000.0 * (na + nb) as f64 + na.max(nb) as f64 + b as f64 / self.vertex_count as f64
    }

    /// Perform the cheapest valid collapse, or return `None` once no candidate
    /// remains or the configured limits are reached.
    pub fn pop(&mut self) -> Result<Option<EdgeCollapse>> {
        loop {
            if self.options.is_exhausted(self.collapses, self.live_vertices) {
                return Ok(None);
            }
            let Some(handle) = self.heap.pop() else {
                return Ok(None);
            };
            let (Some(&(a, b)), Some(popped)) = (self.heap.get(handle), self.heap.cost(handle)) else {
                continue;
            };

            if !popped.is_finite() {
                self.drop_candidate(a, b);
                continue;
            }
            let cost = self.collapse_cost(a, b);
            if !cost.is_finite() {
                self.drop_candidate(a, b);
                continue;
            }
            if cost > popped {
                trace!(s = a, t = b, popped, cost, "Requeued stale candidate");
                self.heap.reinsert(handle, cost);
                continue;
            }

            self.drop_candidate(a, b);
            return self.collapse(a, b).map(Some);
        }
    }

    /// Collapse until exhausted, returning every record in collapse order
    pub fn run(&mut self) -> Result<Vec<EdgeCollapse>> {
        let mut collapses = Vec::new();
        while let Some(collapse) = self.pop()? {
            collapses.push(collapse);
        }
        info!(
            collapses = collapses.len(),
            base_vertices = self.live_vertices,
            base_cells = self.live_cells,
            "Simplification exhausted"
        );
        Ok(collapses)
    }

    /// Verify that every live, manifold vertex has a ring matching its star
    pub fn check_topology(&self) -> Result<()> {
        for v in 0..self.vertex_count {
            if !self.live[v] || self.non_manifold[v] {
                continue;
            }
            let fan = Fan {
                ring: self.rings[v].clone(),
                star: self.stars[v].clone(),
            };
            if !fan.is_consistent(&self.cells, v) || fan.has_repeated_neighbor() {
                return Err(Error::InvalidData(format!(
                    "ring and star of vertex {} disagree",
                    v
                )));
            }
        }
        Ok(())
    }

    fn is_collapsible(&self, vertex: usize) -> bool {
        vertex < self.vertex_count && self.live[vertex] && !self.non_manifold[vertex]
    }

    fn collapse(&mut self, v0: usize, v1: usize) -> Result<EdgeCollapse> {
        let ring0 = &self.rings[v0];
        let n0 = ring0.len();
        let i0 = ring0.iter().position(|&v| v == v1).ok_or_else(|| {
            Error::InvalidData(format!("vertex {} is not a neighbor of {}", v1, v0))
        })?;
        let left = ring0[(i0 + n0 - 1) % n0];
        let right = ring0[(i0 + 1) % n0];
        let left_face = self.stars[v0][i0];
        let right_face = self.stars[v0][(i0 + 1) % n0];
        let left_orientation = follows(&self.cells[left_face], v0, v1);
        let right_orientation = follows(&self.cells[right_face], v0, v1);

        let star1 = std::mem::take(&mut self.stars[v1]);
        let ring1 = std::mem::take(&mut self.rings[v1]);
        for &f in &star1 {
            if f == left_face || f == right_face {
                continue;
            }
            for index in self.cells[f].iter_mut().filter(|index| **index == v1) {
                *index = v0;
            }
            self.stars[v0].push(f);
        }
        for (face, apex) in [(left_face, left), (right_face, right)] {
            self.cells[face] = [INVALID; 3];
            self.stars[v0].retain(|&f| f != face);
            self.stars[apex].retain(|&f| f != face);
        }
        self.live[v1] = false;
        self.live_vertices -= 1;
        self.live_cells -= 2;
        self.collapses += 1;

        self.refresh_fan(v0);
        let ring = self.rings[v0].clone();
        for &v in &ring {
            self.refresh_fan(v);
        }

        for &x in &ring1 {
            self.drop_candidate(v1, x);
        }
        for &v in &ring {
            self.update_candidate(v0, v);
            for u in self.rings[v].clone() {
                self.update_candidate(v, u);
            }
        }

        let index_of = |vertex: usize| {
            ring.iter().position(|&v| v == vertex).ok_or_else(|| {
                Error::InvalidData(format!("apex {} missing from ring of {}", vertex, v0))
            })
        };
        let left_index = index_of(left)?;
        let right_index = index_of(right)?;
        let collapse = EdgeCollapse {
            s: v0,
            t: v1,
            left,
            right,
            left_index,
            right_index,
            left_orientation,
            right_orientation,
            left_face,
            right_face,
            ring,
        };
        debug!(
            s = v0,
            t = v1,
            left,
            right,
            live_vertices = self.live_vertices,
            "Collapsed edge"
        );
        Ok(collapse)
    }

    /// Sort the star of `vertex` and rewalk its fan, flagging it on failure
    fn refresh_fan(&mut self, vertex: usize) {
        self.stars[vertex].sort_unstable();
        match compute_fan(&self.cells, &self.stars[vertex], vertex) {
            Ok(fan) => {
                self.rings[vertex] = fan.ring;
                self.stars[vertex] = fan.star;
            }
            Err(err) => {
                if !self.non_manifold[vertex] {
                    warn!(vertex, error = %err, "Vertex marked non-manifold");
                }
                self.non_manifold[vertex] = true;
                let mut neighbors: Vec<usize> = self.stars[vertex]
                    .iter()
                    .flat_map(|&f| self.cells[f])
                    .filter(|&v| v != vertex && v != INVALID)
                    .collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                self.rings[vertex] = neighbors;
            }
        }
    }

    fn update_candidate(&mut self, i: usize, j: usize) {
        let key = edge_key(i, j);
        let cost = self.collapse_cost(key.0, key.1);
        match (self.candidates.get(&key).copied(), cost.is_finite()) {
            (Some(handle), true) => self.heap.reinsert(handle, cost),
            (None, true) => {
                let handle = self.heap.push(key, cost);
                self.candidates.insert(key, handle);
            }
            (Some(_), false) => self.drop_candidate(key.0, key.1),
            (None, false) => {}
        }
    }

    fn drop_candidate(&mut self, i: usize, j: usize) {
        if let Some(handle) = self.candidates.remove(&edge_key(i, j)) {
            self.heap.release(handle);
        }
    }
}

fn edge_key(i: usize, j: usize) -> (usize, usize) {
    (i.min(j), i.max(j))
}

/// Whether `t` comes right after `s` in the winding of `cell`
fn follows(cell: &[usize; 3], s: usize, t: usize) -> bool {
    corner(cell, s).is_some_and(|c| cell[(c + 1) % 3] == t)
}

/// Entries of `ring` strictly between `from` and `to`, walking forward cyclically
fn arc_between(ring: &[usize], from: usize, to: usize) -> Option<Vec<usize>> {
    let n = ring.len();
    let start = ring.iter().position(|&v| v == from)?;
    let end = ring.iter().position(|&v| v == to)?;
    let steps = (end + n - start) % n;
    Some((1..steps).map(|k| ring[(start + k) % n]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;
    use threep_core::TriangleMesh;

    fn encoder(mesh: &TriangleMesh) -> ProgressiveEncoder {
        ProgressiveEncoder::new(mesh.vertex_count(), mesh.faces.clone(), EncoderOptions::default())
            .unwrap()
    }

    /// Pop to exhaustion checking vertex/cell counts and fan duality after every step
    fn exhaust(encoder: &mut ProgressiveEncoder) -> Vec<EdgeCollapse> {
        let mut collapses = Vec::new();
        encoder.check_topology().unwrap();
        loop {
            let (vertices, cells) = (encoder.live_vertex_count(), encoder.live_cell_count());
            let Some(collapse) = encoder.pop().unwrap() else {
                break;
            };
            assert_eq!(encoder.live_vertex_count(), vertices - 1);
            assert_eq!(encoder.live_cell_count(), cells - 2);
            encoder.check_topology().unwrap();
            assert!(!encoder.is_live(collapse.t));
            assert_eq!(encoder.ring(collapse.s), collapse.ring.as_slice());
            collapses.push(collapse);
        }
        collapses
    }

    #[test]
    fn test_tetrahedron_is_irreducible() {
        let mut encoder = encoder(&shapes::tetrahedron());
        assert_eq!(encoder.collapse_cost(0, 1), f64::INFINITY);
        assert!(encoder.pop().unwrap().is_none());

        let (vertices, cells) = encoder.base();
        assert_eq!(vertices, vec![0, 1, 2, 3]);
        assert_eq!(cells, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cost_formula() {
        let encoder = encoder(&shapes::octahedron());
        // Rings of four on both ends; larger endpoint 2 of 6
        let expected = 1000.0 * 8.0 + 4.0 + 2.0 / 6.0;
        assert_eq!(encoder.collapse_cost(0, 2), expected);
        assert_eq!(encoder.collapse_cost(2, 0), expected);
        // +x and -x are not adjacent
        assert_eq!(encoder.collapse_cost(0, 1), f64::INFINITY);
        assert_eq!(encoder.collapse_cost(3, 3), f64::INFINITY);
    }

    #[test]
    fn test_octahedron_first_collapse() {
        let mut encoder = encoder(&shapes::octahedron());
        let collapse = encoder.pop().unwrap().unwrap();

        assert_eq!((collapse.s, collapse.t), (0, 2));
        assert!(collapse.left_orientation);
        assert!(!collapse.right_orientation);
        assert_eq!(collapse.ring[collapse.left_index], collapse.left);
        assert_eq!(collapse.ring[collapse.right_index], collapse.right);
        assert_eq!(encoder.cells()[collapse.left_face], [INVALID; 3]);
        assert_eq!(encoder.cells()[collapse.right_face], [INVALID; 3]);
        assert_eq!(encoder.ring(0).len(), 4);
        assert_eq!(encoder.ring(collapse.left).len(), 3);
        assert_eq!(encoder.ring(collapse.right).len(), 3);
        assert!(encoder.star(2).is_empty());
        encoder.check_topology().unwrap();
    }

    #[test]
    fn test_octahedron_exhaustion() {
        let mut encoder = encoder(&shapes::octahedron());
        let collapses = exhaust(&mut encoder);
        assert!(!collapses.is_empty());
        let (vertices, cells) = encoder.base();
        assert_eq!(vertices.len(), 6 - collapses.len());
        assert_eq!(cells.len(), 8 - 2 * collapses.len());
        assert!(vertices.len() >= 4);
    }

    #[test]
    fn test_sphere_and_torus_monotonic() {
        for mesh in [shapes::uv_sphere(6, 8), shapes::torus(8, 6)] {
            let mut encoder = encoder(&mesh);
            let collapses = exhaust(&mut encoder);
            assert!(!collapses.is_empty());
            assert_eq!(
                encoder.live_vertex_count(),
                mesh.vertex_count() - collapses.len()
            );
            for collapse in &collapses {
                assert!(collapse.left_orientation);
                assert!(!collapse.right_orientation);
                assert!(collapse.s < collapse.t);
            }
        }
    }

    #[test]
    fn test_max_collapses() {
        let mesh = shapes::uv_sphere(6, 8);
        let mut encoder = ProgressiveEncoder::new(
            mesh.vertex_count(),
            mesh.faces.clone(),
            EncoderOptions::default().with_max_collapses(3),
        )
        .unwrap();
        let collapses = encoder.run().unwrap();
        assert_eq!(collapses.len(), 3);
        assert_eq!(encoder.live_vertex_count(), mesh.vertex_count() - 3);
    }

    #[test]
    fn test_min_vertices() {
        let mesh = shapes::torus(8, 6);
        let mut encoder = ProgressiveEncoder::new(
            mesh.vertex_count(),
            mesh.faces.clone(),
            EncoderOptions::default().with_min_vertices(40),
        )
        .unwrap();
        encoder.run().unwrap();
        assert_eq!(encoder.live_vertex_count(), 40);
    }

    #[test]
    fn test_boundary_vertices_frozen() {
        // Fan of four triangles around vertex 0; the rim is an open boundary
        let cells = vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
        let mut encoder = ProgressiveEncoder::new(5, cells, EncoderOptions::default()).unwrap();
        assert!(encoder.is_manifold(0));
        for v in 1..5 {
            assert!(!encoder.is_manifold(v));
            assert_eq!(encoder.collapse_cost(0, v), f64::INFINITY);
        }
        assert!(encoder.pop().unwrap().is_none());
        assert_eq!(encoder.base().0.len(), 5);
    }

    #[test]
    fn test_non_manifold_vertex_flagged() {
        // Two octahedra glued at a single vertex
        let mut cells = shapes::octahedron().faces;
        let offset = 5;
        for face in shapes::octahedron().faces {
            cells.push(face.map(|v| if v == 0 { 0 } else { v + offset }));
        }
        let mut encoder = ProgressiveEncoder::new(11, cells, EncoderOptions::default()).unwrap();
        assert!(!encoder.is_manifold(0));
        encoder.run().unwrap();
        assert!(encoder.is_live(0));
        encoder.check_topology().unwrap();
    }

    #[test]
    fn test_rejects_bad_cells() {
        assert!(ProgressiveEncoder::new(3, vec![[0, 1, 3]], EncoderOptions::default()).is_err());
        assert!(ProgressiveEncoder::new(3, vec![[0, 1, 1]], EncoderOptions::default()).is_err());
    }

    #[test]
    fn test_arc_between() {
        let ring = [1, 4, 6, 8, 9];
        assert_eq!(arc_between(&ring, 4, 9), Some(vec![6, 8]));
        assert_eq!(arc_between(&ring, 8, 1), Some(vec![9]));
        assert_eq!(arc_between(&ring, 9, 1), Some(vec![]));
        assert_eq!(arc_between(&ring, 8, 4), Some(vec![9, 1]));
        assert_eq!(arc_between(&ring, 8, 5), None);
    }
}
