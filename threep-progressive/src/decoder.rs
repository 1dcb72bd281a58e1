//! Vertex-split refiner
//!
//! [`ProgressiveDecoder`] is seeded with a base mesh and grows it one
//! [`VertexSplit`] at a time. Every split is validated in full before any
//! state is touched, so a rejected record leaves the decoder as it was.

use crate::neighbors::{build_stars, compute_fan, rotate_to_min, Fan};
use threep_core::{
    check_row, AttributeTable, AttributedMesh, Error, ProgressiveMesh, Result, VertexSplit,
};
use tracing::{debug, warn};

/// Refinement state machine seeded from a base mesh
#[derive(Debug, Clone)]
pub struct ProgressiveDecoder {
    cells: Vec<[usize; 3]>,
    stars: Vec<Vec<usize>>,
    rings: Vec<Vec<usize>>,
    non_manifold: Vec<bool>,
    vertex_attributes: AttributeTable,
    cell_attributes: AttributeTable,
    applied: usize,
}

impl ProgressiveDecoder {
    /// Seed the decoder with a base mesh
    pub fn new(base: AttributedMesh) -> Result<Self> {
        base.validate()?;
        let AttributedMesh {
            vertex_count,
            cells,
            vertex_attributes,
            cell_attributes,
        } = base;

        let mut stars = build_stars(vertex_count, &cells);
        let mut rings = vec![Vec::new(); vertex_count];
        let mut non_manifold = vec![false; vertex_count];
        for v in 0..vertex_count {
            match compute_fan(&cells, &stars[v], v) {
                Ok(fan) => {
                    rings[v] = fan.ring;
                    stars[v] = fan.star;
                }
                Err(err) => {
                    warn!(vertex = v, error = %err, "Base vertex is not manifold");
                    non_manifold[v] = true;
                }
            }
        }

        Ok(Self {
            cells,
            stars,
            rings,
            non_manifold,
            vertex_attributes,
            cell_attributes,
            applied: 0,
        })
    }

    /// Seed the decoder with the base mesh of a progressive mesh
    pub fn from_progressive(mesh: &ProgressiveMesh) -> Result<Self> {
        mesh.validate()?;
        let header = &mesh.header;
        let base = &mesh.initial_complex;
        Self::new(AttributedMesh::new(
            base.vertex_count,
            base.cells.clone(),
            base.vertex_table(&header.vertex_attribute_types)?,
            base.cell_table(&header.cell_attribute_types)?,
        )?)
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of splits applied so far
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn cells(&self) -> &[[usize; 3]] {
        &self.cells
    }

    pub fn ring(&self, vertex: usize) -> &[usize] {
        self.rings.get(vertex).map_or(&[], Vec::as_slice)
    }

    pub fn star(&self, vertex: usize) -> &[usize] {
        self.stars.get(vertex).map_or(&[], Vec::as_slice)
    }

    pub fn is_manifold(&self, vertex: usize) -> bool {
        !self.non_manifold.get(vertex).copied().unwrap_or(true)
    }

    /// Split `split.base_vertex` in two and return the index of the new vertex
    pub fn vsplit(&mut self, split: &VertexSplit) -> Result<usize> {
        let s = split.base_vertex;
        let vertex_count = self.vertex_count();
        if s >= vertex_count {
            return Err(Error::VertexOutOfRange {
                vertex: s,
                count: vertex_count,
            });
        }
        if self.non_manifold[s] {
            return Err(Error::NonManifoldFan { vertex: s });
        }

        let len = self.rings[s].len();
        for index in [split.left, split.right] {
            if index >= len {
                return Err(Error::RingIndexOutOfRange {
                    vertex: s,
                    index,
                    len,
                });
            }
        }
        if split.left == split.right {
            return Err(Error::InvalidData(format!(
                "split of vertex {} uses ring index {} for both faces",
                s, split.left
            )));
        }
        if split.left_orientation == split.right_orientation {
            return Err(Error::InconsistentOrientation { vertex: s });
        }
        check_row(self.vertex_attributes.types(), &split.vertex_attributes)?;
        check_row(self.cell_attributes.types(), &split.left_attributes)?;
        check_row(self.cell_attributes.types(), &split.right_attributes)?;

        // The arc from `first` to `last` moves over to the new vertex
        let (first, last) = if split.left_orientation {
            (split.left, split.right)
        } else {
            (split.right, split.left)
        };
        let to_t = (last + len - first) % len;
        let to_s = len - to_t;

        let ring = self.rings[s].clone();
        let star = self.stars[s].clone();
        for &x in &ring {
            if self.non_manifold[x] {
                return Err(Error::NonManifoldFan { vertex: x });
            }
            if !self.rings[x].contains(&s) {
                return Err(Error::InvalidData(format!(
                    "vertex {} is in the ring of {} but not the other way around",
                    x, s
                )));
            }
        }

        let t = vertex_count;
        let left = ring[split.left];
        let right = ring[split.right];
        let left_face = self.cells.len();
        let right_face = left_face + 1;
        let face = |apex: usize, orientation: bool| {
            if orientation {
                [apex, s, t]
            } else {
                [apex, t, s]
            }
        };
        self.cells.push(face(left, split.left_orientation));
        self.cells.push(face(right, split.right_orientation));
        self.vertex_attributes.push_row(&split.vertex_attributes)?;
        self.cell_attributes.push_row(&split.left_attributes)?;
        self.cell_attributes.push_row(&split.right_attributes)?;

        for (apex, f, orientation) in [
            (left, left_face, split.left_orientation),
            (right, right_face, split.right_orientation),
        ] {
            let k = self.rings[apex]
                .iter()
                .position(|&v| v == s)
                .ok_or(Error::NotIncident { vertex: s, cell: f })?;
            if orientation {
                self.rings[apex].insert(k, t);
            } else {
                self.rings[apex].insert(k + 1, t);
            }
            self.stars[apex].insert(k + 1, f);
            rotate_to_min(&mut self.rings[apex], &mut self.stars[apex]);
        }

        let (first_face, last_face) = if split.left_orientation {
            (left_face, right_face)
        } else {
            (right_face, left_face)
        };

        let mut ring_t = vec![s];
        ring_t.extend((0..=to_t).map(|k| ring[(first + k) % len]));
        let mut star_t = vec![last_face, first_face];
        star_t.extend((1..=to_t).map(|k| star[(first + k) % len]));

        let mut ring_s = vec![t];
        ring_s.extend((0..=to_s).map(|k| ring[(last + k) % len]));
        let mut star_s = vec![first_face, last_face];
        star_s.extend((1..=to_s).map(|k| star[(last + k) % len]));

        for &x in &ring_t[2..ring_t.len() - 1] {
            for v in self.rings[x].iter_mut().filter(|v| **v == s) {
                *v = t;
            }
            rotate_to_min(&mut self.rings[x], &mut self.stars[x]);
        }
        for &f in &star_t[2..] {
            for v in self.cells[f].iter_mut().filter(|v| **v == s) {
                *v = t;
            }
        }

        rotate_to_min(&mut ring_s, &mut star_s);
        rotate_to_min(&mut ring_t, &mut star_t);
        self.rings[s] = ring_s;
        self.stars[s] = star_s;
        self.rings.push(ring_t);
        self.stars.push(star_t);
        self.non_manifold.push(false);
        self.applied += 1;

        debug!(s, t, left, right, "Split vertex");
        Ok(t)
    }

    /// Apply every split in order
    pub fn apply_all(&mut self, splits: &[VertexSplit]) -> Result<()> {
        splits.iter().try_for_each(|split| self.vsplit(split).map(|_| ()))
    }

    /// Continue through `stream` (the full split stream this decoder was
    /// seeded for) until `vertex_count` vertices exist or the stream runs out.
    /// Returns the number of splits applied by this call.
    pub fn refine_to(&mut self, stream: &[VertexSplit], vertex_count: usize) -> Result<usize> {
        let mut count = 0;
        while self.vertex_count() < vertex_count {
            let Some(split) = stream.get(self.applied) else {
                break;
            };
            self.vsplit(split)?;
            count += 1;
        }
        Ok(count)
    }

    /// Verify that every vertex's ring matches its star
    pub fn check_topology(&self) -> Result<()> {
        for v in 0..self.vertex_count() {
            if self.non_manifold[v] {
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

    /// Snapshot of the current mesh
    pub fn mesh(&self) -> Result<AttributedMesh> {
        AttributedMesh::new(
            self.vertex_count(),
            self.cells.clone(),
            self.vertex_attributes.clone(),
            self.cell_attributes.clone(),
        )
    }

    pub fn into_mesh(self) -> Result<AttributedMesh> {
        let vertex_count = self.vertex_count();
        AttributedMesh::new(
            vertex_count,
            self.cells,
            self.vertex_attributes,
            self.cell_attributes,
        )
    }
}
