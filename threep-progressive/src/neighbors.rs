//! Ordered one-ring computation around a vertex
//!
//! A vertex `v` of a closed, consistently oriented triangle mesh is surrounded
//! by a cycle of triangles. Walking that cycle gives the neighbor ring of `v`
//! and the star (incident triangles) in matching order: `star[i]` is the
//! triangle `(v, ring[i], ring[i - 1])`, indices taken cyclically. Rings are
//! canonicalized by rotating the smallest neighbor to the front, so two walks
//! of the same fan compare equal no matter which triangle they started from.

use itertools::Itertools;
use threep_core::{Error, Result};

/// Neighbor ring and star of one vertex, in fan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fan {
    pub ring: Vec<usize>,
    pub star: Vec<usize>,
}

impl Fan {
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Rotate ring and star together so the smallest neighbor comes first
    pub fn canonicalize(&mut self) {
        rotate_to_min(&mut self.ring, &mut self.star);
    }

    /// True when some neighbor appears more than once
    pub fn has_repeated_neighbor(&self) -> bool {
        has_duplicates(&self.ring)
    }

    /// Check that every `star[i]` is exactly `(vertex, ring[i], ring[i - 1])` up to rotation
    pub fn is_consistent(&self, cells: &[[usize; 3]], vertex: usize) -> bool {
        let n = self.ring.len();
        if n != self.star.len() {
            return false;
        }
        (0..n).all(|i| {
            let Some(cell) = cells.get(self.star[i]) else {
                return false;
            };
            let Some(c) = corner(cell, vertex) else {
                return false;
            };
            cell[(c + 1) % 3] == self.ring[i] && cell[(c + 2) % 3] == self.ring[(i + n - 1) % n]
        })
    }
}

/// Position of `vertex` within a cell
#[inline]
pub(crate) fn corner(cell: &[usize; 3], vertex: usize) -> Option<usize> {
    cell.iter().position(|&v| v == vertex)
}

/// Rotate `ring` (and `star` alongside it) so that its minimum is first
pub fn rotate_to_min(ring: &mut [usize], star: &mut [usize]) {
    if let Some(k) = ring.iter().position_min() {
        ring.rotate_left(k);
        star.rotate_left(k);
    }
}

pub(crate) fn has_duplicates(values: &[usize]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, v)| values[i + 1..].contains(v))
}

/// Walk the fan of `vertex` through the triangles in `star`.
///
/// Starts at `star[0]` and repeatedly moves to the unused triangle whose
/// trailing edge is the current neighbor. Fails with [`Error::OpenFan`] when
/// the walk cannot continue or does not close on itself, and with
/// [`Error::NonManifoldFan`] when a neighbor repeats. Quadratic in the star size.
pub fn compute_fan(cells: &[[usize; 3]], star: &[usize], vertex: usize) -> Result<Fan> {
    let n = star.len();
    if n == 0 {
        return Ok(Fan::default());
    }

    let mut corners = Vec::with_capacity(n);
    for &f in star {
        let cell = cells
            .get(f)
            .ok_or_else(|| Error::InvalidData(format!("star references missing cell {}", f)))?;
        let c = corner(cell, vertex).ok_or(Error::NotIncident { vertex, cell: f })?;
        corners.push(c);
    }

    let first = &cells[star[0]];
    let closing = first[(corners[0] + 2) % 3];
    let mut current = first[(corners[0] + 1) % 3];

    let mut fan = Fan {
        ring: Vec::with_capacity(n),
        star: Vec::with_capacity(n),
    };
    fan.ring.push(current);
    fan.star.push(star[0]);

    let mut used = vec![false; n];
    used[0] = true;
    for _ in 1..n {
        let (j, next) = (0..n)
            .filter(|&j| !used[j])
            .find_map(|j| {
                let cell = &cells[star[j]];
                let c = corners[j];
                (cell[(c + 2) % 3] == current).then_some((j, cell[(c + 1) % 3]))
            })
            .ok_or(Error::OpenFan { vertex })?;
        used[j] = true;
        current = next;
        fan.ring.push(current);
        fan.star.push(star[j]);
    }

    if current != closing {
        return Err(Error::OpenFan { vertex });
    }
    if fan.has_repeated_neighbor() {
        return Err(Error::NonManifoldFan { vertex });
    }

    fan.canonicalize();
    Ok(fan)
}

/// Canonical neighbor ring of `vertex`
pub fn compute_neighbors(cells: &[[usize; 3]], star: &[usize], vertex: usize) -> Result<Vec<usize>> {
    compute_fan(cells, star, vertex).map(|fan| fan.ring)
}

/// Incident triangle indices for every vertex, each list sorted by triangle index
pub fn build_stars(vertex_count: usize, cells: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut stars = vec![Vec::new(); vertex_count];
    for (f, cell) in cells.iter().enumerate() {
        for &v in cell {
            if let Some(star) = stars.get_mut(v) {
                star.push(f);
            }
        }
    }
    stars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn test_empty_star() {
        let fan = compute_fan(&[], &[], 0).unwrap();
        assert!(fan.is_empty());
    }

    #[test]
    fn test_tetrahedron_fans() {
        let mesh = shapes::tetrahedron();
        let stars = build_stars(4, &mesh.faces);
        for v in 0..4 {
            let fan = compute_fan(&mesh.faces, &stars[v], v).unwrap();
            assert_eq!(fan.len(), 3);
            assert!(fan.is_consistent(&mesh.faces, v));
            assert_eq!(fan.ring[0], *fan.ring.iter().min().unwrap());
        }
        // Around vertex 0, (0,1,3) precedes (0,2,1) which precedes (0,3,2)
        let fan = compute_fan(&mesh.faces, &stars[0], 0).unwrap();
        assert_eq!(fan.ring, vec![1, 2, 3]);
        assert_eq!(fan.star, vec![1, 0, 2]);
    }

    #[test]
    fn test_rotation_independent() {
        let mesh = shapes::octahedron();
        let stars = build_stars(6, &mesh.faces);
        for v in 0..6 {
            let reference = compute_fan(&mesh.faces, &stars[v], v).unwrap();
            let mut rotated = stars[v].clone();
            for _ in 0..rotated.len() {
                rotated.rotate_left(1);
                let fan = compute_fan(&mesh.faces, &rotated, v).unwrap();
                assert_eq!(fan, reference);
            }
            let mut reversed = stars[v].clone();
            reversed.reverse();
            assert_eq!(compute_fan(&mesh.faces, &reversed, v).unwrap(), reference);
        }
    }

    #[test]
    fn test_open_fan_rejected() {
        let cells = [[0, 1, 2], [0, 2, 3]];
        let stars = build_stars(4, &cells);
        assert!(matches!(
            compute_fan(&cells, &stars[0], 0),
            Err(Error::OpenFan { vertex: 0 })
        ));
    }

    #[test]
    fn test_pinched_vertex_rejected() {
        // Two closed cones sharing their apex
        let cells = [
            [0, 1, 2],
            [0, 2, 3],
            [0, 3, 1],
            [0, 4, 5],
            [0, 5, 6],
            [0, 6, 4],
        ];
        let stars = build_stars(7, &cells);
        assert!(compute_fan(&cells, &stars[0], 0).is_err());
    }

    #[test]
    fn test_not_incident() {
        let cells = [[0, 1, 2], [1, 2, 3]];
        assert!(matches!(
            compute_fan(&cells, &[0, 1], 0),
            Err(Error::NotIncident { vertex: 0, cell: 1 })
        ));
    }

    #[test]
    fn test_rotate_to_min() {
        let mut ring = vec![7, 3, 9, 5];
        let mut star = vec![10, 11, 12, 13];
        rotate_to_min(&mut ring, &mut star);
        assert_eq!(ring, vec![3, 9, 5, 7]);
        assert_eq!(star, vec![11, 12, 13, 10]);
    }
}
