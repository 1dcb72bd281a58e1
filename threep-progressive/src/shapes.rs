//! Closed, consistently oriented test meshes
//!
//! Small primitives with outward-facing triangles, used by the tests and
//! benchmarks of this crate and handy for trying the codec out.

use std::f32::consts::PI;
use threep_core::{
    AttributeData, AttributeTable, AttributeType, AttributedMesh, Point3f, Result, ScalarType,
    TriangleMesh,
};

/// Name of the `uint32` attribute written by [`labeled`]
pub const LABEL: &str = "label";

/// Regular tetrahedron
pub fn tetrahedron() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(1.0, -1.0, -1.0),
            Point3f::new(-1.0, 1.0, -1.0),
            Point3f::new(-1.0, -1.0, 1.0),
        ],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )
}

/// Unit octahedron: +x, -x, +y, -y, +z, -z
pub fn octahedron() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, -1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(0.0, 0.0, -1.0),
        ],
        vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ],
    )
}

/// Torus sampled on a `major x minor` grid, both at least 3
pub fn torus(major: usize, minor: usize) -> TriangleMesh {
    let (major, minor) = (major.max(3), minor.max(3));
    let mut vertices = Vec::with_capacity(major * minor);
    for i in 0..major {
        let u = 2.0 * PI * i as f32 / major as f32;
        for j in 0..minor {
            let w = 2.0 * PI * j as f32 / minor as f32;
            let r = 2.0 + 0.5 * w.cos();
            vertices.push(Point3f::new(r * u.cos(), r * u.sin(), 0.5 * w.sin()));
        }
    }

    let index = |i: usize, j: usize| (i % major) * minor + j % minor;
    let mut faces = Vec::with_capacity(2 * major * minor);
    for i in 0..major {
        for j in 0..minor {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

/// Latitude/longitude sphere with a vertex at each pole.
///
/// `stacks` is the number of latitude bands (at least 2), `slices` the number
/// of longitude segments (at least 3).
pub fn uv_sphere(stacks: usize, slices: usize) -> TriangleMesh {
    let (stacks, slices) = (stacks.max(2), slices.max(3));
    let rings = stacks - 1;

    let mut vertices = Vec::with_capacity(rings * slices + 2);
    vertices.push(Point3f::new(0.0, 0.0, 1.0));
    for r in 0..rings {
        let theta = PI * (r + 1) as f32 / stacks as f32;
        for j in 0..slices {
            let phi = 2.0 * PI * j as f32 / slices as f32;
            vertices.push(Point3f::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ));
        }
    }
    let top = 0;
    let bottom = vertices.len();
    vertices.push(Point3f::new(0.0, 0.0, -1.0));

    let index = |r: usize, j: usize| 1 + r * slices + j % slices;
    let mut faces = Vec::with_capacity(2 * slices * stacks);
    for j in 0..slices {
        faces.push([top, index(0, j), index(0, j + 1)]);
    }
    for r in 0..rings - 1 {
        for j in 0..slices {
            let a = index(r, j);
            let b = index(r + 1, j);
            let c = index(r + 1, j + 1);
            let d = index(r, j + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    for j in 0..slices {
        faces.push([bottom, index(rings - 1, j + 1), index(rings - 1, j)]);
    }
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

/// Attributed copy of `mesh` whose vertices and cells carry their own index
/// as a `uint32` [`LABEL`], next to the geometric attributes.
pub fn labeled(mesh: &TriangleMesh) -> Result<AttributedMesh> {
    let mut attributed = AttributedMesh::try_from(mesh)?;

    let mut types = attributed.vertex_attributes.types().to_vec();
    let mut columns = attributed.vertex_attributes.columns().to_vec();
    types.push(AttributeType::new(LABEL, ScalarType::Uint32, 1));
    columns.push(AttributeData::from(
        (0..attributed.vertex_count as u32).collect::<Vec<u32>>(),
    ));
    attributed.vertex_attributes =
        AttributeTable::from_columns(types, columns, attributed.vertex_count)?;

    let cell_count = attributed.cell_count();
    attributed.cell_attributes = AttributeTable::from_columns(
        vec![AttributeType::new(LABEL, ScalarType::Uint32, 1)],
        vec![AttributeData::from((0..cell_count as u32).collect::<Vec<u32>>())],
        cell_count,
    )?;
    Ok(attributed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Every directed edge must appear exactly once and its reverse exactly once
    fn assert_closed_oriented(mesh: &TriangleMesh) {
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &mesh.faces {
            for k in 0..3 {
                *edges.entry((face[k], face[(k + 1) % 3])).or_default() += 1;
            }
        }
        for (&(a, b), &count) in &edges {
            assert_eq!(count, 1, "edge {}->{} repeated", a, b);
            assert_eq!(edges.get(&(b, a)), Some(&1), "edge {}->{} unmatched", a, b);
        }
    }

    #[test]
    fn test_primitives_closed() {
        for mesh in [tetrahedron(), octahedron(), torus(5, 4), uv_sphere(5, 6)] {
            assert_closed_oriented(&mesh);
        }
    }

    #[test]
    fn test_euler_characteristic() {
        let sphere = uv_sphere(4, 5);
        assert_eq!(sphere.vertex_count(), 3 * 5 + 2);
        assert_eq!(
            sphere.vertex_count() as i64 - (3 * sphere.face_count() / 2) as i64
                + sphere.face_count() as i64,
            2
        );
        let torus = torus(6, 3);
        assert_eq!(torus.vertex_count(), 18);
        assert_eq!(torus.face_count(), 36);
    }

    #[test]
    fn test_labeled() {
        let mesh = labeled(&octahedron()).unwrap();
        let (ty, column) = mesh.vertex_attributes.column(LABEL).unwrap();
        assert_eq!(ty.scalar, ScalarType::Uint32);
        assert_eq!(column.as_u32().unwrap(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.cell_attributes.len(), 8);
        mesh.validate().unwrap();
    }
}
