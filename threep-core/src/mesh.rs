//! Mesh data structures

use crate::attribute::{AttributeData, AttributeTable, AttributeType, ScalarType};
use crate::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Attribute name used for vertex positions
pub const POSITION: &str = "position";
/// Attribute name used for vertex normals
pub const NORMAL: &str = "normal";
/// Attribute name used for vertex colors
pub const COLOR: &str = "color";

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangle mesh whose per-vertex and per-cell data are typed attribute columns.
///
/// This is the form the progressive encoder consumes and the decoder produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedMesh {
    pub vertex_count: usize,
    pub cells: Vec<[usize; 3]>,
    pub vertex_attributes: AttributeTable,
    pub cell_attributes: AttributeTable,
}

impl AttributedMesh {
    /// Mesh with connectivity only
    pub fn from_cells(vertex_count: usize, cells: Vec<[usize; 3]>) -> Self {
        let cell_count = cells.len();
        Self {
            vertex_count,
            cells,
            vertex_attributes: AttributeTable::untyped(vertex_count),
            cell_attributes: AttributeTable::untyped(cell_count),
        }
    }

    /// Build and validate a mesh
    pub fn new(
        vertex_count: usize,
        cells: Vec<[usize; 3]>,
        vertex_attributes: AttributeTable,
        cell_attributes: AttributeTable,
    ) -> Result<Self> {
        let mesh = Self {
            vertex_count,
            cells,
            vertex_attributes,
            cell_attributes,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check attribute lengths and that every cell references three distinct vertices in range
    pub fn validate(&self) -> Result<()> {
        self.vertex_attributes.validate()?;
        self.cell_attributes.validate()?;
        if self.vertex_attributes.len() != self.vertex_count {
            return Err(Error::AttributeMismatch(format!(
                "vertex attributes describe {} vertices, mesh has {}",
                self.vertex_attributes.len(),
                self.vertex_count
            )));
        }
        if self.cell_attributes.len() != self.cells.len() {
            return Err(Error::AttributeMismatch(format!(
                "cell attributes describe {} cells, mesh has {}",
                self.cell_attributes.len(),
                self.cells.len()
            )));
        }
        validate_cells(&self.cells, self.vertex_count)
    }

    /// Convert back to a geometric mesh using the `position` attribute
    pub fn to_triangle_mesh(&self) -> Result<TriangleMesh> {
        let positions = float3_column(&self.vertex_attributes, POSITION)?.ok_or_else(|| {
            Error::InvalidData(format!("mesh has no float32x3 '{}' attribute", POSITION))
        })?;
        let vertices = positions
            .chunks_exact(3)
            .map(|p| Point3f::new(p[0], p[1], p[2]))
            .collect();
        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, self.cells.clone());

        if let Some(normals) = float3_column(&self.vertex_attributes, NORMAL)? {
            mesh.set_normals(
                normals
                    .chunks_exact(3)
                    .map(|n| Vector3f::new(n[0], n[1], n[2]))
                    .collect(),
            );
        }
        if let Some((ty, column)) = self.vertex_attributes.column(COLOR) {
            if let (Some(colors), 3) = (column.as_u8(), ty.count) {
                mesh.set_colors(colors.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect());
            }
        }
        Ok(mesh)
    }
}

impl TryFrom<&TriangleMesh> for AttributedMesh {
    type Error = Error;

    /// Positions, and normals/colors when present, become vertex attributes
    fn try_from(mesh: &TriangleMesh) -> Result<Self> {
        let vertex_count = mesh.vertices.len();
        let mut types = vec![AttributeType::new(POSITION, ScalarType::Float32, 3)];
        let mut columns = vec![AttributeData::from(
            mesh.vertices
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .collect::<Vec<f32>>(),
        )];
        if let Some(normals) = &mesh.normals {
            types.push(AttributeType::new(NORMAL, ScalarType::Float32, 3));
            columns.push(
                normals
                    .iter()
                    .flat_map(|n| [n.x, n.y, n.z])
                    .collect::<Vec<f32>>()
                    .into(),
            );
        }
        if let Some(colors) = &mesh.colors {
            types.push(AttributeType::new(COLOR, ScalarType::Uint8, 3));
            columns.push(colors.iter().flatten().copied().collect::<Vec<u8>>().into());
        }

        AttributedMesh::new(
            vertex_count,
            mesh.faces.clone(),
            AttributeTable::from_columns(types, columns, vertex_count)?,
            AttributeTable::untyped(mesh.faces.len()),
        )
    }
}

fn float3_column<'a>(table: &'a AttributeTable, name: &str) -> Result<Option<&'a [f32]>> {
    match table.column(name) {
        None => Ok(None),
        Some((ty, column)) => match (column.as_f32(), ty.count) {
            (Some(values), 3) => Ok(Some(values)),
            _ => Err(Error::AttributeMismatch(format!(
                "attribute '{}' must be float32 x 3, found {} x {}",
                name, ty.scalar, ty.count
            ))),
        },
    }
}

/// Check that every cell references three distinct vertices below `vertex_count`
pub fn validate_cells(cells: &[[usize; 3]], vertex_count: usize) -> Result<()> {
    for (index, cell) in cells.iter().enumerate() {
        if let Some(&vertex) = cell.iter().find(|&&v| v >= vertex_count) {
            return Err(Error::VertexOutOfRange {
                vertex,
                count: vertex_count,
            });
        }
        if cell[0] == cell[1] || cell[1] == cell[2] || cell[0] == cell[2] {
            return Err(Error::DegenerateCell {
                cell: index,
                indices: *cell,
            });
        }
    }
    Ok(())
}
