//! Structural form of a progressive mesh
//!
//! A [`ProgressiveMesh`] is a coarse base mesh ([`InitialComplex`]) plus an
//! ordered stream of [`VertexSplit`] records that refine it back to the full
//! mesh. This is the plain record the encoder produces, the decoder consumes,
//! and the wire codec translates to and from bytes.

use crate::attribute::{check_row, AttributeData, AttributeTable, AttributeType};
use crate::mesh::validate_cells;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format version written into every header
pub const FORMAT_VERSION: Version = Version {
    major: 1,
    minor: 0,
    patch: 0,
};

/// Semantic version of the format, serialized as `"major.minor.patch"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        FORMAT_VERSION
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidData(format!("Invalid version: {}", s)))?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(Version::new(*major, *minor, *patch)),
            _ => Err(Error::InvalidData(format!("Invalid version: {}", s))),
        }
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Counts and attribute schemas of the fully refined mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub version: Version,
    pub vertex_count: usize,
    pub cell_count: usize,
    pub vertex_attribute_types: Vec<AttributeType>,
    pub cell_attribute_types: Vec<AttributeType>,
}

/// The coarse base mesh that refinement starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialComplex {
    pub vertex_count: usize,
    pub cell_count: usize,
    pub cells: Vec<[usize; 3]>,
    /// One flattened column per vertex attribute
    pub vertex_attributes: Vec<AttributeData>,
    /// One flattened column per cell attribute
    pub cell_attributes: Vec<AttributeData>,
}

/// One refinement step: split `base_vertex` into itself and a new vertex.
///
/// `left`/`right` index the base vertex's canonical neighbor ring at the time
/// the split is applied. An orientation flag set means the new face is
/// `(ring vertex, base, new)`, otherwise `(ring vertex, new, base)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexSplit {
    pub base_vertex: usize,
    /// One element value per vertex attribute for the new vertex
    pub vertex_attributes: Vec<AttributeData>,
    pub left: usize,
    pub left_orientation: bool,
    pub left_attributes: Vec<AttributeData>,
    pub right: usize,
    pub right_orientation: bool,
    pub right_attributes: Vec<AttributeData>,
}

/// Base mesh plus split stream, in coarse-to-fine order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveMesh {
    pub header: Header,
    pub initial_complex: InitialComplex,
    pub vertex_splits: Vec<VertexSplit>,
}

impl InitialComplex {
    /// Vertex attribute columns as a validated table
    pub fn vertex_table(&self, types: &[AttributeType]) -> Result<AttributeTable> {
        AttributeTable::from_columns(
            types.to_vec(),
            self.vertex_attributes.clone(),
            self.vertex_count,
        )
    }

    /// Cell attribute columns as a validated table
    pub fn cell_table(&self, types: &[AttributeType]) -> Result<AttributeTable> {
        AttributeTable::from_columns(types.to_vec(), self.cell_attributes.clone(), self.cell_count)
    }
}

impl ProgressiveMesh {
    /// Number of vertices after applying the first `splits` records
    pub fn vertex_count_at(&self, splits: usize) -> usize {
        self.initial_complex.vertex_count + splits.min(self.vertex_splits.len())
    }

    /// Check every structural constraint that does not require replaying topology
    pub fn validate(&self) -> Result<()> {
        let header = &self.header;
        let base = &self.initial_complex;

        if base.cells.len() != base.cell_count {
            return Err(Error::InvalidData(format!(
                "initial complex declares {} cells but lists {}",
                base.cell_count,
                base.cells.len()
            )));
        }
        let splits = self.vertex_splits.len();
        if header.vertex_count != base.vertex_count + splits {
            return Err(Error::InvalidData(format!(
                "header declares {} vertices, base has {} plus {} splits",
                header.vertex_count, base.vertex_count, splits
            )));
        }
        if header.cell_count != base.cell_count + 2 * splits {
            return Err(Error::InvalidData(format!(
                "header declares {} cells, base has {} plus {} split faces",
                header.cell_count,
                base.cell_count,
                2 * splits
            )));
        }

        base.vertex_table(&header.vertex_attribute_types)?;
        base.cell_table(&header.cell_attribute_types)?;
        validate_cells(&base.cells, base.vertex_count)?;

        for (index, split) in self.vertex_splits.iter().enumerate() {
            let available = base.vertex_count + index;
            if split.base_vertex >= available {
                return Err(Error::VertexOutOfRange {
                    vertex: split.base_vertex,
                    count: available,
                });
            }
            check_row(&header.vertex_attribute_types, &split.vertex_attributes)?;
            check_row(&header.cell_attribute_types, &split.left_attributes)?;
            check_row(&header.cell_attribute_types, &split.right_attributes)?;
        }
        Ok(())
    }
}
