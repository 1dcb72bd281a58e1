//! Progressive mesh encoding and refinement
//!
//! This crate turns a closed, consistently oriented triangle mesh into a
//! coarse base mesh plus a stream of vertex splits, and replays such a stream
//! back into the full mesh:
//! - Ordered one-ring computation (`neighbors`)
//! - Indexed priority queue with handle-based updates (`heap`)
//! - Greedy edge-collapse encoder (`encoder`)
//! - Vertex-split decoder (`decoder`)
//! - Whole-mesh drivers and level-of-detail simplification (`codec`)

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod heap;
pub mod neighbors;
pub mod options;
pub mod shapes;

pub use codec::*;
pub use decoder::*;
pub use encoder::*;
pub use heap::*;
pub use neighbors::*;
pub use options::*;

use threep_core::{AttributedMesh, Error, Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction ratio (0.0 = no reduction, 1.0 = maximum reduction)
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh>;
}

/// Level-of-detail simplifier: encodes the mesh, then decodes only as many
/// splits as the requested face budget allows.
#[derive(Debug, Clone, Default)]
pub struct ProgressiveSimplifier {
    pub options: EncoderOptions,
}

impl ProgressiveSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Self { options }
    }
}

impl MeshSimplifier for ProgressiveSimplifier {
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reduction_ratio) {
            return Err(Error::InvalidData(
                "Reduction ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        if reduction_ratio == 0.0 {
            return Ok(mesh.clone());
        }

        let progressive = encode(&AttributedMesh::try_from(mesh)?, self.options)?;
        let target_faces = ((1.0 - reduction_ratio) * mesh.faces.len() as f32) as usize;
        let splits = target_faces.saturating_sub(progressive.initial_complex.cell_count) / 2;
        decode_to_level(&progressive, splits)?.to_triangle_mesh()
    }
}
