//! Whole-mesh encode and decode
//!
//! [`encode`] runs the simplifier to exhaustion and packages the result as a
//! [`ProgressiveMesh`]. Vertices are relabelled so that the base mesh holds
//! `0..b` (ascending original order) and the vertex removed by the k-th
//! collapse gets `n - 1 - k`; replaying the reversed collapse list then
//! creates vertices in exactly the order a decoder allocates them.

use crate::decoder::ProgressiveDecoder;
use crate::encoder::{EdgeCollapse, ProgressiveEncoder, INVALID};
use crate::options::EncoderOptions;
use itertools::Itertools;
use rayon::prelude::*;
use threep_core::{
    AttributeData, AttributeTable, AttributedMesh, Error, Header, InitialComplex, ProgressiveMesh,
    Result, VertexSplit, FORMAT_VERSION,
};
use tracing::info;

/// Simplify `mesh` and return its progressive representation
pub fn encode(mesh: &AttributedMesh, options: EncoderOptions) -> Result<ProgressiveMesh> {
    mesh.validate()?;
    let mut encoder = ProgressiveEncoder::from_mesh(mesh, options)?;
    let collapses = encoder.run()?;
    let (base_vertices, base_cells) = encoder.base();

    let n = mesh.vertex_count;
    let mut labels = vec![INVALID; n];
    for (label, &v) in base_vertices.iter().enumerate() {
        labels[v] = label;
    }
    for (k, collapse) in collapses.iter().enumerate() {
        labels[collapse.t] = n - 1 - k;
    }

    let cells: Vec<[usize; 3]> = base_cells
        .iter()
        .map(|&f| encoder.cells()[f].map(|v| labels[v]))
        .collect();
    let vertex_splits = collapses
        .iter()
        .rev()
        .map(|collapse| split_record(mesh, collapse, &labels))
        .collect::<Result<Vec<_>>>()?;

    let progressive = ProgressiveMesh {
        header: Header {
            version: FORMAT_VERSION,
            vertex_count: n,
            cell_count: mesh.cell_count(),
            vertex_attribute_types: mesh.vertex_attributes.types().to_vec(),
            cell_attribute_types: mesh.cell_attributes.types().to_vec(),
        },
        initial_complex: InitialComplex {
            vertex_count: base_vertices.len(),
            cell_count: cells.len(),
            cells,
            vertex_attributes: mesh.vertex_attributes.gather(&base_vertices)?.into_columns(),
            cell_attributes: mesh.cell_attributes.gather(&base_cells)?.into_columns(),
        },
        vertex_splits,
    };

    info!(
        vertices = n,
        cells = mesh.cell_count(),
        base_vertices = progressive.initial_complex.vertex_count,
        splits = progressive.vertex_splits.len(),
        "Encoded progressive mesh"
    );
    Ok(progressive)
}

/// Express one collapse as the split that undoes it, in final labels
fn split_record(mesh: &AttributedMesh, collapse: &EdgeCollapse, labels: &[usize]) -> Result<VertexSplit> {
    // Ring indices are relative to the canonical rotation, which depends on labels
    let ring = collapse.ring.iter().map(|&v| labels[v]).collect_vec();
    let shift = ring.iter().position_min().unwrap_or(0);
    let len = ring.len();
    let reindex = |index: usize| (index + len - shift) % len;

    Ok(VertexSplit {
        base_vertex: labels[collapse.s],
        vertex_attributes: row(&mesh.vertex_attributes, collapse.t)?,
        left: reindex(collapse.left_index),
        left_orientation: collapse.left_orientation,
        left_attributes: row(&mesh.cell_attributes, collapse.left_face)?,
        right: reindex(collapse.right_index),
        right_orientation: collapse.right_orientation,
        right_attributes: row(&mesh.cell_attributes, collapse.right_face)?,
    })
}

fn row(table: &AttributeTable, index: usize) -> Result<Vec<AttributeData>> {
    table.row(index).ok_or_else(|| {
        Error::InvalidData(format!(
            "no attribute row {} in table of {} elements",
            index,
            table.len()
        ))
    })
}

/// Rebuild the fully refined mesh
pub fn decode(progressive: &ProgressiveMesh) -> Result<AttributedMesh> {
    decode_to_level(progressive, progressive.vertex_splits.len())
}

/// Rebuild the mesh after applying only the first `splits` vertex splits
pub fn decode_to_level(progressive: &ProgressiveMesh, splits: usize) -> Result<AttributedMesh> {
    let mut decoder = ProgressiveDecoder::from_progressive(progressive)?;
    let count = splits.min(progressive.vertex_splits.len());
    decoder.apply_all(&progressive.vertex_splits[..count])?;
    info!(
        vertices = decoder.vertex_count(),
        cells = decoder.cell_count(),
        splits = count,
        "Decoded progressive mesh"
    );
    decoder.into_mesh()
}

/// Encode independent meshes in parallel, one encoder per mesh
pub fn encode_batch(meshes: &[AttributedMesh], options: EncoderOptions) -> Result<Vec<ProgressiveMesh>> {
    meshes.par_iter().map(|mesh| encode(mesh, options)).collect()
}
