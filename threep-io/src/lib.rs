//! I/O operations for progressive meshes
//!
//! This crate reads and writes progressive meshes in the compact binary
//! format (`.3pb`) and in the nested JSON form (`.json`), plus plain
//! attributed meshes as JSON.

pub mod binary;
pub mod error;
pub mod json;

pub use binary::{read_binary, write_binary, ByteReader, MAGIC, MAX_RING_INDEX};
pub use error::*;
pub use json::{from_json, from_json_value, to_json, to_json_value};

use std::fs;
use std::path::Path;
use threep_core::{AttributedMesh, ProgressiveMesh};
use tracing::info;

/// On-disk encodings of a progressive mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressiveFormat {
    Binary,
    Json,
}

impl ProgressiveFormat {
    /// Detect the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("3pb") => Ok(ProgressiveFormat::Binary),
            Some("json") => Ok(ProgressiveFormat::Json),
            _ => Err(IoError::UnsupportedFormat {
                format: format!("{:?}", path.extension()),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ProgressiveFormat::Binary => "3pb",
            ProgressiveFormat::Json => "json",
        }
    }
}

fn read_file(path: &Path) -> IoResult<Vec<u8>> {
    fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(err),
    })
}

/// Read a binary progressive mesh file
pub fn read_binary_file<P: AsRef<Path>>(path: P) -> IoResult<ProgressiveMesh> {
    let path = path.as_ref();
    let mesh = read_binary(&read_file(path)?)?;
    info!(path = %path.display(), splits = mesh.vertex_splits.len(), "Read progressive mesh");
    Ok(mesh)
}

/// Write a binary progressive mesh file
pub fn write_binary_file<P: AsRef<Path>>(mesh: &ProgressiveMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let bytes = write_binary(mesh)?;
    fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote progressive mesh");
    Ok(())
}

/// Read a JSON progressive mesh file
pub fn read_json_file<P: AsRef<Path>>(path: P) -> IoResult<ProgressiveMesh> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let mesh = from_json_value(serde_json::from_slice(&bytes)?)?;
    info!(path = %path.display(), splits = mesh.vertex_splits.len(), "Read progressive mesh");
    Ok(mesh)
}

/// Write a JSON progressive mesh file
pub fn write_json_file<P: AsRef<Path>>(mesh: &ProgressiveMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    fs::write(path, to_json(mesh)?)?;
    info!(path = %path.display(), "Wrote progressive mesh");
    Ok(())
}

/// Auto-detect format and read a progressive mesh
pub fn read_progressive<P: AsRef<Path>>(path: P) -> IoResult<ProgressiveMesh> {
    let path = path.as_ref();
    match ProgressiveFormat::from_path(path)? {
        ProgressiveFormat::Binary => read_binary_file(path),
        ProgressiveFormat::Json => read_json_file(path),
    }
}

/// Auto-detect format and write a progressive mesh
pub fn write_progressive<P: AsRef<Path>>(mesh: &ProgressiveMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    match ProgressiveFormat::from_path(path)? {
        ProgressiveFormat::Binary => write_binary_file(mesh, path),
        ProgressiveFormat::Json => write_json_file(mesh, path),
    }
}

/// Read an attributed mesh stored as JSON
pub fn read_mesh_file<P: AsRef<Path>>(path: P) -> IoResult<AttributedMesh> {
    let path = path.as_ref();
    let mesh: AttributedMesh = serde_json::from_slice(&read_file(path)?)?;
    mesh.validate()?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count,
        cells = mesh.cell_count(),
        "Read mesh"
    );
    Ok(mesh)
}

/// Write an attributed mesh as JSON
pub fn write_mesh_file<P: AsRef<Path>>(mesh: &AttributedMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_string_pretty(mesh)?)?;
    info!(path = %path.display(), "Wrote mesh");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::tests::reference_mesh;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("threep_io_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ProgressiveFormat::from_path("bunny.3pb").unwrap(),
            ProgressiveFormat::Binary
        );
        assert_eq!(
            ProgressiveFormat::from_path("dir/bunny.json").unwrap(),
            ProgressiveFormat::Json
        );
        assert!(matches!(
            ProgressiveFormat::from_path("bunny.ply"),
            Err(IoError::UnsupportedFormat { .. })
        ));
        assert!(ProgressiveFormat::from_path("bunny").is_err());
        assert_eq!(ProgressiveFormat::Binary.extension(), "3pb");
    }

    #[test]
    fn test_binary_file_round_trip() {
        let path = temp_path("reference.3pb");
        let mesh = reference_mesh();
        write_progressive(&mesh, &path).unwrap();
        assert_eq!(&fs::read(&path).unwrap()[..4], MAGIC);
        assert_eq!(read_progressive(&path).unwrap(), mesh);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = temp_path("reference.json");
        let mesh = reference_mesh();
        write_progressive(&mesh, &path).unwrap();
        assert_eq!(read_progressive(&path).unwrap(), mesh);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_binary_and_json_agree() {
        let mesh = reference_mesh();
        let from_binary = read_binary(&write_binary(&mesh).unwrap()).unwrap();
        let from_json = from_json(&to_json(&from_binary).unwrap()).unwrap();
        assert_eq!(write_binary(&from_json).unwrap(), write_binary(&mesh).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("missing.3pb");
        assert!(matches!(
            read_progressive(&path),
            Err(IoError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_mesh_file_round_trip() {
        let path = temp_path("mesh.json");
        let mesh = AttributedMesh::from_cells(4, vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
        write_mesh_file(&mesh, &path).unwrap();
        assert_eq!(read_mesh_file(&path).unwrap(), mesh);
        fs::remove_file(&path).unwrap();
    }
}
