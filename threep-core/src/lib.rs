//! Core data structures for threep
//!
//! This crate provides the types shared by the progressive mesh encoder,
//! decoder and wire codec: typed attribute columns, attributed triangle
//! meshes, and the structural progressive-mesh record.

pub mod attribute;
pub mod mesh;
pub mod progressive;
pub mod error;

pub use attribute::*;
pub use mesh::*;
pub use progressive::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
