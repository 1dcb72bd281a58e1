//! # threep
//!
//! Progressive triangle meshes for Rust.
//!
//! This is the umbrella crate that provides convenient access to all threep functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Attributed meshes, attribute columns and the progressive mesh record
//! - **Progressive**: Edge-collapse encoder, vertex-split decoder, level-of-detail simplification
//! - **I/O**: Binary (`.3pb`) and JSON progressive mesh formats
//!
//! ## Quick Start
//!
//! ```rust
//! use threep::prelude::*;
//! use threep::progressive::shapes;
//!
//! # fn main() -> anyhow::Result<()> {
//! // Encode a closed mesh into a base mesh plus vertex splits
//! let mesh = shapes::labeled(&shapes::torus(12, 8))?;
//! let progressive = encode(&mesh, EncoderOptions::default())?;
//!
//! // Ship it, then refine only part of the way
//! let bytes = write_binary(&progressive)?;
//! let coarse = decode_to_level(&read_binary(&bytes)?, 10)?;
//! assert_eq!(coarse.vertex_count, progressive.initial_complex.vertex_count + 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core, progressive and io
//! - `progressive`: Encoder, decoder and simplifier
//! - `io`: File format support
//! - `all`: Enables all features

// Re-export core functionality
pub use threep_core::*;

// Re-export sub-crates
#[cfg(feature = "progressive")]
pub use threep_progressive as progressive;

#[cfg(feature = "io")]
pub use threep_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use threep_core::*;

    #[cfg(feature = "progressive")]
    pub use threep_progressive::*;

    #[cfg(feature = "io")]
    pub use threep_io::*;
}
