//! `threep` command line tool
//!
//! Encodes attributed meshes (stored as JSON) into progressive meshes,
//! decodes them back, prints stream summaries and converts between the
//! binary and JSON progressive formats.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use threep_core::ProgressiveMesh;
use threep_io::{
    read_mesh_file, read_progressive, write_binary_file, write_json_file, write_mesh_file,
    write_progressive,
};
use threep_progressive::{decode_to_level, encode, shapes, EncoderOptions, DEFAULT_MAX_COMBINED_RING};

#[derive(Parser)]
#[command(name = "threep", version, about = "Progressive triangle mesh codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a JSON mesh into a progressive mesh (.3pb or .json by extension)
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Largest combined ring size of a collapsible edge
        #[arg(long, default_value_t = DEFAULT_MAX_COMBINED_RING)]
        max_combined_ring: usize,
        /// Stop after this many collapses
        #[arg(long)]
        max_collapses: Option<usize>,
        /// Stop once the mesh is down to this many vertices
        #[arg(long)]
        min_vertices: Option<usize>,
    },
    /// Decode a progressive mesh into a JSON mesh
    Decode {
        input: PathBuf,
        output: PathBuf,
        /// Apply only this many vertex splits
        #[arg(long)]
        level: Option<usize>,
    },
    /// Print the header and stream statistics of a progressive mesh
    Info { input: PathBuf },
    /// Convert a binary progressive mesh to JSON
    ToJson { input: PathBuf, output: PathBuf },
    /// Convert a JSON progressive mesh to binary
    FromJson { input: PathBuf, output: PathBuf },
    /// Write a labelled test mesh as JSON
    Shape {
        #[arg(value_enum)]
        kind: ShapeKind,
        output: PathBuf,
        /// Major/stack resolution
        #[arg(long, default_value_t = 16)]
        rings: usize,
        /// Minor/slice resolution
        #[arg(long, default_value_t = 12)]
        segments: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeKind {
    Tetrahedron,
    Octahedron,
    Torus,
    Sphere,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Encode {
            input,
            output,
            max_combined_ring,
            max_collapses,
            min_vertices,
        } => {
            let mesh = read_mesh_file(&input)
                .with_context(|| format!("reading mesh {}", input.display()))?;
            let mut options = EncoderOptions::new().with_max_combined_ring(max_combined_ring);
            if let Some(max) = max_collapses {
                options = options.with_max_collapses(max);
            }
            if let Some(min) = min_vertices {
                options = options.with_min_vertices(min);
            }
            let progressive = encode(&mesh, options)?;
            write_progressive(&progressive, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Encoded {} vertices / {} cells into a base of {} / {} plus {} splits",
                mesh.vertex_count,
                mesh.cell_count(),
                progressive.initial_complex.vertex_count,
                progressive.initial_complex.cell_count,
                progressive.vertex_splits.len()
            );
        }
        Command::Decode {
            input,
            output,
            level,
        } => {
            let progressive = read_progressive(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let splits = level.unwrap_or(progressive.vertex_splits.len());
            let mesh = decode_to_level(&progressive, splits)?;
            write_mesh_file(&mesh, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Decoded {} vertices / {} cells",
                mesh.vertex_count,
                mesh.cell_count()
            );
        }
        Command::Info { input } => {
            let progressive = read_progressive(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            print_info(&progressive);
        }
        Command::ToJson { input, output } => {
            let progressive = read_progressive(&input)?;
            write_json_file(&progressive, &output)?;
        }
        Command::FromJson { input, output } => {
            let progressive = read_progressive(&input)?;
            write_binary_file(&progressive, &output)?;
        }
        Command::Shape {
            kind,
            output,
            rings,
            segments,
        } => {
            let geometry = match kind {
                ShapeKind::Tetrahedron => shapes::tetrahedron(),
                ShapeKind::Octahedron => shapes::octahedron(),
                ShapeKind::Torus => shapes::torus(rings, segments),
                ShapeKind::Sphere => shapes::uv_sphere(rings, segments),
            };
            let mesh = shapes::labeled(&geometry)?;
            write_mesh_file(&mesh, &output)?;
            println!("Wrote {} vertices / {} cells", mesh.vertex_count, mesh.cell_count());
        }
    }
    Ok(())
}

fn print_info(progressive: &ProgressiveMesh) {
    let header = &progressive.header;
    let base = &progressive.initial_complex;
    println!("version:        {}", header.version);
    println!("vertices:       {}", header.vertex_count);
    println!("cells:          {}", header.cell_count);
    println!("base vertices:  {}", base.vertex_count);
    println!("base cells:     {}", base.cell_count);
    println!("vertex splits:  {}", progressive.vertex_splits.len());
    for (label, types) in [
        ("vertex", &header.vertex_attribute_types),
        ("cell", &header.cell_attribute_types),
    ] {
        for ty in types {
            println!("{} attribute: {} {}x{}", label, ty.name, ty.scalar, ty.count);
        }
    }
}
