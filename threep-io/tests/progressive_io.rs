//! Integration tests for threep-io
//!
//! Encoded meshes must survive both wire forms unchanged and decode to the
//! same mesh afterwards.

use threep_core::ProgressiveMesh;
use threep_io::*;
use threep_progressive::shapes;
use threep_progressive::{decode, decode_to_level, encode, EncoderOptions};

fn encoded_torus() -> ProgressiveMesh {
    let mesh = shapes::labeled(&shapes::torus(9, 7)).unwrap();
    encode(&mesh, EncoderOptions::default()).unwrap()
}

#[test]
fn test_encoded_mesh_binary_round_trip() {
    let progressive = encoded_torus();
    let bytes = write_binary(&progressive).unwrap();
    let recovered = read_binary(&bytes).unwrap();
    assert_eq!(recovered, progressive);
    assert_eq!(decode(&recovered).unwrap(), decode(&progressive).unwrap());
}

#[test]
fn test_encoded_mesh_json_round_trip() {
    let progressive = encoded_torus();
    let recovered = from_json(&to_json(&progressive).unwrap()).unwrap();
    assert_eq!(recovered, progressive);
}

#[test]
fn test_truncated_stream_still_decodes_prefix() {
    let progressive = encoded_torus();
    let bytes = write_binary(&progressive).unwrap();

    // Drop whole split records from the end; the header counts no longer match
    let split_size = 6 + (3 * 4 + 4) + 2 * 4;
    let cut = bytes.len() - 3 * split_size;
    assert!(matches!(
        read_binary(&bytes[..cut]),
        Err(IoError::CountMismatch { .. })
    ));

    // The same prefix is reachable by decoding to a level
    let splits = progressive.vertex_splits.len() - 3;
    let partial = decode_to_level(&progressive, splits).unwrap();
    assert_eq!(partial.vertex_count, progressive.vertex_count_at(splits));
}

#[test]
fn test_split_size_matches_schema() {
    let progressive = encoded_torus();
    let bytes = write_binary(&progressive).unwrap();
    let offset = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    // position float32 x 3 and label uint32 per vertex, label uint32 per cell
    let split_size = 6 + 16 + 2 * 4;
    assert_eq!(bytes.len() - offset, progressive.vertex_splits.len() * split_size);
}
