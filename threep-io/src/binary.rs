//! Binary progressive mesh format
//!
//! All integers are big-endian. A file is laid out as:
//!
//! ```text
//! "3PB\n"
//! u32 split offset          absolute byte offset of the first split record
//! u32 major, minor, patch
//! u32 vertex count, cell count
//! u32 vertex attribute count, cell attribute count
//! per attribute: u32 count, u32 type code, u32 name length, ASCII name
//! u32 base vertex count, u32 base cell count
//! base vertex attributes, one element of every attribute per vertex
//! base cells, 3 x u32 each
//! base cell attributes, one element of every attribute per cell
//! vertex splits until end of data
//! ```
//!
//! A split record is `u32 base vertex`, `u8 left`, `u8 right` (bit 7 holds
//! the orientation flag, bits 0..7 the ring index), then the new vertex's
//! attributes and the attributes of the left and right faces.

use crate::error::{IoError, IoResult};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use threep_core::{
    AttributeData, AttributeType, Header, InitialComplex, ProgressiveMesh, ScalarType, Version,
    VertexSplit,
};
use tracing::debug;

/// Magic number opening every binary progressive mesh
pub const MAGIC: &[u8; 4] = b"3PB\n";

/// Largest ring index a split record can carry
pub const MAX_RING_INDEX: usize = 0x7f;

const ORIENTATION_BIT: u8 = 0x80;

/// Cursor over an in-memory buffer with bounds-checked big-endian reads
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Read a slice of bytes from the current position
    pub fn read_slice(&mut self, len: usize, section: &'static str) -> IoResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(IoError::Truncated { section });
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self, section: &'static str) -> IoResult<u8> {
        Ok(self.read_slice(1, section)?[0])
    }

    pub fn read_u32(&mut self, section: &'static str) -> IoResult<u32> {
        Ok(BigEndian::read_u32(self.read_slice(4, section)?))
    }

    /// Read a u32 count or index as a usize
    pub fn read_usize(&mut self, section: &'static str) -> IoResult<usize> {
        Ok(self.read_u32(section)? as usize)
    }

    /// Append `count` scalars of the column's type to `column`
    fn read_scalars(
        &mut self,
        column: &mut AttributeData,
        count: usize,
        section: &'static str,
    ) -> IoResult<()> {
        let size = column.scalar_type().size();
        let bytes = self.read_slice(count * size, section)?;
        match column {
            AttributeData::Uint8(values) => values.extend_from_slice(bytes),
            AttributeData::Int8(values) => values.extend(bytes.iter().map(|&b| b as i8)),
            AttributeData::Uint16(values) => {
                values.extend(bytes.chunks_exact(2).map(BigEndian::read_u16))
            }
            AttributeData::Int16(values) => {
                values.extend(bytes.chunks_exact(2).map(BigEndian::read_i16))
            }
            AttributeData::Uint32(values) => {
                values.extend(bytes.chunks_exact(4).map(BigEndian::read_u32))
            }
            AttributeData::Int32(values) => {
                values.extend(bytes.chunks_exact(4).map(BigEndian::read_i32))
            }
            AttributeData::Float32(values) => {
                values.extend(bytes.chunks_exact(4).map(BigEndian::read_f32))
            }
            AttributeData::Float64(values) => {
                values.extend(bytes.chunks_exact(8).map(BigEndian::read_f64))
            }
        }
        Ok(())
    }

    /// Read one element of every attribute in `types`
    fn read_row(
        &mut self,
        types: &[AttributeType],
        section: &'static str,
    ) -> IoResult<Vec<AttributeData>> {
        types
            .iter()
            .map(|ty| {
                let mut value = AttributeData::with_capacity(ty.scalar, ty.count);
                self.read_scalars(&mut value, ty.count, section)?;
                Ok(value)
            })
            .collect()
    }

    /// Read `len` element-major rows into one column per attribute
    fn read_columns(
        &mut self,
        types: &[AttributeType],
        len: usize,
        section: &'static str,
    ) -> IoResult<Vec<AttributeData>> {
        let mut columns: Vec<AttributeData> = types
            .iter()
            .map(|ty| AttributeData::with_capacity(ty.scalar, len * ty.count))
            .collect();
        for _ in 0..len {
            for (ty, column) in types.iter().zip(columns.iter_mut()) {
                self.read_scalars(column, ty.count, section)?;
            }
        }
        Ok(columns)
    }
}

fn to_u32(value: usize, what: &'static str) -> IoResult<u32> {
    u32::try_from(value).map_err(|_| IoError::Overflow { what, value })
}

/// Byte size of one element of every attribute, or `None` on overflow
fn row_size(types: &[AttributeType]) -> Option<usize> {
    types.iter().try_fold(0usize, |total, ty| {
        total.checked_add(ty.count.checked_mul(ty.scalar.size())?)
    })
}

fn write_scalars(out: &mut Vec<u8>, data: &AttributeData, start: usize, end: usize) -> IoResult<()> {
    match data {
        AttributeData::Uint8(values) => out.extend_from_slice(&values[start..end]),
        AttributeData::Int8(values) => out.extend(values[start..end].iter().map(|&v| v as u8)),
        AttributeData::Uint16(values) => {
            for &v in &values[start..end] {
                out.write_u16::<BigEndian>(v)?;
            }
        }
        AttributeData::Int16(values) => {
            for &v in &values[start..end] {
                out.write_i16::<BigEndian>(v)?;
            }
        }
        AttributeData::Uint32(values) => {
            for &v in &values[start..end] {
                out.write_u32::<BigEndian>(v)?;
            }
        }
        AttributeData::Int32(values) => {
            for &v in &values[start..end] {
                out.write_i32::<BigEndian>(v)?;
            }
        }
        AttributeData::Float32(values) => {
            for &v in &values[start..end] {
                out.write_f32::<BigEndian>(v)?;
            }
        }
        AttributeData::Float64(values) => {
            for &v in &values[start..end] {
                out.write_f64::<BigEndian>(v)?;
            }
        }
    }
    Ok(())
}

fn write_row(out: &mut Vec<u8>, row: &[AttributeData]) -> IoResult<()> {
    row.iter()
        .try_for_each(|value| write_scalars(out, value, 0, value.len()))
}

fn write_columns(
    out: &mut Vec<u8>,
    types: &[AttributeType],
    columns: &[AttributeData],
    len: usize,
) -> IoResult<()> {
    for index in 0..len {
        for (ty, column) in types.iter().zip(columns) {
            write_scalars(out, column, index * ty.count, (index + 1) * ty.count)?;
        }
    }
    Ok(())
}

fn write_attribute_type(out: &mut Vec<u8>, ty: &AttributeType) -> IoResult<()> {
    if !ty.name.is_ascii() {
        return Err(IoError::NonAsciiName {
            name: ty.name.clone(),
        });
    }
    out.write_u32::<BigEndian>(to_u32(ty.count, "attribute element count")?)?;
    out.write_u32::<BigEndian>(ty.scalar.type_code())?;
    out.write_u32::<BigEndian>(to_u32(ty.name.len(), "attribute name length")?)?;
    out.extend_from_slice(ty.name.as_bytes());
    Ok(())
}

fn ring_byte(split: usize, index: usize, orientation: bool) -> IoResult<u8> {
    if index > MAX_RING_INDEX {
        return Err(IoError::RingIndexTooLarge { split, index });
    }
    let flag = if orientation { ORIENTATION_BIT } else { 0 };
    Ok(index as u8 | flag)
}

/// Serialize a progressive mesh to the binary format
pub fn write_binary(mesh: &ProgressiveMesh) -> IoResult<Vec<u8>> {
    mesh.validate()?;
    let header = &mesh.header;
    let base = &mesh.initial_complex;

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    // Patched once the base mesh is written
    out.write_u32::<BigEndian>(0)?;
    out.write_u32::<BigEndian>(header.version.major)?;
    out.write_u32::<BigEndian>(header.version.minor)?;
    out.write_u32::<BigEndian>(header.version.patch)?;
    out.write_u32::<BigEndian>(to_u32(header.vertex_count, "vertex count")?)?;
    out.write_u32::<BigEndian>(to_u32(header.cell_count, "cell count")?)?;
    out.write_u32::<BigEndian>(to_u32(
        header.vertex_attribute_types.len(),
        "vertex attribute count",
    )?)?;
    out.write_u32::<BigEndian>(to_u32(
        header.cell_attribute_types.len(),
        "cell attribute count",
    )?)?;
    for ty in header
        .vertex_attribute_types
        .iter()
        .chain(&header.cell_attribute_types)
    {
        write_attribute_type(&mut out, ty)?;
    }

    out.write_u32::<BigEndian>(to_u32(base.vertex_count, "base vertex count")?)?;
    out.write_u32::<BigEndian>(to_u32(base.cell_count, "base cell count")?)?;
    write_columns(
        &mut out,
        &header.vertex_attribute_types,
        &base.vertex_attributes,
        base.vertex_count,
    )?;
    for cell in &base.cells {
        for &v in cell {
            out.write_u32::<BigEndian>(to_u32(v, "vertex index")?)?;
        }
    }
    write_columns(
        &mut out,
        &header.cell_attribute_types,
        &base.cell_attributes,
        base.cell_count,
    )?;

    let split_offset = to_u32(out.len(), "split offset")?;
    BigEndian::write_u32(&mut out[4..8], split_offset);

    for (index, split) in mesh.vertex_splits.iter().enumerate() {
        out.write_u32::<BigEndian>(to_u32(split.base_vertex, "base vertex")?)?;
        out.write_u8(ring_byte(index, split.left, split.left_orientation)?)?;
        out.write_u8(ring_byte(index, split.right, split.right_orientation)?)?;
        write_row(&mut out, &split.vertex_attributes)?;
        write_row(&mut out, &split.left_attributes)?;
        write_row(&mut out, &split.right_attributes)?;
    }

    debug!(
        bytes = out.len(),
        split_offset,
        splits = mesh.vertex_splits.len(),
        "Wrote binary progressive mesh"
    );
    Ok(out)
}

fn read_attribute_types(
    reader: &mut ByteReader<'_>,
    len: usize,
) -> IoResult<Vec<AttributeType>> {
    let mut types = Vec::new();
    for _ in 0..len {
        let count = reader.read_usize("attribute type")?;
        if count == 0 {
            return Err(IoError::ParseError {
                message: "attribute declares zero scalars per element".to_string(),
            });
        }
        let code = reader.read_u32("attribute type")?;
        let scalar =
            ScalarType::from_type_code(code).ok_or(IoError::UnknownTypeCode { code })?;
        let name_len = reader.read_usize("attribute type")?;
        let name = reader.read_slice(name_len, "attribute name")?;
        if !name.is_ascii() {
            return Err(IoError::NonAsciiName {
                name: String::from_utf8_lossy(name).into_owned(),
            });
        }
        // ASCII is valid UTF-8
        let name = String::from_utf8_lossy(name).into_owned();
        types.push(AttributeType::new(name, scalar, count));
    }
    Ok(types)
}

/// Parse a progressive mesh from the binary format
pub fn read_binary(data: &[u8]) -> IoResult<ProgressiveMesh> {
    let mut reader = ByteReader::new(data);

    let magic = reader.read_slice(MAGIC.len(), "magic number").map_err(|_| {
        IoError::BadMagic {
            found: data.to_vec(),
        }
    })?;
    if magic != MAGIC {
        return Err(IoError::BadMagic {
            found: magic.to_vec(),
        });
    }

    let split_offset = reader.read_u32("header")?;
    let version = Version::new(
        reader.read_u32("header")?,
        reader.read_u32("header")?,
        reader.read_u32("header")?,
    );
    let vertex_count = reader.read_usize("header")?;
    let cell_count = reader.read_usize("header")?;
    let vertex_attribute_count = reader.read_usize("header")?;
    let cell_attribute_count = reader.read_usize("header")?;
    let vertex_attribute_types = read_attribute_types(&mut reader, vertex_attribute_count)?;
    let cell_attribute_types = read_attribute_types(&mut reader, cell_attribute_count)?;

    let vertex_size = row_size(&vertex_attribute_types).ok_or(IoError::Overflow {
        what: "vertex attribute size",
        value: usize::MAX,
    })?;
    let cell_size = row_size(&cell_attribute_types).ok_or(IoError::Overflow {
        what: "cell attribute size",
        value: usize::MAX,
    })?;

    let base_vertex_count = reader.read_usize("initial complex")?;
    let base_cell_count = reader.read_usize("initial complex")?;

    // Counts come straight from the file; check them against the data before allocating
    let required = base_vertex_count
        .checked_mul(vertex_size)
        .zip(cell_size.checked_add(12))
        .and_then(|(vertices, cell)| vertices.checked_add(base_cell_count.checked_mul(cell)?));
    match required {
        Some(required) if required <= reader.remaining() => {}
        _ => {
            return Err(IoError::Truncated {
                section: "initial complex",
            })
        }
    }

    let vertex_attributes = reader.read_columns(
        &vertex_attribute_types,
        base_vertex_count,
        "base vertex attributes",
    )?;
    let mut cells = Vec::with_capacity(base_cell_count);
    for _ in 0..base_cell_count {
        cells.push([
            reader.read_usize("base cells")?,
            reader.read_usize("base cells")?,
            reader.read_usize("base cells")?,
        ]);
    }
    let cell_attributes =
        reader.read_columns(&cell_attribute_types, base_cell_count, "base cell attributes")?;

    if split_offset as usize != reader.position() {
        return Err(IoError::SplitOffsetMismatch {
            declared: split_offset,
            actual: reader.position(),
        });
    }

    let split_size = 6 + vertex_size + 2 * cell_size;
    let trailing = reader.remaining() % split_size;
    if trailing != 0 {
        return Err(IoError::TrailingBytes { trailing });
    }
    let split_count = reader.remaining() / split_size;

    if vertex_count != base_vertex_count + split_count {
        return Err(IoError::CountMismatch {
            message: format!(
                "header declares {} vertices, base has {} plus {} splits",
                vertex_count, base_vertex_count, split_count
            ),
        });
    }
    if cell_count != base_cell_count + 2 * split_count {
        return Err(IoError::CountMismatch {
            message: format!(
                "header declares {} cells, base has {} plus {} split faces",
                cell_count,
                base_cell_count,
                2 * split_count
            ),
        });
    }

    let mut vertex_splits = Vec::with_capacity(split_count);
    for _ in 0..split_count {
        let base_vertex = reader.read_usize("vertex split")?;
        let left = reader.read_u8("vertex split")?;
        let right = reader.read_u8("vertex split")?;
        vertex_splits.push(VertexSplit {
            base_vertex,
            vertex_attributes: reader.read_row(&vertex_attribute_types, "vertex split")?,
            left: (left & !ORIENTATION_BIT) as usize,
            left_orientation: left & ORIENTATION_BIT != 0,
            left_attributes: reader.read_row(&cell_attribute_types, "vertex split")?,
            right: (right & !ORIENTATION_BIT) as usize,
            right_orientation: right & ORIENTATION_BIT != 0,
            right_attributes: reader.read_row(&cell_attribute_types, "vertex split")?,
        });
    }

    let mesh = ProgressiveMesh {
        header: Header {
            version,
            vertex_count,
            cell_count,
            vertex_attribute_types,
            cell_attribute_types,
        },
        initial_complex: InitialComplex {
            vertex_count: base_vertex_count,
            cell_count: base_cell_count,
            cells,
            vertex_attributes,
            cell_attributes,
        },
        vertex_splits,
    };
    mesh.validate()?;

    debug!(
        bytes = data.len(),
        version = %mesh.header.version,
        splits = split_count,
        "Read binary progressive mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use threep_core::FORMAT_VERSION;

    /// Four vertices, four cells and a single split, with mixed scalar types
    pub(crate) fn reference_mesh() -> ProgressiveMesh {
        ProgressiveMesh {
            header: Header {
                version: FORMAT_VERSION,
                vertex_count: 5,
                cell_count: 6,
                vertex_attribute_types: vec![
                    AttributeType::new("position", ScalarType::Float32, 3),
                    AttributeType::new("color", ScalarType::Uint8, 4),
                    AttributeType::new("id", ScalarType::Uint8, 1),
                ],
                cell_attribute_types: vec![AttributeType::new("uv", ScalarType::Int16, 2)],
            },
            initial_complex: InitialComplex {
                vertex_count: 4,
                cell_count: 4,
                cells: vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
                vertex_attributes: vec![
                    vec![-0.5f32, -0.5, 0.5, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0].into(),
                    vec![
                        255u8, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 0, 255,
                    ]
                    .into(),
                    vec![1u8, 2, 3, 4].into(),
                ],
                cell_attributes: vec![vec![1i16, -2, 3, -4, 5, -6, 7, -1000].into()],
            },
            vertex_splits: vec![VertexSplit {
                base_vertex: 0,
                vertex_attributes: vec![
                    vec![0.0f32, 0.0, 0.0].into(),
                    vec![0u8, 255, 255, 255].into(),
                    vec![8u8].into(),
                ],
                left: 1,
                left_orientation: true,
                left_attributes: vec![vec![-10i16, 8000].into()],
                right: 2,
                right_orientation: true,
                right_attributes: vec![vec![0i16, 0].into()],
            }],
        }
    }

    #[test]
    fn test_reference_round_trip() {
        let mesh = reference_mesh();
        let bytes = write_binary(&mesh).unwrap();
        assert_eq!(read_binary(&bytes).unwrap(), mesh);
    }

    #[test]
    fn test_reference_layout() {
        let bytes = write_binary(&reference_mesh()).unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        // 36 header bytes, 65 bytes of attribute types, 140 bytes of base mesh
        assert_eq!(BigEndian::read_u32(&bytes[4..8]), 241);
        assert_eq!(BigEndian::read_u32(&bytes[8..12]), 1);
        assert_eq!(BigEndian::read_u32(&bytes[20..24]), 5);
        assert_eq!(BigEndian::read_u32(&bytes[24..28]), 6);
        // One split of 6 + 17 + 2 * 4 bytes
        assert_eq!(bytes.len(), 241 + 31);
        assert_eq!(BigEndian::read_u32(&bytes[241..245]), 0);
        assert_eq!(bytes[245], 0x81);
        assert_eq!(bytes[246], 0x82);
        // The new vertex's id, then the left face's uv
        assert_eq!(bytes[263], 8);
        assert_eq!(BigEndian::read_i16(&bytes[264..266]), -10);
        assert_eq!(BigEndian::read_i16(&bytes[266..268]), 8000);
    }

    #[test]
    fn test_base_attributes_are_element_major() {
        let bytes = write_binary(&reference_mesh()).unwrap();
        // First vertex: position, color, id; then the second vertex's position
        let base = 101 + 8;
        assert_eq!(BigEndian::read_f32(&bytes[base..base + 4]), -0.5);
        assert_eq!(&bytes[base + 12..base + 17], &[255, 0, 0, 255, 1]);
        assert_eq!(BigEndian::read_f32(&bytes[base + 17..base + 21]), 1.0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = write_binary(&reference_mesh()).unwrap();
        bytes[0] = b'4';
        assert!(matches!(read_binary(&bytes), Err(IoError::BadMagic { .. })));
        assert!(matches!(read_binary(b"3P"), Err(IoError::BadMagic { .. })));
    }

    #[test]
    fn test_truncated_header() {
        let bytes = write_binary(&reference_mesh()).unwrap();
        for len in [8, 30, 60, 110] {
            assert!(matches!(
                read_binary(&bytes[..len]),
                Err(IoError::Truncated { .. })
            ));
        }
    }

    #[test]
    fn test_partial_split_record() {
        let bytes = write_binary(&reference_mesh()).unwrap();
        assert!(matches!(
            read_binary(&bytes[..bytes.len() - 3]),
            Err(IoError::TrailingBytes { trailing: 28 })
        ));
    }

    #[test]
    fn test_unknown_type_code() {
        let mut bytes = write_binary(&reference_mesh()).unwrap();
        // Type code of the first attribute
        BigEndian::write_u32(&mut bytes[40..44], 9);
        assert!(matches!(
            read_binary(&bytes),
            Err(IoError::UnknownTypeCode { code: 9 })
        ));
    }

    #[test]
    fn test_split_offset_mismatch() {
        let mut bytes = write_binary(&reference_mesh()).unwrap();
        BigEndian::write_u32(&mut bytes[4..8], 240);
        assert!(matches!(
            read_binary(&bytes),
            Err(IoError::SplitOffsetMismatch {
                declared: 240,
                actual: 241
            })
        ));
    }

    #[test]
    fn test_header_count_mismatch() {
        let mut bytes = write_binary(&reference_mesh()).unwrap();
        BigEndian::write_u32(&mut bytes[24..28], 7);
        assert!(matches!(
            read_binary(&bytes),
            Err(IoError::CountMismatch { .. })
        ));
    }

    #[test]
    fn test_huge_base_counts_rejected_without_allocating() {
        let mut bytes = write_binary(&reference_mesh()).unwrap();
        BigEndian::write_u32(&mut bytes[101..105], u32::MAX);
        BigEndian::write_u32(&mut bytes[105..109], u32::MAX);
        assert!(matches!(
            read_binary(&bytes),
            Err(IoError::Truncated {
                section: "initial complex"
            })
        ));
    }

    #[test]
    fn test_ring_index_too_large() {
        let mut mesh = reference_mesh();
        mesh.vertex_splits[0].right = 128;
        assert!(matches!(
            write_binary(&mesh),
            Err(IoError::RingIndexTooLarge {
                split: 0,
                index: 128
            })
        ));

        mesh.vertex_splits[0].right = MAX_RING_INDEX;
        let bytes = write_binary(&mesh).unwrap();
        assert_eq!(read_binary(&bytes).unwrap().vertex_splits[0].right, MAX_RING_INDEX);
    }

    #[test]
    fn test_non_ascii_name() {
        let mut mesh = reference_mesh();
        mesh.header.cell_attribute_types[0].name = "üv".to_string();
        assert!(matches!(
            write_binary(&mesh),
            Err(IoError::NonAsciiName { .. })
        ));
    }

    #[test]
    fn test_invalid_structure_rejected() {
        let mut mesh = reference_mesh();
        mesh.initial_complex.cells[0] = [0, 1, 7];
        assert!(matches!(write_binary(&mesh), Err(IoError::Core(_))));
    }

    #[test]
    fn test_no_attributes() {
        let mesh = ProgressiveMesh {
            header: Header {
                version: FORMAT_VERSION,
                vertex_count: 4,
                cell_count: 4,
                vertex_attribute_types: Vec::new(),
                cell_attribute_types: Vec::new(),
            },
            initial_complex: InitialComplex {
                vertex_count: 4,
                cell_count: 4,
                cells: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
                vertex_attributes: Vec::new(),
                cell_attributes: Vec::new(),
            },
            vertex_splits: Vec::new(),
        };
        let bytes = write_binary(&mesh).unwrap();
        assert_eq!(bytes.len(), 36 + 8 + 48);
        assert_eq!(read_binary(&bytes).unwrap(), mesh);
    }

    fn split_strategy(base: usize) -> impl Strategy<Value = VertexSplit> {
        (
            0..base,
            prop::array::uniform3(-1.0e6f32..1.0e6),
            any::<u16>(),
            0..=MAX_RING_INDEX,
            any::<bool>(),
            0..=MAX_RING_INDEX,
            any::<bool>(),
            any::<[i32; 2]>(),
        )
            .prop_map(
                |(base_vertex, position, id, left, lo, right, ro, faces)| VertexSplit {
                    base_vertex,
                    vertex_attributes: vec![position.to_vec().into(), vec![id].into()],
                    left,
                    left_orientation: lo,
                    left_attributes: vec![vec![faces[0]].into()],
                    right,
                    right_orientation: ro,
                    right_attributes: vec![vec![faces[1]].into()],
                },
            )
    }

    proptest! {
        #[test]
        fn prop_split_records_round_trip(splits in prop::collection::vec(split_strategy(4), 0..20)) {
            let n = splits.len();
            let mesh = ProgressiveMesh {
                header: Header {
                    version: Version::new(1, 2, 3),
                    vertex_count: 4 + n,
                    cell_count: 4 + 2 * n,
                    vertex_attribute_types: vec![
                        AttributeType::new("position", ScalarType::Float32, 3),
                        AttributeType::new("id", ScalarType::Uint16, 1),
                    ],
                    cell_attribute_types: vec![AttributeType::new("group", ScalarType::Int32, 1)],
                },
                initial_complex: InitialComplex {
                    vertex_count: 4,
                    cell_count: 4,
                    cells: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
                    vertex_attributes: vec![vec![0.0f32; 12].into(), vec![0u16, 1, 2, 3].into()],
                    cell_attributes: vec![vec![-1i32, -2, -3, -4].into()],
                },
                vertex_splits: splits,
            };
            let bytes = write_binary(&mesh).unwrap();
            prop_assert_eq!(bytes.len(), 215 + n * (6 + 14 + 8));
            prop_assert_eq!(read_binary(&bytes).unwrap(), mesh);
        }
    }
}
