//! JSON form of a progressive mesh
//!
//! The header is written as-is. Attribute values are nested rather than
//! flattened: an initial complex column is an array with one entry per
//! element, and a split carries one entry per attribute. An entry is a bare
//! number when the attribute has a single scalar per element, otherwise an
//! array of `count` numbers.

use crate::error::{IoError, IoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use threep_core::{AttributeData, AttributeType, Header, InitialComplex, ProgressiveMesh, VertexSplit};
use tracing::debug;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonComplex {
    vertex_count: usize,
    cell_count: usize,
    vertex_attributes: Vec<Vec<Value>>,
    cells: Vec<[usize; 3]>,
    cell_attributes: Vec<Vec<Value>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSplit {
    base_vertex: usize,
    vertex_attributes: Vec<Value>,
    left: usize,
    left_orientation: bool,
    left_attributes: Vec<Value>,
    right: usize,
    right_orientation: bool,
    right_attributes: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonMesh {
    header: Header,
    initial_complex: JsonComplex,
    vertex_splits: Vec<JsonSplit>,
}

fn scalar_value(data: &AttributeData, index: usize) -> Option<Value> {
    Some(match data {
        AttributeData::Uint8(values) => Value::from(*values.get(index)?),
        AttributeData::Uint16(values) => Value::from(*values.get(index)?),
        AttributeData::Uint32(values) => Value::from(*values.get(index)?),
        AttributeData::Int8(values) => Value::from(*values.get(index)?),
        AttributeData::Int16(values) => Value::from(*values.get(index)?),
        AttributeData::Int32(values) => Value::from(*values.get(index)?),
        AttributeData::Float32(values) => Value::from(*values.get(index)?),
        AttributeData::Float64(values) => Value::from(*values.get(index)?),
    })
}

/// Element `index` of a column with `count` scalars per element
fn element_value(data: &AttributeData, index: usize, count: usize, name: &str) -> IoResult<Value> {
    let missing = || IoError::CountMismatch {
        message: format!("attribute '{}' has no element {}", name, index),
    };
    if count == 1 {
        return scalar_value(data, index).ok_or_else(missing);
    }
    (index * count..(index + 1) * count)
        .map(|i| scalar_value(data, i).ok_or_else(missing))
        .collect::<IoResult<Vec<_>>>()
        .map(Value::Array)
}

fn row_values(types: &[AttributeType], row: &[AttributeData]) -> IoResult<Vec<Value>> {
    types
        .iter()
        .zip(row)
        .map(|(ty, value)| element_value(value, 0, ty.count, &ty.name))
        .collect()
}

fn column_values(ty: &AttributeType, column: &AttributeData, len: usize) -> IoResult<Vec<Value>> {
    (0..len)
        .map(|index| element_value(column, index, ty.count, &ty.name))
        .collect()
}

/// Convert a progressive mesh to its JSON value
pub fn to_json_value(mesh: &ProgressiveMesh) -> IoResult<Value> {
    mesh.validate()?;
    let header = &mesh.header;
    let base = &mesh.initial_complex;

    let initial_complex = JsonComplex {
        vertex_count: base.vertex_count,
        cell_count: base.cell_count,
        vertex_attributes: header
            .vertex_attribute_types
            .iter()
            .zip(&base.vertex_attributes)
            .map(|(ty, column)| column_values(ty, column, base.vertex_count))
            .collect::<IoResult<_>>()?,
        cells: base.cells.clone(),
        cell_attributes: header
            .cell_attribute_types
            .iter()
            .zip(&base.cell_attributes)
            .map(|(ty, column)| column_values(ty, column, base.cell_count))
            .collect::<IoResult<_>>()?,
    };

    let vertex_splits = mesh
        .vertex_splits
        .iter()
        .map(|split| {
            Ok(JsonSplit {
                base_vertex: split.base_vertex,
                vertex_attributes: row_values(
                    &header.vertex_attribute_types,
                    &split.vertex_attributes,
                )?,
                left: split.left,
                left_orientation: split.left_orientation,
                left_attributes: row_values(&header.cell_attribute_types, &split.left_attributes)?,
                right: split.right,
                right_orientation: split.right_orientation,
                right_attributes: row_values(
                    &header.cell_attribute_types,
                    &split.right_attributes,
                )?,
            })
        })
        .collect::<IoResult<Vec<_>>>()?;

    let json = JsonMesh {
        header: header.clone(),
        initial_complex,
        vertex_splits,
    };
    Ok(serde_json::to_value(json)?)
}

/// Convert a progressive mesh to pretty-printed JSON text
pub fn to_json(mesh: &ProgressiveMesh) -> IoResult<String> {
    let value = to_json_value(mesh)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn parse_error(name: &str, value: &Value, expected: &str) -> IoError {
    IoError::ParseError {
        message: format!("attribute '{}': expected {}, found {}", name, expected, value),
    }
}

macro_rules! push_integer {
    ($values:expr, $value:expr, $name:expr, $ty:ty, $as:ident) => {{
        let scalar = $value
            .$as()
            .and_then(|v| <$ty>::try_from(v).ok())
            .ok_or_else(|| parse_error($name, $value, stringify!($ty)))?;
        $values.push(scalar);
    }};
}

fn push_scalar(column: &mut AttributeData, value: &Value, name: &str) -> IoResult<()> {
    match column {
        AttributeData::Uint8(values) => push_integer!(values, value, name, u8, as_u64),
        AttributeData::Uint16(values) => push_integer!(values, value, name, u16, as_u64),
        AttributeData::Uint32(values) => push_integer!(values, value, name, u32, as_u64),
        AttributeData::Int8(values) => push_integer!(values, value, name, i8, as_i64),
        AttributeData::Int16(values) => push_integer!(values, value, name, i16, as_i64),
        AttributeData::Int32(values) => push_integer!(values, value, name, i32, as_i64),
        AttributeData::Float32(values) => {
            let scalar = value
                .as_f64()
                .ok_or_else(|| parse_error(name, value, "a number"))?;
            values.push(scalar as f32);
        }
        AttributeData::Float64(values) => {
            let scalar = value
                .as_f64()
                .ok_or_else(|| parse_error(name, value, "a number"))?;
            values.push(scalar);
        }
    }
    Ok(())
}

/// Append one element in nested form to a flat column
fn push_element(column: &mut AttributeData, ty: &AttributeType, value: &Value) -> IoResult<()> {
    match value {
        Value::Array(scalars) if scalars.len() == ty.count => scalars
            .iter()
            .try_for_each(|scalar| push_scalar(column, scalar, &ty.name)),
        Value::Array(_) => Err(parse_error(
            &ty.name,
            value,
            &format!("an array of {} numbers", ty.count),
        )),
        _ if ty.count == 1 => push_scalar(column, value, &ty.name),
        _ => Err(parse_error(
            &ty.name,
            value,
            &format!("an array of {} numbers", ty.count),
        )),
    }
}

fn parse_row(types: &[AttributeType], values: &[Value], what: &str) -> IoResult<Vec<AttributeData>> {
    if types.len() != values.len() {
        return Err(IoError::CountMismatch {
            message: format!(
                "{} has {} attribute values, header declares {}",
                what,
                values.len(),
                types.len()
            ),
        });
    }
    types
        .iter()
        .zip(values)
        .map(|(ty, value)| {
            let mut element = AttributeData::with_capacity(ty.scalar, ty.count);
            push_element(&mut element, ty, value)?;
            Ok(element)
        })
        .collect()
}

fn parse_columns(
    types: &[AttributeType],
    columns: &[Vec<Value>],
    what: &str,
) -> IoResult<Vec<AttributeData>> {
    if types.len() != columns.len() {
        return Err(IoError::CountMismatch {
            message: format!(
                "{} has {} attribute columns, header declares {}",
                what,
                columns.len(),
                types.len()
            ),
        });
    }
    types
        .iter()
        .zip(columns)
        .map(|(ty, elements)| {
            let mut column = AttributeData::with_capacity(ty.scalar, elements.len() * ty.count);
            for element in elements {
                push_element(&mut column, ty, element)?;
            }
            Ok(column)
        })
        .collect()
}

/// Build a progressive mesh from its JSON value
pub fn from_json_value(value: Value) -> IoResult<ProgressiveMesh> {
    let json: JsonMesh = serde_json::from_value(value)?;
    let header = json.header;
    let base = json.initial_complex;

    let initial_complex = InitialComplex {
        vertex_count: base.vertex_count,
        cell_count: base.cell_count,
        vertex_attributes: parse_columns(
            &header.vertex_attribute_types,
            &base.vertex_attributes,
            "initial complex",
        )?,
        cells: base.cells,
        cell_attributes: parse_columns(
            &header.cell_attribute_types,
            &base.cell_attributes,
            "initial complex",
        )?,
    };

    let vertex_splits = json
        .vertex_splits
        .iter()
        .map(|split| {
            Ok(VertexSplit {
                base_vertex: split.base_vertex,
                vertex_attributes: parse_row(
                    &header.vertex_attribute_types,
                    &split.vertex_attributes,
                    "vertex split",
                )?,
                left: split.left,
                left_orientation: split.left_orientation,
                left_attributes: parse_row(
                    &header.cell_attribute_types,
                    &split.left_attributes,
                    "left face",
                )?,
                right: split.right,
                right_orientation: split.right_orientation,
                right_attributes: parse_row(
                    &header.cell_attribute_types,
                    &split.right_attributes,
                    "right face",
                )?,
            })
        })
        .collect::<IoResult<Vec<_>>>()?;

    let mesh = ProgressiveMesh {
        header,
        initial_complex,
        vertex_splits,
    };
    mesh.validate()?;
    debug!(
        vertices = mesh.header.vertex_count,
        splits = mesh.vertex_splits.len(),
        "Parsed JSON progressive mesh"
    );
    Ok(mesh)
}

/// Parse a progressive mesh from JSON text
pub fn from_json(text: &str) -> IoResult<ProgressiveMesh> {
    from_json_value(serde_json::from_str(text)?)
}
