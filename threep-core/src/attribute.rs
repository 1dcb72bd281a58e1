//! Typed attribute columns for vertices and cells
//!
//! Attributes are stored column-wise: one [`AttributeData`] per declared
//! [`AttributeType`], flattened so that element `i` of an attribute with
//! `count` scalars occupies `i * count .. (i + 1) * count`. The schema is
//! checked once when a table is built and again whenever a row is appended.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar kinds that an attribute element can be made of.
///
/// The discriminant order is the wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Uint8,
    Uint16,
    Uint32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl ScalarType {
    /// All scalar types, indexed by type code
    pub const ALL: [ScalarType; 8] = [
        ScalarType::Uint8,
        ScalarType::Uint16,
        ScalarType::Uint32,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// Wire type code of this scalar type
    pub fn type_code(self) -> u32 {
        self as u32
    }

    /// Look up a scalar type by its wire type code
    pub fn from_type_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Size of one scalar in bytes
    pub fn size(self) -> usize {
        match self {
            ScalarType::Uint8 | ScalarType::Int8 => 1,
            ScalarType::Uint16 | ScalarType::Int16 => 2,
            ScalarType::Uint32 | ScalarType::Int32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Uint8 => "uint8",
            ScalarType::Uint16 => "uint16",
            ScalarType::Uint32 => "uint32",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| Error::InvalidData(format!("Unknown scalar type: {}", s)))
    }
}

/// Declared type of one named attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub name: String,
    #[serde(rename = "type")]
    pub scalar: ScalarType,
    /// Number of scalars per element
    pub count: usize,
}

impl AttributeType {
    pub fn new<S: Into<String>>(name: S, scalar: ScalarType, count: usize) -> Self {
        Self {
            name: name.into(),
            scalar,
            count,
        }
    }

    /// Size of one element of this attribute in bytes
    pub fn element_size(&self) -> usize {
        self.count * self.scalar.size()
    }
}

/// Total byte size of one element across a list of attribute types
pub fn element_size(types: &[AttributeType]) -> usize {
    types.iter().map(AttributeType::element_size).sum()
}

/// A flat run of scalars of one kind.
///
/// Used both for whole columns and for the value of a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeData {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! each_variant {
    ($value:expr, $data:ident => $body:expr) => {
        match $value {
            AttributeData::Uint8($data) => $body,
            AttributeData::Uint16($data) => $body,
            AttributeData::Uint32($data) => $body,
            AttributeData::Int8($data) => $body,
            AttributeData::Int16($data) => $body,
            AttributeData::Int32($data) => $body,
            AttributeData::Float32($data) => $body,
            AttributeData::Float64($data) => $body,
        }
    };
}

macro_rules! same_variant {
    ($lhs:expr, $rhs:expr, $a:ident, $b:ident => $body:expr, _ => $otherwise:expr) => {
        match ($lhs, $rhs) {
            (AttributeData::Uint8($a), AttributeData::Uint8($b)) => $body,
            (AttributeData::Uint16($a), AttributeData::Uint16($b)) => $body,
            (AttributeData::Uint32($a), AttributeData::Uint32($b)) => $body,
            (AttributeData::Int8($a), AttributeData::Int8($b)) => $body,
            (AttributeData::Int16($a), AttributeData::Int16($b)) => $body,
            (AttributeData::Int32($a), AttributeData::Int32($b)) => $body,
            (AttributeData::Float32($a), AttributeData::Float32($b)) => $body,
            (AttributeData::Float64($a), AttributeData::Float64($b)) => $body,
            _ => $otherwise,
        }
    };
}

macro_rules! impl_from_vec {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for AttributeData {
                fn from(values: Vec<$ty>) -> Self {
                    AttributeData::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Float32(f32),
    Float64(f64),
);

impl AttributeData {
    /// Create an empty run of the given scalar type
    pub fn empty(scalar: ScalarType) -> Self {
        Self::with_capacity(scalar, 0)
    }

    pub fn with_capacity(scalar: ScalarType, capacity: usize) -> Self {
        match scalar {
            ScalarType::Uint8 => AttributeData::Uint8(Vec::with_capacity(capacity)),
            ScalarType::Uint16 => AttributeData::Uint16(Vec::with_capacity(capacity)),
            ScalarType::Uint32 => AttributeData::Uint32(Vec::with_capacity(capacity)),
            ScalarType::Int8 => AttributeData::Int8(Vec::with_capacity(capacity)),
            ScalarType::Int16 => AttributeData::Int16(Vec::with_capacity(capacity)),
            ScalarType::Int32 => AttributeData::Int32(Vec::with_capacity(capacity)),
            ScalarType::Float32 => AttributeData::Float32(Vec::with_capacity(capacity)),
            ScalarType::Float64 => AttributeData::Float64(Vec::with_capacity(capacity)),
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            AttributeData::Uint8(_) => ScalarType::Uint8,
            AttributeData::Uint16(_) => ScalarType::Uint16,
            AttributeData::Uint32(_) => ScalarType::Uint32,
            AttributeData::Int8(_) => ScalarType::Int8,
            AttributeData::Int16(_) => ScalarType::Int16,
            AttributeData::Int32(_) => ScalarType::Int32,
            AttributeData::Float32(_) => ScalarType::Float32,
            AttributeData::Float64(_) => ScalarType::Float64,
        }
    }

    /// Number of scalars held
    pub fn len(&self) -> usize {
        each_variant!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out element `index` of an attribute with `count` scalars per element
    pub fn element(&self, index: usize, count: usize) -> Option<AttributeData> {
        let start = index.checked_mul(count)?;
        let end = start.checked_add(count)?;
        if end > self.len() {
            return None;
        }
        Some(each_variant!(self, values => values[start..end].to_vec().into()))
    }

    /// Append every scalar of `other`; both runs must share a scalar type
    pub fn extend_from(&mut self, other: &AttributeData) -> Result<()> {
        let (expected, found) = (self.scalar_type(), other.scalar_type());
        same_variant!(self, other, dst, src => {
            dst.extend_from_slice(src);
            Ok(())
        }, _ => Err(Error::AttributeMismatch(format!(
            "expected {} values, found {}",
            expected, found
        ))))
    }

    /// Build a new column from the elements at `indices`
    pub fn gather(&self, indices: &[usize], count: usize) -> Option<AttributeData> {
        let mut result = AttributeData::with_capacity(self.scalar_type(), indices.len() * count);
        for &index in indices {
            let element = self.element(index, count)?;
            result.extend_from(&element).ok()?;
        }
        Some(result)
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            AttributeData::Float32(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            AttributeData::Uint8(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<&[u32]> {
        match self {
            AttributeData::Uint32(values) => Some(values),
            _ => None,
        }
    }
}

/// Check that one element value matches its declared type
pub fn check_element(ty: &AttributeType, value: &AttributeData) -> Result<()> {
    if value.scalar_type() != ty.scalar {
        return Err(Error::AttributeMismatch(format!(
            "attribute '{}' expects {} values, found {}",
            ty.name,
            ty.scalar,
            value.scalar_type()
        )));
    }
    if value.len() != ty.count {
        return Err(Error::AttributeMismatch(format!(
            "attribute '{}' expects {} scalars per element, found {}",
            ty.name,
            ty.count,
            value.len()
        )));
    }
    Ok(())
}

/// Check a full row of element values against a schema
pub fn check_row(types: &[AttributeType], row: &[AttributeData]) -> Result<()> {
    if types.len() != row.len() {
        return Err(Error::AttributeMismatch(format!(
            "expected {} attribute values, found {}",
            types.len(),
            row.len()
        )));
    }
    types
        .iter()
        .zip(row)
        .try_for_each(|(ty, value)| check_element(ty, value))
}

/// A schema plus one column per declared attribute, all of equal element length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    types: Vec<AttributeType>,
    columns: Vec<AttributeData>,
    len: usize,
}

impl AttributeTable {
    /// Create an empty table for the given schema
    pub fn new(types: Vec<AttributeType>) -> Self {
        let columns = types.iter().map(|ty| AttributeData::empty(ty.scalar)).collect();
        Self {
            types,
            columns,
            len: 0,
        }
    }

    /// Table with no attributes that still tracks `len` elements
    pub fn untyped(len: usize) -> Self {
        Self {
            types: Vec::new(),
            columns: Vec::new(),
            len,
        }
    }

    /// Build a table from existing columns, validating them against the schema
    pub fn from_columns(
        types: Vec<AttributeType>,
        columns: Vec<AttributeData>,
        len: usize,
    ) -> Result<Self> {
        let table = Self {
            types,
            columns,
            len,
        };
        table.validate()?;
        Ok(table)
    }

    /// Check column count, scalar kinds and lengths against the schema
    pub fn validate(&self) -> Result<()> {
        if self.types.len() != self.columns.len() {
            return Err(Error::AttributeMismatch(format!(
                "{} attribute types declared but {} columns supplied",
                self.types.len(),
                self.columns.len()
            )));
        }
        for (ty, column) in self.types.iter().zip(&self.columns) {
            if ty.count == 0 {
                return Err(Error::AttributeMismatch(format!(
                    "attribute '{}' declares zero scalars per element",
                    ty.name
                )));
            }
            if column.scalar_type() != ty.scalar {
                return Err(Error::AttributeMismatch(format!(
                    "attribute '{}' declared as {} but column holds {}",
                    ty.name,
                    ty.scalar,
                    column.scalar_type()
                )));
            }
            if column.len() != self.len * ty.count {
                return Err(Error::AttributeMismatch(format!(
                    "attribute '{}' has {} scalars, expected {} ({} elements x {})",
                    ty.name,
                    column.len(),
                    self.len * ty.count,
                    self.len,
                    ty.count
                )));
            }
        }
        Ok(())
    }

    pub fn types(&self) -> &[AttributeType] {
        &self.types
    }

    pub fn columns(&self) -> &[AttributeData] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<AttributeData> {
        self.columns
    }

    /// Number of elements (rows)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up a column by attribute name
    pub fn column(&self, name: &str) -> Option<(&AttributeType, &AttributeData)> {
        self.types
            .iter()
            .zip(&self.columns)
            .find(|(ty, _)| ty.name == name)
    }

    /// Copy out the values of every attribute for element `index`
    pub fn row(&self, index: usize) -> Option<Vec<AttributeData>> {
        if index >= self.len {
            return None;
        }
        self.types
            .iter()
            .zip(&self.columns)
            .map(|(ty, column)| column.element(index, ty.count))
            .collect()
    }

    /// Append one element, checking every value against the schema first
    pub fn push_row(&mut self, row: &[AttributeData]) -> Result<()> {
        check_row(&self.types, row)?;
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.extend_from(value)?;
        }
        self.len += 1;
        Ok(())
    }

    /// Build a table holding the elements at `indices`, in that order
    pub fn gather(&self, indices: &[usize]) -> Result<AttributeTable> {
        if indices.iter().any(|&i| i >= self.len) {
            return Err(Error::InvalidData(format!(
                "gather index out of range for table of {} elements",
                self.len
            )));
        }
        let columns = self
            .types
            .iter()
            .zip(&self.columns)
            .map(|(ty, column)| {
                column.gather(indices, ty.count).ok_or_else(|| {
                    Error::AttributeMismatch(format!(
                        "attribute '{}' has no element for one of the requested indices",
                        ty.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AttributeTable {
            types: self.types.clone(),
            columns,
            len: indices.len(),
        })
    }
}
