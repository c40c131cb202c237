//! Target record shapes and materialized records

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::catalog::DataType;
use crate::executor::Datum;

use super::error::{TransformError, TransformResult};

/// Field of a target record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl FieldDef {
    /// Create a nullable field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Named record shape results are bound into
///
/// Field order is the positional binding order for unaliased projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecordType {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl TargetRecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An instance of a target record type
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    target: Arc<TargetRecordType>,
    /// One value per field, in field order
    values: Vec<Datum>,
}

impl Record {
    pub(crate) fn new(target: Arc<TargetRecordType>, values: Vec<Datum>) -> Self {
        Self { target, values }
    }

    pub fn record_type(&self) -> &TargetRecordType {
        &self.target
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// Value of a field by name
    pub fn get(&self, field: &str) -> Option<&Datum> {
        self.target.field_index(field).map(|i| &self.values[i])
    }

    /// Typed value of a field
    pub fn get_as<T: FromDatum>(&self, field: &str) -> TransformResult<T> {
        let value = self.get(field).ok_or_else(|| TransformError::UnknownField {
            target: self.target.name.clone(),
            field: field.to_string(),
        })?;
        T::from_datum(value).ok_or_else(|| {
            if value.is_null() {
                TransformError::NullNotAllowed {
                    field: field.to_string(),
                }
            } else {
                TransformError::FieldTypeMismatch {
                    field: field.to_string(),
                    expected: T::DATA_TYPE,
                    got: describe(value),
                }
            }
        })
    }

    /// `(field, value)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.target
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .zip(&self.values)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.target.name)?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str(" }")
    }
}

/// Type name of a datum for error messages
pub(crate) fn describe(value: &Datum) -> String {
    match value.data_type() {
        Some(ty) => format!("{} value {}", ty, value),
        None => "NULL".to_string(),
    }
}

/// Rust types a field value can be read as
pub trait FromDatum: Sized {
    /// Field type the value is read from
    const DATA_TYPE: DataType;

    /// `None` when the datum holds another type or NULL
    fn from_datum(value: &Datum) -> Option<Self>;
}

impl FromDatum for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_bool()
    }
}

impl FromDatum for i64 {
    const DATA_TYPE: DataType = DataType::BigInt;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_int()
    }
}

impl FromDatum for i32 {
    const DATA_TYPE: DataType = DataType::Int;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromDatum for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_float()
    }
}

impl FromDatum for String {
    const DATA_TYPE: DataType = DataType::Text;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromDatum for Uuid {
    const DATA_TYPE: DataType = DataType::Uuid;

    fn from_datum(value: &Datum) -> Option<Self> {
        value.as_uuid()
    }
}

impl<T: FromDatum> FromDatum for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;

    fn from_datum(value: &Datum) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_datum(value).map(Some)
        }
    }
}

/// Types that can be built from a bound record
///
/// Implemented by caller-defined result types, which are then produced by
/// `AliasToBean`.
pub trait FromRecord: Sized {
    /// Shape projections are bound into
    fn record_type() -> TargetRecordType;

    fn from_record(record: &Record) -> TransformResult<Self>;
}
