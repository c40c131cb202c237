//! Result transformation
//!
//! Converts result rows into caller-facing values. A value produced by an
//! aliased projection binds to the target field of the same name; a value
//! from an unaliased projection binds to the field at its position.
//!
//! Transformation is per row and pure: the same row always yields the same
//! record, and a row that fails does not affect its neighbours.

pub mod coerce;
pub mod error;
pub mod record;

pub use coerce::coerce;
pub use error::{TransformError, TransformResult};
pub use record::{FieldDef, FromDatum, FromRecord, Record, TargetRecordType};

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::executor::{Datum, ResultRow};
use crate::planner::OutputColumn;

/// Bind a row to a target record type
///
/// `columns` describes the row's values and must be aligned with it.
pub fn transform(
    row: &ResultRow,
    columns: &[OutputColumn],
    target: &Arc<TargetRecordType>,
) -> TransformResult<Record> {
    if row.len() > target.len() {
        return Err(TransformError::FieldCountMismatch {
            target: target.name.clone(),
            expected: target.len(),
            got: row.len(),
        });
    }

    let mut slots: Vec<Option<Datum>> = vec![None; target.len()];
    for (i, value) in row.iter().enumerate() {
        let index = match columns.get(i).and_then(|c| c.alias.as_deref()) {
            Some(alias) => target
                .field_index(alias)
                .ok_or_else(|| TransformError::UnknownField {
                    target: target.name.clone(),
                    field: alias.to_string(),
                })?,
            None => i,
        };
        let field = &target.fields[index];
        if slots[index].is_some() {
            return Err(TransformError::DuplicateField {
                target: target.name.clone(),
                field: field.name.clone(),
            });
        }
        slots[index] = Some(coerce(value.clone(), field)?);
    }

    let values = slots
        .into_iter()
        .zip(&target.fields)
        .map(|(slot, field)| match slot {
            Some(value) => Ok(value),
            None if field.nullable => Ok(Datum::Null),
            None => Err(TransformError::MissingField {
                target: target.name.clone(),
                field: field.name.clone(),
            }),
        })
        .collect::<TransformResult<Vec<_>>>()?;

    Ok(Record::new(Arc::clone(target), values))
}

/// Row-to-value conversion applied to every listed row
pub trait ResultTransformer: Send + Sync {
    type Output;

    fn transform_row(
        &self,
        row: &ResultRow,
        columns: &[OutputColumn],
    ) -> TransformResult<Self::Output>;
}

/// Binds rows into a dynamic record type
#[derive(Debug, Clone)]
pub struct AliasToRecord {
    target: Arc<TargetRecordType>,
}

impl AliasToRecord {
    pub fn new(target: TargetRecordType) -> Self {
        Self {
            target: Arc::new(target),
        }
    }
}

impl ResultTransformer for AliasToRecord {
    type Output = Record;

    fn transform_row(&self, row: &ResultRow, columns: &[OutputColumn]) -> TransformResult<Record> {
        transform(row, columns, &self.target)
    }
}

/// Binds rows into a caller-defined type
pub struct AliasToBean<T> {
    target: Arc<TargetRecordType>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRecord> AliasToBean<T> {
    pub fn new() -> Self {
        Self {
            target: Arc::new(T::record_type()),
            _marker: PhantomData,
        }
    }
}

impl<T: FromRecord> Default for AliasToBean<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRecord> ResultTransformer for AliasToBean<T> {
    type Output = T;

    fn transform_row(&self, row: &ResultRow, columns: &[OutputColumn]) -> TransformResult<T> {
        let record = transform(row, columns, &self.target)?;
        T::from_record(&record)
    }
}

/// Maps each row to `column name -> value`
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasToEntityMap;

impl ResultTransformer for AliasToEntityMap {
    type Output = BTreeMap<String, Datum>;

    fn transform_row(
        &self,
        row: &ResultRow,
        columns: &[OutputColumn],
    ) -> TransformResult<BTreeMap<String, Datum>> {
        if row.len() > columns.len() {
            return Err(TransformError::FieldCountMismatch {
                target: "map".to_string(),
                expected: columns.len(),
                got: row.len(),
            });
        }
        Ok(columns
            .iter()
            .map(|c| c.name.clone())
            .zip(row.iter().cloned())
            .collect())
    }
}

/// Returns each row's values as a plain list
#[derive(Debug, Clone, Copy, Default)]
pub struct ToList;

impl ResultTransformer for ToList {
    type Output = Vec<Datum>;

    fn transform_row(&self, row: &ResultRow, _columns: &[OutputColumn]) -> TransformResult<Vec<Datum>> {
        Ok(row.values().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::executor::Row;

    fn column(index: usize, alias: Option<&str>) -> OutputColumn {
        OutputColumn {
            index,
            name: alias.map_or_else(|| format!("expr_{}", index), str::to_string),
            alias: alias.map(str::to_string),
            data_type: None,
            hidden: false,
        }
    }

    fn target() -> Arc<TargetRecordType> {
        Arc::new(
            TargetRecordType::new("Localized")
                .field(FieldDef::new("Id", DataType::BigInt).nullable(false))
                .field(FieldDef::new("LocalizedName", DataType::Text)),
        )
    }

    #[test]
    fn test_binds_by_alias() {
        // Aliases in reverse field order
        let row = Row::new(vec![Datum::from("Faber"), Datum::Int(3)]);
        let columns = [column(0, Some("LocalizedName")), column(1, Some("Id"))];
        let record = transform(&row, &columns, &target()).unwrap();
        assert_eq!(record.values(), &[Datum::Int(3), Datum::from("Faber")]);
    }

    #[test]
    fn test_binds_positionally() {
        let row = Row::new(vec![Datum::Int(3), Datum::from("Faber")]);
        let columns = [column(0, None), column(1, None)];
        let record = transform(&row, &columns, &target()).unwrap();
        assert_eq!(record.get("LocalizedName"), Some(&Datum::from("Faber")));
    }

    #[test]
    fn test_too_many_values() {
        let row = Row::new(vec![Datum::Int(1), Datum::Null, Datum::Null]);
        let columns = [column(0, None), column(1, None), column(2, None)];
        assert_eq!(
            transform(&row, &columns, &target()),
            Err(TransformError::FieldCountMismatch {
                target: "Localized".to_string(),
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let row = Row::new(vec![Datum::from("x")]);
        let err = transform(&row, &[column(0, Some("LocalizedName"))], &target()).unwrap_err();
        assert!(matches!(err, TransformError::MissingField { ref field, .. } if field == "Id"));

        let err = transform(&row, &[column(0, Some("Label"))], &target()).unwrap_err();
        assert!(matches!(err, TransformError::UnknownField { .. }));
    }

    #[test]
    fn test_duplicate_binding() {
        // Positional column 0 and alias "Id" both land on field 0
        let row = Row::new(vec![Datum::Int(1), Datum::Int(2)]);
        let columns = [column(0, None), column(1, Some("Id"))];
        assert!(matches!(
            transform(&row, &columns, &target()),
            Err(TransformError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_entity_map_and_list() {
        let row = Row::new(vec![Datum::Int(1), Datum::from("a")]);
        let columns = [column(0, Some("Id")), column(1, None)];

        let map = AliasToEntityMap.transform_row(&row, &columns).unwrap();
        assert_eq!(map.get("Id"), Some(&Datum::Int(1)));
        assert_eq!(map.get("expr_1"), Some(&Datum::from("a")));

        let list = ToList.transform_row(&row, &columns).unwrap();
        assert_eq!(list, row.values());
    }
}
