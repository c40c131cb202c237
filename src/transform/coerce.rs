//! Value coercion into declared field types
//!
//! Widening is allowed (integer to double, text to uuid when it parses);
//! anything lossy is a `FieldTypeMismatch`.

use uuid::Uuid;

use crate::catalog::DataType;
use crate::executor::Datum;

use super::error::{TransformError, TransformResult};
use super::record::{describe, FieldDef};

/// Coerce a value to the type of `field`
pub fn coerce(value: Datum, field: &FieldDef) -> TransformResult<Datum> {
    if value.is_null() {
        return if field.nullable {
            Ok(Datum::Null)
        } else {
            Err(TransformError::NullNotAllowed {
                field: field.name.clone(),
            })
        };
    }

    let coerced = match (field.data_type, value) {
        (DataType::Boolean, v @ Datum::Bool(_)) => Some(v),
        (DataType::Int, Datum::Int(i)) if i32::try_from(i).is_ok() => Some(Datum::Int(i)),
        (DataType::BigInt, v @ Datum::Int(_)) => Some(v),
        (DataType::Double, Datum::Int(i)) => Some(Datum::Float(i as f64)),
        (DataType::Double, v @ Datum::Float(_)) => Some(v),
        (DataType::Text, v @ Datum::String(_)) => Some(v),
        (DataType::Text, Datum::Uuid(u)) => Some(Datum::String(u.to_string())),
        (DataType::Uuid, v @ Datum::Uuid(_)) => Some(v),
        (DataType::Uuid, Datum::String(ref s)) => Uuid::parse_str(s).ok().map(Datum::Uuid),
        (DataType::Timestamp, v @ Datum::Timestamp(_)) => Some(v),
        (DataType::Timestamp, Datum::Int(ms)) => Some(Datum::Timestamp(ms)),
        (_, v) => {
            return Err(TransformError::FieldTypeMismatch {
                field: field.name.clone(),
                expected: field.data_type,
                got: describe(&v),
            })
        }
    };

    coerced.ok_or_else(|| TransformError::FieldTypeMismatch {
        field: field.name.clone(),
        expected: field.data_type,
        got: "out of range or malformed value".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: DataType) -> FieldDef {
        FieldDef::new("f", ty)
    }

    #[test]
    fn test_widening() {
        assert_eq!(coerce(Datum::Int(2), &field(DataType::Double)), Ok(Datum::Float(2.0)));
        assert_eq!(
            coerce(Datum::Int(5), &field(DataType::Timestamp)),
            Ok(Datum::Timestamp(5))
        );
        let id = Uuid::new_v4();
        assert_eq!(
            coerce(Datum::from(id.to_string()), &field(DataType::Uuid)),
            Ok(Datum::Uuid(id))
        );
    }

    #[test]
    fn test_mismatch() {
        assert!(matches!(
            coerce(Datum::from("x"), &field(DataType::BigInt)),
            Err(TransformError::FieldTypeMismatch {
                expected: DataType::BigInt,
                ..
            })
        ));
        assert!(coerce(Datum::Float(1.5), &field(DataType::BigInt)).is_err());
        assert!(coerce(Datum::Int(i64::MAX), &field(DataType::Int)).is_err());
        assert!(coerce(Datum::from("not-a-uuid"), &field(DataType::Uuid)).is_err());
    }

    #[test]
    fn test_null() {
        assert_eq!(coerce(Datum::Null, &field(DataType::Text)), Ok(Datum::Null));
        assert!(matches!(
            coerce(Datum::Null, &field(DataType::Text).nullable(false)),
            Err(TransformError::NullNotAllowed { .. })
        ));
    }
}
