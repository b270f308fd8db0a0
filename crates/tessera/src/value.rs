//! Dynamic values carried as bind parameters and produced by row cursors.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bind value or a scanned column value.
///
/// Compiled statements carry their binds as `Value`s so that the bind list can be
/// compared, logged and persisted independently of any backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Convert a Rust value into a bind [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Convert a scanned [`Value`] back into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

/// A literal accepted where a value of kind `T` is expected.
///
/// Unlike `Into<T>`, there is exactly one impl per target kind for a bare
/// numeric literal, so `Column<i16>::eq(5)` infers `5i16`.
pub trait Literal<T> {
    fn into_value(self) -> Value;
}

impl<T: ToValue> Literal<T> for T {
    fn into_value(self) -> Value {
        self.to_value()
    }
}

impl<T: ToValue> Literal<Option<T>> for T {
    fn into_value(self) -> Value {
        self.to_value()
    }
}

impl Literal<String> for &str {
    fn into_value(self) -> Value {
        self.to_value()
    }
}

impl Literal<Option<String>> for &str {
    fn into_value(self) -> Value {
        self.to_value()
    }
}

impl Literal<Vec<u8>> for &[u8] {
    fn into_value(self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

fn mismatch(expected: &'static str, found: &Value) -> OrmError {
    OrmError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

/// Types stored in a single variant without conversion.
macro_rules! impl_direct {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }
    )*};
}

impl_direct! {
    bool => Bool, "bool";
    i64 => Int, "i64";
    f64 => Float, "f64";
    String => Text, "String";
    Vec<u8> => Bytes, "Vec<u8>";
    Uuid => Uuid, "Uuid";
    DateTime<Utc> => Timestamp, "DateTime<Utc>";
    serde_json::Value => Json, "serde_json::Value";
}

/// Narrow integers: widening on bind, range-checked on scan.
macro_rules! impl_narrow_int {
    ($($ty:ty => $name:literal),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| OrmError::TypeMismatch {
                        expected: $name,
                        found: "out-of-range int",
                    }),
                    other => Err(mismatch($name, &other)),
                }
            }
        }
    )*};
}

impl_narrow_int!(i16 => "i16", i32 => "i32");

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(OrmError::TypeMismatch {
                    expected: "f32",
                    found: "out-of-range float",
                })
            }
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_null() {
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(3i64).to_value(), Value::Int(3));
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::Text("x".into())).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn null_into_non_option_is_mismatch() {
        let err = i64::from_value(Value::Null).unwrap_err();
        assert!(matches!(
            err,
            OrmError::TypeMismatch {
                expected: "i64",
                found: "null"
            }
        ));
    }

    #[test]
    fn narrow_int_is_range_checked() {
        assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
        assert!(i16::from_value(Value::Int(i64::from(i16::MAX) + 1)).is_err());
        assert_eq!(5i32.to_value(), Value::Int(5));
    }

    #[test]
    fn f32_overflow_is_rejected() {
        assert_eq!(f32::from_value(Value::Float(1.5)).unwrap(), 1.5);
        assert!(f32::from_value(Value::Float(f64::INFINITY)).unwrap().is_infinite());
        let err = f32::from_value(Value::Float(1e300)).unwrap_err();
        assert!(matches!(
            err,
            OrmError::TypeMismatch {
                expected: "f32",
                found: "out-of-range float"
            }
        ));
    }

    #[test]
    fn literals_convert_to_target_kind() {
        assert_eq!(Literal::<i16>::into_value(5), Value::Int(5));
        assert_eq!(Literal::<Option<i64>>::into_value(7), Value::Int(7));
        assert_eq!(Literal::<Option<i64>>::into_value(None), Value::Null);
        assert_eq!(Literal::<String>::into_value("a"), Value::Text("a".into()));
        assert_eq!(
            Literal::<Vec<u8>>::into_value(&b"ab"[..]),
            Value::Bytes(vec![b'a', b'b'])
        );
    }

    #[test]
    fn str_refs_become_text() {
        assert_eq!("abc".to_value(), Value::Text("abc".to_string()));
        let s = String::from("def");
        assert_eq!((&s).to_value(), Value::Text("def".to_string()));
    }

    #[test]
    fn values_serialize_for_persistence() {
        let json = serde_json::to_string(&vec![Value::Int(5), Value::Text("x".into())]).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Value::Int(5), Value::Text("x".into())]);
    }
}
