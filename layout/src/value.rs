//! Runtime-shaped values for heterogeneous layouts.
//!
//! Most field types are statically typed: [`Uint16LE`](crate::types::primitives::Uint16LE)
//! reads a `u16`, [`optional`](crate::types::logical::optional) wraps any field's value in an
//! [`Option`], and so on. Structs and unions, however, mix values of different types under
//! names or discriminators chosen at runtime. Those combinators operate on [`Value`], and
//! statically typed fields are adapted to them through the [`Dynamic`] conversion.
//!
//! Converting from a [`Value`] is where runtime shape is checked:
//! - a value of the wrong kind fails with [`Error::UnexpectedType`]
//! - an integer outside the target's range fails with [`Error::Invalid`]

use crate::Error;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Decoded struct contents, keyed by field name.
pub type Record = BTreeMap<String, Value>;

/// A dynamically typed decoded value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Any integer up to 64 bits, signed or unsigned, without loss.
    Int(i128),
    Float(f64),
    Bytes(Bytes),
    Str(String),
    Option(Option<Box<Value>>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Returns a short name for the kind of this value.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "string",
            Self::Option(_) => "option",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedType {
            expected,
            found: self.kind(),
        }
    }
}

/// Conversion between a statically typed value and a [`Value`].
pub trait Dynamic: Sized {
    /// Wraps `self` in a [`Value`].
    fn into_value(self) -> Value;

    /// Extracts `Self` from a [`Value`], checking its kind and range.
    fn from_value(value: &Value) -> Result<Self, Error>;
}

impl Dynamic for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

macro_rules! impl_dynamic_int {
    ($($type:ty),*) => {
        $(
            impl Dynamic for $type {
                #[inline]
                fn into_value(self) -> Value {
                    Value::Int(i128::from(self))
                }

                #[inline]
                fn from_value(value: &Value) -> Result<Self, Error> {
                    match value {
                        Value::Int(n) => <$type>::try_from(*n).map_err(|_| {
                            Error::Invalid(
                                stringify!($type),
                                format!(
                                    "{n} is outside [{}, {}]",
                                    <$type>::MIN,
                                    <$type>::MAX
                                ),
                            )
                        }),
                        other => Err(other.unexpected("int")),
                    }
                }
            }
        )*
    };
}

impl_dynamic_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Dynamic for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float(f) => Ok(*f),
            other => Err(other.unexpected("float")),
        }
    }
}

impl Dynamic for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }

    /// Accepts floats that narrow without loss, and NaN.
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float(f) => {
                #[allow(clippy::cast_possible_truncation)]
                let narrowed = *f as f32;
                if f.is_nan() || f64::from(narrowed) == *f {
                    return Ok(narrowed);
                }
                Err(Error::Invalid(
                    "f32",
                    format!("{f} is not representable"),
                ))
            }
            other => Err(other.unexpected("float")),
        }
    }
}

impl Dynamic for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(other.unexpected("bool")),
        }
    }
}

impl Dynamic for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(other.unexpected("string")),
        }
    }
}

impl Dynamic for Bytes {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(other.unexpected("bytes")),
        }
    }
}

impl Dynamic for Record {
    fn into_value(self) -> Value {
        Value::Record(self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Record(r) => Ok(r.clone()),
            other => Err(other.unexpected("record")),
        }
    }
}

impl<T: Dynamic> Dynamic for Option<T> {
    fn into_value(self) -> Value {
        Value::Option(self.map(|inner| Box::new(inner.into_value())))
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => Ok(Some(T::from_value(inner)?)),
            other => Err(other.unexpected("option")),
        }
    }
}

impl<T: Dynamic> Dynamic for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Dynamic::into_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(other.unexpected("list")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

macro_rules! impl_value_from_int {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Self {
                    Self::Int(i128::from(value))
                }
            }
        )*
    };
}

impl_value_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);
