//! Field types that give meaning to an underlying encoding: booleans, enums, literals,
//! and optional values.
//!
//! Reads are lenient by design of the wire format: a boolean byte other than `1` reads as
//! `false`, and enum or literal fields return whatever the underlying field decodes.
//! Membership and equality are checked only by [`FieldType::validate`].

use crate::{
    types::primitives::{Numeric, Uint8},
    Cursor, Error, FieldType, Sink,
};
use std::fmt::Debug;

/// A boolean stored in one byte.
///
/// Writes `true` as `1` and `false` as `0`. Reads `1` as `true` and any other byte as
/// `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bool;

impl FieldType for Bool {
    type Value = bool;

    #[inline]
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<bool, Error> {
        Ok(Uint8.read(cursor)? == 1)
    }

    #[inline]
    fn write(&self, sink: &mut Sink, value: &bool) -> Result<(), Error> {
        Uint8.write(sink, &u8::from(*value))
    }

    fn fixed_size(&self) -> Option<usize> {
        Uint8.fixed_size()
    }
}

/// A field restricted to a named set of values.
///
/// Created with [`string_enum`] or [`number_enum`].
pub struct Enumeration<F: FieldType> {
    field: F,
    members: Vec<(&'static str, F::Value)>,
}

/// Creates an enum whose values are encoded with a string field.
pub fn string_enum<F>(
    field: F,
    members: impl IntoIterator<Item = (&'static str, &'static str)>,
) -> Enumeration<F>
where
    F: FieldType<Value = String>,
{
    Enumeration {
        field,
        members: members
            .into_iter()
            .map(|(name, value)| (name, value.to_owned()))
            .collect(),
    }
}

/// Creates an enum whose values are encoded with a numeric field.
pub fn number_enum<F>(
    field: F,
    members: impl IntoIterator<Item = (&'static str, F::Value)>,
) -> Enumeration<F>
where
    F: FieldType,
    F::Value: Numeric,
{
    Enumeration {
        field,
        members: members.into_iter().collect(),
    }
}

impl<F> Enumeration<F>
where
    F: FieldType,
    F::Value: PartialEq,
{
    /// Returns the `(name, value)` pairs of the enum, in declaration order.
    pub fn members(&self) -> &[(&'static str, F::Value)] {
        &self.members
    }

    /// Returns the name of the member with `value`.
    pub fn name_of(&self, value: &F::Value) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(_, member)| member == value)
            .map(|(name, _)| *name)
    }

    /// Returns the value of the member called `name`.
    pub fn value_of(&self, name: &str) -> Option<&F::Value> {
        self.members
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, value)| value)
    }
}

impl<F> FieldType for Enumeration<F>
where
    F: FieldType,
    F::Value: PartialEq + Debug,
{
    type Value = F::Value;

    #[inline]
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<F::Value, Error> {
        self.field.read(cursor)
    }

    #[inline]
    fn write(&self, sink: &mut Sink, value: &F::Value) -> Result<(), Error> {
        self.field.write(sink, value)
    }

    fn validate(&self, value: &F::Value) -> Result<(), Error> {
        self.field.validate(value)?;
        if self.name_of(value).is_none() {
            return Err(Error::Invalid(
                "enum",
                format!("{value:?} is not a member"),
            ));
        }
        Ok(())
    }

    fn fixed_size(&self) -> Option<usize> {
        self.field.fixed_size()
    }
}

/// A field narrowed to exactly one value.
pub struct Literal<F: FieldType> {
    field: F,
    value: F::Value,
}

/// Creates a field that only accepts `value`.
pub fn literal<F: FieldType>(field: F, value: F::Value) -> Literal<F> {
    Literal { field, value }
}

impl<F: FieldType> Literal<F> {
    /// Returns the only accepted value.
    pub fn value(&self) -> &F::Value {
        &self.value
    }
}

impl<F> FieldType for Literal<F>
where
    F: FieldType,
    F::Value: PartialEq + Debug,
{
    type Value = F::Value;

    #[inline]
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<F::Value, Error> {
        self.field.read(cursor)
    }

    #[inline]
    fn write(&self, sink: &mut Sink, value: &F::Value) -> Result<(), Error> {
        self.field.write(sink, value)
    }

    fn validate(&self, value: &F::Value) -> Result<(), Error> {
        self.field.validate(value)?;
        if *value != self.value {
            return Err(Error::Invalid(
                "literal",
                format!("expected {:?}, found {value:?}", self.value),
            ));
        }
        Ok(())
    }

    fn fixed_size(&self) -> Option<usize> {
        self.field.fixed_size()
    }
}

/// A presence flag followed by the payload, if present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Optional<F> {
    field: F,
}

/// Creates a field that may or may not hold a value of `field`.
pub fn optional<F: FieldType>(field: F) -> Optional<F> {
    Optional { field }
}

impl<F: FieldType> FieldType for Optional<F> {
    type Value = Option<F::Value>;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error> {
        if Bool.read(cursor)? {
            Ok(Some(self.field.read(cursor)?))
        } else {
            Ok(None)
        }
    }

    fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error> {
        Bool.write(sink, &value.is_some())?;
        if let Some(inner) = value {
            self.field.write(sink, inner)?;
        }
        Ok(())
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        match value {
            Some(inner) => self.field.validate(inner),
            None => Ok(()),
        }
    }
}
