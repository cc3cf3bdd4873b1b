//! Repetition of a field type.

use crate::{types::primitives::Length, Cursor, Error, FieldType, RangeCfg, Sink};

/// Exactly `len` elements in sequence, with no count on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedLengthArray<F> {
    field: F,
    len: usize,
}

/// Creates a field of exactly `len` elements of `field`.
pub fn fixed_length_array<F: FieldType>(field: F, len: usize) -> FixedLengthArray<F> {
    FixedLengthArray { field, len }
}

impl<F: FieldType> FixedLengthArray<F> {
    fn check_len(&self, found: usize) -> Result<(), Error> {
        if found != self.len {
            return Err(Error::Invalid(
                "fixed length array",
                format!("expected {} elements, found {found}", self.len),
            ));
        }
        Ok(())
    }
}

impl<F: FieldType> FieldType for FixedLengthArray<F> {
    type Value = Vec<F::Value>;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error> {
        let mut items = Vec::with_capacity(self.len);
        for _ in 0..self.len {
            items.push(self.field.read(cursor)?);
        }
        Ok(items)
    }

    fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error> {
        self.check_len(value.len())?;
        for item in value {
            self.field.write(sink, item)?;
        }
        Ok(())
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        self.check_len(value.len())?;
        value.iter().try_for_each(|item| self.field.validate(item))
    }

    fn fixed_size(&self) -> Option<usize> {
        self.field.fixed_size().map(|size| size * self.len)
    }
}

/// Elements preceded by their count, encoded with a length field.
///
/// Counts read from the input never size an allocation beyond the bytes remaining. Arrays
/// of zero-width elements (such as `fixed_length_bytes(0)`) need an upper bound from
/// [`LengthPrefixedArray::with_range`] to decode counts larger than the bytes that follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthPrefixedArray<L, F> {
    length: L,
    field: F,
    range: RangeCfg,
}

/// Creates a field of elements of `field` preceded by their count.
pub fn length_prefixed_array<L, F>(length: L, field: F) -> LengthPrefixedArray<L, F>
where
    L: FieldType,
    L::Value: Length,
    F: FieldType,
{
    LengthPrefixedArray {
        length,
        field,
        range: RangeCfg::default(),
    }
}

impl<L, F> LengthPrefixedArray<L, F> {
    /// Limits the element counts accepted on read and validation.
    pub fn with_range(mut self, range: impl Into<RangeCfg>) -> Self {
        self.range = range.into();
        self
    }
}

impl<L, F> FieldType for LengthPrefixedArray<L, F>
where
    L: FieldType,
    L::Value: Length,
    F: FieldType,
{
    type Value = Vec<F::Value>;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error> {
        let len = self.range.check(self.length.read(cursor)?.to_len()?)?;

        // Zero-width elements consume nothing, so only the range can limit their count
        if self.field.fixed_size() == Some(0)
            && !self.range.is_bounded()
            && len > cursor.remaining()
        {
            return Err(Error::InvalidLength(len));
        }
        let mut items = Vec::with_capacity(len.min(cursor.remaining()));
        for _ in 0..len {
            items.push(self.field.read(cursor)?);
        }
        Ok(items)
    }

    fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error> {
        self.length
            .write(sink, &<L::Value as Length>::from_len(value.len())?)?;
        for item in value {
            self.field.write(sink, item)?;
        }
        Ok(())
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        let len = self.range.check(value.len())?;
        self.length
            .validate(&<L::Value as Length>::from_len(len)?)?;
        value.iter().try_for_each(|item| self.field.validate(item))
    }
}
