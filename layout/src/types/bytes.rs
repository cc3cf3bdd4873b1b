//! Raw byte field types.

use crate::{types::primitives::Length, Cursor, Error, FieldType, RangeCfg, Sink};
use bytes::Bytes;

/// Exactly `len` raw bytes, with no length on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedLengthBytes {
    len: usize,
}

/// Creates a field of exactly `len` raw bytes.
pub fn fixed_length_bytes(len: usize) -> FixedLengthBytes {
    FixedLengthBytes { len }
}

impl FixedLengthBytes {
    /// Returns the number of bytes the field occupies.
    pub fn width(&self) -> usize {
        self.len
    }

    pub(crate) fn check_len(&self, found: usize) -> Result<(), Error> {
        if found != self.len {
            return Err(Error::Invalid(
                "fixed length",
                format!("expected {} bytes, found {found}", self.len),
            ));
        }
        Ok(())
    }
}

impl FieldType for FixedLengthBytes {
    type Value = Bytes;

    #[inline]
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(cursor.take(self.len)?))
    }

    #[inline]
    fn write(&self, sink: &mut Sink, value: &Bytes) -> Result<(), Error> {
        self.check_len(value.len())?;
        sink.push(value.clone());
        Ok(())
    }

    fn validate(&self, value: &Bytes) -> Result<(), Error> {
        self.check_len(value.len())
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.len)
    }
}

/// Raw bytes preceded by their length, encoded with a length field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthPrefixedBytes<L> {
    length: L,
    range: RangeCfg,
}

/// Creates a field of raw bytes preceded by their length.
pub fn length_prefixed_bytes<L>(length: L) -> LengthPrefixedBytes<L>
where
    L: FieldType,
    L::Value: Length,
{
    LengthPrefixedBytes {
        length,
        range: RangeCfg::default(),
    }
}

impl<L> LengthPrefixedBytes<L>
where
    L: FieldType,
    L::Value: Length,
{
    /// Limits the lengths accepted on read and validation.
    pub fn with_range(mut self, range: impl Into<RangeCfg>) -> Self {
        self.range = range.into();
        self
    }

    pub(crate) fn read_slice<'a>(&self, cursor: &mut Cursor<'a>) -> Result<&'a [u8], Error> {
        let len = self.length.read(cursor)?.to_len()?;
        self.range.check(len)?;
        cursor.take(len)
    }

    pub(crate) fn write_slice(&self, sink: &mut Sink, value: Bytes) -> Result<(), Error> {
        self.length.write(sink, &<L::Value as Length>::from_len(value.len())?)?;
        sink.push(value);
        Ok(())
    }

    pub(crate) fn validate_len(&self, len: usize) -> Result<(), Error> {
        self.range.check(len)?;
        self.length.validate(&<L::Value as Length>::from_len(len)?)
    }
}

impl<L> FieldType for LengthPrefixedBytes<L>
where
    L: FieldType,
    L::Value: Length,
{
    type Value = Bytes;

    #[inline]
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(self.read_slice(cursor)?))
    }

    #[inline]
    fn write(&self, sink: &mut Sink, value: &Bytes) -> Result<(), Error> {
        self.write_slice(sink, value.clone())
    }

    fn validate(&self, value: &Bytes) -> Result<(), Error> {
        self.validate_len(value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{
            primitives::{Uint16BE, Uint8},
            testing::check,
        },
        FieldTypeExt,
    };

    #[test]
    fn test_fixed_length_bytes() {
        check(&fixed_length_bytes(1), &Bytes::from_static(&[1]), &[1]);
        check(&fixed_length_bytes(3), &Bytes::from_static(&[1, 2, 3]), &[1, 2, 3]);
        check(&fixed_length_bytes(0), &Bytes::new(), &[0u8; 0]);
    }

    #[test]
    fn test_fixed_length_bytes_wrong_length() {
        let field = fixed_length_bytes(2);
        assert!(matches!(
            field.encode(&Bytes::from_static(&[1, 2, 3])),
            Err(Error::Invalid("fixed length", _))
        ));
        let mut sink = Sink::new();
        assert!(field.write(&mut sink, &Bytes::from_static(&[1])).is_err());
        assert!(sink.is_empty());
        assert!(matches!(
            field.read(&mut Cursor::new(&[1])),
            Err(Error::EndOfBuffer { .. })
        ));
    }

    #[test]
    fn test_length_prefixed_bytes() {
        let field = length_prefixed_bytes(Uint8);
        check(&field, &Bytes::new(), &[0]);
        check(&field, &Bytes::from_static(&[123]), &[1, 123]);
        check(&field, &Bytes::from_static(&[123, 234, 45]), &[3, 123, 234, 45]);
        check(
            &length_prefixed_bytes(Uint16BE),
            &Bytes::from_static(&[9, 8]),
            &[0, 2, 9, 8],
        );
    }

    #[test]
    fn test_length_prefixed_bytes_overflow() {
        let field = length_prefixed_bytes(Uint8);
        let value = Bytes::from(vec![0u8; 256]);
        assert!(matches!(
            field.encode(&value),
            Err(Error::Invalid("length", _))
        ));
    }

    #[test]
    fn test_length_prefixed_bytes_truncated() {
        let field = length_prefixed_bytes(Uint8);
        assert_eq!(
            field.read(&mut Cursor::new(&[5, 1, 2])),
            Err(Error::EndOfBuffer {
                needed: 5,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_length_prefixed_bytes_range() {
        let field = length_prefixed_bytes(Uint8).with_range(..=2);
        assert_eq!(field.decode(&[2, 1, 2]), Ok(Bytes::from_static(&[1, 2])));
        assert_eq!(field.decode(&[3, 1, 2, 3]), Err(Error::InvalidLength(3)));
        assert_eq!(
            field.encode(&Bytes::from_static(&[1, 2, 3])),
            Err(Error::InvalidLength(3))
        );
    }
}
