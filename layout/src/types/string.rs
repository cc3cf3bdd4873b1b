//! UTF-8 text field types.
//!
//! Decoding is strict: a payload that is not valid UTF-8 fails with
//! [`Error::InvalidUtf8`], never with replacement characters.

use crate::{
    types::{
        bytes::{fixed_length_bytes, length_prefixed_bytes, FixedLengthBytes, LengthPrefixedBytes},
        primitives::Length,
    },
    Cursor, Error, FieldType, RangeCfg, Sink,
};
use bytes::Bytes;
use std::str;

fn decode_text(bytes: &[u8]) -> Result<String, Error> {
    Ok(str::from_utf8(bytes)?.to_owned())
}

/// Text whose UTF-8 encoding is exactly `len` bytes.
///
/// Padding or truncating text to the width is left to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedLengthString {
    bytes: FixedLengthBytes,
}

/// Creates a field of text occupying exactly `len` bytes.
pub fn fixed_length_string(len: usize) -> FixedLengthString {
    FixedLengthString {
        bytes: fixed_length_bytes(len),
    }
}

impl FieldType for FixedLengthString {
    type Value = String;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<String, Error> {
        decode_text(cursor.take(self.bytes.width())?)
    }

    fn write(&self, sink: &mut Sink, value: &String) -> Result<(), Error> {
        self.bytes.check_len(value.len())?;
        sink.push(Bytes::copy_from_slice(value.as_bytes()));
        Ok(())
    }

    fn validate(&self, value: &String) -> Result<(), Error> {
        self.bytes.check_len(value.len())
    }

    fn fixed_size(&self) -> Option<usize> {
        self.bytes.fixed_size()
    }
}

/// Text preceded by the byte length of its UTF-8 encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthPrefixedString<L> {
    bytes: LengthPrefixedBytes<L>,
}

/// Creates a field of text preceded by its byte length.
pub fn length_prefixed_string<L>(length: L) -> LengthPrefixedString<L>
where
    L: FieldType,
    L::Value: Length,
{
    LengthPrefixedString {
        bytes: length_prefixed_bytes(length),
    }
}

impl<L> LengthPrefixedString<L>
where
    L: FieldType,
    L::Value: Length,
{
    /// Limits the byte lengths accepted on read and validation.
    pub fn with_range(self, range: impl Into<RangeCfg>) -> Self {
        Self {
            bytes: self.bytes.with_range(range),
        }
    }
}

impl<L> FieldType for LengthPrefixedString<L>
where
    L: FieldType,
    L::Value: Length,
{
    type Value = String;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<String, Error> {
        decode_text(self.bytes.read_slice(cursor)?)
    }

    fn write(&self, sink: &mut Sink, value: &String) -> Result<(), Error> {
        self.bytes
            .write_slice(sink, Bytes::copy_from_slice(value.as_bytes()))
    }

    fn validate(&self, value: &String) -> Result<(), Error> {
        self.bytes.validate_len(value.len())
    }
}

/// Text followed by a single zero byte.
///
/// A zero byte never occurs inside a multi-byte UTF-8 sequence, so the first zero after the
/// cursor is always the terminator. Text containing `'\0'` cannot be represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullTerminatedString;

impl NullTerminatedString {
    fn check_text(value: &str) -> Result<(), Error> {
        if let Some(index) = value.find('\0') {
            return Err(Error::Invalid(
                "null-terminated string",
                format!("embedded NUL at byte {index}"),
            ));
        }
        Ok(())
    }
}

impl FieldType for NullTerminatedString {
    type Value = String;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<String, Error> {
        let Some(end) = cursor.find(0) else {
            return Err(Error::EndOfBuffer {
                needed: cursor.remaining() + 1,
                remaining: cursor.remaining(),
            });
        };
        let text = decode_text(&cursor.buffer()[cursor.position()..cursor.position() + end])?;
        cursor.take(end + 1)?;
        Ok(text)
    }

    fn write(&self, sink: &mut Sink, value: &String) -> Result<(), Error> {
        Self::check_text(value)?;
        let mut chunk = Vec::with_capacity(value.len() + 1);
        chunk.extend_from_slice(value.as_bytes());
        chunk.push(0);
        sink.push(chunk);
        Ok(())
    }

    fn validate(&self, value: &String) -> Result<(), Error> {
        Self::check_text(value)
    }
}
