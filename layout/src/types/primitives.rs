//! Fixed-width numeric field types.
//!
//! Every multi-byte type comes in a little-endian (`LE`) and a big-endian (`BE`) variant;
//! there is no host-endian default. Values use native Rust types, so 64-bit integers are
//! represented without loss and typed values can never exceed their range. Floats accept
//! every bit pattern, including NaN and the infinities, and round-trip exactly.

use crate::{Cursor, Error, FieldType, Sink};
use bytes::{Buf, BufMut, BytesMut};
use std::mem::size_of;

macro_rules! impl_primitive {
    ($name:ident, $type:ty, $get:ident, $put:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl FieldType for $name {
            type Value = $type;

            #[inline]
            fn read(&self, cursor: &mut Cursor<'_>) -> Result<$type, Error> {
                cursor.ensure(size_of::<$type>())?;
                Ok(cursor.$get())
            }

            #[inline]
            fn write(&self, sink: &mut Sink, value: &$type) -> Result<(), Error> {
                let mut chunk = BytesMut::with_capacity(size_of::<$type>());
                chunk.$put(*value);
                sink.push(chunk.freeze());
                Ok(())
            }

            #[inline]
            fn fixed_size(&self) -> Option<usize> {
                Some(size_of::<$type>())
            }
        }
    };
}

impl_primitive!(Uint8, u8, get_u8, put_u8, "Unsigned 8-bit integer.");
impl_primitive!(Uint16LE, u16, get_u16_le, put_u16_le, "Unsigned 16-bit integer, little-endian.");
impl_primitive!(Uint16BE, u16, get_u16, put_u16, "Unsigned 16-bit integer, big-endian.");
impl_primitive!(Uint32LE, u32, get_u32_le, put_u32_le, "Unsigned 32-bit integer, little-endian.");
impl_primitive!(Uint32BE, u32, get_u32, put_u32, "Unsigned 32-bit integer, big-endian.");
impl_primitive!(Uint64LE, u64, get_u64_le, put_u64_le, "Unsigned 64-bit integer, little-endian.");
impl_primitive!(Uint64BE, u64, get_u64, put_u64, "Unsigned 64-bit integer, big-endian.");
impl_primitive!(Int8, i8, get_i8, put_i8, "Signed 8-bit integer.");
impl_primitive!(Int16LE, i16, get_i16_le, put_i16_le, "Signed 16-bit integer, little-endian.");
impl_primitive!(Int16BE, i16, get_i16, put_i16, "Signed 16-bit integer, big-endian.");
impl_primitive!(Int32LE, i32, get_i32_le, put_i32_le, "Signed 32-bit integer, little-endian.");
impl_primitive!(Int32BE, i32, get_i32, put_i32, "Signed 32-bit integer, big-endian.");
impl_primitive!(Int64LE, i64, get_i64_le, put_i64_le, "Signed 64-bit integer, little-endian.");
impl_primitive!(Int64BE, i64, get_i64, put_i64, "Signed 64-bit integer, big-endian.");
impl_primitive!(Float32LE, f32, get_f32_le, put_f32_le, "IEEE-754 binary32, little-endian.");
impl_primitive!(Float32BE, f32, get_f32, put_f32, "IEEE-754 binary32, big-endian.");
impl_primitive!(Float64LE, f64, get_f64_le, put_f64_le, "IEEE-754 binary64, little-endian.");
impl_primitive!(Float64BE, f64, get_f64, put_f64, "IEEE-754 binary64, big-endian.");

/// Numeric values, as accepted by [`number_enum`](crate::types::logical::number_enum).
pub trait Numeric: Copy + PartialEq {}

/// Integer values usable as a length, count, index, or reference.
pub trait Length: Numeric + Into<i128> {
    /// Converts the decoded value into a length.
    fn to_len(self) -> Result<usize, Error>;

    /// Converts a length into a value to encode.
    fn from_len(len: usize) -> Result<Self, Error>;
}

macro_rules! impl_length {
    ($($type:ty),*) => {
        $(
            impl Numeric for $type {}

            impl Length for $type {
                #[inline]
                fn to_len(self) -> Result<usize, Error> {
                    usize::try_from(self).map_err(|_| {
                        Error::Invalid("length", format!("{self} is not a valid length"))
                    })
                }

                #[inline]
                fn from_len(len: usize) -> Result<Self, Error> {
                    <$type>::try_from(len).map_err(|_| {
                        Error::Invalid(
                            "length",
                            format!("{len} does not fit in {}", stringify!($type)),
                        )
                    })
                }
            }
        )*
    };
}

impl_length!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Numeric for f32 {}
impl Numeric for f64 {}
