//! The [`FieldType`] trait and the adapters every field type shares.

use crate::{
    cursor::Cursor,
    sink::Sink,
    value::{Dynamic, Value},
    Error,
};
use bytes::Bytes;
use std::rc::Rc;
use tracing::debug;

/// A read/write/validate triple for one semantic value type.
///
/// Implementations must uphold two laws for every value `v` accepted by
/// [`FieldType::validate`]:
/// - reading the bytes produced by [`FieldType::write`] yields `v` again
/// - [`FieldType::read`] consumes exactly as many bytes as [`FieldType::write`] appended
pub trait FieldType {
    /// The decoded representation of the field.
    type Value;

    /// Decodes a value, advancing `cursor` past the bytes consumed.
    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error>;

    /// Encodes `value` by appending to `sink`.
    fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error>;

    /// Checks that `value` is acceptable, independent of any encoding.
    fn validate(&self, _value: &Self::Value) -> Result<(), Error> {
        Ok(())
    }

    /// The encoded width of every value, if constant.
    fn fixed_size(&self) -> Option<usize> {
        None
    }
}

macro_rules! impl_field_type_for_pointer {
    ($($pointer:ty),*) => {
        $(
            impl<F: FieldType + ?Sized> FieldType for $pointer {
                type Value = F::Value;

                #[inline]
                fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error> {
                    (**self).read(cursor)
                }

                #[inline]
                fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error> {
                    (**self).write(sink, value)
                }

                #[inline]
                fn validate(&self, value: &Self::Value) -> Result<(), Error> {
                    (**self).validate(value)
                }

                #[inline]
                fn fixed_size(&self) -> Option<usize> {
                    (**self).fixed_size()
                }
            }
        )*
    };
}

impl_field_type_for_pointer!(&F, Box<F>, Rc<F>);

/// A type-erased field over [`Value`], as stored by structs and unions.
pub type BoxedField = Box<dyn FieldType<Value = Value>>;

/// Extension trait providing encode/decode helpers and combinator builders.
pub trait FieldTypeExt: FieldType + Sized {
    /// Validates `value`, writes it into a fresh [`Sink`], and returns the finished bytes.
    fn encode(&self, value: &Self::Value) -> Result<Bytes, Error> {
        self.validate(value)?;
        let mut sink = Sink::new();
        self.write(&mut sink, value)?;
        Ok(sink.finish())
    }

    /// Reads a value from `buf`, ensuring the buffer is fully consumed, then validates it.
    ///
    /// For fields with a constant width, the buffer length is checked before reading.
    fn decode(&self, buf: &[u8]) -> Result<Self::Value, Error> {
        if let Some(size) = self.fixed_size() {
            if buf.len() < size {
                return Err(Error::EndOfBuffer {
                    needed: size,
                    remaining: buf.len(),
                });
            }
            if buf.len() > size {
                return Err(Error::ExtraData(buf.len() - size));
            }
        }

        let mut cursor = Cursor::new(buf);
        let value = self.read(&mut cursor)?;
        let remaining = cursor.remaining();
        if remaining > 0 {
            debug!(remaining, consumed = cursor.position(), "decode left extra data");
            return Err(Error::ExtraData(remaining));
        }
        self.validate(&value)?;
        Ok(value)
    }

    /// Converts values after reading and before writing.
    ///
    /// `read` maps a decoded value into the new representation, `write` maps it back for
    /// encoding. Validation converts with `write` and validates the underlying field.
    fn map<B, R, W>(self, read: R, write: W) -> Map<Self, R, W>
    where
        R: Fn(Self::Value) -> Result<B, Error>,
        W: Fn(&B) -> Result<Self::Value, Error>,
    {
        Map {
            field: self,
            read,
            write,
        }
    }

    /// Attaches an additional validation predicate, reported under `context` on failure.
    fn refine<P>(self, context: &'static str, predicate: P) -> Refine<Self, P>
    where
        P: Fn(&Self::Value) -> bool,
    {
        Refine {
            field: self,
            context,
            predicate,
        }
    }

    /// Adapts the field to read and write [`Value`]s.
    fn erase(self) -> Erased<Self>
    where
        Self::Value: Dynamic,
    {
        Erased(self)
    }

    /// Erases and boxes the field, ready to be stored in a struct or union.
    fn boxed(self) -> BoxedField
    where
        Self: 'static,
        Self::Value: Dynamic,
    {
        Box::new(Erased(self))
    }
}

impl<F: FieldType> FieldTypeExt for F {}

/// Field type produced by [`FieldTypeExt::map`].
#[derive(Clone, Debug)]
pub struct Map<F, R, W> {
    field: F,
    read: R,
    write: W,
}

impl<F, R, W, B> FieldType for Map<F, R, W>
where
    F: FieldType,
    R: Fn(F::Value) -> Result<B, Error>,
    W: Fn(&B) -> Result<F::Value, Error>,
{
    type Value = B;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<B, Error> {
        (self.read)(self.field.read(cursor)?)
    }

    fn write(&self, sink: &mut Sink, value: &B) -> Result<(), Error> {
        self.field.write(sink, &(self.write)(value)?)
    }

    fn validate(&self, value: &B) -> Result<(), Error> {
        self.field.validate(&(self.write)(value)?)
    }

    fn fixed_size(&self) -> Option<usize> {
        self.field.fixed_size()
    }
}

/// Field type produced by [`FieldTypeExt::refine`].
#[derive(Clone, Debug)]
pub struct Refine<F, P> {
    field: F,
    context: &'static str,
    predicate: P,
}

impl<F, P> FieldType for Refine<F, P>
where
    F: FieldType,
    P: Fn(&F::Value) -> bool,
{
    type Value = F::Value;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<F::Value, Error> {
        self.field.read(cursor)
    }

    fn write(&self, sink: &mut Sink, value: &F::Value) -> Result<(), Error> {
        self.field.write(sink, value)
    }

    fn validate(&self, value: &F::Value) -> Result<(), Error> {
        self.field.validate(value)?;
        if !(self.predicate)(value) {
            return Err(Error::Invalid(self.context, "rejected by refinement".into()));
        }
        Ok(())
    }

    fn fixed_size(&self) -> Option<usize> {
        self.field.fixed_size()
    }
}

/// Field type produced by [`FieldTypeExt::erase`].
#[derive(Clone, Debug)]
pub struct Erased<F>(F);

impl<F> FieldType for Erased<F>
where
    F: FieldType,
    F::Value: Dynamic,
{
    type Value = Value;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Value, Error> {
        Ok(self.0.read(cursor)?.into_value())
    }

    fn write(&self, sink: &mut Sink, value: &Value) -> Result<(), Error> {
        self.0.write(sink, &<F::Value as Dynamic>::from_value(value)?)
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        self.0.validate(&<F::Value as Dynamic>::from_value(value)?)
    }

    fn fixed_size(&self) -> Option<usize> {
        self.0.fixed_size()
    }
}
