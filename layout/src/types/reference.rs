//! Forward references resolved by patching the sink after the fact.
//!
//! A [`Ref`] field is written before the value it describes is known. It records its chunk
//! position in the [`Sink`] and emits a zero placeholder. When the field wrapped by the paired
//! [`Target`] is written later in the same sink, the real value is encoded and swapped in
//! over the placeholder chunk:
//!
//! - [`reference`] patches in the offset at which the target's payload starts
//! - [`length_reference`] patches in the byte length of the target's payload
//!
//! The patched encoding must have the same width as the placeholder, which holds for every
//! fixed-width integer field. Reading needs no coordination: both fields decode normally.
//!
//! ```
//! use commonware_layout::{
//!     types::{bytes::fixed_length_bytes, primitives::Uint8, reference::length_reference},
//!     FieldTypeExt,
//! };
//! use bytes::Bytes;
//!
//! let (len, payload) = length_reference(Uint8);
//! let field = (len, payload.wrap(fixed_length_bytes(3)));
//! let encoded = field.encode(&(0, Bytes::from_static(b"abc"))).unwrap();
//! assert_eq!(encoded.as_ref(), &[3, b'a', b'b', b'c']);
//! ```

use crate::{types::primitives::Length, Cursor, Error, FieldType, Sink};
use bytes::Bytes;
use std::{cell::Cell, rc::Rc};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Offset,
    Length,
}

/// Position of a placeholder within a specific sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    sink: u64,
    index: usize,
    stamp: u64,
}

impl Slot {
    /// Returns true if the placeholder is still in `sink` and has not been rolled back.
    fn is_live(&self, sink: &Sink) -> bool {
        self.sink == sink.id() && sink.stamp(self.index) == Some(self.stamp)
    }
}

struct Shared<F> {
    field: F,
    mode: Mode,
    slot: Cell<Option<Slot>>,
}

impl<F> Shared<F>
where
    F: FieldType,
    F::Value: Length,
{
    fn encode_len(&self, len: usize) -> Result<Bytes, Error> {
        let mut scratch = Sink::new();
        self.field
            .write(&mut scratch, &<F::Value as Length>::from_len(len)?)?;
        Ok(scratch.finish())
    }
}

/// The placeholder half of a reference pair.
///
/// The value passed to [`FieldType::write`] is ignored: the placeholder is always zero
/// until the paired [`Target`] patches it.
pub struct Ref<F> {
    shared: Rc<Shared<F>>,
}

/// The resolving half of a reference pair.
pub struct Target<F> {
    shared: Rc<Shared<F>>,
}

/// A field whose write patches the placeholder of a [`Ref`].
///
/// Created with [`Target::wrap`].
pub struct Referenced<F, G> {
    shared: Rc<Shared<F>>,
    inner: G,
}

fn pair<F>(field: F, mode: Mode) -> (Ref<F>, Target<F>) {
    let shared = Rc::new(Shared {
        field,
        mode,
        slot: Cell::new(None),
    });
    (
        Ref {
            shared: shared.clone(),
        },
        Target { shared },
    )
}

/// Creates a reference whose value is the offset of the target's payload in the output.
pub fn reference<F>(field: F) -> (Ref<F>, Target<F>)
where
    F: FieldType,
    F::Value: Length,
{
    pair(field, Mode::Offset)
}

/// Creates a reference whose value is the byte length of the target's payload.
pub fn length_reference<F>(field: F) -> (Ref<F>, Target<F>)
where
    F: FieldType,
    F::Value: Length,
{
    pair(field, Mode::Length)
}

impl<F> Clone for Ref<F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<F> Clone for Target<F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<F> FieldType for Ref<F>
where
    F: FieldType,
    F::Value: Length,
{
    type Value = F::Value;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<F::Value, Error> {
        self.shared.field.read(cursor)
    }

    fn write(&self, sink: &mut Sink, _value: &F::Value) -> Result<(), Error> {
        // Only the first write to a sink reserves a placeholder
        if matches!(self.shared.slot.get(), Some(slot) if slot.is_live(sink)) {
            return Ok(());
        }

        let index = sink.chunk_count();
        sink.push(self.shared.encode_len(0)?);
        let Some(stamp) = sink.stamp(index) else {
            return Err(Error::UnresolvedReference);
        };
        let slot = Slot {
            sink: sink.id(),
            index,
            stamp,
        };
        self.shared.slot.set(Some(slot));
        trace!(sink = slot.sink, index = slot.index, "recorded reference slot");
        Ok(())
    }

    fn validate(&self, value: &F::Value) -> Result<(), Error> {
        self.shared.field.validate(value)
    }

    fn fixed_size(&self) -> Option<usize> {
        self.shared.field.fixed_size()
    }
}

impl<F> Target<F>
where
    F: FieldType,
    F::Value: Length,
{
    /// Wraps `inner` so that writing it resolves the paired [`Ref`].
    pub fn wrap<G: FieldType>(&self, inner: G) -> Referenced<F, G> {
        Referenced {
            shared: self.shared.clone(),
            inner,
        }
    }
}

impl<F, G> FieldType for Referenced<F, G>
where
    F: FieldType,
    F::Value: Length,
    G: FieldType,
{
    type Value = G::Value;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<G::Value, Error> {
        self.inner.read(cursor)
    }

    fn write(&self, sink: &mut Sink, value: &G::Value) -> Result<(), Error> {
        let Some(slot) = self.shared.slot.get().filter(|slot| slot.is_live(sink)) else {
            trace!(sink = sink.id(), "reference target written before its reference");
            return Err(Error::UnresolvedReference);
        };

        // The placeholder is replaced last, so any failure leaves it in place
        let checkpoint = sink.checkpoint();
        let result = self.inner.write(sink, value).and_then(|()| {
            let patched = match self.shared.mode {
                Mode::Offset => checkpoint.len(),
                Mode::Length => sink.len() - checkpoint.len(),
            };
            sink.patch(slot.index, self.shared.encode_len(patched)?)?;
            Ok(patched)
        });
        match result {
            Ok(patched) => {
                self.shared.slot.set(None);
                trace!(sink = slot.sink, index = slot.index, patched, "patched reference");
                Ok(())
            }
            Err(err) => {
                sink.rollback(checkpoint);
                Err(err)
            }
        }
    }

    fn validate(&self, value: &G::Value) -> Result<(), Error> {
        self.inner.validate(value)
    }

    fn fixed_size(&self) -> Option<usize> {
        self.inner.fixed_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{
            bytes::{fixed_length_bytes, length_prefixed_bytes},
            primitives::{Uint16LE, Uint8},
            string::NullTerminatedString,
            structure::Struct,
        },
        FieldTypeExt, Record, Value,
    };

    #[test]
    fn test_offset_reference() {
        let (offset, target) = reference(Uint8);
        let field = (offset, Uint8, target.wrap(fixed_length_bytes(2)));
        let encoded = field
            .encode(&(0, 9, Bytes::from_static(&[7, 8])))
            .unwrap();
        assert_eq!(encoded.as_ref(), &[2, 9, 7, 8]);
        assert_eq!(
            field.decode(&encoded),
            Ok((2, 9, Bytes::from_static(&[7, 8])))
        );
    }

    #[test]
    fn test_length_reference() {
        let (len, target) = length_reference(Uint8);
        let field = (len, target.wrap(fixed_length_bytes(3)));
        let encoded = field
            .encode(&(0, Bytes::from_static(&[0xaa, 0xbb, 0xcc])))
            .unwrap();
        assert_eq!(encoded.as_ref(), &[3, 0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn test_length_reference_in_struct() {
        let (len, target) = length_reference(Uint16LE);
        let field = Struct::new()
            .field("len", len)
            .field("tag", Uint8)
            .field("name", target.wrap(NullTerminatedString));
        let value: Record = [
            ("len".to_string(), Value::Int(0)),
            ("tag".to_string(), Value::Int(1)),
            ("name".to_string(), Value::from("abc")),
        ]
        .into_iter()
        .collect();
        let encoded = field.encode(&value).unwrap();
        assert_eq!(encoded.as_ref(), &[4, 0, 1, 97, 98, 99, 0]);
        assert_eq!(field.decode(&encoded).unwrap()["len"], Value::Int(4));
    }

    #[test]
    fn test_unresolved_reference() {
        let (_offset, target) = reference(Uint8);
        let field = target.wrap(Uint8);
        let mut sink = Sink::new();
        assert_eq!(field.write(&mut sink, &1), Err(Error::UnresolvedReference));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_reference_recorded_in_other_sink() {
        let (offset, target) = reference(Uint8);
        let mut first = Sink::new();
        offset.write(&mut first, &0).unwrap();

        let mut second = Sink::new();
        assert_eq!(
            target.wrap(Uint8).write(&mut second, &1),
            Err(Error::UnresolvedReference)
        );

        // A write to a new sink records a fresh slot
        offset.write(&mut second, &0).unwrap();
        target.wrap(Uint8).write(&mut second, &1).unwrap();
        assert_eq!(second.finish().as_ref(), &[1, 1]);
        assert_eq!(first.finish().as_ref(), &[0]);
    }

    #[test]
    fn test_reference_reused_across_encodes() {
        let (offset, target) = reference(Uint8);
        let field = (Uint8, offset, target.wrap(Uint8));
        for _ in 0..3 {
            let encoded = field.encode(&(5, 0, 6)).unwrap();
            assert_eq!(encoded.as_ref(), &[5, 2, 6]);
        }
    }

    #[test]
    fn test_reference_keeps_first_position() {
        let (offset, target) = reference(Uint8);
        let mut sink = Sink::new();
        offset.write(&mut sink, &0).unwrap();
        offset.clone().write(&mut sink, &0).unwrap();
        assert_eq!(sink.len(), 1);
        target.wrap(Uint8).write(&mut sink, &5).unwrap();
        assert_eq!(sink.finish().as_ref(), &[1, 5]);
    }

    #[test]
    fn test_failed_payload_rolls_back() {
        let (len, target) = length_reference(Uint8);
        let payload = target.wrap(fixed_length_bytes(2));
        let mut sink = Sink::new();
        len.write(&mut sink, &0).unwrap();
        assert!(payload
            .write(&mut sink, &Bytes::from_static(&[1, 2, 3]))
            .is_err());
        assert_eq!(sink.finish().as_ref(), &[0]);

        // The slot survives the failure and resolves on retry
        payload
            .write(&mut sink, &Bytes::from_static(&[1, 2]))
            .unwrap();
        assert_eq!(sink.finish().as_ref(), &[2, 1, 2]);
    }

    #[test]
    fn test_rolled_back_reference() {
        let (offset, target) = reference(Uint8);
        let inner = (offset.clone(), fixed_length_bytes(2));
        let (len, outer) = length_reference(Uint8);
        let field = (len, outer.wrap(inner));

        // The outer payload fails after the reference recorded its placeholder
        let mut sink = Sink::new();
        assert!(field
            .write(&mut sink, &(0, (0, Bytes::from_static(&[1]))))
            .is_err());
        assert_eq!(sink.finish().as_ref(), &[0]);

        // A chunk of the same width now sits where the placeholder was
        sink.push(vec![9u8]);
        assert_eq!(
            target.wrap(Uint8).write(&mut sink, &5),
            Err(Error::UnresolvedReference)
        );
        assert_eq!(sink.finish().as_ref(), &[0, 9]);

        // Writing the reference again records a fresh placeholder
        offset.write(&mut sink, &0).unwrap();
        target.wrap(Uint8).write(&mut sink, &5).unwrap();
        assert_eq!(sink.finish().as_ref(), &[0, 9, 3, 5]);
    }

    #[test]
    fn test_patched_value_overflow() {
        let (offset, target) = reference(Uint8);
        let field = (
            offset,
            fixed_length_bytes(300),
            target.wrap(Uint8),
        );
        let mut sink = Sink::new();
        assert!(matches!(
            field.write(&mut sink, &(0, Bytes::from(vec![0u8; 300]), 1)),
            Err(Error::Invalid("length", _))
        ));
        assert_eq!(sink.len(), 301);
    }

    #[test]
    fn test_patch_width_mismatch() {
        // Decimal text: the placeholder "0" is narrower than "12"
        let decimal = NullTerminatedString.map(
            |text| {
                text.parse::<u8>()
                    .map_err(|err| Error::Invalid("decimal", err.to_string()))
            },
            |n: &u8| Ok(n.to_string()),
        );
        let (offset, target) = reference(decimal);
        let field = (offset, fixed_length_bytes(10), target.wrap(Uint8));
        assert_eq!(
            field.encode(&(0, Bytes::from(vec![0u8; 10]), 1)),
            Err(Error::PatchWidth {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_reference_read_is_plain() {
        let (len, target) = length_reference(Uint8);
        let field = (len, target.wrap(length_prefixed_bytes(Uint8)));
        let mut cursor = Cursor::new(&[9, 2, 1, 2]);
        assert_eq!(
            field.read(&mut cursor),
            Ok((9, Bytes::from_static(&[1, 2])))
        );
    }
}
