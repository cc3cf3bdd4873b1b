//! Field type implementations and combinators.

pub mod array;
pub mod bytes;
pub mod logical;
pub mod primitives;
pub mod reference;
pub mod string;
pub mod structure;
pub mod tuple;
pub mod union;

#[cfg(test)]
pub(crate) mod testing {
    use crate::{Cursor, FieldType, Sink};
    use std::fmt::Debug;

    /// Checks that `field` reads `value` from `encoded` and writes `value` as `encoded`.
    ///
    /// Reads start in the middle of a padded buffer and writes land between other chunks,
    /// so a field that miscounts its bytes is caught either way.
    pub fn check<F>(field: &F, value: &F::Value, encoded: &[u8])
    where
        F: FieldType,
        F::Value: PartialEq + Debug,
    {
        let mut padded = vec![1, 2, 3];
        padded.extend_from_slice(encoded);
        padded.extend_from_slice(&[4, 5, 6]);

        let mut cursor = Cursor::new(&padded);
        cursor.set_position(3).unwrap();
        assert_eq!(&field.read(&mut cursor).unwrap(), value);
        assert_eq!(cursor.position(), 3 + encoded.len());
        field.validate(value).unwrap();

        let mut sink = Sink::new();
        sink.push(vec![1u8, 2, 3]);
        field.write(&mut sink, value).unwrap();
        sink.push(vec![4u8, 5, 6]);
        assert_eq!(sink.len(), 6 + encoded.len());
        assert_eq!(sink.finish().as_ref(), padded.as_slice());
    }
}
