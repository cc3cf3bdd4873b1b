//! Tagged unions: an index followed by the encoding of the selected option.

use crate::{
    types::primitives::Length, BoxedField, Cursor, Dynamic, Error, FieldType, FieldTypeExt, Sink,
    Value,
};
use tracing::debug;

type Predicate = Box<dyn Fn(&Value) -> bool>;

/// A choice between several field types, discriminated by an index field.
///
/// On write, the first option whose predicate accepts the value is selected and its
/// position is written with the index field. Validation checks the value against that
/// same option only. On read, the index selects the option to decode.
pub struct Union<I> {
    index: I,
    options: Vec<(BoxedField, Predicate)>,
}

impl<I> Union<I>
where
    I: FieldType,
    I::Value: Length,
{
    /// Creates a union with no options, discriminated by `index`.
    pub fn new(index: I) -> Self {
        Self {
            index,
            options: Vec::new(),
        }
    }

    /// Appends an option selected for values accepted by `predicate`.
    pub fn option<F, P>(mut self, field: F, predicate: P) -> Self
    where
        F: FieldType + 'static,
        F::Value: Dynamic,
        P: Fn(&Value) -> bool + 'static,
    {
        self.options.push((field.boxed(), Box::new(predicate)));
        self
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the union has no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn select(&self, value: &Value) -> Result<(usize, &BoxedField), Error> {
        let Some((index, (field, _))) = self
            .options
            .iter()
            .enumerate()
            .find(|(_, (_, predicate))| predicate(value))
        else {
            debug!(
                kind = value.kind(),
                options = self.options.len(),
                "no union option matched"
            );
            return Err(Error::NoMatchingOption);
        };
        Ok((index, field))
    }
}

impl<I> FieldType for Union<I>
where
    I: FieldType,
    I::Value: Length,
{
    type Value = Value;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Value, Error> {
        let raw = self.index.read(cursor)?;
        let out_of_range = || Error::IndexOutOfRange {
            index: raw.into(),
            options: self.options.len(),
        };
        let index = raw.to_len().map_err(|_| out_of_range())?;
        let Some((field, _)) = self.options.get(index) else {
            return Err(out_of_range());
        };
        field.read(cursor)
    }

    fn write(&self, sink: &mut Sink, value: &Value) -> Result<(), Error> {
        let (index, field) = self.select(value)?;
        self.index
            .write(sink, &<I::Value as Length>::from_len(index)?)?;
        field.write(sink, value)
    }

    fn validate(&self, value: &Value) -> Result<(), Error> {
        let (index, field) = self.select(value)?;
        self.index
            .validate(&<I::Value as Length>::from_len(index)?)?;
        field.validate(value)
    }

    fn fixed_size(&self) -> Option<usize> {
        let index = self.index.fixed_size()?;
        let mut sizes = self.options.iter().map(|(field, _)| field.fixed_size());
        let first = sizes.next()??;
        sizes
            .all(|size| size == Some(first))
            .then_some(index + first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        logical::{literal, Bool},
        primitives::{Int8, Uint16BE, Uint16LE, Uint64LE, Uint8},
        string::{fixed_length_string, NullTerminatedString},
        structure::Struct,
        testing::check,
    };

    fn int_or_string() -> Union<Uint8> {
        Union::new(Uint8)
            .option(Uint16LE, |v| matches!(v, Value::Int(_)))
            .option(NullTerminatedString, |v| matches!(v, Value::Str(_)))
    }

    #[test]
    fn test_union() {
        let field = int_or_string();
        check(&field, &Value::Int(258), &[0, 2, 1]);
        check(&field, &Value::from("ab"), &[1, 97, 98, 0]);
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_union_first_match_wins() {
        let field = Union::new(Uint16BE)
            .option(Uint8, |v| matches!(v, Value::Int(n) if *n < 256))
            .option(Uint16LE, |v| matches!(v, Value::Int(_)));
        check(&field, &Value::Int(7), &[0, 0, 7]);
        check(&field, &Value::Int(300), &[0, 1, 44, 1]);
    }

    #[test]
    fn test_union_index_out_of_range() {
        let field = int_or_string();
        let mut cursor = Cursor::new(&[2, 0, 0]);
        assert_eq!(
            field.read(&mut cursor),
            Err(Error::IndexOutOfRange {
                index: 2,
                options: 2
            })
        );
    }

    #[test]
    fn test_union_no_matching_option() {
        let field = int_or_string();
        let mut sink = Sink::new();
        assert_eq!(
            field.write(&mut sink, &Value::Bool(true)),
            Err(Error::NoMatchingOption)
        );
        assert!(sink.is_empty());
        assert_eq!(field.encode(&Value::Bool(true)), Err(Error::NoMatchingOption));
    }

    #[test]
    fn test_union_validate() {
        let field = Union::new(Uint8)
            .option(literal(Uint8, 1), |v| matches!(v, Value::Int(_)))
            .option(Bool, |v| matches!(v, Value::Bool(_)));
        assert!(field.validate(&Value::Int(1)).is_ok());
        assert!(field.validate(&Value::Bool(false)).is_ok());
        assert!(matches!(
            field.validate(&Value::Int(2)),
            Err(Error::Invalid("literal", _))
        ));
        assert!(matches!(
            field.decode(&[0, 2]),
            Err(Error::Invalid("literal", _))
        ));
        assert_eq!(
            field.validate(&Value::from("x")),
            Err(Error::NoMatchingOption)
        );
    }

    #[test]
    fn test_union_validate_follows_selection() {
        // Both predicates accept any integer, so the first option is always selected
        let field = Union::new(Uint8)
            .option(Uint8, |v| matches!(v, Value::Int(_)))
            .option(Uint64LE, |v| matches!(v, Value::Int(_)));
        assert!(field.validate(&Value::Int(7)).is_ok());
        assert!(matches!(
            field.validate(&Value::Int(300)),
            Err(Error::Invalid("u8", _))
        ));
        assert_eq!(
            field.validate(&Value::Int(300)),
            field.encode(&Value::Int(300)).map(|_| ())
        );

        // The later option still reads, but decoding rejects what could not be written back
        let encoded = [1, 44, 1, 0, 0, 0, 0, 0, 0];
        let mut cursor = Cursor::new(&encoded);
        assert_eq!(field.read(&mut cursor), Ok(Value::Int(300)));
        assert!(matches!(
            field.decode(&encoded),
            Err(Error::Invalid("u8", _))
        ));
    }

    #[test]
    fn test_union_negative_index() {
        let field = Union::new(Int8)
            .option(Uint8, |v| matches!(v, Value::Int(_)))
            .option(Bool, |v| matches!(v, Value::Bool(_)));
        check(&field, &Value::Bool(true), &[1, 1]);
        assert_eq!(
            field.decode(&[0xff, 0]),
            Err(Error::IndexOutOfRange {
                index: -1,
                options: 2
            })
        );
    }

    fn tagged(tag: &'static str) -> impl Fn(&Value) -> bool {
        move |v| matches!(v, Value::Record(r) if r.get("kind") == Some(&Value::from(tag)))
    }

    #[test]
    fn test_union_of_structs() {
        let field = Union::new(Uint8)
            .option(
                Struct::new()
                    .field("kind", literal(fixed_length_string(1), "p".to_string()))
                    .field("x", Uint8),
                tagged("p"),
            )
            .option(
                Struct::new()
                    .field("kind", literal(fixed_length_string(1), "q".to_string()))
                    .field("flag", Bool),
                tagged("q"),
            );
        let value = Value::Record(
            [
                ("kind".to_string(), Value::from("q")),
                ("flag".to_string(), Value::Bool(true)),
            ]
            .into_iter()
            .collect(),
        );
        check(&field, &value, &[1, 113, 1]);
    }

    #[test]
    fn test_union_fixed_size() {
        let same = Union::new(Uint8)
            .option(Uint16LE, |_| true)
            .option(Uint16BE, |_| true);
        assert_eq!(same.fixed_size(), Some(3));
        assert_eq!(int_or_string().fixed_size(), None);
        assert_eq!(Union::new(Uint8).fixed_size(), None);
    }
}
