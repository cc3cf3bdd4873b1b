//! Named fields read and written in declaration order.

use crate::{BoxedField, Cursor, Dynamic, Error, FieldType, FieldTypeExt, Record, Sink, Value};

/// An ordered list of named fields whose value is a [`Record`].
///
/// Fields are encoded back to back in the order they were added. Record entries with no
/// matching field are ignored on write.
#[derive(Default)]
pub struct Struct {
    entries: Vec<(String, BoxedField)>,
}

impl Struct {
    /// Creates a struct with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field named `name`.
    pub fn field<F>(mut self, name: impl Into<String>, field: F) -> Self
    where
        F: FieldType + 'static,
        F::Value: Dynamic,
    {
        self.entries.push((name.into(), field.boxed()));
        self
    }

    /// Returns the field names, in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    fn lookup<'a>(record: &'a Record, name: &str) -> Result<&'a Value, Error> {
        record
            .get(name)
            .ok_or_else(|| Error::MissingField(name.to_owned()))
    }
}

impl FieldType for Struct {
    type Value = Record;

    fn read(&self, cursor: &mut Cursor<'_>) -> Result<Record, Error> {
        let mut record = Record::new();
        for (name, field) in &self.entries {
            record.insert(name.clone(), field.read(cursor)?);
        }
        Ok(record)
    }

    fn write(&self, sink: &mut Sink, value: &Record) -> Result<(), Error> {
        for (name, field) in &self.entries {
            field.write(sink, Self::lookup(value, name)?)?;
        }
        Ok(())
    }

    fn validate(&self, value: &Record) -> Result<(), Error> {
        for (name, field) in &self.entries {
            field.validate(Self::lookup(value, name)?)?;
        }
        Ok(())
    }

    fn fixed_size(&self) -> Option<usize> {
        self.entries
            .iter()
            .try_fold(0, |total, (_, field)| Some(total + field.fixed_size()?))
    }
}
