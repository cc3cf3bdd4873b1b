//! Tuples of field types, read and written positionally.

use crate::{Cursor, Dynamic, Error, FieldType, Sink, Value};
use paste::paste;

// Each element is encoded back to back, with no count or separator.
macro_rules! impl_field_type_for_tuple {
    ($len:literal; $($index:literal),*) => {
        paste! {
            impl<$( [<F $index>]: FieldType ),*> FieldType for ( $( [<F $index>], )* ) {
                type Value = ( $( [<F $index>]::Value, )* );

                #[inline]
                fn read(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value, Error> {
                    Ok(( $( self.$index.read(cursor)?, )* ))
                }

                #[inline]
                fn write(&self, sink: &mut Sink, value: &Self::Value) -> Result<(), Error> {
                    $( self.$index.write(sink, &value.$index)?; )*
                    Ok(())
                }

                fn validate(&self, value: &Self::Value) -> Result<(), Error> {
                    $( self.$index.validate(&value.$index)?; )*
                    Ok(())
                }

                fn fixed_size(&self) -> Option<usize> {
                    Some(0 $( + self.$index.fixed_size()? )*)
                }
            }

            impl<$( [<T $index>]: Dynamic ),*> Dynamic for ( $( [<T $index>], )* ) {
                fn into_value(self) -> Value {
                    Value::List(vec![ $( self.$index.into_value(), )* ])
                }

                fn from_value(value: &Value) -> Result<Self, Error> {
                    match value {
                        Value::List(items) if items.len() == $len => Ok((
                            $( [<T $index>]::from_value(&items[$index])?, )*
                        )),
                        Value::List(items) => Err(Error::Invalid(
                            "tuple",
                            format!("expected {} elements, found {}", $len, items.len()),
                        )),
                        other => Err(other.unexpected("list")),
                    }
                }
            }
        }
    };
}

// Generate implementations for tuple sizes 1 through 12
impl_field_type_for_tuple!(1; 0);
impl_field_type_for_tuple!(2; 0, 1);
impl_field_type_for_tuple!(3; 0, 1, 2);
impl_field_type_for_tuple!(4; 0, 1, 2, 3);
impl_field_type_for_tuple!(5; 0, 1, 2, 3, 4);
impl_field_type_for_tuple!(6; 0, 1, 2, 3, 4, 5);
impl_field_type_for_tuple!(7; 0, 1, 2, 3, 4, 5, 6);
impl_field_type_for_tuple!(8; 0, 1, 2, 3, 4, 5, 6, 7);
impl_field_type_for_tuple!(9; 0, 1, 2, 3, 4, 5, 6, 7, 8);
impl_field_type_for_tuple!(10; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
impl_field_type_for_tuple!(11; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10);
impl_field_type_for_tuple!(12; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11);
