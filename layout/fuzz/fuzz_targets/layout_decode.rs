#![no_main]

use arbitrary::Arbitrary;
use commonware_layout::{
    types::{
        array::{fixed_length_array, length_prefixed_array},
        bytes::{fixed_length_bytes, length_prefixed_bytes},
        logical::{number_enum, optional, Bool},
        primitives::{Float64BE, Int32LE, Uint16BE, Uint32LE, Uint64BE, Uint8},
        string::{fixed_length_string, length_prefixed_string, NullTerminatedString},
        structure::Struct,
        union::Union,
    },
    Cursor, Error, FieldType, FieldTypeExt, Value,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Schema {
    Primitives,
    Strings,
    Arrays,
    Record,
    Union,
    ZeroWidth,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput<'a> {
    schema: Schema,
    data: &'a [u8],
}

// Decoding untrusted input must fail cleanly. Whatever decodes must re-encode to the
// same width, and the re-encoding must be stable.
fn check<F>(field: &F, data: &[u8])
where
    F: FieldType,
{
    match field.decode(data) {
        Ok(value) => {
            // Lenient flag bytes are canonicalized, so the bytes themselves may differ
            let encoded = field.encode(&value).expect("Failed to re-encode a decoded value!");
            assert_eq!(encoded.len(), data.len());
            let decoded = field
                .decode(&encoded)
                .expect("Failed to decode a successfully encoded input!");
            assert_eq!(field.encode(&decoded).unwrap(), encoded);
        }
        Err(Error::EndOfBuffer { needed, remaining }) => assert!(needed > remaining),
        Err(_) => {}
    }

    // Reads never move the cursor past the end of the buffer
    let mut cursor = Cursor::new(data);
    let _ = field.read(&mut cursor);
    assert!(cursor.position() <= data.len());
}

fn fuzz(input: FuzzInput) {
    let data = input.data;
    match input.schema {
        Schema::Primitives => {
            check(&(Uint8, Uint16BE, Int32LE, Uint64BE), data);
            check(&number_enum(Uint32LE, [("A", 1), ("B", 2)]), data);
        }
        Schema::Strings => {
            check(&fixed_length_string(4), data);
            check(&length_prefixed_string(Uint16BE).with_range(..=1024), data);
            check(&NullTerminatedString, data);
        }
        Schema::Arrays => {
            check(&fixed_length_array(optional(Uint8), 3), data);
            check(&length_prefixed_array(Uint32LE, Bool), data);
            check(
                &length_prefixed_array(Uint16BE, length_prefixed_bytes(Uint8)),
                data,
            );
        }
        Schema::Record => {
            let field = Struct::new()
                .field("id", Uint64BE)
                .field("name", NullTerminatedString)
                .field("tags", length_prefixed_array(Uint8, length_prefixed_string(Uint8)));
            check(&field, data);
        }
        Schema::Union => {
            let field = Union::new(Uint8)
                .option(Float64BE, |v| matches!(v, Value::Float(_)))
                .option(Uint16BE, |v| matches!(v, Value::Int(_)));
            check(&field, data);
        }
        Schema::ZeroWidth => {
            check(&length_prefixed_array(Uint64BE, fixed_length_bytes(0)), data);
            check(&length_prefixed_array(Uint32LE, Struct::new()), data);
            check(
                &length_prefixed_array(Uint16BE, fixed_length_string(0)).with_range(..=1024),
                data,
            );
            check(
                &length_prefixed_array(Uint8, fixed_length_array(Uint8, 0)),
                data,
            );
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
