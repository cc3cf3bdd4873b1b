#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use commonware_layout::{
    types::{
        array::{fixed_length_array, length_prefixed_array},
        bytes::{fixed_length_bytes, length_prefixed_bytes},
        logical::{optional, Bool},
        primitives::{
            Float32BE, Float64LE, Int16BE, Int32LE, Int64BE, Uint16LE, Uint32BE, Uint64LE, Uint8,
        },
        reference::length_reference,
        string::{length_prefixed_string, NullTerminatedString},
        structure::Struct,
        union::Union,
    },
    FieldType, FieldTypeExt, Record, Value,
};
use libfuzzer_sys::fuzz_target;
use std::fmt::Debug;

fn roundtrip<F>(field: &F, value: &F::Value)
where
    F: FieldType,
    F::Value: PartialEq + Debug,
{
    let encoded = field.encode(value).expect("Failed to encode a valid value!");
    if let Some(size) = field.fixed_size() {
        assert_eq!(size, encoded.len());
    }
    let decoded = field
        .decode(&encoded)
        .expect("Failed to decode a successfully encoded input!");
    assert_eq!(value, &decoded);
}

fn roundtrip_float(value: f64) {
    // Compare bit patterns so NaN payloads are checked too
    let encoded = Float64LE.encode(&value).unwrap();
    let decoded = Float64LE.decode(&encoded).unwrap();
    assert_eq!(value.to_bits(), decoded.to_bits());

    let narrow = value as f32;
    let encoded = Float32BE.encode(&narrow).unwrap();
    assert_eq!(narrow.to_bits(), Float32BE.decode(&encoded).unwrap().to_bits());
}

fn roundtrip_text(text: String) {
    roundtrip(&length_prefixed_string(Uint32BE), &text);
    if !text.contains('\0') {
        roundtrip(&NullTerminatedString, &text);
    } else {
        assert!(NullTerminatedString.encode(&text).is_err());
    }
}

fn roundtrip_record(id: u64, name: String, flags: Vec<bool>) {
    let field = Struct::new()
        .field("id", Uint64LE)
        .field("name", length_prefixed_string(Uint32BE))
        .field("flags", length_prefixed_array(Uint32BE, Bool));
    let mut record = Record::new();
    record.insert("id".into(), Value::Int(id.into()));
    record.insert("name".into(), name.into());
    record.insert(
        "flags".into(),
        Value::List(flags.into_iter().map(Value::Bool).collect()),
    );
    roundtrip(&field, &record);
}

fn roundtrip_union(value: Result<i32, Vec<u8>>) {
    let field = Union::new(Uint8)
        .option(Int32LE, |v| matches!(v, Value::Int(_)))
        .option(length_prefixed_bytes(Uint32BE), |v| {
            matches!(v, Value::Bytes(_))
        });
    let value = match value {
        Ok(n) => Value::Int(n.into()),
        Err(bytes) => Value::Bytes(Bytes::from(bytes)),
    };
    roundtrip(&field, &value);
}

fn roundtrip_reference(payload: Vec<u8>) {
    let (len, target) = length_reference(Uint32BE);
    let field = (len, target.wrap(fixed_length_bytes(payload.len())));
    let encoded = field
        .encode(&(0, Bytes::from(payload.clone())))
        .expect("Failed to encode a valid value!");
    let (decoded_len, decoded) = field.decode(&encoded).unwrap();
    assert_eq!(decoded_len as usize, payload.len());
    assert_eq!(decoded.as_ref(), payload.as_slice());
}

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    // Primitives
    U8(u8),
    U16(u16),
    I16(i16),
    I64(i64),
    Float(f64),

    // Bytes and text
    Bytes(Vec<u8>),
    Text(String),

    // Collections
    Optional(Option<u32>),
    Array([i16; 4]),
    Vec(Vec<Option<u8>>),

    // Heterogeneous
    Record(u64, String, Vec<bool>),
    Union(Result<i32, Vec<u8>>),
    Reference(Vec<u8>),
}

fn fuzz(input: FuzzInput) {
    match input {
        // Primitives
        FuzzInput::U8(v) => roundtrip(&Uint8, &v),
        FuzzInput::U16(v) => roundtrip(&Uint16LE, &v),
        FuzzInput::I16(v) => roundtrip(&Int16BE, &v),
        FuzzInput::I64(v) => roundtrip(&Int64BE, &v),
        FuzzInput::Float(v) => roundtrip_float(v),
        // Bytes and text
        FuzzInput::Bytes(v) => {
            let bytes = Bytes::from(v);
            roundtrip(&length_prefixed_bytes(Uint32BE), &bytes);
            roundtrip(&fixed_length_bytes(bytes.len()), &bytes);
        }
        FuzzInput::Text(v) => roundtrip_text(v),
        // Collections
        FuzzInput::Optional(v) => roundtrip(&optional(Uint32BE), &v),
        FuzzInput::Array(v) => roundtrip(&fixed_length_array(Int16BE, 4), &v.to_vec()),
        FuzzInput::Vec(v) => roundtrip(&length_prefixed_array(Uint32BE, optional(Uint8)), &v),
        // Heterogeneous
        FuzzInput::Record(id, name, flags) => roundtrip_record(id, name, flags),
        FuzzInput::Union(v) => roundtrip_union(v),
        FuzzInput::Reference(v) => roundtrip_reference(v),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
