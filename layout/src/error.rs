//! Error types for layout operations

use std::str::Utf8Error;
use thiserror::Error;

/// Error type for reading, writing, and validating field types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    EndOfBuffer { needed: usize, remaining: usize },
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    #[error("unexpected type: expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("index out of range: {index} >= {options}")]
    IndexOutOfRange { index: i128, options: usize },
    #[error("invalid value in {0}: {1}")]
    Invalid(&'static str, String), // context, message
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("no union option matched the value")]
    NoMatchingOption,
    #[error("reference target written without a preceding reference")]
    UnresolvedReference,
    #[error("patched value width changed: {expected} != {found}")]
    PatchWidth { expected: usize, found: usize },
}
