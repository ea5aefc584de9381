//! Error types for value construction and JSON encoding/decoding.

use thiserror::Error;

use crate::value::{Path, Type};

/// A value could not be encoded as typed JSON.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{}value has marks, so it cannot be serialized as JSON", .path.prefix())]
    Marked { path: Path },

    #[error("{}value is not known", .path.prefix())]
    Unknown { path: Path },

    #[error("{}cannot serialize {type_name:?} capsule value as JSON", .path.prefix())]
    Capsule { path: Path, type_name: String },

    #[error("{}number is too large or too small to write without an exponent", .path.prefix())]
    NumberOutOfRange { path: Path },

    #[error("type not allowed: capsule {type_name:?}")]
    CapsuleType { type_name: String },

    #[error("{}value of type {found} does not conform to {expected}", .path.prefix())]
    TypeMismatch {
        path: Path,
        expected: Type,
        found: Type,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Typed JSON could not be decoded back into a type or value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("invalid type signature: {reason}")]
    MalformedType { reason: String },

    #[error("{}{expected} is required", .path.prefix())]
    Expected { path: Path, expected: String },

    #[error("{}invalid number {text:?}", .path.prefix())]
    InvalidNumber { path: Path, text: String },

    #[error("{}missing required attribute {name:?}", .path.prefix())]
    MissingAttribute { path: Path, name: String },

    #[error("{}unsupported attribute {name:?}", .path.prefix())]
    UnsupportedAttribute { path: Path, name: String },

    #[error("{}tuple requires {expected} elements, found {found}", .path.prefix())]
    TupleLength {
        path: Path,
        expected: usize,
        found: usize,
    },

    #[error("{}cannot decode {type_name:?} capsule value from JSON", .path.prefix())]
    Capsule { path: Path, type_name: String },

    #[error("{}{source}", .path.prefix())]
    Construct { path: Path, source: ValueError },
}

/// A collection was built from elements that do not match its element type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("element {index} has type {found}, expected {expected}")]
    ElementType {
        index: usize,
        expected: Type,
        found: Type,
    },

    #[error("element {key:?} has type {found}, expected {expected}")]
    MapElementType {
        key: String,
        expected: Type,
        found: Type,
    },
}
