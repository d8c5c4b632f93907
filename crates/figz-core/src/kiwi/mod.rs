//! Schema-driven binary message codec ("kiwi" encoding).
//!
//! The container carries its own compiled schema; messages are decoded into a dynamic [`Value`]
//! tree and then mapped onto [`crate::record`] types by [`KiwiRecordDecoder`].

mod buffer;
mod codec;
mod nodes;
mod schema;

pub use buffer::{ByteReader, ByteWriter};
pub use codec::{MAX_DEPTH, decode_message, encode_message};
pub use nodes::KiwiRecordDecoder;
pub use schema::{Definition, DefinitionKind, Field, FieldType, Schema};

use crate::record::RecordDecodeError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KiwiError {
    #[error("unexpected end of buffer at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("unknown definition: {name}")]
    UnknownDefinition { name: String },
    #[error("invalid type index {index} for field {field}")]
    InvalidTypeIndex { field: String, index: i32 },
    #[error("invalid definition kind {kind} for {name}")]
    InvalidKind { name: String, kind: u8 },
    #[error("attempted to parse invalid message: field id {id} not in {definition}")]
    UnknownFieldId { definition: String, id: u32 },
    #[error("invalid value {value} for enum {definition}")]
    InvalidEnumValue { definition: String, value: u32 },
    #[error("value for field {field} does not match type {expected}")]
    TypeMismatch { field: String, expected: String },
    #[error("missing required struct field {definition}.{field}")]
    MissingField { definition: String, field: String },
    #[error("definition {definition} nests deeper than {limit} levels")]
    TooDeep { definition: String, limit: usize },
}

impl From<KiwiError> for RecordDecodeError {
    fn from(value: KiwiError) -> Self {
        RecordDecodeError::new(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KiwiError>;

/// A decoded kiwi value. Structs and messages share the [`Value::Object`] form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int(i32),
    UInt(u32),
    Float(f32),
    String(String),
    Int64(i64),
    UInt64(u64),
    Enum(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Object(map) => map.get(field),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Int(v) => Some(f64::from(v)),
            Self::UInt(v) => Some(f64::from(v)),
            Self::Byte(v) => Some(f64::from(v)),
            Self::Int64(v) => Some(v as f64),
            Self::UInt64(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::UInt(v) => Some(v),
            Self::Byte(v) => Some(u32::from(v)),
            Self::Int(v) => u32::try_from(v).ok(),
            Self::UInt64(v) => u32::try_from(v).ok(),
            Self::Int64(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}
