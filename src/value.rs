//! Decoded result values.
use bytes::Bytes;
use rust_decimal::Decimal;
use std::{collections::HashMap, fmt};

use crate::ext::FmtExt;

/// A decoded Postgres value.
#[derive(Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Machine word integer: `int2`, `int4`, `oid`, `xid`, `cid`.
    Int(i64),
    /// `int8` and anything wider than a machine word.
    BigInt(i128),
    Float(f64),
    Decimal(Decimal),
    /// Decoded session text.
    Text(String),
    /// Raw binary, either unescaped `bytea` or text the session encoding
    /// could not decode.
    Bytes(Bytes),
    #[cfg(feature = "json")]
    Json(serde_json::Value),
    Array(Vec<Value>),
    /// Fixed-length composite value.
    Record(Vec<Value>),
    /// Key/value map; values are plain text or `NULL`.
    Hstore(HashMap<String, Option<String>>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The raw binary payload of a [`Value::Bytes`].
    pub fn as_slice(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The elements of a [`Value::Array`] or [`Value::Record`].
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) | Value::Record(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    /// Serialize the plain value, without a variant tag.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::BigInt(i) => serializer.serialize_i128(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Decimal(d) => serde::Serialize::serialize(d, serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            #[cfg(feature = "json")]
            Value::Json(v) => v.serialize(serializer),
            Value::Array(v) | Value::Record(v) => v.serialize(serializer),
            Value::Hstore(m) => m.serialize(serializer),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => fmt::Debug::fmt(b, f),
            Value::Int(i) => fmt::Debug::fmt(i, f),
            Value::BigInt(i) => fmt::Debug::fmt(i, f),
            Value::Float(v) => fmt::Debug::fmt(v, f),
            Value::Decimal(d) => fmt::Display::fmt(d, f),
            Value::Text(s) => fmt::Debug::fmt(s, f),
            Value::Bytes(b) => fmt::Debug::fmt(&b[..].lossy(), f),
            #[cfg(feature = "json")]
            Value::Json(v) => fmt::Debug::fmt(v, f),
            Value::Array(v) => f.debug_list().entries(v).finish(),
            Value::Record(v) => {
                let mut tup = f.debug_tuple("");
                for e in v {
                    tup.field(e);
                }
                tup.finish()
            }
            Value::Hstore(m) => f.debug_map().entries(m).finish(),
        }
    }
}
