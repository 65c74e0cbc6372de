//! Decoder configuration.
use std::{fmt, sync::Arc};

use crate::{
    encoding::Encoding,
    error::{CastError, DecodeError},
    pg_type::Oid,
    value::Value,
};

/// Caster for values the engine does not cast internally.
///
/// `oid` is the server type identifier of the value, `0` when the type is
/// unspecified (array elements and record columns cast externally).
///
/// An error from the cast aborts the container being decoded and
/// propagates unchanged.
pub trait ExternalCast {
    /// Cast the decoded text (or the raw bytes, when the session encoding
    /// could not decode it) into the final value.
    fn apply(&self, value: Value, oid: Oid) -> Result<Value, DecodeError>;
}

impl<F> ExternalCast for F
where
    F: Fn(Value, Oid) -> Result<Value, DecodeError>,
{
    fn apply(&self, value: Value, oid: Oid) -> Result<Value, DecodeError> {
        self(value, oid)
    }
}

type DecimalFn = Arc<dyn Fn(&str) -> Result<Value, DecodeError> + Send + Sync>;
#[cfg(feature = "json")]
type JsonFn = Arc<dyn Fn(&str) -> Result<Value, DecodeError> + Send + Sync>;
type CastHook = Arc<dyn ExternalCast + Send + Sync>;

/// Casting policy for one decode.
///
/// A single decode observes one context; share a context across threads
/// freely, but serialize reconfiguration against running decodes as with
/// any `&mut`.
#[derive(Clone)]
pub struct DecodeContext {
    /// Session text encoding.
    pub encoding: Encoding,
    /// Surface arrays as their unparsed literal text.
    pub array_as_text: bool,
    /// Surface `bytea` values still in their escaped text form.
    pub bytea_escaped: bool,
    /// Surface booleans as the characters `t`/`f`.
    pub bool_as_text: bool,
    /// Decimal mark used in monetary text; `None` leaves money as text.
    pub decimal_point: Option<char>,
    pub(crate) decimal: Option<DecimalFn>,
    #[cfg(feature = "json")]
    pub(crate) json_decode: Option<JsonFn>,
    pub(crate) cast_hook: Option<CastHook>,
}

impl DecodeContext {
    pub fn new() -> DecodeContext {
        DecodeContext::default()
    }

    /// Replace the decimal constructor.
    pub fn decimal<F>(mut self, decimal: F) -> DecodeContext
    where
        F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decimal = Some(Arc::new(decimal));
        self
    }

    /// Drop the decimal constructor, decoding `numeric` as float.
    pub fn no_decimal(mut self) -> DecodeContext {
        self.decimal = None;
        self
    }

    /// Replace the JSON decode function.
    #[cfg(feature = "json")]
    pub fn json_decode<F>(mut self, json_decode: F) -> DecodeContext
    where
        F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.json_decode = Some(Arc::new(json_decode));
        self
    }

    /// Drop the JSON decode function, leaving `json`/`jsonb` as text.
    #[cfg(feature = "json")]
    pub fn no_json_decode(mut self) -> DecodeContext {
        self.json_decode = None;
        self
    }

    /// Install the external cast hook applied to unclassified types.
    pub fn cast_hook<C>(mut self, cast: C) -> DecodeContext
    where
        C: ExternalCast + Send + Sync + 'static,
    {
        self.cast_hook = Some(Arc::new(cast));
        self
    }

    pub(crate) fn has_json(&self) -> bool {
        #[cfg(feature = "json")]
        {
            self.json_decode.is_some()
        }
        #[cfg(not(feature = "json"))]
        {
            false
        }
    }
}

impl Default for DecodeContext {
    fn default() -> DecodeContext {
        DecodeContext {
            encoding: Encoding::Utf8,
            array_as_text: false,
            bytea_escaped: false,
            bool_as_text: false,
            decimal_point: Some('.'),
            decimal: Some(Arc::new(cast_decimal)),
            #[cfg(feature = "json")]
            json_decode: Some(Arc::new(cast_json)),
            cast_hook: None,
        }
    }
}

impl fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("encoding", &self.encoding)
            .field("array_as_text", &self.array_as_text)
            .field("bytea_escaped", &self.bytea_escaped)
            .field("bool_as_text", &self.bool_as_text)
            .field("decimal_point", &self.decimal_point)
            .field("decimal", &self.decimal.is_some())
            .field("json_decode", &self.has_json())
            .field("cast_hook", &self.cast_hook.is_some())
            .finish()
    }
}

/// Default decimal constructor.
fn cast_decimal(text: &str) -> Result<Value, DecodeError> {
    match text.parse::<rust_decimal::Decimal>() {
        Ok(decimal) => Ok(Value::Decimal(decimal)),
        Err(e) => Err(CastError::Decimal(e).into()),
    }
}

/// Default JSON decode function.
#[cfg(feature = "json")]
fn cast_json(text: &str) -> Result<Value, DecodeError> {
    match serde_json::from_str(text) {
        Ok(json) => Ok(Value::Json(json)),
        Err(e) => Err(CastError::Json(e).into()),
    }
}
