//! Scalar value casting.
use bytes::Bytes;

use crate::{
    bytea::unescape_bytea,
    context::DecodeContext,
    encoding::{Encoding, TextError},
    error::{CastError, DecodeError},
    pg_type::{Oid, PgKind, TypeTag},
    value::Value,
};

/// Staging capacity for numeric text.
///
/// Room for any 64-bit integer and for the numeric/monetary text the
/// server emits in practice. Longer input is an explicit
/// [`CastError::NumericTooLong`], never a truncation.
pub const NUMERIC_BUF: usize = 64;

/// Cast a scalar value tagged by [`TypeTag::classify`].
///
/// The tag must not carry the array marker; arrays go through
/// [`cast_array`][crate::cast_array].
pub fn cast_scalar(s: &[u8], tag: TypeTag, ctx: &DecodeContext) -> Result<Value, DecodeError> {
    debug_assert!(!tag.array, "array tag passed to cast_scalar");
    match tag.kind {
        kind if kind.is_text() => cast_text(s, kind, ctx),
        kind => cast_simple(s, kind, ctx),
    }
}

/// Cast a value of a type the engine does not classify, decoding as
/// session text and applying the configured external cast hook.
pub fn cast_other(s: &[u8], oid: Oid, ctx: &DecodeContext) -> Result<Value, DecodeError> {
    let value = decode_text(s, ctx);
    match &ctx.cast_hook {
        Some(hook) => hook.apply(value, oid),
        None => Ok(value),
    }
}

/// Cast a numeric or boolean value.
pub(crate) fn cast_simple(
    s: &[u8],
    kind: PgKind,
    ctx: &DecodeContext,
) -> Result<Value, DecodeError> {
    match kind {
        PgKind::Int => {
            let mut buf = [0u8; NUMERIC_BUF];
            let staged = stage(s, &mut buf)?;
            match staged.parse() {
                Ok(int) => Ok(Value::Int(int)),
                Err(e) => Err(CastError::Int(e).into()),
            }
        }
        PgKind::Long => {
            let mut buf = [0u8; NUMERIC_BUF];
            let staged = stage(s, &mut buf)?;
            match staged.parse() {
                Ok(int) => Ok(Value::BigInt(int)),
                Err(e) => Err(CastError::Int(e).into()),
            }
        }
        PgKind::Float => cast_float(ascii(s)?),
        PgKind::Decimal => match &ctx.decimal {
            Some(decimal) => decimal(ascii(s)?),
            None => cast_float(ascii(s)?),
        },
        PgKind::Money => {
            // classify only yields Money when a decimal point is set
            let Some(point) = ctx.decimal_point else {
                return cast_text(s, PgKind::Text, ctx);
            };
            let mut buf = [0u8; NUMERIC_BUF];
            let mut at = 0;
            for &b in s {
                let b = match b {
                    b'0'..=b'9' => b,
                    _ if point.is_ascii() && b == point as u8 => b'.',
                    b'(' | b'-' => b'-',
                    _ => continue,
                };
                if at == NUMERIC_BUF {
                    return Err(CastError::NumericTooLong(s.len()).into());
                }
                buf[at] = b;
                at += 1;
            }
            let cleaned = ascii(&buf[..at])?;
            match &ctx.decimal {
                Some(decimal) => decimal(cleaned),
                None => cast_float(cleaned),
            }
        }
        PgKind::Bool => {
            let truthy = s.first() == Some(&b't');
            match ctx.bool_as_text {
                true => Ok(Value::Text(String::from(if truthy { "t" } else { "f" }))),
                false => Ok(Value::Bool(truthy)),
            }
        }
        // text based kinds never reach this path
        PgKind::Text | PgKind::Bytea | PgKind::Json | PgKind::Other => cast_text(s, kind, ctx),
    }
}

/// Cast a text based value.
pub(crate) fn cast_text(
    s: &[u8],
    kind: PgKind,
    ctx: &DecodeContext,
) -> Result<Value, DecodeError> {
    match kind {
        // only reached when `bytea_escaped` is off
        PgKind::Bytea => Ok(Value::Bytes(unescape_bytea(s)?)),
        PgKind::Json => {
            // decoding is mandatory here, unlike the plain text path
            let text = ctx.encoding.decode(s).map_err(CastError::Text)?;
            #[cfg(feature = "json")]
            if let Some(json_decode) = &ctx.json_decode {
                return json_decode(&text);
            }
            Ok(Value::Text(text))
        }
        _ => Ok(decode_text(s, ctx)),
    }
}

/// Decode session text, degrading to the raw bytes when the input is not
/// valid in the session encoding.
pub(crate) fn decode_text(s: &[u8], ctx: &DecodeContext) -> Value {
    match ctx.encoding.decode(s) {
        Ok(text) => Value::Text(text),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::debug!("keeping raw bytes, {_e}");
            Value::Bytes(Bytes::copy_from_slice(s))
        }
    }
}

/// Text-or-bytes decode for externally cast elements.
///
/// Under `SQL_ASCII` the raw bytes are handed over as-is, no decoding is
/// necessary or possible.
pub(crate) fn decode_external(s: &[u8], ctx: &DecodeContext) -> Value {
    match ctx.encoding {
        Encoding::SqlAscii => Value::Bytes(Bytes::copy_from_slice(s)),
        _ => decode_text(s, ctx),
    }
}

fn cast_float(text: &str) -> Result<Value, DecodeError> {
    match text.parse() {
        Ok(float) => Ok(Value::Float(float)),
        Err(e) => Err(CastError::Float(e).into()),
    }
}

/// Copy a sized numeric slice into the staging buffer.
fn stage<'a>(s: &[u8], buf: &'a mut [u8; NUMERIC_BUF]) -> Result<&'a str, CastError> {
    if s.len() >= NUMERIC_BUF {
        return Err(CastError::NumericTooLong(s.len()));
    }
    buf[..s.len()].copy_from_slice(s);
    ascii(&buf[..s.len()])
}

/// Numeric text is always 7-bit.
fn ascii(s: &[u8]) -> Result<&str, CastError> {
    std::str::from_utf8(s).map_err(|e| {
        CastError::Text(TextError {
            encoding: Encoding::SqlAscii,
            offset: e.valid_up_to(),
        })
    })
}
