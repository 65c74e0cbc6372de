//! Hstore literal parsing.
//!
//! Parses the `key => value` map format of the hstore extension type.
//! Keys and values are plain text; decoding them in the session encoding
//! is mandatory here, there is no raw-bytes fallback for map keys.
use std::collections::HashMap;

use crate::{
    common::{is_null_literal, span, unescape},
    context::DecodeContext,
    error::{CastError, DecodeError, ParseError},
    value::Value,
};

/// Parse an hstore literal.
///
/// A duplicated key keeps the value of its last entry.
///
/// ```
/// use pgtext::{DecodeContext, Value};
///
/// let ctx = DecodeContext::default();
/// let parsed = pgtext::cast_hstore(br#"a=>1, b=>NULL"#, &ctx)?;
///
/// let Value::Hstore(map) = parsed else { unreachable!() };
/// assert_eq!(map["a"].as_deref(), Some("1"));
/// assert_eq!(map["b"], None);
/// # Ok::<(), pgtext::DecodeError>(())
/// ```
pub fn cast_hstore(s: &[u8], ctx: &DecodeContext) -> Result<Value, DecodeError> {
    span!("cast_hstore");
    let end = s.len();
    let mut p = 0;
    let mut map = HashMap::new();

    while p < end {
        while p < end && s[p] == b' ' {
            p += 1;
        }
        if p == end {
            break;
        }

        // key
        let quoted = s[p] == b'"';
        let key = if quoted {
            p += 1;
            let (raw, escaped) = scan_quoted(s, &mut p)?;
            p += 1;
            decode_token(raw, escaped, ctx)?
        } else {
            let start = p;
            let escaped = scan_unquoted(s, &mut p, b'=');
            if p == start {
                return Err(ParseError::MissingKey.into());
            }
            decode_token(&s[start..p], escaped, ctx)?
        };

        while p < end && s[p] == b' ' {
            p += 1;
        }
        if p == end || s[p] != b'=' {
            return Err(ParseError::InvalidAfterKey.into());
        }
        p += 1;
        if p == end || s[p] != b'>' {
            return Err(ParseError::InvalidAfterKey.into());
        }
        p += 1;
        while p < end && s[p] == b' ' {
            p += 1;
        }

        // value
        if p == end {
            return Err(ParseError::MissingValue.into());
        }
        let value = if s[p] == b'"' {
            p += 1;
            let (raw, escaped) = scan_quoted(s, &mut p)?;
            p += 1;
            Some(decode_token(raw, escaped, ctx)?)
        } else {
            let start = p;
            let escaped = scan_unquoted(s, &mut p, b',');
            if p == start {
                return Err(ParseError::MissingValue.into());
            }
            let raw = &s[start..p];
            match is_null_literal(raw) {
                true => None,
                false => Some(decode_token(raw, escaped, ctx)?),
            }
        };

        while p < end && s[p] == b' ' {
            p += 1;
        }
        if p != end {
            if s[p] != b',' {
                return Err(ParseError::InvalidAfterValue.into());
            }
            p += 1;
            while p < end && s[p] == b' ' {
                p += 1;
            }
            if p == end {
                return Err(ParseError::MissingEntry.into());
            }
        }
        map.insert(key, value);
    }

    Ok(Value::Hstore(map))
}

/// Scan a quoted token up to its closing quote, `p` on the opening quote's
/// successor when called and on the closing quote on return.
fn scan_quoted<'a>(s: &'a [u8], p: &mut usize) -> Result<(&'a [u8], bool), DecodeError> {
    let start = *p;
    let mut escaped = false;
    loop {
        if *p == s.len() {
            return Err(ParseError::UnterminatedQuote.into());
        }
        match s[*p] {
            b'"' => break,
            b'\\' => {
                *p += 1;
                if *p == s.len() {
                    return Err(ParseError::UnterminatedQuote.into());
                }
                escaped = true;
                *p += 1;
            }
            _ => *p += 1,
        }
    }
    Ok((&s[start..*p], escaped))
}

/// Scan an unquoted token ending at `stop` or a space.
fn scan_unquoted(s: &[u8], p: &mut usize, stop: u8) -> bool {
    let mut escaped = false;
    while *p < s.len() {
        match s[*p] {
            b' ' => break,
            b'\\' => {
                *p += 1;
                if *p == s.len() {
                    break;
                }
                escaped = true;
                *p += 1;
            }
            b if b == stop => break,
            _ => *p += 1,
        }
    }
    escaped
}

fn decode_token(raw: &[u8], escaped: bool, ctx: &DecodeContext) -> Result<String, DecodeError> {
    let owned;
    let raw = match escaped {
        true => {
            owned = unescape(raw);
            owned.as_slice()
        }
        false => raw,
    };
    Ok(ctx.encoding.decode(raw).map_err(CastError::Text)?)
}
