//! Array literal parsing.
//!
//! Parses the brace-delimited, optionally dimension-annotated text format
//! the server emits for array values.
use std::mem;

use crate::{
    common::{is_null_literal, span, unescape, verbose},
    context::{DecodeContext, ExternalCast},
    error::{DecodeError, ParseError},
    pg_type::TypeTag,
    scalar::{cast_simple, cast_text, decode_external},
    value::Value,
};

/// Maximum allowed nesting depth of an array.
///
/// Literals nested deeper fail with
/// [`ParseError::TooDeeplyNested`] before any element is decoded.
pub const MAX_ARRAY_DEPTH: usize = 16;

/// How array leaf elements are cast.
#[derive(Clone, Copy)]
pub enum ElementCast<'a> {
    /// Internal casting with the array's base tag.
    Tag(TypeTag),
    /// Decode as session text, then apply the cast when one is given.
    External(Option<&'a dyn ExternalCast>),
}

/// Parse an array literal.
///
/// `delim` is the element delimiter of the base type, comma when `None`;
/// see [`array_delimiter`][crate::array_delimiter].
///
/// ```
/// use pgtext::{DecodeContext, ElementCast, PgKind, TypeTag, Value};
///
/// let ctx = DecodeContext::default();
/// let elem = ElementCast::Tag(TypeTag::simple(PgKind::Int));
/// let parsed = pgtext::cast_array(b"{1,NULL,3}", &ctx, elem, None)?;
///
/// assert_eq!(parsed, Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]));
/// # Ok::<(), pgtext::DecodeError>(())
/// ```
pub fn cast_array(
    s: &[u8],
    ctx: &DecodeContext,
    elem: ElementCast<'_>,
    delim: Option<u8>,
) -> Result<Value, DecodeError> {
    span!("cast_array");
    let delim = delim.unwrap_or(b',');
    if matches!(delim, b'{' | b'}' | b'\\') {
        return Err(ParseError::InvalidArrayDelimiter.into());
    }

    let end = s.len();
    let mut p = 0;
    while p < end && s[p] == b' ' {
        p += 1;
    }

    // dimension bounds header, `[lo:hi]` once per nesting level, then `=`
    let mut ranges = 0;
    if p < end && s[p] == b'[' {
        let mut valid = false;
        while !valid {
            if p == end || s[p] != b'[' {
                break;
            }
            p += 1;
            while p < end && s[p] == b' ' {
                p += 1;
            }
            if p < end && (s[p] == b'+' || s[p] == b'-') {
                p += 1;
            }
            if p == end || !s[p].is_ascii_digit() {
                break;
            }
            while p < end && s[p].is_ascii_digit() {
                p += 1;
            }
            if p == end || s[p] != b':' {
                break;
            }
            p += 1;
            if p < end && (s[p] == b'+' || s[p] == b'-') {
                p += 1;
            }
            if p == end || !s[p].is_ascii_digit() {
                break;
            }
            while p < end && s[p].is_ascii_digit() {
                p += 1;
            }
            if p == end || s[p] != b']' {
                break;
            }
            p += 1;
            while p < end && s[p] == b' ' {
                p += 1;
            }
            ranges += 1;
            if p < end && s[p] == b'=' {
                p += 1;
                while p < end && s[p] == b' ' {
                    p += 1;
                }
                valid = true;
            }
        }
        if !valid {
            return Err(ParseError::InvalidDimensions.into());
        }
    }

    // nesting depth is the run of leading braces
    let mut depth = 0;
    let mut t = p;
    while t < end && (s[t] == b'{' || s[t] == b' ') {
        if s[t] == b'{' {
            depth += 1;
        }
        t += 1;
    }
    if depth == 0 {
        return Err(ParseError::MissingLeftBrace.into());
    }
    if ranges != 0 && depth != ranges {
        return Err(ParseError::DimensionMismatch.into());
    }
    if depth > MAX_ARRAY_DEPTH {
        return Err(ParseError::TooDeeplyNested.into());
    }
    // levels of parsing below the outermost brace
    let depth = depth - 1;
    verbose!(depth, ranges, "array header");

    let mut result: Vec<Value> = Vec::new();
    let mut stack: Vec<Vec<Value>> = Vec::with_capacity(depth);

    p += 1;
    while p < end && s[p] == b' ' {
        p += 1;
    }

    'parse: while p < end {
        if s[p] == b'}' {
            let Some(parent) = stack.pop() else {
                // outermost array closed
                break 'parse;
            };
            p += 1;
            while p < end && s[p] == b' ' {
                p += 1;
            }
            if p == end {
                break 'parse;
            }
            if s[p] == delim {
                p += 1;
                while p < end && s[p] == b' ' {
                    p += 1;
                }
                if p == end {
                    break 'parse;
                }
                if s[p] != b'{' {
                    return Err(ParseError::SubarrayExpected.into());
                }
            } else if s[p] != b'}' {
                break 'parse;
            }
            let sub = mem::replace(&mut result, parent);
            result.push(Value::Array(sub));
        } else if stack.len() == depth {
            // a leaf element is expected at this level
            if s[p] == b'{' {
                return Err(ParseError::SubarrayNotExpected.into());
            }
            let element = if s[p] == b'"' {
                p += 1;
                let start = p;
                let mut escaped = false;
                loop {
                    if p == end {
                        break 'parse;
                    }
                    match s[p] {
                        b'"' => break,
                        b'\\' => {
                            p += 1;
                            if p == end {
                                break 'parse;
                            }
                            escaped = true;
                            p += 1;
                        }
                        _ => p += 1,
                    }
                }
                let raw = &s[start..p];
                p += 1;
                while p < end && s[p] == b' ' {
                    p += 1;
                }
                if p == end {
                    break 'parse;
                }
                // a quoted element is never the NULL sentinel
                Some(cast_element(raw, escaped, ctx, elem)?)
            } else {
                let start = p;
                let mut escaped = false;
                // unquoted elements can contain blanks inside
                while p < end && s[p] != b'"' && s[p] != b'{' && s[p] != b'}' && s[p] != delim {
                    if s[p] == b'\\' {
                        p += 1;
                        if p == end {
                            break;
                        }
                        escaped = true;
                    }
                    p += 1;
                }
                let mut t = p;
                while t > start && s[t - 1] == b' ' {
                    t -= 1;
                }
                if t == start || p == end {
                    break 'parse;
                }
                let raw = &s[start..t];
                match is_null_literal(raw) {
                    true => None,
                    false => Some(cast_element(raw, escaped, ctx, elem)?),
                }
            };
            result.push(element.unwrap_or(Value::Null));
            if s[p] == delim {
                p += 1;
                while p < end && s[p] == b' ' {
                    p += 1;
                }
                if p == end {
                    break 'parse;
                }
            } else if s[p] != b'}' {
                break 'parse;
            }
        } else {
            // a subarray is expected at this level
            if s[p] != b'{' {
                return Err(ParseError::MissingSubarrayBrace.into());
            }
            p += 1;
            while p < end && s[p] == b' ' {
                p += 1;
            }
            if p == end {
                break 'parse;
            }
            stack.push(mem::take(&mut result));
        }
    }

    if p == end || s[p] != b'}' {
        return Err(ParseError::UnexpectedArrayEnd.into());
    }
    p += 1;
    while p < end && s[p] == b' ' {
        p += 1;
    }
    if p != end {
        return Err(ParseError::TrailingArrayGarbage.into());
    }
    Ok(Value::Array(result))
}

fn cast_element(
    raw: &[u8],
    escaped: bool,
    ctx: &DecodeContext,
    elem: ElementCast<'_>,
) -> Result<Value, DecodeError> {
    let owned;
    let raw = match escaped {
        true => {
            owned = unescape(raw);
            owned.as_slice()
        }
        false => raw,
    };
    match elem {
        ElementCast::Tag(tag) => match tag.kind {
            kind if kind.is_text() => cast_text(raw, kind, ctx),
            kind => cast_simple(raw, kind, ctx),
        },
        ElementCast::External(cast) => {
            let value = decode_external(raw, ctx);
            match cast {
                Some(cast) => cast.apply(value, 0),
                None => Ok(value),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pg_type::PgKind;

    fn parse(s: &[u8]) -> Result<Value, DecodeError> {
        let ctx = DecodeContext::default();
        cast_array(s, &ctx, ElementCast::Tag(TypeTag::simple(PgKind::Int)), None)
    }

    fn ints(v: &[i64]) -> Value {
        Value::Array(v.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn flat() {
        assert_eq!(parse(b"{1,2,3}").unwrap(), ints(&[1, 2, 3]));
        assert_eq!(parse(b"{}").unwrap(), Value::Array(vec![]));
        assert_eq!(parse(b"  { 1 , 2 }  ").unwrap(), ints(&[1, 2]));
    }

    #[test]
    fn nested() {
        assert_eq!(
            parse(b"{{1,2},{3,4}}").unwrap(),
            Value::Array(vec![ints(&[1, 2]), ints(&[3, 4])]),
        );
        assert_eq!(
            parse(b"{{{1}}}").unwrap(),
            Value::Array(vec![Value::Array(vec![ints(&[1])])]),
        );
    }

    #[test]
    fn null_sentinel_only_unquoted() {
        assert_eq!(
            parse(b"{1,NULL,3}").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]),
        );
        let ctx = DecodeContext::default();
        let text = ElementCast::Tag(TypeTag::simple(PgKind::Text));
        assert_eq!(
            cast_array(b"{1,\"NULL\",3}", &ctx, text, None).unwrap(),
            Value::Array(vec![
                Value::Text("1".into()),
                Value::Text("NULL".into()),
                Value::Text("3".into()),
            ]),
        );
    }

    #[test]
    fn quoting_and_escapes() {
        let ctx = DecodeContext::default();
        let text = ElementCast::Tag(TypeTag::simple(PgKind::Text));
        assert_eq!(
            cast_array(br#"{"a,b",b\,c,"d\"e"}"#, &ctx, text, None).unwrap(),
            Value::Array(vec![
                Value::Text("a,b".into()),
                Value::Text("b,c".into()),
                Value::Text("d\"e".into()),
            ]),
        );
        // trailing blanks of unquoted elements are trimmed
        assert_eq!(
            cast_array(b"{ a , b }", &ctx, text, None).unwrap(),
            Value::Array(vec![Value::Text("a".into()), Value::Text("b".into())]),
        );
    }

    #[test]
    fn dimension_header() {
        assert_eq!(parse(b"[1:3]={1,2,3}").unwrap(), ints(&[1, 2, 3]));
        assert_eq!(
            parse(b"[1:2][-1:0]={{1,2},{3,4}}").unwrap(),
            Value::Array(vec![ints(&[1, 2]), ints(&[3, 4])]),
        );
        // header depth must match brace depth
        assert!(matches!(
            parse(b"[1:2]={{1},{2}}").unwrap_err(),
            DecodeError::Parse(ParseError::DimensionMismatch),
        ));
        assert!(matches!(
            parse(b"[1:]={1}").unwrap_err(),
            DecodeError::Parse(ParseError::InvalidDimensions),
        ));
    }

    #[test]
    fn depth_limit() {
        let deep = |n: usize| {
            let mut s = vec![b'{'; n];
            s.push(b'1');
            s.extend(std::iter::repeat_n(b'}', n));
            s
        };
        assert!(parse(&deep(MAX_ARRAY_DEPTH)).is_ok());
        assert!(matches!(
            parse(&deep(MAX_ARRAY_DEPTH + 1)).unwrap_err(),
            DecodeError::Parse(ParseError::TooDeeplyNested),
        ));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            parse(b"1,2").unwrap_err(),
            DecodeError::Parse(ParseError::MissingLeftBrace),
        ));
        assert!(matches!(
            parse(b"{{1},2}").unwrap_err(),
            DecodeError::Parse(ParseError::SubarrayExpected),
        ));
        assert!(matches!(
            parse(b"{1,{2}}").unwrap_err(),
            DecodeError::Parse(ParseError::SubarrayNotExpected),
        ));
        assert!(matches!(
            parse(b"{1,2").unwrap_err(),
            DecodeError::Parse(ParseError::UnexpectedArrayEnd),
        ));
        assert!(matches!(
            parse(b"{\"1").unwrap_err(),
            DecodeError::Parse(ParseError::UnexpectedArrayEnd),
        ));
        assert!(matches!(
            parse(b"{1}x").unwrap_err(),
            DecodeError::Parse(ParseError::TrailingArrayGarbage),
        ));
        let ctx = DecodeContext::default();
        assert!(matches!(
            cast_array(b"{1}", &ctx, ElementCast::External(None), Some(b'{')).unwrap_err(),
            DecodeError::Parse(ParseError::InvalidArrayDelimiter),
        ));
    }

    #[test]
    fn leaf_cast_failure_aborts() {
        assert!(matches!(
            parse(b"{1,x,3}").unwrap_err(),
            DecodeError::Cast(_),
        ));
    }

    #[test]
    fn custom_delimiter() {
        let ctx = DecodeContext::default();
        let text = ElementCast::Tag(TypeTag::simple(PgKind::Text));
        assert_eq!(
            cast_array(b"{(1,2);(3,4)}", &ctx, text, Some(b';')).unwrap(),
            Value::Array(vec![Value::Text("(1,2)".into()), Value::Text("(3,4)".into())]),
        );
    }

    #[test]
    fn external_cast() {
        let ctx = DecodeContext::default();
        let double = |value: Value, _: crate::pg_type::Oid| -> Result<Value, DecodeError> {
            let n: i64 = value.as_str().unwrap().parse().unwrap();
            Ok(Value::Int(n * 2))
        };
        assert_eq!(
            cast_array(b"{1,2}", &ctx, ElementCast::External(Some(&double)), None).unwrap(),
            ints(&[2, 4]),
        );
        // an error from the cast aborts the array and passes through
        let fail = |_: Value, _: crate::pg_type::Oid| -> Result<Value, DecodeError> {
            Err(DecodeError::External("nope".into()))
        };
        assert!(matches!(
            cast_array(b"{1,2}", &ctx, ElementCast::External(Some(&fail)), None).unwrap_err(),
            DecodeError::External(_),
        ));
    }
}
