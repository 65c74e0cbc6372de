//! Composite/record literal parsing.
//!
//! Parses the parenthesis-delimited text format the server emits for
//! row and composite-type values.
use crate::{
    array::{ElementCast, cast_array},
    common::span,
    context::{DecodeContext, ExternalCast},
    error::{DecodeError, ParseError},
    pg_type::TypeTag,
    scalar::{cast_simple, cast_text, decode_external},
    value::Value,
};

/// How record columns are cast.
#[derive(Clone, Copy)]
pub enum RecordCast<'a> {
    /// Internal casting with one type tag per column.
    Tags(&'a [TypeTag]),
    /// One external cast applied to every column.
    Single(&'a dyn ExternalCast),
    /// Per-column external casts; a `None` slot passes the decoded text
    /// through unchanged.
    Columns(&'a [Option<&'a dyn ExternalCast>]),
    /// Decode every column as session text.
    Text,
}

impl RecordCast<'_> {
    /// Column count implied by a per-column cast specification.
    fn implied_len(&self) -> Option<usize> {
        match self {
            RecordCast::Tags(tags) => Some(tags.len()),
            RecordCast::Columns(casts) => Some(casts.len()),
            RecordCast::Single(_) | RecordCast::Text => None,
        }
    }
}

/// Parse a record literal.
///
/// `len` is the expected column count, defaulting to the count implied by
/// a per-column `cast`; when neither is given the record is accepted at
/// whatever length was parsed. Composite types always delimit with a
/// comma, yet a custom `delim` is accepted.
///
/// ```
/// use pgtext::{DecodeContext, PgKind, RecordCast, TypeTag, Value};
///
/// let ctx = DecodeContext::default();
/// let tags = [TypeTag::simple(PgKind::Int), TypeTag::simple(PgKind::Text)];
/// let parsed = pgtext::cast_record(b"(420,foo)", &ctx, RecordCast::Tags(&tags), None, None)?;
///
/// assert_eq!(parsed, Value::Record(vec![Value::Int(420), Value::Text("foo".into())]));
/// # Ok::<(), pgtext::DecodeError>(())
/// ```
pub fn cast_record(
    s: &[u8],
    ctx: &DecodeContext,
    cast: RecordCast<'_>,
    len: Option<usize>,
    delim: Option<u8>,
) -> Result<Value, DecodeError> {
    span!("cast_record");
    let delim = delim.unwrap_or(b',');
    if matches!(delim, b'(' | b')' | b'\\') {
        return Err(ParseError::InvalidRecordDelimiter.into());
    }
    let expected = len.or(cast.implied_len());

    let end = s.len();
    let mut p = 0;
    while p < end && s[p] == b' ' {
        p += 1;
    }
    if p == end || s[p] != b'(' {
        return Err(ParseError::MissingLeftParen.into());
    }

    let mut result: Vec<Value> = Vec::new();
    'parse: loop {
        p += 1;
        if p == end {
            break 'parse;
        }

        let element = if s[p] == b')' || s[p] == delim {
            // an empty column is NULL, no cast applies
            Value::Null
        } else {
            let start = p;
            let mut quoted = s[p] == b'"';
            if quoted {
                p += 1;
            }
            let mut esize = 0;
            loop {
                if p == end {
                    break 'parse;
                }
                if !quoted && (s[p] == b')' || s[p] == delim) {
                    break;
                }
                if s[p] == b'"' {
                    p += 1;
                    if p == end {
                        break 'parse;
                    }
                    // `""` inside quotes is a literal quote, not a toggle
                    if !(quoted && s[p] == b'"') {
                        quoted = !quoted;
                        continue;
                    }
                }
                if s[p] == b'\\' {
                    p += 1;
                    if p == end {
                        break 'parse;
                    }
                }
                p += 1;
                esize += 1;
            }
            let raw = &s[start..p];
            let owned;
            let field = match raw.len() == esize {
                true => raw,
                false => {
                    owned = unescape_field(raw);
                    owned.as_slice()
                }
            };
            cast_column(field, result.len(), ctx, cast)?
        };
        result.push(element);

        if s[p] != delim {
            // no next column
            break 'parse;
        }
        if let Some(expected) = expected {
            if result.len() >= expected {
                return Err(ParseError::TooManyColumns.into());
            }
        }
    }

    if p == end || s[p] != b')' {
        return Err(ParseError::UnexpectedRecordEnd.into());
    }
    p += 1;
    while p < end && s[p] == b' ' {
        p += 1;
    }
    if p != end {
        return Err(ParseError::TrailingRecordGarbage.into());
    }
    if let Some(expected) = expected {
        if result.len() < expected {
            return Err(ParseError::TooFewColumns.into());
        }
    }
    Ok(Value::Record(result))
}

fn cast_column(
    field: &[u8],
    at: usize,
    ctx: &DecodeContext,
    cast: RecordCast<'_>,
) -> Result<Value, DecodeError> {
    match cast {
        RecordCast::Tags(tags) => {
            let Some(&tag) = tags.get(at) else {
                return Err(ParseError::NoColumnCast(at).into());
            };
            if tag.array {
                return cast_array(field, ctx, ElementCast::Tag(tag.base()), None);
            }
            match tag.kind {
                kind if kind.is_text() => cast_text(field, kind, ctx),
                kind => cast_simple(field, kind, ctx),
            }
        }
        RecordCast::Single(cast) => cast.apply(decode_external(field, ctx), 0),
        RecordCast::Columns(casts) => match casts.get(at) {
            None => Err(ParseError::NoColumnCast(at).into()),
            Some(None) => Ok(decode_external(field, ctx)),
            Some(Some(cast)) => cast.apply(decode_external(field, ctx), 0),
        },
        RecordCast::Text => Ok(decode_external(field, ctx)),
    }
}

/// Unescape a field with the same toggle model the scanner uses.
fn unescape_field(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut quoted = false;
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'"' {
            i += 1;
            if !(quoted && raw.get(i) == Some(&b'"')) {
                quoted = !quoted;
                continue;
            }
        }
        if raw[i] == b'\\' {
            i += 1;
        }
        if i < raw.len() {
            out.push(raw[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pg_type::{Oid, PgKind};

    fn tag(kind: PgKind) -> TypeTag {
        TypeTag::simple(kind)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    #[test]
    fn tagged_columns() {
        let ctx = DecodeContext::default();
        let tags = [tag(PgKind::Int), tag(PgKind::Text), tag(PgKind::Text)];
        let parsed = cast_record(b"(1,\"a,b\",)", &ctx, RecordCast::Tags(&tags), None, None);
        assert_eq!(
            parsed.unwrap(),
            Value::Record(vec![Value::Int(1), text("a,b"), Value::Null]),
        );
    }

    #[test]
    fn column_count_is_enforced() {
        let ctx = DecodeContext::default();
        let two = [tag(PgKind::Int), tag(PgKind::Text)];
        assert!(matches!(
            cast_record(b"(1,\"a,b\",)", &ctx, RecordCast::Tags(&two), None, None).unwrap_err(),
            DecodeError::Parse(ParseError::TooManyColumns),
        ));
        assert!(matches!(
            cast_record(b"(1)", &ctx, RecordCast::Tags(&two), None, None).unwrap_err(),
            DecodeError::Parse(ParseError::TooFewColumns),
        ));
        // without a count the record is taken at parsed length
        let parsed = cast_record(b"(a,b,c)", &ctx, RecordCast::Text, None, None).unwrap();
        assert_eq!(parsed, Value::Record(vec![text("a"), text("b"), text("c")]));
    }

    #[test]
    fn quote_toggling() {
        let ctx = DecodeContext::default();
        // doubled quote inside quotes is a literal quote
        let parsed = cast_record(br#"("he said ""hi""",plain)"#, &ctx, RecordCast::Text, None, None);
        assert_eq!(
            parsed.unwrap(),
            Value::Record(vec![text("he said \"hi\""), text("plain")]),
        );
        // backslash escapes regardless of quote state
        let parsed = cast_record(br#"(a\,b,"c\"d")"#, &ctx, RecordCast::Text, None, None);
        assert_eq!(parsed.unwrap(), Value::Record(vec![text("a,b"), text("c\"d")]));
        // quotes can toggle mid-field
        let parsed = cast_record(br#"(pre"mid,dle"post)"#, &ctx, RecordCast::Text, None, None);
        assert_eq!(parsed.unwrap(), Value::Record(vec![text("premid,dlepost")]));
    }

    #[test]
    fn empty_columns_are_null() {
        let ctx = DecodeContext::default();
        let parsed = cast_record(b"(,,)", &ctx, RecordCast::Text, None, None).unwrap();
        assert_eq!(parsed, Value::Record(vec![Value::Null, Value::Null, Value::Null]));
        // quoted empty string is not NULL
        let parsed = cast_record(b"(\"\",)", &ctx, RecordCast::Text, None, None).unwrap();
        assert_eq!(parsed, Value::Record(vec![text(""), Value::Null]));
    }

    #[test]
    fn null_columns_cast_to_null_again() {
        let ctx = DecodeContext::default();
        let tags = [tag(PgKind::Int), tag(PgKind::Text)];
        let parsed = cast_record(b"(1,)", &ctx, RecordCast::Tags(&tags), None, None).unwrap();
        let Value::Record(columns) = parsed else { panic!() };
        assert_eq!(columns[1], Value::Null);
        // reparsing the reserialized NULL column keeps it NULL
        let parsed = cast_record(b"(1,)", &ctx, RecordCast::Tags(&tags), None, None).unwrap();
        assert_eq!(parsed.as_elements().unwrap()[1], Value::Null);
    }

    #[test]
    fn array_column() {
        let ctx = DecodeContext::default();
        let tags = [tag(PgKind::Int), TypeTag::array(PgKind::Int)];
        let parsed = cast_record(br#"(1,"{2,3}")"#, &ctx, RecordCast::Tags(&tags), None, None);
        assert_eq!(
            parsed.unwrap(),
            Value::Record(vec![
                Value::Int(1),
                Value::Array(vec![Value::Int(2), Value::Int(3)]),
            ]),
        );
    }

    #[test]
    fn per_column_casts() {
        let ctx = DecodeContext::default();
        let upper = |value: Value, _: Oid| -> Result<Value, DecodeError> {
            Ok(Value::Text(value.as_str().unwrap().to_uppercase()))
        };
        let casts: [Option<&dyn ExternalCast>; 2] = [Some(&upper), None];
        let parsed = cast_record(b"(ab,cd)", &ctx, RecordCast::Columns(&casts), None, None);
        assert_eq!(parsed.unwrap(), Value::Record(vec![text("AB"), text("cd")]));

        // a populated column past the cast sequence is an error
        let one: [Option<&dyn ExternalCast>; 1] = [Some(&upper)];
        assert!(matches!(
            cast_record(b"(ab,cd)", &ctx, RecordCast::Columns(&one), Some(2), None).unwrap_err(),
            DecodeError::Parse(ParseError::NoColumnCast(1)),
        ));
    }

    #[test]
    fn single_cast_applies_to_every_column() {
        let ctx = DecodeContext::default();
        let int = |value: Value, _: Oid| -> Result<Value, DecodeError> {
            Ok(Value::Int(value.as_str().unwrap().parse().unwrap()))
        };
        let parsed = cast_record(b"(1,2,3)", &ctx, RecordCast::Single(&int), None, None);
        assert_eq!(
            parsed.unwrap(),
            Value::Record(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
    }

    #[test]
    fn structural_errors() {
        let ctx = DecodeContext::default();
        assert!(matches!(
            cast_record(b"1,2", &ctx, RecordCast::Text, None, None).unwrap_err(),
            DecodeError::Parse(ParseError::MissingLeftParen),
        ));
        assert!(matches!(
            cast_record(b"(1,2", &ctx, RecordCast::Text, None, None).unwrap_err(),
            DecodeError::Parse(ParseError::UnexpectedRecordEnd),
        ));
        assert!(matches!(
            cast_record(br#"("unterminated)"#, &ctx, RecordCast::Text, None, None).unwrap_err(),
            DecodeError::Parse(ParseError::UnexpectedRecordEnd),
        ));
        assert!(matches!(
            cast_record(b"(1)x", &ctx, RecordCast::Text, None, None).unwrap_err(),
            DecodeError::Parse(ParseError::TrailingRecordGarbage),
        ));
        assert!(matches!(
            cast_record(b"(1)", &ctx, RecordCast::Text, None, Some(b'(')).unwrap_err(),
            DecodeError::Parse(ParseError::InvalidRecordDelimiter),
        ));
    }
}
