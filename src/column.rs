//! Column-level decoding entry point.
use crate::{
    array::{ElementCast, cast_array},
    context::DecodeContext,
    error::DecodeError,
    pg_type::{BOX_ARRAY, Oid, PgKind, TypeTag},
    scalar::{cast_other, cast_scalar},
    value::Value,
};

/// Element delimiter of an array type.
///
/// Nearly every type delimits array elements with a comma; `box[]` is the
/// one core type that uses a semicolon.
pub const fn array_delimiter(oid: Oid) -> u8 {
    match oid {
        BOX_ARRAY => b';',
        _ => b',',
    }
}

/// Decode one column value.
///
/// `tag` is the column's classified type, produced once per result set by
/// [`TypeTag::classify`] and shared by every row; `oid` is the column's
/// original server type identifier, handed to the external cast hook for
/// [`PgKind::Other`] columns.
pub fn cast_column(
    s: &[u8],
    oid: Oid,
    tag: TypeTag,
    ctx: &DecodeContext,
) -> Result<Value, DecodeError> {
    if tag.array {
        let elem = ElementCast::Tag(tag.base());
        return cast_array(s, ctx, elem, Some(array_delimiter(oid)));
    }
    match tag.kind {
        PgKind::Other => cast_other(s, oid, ctx),
        _ => cast_scalar(s, tag, ctx),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pg_type;

    #[test]
    fn scalar_column() {
        let ctx = DecodeContext::default();
        let tag = TypeTag::classify(pg_type::INT4, &ctx);
        assert_eq!(cast_column(b"42", pg_type::INT4, tag, &ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn array_column_uses_base_tag() {
        let ctx = DecodeContext::default();
        let tag = TypeTag::classify(pg_type::INT4_ARRAY, &ctx);
        assert_eq!(
            cast_column(b"{1,2}", pg_type::INT4_ARRAY, tag, &ctx).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
        );
    }

    #[test]
    fn array_as_text_yields_the_raw_literal() {
        let mut ctx = DecodeContext::default();
        ctx.array_as_text = true;
        let tag = TypeTag::classify(pg_type::INT4_ARRAY, &ctx);
        assert_eq!(
            cast_column(b"{1,2}", pg_type::INT4_ARRAY, tag, &ctx).unwrap(),
            Value::Text("{1,2}".into()),
        );
    }

    #[test]
    fn unknown_column_decodes_as_text() {
        let ctx = DecodeContext::default();
        let tag = TypeTag::classify(pg_type::BOX, &ctx);
        assert_eq!(
            cast_column(b"(1,2),(3,4)", pg_type::BOX, tag, &ctx).unwrap(),
            Value::Text("(1,2),(3,4)".into()),
        );
    }

    #[test]
    fn box_arrays_delimit_with_semicolon() {
        assert_eq!(array_delimiter(pg_type::BOX_ARRAY), b';');
        assert_eq!(array_delimiter(pg_type::INT4_ARRAY), b',');
    }
}
