//! Postgres type classification.
//!
//! - [`Oid`]
//! - [`PgKind`]
//! - [`TypeTag`]
use crate::context::DecodeContext;

/// Postgres object identifier.
///
/// The oid type is implemented as an unsigned four-byte integer.
///
/// <https://www.postgresql.org/docs/current/datatype-oid.html>
pub type Oid = u32;

// Scalar type oids.
pub const BOOL: Oid = 16;
pub const BYTEA: Oid = 17;
pub const CHAR: Oid = 18;
pub const NAME: Oid = 19;
pub const INT8: Oid = 20;
pub const INT2: Oid = 21;
pub const INT4: Oid = 23;
pub const TEXT: Oid = 25;
pub const OID: Oid = 26;
pub const XID: Oid = 28;
pub const CID: Oid = 29;
pub const JSON: Oid = 114;
pub const BOX: Oid = 603;
pub const FLOAT4: Oid = 700;
pub const FLOAT8: Oid = 701;
pub const MONEY: Oid = 790;
pub const BPCHAR: Oid = 1042;
pub const VARCHAR: Oid = 1043;
pub const NUMERIC: Oid = 1700;
pub const REGTYPE: Oid = 2206;
pub const JSONB: Oid = 3802;

// Array type oids.
pub const JSON_ARRAY: Oid = 199;
pub const MONEY_ARRAY: Oid = 791;
pub const BOOL_ARRAY: Oid = 1000;
pub const BYTEA_ARRAY: Oid = 1001;
pub const CHAR_ARRAY: Oid = 1002;
pub const NAME_ARRAY: Oid = 1003;
pub const INT2_ARRAY: Oid = 1005;
pub const INT4_ARRAY: Oid = 1007;
pub const TEXT_ARRAY: Oid = 1009;
pub const XID_ARRAY: Oid = 1011;
pub const CID_ARRAY: Oid = 1012;
pub const BPCHAR_ARRAY: Oid = 1014;
pub const VARCHAR_ARRAY: Oid = 1015;
pub const INT8_ARRAY: Oid = 1016;
pub const BOX_ARRAY: Oid = 1020;
pub const FLOAT4_ARRAY: Oid = 1021;
pub const FLOAT8_ARRAY: Oid = 1022;
pub const OID_ARRAY: Oid = 1028;
pub const NUMERIC_ARRAY: Oid = 1231;
pub const REGTYPE_ARRAY: Oid = 2211;
pub const JSONB_ARRAY: Oid = 3807;

/// Internal classification of a server type, guiding how its values
/// are cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgKind {
    /// Machine word integers: `int2`, `int4`, `oid`, `xid`, `cid`.
    Int,
    /// `int8` and wider.
    Long,
    Float,
    Decimal,
    Money,
    Bool,
    Text,
    Bytea,
    Json,
    /// Anything the engine does not classify, decoded as text and
    /// optionally post-processed by the external cast hook.
    Other,
}

impl PgKind {
    /// Kinds whose values are cast through the text path rather than
    /// the numeric/bool path.
    pub(crate) const fn is_text(self) -> bool {
        matches!(self, PgKind::Text | PgKind::Bytea | PgKind::Json | PgKind::Other)
    }
}

/// Classified column type: base kind plus array marker.
///
/// Produced once per result column by [`TypeTag::classify`] and reused
/// for every row of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag {
    pub kind: PgKind,
    pub array: bool,
}

impl TypeTag {
    /// Tag for a scalar of `kind`.
    pub const fn simple(kind: PgKind) -> TypeTag {
        TypeTag { kind, array: false }
    }

    /// Tag for an array with `kind` elements.
    pub const fn array(kind: PgKind) -> TypeTag {
        TypeTag { kind, array: true }
    }

    /// The element tag of an array tag.
    pub const fn base(self) -> TypeTag {
        TypeTag { kind: self.kind, array: false }
    }

    /// Classify a server type identifier under the given policy.
    ///
    /// A pure table lookup: policy degrades money without a decimal
    /// point, escaped bytea, json without a decode hook, and any array
    /// under `array_as_text` down to plain text. Unknown identifiers
    /// classify as [`PgKind::Other`].
    pub fn classify(oid: Oid, ctx: &DecodeContext) -> TypeTag {
        let money = || match ctx.decimal_point {
            Some(_) => PgKind::Money,
            None => PgKind::Text,
        };
        let bytea = || match ctx.bytea_escaped {
            true => PgKind::Text,
            false => PgKind::Bytea,
        };
        let json = || match ctx.has_json() {
            true => PgKind::Json,
            false => PgKind::Text,
        };

        let tag = match oid {
            INT2 | INT4 | CID | OID | XID => TypeTag::simple(PgKind::Int),
            INT8 => TypeTag::simple(PgKind::Long),
            FLOAT4 | FLOAT8 => TypeTag::simple(PgKind::Float),
            NUMERIC => TypeTag::simple(PgKind::Decimal),
            MONEY => TypeTag::simple(money()),
            BOOL => TypeTag::simple(PgKind::Bool),
            BYTEA => TypeTag::simple(bytea()),
            JSON | JSONB => TypeTag::simple(json()),
            BPCHAR | CHAR | TEXT | VARCHAR | NAME | REGTYPE => TypeTag::simple(PgKind::Text),

            INT2_ARRAY | INT4_ARRAY | CID_ARRAY | OID_ARRAY | XID_ARRAY => {
                TypeTag::array(PgKind::Int)
            }
            INT8_ARRAY => TypeTag::array(PgKind::Long),
            FLOAT4_ARRAY | FLOAT8_ARRAY => TypeTag::array(PgKind::Float),
            NUMERIC_ARRAY => TypeTag::array(PgKind::Decimal),
            MONEY_ARRAY => TypeTag::array(money()),
            BOOL_ARRAY => TypeTag::array(PgKind::Bool),
            BYTEA_ARRAY => TypeTag::array(bytea()),
            JSON_ARRAY | JSONB_ARRAY => TypeTag::array(json()),
            BPCHAR_ARRAY | CHAR_ARRAY | TEXT_ARRAY | VARCHAR_ARRAY | NAME_ARRAY
            | REGTYPE_ARRAY => TypeTag::array(PgKind::Text),

            _ => TypeTag::simple(PgKind::Other),
        };

        match tag.array && ctx.array_as_text {
            true => TypeTag::simple(PgKind::Text),
            false => tag,
        }
    }
}
