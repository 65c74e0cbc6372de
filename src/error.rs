//! `pgtext` error types.
use std::fmt;

use crate::{encoding::TextError, sqlstate::ErrorClass};

/// Boxed error produced by a caller-supplied cast.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error when decoding a result value.
pub enum DecodeError {
    /// Malformed array, record or hstore literal.
    Parse(ParseError),
    /// A leaf value whose text does not cast to its declared type.
    Cast(CastError),
    /// Failure of a caller-supplied cast, passed through unchanged.
    External(BoxError),
}

impl DecodeError {
    /// The diagnostic category a caller would surface this failure under.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Parse(_) | Self::Cast(_) => ErrorClass::Data,
            Self::External(_) => ErrorClass::Database,
        }
    }
}

/// A grammar violation in a container literal.
///
/// Any of these aborts the whole container parse; partially decoded
/// elements are dropped, never returned.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidArrayDelimiter,
    InvalidDimensions,
    MissingLeftBrace,
    DimensionMismatch,
    TooDeeplyNested,
    SubarrayExpected,
    SubarrayNotExpected,
    MissingSubarrayBrace,
    UnexpectedArrayEnd,
    TrailingArrayGarbage,
    InvalidRecordDelimiter,
    MissingLeftParen,
    /// No type tag or cast supplied for a populated column.
    NoColumnCast(usize),
    TooManyColumns,
    TooFewColumns,
    UnexpectedRecordEnd,
    TrailingRecordGarbage,
    MissingKey,
    MissingValue,
    MissingEntry,
    UnterminatedQuote,
    InvalidAfterKey,
    InvalidAfterValue,
}

/// A leaf value whose text could not be cast.
pub enum CastError {
    Int(std::num::ParseIntError),
    Float(std::num::ParseFloatError),
    Decimal(rust_decimal::Error),
    /// Numeric text longer than the staging buffer, reported instead of
    /// truncated.
    NumericTooLong(usize),
    /// Invalid bytea escape at the given byte offset.
    Bytea(usize),
    /// Undecodable text where decoding is mandatory.
    Text(TextError),
    #[cfg(feature = "json")]
    Json(serde_json::Error),
}

macro_rules! from {
    ($target:ident, <$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for $target {
            fn from($pat: $ty) -> Self {
                $body
            }
        }
    };
}

from!(DecodeError, <ParseError>e => Self::Parse(e));
from!(DecodeError, <CastError>e => Self::Cast(e));
from!(DecodeError, <BoxError>e => Self::External(e));
from!(CastError, <TextError>e => Self::Text(e));

impl std::error::Error for DecodeError { }

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Cast(e) => e.fmt(f),
            Self::External(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ParseError { }

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArrayDelimiter => f.write_str("invalid array delimiter"),
            Self::InvalidDimensions => f.write_str("invalid array dimensions"),
            Self::MissingLeftBrace => f.write_str("array must start with a left brace"),
            Self::DimensionMismatch => f.write_str("array dimensions do not match content"),
            Self::TooDeeplyNested => f.write_str("array is too deeply nested"),
            Self::SubarrayExpected => f.write_str("subarray expected but not found"),
            Self::SubarrayNotExpected => f.write_str("subarray found where not expected"),
            Self::MissingSubarrayBrace => f.write_str("subarray must start with a left brace"),
            Self::UnexpectedArrayEnd => f.write_str("unexpected end of array"),
            Self::TrailingArrayGarbage => {
                f.write_str("unexpected characters after end of array")
            }
            Self::InvalidRecordDelimiter => f.write_str("invalid record delimiter"),
            Self::MissingLeftParen => {
                f.write_str("record must start with a left parenthesis")
            }
            Self::NoColumnCast(i) => write!(f, "no cast for column {i}"),
            Self::TooManyColumns => f.write_str("too many columns"),
            Self::TooFewColumns => f.write_str("too few columns"),
            Self::UnexpectedRecordEnd => f.write_str("unexpected end of record"),
            Self::TrailingRecordGarbage => {
                f.write_str("unexpected characters after end of record")
            }
            Self::MissingKey => f.write_str("missing key"),
            Self::MissingValue => f.write_str("missing value"),
            Self::MissingEntry => f.write_str("missing entry"),
            Self::UnterminatedQuote => f.write_str("unterminated quote"),
            Self::InvalidAfterKey => f.write_str("invalid characters after key"),
            Self::InvalidAfterValue => f.write_str("invalid characters after value"),
        }
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for CastError { }

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to cast value, ")?;
        match self {
            Self::Int(e) => e.fmt(f),
            Self::Float(e) => e.fmt(f),
            Self::Decimal(e) => e.fmt(f),
            Self::NumericTooLong(n) => {
                write!(f, "numeric text of {n} bytes exceeds the staging buffer")
            }
            Self::Bytea(i) => write!(f, "invalid bytea escape at byte {i}"),
            Self::Text(e) => e.fmt(f),
            #[cfg(feature = "json")]
            Self::Json(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn engine_failures_are_data_errors() {
        let parse = DecodeError::from(ParseError::UnterminatedQuote);
        assert_eq!(parse.class(), ErrorClass::Data);
        let cast = DecodeError::from(CastError::NumericTooLong(70));
        assert_eq!(cast.class(), ErrorClass::Data);
        // user hook failures keep the catch-all category
        let external = DecodeError::External("boom".into());
        assert_eq!(external.class(), ErrorClass::Database);
    }

    #[test]
    fn debug_prints_the_message() {
        let err = DecodeError::from(ParseError::TooManyColumns);
        assert_eq!(format!("{err:?}"), "\"too many columns\"");
    }
}
