//! Decoder for the textual representations of Postgres result values.
//!
//! Converts the text format the server emits for result columns into
//! typed [`Value`]s: scalars, arrays, composite records and hstore maps.
//! The surrounding driver hands over three things per column, the raw
//! bytes, the column's type oid and the session encoding; policy beyond
//! that lives in a [`DecodeContext`].
//!
//! # Examples
//!
//! Classify a result column once, then decode its values row by row:
//!
//! ```
//! use pgtext::{DecodeContext, TypeTag, Value, pg_type};
//!
//! # fn main() -> Result<(), pgtext::DecodeError> {
//! let ctx = DecodeContext::default();
//! let tag = TypeTag::classify(pg_type::INT4_ARRAY, &ctx);
//!
//! let parsed = pgtext::cast_column(b"{1,NULL,3}", pg_type::INT4_ARRAY, tag, &ctx)?;
//!
//! assert_eq!(
//!     parsed,
//!     Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Composite values with per-column types:
//!
//! ```
//! use pgtext::{DecodeContext, PgKind, RecordCast, TypeTag, Value};
//!
//! # fn main() -> Result<(), pgtext::DecodeError> {
//! let ctx = DecodeContext::default();
//! let tags = [TypeTag::simple(PgKind::Int), TypeTag::simple(PgKind::Text)];
//!
//! let parsed = pgtext::cast_record(b"(420,\"f,oo\")", &ctx, RecordCast::Tags(&tags), None, None)?;
//!
//! assert_eq!(
//!     parsed,
//!     Value::Record(vec![Value::Int(420), Value::Text("f,oo".into())]),
//! );
//! # Ok(())
//! # }
//! ```

mod common;
mod ext;

// Classification
pub mod encoding;
pub mod pg_type;

// Configuration
pub mod context;

// Casting
pub mod value;
pub mod scalar;
pub mod bytea;

// Container literals
pub mod array;
pub mod record;
pub mod hstore;
pub mod column;

// Diagnostics
pub mod sqlstate;
mod error;

pub use array::{ElementCast, MAX_ARRAY_DEPTH, cast_array};
pub use column::{array_delimiter, cast_column};
pub use context::{DecodeContext, ExternalCast};
pub use encoding::Encoding;
pub use error::{BoxError, CastError, DecodeError, ParseError};
pub use hstore::cast_hstore;
pub use pg_type::{Oid, PgKind, TypeTag};
pub use record::{RecordCast, cast_record};
pub use scalar::{cast_other, cast_scalar};
pub use sqlstate::ErrorClass;
pub use value::Value;
