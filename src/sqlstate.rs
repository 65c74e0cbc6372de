//! SQLSTATE classification.
use std::fmt;

/// Exception category derived from a 5-character SQLSTATE code.
///
/// Only the first two characters, the SQLSTATE class, decide the
/// category; [`Database`][ErrorClass::Database] is the catch-all for
/// classes outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    NotSupported,
    Programming,
    Data,
    Integrity,
    Internal,
    Operational,
    Database,
}

impl ErrorClass {
    /// Classify a SQLSTATE diagnostic code.
    ///
    /// ```
    /// use pgtext::ErrorClass;
    ///
    /// assert_eq!(ErrorClass::from_sqlstate("23505"), ErrorClass::Integrity);
    /// assert_eq!(ErrorClass::from_sqlstate("42601"), ErrorClass::Programming);
    /// assert_eq!(ErrorClass::from_sqlstate("99999"), ErrorClass::Database);
    /// ```
    pub const fn from_sqlstate(code: &str) -> ErrorClass {
        let code = code.as_bytes();
        let c0 = if code.is_empty() { 0 } else { code[0] };
        let c1 = if code.len() < 2 { 0 } else { code[1] };

        match (c0, c1) {
            (b'0', b'A') => ErrorClass::NotSupported,
            (b'2', b'0' | b'1') => ErrorClass::Programming,
            (b'2', b'2') => ErrorClass::Data,
            (b'2', b'3') => ErrorClass::Integrity,
            (b'2', b'4' | b'5' | b'B' | b'D' | b'F') => ErrorClass::Internal,
            (b'2', b'6' | b'7' | b'8') => ErrorClass::Operational,
            (b'3', b'4') => ErrorClass::Operational,
            (b'3', b'8' | b'9' | b'B') => ErrorClass::Internal,
            (b'3', b'D' | b'F') => ErrorClass::Programming,
            (b'4', b'0') => ErrorClass::Operational,
            (b'4', b'2' | b'4') => ErrorClass::Programming,
            (b'5' | b'H', _) => ErrorClass::Operational,
            (b'F' | b'P' | b'X', _) => ErrorClass::Internal,
            _ => ErrorClass::Database,
        }
    }

    /// The exception name DB-API style callers raise for this category.
    pub const fn name(self) -> &'static str {
        match self {
            ErrorClass::NotSupported => "NotSupportedError",
            ErrorClass::Programming => "ProgrammingError",
            ErrorClass::Data => "DataError",
            ErrorClass::Integrity => "IntegrityError",
            ErrorClass::Internal => "InternalError",
            ErrorClass::Operational => "OperationalError",
            ErrorClass::Database => "DatabaseError",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ErrorClass {
    /// Serialize the exception name.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
