//! Session text encodings.
use std::fmt;

/// Server-side text encoding of a session.
///
/// The closed set the engine decodes itself; a session in any other
/// encoding should be converted before decoding, or decoded under
/// [`SqlAscii`][Encoding::SqlAscii] to keep raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// No encoding declared, 7-bit input.
    SqlAscii,
    Latin1,
    #[default]
    Utf8,
}

impl Encoding {
    /// Resolve a server encoding id.
    ///
    /// Ids follow the server's encoding numbering, where `SQL_ASCII` is 0,
    /// `UTF8` is 6 and `LATIN1` is 8.
    pub const fn from_code(code: i32) -> Option<Encoding> {
        match code {
            0 => Some(Encoding::SqlAscii),
            6 => Some(Encoding::Utf8),
            8 => Some(Encoding::Latin1),
            _ => None,
        }
    }

    /// The server-side name of this encoding.
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::SqlAscii => "SQL_ASCII",
            Encoding::Latin1 => "LATIN1",
            Encoding::Utf8 => "UTF8",
        }
    }

    /// Strictly decode `s`.
    pub fn decode(self, s: &[u8]) -> Result<String, TextError> {
        match self {
            Encoding::Utf8 => match std::str::from_utf8(s) {
                Ok(text) => Ok(text.to_owned()),
                Err(e) => Err(TextError { encoding: self, offset: e.valid_up_to() }),
            },
            Encoding::SqlAscii => match s.iter().position(|e| !e.is_ascii()) {
                Some(offset) => Err(TextError { encoding: self, offset }),
                None => Ok(s.iter().map(|&b| b as char).collect()),
            },
            Encoding::Latin1 => Ok(s.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error when column text is not valid in the session encoding.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextError {
    pub(crate) encoding: Encoding,
    pub(crate) offset: usize,
}

impl std::error::Error for TextError { }

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} text at byte {}", self.encoding, self.offset)
    }
}

impl fmt::Debug for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
