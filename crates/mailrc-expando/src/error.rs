//! Error types for mailrc-expando

/// Result type for expando compilation
pub type Result<T> = std::result::Result<T, ParseError>;

/// A compilation failure and the byte offset it was detected at
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at offset {offset})")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Byte offset into the source string
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// The reasons a format string can fail to compile
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Unknown expando: %{code}")]
    UnknownExpando { code: String },

    #[error("Unknown expando name: %{{{name}}}")]
    UnknownName { name: String },

    #[error("Unterminated expando name")]
    UnterminatedName,

    #[error("Missing expando after '%'")]
    MissingCode,

    #[error("Padding is missing its fill character")]
    MissingFill,

    #[error("Invalid width: {text}")]
    InvalidWidth { text: String },

    #[error("Missing precision after '.'")]
    MissingPrecision,

    #[error("Conditional expando is missing '?'")]
    MissingQuestion,

    /// The offset of this error points at the opening `%`
    #[error("Unterminated conditional expando")]
    UnterminatedCondition,
}
