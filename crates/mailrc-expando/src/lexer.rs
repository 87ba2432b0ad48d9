//! Tokenizer for format strings.
//!
//! The lexer only settles what is unambiguous without context: `%%` and
//! backslash escapes become literal characters, and every other `%` becomes
//! an introducer. Whether `&`, `>` or `?` close a conditional branch is up to
//! the parser.

/// The kind of a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An ordinary character; may be structural depending on context
    Char(char),
    /// A character that is always literal text (`%%`, `\x`)
    Literal(char),
    /// The `%` that starts a directive
    Introducer,
}

/// A token and the byte offset where it starts in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split a format string into tokens.
///
/// A trailing backslash is kept as a literal backslash.
///
/// # Example
///
/// ```
/// use mailrc_expando::lexer::{tokenize, TokenKind};
///
/// let kinds: Vec<TokenKind> = tokenize("%%\\&%a").into_iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Literal('%'),
///         TokenKind::Literal('&'),
///         TokenKind::Introducer,
///         TokenKind::Char('a'),
///     ]
/// );
/// ```
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let kind = match ch {
            '%' => {
                if matches!(chars.peek(), Some(&(_, '%'))) {
                    chars.next();
                    TokenKind::Literal('%')
                } else {
                    TokenKind::Introducer
                }
            }
            '\\' => match chars.next() {
                Some((_, escaped)) => TokenKind::Literal(escaped),
                None => TokenKind::Literal('\\'),
            },
            other => TokenKind::Char(other),
        };
        tokens.push(Token { kind, offset });
    }

    tokens
}
