//! Parser turning tokens into an AST.
//!
//! Grammar, informally:
//!
//! ```text
//! sequence  := (text | directive)*
//! directive := '%' ( '<' cond | '?' cond | pad | format code )
//! cond      := code '?' sequence ( '&' sequence )? closer
//! pad       := ('|' | '>' | '*') fill-char
//! format    := ('-' | '=')? '0'? digits? ('.' digits)? '_'?
//! code      := '{' name '}' | longest-matching table code
//! ```

use crate::definition::{ExpandoDefinition, find_by_code, find_by_name};
use crate::error::{ParseError, ParseErrorKind, Result};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::node::{
    CondStyle, Condition, Directive, ExpandoNode, Format, Justify, Node, PadKind, Padding,
};

/// Longest directive code the tables may contain
const MAX_CODE_LEN: usize = 2;

/// Text and nodes collected for one branch
#[derive(Debug, Default)]
struct Branch {
    nodes: Vec<Node>,
    text: String,
}

impl Branch {
    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(Node::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.nodes
    }
}

/// A conditional whose closer has not been seen yet
struct OpenCondition {
    /// Offset of the opening `%`
    start: usize,
    style: CondStyle,
    test: Directive,
    /// Filled in once `&` is seen
    if_true: Option<Vec<Node>>,
    /// The branch the conditional was opened in
    outer: Branch,
}

/// What closed a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Else,
    End,
}

impl OpenCondition {
    fn closer(&self, ch: char) -> Option<Closer> {
        match (ch, self.style) {
            ('&', _) if self.if_true.is_none() => Some(Closer::Else),
            ('>', CondStyle::Modern) | ('?', CondStyle::Legacy) => Some(Closer::End),
            _ => None,
        }
    }
}

/// The result of parsing one `%` directive
enum Parsed {
    Node(Node),
    /// `%<x?` or `%?x?`: the branches follow
    Open { style: CondStyle, test: Directive },
}

/// Compile `source` against a directive table.
///
/// # Example
///
/// ```
/// use mailrc_expando::{ExpandoDefinition, Node, parse};
///
/// static DEFS: &[ExpandoDefinition] = &[ExpandoDefinition::new("a", "aardvark", 1, 100)];
///
/// let nodes = parse("[%a]", DEFS).unwrap();
/// assert_eq!(nodes.len(), 3);
/// assert!(matches!(nodes[1], Node::Expando(_)));
/// ```
pub fn parse(source: &str, defs: &[ExpandoDefinition]) -> Result<Vec<Node>> {
    let mut parser = Parser {
        tokens: tokenize(source),
        pos: 0,
        end: source.len(),
        defs,
    };
    parser.sequence()
}

struct Parser<'d> {
    tokens: Vec<Token>,
    pos: usize,
    /// Offset reported for errors at the end of input
    end: usize,
    defs: &'d [ExpandoDefinition],
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    /// The next character, if it is an ordinary (unescaped) one.
    fn peek_char(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        match self.tokens.get(pos) {
            Some(Token {
                kind: TokenKind::Char(ch),
                ..
            }) => Some(*ch),
            _ => None,
        }
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |t| t.offset)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse the whole source. Nested conditionals are kept on an explicit
    /// stack, so nesting depth is bounded only by memory.
    fn sequence(&mut self) -> Result<Vec<Node>> {
        let mut open: Vec<OpenCondition> = Vec::new();
        let mut branch = Branch::default();

        while let Some(token) = self.peek() {
            self.pos += 1;
            match token.kind {
                TokenKind::Literal(ch) => branch.text.push(ch),
                TokenKind::Char(ch) => {
                    let closer = open.last().and_then(|cond| cond.closer(ch));
                    match closer {
                        None => branch.text.push(ch),
                        Some(Closer::Else) => {
                            if let Some(cond) = open.last_mut() {
                                cond.if_true = Some(std::mem::take(&mut branch).finish());
                            }
                        }
                        Some(Closer::End) => {
                            if let Some(cond) = open.pop() {
                                close_condition(cond, &mut branch);
                            }
                        }
                    }
                }
                TokenKind::Introducer => {
                    branch.flush();
                    match self.directive()? {
                        Parsed::Node(node) => branch.nodes.push(node),
                        Parsed::Open { style, test } => open.push(OpenCondition {
                            start: token.offset,
                            style,
                            test,
                            if_true: None,
                            outer: std::mem::take(&mut branch),
                        }),
                    }
                }
            }
        }

        // The innermost unclosed conditional is the one reported
        if let Some(cond) = open.last() {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedCondition,
                cond.start,
            ));
        }
        Ok(branch.finish())
    }

    /// Parse what follows a `%`.
    fn directive(&mut self) -> Result<Parsed> {
        let next = self.peek_char();
        if let Some(kind) = next.and_then(PadKind::from_marker) {
            self.pos += 1;
            return self.padding(kind).map(Parsed::Node);
        }

        let style = match next {
            Some('<') => CondStyle::Modern,
            Some('?') => CondStyle::Legacy,
            _ => {
                let format = self.format()?;
                let directive = self.code()?;
                return Ok(Parsed::Node(Node::Expando(ExpandoNode { directive, format })));
            }
        };
        self.pos += 1;

        let test = self.code()?;
        if !self.eat('?') {
            return Err(ParseError::new(
                ParseErrorKind::MissingQuestion,
                self.offset(),
            ));
        }
        Ok(Parsed::Open { style, test })
    }

    fn padding(&mut self, kind: PadKind) -> Result<Node> {
        let fill = match self.peek() {
            Some(Token {
                kind: TokenKind::Char(ch) | TokenKind::Literal(ch),
                ..
            }) => ch,
            _ => return Err(ParseError::new(ParseErrorKind::MissingFill, self.offset())),
        };
        self.pos += 1;
        Ok(Node::Padding(Padding { kind, fill }))
    }

    /// Parse the optional width modifiers before a code.
    fn format(&mut self) -> Result<Option<Format>> {
        let mut format = Format::default();
        let mut seen = false;

        if self.eat('-') {
            format.justify = Justify::Left;
            seen = true;
        } else if self.eat('=') {
            format.justify = Justify::Center;
            seen = true;
        }

        if self.eat('0') {
            format.zero_pad = true;
            seen = true;
        }

        if let Some(min) = self.number()? {
            format.min_cols = Some(min);
            seen = true;
        }

        if self.eat('.') {
            match self.number()? {
                Some(max) => format.max_cols = Some(max),
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::MissingPrecision,
                        self.offset(),
                    ));
                }
            }
            seen = true;
        }

        if self.eat('_') {
            format.lowercase = true;
            seen = true;
        }

        Ok(seen.then_some(format))
    }

    fn number(&mut self) -> Result<Option<usize>> {
        let start = self.offset();
        let mut digits = String::new();
        while let Some(ch) = self.peek_char().filter(char::is_ascii_digit) {
            digits.push(ch);
            self.pos += 1;
        }

        if digits.is_empty() {
            return Ok(None);
        }

        digits.parse::<usize>().map(Some).map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidWidth { text: digits.clone() }, start)
        })
    }

    /// Parse a directive code, preferring the longest match in the table.
    fn code(&mut self) -> Result<Directive> {
        let offset = self.offset();

        if self.eat('{') {
            return self.long_name(offset);
        }

        let mut candidate = String::new();
        let mut matched = None;
        for len in 1..=MAX_CODE_LEN {
            match self.char_at(self.pos + len - 1) {
                Some(ch) => candidate.push(ch),
                None => break,
            }
            if let Some(def) = find_by_code(self.defs, &candidate) {
                matched = Some((def, len));
            }
        }

        if let Some((def, len)) = matched {
            self.pos += len;
            return Ok(Directive::from(def));
        }

        match self.peek() {
            None => Err(ParseError::new(ParseErrorKind::MissingCode, offset)),
            Some(token) => {
                let code = match token.kind {
                    TokenKind::Char(ch) | TokenKind::Literal(ch) => ch.to_string(),
                    TokenKind::Introducer => "%".to_string(),
                };
                Err(ParseError::new(
                    ParseErrorKind::UnknownExpando { code },
                    offset,
                ))
            }
        }
    }

    fn long_name(&mut self, open: usize) -> Result<Directive> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedName, open)),
                Some(Token {
                    kind: TokenKind::Char('}'),
                    ..
                }) => {
                    self.pos += 1;
                    break;
                }
                Some(Token {
                    kind: TokenKind::Char(ch) | TokenKind::Literal(ch),
                    ..
                }) => {
                    name.push(ch);
                    self.pos += 1;
                }
                Some(Token {
                    kind: TokenKind::Introducer,
                    ..
                }) => return Err(ParseError::new(ParseErrorKind::UnterminatedName, open)),
            }
        }

        find_by_name(self.defs, &name)
            .map(Directive::from)
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnknownName { name }, open))
    }
}

/// Finish `cond` with `branch` as its last branch, then resume the branch
/// it was opened in.
fn close_condition(cond: OpenCondition, branch: &mut Branch) {
    let OpenCondition {
        style,
        test,
        if_true,
        outer,
        ..
    } = cond;
    let last = std::mem::replace(branch, outer).finish();
    let (if_true, if_false) = match if_true {
        Some(if_true) => (if_true, Some(last)),
        None => (last, None),
    };
    branch.nodes.push(Node::Condition(Condition {
        style,
        test,
        if_true,
        if_false,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static DEFS: &[ExpandoDefinition] = &[
        ExpandoDefinition::new("a", "aardvark", 1, 100),
        ExpandoDefinition::new("b", "badger", 1, 101),
        ExpandoDefinition::new("ab", "abacus", 1, 102),
    ];

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("", DEFS).unwrap().is_empty());
    }

    #[test]
    fn test_literal_run_merges_escapes() {
        assert_eq!(parse("a%%b\\%c", DEFS).unwrap(), vec![text("a%b%c")]);
    }

    #[test]
    fn test_longest_match_wins() {
        let nodes = parse("%ab", DEFS).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Expando(e) => assert_eq!(e.directive.name, "abacus"),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_escape_stops_longest_match() {
        let nodes = parse("%a\\b", DEFS).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1], text("b"));
    }

    #[test]
    fn test_unknown_code_reports_offset() {
        let err = parse("xy %Q", DEFS).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnknownExpando {
                code: "Q".to_string()
            }
        );
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_closers_are_literal_at_top_level() {
        assert_eq!(parse("a&b>c?", DEFS).unwrap(), vec![text("a&b>c?")]);
    }

    #[test]
    fn test_unterminated_reports_opening_offset() {
        let err = parse("ab %<a?x&y", DEFS).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedCondition);
        assert_eq!(err.offset, 3);
    }
}
