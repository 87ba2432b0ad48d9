//! Abstract syntax tree of a compiled format string
//!
//! The tree is immutable once built. `Display` renders the canonical source
//! of a node; compiling that text again yields an equal tree.

use std::fmt::{self, Write};

use crate::definition::ExpandoDefinition;

/// A reference to an entry of the directive table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Directive {
    pub code: &'static str,
    pub name: &'static str,
    pub domain: i32,
    pub uid: i32,
}

impl From<&ExpandoDefinition> for Directive {
    fn from(def: &ExpandoDefinition) -> Self {
        Self {
            code: def.code,
            name: def.name,
            domain: def.domain,
            uid: def.uid,
        }
    }
}

/// Horizontal alignment of a substituted value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    Left,
    #[default]
    Right,
    Center,
}

/// Width modifiers written between `%` and the directive code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Format {
    /// Minimum number of columns
    pub min_cols: Option<usize>,
    /// Maximum number of columns; longer values are truncated
    pub max_cols: Option<usize>,
    pub justify: Justify,
    /// Pad with `0` instead of spaces
    pub zero_pad: bool,
    /// Render the value in lower case
    pub lowercase: bool,
}

/// How a padding node fills the remaining space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadKind {
    /// `%|X`: fill to the end of the line
    FillToEol,
    /// `%>X`: fill, pushing the rest of the line to the right edge
    HardFill,
    /// `%*X`: like a hard fill, but the right side may be truncated first
    SoftFill,
}

impl PadKind {
    pub fn marker(self) -> char {
        match self {
            Self::FillToEol => '|',
            Self::HardFill => '>',
            Self::SoftFill => '*',
        }
    }

    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            '|' => Some(Self::FillToEol),
            '>' => Some(Self::HardFill),
            '*' => Some(Self::SoftFill),
            _ => None,
        }
    }
}

/// The two spellings of a conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CondStyle {
    /// `%<x?if&else>`, nestable
    Modern,
    /// `%?x?if&else?`
    Legacy,
}

impl CondStyle {
    fn opener(self) -> char {
        match self {
            Self::Modern => '<',
            Self::Legacy => '?',
        }
    }

    fn closer(self) -> char {
        match self {
            Self::Modern => '>',
            Self::Legacy => '?',
        }
    }
}

/// A substitution directive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandoNode {
    pub directive: Directive,
    pub format: Option<Format>,
}

/// A padding directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Padding {
    pub kind: PadKind,
    pub fill: char,
}

/// A directive tested for truthiness, choosing one of two branches
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub style: CondStyle,
    pub test: Directive,
    pub if_true: Vec<Node>,
    /// `None` when no `&` was written
    pub if_false: Option<Vec<Node>>,
}

// Nested branches are torn down from a heap stack so deep nesting cannot
// exhaust the call stack.
impl Drop for Condition {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.if_true);
        pending.extend(self.if_false.take().into_iter().flatten());
        while let Some(node) = pending.pop() {
            if let Node::Condition(mut cond) = node {
                pending.append(&mut cond.if_true);
                if let Some(mut if_false) = cond.if_false.take() {
                    pending.append(&mut if_false);
                }
            }
        }
    }
}

/// One element of a compiled format string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Text(String),
    Expando(ExpandoNode),
    Padding(Padding),
    Condition(Condition),
}

impl Node {
    /// Every directive referenced by this node, depth first.
    pub fn directives(&self) -> Vec<Directive> {
        let mut found = Vec::new();
        collect_directives(std::slice::from_ref(self), &mut found);
        found
    }
}

fn collect_directives(nodes: &[Node], found: &mut Vec<Directive>) {
    for node in nodes {
        match node {
            Node::Text(_) | Node::Padding(_) => {}
            Node::Expando(expando) => found.push(expando.directive),
            Node::Condition(cond) => {
                found.push(cond.test);
                collect_directives(&cond.if_true, found);
                if let Some(if_false) = &cond.if_false {
                    collect_directives(if_false, found);
                }
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.justify {
            Justify::Left => f.write_char('-')?,
            Justify::Center => f.write_char('=')?,
            Justify::Right => {}
        }
        if self.zero_pad {
            f.write_char('0')?;
        }
        if let Some(min) = self.min_cols {
            write!(f, "{min}")?;
        }
        if let Some(max) = self.max_cols {
            write!(f, ".{max}")?;
        }
        if self.lowercase {
            f.write_char('_')?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, std::slice::from_ref(self))
    }
}

/// Render a node sequence as canonical source text.
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_nodes(&mut out, nodes);
    out
}

fn write_nodes<W: Write>(out: &mut W, nodes: &[Node]) -> fmt::Result {
    let mut after_code = false;
    for node in nodes {
        match node {
            Node::Text(text) => write_text(out, text, after_code)?,
            Node::Expando(expando) => {
                out.write_char('%')?;
                if let Some(format) = &expando.format {
                    write!(out, "{format}")?;
                }
                out.write_str(expando.directive.code)?;
            }
            Node::Padding(padding) => {
                out.write_char('%')?;
                out.write_char(padding.kind.marker())?;
                write_char_escaped(out, padding.fill)?;
            }
            Node::Condition(cond) => {
                out.write_char('%')?;
                out.write_char(cond.style.opener())?;
                out.write_str(cond.test.code)?;
                out.write_char('?')?;
                write_nodes(out, &cond.if_true)?;
                if let Some(if_false) = &cond.if_false {
                    out.write_char('&')?;
                    write_nodes(out, if_false)?;
                }
                out.write_char(cond.style.closer())?;
            }
        }
        after_code = matches!(node, Node::Expando(_));
    }
    Ok(())
}

fn write_text<W: Write>(out: &mut W, text: &str, after_code: bool) -> fmt::Result {
    for (i, ch) in text.chars().enumerate() {
        match ch {
            '%' => out.write_str("%%")?,
            '\\' | '&' | '>' | '?' => {
                out.write_char('\\')?;
                out.write_char(ch)?;
            }
            // Text straight after a code could be read as a longer code
            _ if i == 0 && after_code => {
                out.write_char('\\')?;
                out.write_char(ch)?;
            }
            _ => out.write_char(ch)?,
        }
    }
    Ok(())
}

fn write_char_escaped<W: Write>(out: &mut W, ch: char) -> fmt::Result {
    match ch {
        '%' => out.write_str("%%"),
        '\\' => out.write_str("\\\\"),
        _ => out.write_char(ch),
    }
}
