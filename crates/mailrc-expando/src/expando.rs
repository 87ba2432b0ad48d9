//! The compiled expando value

use std::fmt;

use crate::definition::ExpandoDefinition;
use crate::error::Result;
use crate::node::{Node, render};
use crate::parser::parse;

/// A compiled format string.
///
/// The source text is kept alongside the tree so that rendering the value
/// back to text is exact. Two expandos are equal when their sources are
/// identical, which implies that their trees are equal too.
#[derive(Debug, Clone, Default)]
pub struct Expando {
    source: String,
    nodes: Vec<Node>,
}

impl Expando {
    /// Compile `source` against `defs`.
    ///
    /// An empty source compiles to an empty expando.
    pub fn parse(source: &str, defs: &[ExpandoDefinition]) -> Result<Self> {
        let nodes = parse(source, defs)?;
        tracing::trace!(source, nodes = nodes.len(), "Compiled expando");
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// The empty expando
    pub fn empty() -> Self {
        Self::default()
    }

    /// The exact source text this expando was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Compare the trees only, ignoring how the source was spelled.
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }

    /// Render the tree as canonical source text.
    pub fn to_canonical(&self) -> String {
        render(&self.nodes)
    }
}

impl PartialEq for Expando {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expando {}

impl fmt::Display for Expando {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
