//! Expando format-string compiler.
//!
//! Users customise how index lines, status bars and headers are drawn with
//! printf-like format strings. This crate compiles such a string against a
//! per-feature table of directives into an immutable tree:
//!
//! ```text
//! "%-10.10a %<b?[%b]&none>%>-"
//!   |          |              |
//!   |          |              +-- padding: hard fill with '-'
//!   |          +-- conditional on %b, with an else branch
//!   +-- %a, left-justified, 10 columns minimum and maximum
//! ```
//!
//! Rendering the tree to screen text belongs to the display layer.
//!
//! # Example
//!
//! ```
//! use mailrc_expando::{Expando, ExpandoDefinition};
//!
//! static DEFS: &[ExpandoDefinition] = &[
//!     ExpandoDefinition::new("a", "aardvark", 1, 100),
//!     ExpandoDefinition::new("b", "badger", 1, 101),
//! ];
//!
//! let exp = Expando::parse("%a %<b?[%b]>", DEFS).unwrap();
//! assert_eq!(exp.as_str(), "%a %<b?[%b]>");
//! assert!(Expando::parse("%Q", DEFS).is_err());
//! ```

pub mod definition;
pub mod error;
pub mod expando;
pub mod lexer;
pub mod node;
pub mod parser;

pub use definition::ExpandoDefinition;
pub use error::{ParseError, ParseErrorKind, Result};
pub use expando::Expando;
pub use node::{
    CondStyle, Condition, Directive, ExpandoNode, Format, Justify, Node, PadKind, Padding, render,
};
pub use parser::parse;
