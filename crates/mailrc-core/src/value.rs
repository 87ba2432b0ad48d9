//! Native values held by the registry

use std::fmt;

use mailrc_expando::Expando;

/// The native form of a configuration value.
///
/// Each registered type stores its values in one of these variants. A type
/// may reuse a variant (a path type would store a `String`, for example).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Number(i64),
    String(String),
    /// Source text and compiled tree of a format string
    Expando(Expando),
}

impl Value {
    /// Short name of the variant, used in type-mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Expando(_) => "expando",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Expando(exp) => Some(exp.as_str()),
            _ => None,
        }
    }

    pub fn as_expando(&self) -> Option<&Expando> {
        match self {
            Self::Expando(exp) => Some(exp),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("yes"),
            Self::Bool(false) => f.write_str("no"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Expando(exp) => f.write_str(exp.as_str()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Expando> for Value {
    fn from(value: Expando) -> Self {
        Self::Expando(value)
    }
}
