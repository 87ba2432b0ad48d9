use mailrc_expando::Expando;

use crate::definition::ConfigDef;
use crate::error::{Error, Result};
use crate::value::Value;

use super::{ConfigType, mismatch};

/// Compiled format strings
///
/// Values compile against the directive table attached to the definition.
/// Equality is exact source equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandoType;

impl ExpandoType {
    fn compile(def: &ConfigDef, text: &str) -> Result<Expando> {
        Expando::parse(text, def.directives()).map_err(|source| Error::Parse {
            name: def.name.clone(),
            source,
        })
    }
}

impl ConfigType for ExpandoType {
    fn name(&self) -> &'static str {
        "expando"
    }

    fn string_set(&self, def: &ConfigDef, text: &str) -> Result<Value> {
        Ok(Value::Expando(Self::compile(def, text)?))
    }

    fn string_get(&self, value: &Value) -> String {
        value.to_string()
    }

    fn native_check(&self, def: &ConfigDef, value: &Value) -> Result<()> {
        match value {
            Value::Expando(_) => Ok(()),
            other => Err(mismatch(def, "expando", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Expando(exp) if exp.is_empty())
    }

    /// The fragment must compile on its own before it is appended.
    fn plus_equals(&self, def: &ConfigDef, current: &Value, text: &str) -> Result<Value> {
        let Value::Expando(current) = current else {
            return Err(mismatch(def, "expando", current));
        };
        Self::compile(def, text)?;
        let joined = join_fragment(current.as_str(), text);
        Ok(Value::Expando(Self::compile(def, &joined)?))
    }
}

/// Append `fragment` to `base`, separated by one space.
///
/// No space is added when either side is empty or when the junction is
/// already whitespace.
///
/// ```
/// use mailrc_core::types::join_fragment;
///
/// assert_eq!(join_fragment("%a %b", " %c"), "%a %b %c");
/// assert_eq!(join_fragment("%a", "%c"), "%a %c");
/// assert_eq!(join_fragment("", "%c"), "%c");
/// ```
pub fn join_fragment(base: &str, fragment: &str) -> String {
    if base.is_empty() {
        return fragment.to_string();
    }
    if fragment.is_empty() {
        return base.to_string();
    }

    let spaced = base.ends_with(char::is_whitespace) || fragment.starts_with(char::is_whitespace);
    let mut joined = String::with_capacity(base.len() + fragment.len() + 1);
    joined.push_str(base);
    if !spaced {
        joined.push(' ');
    }
    joined.push_str(fragment);
    joined
}
