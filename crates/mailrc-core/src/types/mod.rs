//! Value-type dispatch table
//!
//! Every variable names a [`TypeTag`]. The registry resolves the tag to a
//! [`ConfigType`] implementation once, when the variable is registered, and
//! dispatches all conversions through that object afterwards.

mod boolean;
mod expando;
mod number;
mod string;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::ConfigDef;
use crate::error::{Error, Result};
use crate::value::Value;

pub use boolean::BoolType;
pub use expando::{ExpandoType, join_fragment};
pub use number::NumberType;
pub use string::StringType;

/// Small integer naming a value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub u16);

impl TypeTag {
    pub const BOOL: Self = Self(1);
    pub const NUMBER: Self = Self(2);
    pub const STRING: Self = Self(3);
    pub const EXPANDO: Self = Self(4);
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations a value type provides to the registry.
///
/// Only parsing and rendering are required; the other operations have
/// defaults that suit most types.
pub trait ConfigType: fmt::Debug + Send + Sync {
    /// Name shown in dumps, e.g. `"expando"`
    fn name(&self) -> &'static str;

    /// Parse the textual form of a value.
    fn string_set(&self, def: &ConfigDef, text: &str) -> Result<Value>;

    /// Render a value to its textual form.
    fn string_get(&self, value: &Value) -> String;

    /// Check that a native value belongs to this type.
    fn native_check(&self, def: &ConfigDef, value: &Value) -> Result<()>;

    /// Whether a value counts as empty for [`DefFlags::NOT_EMPTY`](crate::DefFlags::NOT_EMPTY).
    fn is_empty(&self, value: &Value) -> bool;

    fn native_get<'a>(&self, value: &'a Value) -> &'a Value {
        value
    }

    fn equal(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    /// Build the value a reset restores, from the default text.
    fn reset(&self, def: &ConfigDef, initial: &str) -> Result<Value> {
        self.string_set(def, initial)
    }

    /// Combine the current value with a fragment for `+=`.
    fn plus_equals(&self, def: &ConfigDef, _current: &Value, _text: &str) -> Result<Value> {
        Err(Error::PlusEqualsUnsupported {
            name: def.name.clone(),
        })
    }

    /// Whether dumps quote the textual form
    fn quoted(&self) -> bool {
        true
    }

    /// Release a value that is being replaced.
    fn destroy(&self, value: Value) {
        drop(value);
    }
}

/// Mapping from [`TypeTag`] to its implementation
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeTag, Arc<dyn ConfigType>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Create a registry with the built-in types registered.
    ///
    /// Currently registers:
    /// - [`TypeTag::BOOL`] -> [`BoolType`]
    /// - [`TypeTag::NUMBER`] -> [`NumberType`]
    /// - [`TypeTag::STRING`] -> [`StringType`]
    /// - [`TypeTag::EXPANDO`] -> [`ExpandoType`]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(TypeTag, Arc<dyn ConfigType>); 4] = [
            (TypeTag::BOOL, Arc::new(BoolType)),
            (TypeTag::NUMBER, Arc::new(NumberType)),
            (TypeTag::STRING, Arc::new(StringType)),
            (TypeTag::EXPANDO, Arc::new(ExpandoType)),
        ];
        for (tag, ty) in builtins {
            registry.types.insert(tag, ty);
        }
        registry
    }

    /// Install an implementation for a tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the tag is already taken.
    pub fn register(&mut self, tag: TypeTag, ty: Arc<dyn ConfigType>) -> Result<()> {
        if self.types.contains_key(&tag) {
            return Err(Error::DuplicateType { tag });
        }
        tracing::debug!(%tag, name = ty.name(), "Registered config type");
        self.types.insert(tag, ty);
        Ok(())
    }

    /// Look up the implementation of a tag.
    pub fn get(&self, tag: TypeTag) -> Result<Arc<dyn ConfigType>> {
        self.types
            .get(&tag)
            .cloned()
            .ok_or(Error::UnknownType { tag })
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.types.contains_key(&tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self.types.keys().copied().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// The mismatch error for a value of the wrong variant.
pub(crate) fn mismatch(def: &ConfigDef, expected: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        name: def.name.clone(),
        expected,
        found: value.kind(),
    }
}
