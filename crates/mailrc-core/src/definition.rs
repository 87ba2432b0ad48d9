//! Immutable variable definitions
//!
//! A [`ConfigDef`] describes one variable: its name, type, default text,
//! flags, type-specific data and an optional validator. Definitions are
//! built once per subsystem and handed to
//! [`ConfigSet::register`](crate::ConfigSet::register).

use std::fmt;
use std::sync::Arc;

use mailrc_expando::ExpandoDefinition;

use crate::flags::DefFlags;
use crate::types::TypeTag;
use crate::value::Value;

/// Outcome of a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accept,
    /// The value is stored, and the message shown to the user
    Warn(String),
    /// The value is refused; the previous value is kept
    Reject(String),
}

/// Checks a candidate value before it is stored.
pub type Validator = Arc<dyn Fn(&ConfigDef, &Value) -> Validation + Send + Sync>;

/// Type-specific data attached to a definition
#[derive(Debug, Clone, Copy, Default)]
pub enum TypeData {
    #[default]
    None,
    /// Directive table used to compile an expando value
    Expando(&'static [ExpandoDefinition]),
}

/// Definition of a configuration variable.
///
/// # Example
///
/// ```
/// use mailrc_core::{ConfigDef, DefFlags, TypeTag};
///
/// let def = ConfigDef::new("status_format", TypeTag::EXPANDO)
///     .initial("%a %b")
///     .flags(DefFlags::NOT_EMPTY);
/// assert_eq!(def.name, "status_format");
/// assert!(def.flags.contains(DefFlags::NOT_EMPTY));
/// ```
#[derive(Clone)]
pub struct ConfigDef {
    pub name: String,
    pub type_tag: TypeTag,
    pub flags: DefFlags,
    /// Default value, in its textual form
    pub initial: String,
    pub data: TypeData,
    pub validator: Option<Validator>,
    /// One-line description
    pub docs: Option<String>,
}

impl ConfigDef {
    /// Create a definition with an empty default and no flags.
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            flags: DefFlags::empty(),
            initial: String::new(),
            data: TypeData::None,
            validator: None,
            docs: None,
        }
    }

    pub fn initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = initial.into();
        self
    }

    pub fn flags(mut self, flags: DefFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach the directive table an expando value is compiled against.
    pub fn expando_defs(mut self, defs: &'static [ExpandoDefinition]) -> Self {
        self.data = TypeData::Expando(defs);
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&ConfigDef, &Value) -> Validation + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    /// The directive table, empty unless one was attached.
    pub fn directives(&self) -> &'static [ExpandoDefinition] {
        match self.data {
            TypeData::Expando(defs) => defs,
            TypeData::None => &[],
        }
    }

    /// Run the validator, if any, against a candidate.
    pub fn validate(&self, value: &Value) -> Validation {
        match &self.validator {
            Some(validator) => validator(self, value),
            None => Validation::Accept,
        }
    }

    pub fn is_sensitive(&self) -> bool {
        self.flags.contains(DefFlags::SENSITIVE)
    }
}

impl fmt::Debug for ConfigDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDef")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("flags", &self.flags)
            .field("initial", &self.initial)
            .field("data", &self.data)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("docs", &self.docs)
            .finish()
    }
}
