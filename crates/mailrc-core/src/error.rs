//! Error types for mailrc-core

use mailrc_expando::ParseError;

use crate::types::TypeTag;
use crate::value::Value;

/// Result type for mailrc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry operations
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No variable of that name is registered
    #[error("Unknown option: {name}")]
    UnknownVariable { name: String },

    /// A definition names a type tag with no registered implementation
    #[error("Unknown config type: {tag}")]
    UnknownType { tag: TypeTag },

    #[error("Option {name} is already registered")]
    DuplicateVariable { name: String },

    #[error("Config type {tag} is already registered")]
    DuplicateType { tag: TypeTag },

    #[error("Invalid name: {name:?}")]
    InvalidName { name: String },

    /// The text of an expando value failed to compile
    #[error("Option {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("Option {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Option {name} expects a {expected} value, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A validator declined the candidate value
    #[error("Option {name}: {message}")]
    Rejected { name: String, message: String },

    #[error("Option {name} may not be empty")]
    EmptyValue { name: String },

    #[error("Option {name} may only be set at startup")]
    StartupOnly { name: String },

    #[error("Option {name} does not support '+='")]
    PlusEqualsUnsupported { name: String },

    #[error("The initial value of {name} can only be changed in the global scope")]
    InitialInScope { name: String },

    #[error("Unknown subset: {name}")]
    UnknownSubset { name: String },

    #[error("Subset {name} already exists")]
    DuplicateSubset { name: String },

    #[error("Subset {name} still has child subsets")]
    SubsetInUse { name: String },

    #[error("The global subset cannot be removed")]
    RootSubset,

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A rejected [`ConfigSet::native_set`](crate::ConfigSet::native_set).
///
/// The registry only takes ownership of a native value when the set
/// succeeds; on failure the value is handed back here.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct NativeSetError {
    pub error: Error,
    pub value: Value,
}

impl NativeSetError {
    pub fn new(error: Error, value: Value) -> Self {
        Self { error, value }
    }

    /// Drop the returned value, keeping the reason.
    pub fn into_error(self) -> Error {
        self.error
    }

    /// Take the value back.
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<NativeSetError> for Error {
    fn from(err: NativeSetError) -> Self {
        err.error
    }
}
