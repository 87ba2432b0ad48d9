//! Configuration core of a terminal mail client.
//!
//! A [`ConfigSet`] is a registry of typed, named variables:
//!
//! - each variable has an immutable [`ConfigDef`] (type, default, flags,
//!   optional validator);
//! - value types plug in through the [`ConfigType`] trait, looked up by
//!   [`TypeTag`] when a variable is registered;
//! - scopes ([`SubsetId`]) form a tree; a child scope reads through to its
//!   parent until it overrides a variable, and a reset drops the override;
//! - observers are told about every stored change.
//!
//! # Example
//!
//! ```
//! use mailrc_core::{ConfigDef, ConfigSet, DefFlags, SubsetId, TypeTag};
//! use mailrc_expando::ExpandoDefinition;
//!
//! static INDEX: &[ExpandoDefinition] = &[
//!     ExpandoDefinition::new("d", "date", 1, 1),
//!     ExpandoDefinition::new("s", "subject", 1, 2),
//! ];
//!
//! let mut cs = ConfigSet::new();
//! cs.register([ConfigDef::new("index_format", TypeTag::EXPANDO)
//!     .initial("%d %s")
//!     .expando_defs(INDEX)
//!     .flags(DefFlags::NOT_EMPTY)])
//!     .unwrap();
//!
//! cs.subset_new("work", SubsetId::ROOT).unwrap();
//! cs.string_set("work:index_format", "%-10d %s").unwrap();
//!
//! assert_eq!(cs.string_get("index_format").unwrap(), "%d %s");
//! assert_eq!(cs.string_get("work:index_format").unwrap(), "%-10d %s");
//! assert!(cs.string_set("index_format", "%Q").is_err());
//! ```

pub mod definition;
pub mod dump;
pub mod error;
pub mod flags;
pub mod logging;
pub mod notify;
pub mod set;
pub mod subset;
pub mod types;
pub mod value;

pub use definition::{ConfigDef, TypeData, Validation, Validator};
pub use dump::{ConfigSnapshot, DumpEntry, DumpFlags};
pub use error::{Error, NativeSetError, Result};
pub use flags::DefFlags;
pub use notify::{ConfigEvent, EventKind, EventMask, ObserverId};
pub use set::{ConfigSet, SetStatus};
pub use subset::SubsetId;
pub use types::{ConfigType, TypeRegistry, TypeTag};
pub use value::Value;
