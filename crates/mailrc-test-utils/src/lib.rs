//! Shared test utilities for the mailrc workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fruit`]: the "fruit" variable list and a ready-made registry
//! - [`validators`]: canned validators, including one switched by a [`validators::Gate`]
//! - [`events`]: [`events::EventLog`], an observer that records what it sees

pub mod events;
pub mod fruit;
pub mod validators;

pub use events::{EventLog, RecordedEvent};
pub use fruit::{FruitFixture, TEST_FORMAT_DEFS, fruit_definitions};
pub use validators::Gate;
