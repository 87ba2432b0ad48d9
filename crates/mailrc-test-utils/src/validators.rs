//! Canned validators

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mailrc_core::{ConfigDef, Validation, Value};

/// Always refuses.
pub fn fail(def: &ConfigDef, value: &Value) -> Validation {
    Validation::Reject(format!("{}: validator_fail refused '{value}'", def.name))
}

/// Accepts with a warning.
pub fn warn(def: &ConfigDef, value: &Value) -> Validation {
    Validation::Warn(format!("{}: validator_warn saw '{value}'", def.name))
}

/// Always accepts.
pub fn succeed(_def: &ConfigDef, _value: &Value) -> Validation {
    Validation::Accept
}

/// A shared switch that turns a [`gated`] validator off.
///
/// Clones share the same switch.
#[derive(Debug, Clone, Default)]
pub struct Gate(Arc<AtomicBool>);

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// While open, gated validators accept everything.
    pub fn open(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Refuses like [`fail`] unless `gate` is open.
pub fn gated(gate: &Gate) -> impl Fn(&ConfigDef, &Value) -> Validation + Send + Sync + 'static {
    let gate = gate.clone();
    move |def: &ConfigDef, value: &Value| {
        if gate.is_open() {
            Validation::Accept
        } else {
            fail(def, value)
        }
    }
}
