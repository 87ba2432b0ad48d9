//! Change notification
//!
//! Observers subscribe to a mask of [`EventKind`]s and are called in-line,
//! in subscription order, after each stored change. They receive borrowed
//! values only: the old value is released once the callback returns.

use std::fmt;

use bitflags::bitflags;

use crate::definition::ConfigDef;
use crate::value::Value;

/// What happened to a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new value was stored
    Set,
    /// The value reverted to its default, or a scope dropped its override
    Reset,
    /// The default (initial) value was replaced
    InitialSet,
}

impl EventKind {
    fn mask(self) -> EventMask {
        match self {
            Self::Set => EventMask::SET,
            Self::Reset => EventMask::RESET,
            Self::InitialSet => EventMask::INITIAL_SET,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Reset => write!(f, "reset"),
            Self::InitialSet => write!(f, "initial-set"),
        }
    }
}

bitflags! {
    /// The event kinds an observer wants
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        const SET = 1 << 0;
        const RESET = 1 << 1;
        const INITIAL_SET = 1 << 2;
    }
}

/// A change to one variable
#[derive(Debug, Clone, Copy)]
pub struct ConfigEvent<'a> {
    pub kind: EventKind,
    /// The name as addressed, including any `scope:` prefix
    pub name: &'a str,
    /// The variable's registered name
    pub var: &'a str,
    /// `None` for the global scope
    pub scope: Option<&'a str>,
    pub def: &'a ConfigDef,
    /// The previous value in the affected scope, if it had one
    pub old: Option<&'a Value>,
    /// The value now seen from the affected scope
    pub new: &'a Value,
}

/// Handle returned by [`Notifier::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&ConfigEvent<'_>) + Send>;

struct Observer {
    id: ObserverId,
    mask: EventMask,
    callback: Callback,
}

/// Ordered list of observers
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Observer>,
    next_id: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe<F>(&mut self, mask: EventMask, callback: F) -> ObserverId
    where
        F: FnMut(&ConfigEvent<'_>) + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push(Observer {
            id,
            mask,
            callback: Box::new(callback),
        });
        tracing::trace!(?id, ?mask, "Observer added");
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    /// Deliver an event to every observer whose mask matches.
    pub fn publish(&mut self, event: &ConfigEvent<'_>) {
        let wanted = event.kind.mask();
        let mut delivered = 0usize;
        for observer in self
            .observers
            .iter_mut()
            .filter(|o| o.mask.contains(wanted))
        {
            (observer.callback)(event);
            delivered += 1;
        }
        tracing::trace!(kind = %event.kind, name = event.name, delivered, "Published config event");
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
