//! Recording observer

use std::sync::{Arc, Mutex, MutexGuard};

use mailrc_core::{ConfigSet, EventKind, EventMask, ObserverId};

/// An owned copy of a [`ConfigEvent`](mailrc_core::ConfigEvent)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: EventKind,
    pub name: String,
    pub scope: Option<String>,
    pub old: Option<String>,
    pub new: String,
}

/// Collects every event delivered to it.
///
/// ```
/// use mailrc_core::{ConfigDef, ConfigSet, EventKind, TypeTag};
/// use mailrc_test_utils::EventLog;
///
/// let mut cs = ConfigSet::new();
/// cs.register([ConfigDef::new("Apple", TypeTag::STRING)]).unwrap();
/// let log = EventLog::new();
/// log.attach(&mut cs);
///
/// cs.string_set("Apple", "red").unwrap();
/// assert_eq!(log.kinds(), vec![EventKind::Set]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<RecordedEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every event kind on `cs`.
    pub fn attach(&self, cs: &mut ConfigSet) -> ObserverId {
        self.attach_with(cs, EventMask::all())
    }

    pub fn attach_with(&self, cs: &mut ConfigSet, mask: EventMask) -> ObserverId {
        let sink = Arc::clone(&self.0);
        cs.observe(mask, move |event| {
            let record = RecordedEvent {
                kind: event.kind,
                name: event.name.to_string(),
                scope: event.scope.map(str::to_string),
                old: event.old.map(ToString::to_string),
                new: event.new.to_string(),
            };
            sink.lock().unwrap_or_else(|e| e.into_inner()).push(record);
        })
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.lock().iter().map(|e| e.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}
