use crate::error::{GraphError, Result};
use serde::Serialize;
use std::fmt;
use tracing::{trace, warn};

/// Visible rows `start..start + removed` were replaced by `inserted` new rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateEvent {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl UpdateEvent {
    /// Replace everything
    pub fn full(old_rows: usize, new_rows: usize) -> Self {
        Self {
            start: 0,
            removed: old_rows,
            inserted: new_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }

    /// Row count change this event causes
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback receiving update events. It gets no access to the model, so it
/// cannot re-enter a mutating call.
pub type Listener = Box<dyn FnMut(&UpdateEvent) -> anyhow::Result<()>>;

/// Synchronous listener registry.
///
/// Dispatch is fail-fast: listeners run in subscription order and the first
/// error stops delivery of that event to the remaining listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dispatch(&mut self, event: &UpdateEvent) -> Result<()> {
        trace!(?event, listeners = self.entries.len(), "dispatching update");
        for (id, listener) in &mut self.entries {
            if let Err(cause) = listener(event) {
                warn!(listener = %id, error = %cause, "update listener failed");
                return Err(GraphError::Listener { id: *id, cause });
            }
        }
        Ok(())
    }
}
