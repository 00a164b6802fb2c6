//! Deferred provider notifications.
//!
//! Creation/deletion notifications that arrive before the local manager
//! signals readiness are parked here and replayed, in arrival order,
//! through the same handlers as live notifications. The queue exists
//! only until the readiness transition; it is taken and discarded after
//! its single drain.

use account_bridge_provider::AccountId;

use std::collections::VecDeque;

/// One parked provider notification. The tag set is closed: anything
/// else is acted on immediately or dropped, never deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeferredEvent {
    /// A provider account appeared.
    Created(AccountId),
    /// A provider account was deleted.
    Deleted(AccountId),
}

/// FIFO buffer of [`DeferredEvent`]s.
///
/// Ordering across kinds is significant: a creation followed by a
/// deletion of the same account must replay as create-then-delete.
#[derive(Debug, Default)]
pub(crate) struct DeferredQueue {
    events: VecDeque<DeferredEvent>,
}

impl DeferredQueue {
    pub(crate) fn push(&mut self, event: DeferredEvent) {
        self.events.push_back(event);
    }

    pub(crate) fn pop(&mut self) -> Option<DeferredEvent> {
        self.events.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}
