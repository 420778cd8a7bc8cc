//! Append-only event log.
//!
//! The log is the single source of truth for a conversation: events are
//! appended by collaborators (agent, tools, condenser) and never mutated or
//! reordered. Views are derived values computed from the log's current
//! contents and discarded after use.

use crate::error::ViewError;
use crate::event::{Event, EventId};
use std::collections::HashSet;

/// An ordered, append-only sequence of events with unique ids.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    ids: HashSet<EventId>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Rejects a duplicate [`EventId`] — two events with
    /// the same id would make condensation's forgotten-id matching
    /// ambiguous.
    pub fn push(&mut self, event: Event) -> Result<(), ViewError> {
        if !self.ids.insert(event.id.clone()) {
            return Err(ViewError::MalformedInput(format!(
                "duplicate event id: {}",
                event.id
            )));
        }
        self.events.push(event);
        Ok(())
    }

    /// Build a log from an existing sequence, checking id uniqueness.
    pub fn from_events(events: Vec<Event>) -> Result<Self, ViewError> {
        let mut log = Self::new();
        for event in events {
            log.push(event)?;
        }
        Ok(log)
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_id(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut log = EventLog::new();
        log.push(Event::user_message("e1", "first")).unwrap();
        log.push(Event::assistant_message("e2", "second")).unwrap();
        let ids: Vec<_> = log.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut log = EventLog::new();
        log.push(Event::user_message("e1", "first")).unwrap();
        let err = log.push(Event::user_message("e1", "again")).unwrap_err();
        assert!(matches!(err, ViewError::MalformedInput(_)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn from_events_checks_uniqueness() {
        let ok = EventLog::from_events(vec![
            Event::user_message("e1", "a"),
            Event::user_message("e2", "b"),
        ]);
        assert_eq!(ok.unwrap().len(), 2);

        let dup = EventLog::from_events(vec![
            Event::user_message("e1", "a"),
            Event::user_message("e1", "b"),
        ]);
        assert!(dup.is_err());
    }
}
