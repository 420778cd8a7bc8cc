//! Condensation: apply the condenser's forget-and-summarize commits.
//!
//! Every `Condensation` event names a set of events to forget and may carry
//! a summary to stand in for them. This property removes the forgotten
//! events, strips the meta-events themselves, and inserts the most recent
//! non-empty summary as a synthetic assistant message at its recorded
//! offset (counted over the sequence that remains after removals).
//!
//! Edge policy: a later Condensation supersedes an earlier one at the same
//! offset; an out-of-range offset is clamped silently; an empty summary
//! inserts nothing.

use crate::error::ViewError;
use crate::event::{Event, EventId, EventKind};
use crate::view::indices::IndexSet;
use crate::view::property::ViewProperty;
use std::collections::HashSet;
use tracing::{debug, warn};

/// See the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CondensationProperty;

/// Result of applying condensation to a sequence.
#[derive(Debug)]
pub struct CondensationOutcome {
    /// Surviving events, with the summary message inserted if one applied.
    pub events: Vec<Event>,
    /// True when the last meta-event is a `CondensationRequest` with no
    /// `Condensation` after it — the condenser owes the log a commit.
    pub unhandled_request: bool,
    /// The summary text that was inserted, if any.
    pub summary: Option<String>,
}

impl CondensationProperty {
    /// Apply every condensation commit in `events`, in input order.
    pub fn apply(&self, events: &[Event]) -> CondensationOutcome {
        let mut forgotten: HashSet<&EventId> = HashSet::new();
        let mut unhandled_request = false;
        // (source condensation, summary, offset): latest non-empty wins.
        let mut chosen: Option<(&Event, &str, usize)> = None;

        for event in events {
            match &event.kind {
                EventKind::CondensationRequest => unhandled_request = true,
                EventKind::Condensation {
                    forgotten: ids,
                    summary,
                    summary_offset,
                } => {
                    unhandled_request = false;
                    forgotten.extend(ids.iter());
                    if let Some(text) = summary.as_deref()
                        && !text.is_empty()
                    {
                        if let Some((prev, _, _)) = chosen {
                            debug!(superseded = %prev.id, by = %event.id, "summary superseded");
                        }
                        chosen = Some((event, text, *summary_offset));
                    }
                }
                _ => {}
            }
        }

        let mut survivors: Vec<Event> = events
            .iter()
            .filter(|e| !e.is_meta() && !forgotten.contains(&e.id))
            .cloned()
            .collect();

        let summary = chosen.map(|(source, text, offset)| {
            let position = offset.min(survivors.len());
            if offset > survivors.len() {
                warn!(offset, len = survivors.len(), "summary offset out of range, clamping");
            }
            // The synthetic message inherits the commit's timestamp and a
            // derived id, so replaying the same log reproduces it exactly.
            let mut message = Event::assistant_message(source.id.derived("summary"), text);
            message.timestamp = source.timestamp;
            survivors.insert(position, message);
            text.to_string()
        });

        CondensationOutcome {
            events: survivors,
            unhandled_request,
            summary,
        }
    }
}

impl ViewProperty for CondensationProperty {
    fn name(&self) -> &'static str {
        "condensation"
    }

    /// Condensation works purely by filtering and positional insertion; it
    /// forbids no positions.
    fn safe_indices(&self, events: &[Event]) -> IndexSet {
        IndexSet::full(events.len())
    }

    fn validate(&self, _reference: &[Event], events: Vec<Event>) -> Result<Vec<Event>, ViewError> {
        Ok(self.apply(&events).events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn forgotten_events_and_meta_are_dropped() {
        let events = vec![
            Event::user_message("e0", "keep"),
            Event::user_message("e1", "forget me"),
            Event::assistant_message("e2", "keep too"),
            Event::condensation("c1", vec![EventId::new("e1")], None, 0),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(ids(&outcome.events), ["e0", "e2"]);
        assert!(outcome.summary.is_none());
        assert!(!outcome.unhandled_request);
    }

    #[test]
    fn summary_inserted_at_offset_after_removals() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::user_message("e1", "b"),
            Event::user_message("e5", "forgotten"),
            Event::user_message("e7", "forgotten"),
            Event::user_message("e10", "c"),
            Event::condensation(
                "c1",
                vec![EventId::new("e5"), EventId::new("e7")],
                Some("Earlier, the agent explored the repo.".into()),
                2,
            ),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(ids(&outcome.events), ["e0", "e1", "c1/summary", "e10"]);
        assert_eq!(
            outcome.summary.as_deref(),
            Some("Earlier, the agent explored the repo.")
        );

        let EventKind::Message { source, content } = &outcome.events[2].kind else {
            panic!("summary should be a message event");
        };
        assert_eq!(*source, crate::event::MessageSource::Assistant);
        assert!(content.contains("explored the repo"));
    }

    #[test]
    fn forgotten_ids_union_across_commits() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::user_message("e1", "b"),
            Event::condensation("c1", vec![EventId::new("e0")], None, 0),
            Event::user_message("e2", "c"),
            Event::condensation("c2", vec![EventId::new("e2")], None, 0),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(ids(&outcome.events), ["e1"]);
    }

    #[test]
    fn latest_nonempty_summary_wins() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::condensation("c1", vec![], Some("old summary".into()), 0),
            Event::condensation("c2", vec![], Some("new summary".into()), 0),
            // A later summary-less commit does not unseat the chosen one.
            Event::condensation("c3", vec![], None, 0),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(outcome.summary.as_deref(), Some("new summary"));
        assert_eq!(ids(&outcome.events), ["c2/summary", "e0"]);
    }

    #[test]
    fn empty_summary_inserts_nothing() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::condensation("c1", vec![], Some(String::new()), 0),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(ids(&outcome.events), ["e0"]);
        assert!(outcome.summary.is_none());
    }

    #[test]
    fn out_of_range_offset_clamps_to_end() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::condensation("c1", vec![], Some("tail summary".into()), 99),
        ];
        let outcome = CondensationProperty.apply(&events);
        assert_eq!(ids(&outcome.events), ["e0", "c1/summary"]);
    }

    #[test]
    fn unhandled_request_flag() {
        let pending = vec![
            Event::user_message("e0", "a"),
            Event::condensation_request("q1"),
        ];
        assert!(CondensationProperty.apply(&pending).unhandled_request);

        let handled = vec![
            Event::user_message("e0", "a"),
            Event::condensation_request("q1"),
            Event::condensation("c1", vec![], None, 0),
        ];
        assert!(!CondensationProperty.apply(&handled).unhandled_request);
    }

    #[test]
    fn validate_is_idempotent() {
        let events = vec![
            Event::user_message("e0", "a"),
            Event::user_message("e1", "b"),
            Event::condensation("c1", vec![EventId::new("e0")], Some("sum".into()), 0),
        ];
        let once = CondensationProperty.validate(&events, events.clone()).unwrap();
        let twice = CondensationProperty.validate(&once, once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
