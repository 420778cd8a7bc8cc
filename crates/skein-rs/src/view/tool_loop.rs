//! Tool-loop atomicity: a thinking-anchored run of tool traffic is
//! indivisible.
//!
//! A tool loop begins at a batch whose first action carries non-empty
//! thinking blocks and extends forward through every consecutive action or
//! observation, in any interleaving. Cutting inside the span would separate
//! the model's recorded deliberation from the calls it justified, which
//! LLM APIs reject.
//!
//! This property only constrains indices. It never filters: removal
//! discipline inside loops falls out of batch atomicity plus the
//! calculator's intersection.

use crate::error::ViewError;
use crate::event::Event;
use crate::view::batch::ActionBatchIndex;
use crate::view::indices::IndexSet;
use crate::view::property::ViewProperty;

/// See the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolLoopAtomicityProperty;

/// Maximal loop spans `(start, end)` (inclusive event positions), merged
/// when two thinking batches anchor into the same tool-traffic run.
fn loop_spans(events: &[Event]) -> Vec<(usize, usize)> {
    let index = ActionBatchIndex::build(events);

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (_, batch) in index.iter() {
        if !batch.first_has_thinking {
            continue;
        }
        let start = batch.min_pos();
        let mut end = start;
        while end + 1 < events.len()
            && (events[end + 1].is_action() || events[end + 1].is_observation())
        {
            end += 1;
        }
        spans.push((start, end));
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, prev_end)) if start <= *prev_end => *prev_end = (*prev_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

impl ViewProperty for ToolLoopAtomicityProperty {
    fn name(&self) -> &'static str {
        "tool_loop_atomicity"
    }

    fn safe_indices(&self, events: &[Event]) -> IndexSet {
        let mut safe = IndexSet::full(events.len());
        for (start, end) in loop_spans(events) {
            // The loop start is a safe boundary; everything up to and
            // including the last event of the span is not.
            safe.remove_range(start + 1..end + 1);
        }
        safe
    }

    fn validate(&self, _reference: &[Event], events: Vec<Event>) -> Result<Vec<Event>, ViewError> {
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thinking() -> Vec<serde_json::Value> {
        vec![serde_json::json!({"text": "planning the next call"})]
    }

    #[test]
    fn loop_spans_consecutive_tool_traffic() {
        let events = vec![
            Event::user_message("e0", "go"),
            Event::action("e1", "r1", "t1", "grep", "{}").with_thinking(thinking()),
            Event::observation("e2", "t1", "ok"),
            Event::action("e3", "r2", "t2", "grep", "{}"),
            Event::observation("e4", "t2", "ok"),
            Event::assistant_message("e5", "done"),
        ];
        // Loop covers positions 1..=4.
        let safe = ToolLoopAtomicityProperty.safe_indices(&events);
        assert_eq!(safe.to_vec(), vec![0, 1, 5, 6]);
    }

    #[test]
    fn no_thinking_means_no_loops() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::observation("e2", "t1", "ok"),
            Event::action("e3", "r2", "t2", "grep", "{}"),
            Event::observation("e4", "t2", "ok"),
        ];
        let safe = ToolLoopAtomicityProperty.safe_indices(&events);
        assert_eq!(safe.count(), 5);
    }

    #[test]
    fn loop_ends_at_first_non_tool_event() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}").with_thinking(thinking()),
            Event::observation("e2", "t1", "ok"),
            Event::assistant_message("e3", "partial answer"),
            Event::action("e4", "r2", "t2", "grep", "{}"),
            Event::observation("e5", "t2", "ok"),
        ];
        // Loop is [0,1]; the message at 2 terminates it, and the second
        // batch has no thinking so no second loop starts.
        let safe = ToolLoopAtomicityProperty.safe_indices(&events);
        assert_eq!(safe.to_vec(), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn overlapping_loops_merge() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}").with_thinking(thinking()),
            Event::observation("e2", "t1", "ok"),
            Event::action("e3", "r2", "t2", "grep", "{}").with_thinking(thinking()),
            Event::observation("e4", "t2", "ok"),
        ];
        // Both loops extend to position 3; merged span is [0,3].
        let safe = ToolLoopAtomicityProperty.safe_indices(&events);
        assert_eq!(safe.to_vec(), vec![0, 4]);
    }

    #[test]
    fn validate_is_identity() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}").with_thinking(thinking()),
            Event::observation("e2", "t1", "ok"),
        ];
        let validated = ToolLoopAtomicityProperty
            .validate(&events, events.clone())
            .unwrap();
        assert_eq!(validated, events);
    }
}
