//! Batch atomicity: actions from one LLM response live or die together.
//!
//! An LLM API rejects a history in which a response's tool calls are
//! partially present, so when any upstream pass (condensation, orphan
//! filtering) removes one action of a batch, this property removes the rest
//! of the batch — and the observations paired with the removed actions, so
//! the tool-call bijection survives the propagation.
//!
//! For index computation, the positions strictly between a batch's first
//! and last action are unsafe: a cut there would strand part of the batch.

use crate::error::ViewError;
use crate::event::{Event, EventId, ToolCallId};
use crate::view::batch::ActionBatchIndex;
use crate::view::indices::IndexSet;
use crate::view::property::ViewProperty;
use std::collections::HashSet;
use tracing::debug;

/// See the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchAtomicityProperty;

/// Collect per-batch `[min_pos, max_pos]` extents, merging overlapping
/// extents (overlap only happens on pathological interleaved input).
fn merged_extents(index: &ActionBatchIndex) -> Vec<(usize, usize)> {
    let mut extents: Vec<(usize, usize)> = index
        .iter()
        .map(|(_, batch)| (batch.min_pos(), batch.max_pos()))
        .collect();
    extents.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(extents.len());
    for (min, max) in extents {
        match merged.last_mut() {
            Some((_, prev_max)) if min <= *prev_max => *prev_max = (*prev_max).max(max),
            _ => merged.push((min, max)),
        }
    }
    merged
}

impl ViewProperty for BatchAtomicityProperty {
    fn name(&self) -> &'static str {
        "batch_atomicity"
    }

    fn safe_indices(&self, events: &[Event]) -> IndexSet {
        let index = ActionBatchIndex::build(events);
        let mut safe = IndexSet::full(events.len());
        for (min, max) in merged_extents(&index) {
            // Positions strictly inside the extent. The extent boundaries
            // themselves stay safe: a cut there keeps the batch whole.
            safe.remove_range(min + 1..max);
        }
        safe
    }

    fn validate(&self, reference: &[Event], events: Vec<Event>) -> Result<Vec<Event>, ViewError> {
        let index = ActionBatchIndex::build(reference);
        let present: HashSet<&EventId> = events.iter().map(|e| &e.id).collect();

        // A batch is broken when any of its actions was removed upstream.
        let mut drop_actions: HashSet<&EventId> = HashSet::new();
        let mut drop_tool_calls: HashSet<&ToolCallId> = HashSet::new();
        for (response_id, batch) in index.iter() {
            let broken = batch
                .positions
                .iter()
                .any(|&pos| !present.contains(&reference[pos].id));
            if !broken {
                continue;
            }
            debug!(batch = %response_id, actions = batch.positions.len(), "removing broken batch");
            for &pos in &batch.positions {
                let action = &reference[pos];
                drop_actions.insert(&action.id);
                if let Some(tool_call_id) = action.tool_call_id() {
                    drop_tool_calls.insert(tool_call_id);
                }
            }
        }

        if drop_actions.is_empty() {
            return Ok(events);
        }

        Ok(events
            .into_iter()
            .filter(|event| {
                if event.is_action() {
                    !drop_actions.contains(&event.id)
                } else if event.is_observation() {
                    event
                        .tool_call_id()
                        .is_none_or(|tc| !drop_tool_calls.contains(tc))
                } else {
                    true
                }
            })
            .collect())
    }
}
