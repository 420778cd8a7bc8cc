//! Tool-call matching: every action keeps exactly one observation and
//! vice versa.
//!
//! Orphans appear in real histories for mundane reasons — a stream cut off
//! before the tool ran, a condenser that forgot one side of a pair, a retry
//! that re-issued a call id. The default mode silently filters orphans,
//! preserving relative order; strict mode reports them instead, for callers
//! that would rather fail the request than send a trimmed history.

use crate::error::ViewError;
use crate::event::{Event, ToolCallId};
use crate::view::indices::IndexSet;
use crate::view::property::ViewProperty;
use std::collections::HashMap;
use tracing::warn;

/// How unmatched tool calls are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingMode {
    /// Drop orphaned actions and observations silently.
    #[default]
    Lenient,
    /// Surface [`ViewError::Matching`] listing the unmatched ids.
    Strict,
}

/// See the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolCallMatchingProperty {
    mode: MatchingMode,
}

impl ToolCallMatchingProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: MatchingMode) -> Self {
        Self { mode }
    }
}

/// Count tool-call ids on one side of the bijection.
fn count_ids<'a>(
    events: &'a [Event],
    side: impl Fn(&Event) -> bool,
) -> HashMap<&'a ToolCallId, usize> {
    let mut counts = HashMap::new();
    for event in events {
        if side(event)
            && let Some(tool_call_id) = event.tool_call_id()
        {
            *counts.entry(tool_call_id).or_insert(0) += 1;
        }
    }
    counts
}

impl ViewProperty for ToolCallMatchingProperty {
    fn name(&self) -> &'static str {
        "tool_call_matching"
    }

    /// Matching works purely by filtering; it forbids no positions.
    fn safe_indices(&self, events: &[Event]) -> IndexSet {
        IndexSet::full(events.len())
    }

    fn validate(&self, _reference: &[Event], events: Vec<Event>) -> Result<Vec<Event>, ViewError> {
        let actions = count_ids(&events, Event::is_action);
        let observations = count_ids(&events, Event::is_observation);

        // Duplicate ids are degenerate but tolerated: matched as long as at
        // least one counterpart exists on the other side.
        for (tool_call_id, &count) in actions.iter().chain(observations.iter()) {
            if count > 1 {
                warn!(%tool_call_id, count, "duplicate tool call id in history");
            }
        }

        if self.mode == MatchingMode::Strict {
            let mut unmatched_actions: Vec<ToolCallId> = actions
                .keys()
                .filter(|id| !observations.contains_key(*id))
                .map(|&id| id.clone())
                .collect();
            let mut unmatched_observations: Vec<ToolCallId> = observations
                .keys()
                .filter(|id| !actions.contains_key(*id))
                .map(|&id| id.clone())
                .collect();
            if !unmatched_actions.is_empty() || !unmatched_observations.is_empty() {
                unmatched_actions.sort();
                unmatched_observations.sort();
                return Err(ViewError::Matching {
                    unmatched_actions,
                    unmatched_observations,
                });
            }
        }

        let keep: Vec<bool> = events
            .iter()
            .map(|event| {
                if event.is_action() {
                    event
                        .tool_call_id()
                        .is_some_and(|tc| observations.contains_key(tc))
                } else if event.is_observation() {
                    event
                        .tool_call_id()
                        .is_some_and(|tc| actions.contains_key(tc))
                } else {
                    // Everything that is not tool traffic is retained as-is.
                    true
                }
            })
            .collect();

        Ok(events
            .into_iter()
            .zip(keep)
            .filter_map(|(event, keep)| keep.then_some(event))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_pairs_pass_through() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::observation("e2", "t1", "ok"),
        ];
        let validated = ToolCallMatchingProperty::new()
            .validate(&events, events.clone())
            .unwrap();
        assert_eq!(validated, events);
    }

    #[test]
    fn orphan_action_is_filtered() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::observation("e2", "t1", "ok"),
            Event::action("e3", "r2", "t2", "grep", "{}"),
        ];
        let validated = ToolCallMatchingProperty::new()
            .validate(&events, events.clone())
            .unwrap();
        let ids: Vec<_> = validated.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
    }

    #[test]
    fn orphan_observation_is_filtered() {
        let events = vec![
            Event::observation("e1", "t1", "late result"),
            Event::user_message("e2", "hello"),
        ];
        let validated = ToolCallMatchingProperty::new()
            .validate(&events, events.clone())
            .unwrap();
        let ids: Vec<_> = validated.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e2"]);
    }

    #[test]
    fn non_tool_events_always_retained() {
        let events = vec![
            Event::system("e0", "prompt"),
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::assistant_message("e2", "thinking out loud"),
        ];
        let validated = ToolCallMatchingProperty::new()
            .validate(&events, events.clone())
            .unwrap();
        let ids: Vec<_> = validated.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e0", "e2"]);
    }

    #[test]
    fn duplicates_count_as_matched() {
        // Two actions share t1; one observation answers it. Degenerate but
        // tolerated: all three survive.
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::action("e2", "r2", "t1", "grep", "{}"),
            Event::observation("e3", "t1", "ok"),
        ];
        let validated = ToolCallMatchingProperty::new()
            .validate(&events, events.clone())
            .unwrap();
        assert_eq!(validated.len(), 3);
    }

    #[test]
    fn strict_mode_reports_unmatched_ids() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::observation("e2", "t2", "stray"),
        ];
        let err = ToolCallMatchingProperty::with_mode(MatchingMode::Strict)
            .validate(&events, events.clone())
            .unwrap_err();
        match err {
            ViewError::Matching {
                unmatched_actions,
                unmatched_observations,
            } => {
                assert_eq!(unmatched_actions, vec![ToolCallId::new("t1")]);
                assert_eq!(unmatched_observations, vec![ToolCallId::new("t2")]);
            }
            other => panic!("expected Matching error, got {other:?}"),
        }
    }

    #[test]
    fn strict_mode_passes_clean_histories() {
        let events = vec![
            Event::action("e1", "r1", "t1", "grep", "{}"),
            Event::observation("e2", "t1", "ok"),
        ];
        let validated = ToolCallMatchingProperty::with_mode(MatchingMode::Strict)
            .validate(&events, events.clone())
            .unwrap();
        assert_eq!(validated.len(), 2);
    }

    #[test]
    fn safe_indices_unrestricted() {
        let events = vec![Event::action("e1", "r1", "t1", "grep", "{}")];
        let safe = ToolCallMatchingProperty::new().safe_indices(&events);
        assert_eq!(safe.to_vec(), vec![0, 1]);
    }
}
