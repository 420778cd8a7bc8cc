//! The view builder: from raw log to LLM-safe projection.
//!
//! One invocation runs three validation passes in a fixed order —
//! condensation, then tool-call matching, then batch-atomicity propagation —
//! and produces a [`View`] whose event sequence satisfies every structural
//! invariant an LLM API checks. Condensation runs first so the later passes
//! see the post-forgetting id set; batch propagation runs last so it can
//! sweep up whatever the earlier passes removed.
//!
//! Manipulation indices are computed over the **raw** sequence, not the
//! validated one: the condenser uses them to choose cut points in the
//! original history, and the `forgotten_ids` it emits must name raw events.
//!
//! The builder retains nothing between invocations; a `View` is a pure
//! function of its input.

use crate::error::ViewError;
use crate::event::Event;
use crate::view::batch_atomicity::BatchAtomicityProperty;
use crate::view::condensation::CondensationProperty;
use crate::view::indices::ManipulationIndices;
use crate::view::matching::{MatchingMode, ToolCallMatchingProperty};
use crate::view::property::ViewProperty;
use crate::view::tool_loop::ToolLoopAtomicityProperty;
use tracing::debug;

/// Flags describing aspects of the projection that the caller may need to
/// act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFlags {
    /// The condenser has been asked to shrink the context and has not yet
    /// committed. Callers typically skip issuing new condensation requests
    /// while this is set.
    pub unhandled_condensation_request: bool,
    /// The summary text inserted by the most recent condensation, if any.
    pub most_recent_summary: Option<String>,
}

/// A validated projection of a raw event log: safe to format and submit to
/// an LLM API. Owned by the caller; the raw log is never aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    events: Vec<Event>,
    flags: ViewFlags,
}

impl View {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn flags(&self) -> &ViewFlags {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Composes the four view properties into a single projection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewBuilder {
    matching_mode: MatchingMode,
}

impl ViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select strict or lenient tool-call matching (lenient by default).
    pub fn with_matching_mode(mut self, mode: MatchingMode) -> Self {
        self.matching_mode = mode;
        self
    }

    /// Project `events` into a validated [`View`].
    pub fn build(&self, events: &[Event]) -> Result<View, ViewError> {
        let outcome = CondensationProperty.apply(events);
        debug!(
            raw = events.len(),
            condensed = outcome.events.len(),
            "condensation applied"
        );

        let matched = ToolCallMatchingProperty::with_mode(self.matching_mode)
            .validate(events, outcome.events)?;
        let validated = BatchAtomicityProperty.validate(events, matched)?;
        debug!(validated = validated.len(), "view validated");

        #[cfg(debug_assertions)]
        check_postconditions(&validated);

        Ok(View {
            events: validated,
            flags: ViewFlags {
                unhandled_condensation_request: outcome.unhandled_request,
                most_recent_summary: outcome.summary,
            },
        })
    }

    /// Safe cut/insertion positions in the raw sequence: the intersection
    /// of every property's safe indices.
    pub fn manipulation_indices(&self, events: &[Event]) -> ManipulationIndices {
        let matching = ToolCallMatchingProperty::with_mode(self.matching_mode);
        let properties: [&dyn ViewProperty; 4] = [
            &CondensationProperty,
            &matching,
            &BatchAtomicityProperty,
            &ToolLoopAtomicityProperty,
        ];
        ManipulationIndices::compute(&properties, events)
    }
}

/// Project `events` with the default (lenient) builder.
pub fn build_view(events: &[Event]) -> Result<View, ViewError> {
    ViewBuilder::new().build(events)
}

/// Manipulation indices for `events` with the default builder.
pub fn manipulation_indices(events: &[Event]) -> ManipulationIndices {
    ViewBuilder::new().manipulation_indices(events)
}

/// Post-condition checks. A failure here is an engine bug, never expected
/// on any input, so release builds skip the pass entirely.
#[cfg(debug_assertions)]
fn check_postconditions(validated: &[Event]) {
    use std::collections::HashSet;

    debug_assert!(
        validated.iter().all(|e| !e.is_meta()),
        "meta-event leaked into a validated view"
    );

    let action_ids: HashSet<_> = validated
        .iter()
        .filter(|e| e.is_action())
        .filter_map(Event::tool_call_id)
        .collect();
    let observation_ids: HashSet<_> = validated
        .iter()
        .filter(|e| e.is_observation())
        .filter_map(Event::tool_call_id)
        .collect();
    debug_assert!(
        action_ids == observation_ids,
        "tool-call bijection broken after validation"
    );
}
