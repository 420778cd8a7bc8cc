//! Condenser policies: deciding what to forget.
//!
//! The engine computes *where* a history may safely be cut; a condenser
//! decides *whether* and *what* to cut, and records the decision as a
//! `Condensation` event appended to the log. This module provides the
//! [`Condenser`] trait and one batteries-included policy:
//!
//! - [`RollingCondenser`] — dual-threshold: once the log exceeds
//!   `max_events`, forget the span between a pinned head (system prompt,
//!   original task) and a raw recency window, snapping both cut points to
//!   the nearest safe manipulation index. Produces a deterministic digest
//!   summary with no LLM call.
//!
//! Callers that want an LLM-written summary instead build a prompt pair
//! with [`summarization_request`], run the completion themselves, and
//! construct the `Condensation` event from the response.

use crate::event::{Event, EventId, EventKind};
use crate::view::manipulation_indices;
use std::collections::HashSet;
use tracing::debug;

/// Default log length that triggers condensation.
const DEFAULT_MAX_EVENTS: usize = 160;

/// Default number of leading events pinned through every condensation.
const DEFAULT_KEEP_HEAD: usize = 4;

/// Default number of trailing events kept at full fidelity.
const DEFAULT_KEEP_RECENT: usize = 32;

/// The prompt used when a caller wants an LLM-written condensation summary.
const CONDENSATION_PROMPT: &str = "\
Summarize the following conversation events concisely. Focus on:
- What was accomplished (completed subtasks, files modified)
- Key findings and decisions made
- Failed approaches (what was tried and why it failed)
- Identifiers, file paths, and error messages, verbatim
- What remains to be done

Rules:
- Only include facts explicitly stated in the events. Do not infer or extrapolate.
- Be concise — every token must earn its place.
- The result must be a standalone summary; the events it covers will be \
  removed from the conversation entirely.";

/// A policy that inspects a log and may decide to condense it.
pub trait Condenser {
    /// Inspect `events` and return a ready-to-append `Condensation` event,
    /// or `None` when no condensation is warranted.
    fn condense(&self, events: &[Event]) -> Option<Event>;
}

/// Dual-threshold forgetting policy. See the module docs.
#[derive(Debug, Clone)]
pub struct RollingCondenser {
    max_events: usize,
    keep_head: usize,
    keep_recent: usize,
}

impl Default for RollingCondenser {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            keep_head: DEFAULT_KEEP_HEAD,
            keep_recent: DEFAULT_KEEP_RECENT,
        }
    }
}

impl RollingCondenser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log length that triggers condensation.
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the number of leading events pinned through every condensation.
    pub fn with_keep_head(mut self, head: usize) -> Self {
        self.keep_head = head;
        self
    }

    /// Set the number of trailing events kept at full fidelity.
    pub fn with_keep_recent(mut self, recent: usize) -> Self {
        self.keep_recent = recent;
        self
    }
}

impl Condenser for RollingCondenser {
    fn condense(&self, events: &[Event]) -> Option<Event> {
        if events.len() <= self.max_events {
            return None;
        }

        // Snap both ends of the forgotten span to safe cut points: the
        // head boundary forward from keep_head, the tail boundary forward
        // from the start of the desired recency window.
        let indices = manipulation_indices(events);
        let start = indices.next_index(self.keep_head, false);
        let desired = events.len().saturating_sub(self.keep_recent);
        let cut = indices.next_index(desired, false);
        if cut <= start {
            return None;
        }

        let span = &events[start..cut];
        let forgotten: Vec<EventId> = span
            .iter()
            .filter(|e| !e.is_meta())
            .map(|e| e.id.clone())
            .collect();
        if forgotten.is_empty() {
            return None;
        }

        // The summary lands where the forgotten span began, counted over
        // the events that survive the projection.
        let already_forgotten = forgotten_union(events);
        let summary_offset = events[..start]
            .iter()
            .filter(|e| !e.is_meta() && !already_forgotten.contains(&e.id))
            .count();

        let sequence = events.iter().filter(|e| e.is_meta()).count() + 1;
        let summary = digest(span);
        debug!(
            forgotten = forgotten.len(),
            start, cut, summary_offset, "rolling condensation"
        );

        Some(Event::condensation(
            EventId::new(format!("condensation-{sequence}")),
            forgotten,
            Some(summary),
            summary_offset,
        ))
    }
}

/// Union of forgotten ids across every condensation already in the log.
fn forgotten_union(events: &[Event]) -> HashSet<&EventId> {
    let mut union = HashSet::new();
    for event in events {
        if let EventKind::Condensation { forgotten, .. } = &event.kind {
            union.extend(forgotten.iter());
        }
    }
    union
}

/// A deterministic one-line summary of a forgotten span.
fn digest(span: &[Event]) -> String {
    let mut messages = 0usize;
    let mut calls = 0usize;
    let mut tools: Vec<&str> = Vec::new();
    for event in span {
        match &event.kind {
            EventKind::Message { .. } | EventKind::System { .. } => messages += 1,
            EventKind::Action { tool_name, .. } => {
                calls += 1;
                if !tools.contains(&tool_name.as_str()) {
                    tools.push(tool_name);
                }
            }
            _ => {}
        }
    }
    if tools.is_empty() {
        format!("Condensed {messages} earlier message(s).")
    } else if messages == 0 {
        format!(
            "Condensed {calls} earlier tool call(s) ({}).",
            tools.join(", ")
        )
    } else {
        format!(
            "Condensed {messages} earlier message(s) and {calls} tool call(s) ({}).",
            tools.join(", ")
        )
    }
}

/// Build a `(system, user)` prompt pair asking an LLM to summarize `span`.
pub fn summarization_request(span: &[Event]) -> (String, String) {
    let mut content = String::new();
    for event in span {
        match &event.kind {
            EventKind::System { content: text } => {
                content.push_str(&format!("[system]: {text}\n\n"));
            }
            EventKind::Message { source, content: text } => {
                content.push_str(&format!("[{source:?}]: {text}\n\n"));
            }
            EventKind::Action {
                tool_name,
                arguments,
                ..
            } => {
                content.push_str(&format!("[tool call]: {tool_name}({arguments})\n\n"));
            }
            EventKind::Observation { content: text, .. } => {
                content.push_str(&format!("[tool result]: {text}\n\n"));
            }
            EventKind::CondensationRequest | EventKind::Condensation { .. } => {}
        }
    }
    (CONDENSATION_PROMPT.to_string(), content)
}
