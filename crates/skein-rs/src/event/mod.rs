//! Event records for an agent–LLM conversation log.
//!
//! An [`Event`] is a stable-id record with a tagged [`EventKind`] payload.
//! Six kinds exist:
//!
//! | Kind | Produced by | Sent to the LLM? |
//! |------|-------------|------------------|
//! | `System` | agent setup | yes |
//! | `Message` | user or assistant | yes |
//! | `Action` | LLM tool call | yes |
//! | `Observation` | tool execution | yes |
//! | `CondensationRequest` | context manager | no (meta) |
//! | `Condensation` | condenser policy | no (meta) |
//!
//! Meta-events drive the [`view`](crate::view) projection but never appear
//! in a validated view. Events are immutable once appended to a log; the
//! engine only ever reads them.

pub mod ids;
pub mod log;

pub use ids::{EventId, LlmResponseId, ToolCallId};
pub use log::EventLog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a `Message` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    User,
    Assistant,
}

/// How a tool call concluded.
///
/// The three outcomes are equivalent for projection purposes — each one
/// closes its action's side of the tool-call bijection. The distinction
/// matters only to downstream consumers (formatting, analytics).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationOutcome {
    /// The tool ran and returned a result.
    Success,
    /// The user rejected the call before execution.
    UserRejection,
    /// The agent failed to execute the call.
    AgentError,
}

/// The payload of an event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Initial system prompt material. Always retained.
    System { content: String },

    /// A user or assistant text message.
    Message {
        source: MessageSource,
        content: String,
    },

    /// An LLM-issued tool call.
    Action {
        /// Batch id: all actions from one LLM response share it.
        llm_response_id: LlmResponseId,
        /// Correlates this action to its observation.
        tool_call_id: ToolCallId,
        tool_name: String,
        /// Raw JSON arguments, exactly as the model produced them.
        arguments: String,
        /// Opaque extended-thinking payloads. Only presence matters to the
        /// engine: a non-empty set on a batch's first action anchors a
        /// tool loop.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        thinking_blocks: Vec<serde_json::Value>,
    },

    /// Result of a tool call.
    Observation {
        tool_call_id: ToolCallId,
        outcome: ObservationOutcome,
        content: String,
    },

    /// Marker that the condenser has been asked to shrink the context.
    CondensationRequest,

    /// A commit by the condenser: forget a set of events, optionally insert
    /// a summary at `summary_offset` (counted over the surviving sequence).
    Condensation {
        forgotten: Vec<EventId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        #[serde(default)]
        summary_offset: usize,
    },
}

/// One record in the conversation log: a stable id, a creation timestamp,
/// and the kind-specific payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    fn new(id: impl Into<EventId>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            kind,
        }
    }

    // ── Constructors ───────────────────────────────────────────────

    pub fn system(id: impl Into<EventId>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            EventKind::System {
                content: content.into(),
            },
        )
    }

    pub fn user_message(id: impl Into<EventId>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            EventKind::Message {
                source: MessageSource::User,
                content: content.into(),
            },
        )
    }

    pub fn assistant_message(id: impl Into<EventId>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            EventKind::Message {
                source: MessageSource::Assistant,
                content: content.into(),
            },
        )
    }

    pub fn action(
        id: impl Into<EventId>,
        llm_response_id: impl Into<LlmResponseId>,
        tool_call_id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            EventKind::Action {
                llm_response_id: llm_response_id.into(),
                tool_call_id: tool_call_id.into(),
                tool_name: tool_name.into(),
                arguments: arguments.into(),
                thinking_blocks: Vec::new(),
            },
        )
    }

    /// Attach thinking blocks to an `Action` event. No-op for other kinds.
    pub fn with_thinking(mut self, blocks: Vec<serde_json::Value>) -> Self {
        if let EventKind::Action {
            ref mut thinking_blocks,
            ..
        } = self.kind
        {
            *thinking_blocks = blocks;
        }
        self
    }

    pub fn observation(
        id: impl Into<EventId>,
        tool_call_id: impl Into<ToolCallId>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            EventKind::Observation {
                tool_call_id: tool_call_id.into(),
                outcome: ObservationOutcome::Success,
                content: content.into(),
            },
        )
    }

    pub fn user_rejection(
        id: impl Into<EventId>,
        tool_call_id: impl Into<ToolCallId>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            EventKind::Observation {
                tool_call_id: tool_call_id.into(),
                outcome: ObservationOutcome::UserRejection,
                content: content.into(),
            },
        )
    }

    pub fn agent_error(
        id: impl Into<EventId>,
        tool_call_id: impl Into<ToolCallId>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            EventKind::Observation {
                tool_call_id: tool_call_id.into(),
                outcome: ObservationOutcome::AgentError,
                content: content.into(),
            },
        )
    }

    pub fn condensation_request(id: impl Into<EventId>) -> Self {
        Self::new(id, EventKind::CondensationRequest)
    }

    pub fn condensation(
        id: impl Into<EventId>,
        forgotten: Vec<EventId>,
        summary: Option<String>,
        summary_offset: usize,
    ) -> Self {
        Self::new(
            id,
            EventKind::Condensation {
                forgotten,
                summary,
                summary_offset,
            },
        )
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Meta-events (`CondensationRequest`, `Condensation`) drive the
    /// projection but are never part of a validated view.
    pub fn is_meta(&self) -> bool {
        matches!(
            self.kind,
            EventKind::CondensationRequest | EventKind::Condensation { .. }
        )
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, EventKind::Action { .. })
    }

    pub fn is_observation(&self) -> bool {
        matches!(self.kind, EventKind::Observation { .. })
    }

    /// The correlation id, for both sides of the tool-call bijection.
    pub fn tool_call_id(&self) -> Option<&ToolCallId> {
        match &self.kind {
            EventKind::Action { tool_call_id, .. }
            | EventKind::Observation { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }

    /// The batch id, for `Action` events.
    pub fn llm_response_id(&self) -> Option<&LlmResponseId> {
        match &self.kind {
            EventKind::Action {
                llm_response_id, ..
            } => Some(llm_response_id),
            _ => None,
        }
    }

    /// Whether this is an `Action` carrying at least one thinking block.
    pub fn has_thinking(&self) -> bool {
        matches!(
            &self.kind,
            EventKind::Action { thinking_blocks, .. } if !thinking_blocks.is_empty()
        )
    }

    /// Short label for diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            EventKind::System { .. } => "system",
            EventKind::Message { .. } => "message",
            EventKind::Action { .. } => "action",
            EventKind::Observation { .. } => "observation",
            EventKind::CondensationRequest => "condensation_request",
            EventKind::Condensation { .. } => "condensation",
        }
    }
}
