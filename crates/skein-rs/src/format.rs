//! Chat-message formatting for validated views.
//!
//! The last step before the wire: a validated [`View`] becomes an
//! OpenAI-style chat message list. Consecutive actions that share one
//! `LlmResponseId` collapse into a single assistant message carrying the
//! whole batch's tool calls, which is exactly how the API originally
//! returned them; observations become `tool` messages keyed by call id.
//!
//! The formatter assumes its input is validated — it never re-checks the
//! bijection or batch invariants, and meta-events cannot reach it because
//! the builder strips them.

use crate::event::{EventKind, MessageSource};
use crate::view::View;
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// The type of a tool call. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// A tool call in OpenAI function-calling format.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCallData,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FunctionCallData {
    pub name: String,
    pub arguments: String,
}

/// A chat message ready for an LLM API request body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Format a validated view as a chat message list.
pub fn to_chat_messages(view: &View) -> Vec<Message> {
    let events = view.events();
    let mut messages = Vec::with_capacity(events.len());

    let mut position = 0;
    while position < events.len() {
        let event = &events[position];
        match &event.kind {
            EventKind::System { content } => {
                messages.push(Message::system(content));
                position += 1;
            }
            EventKind::Message { source, content } => {
                messages.push(match source {
                    MessageSource::User => Message::user(content),
                    MessageSource::Assistant => Message::assistant_text(content),
                });
                position += 1;
            }
            EventKind::Action {
                llm_response_id, ..
            } => {
                // Collapse the run of consecutive actions from the same
                // LLM response into one assistant message.
                let batch_id = llm_response_id;
                let mut calls = Vec::new();
                while position < events.len() {
                    let EventKind::Action {
                        llm_response_id,
                        tool_call_id,
                        tool_name,
                        arguments,
                        ..
                    } = &events[position].kind
                    else {
                        break;
                    };
                    if llm_response_id != batch_id {
                        break;
                    }
                    calls.push(ToolCall {
                        id: tool_call_id.to_string(),
                        call_type: CallType::Function,
                        function: FunctionCallData {
                            name: tool_name.clone(),
                            arguments: arguments.clone(),
                        },
                    });
                    position += 1;
                }
                messages.push(Message::assistant_tool_calls(calls));
            }
            EventKind::Observation {
                tool_call_id,
                content,
                ..
            } => {
                messages.push(Message::tool_result(tool_call_id.to_string(), content));
                position += 1;
            }
            // Unreachable for builder output; skipped when callers format
            // hand-assembled sequences.
            EventKind::CondensationRequest | EventKind::Condensation { .. } => {
                position += 1;
            }
        }
    }

    messages
}
