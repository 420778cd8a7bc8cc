//! Convenience re-exports for common `skein-rs` types.
//!
//! Meant to be glob-imported when working with conversation logs:
//!
//! ```
//! use skein_rs::prelude::*;
//! ```
//!
//! This pulls in the event model, the view builder and its free functions,
//! the manipulation-index types, the chat formatter, and the rolling
//! condenser. Specialized types (individual view properties, the bitset,
//! replay helpers) are intentionally excluded — import those from their
//! modules directly when needed.

// ── Event model ─────────────────────────────────────────────────────
pub use crate::event::{
    Event, EventId, EventKind, EventLog, LlmResponseId, MessageSource, ObservationOutcome,
    ToolCallId,
};

// ── Projection ──────────────────────────────────────────────────────
pub use crate::view::{
    ManipulationIndices, MatchingMode, View, ViewBuilder, ViewFlags, build_view,
    manipulation_indices,
};

// ── Formatting ──────────────────────────────────────────────────────
pub use crate::format::{Message, MessageRole, ToolCall, to_chat_messages};

// ── Condensation policies ───────────────────────────────────────────
pub use crate::condenser::{Condenser, RollingCondenser};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::ViewError;
