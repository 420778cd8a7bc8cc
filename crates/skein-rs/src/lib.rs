//! Event-log view engine for LLM agent conversations.
//!
//! `skein-rs` projects a raw, append-only log of agent–LLM events into a
//! *well-formed* sequence an LLM API will accept, and computes the *safe
//! manipulation indices* at which that log may be shortened (to fit a
//! context window) or extended (by inserted summaries) without breaking
//! the API's structural rules.
//!
//! The engine enforces four invariants, each owned by one
//! [`ViewProperty`](view::ViewProperty):
//!
//! 1. **Tool-call bijection** — every retained tool call has exactly one
//!    retained result, and vice versa.
//! 2. **Batch atomicity** — the tool calls of one LLM response are all
//!    present or all absent, with nothing inserted between them.
//! 3. **Tool-loop atomicity** — a thinking-anchored run of tool traffic is
//!    never cut in the middle.
//! 4. **Condensation** — forgotten events are gone, the latest summary is
//!    inserted exactly once at its recorded offset, and condenser
//!    bookkeeping never reaches the LLM.
//!
//! # Getting started
//!
//! ```
//! use skein_rs::prelude::*;
//!
//! let events = vec![
//!     Event::system("e0", "You are a helpful coding agent."),
//!     Event::user_message("e1", "What does main.rs do?"),
//!     Event::action("e2", "r1", "t1", "read_file", r#"{"path":"src/main.rs"}"#),
//!     Event::observation("e3", "t1", "fn main() { ... }"),
//!     Event::assistant_message("e4", "It prints a greeting."),
//! ];
//!
//! // Project the log into an LLM-safe view and format it for a request.
//! let view = build_view(&events)?;
//! let messages = to_chat_messages(&view);
//! assert_eq!(messages.len(), 5);
//!
//! // Where may this history be cut?
//! let indices = manipulation_indices(&events);
//! let cut = indices.next_index(2, false);
//! assert!(indices.as_slice().contains(&cut));
//! # Ok::<(), skein_rs::ViewError>(())
//! ```
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Model a conversation:** see [`Event`], [`event::EventKind`], the id
//!   newtypes in [`event::ids`], and the append-only [`event::EventLog`].
//! - **Project a log for an API request:** see [`build_view`],
//!   [`view::ViewBuilder`] (strict matching via
//!   [`MatchingMode`](view::MatchingMode)), and the resulting
//!   [`View`](view::View) with its flags.
//! - **Pick a cut point:** see [`manipulation_indices`],
//!   [`ManipulationIndices::next_index`](view::ManipulationIndices::next_index),
//!   and the bitset [`IndexSet`](view::IndexSet) the properties report.
//! - **Decide what to forget:** see the [`condenser::Condenser`] trait,
//!   [`condenser::RollingCondenser`], and
//!   [`condenser::summarization_request`] for LLM-written summaries.
//! - **Format for the wire:** see [`format::to_chat_messages`] and the
//!   [`format::Message`] chat types.
//! - **Capture and replay histories:** see [`replay::write_log`] /
//!   [`replay::read_log`].
//!
//! # Design principles
//!
//! 1. **Views are values.** A view is a pure function of the log: computed,
//!    used, discarded. The engine holds no state between invocations,
//!    performs no I/O, and never mutates input.
//! 2. **One invariant, one property.** Each structural rule is a
//!    self-contained [`ViewProperty`](view::ViewProperty); the engine
//!    composes them by intersecting their safe-index sets. Adding a rule
//!    means adding a property, not threading a condition through the
//!    builder.
//! 3. **Normalize, don't reject.** Real histories are messy — orphaned
//!    calls, duplicate ids, out-of-range offsets. The engine silently
//!    projects them into something well-formed; only structurally unusable
//!    input is an error.

pub mod condenser;
pub mod error;
pub mod event;
pub mod format;
pub mod prelude;
pub mod replay;
pub mod view;

pub use error::ViewError;
pub use event::{Event, EventId, EventLog, LlmResponseId, ToolCallId};
pub use view::{View, ViewBuilder, build_view, manipulation_indices};
