//! The view engine: invariant-preserving projection of an event log.
//!
//! A raw conversation log accumulates everything — tool traffic, user
//! edits, condenser meta-events. An LLM API accepts none of that as-is: it
//! requires every tool call answered, every response batch whole, and no
//! bookkeeping records in the message list. This module projects the log
//! into a sequence that satisfies those rules, and computes where the log
//! may safely be cut or extended.
//!
//! Each rule is one [`ViewProperty`](property::ViewProperty):
//!
//! 1. **[`condensation`]** — forgotten events disappear, summaries appear,
//!    meta-events are stripped.
//! 2. **[`matching`]** — actions and observations form a bijection over
//!    tool-call ids; orphans are filtered (or reported, in strict mode).
//! 3. **[`batch_atomicity`]** — actions from one LLM response are all
//!    present or all absent, and nothing lands between them.
//! 4. **[`tool_loop`]** — a thinking-anchored run of tool traffic is never
//!    cut in the middle.
//!
//! The [`builder`] composes the four; [`indices`] intersects their safe
//! positions into the sorted manipulation-index list the condenser consumes.

pub mod batch;
pub mod batch_atomicity;
pub mod builder;
pub mod condensation;
pub mod indices;
pub mod matching;
pub mod property;
pub mod tool_loop;

pub use batch::{ActionBatch, ActionBatchIndex};
pub use batch_atomicity::BatchAtomicityProperty;
pub use builder::{View, ViewBuilder, ViewFlags, build_view, manipulation_indices};
pub use condensation::{CondensationOutcome, CondensationProperty};
pub use indices::{IndexSet, ManipulationIndices};
pub use matching::{MatchingMode, ToolCallMatchingProperty};
pub use property::ViewProperty;
pub use tool_loop::ToolLoopAtomicityProperty;
