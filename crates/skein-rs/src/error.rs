//! Error taxonomy for the view engine.
//!
//! The engine is a pure function: it never retries and never partially
//! fails. Orphan tool calls, out-of-range summary offsets, and duplicate
//! meta-events are silently normalized during validation; only the
//! conditions below surface as errors.

use crate::event::ToolCallId;

/// Errors surfaced by the view engine and its I/O helpers.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The input log is structurally unusable: an undecodable record, a
    /// null entry, or a duplicate event id. Fatal — the caller must fix
    /// the log, not the request.
    #[error("malformed event log: {0}")]
    MalformedInput(String),

    /// Strict matching mode found tool calls without a counterpart. The
    /// default lenient mode filters these instead of erroring.
    #[error(
        "unmatched tool calls: {} action(s) and {} observation(s) without a counterpart",
        .unmatched_actions.len(),
        .unmatched_observations.len()
    )]
    Matching {
        /// Tool-call ids of actions with no observation.
        unmatched_actions: Vec<ToolCallId>,
        /// Tool-call ids of observations with no action.
        unmatched_observations: Vec<ToolCallId>,
    },

    /// A replay file could not be read or written.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_error_reports_counts() {
        let err = ViewError::Matching {
            unmatched_actions: vec![ToolCallId::new("t1"), ToolCallId::new("t2")],
            unmatched_observations: vec![ToolCallId::new("t9")],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 action(s)"));
        assert!(msg.contains("1 observation(s)"));
    }
}
