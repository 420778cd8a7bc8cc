//! Capture and replay of event logs as JSON Lines files.
//!
//! One event per line, in insertion order. Replay files are how real
//! histories get attached to bug reports and turned into regression tests:
//! `read_log` re-validates everything the engine assumes about a log —
//! decodable records, no nulls, unique ids — and surfaces violations as
//! [`ViewError::MalformedInput`] with the offending line number.

use crate::error::ViewError;
use crate::event::{Event, EventLog};
use std::path::Path;

/// Write `events` to `path`, one JSON object per line.
pub fn write_log(path: impl AsRef<Path>, events: &[Event]) -> Result<(), ViewError> {
    let mut out = String::new();
    for event in events {
        let line = serde_json::to_string(event)
            .map_err(|e| ViewError::MalformedInput(format!("unencodable event: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Read an event log from `path`, validating structure and id uniqueness.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<Event>, ViewError> {
    let text = std::fs::read_to_string(path)?;

    let mut log = EventLog::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "null" {
            return Err(ViewError::MalformedInput(format!(
                "null event at line {}",
                number + 1
            )));
        }
        let event: Event = serde_json::from_str(line).map_err(|e| {
            ViewError::MalformedInput(format!("undecodable event at line {}: {e}", number + 1))
        })?;
        log.push(event)?;
    }
    Ok(log.as_slice().to_vec())
}
