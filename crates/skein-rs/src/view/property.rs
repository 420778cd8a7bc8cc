//! The `ViewProperty` contract: one invariant, two pure operations.
//!
//! Each property owns a single LLM-API structural invariant and exposes it
//! two ways:
//!
//! - [`safe_indices`](ViewProperty::safe_indices) — the positions at which
//!   a cut or insertion cannot violate the invariant. The builder intersects
//!   these across properties to produce the manipulation indices.
//! - [`validate`](ViewProperty::validate) — a filtered/augmented sequence
//!   that satisfies the invariant. Idempotent: validating a validated
//!   sequence returns it unchanged.
//!
//! Both operations are pure. Non-fatal anomalies are silently normalized;
//! fatal ones surface a [`ViewError`].

use crate::error::ViewError;
use crate::event::Event;
use crate::view::indices::IndexSet;

/// One structural invariant over an event sequence.
pub trait ViewProperty {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Positions in `0..=events.len()` at which a cut or insertion keeps
    /// this property intact. Position `n` means "after the last event".
    fn safe_indices(&self, events: &[Event]) -> IndexSet;

    /// Return a sequence satisfying this property.
    ///
    /// `reference` is the unprojected sequence that `events` was drawn from;
    /// properties that must see what upstream passes removed (batch
    /// atomicity) consult it. For standalone use, pass the same slice the
    /// working set was built from — `validate(x, x.to_vec())` is always
    /// valid and idempotent.
    fn validate(&self, reference: &[Event], events: Vec<Event>) -> Result<Vec<Event>, ViewError>;
}
